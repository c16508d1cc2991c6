//! CSV export of the invoice register

use chrono::NaiveDate;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::report::monthly::GstFilter;
use crate::tax::gst::GstCalculator;
use crate::types::*;
use crate::utils::format::format_amount;

/// Column headers of the export file
pub const EXPORT_HEADERS: [&str; 11] = [
    "Date",
    "Invoice No",
    "Type",
    "Mode",
    "Party Name",
    "GSTIN",
    "Taxable Value",
    "CGST",
    "SGST",
    "Total Amount",
    "Status",
];

/// Which invoices to export; every field left unset keeps all invoices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportFilter {
    /// Inclusive lower bound on the invoice date
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the invoice date
    pub end_date: Option<NaiveDate>,
    pub invoice_type: Option<InvoiceType>,
    pub customer_id: Option<String>,
    pub payment_mode: Option<PaymentMode>,
    pub gst: GstFilter,
}

impl ExportFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.start_date.is_none_or(|start| invoice.date >= start)
            && self.end_date.is_none_or(|end| invoice.date <= end)
            && self
                .invoice_type
                .is_none_or(|t| invoice.effective_type() == t)
            && self
                .customer_id
                .as_ref()
                .is_none_or(|id| &invoice.customer_id == id)
            && self
                .payment_mode
                .is_none_or(|mode| invoice.effective_payment_mode() == mode)
            && self.gst.matches(invoice.is_gst_bill)
    }
}

/// One exported line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub date: String,
    pub invoice_number: String,
    pub invoice_type: String,
    pub payment_mode: String,
    pub party_name: String,
    pub gstin: String,
    pub taxable_value: String,
    pub cgst: String,
    pub sgst: String,
    pub total_amount: String,
    pub status: String,
}

impl ExportRow {
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self::from_invoice_with(invoice, &GstCalculator::default())
    }

    /// Row with totals taken at the calculator's rate
    pub fn from_invoice_with(invoice: &Invoice, calculator: &GstCalculator) -> Self {
        let totals = calculator.totals(&invoice.line_items, invoice.is_gst_bill);
        let party = invoice.party.as_ref();
        Self {
            date: invoice.date.format("%Y-%m-%d").to_string(),
            invoice_number: invoice.invoice_number.clone(),
            invoice_type: invoice.effective_type().as_str().to_string(),
            payment_mode: invoice.effective_payment_mode().as_str().to_string(),
            party_name: party
                .map(|p| p.company_name.clone())
                .unwrap_or_else(|| "N/A".to_string()),
            gstin: party
                .and_then(|p| p.gstin.clone())
                .filter(|g| !g.trim().is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
            taxable_value: format_amount(&totals.taxable_total),
            cgst: format_amount(&totals.cgst),
            sgst: format_amount(&totals.sgst),
            total_amount: format_amount(&totals.grand_total),
            status: if invoice.is_gst_bill { "GST" } else { "Non-GST" }.to_string(),
        }
    }

    fn fields(&self) -> [&str; 11] {
        [
            self.date.as_str(),
            self.invoice_number.as_str(),
            self.invoice_type.as_str(),
            self.payment_mode.as_str(),
            self.party_name.as_str(),
            self.gstin.as_str(),
            self.taxable_value.as_str(),
            self.cgst.as_str(),
            self.sgst.as_str(),
            self.total_amount.as_str(),
            self.status.as_str(),
        ]
    }
}

/// Matching invoices as export rows, latest invoice date first
pub fn build_export_rows(
    invoices: &[Invoice],
    filter: &ExportFilter,
    calculator: &GstCalculator,
) -> Vec<ExportRow> {
    let mut selected: Vec<&Invoice> = invoices.iter().filter(|inv| filter.matches(inv)).collect();
    selected.sort_by(|a, b| b.date.cmp(&a.date));
    selected
        .into_iter()
        .map(|inv| ExportRow::from_invoice_with(inv, calculator))
        .collect()
}

/// Render rows as CSV with a header line
pub fn write_csv(rows: &[ExportRow]) -> BillingResult<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(EXPORT_HEADERS)
        .map_err(|e| BillingError::Export(e.to_string()))?;
    for row in rows {
        writer
            .write_record(row.fields())
            .map_err(|e| BillingError::Export(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| BillingError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| BillingError::Export(e.to_string()))
}

/// Name of the export file produced on `today`
pub fn export_file_name(prefix: &str, today: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, today.format("%Y-%m-%d"))
}

/// Finished export: file name and CSV body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportFile {
    pub file_name: String,
    pub content: String,
    pub row_count: usize,
}

/// Filter, format and render invoices; fails when nothing matches
pub fn export_invoices(
    invoices: &[Invoice],
    filter: &ExportFilter,
    calculator: &GstCalculator,
    prefix: &str,
    today: NaiveDate,
) -> BillingResult<ExportFile> {
    let rows = build_export_rows(invoices, filter, calculator);
    if rows.is_empty() {
        return Err(BillingError::Export(
            "No records found for the selected filters".to_string(),
        ));
    }

    let content = write_csv(&rows)?;
    let file_name = export_file_name(prefix, today);
    info!(rows = rows.len(), %file_name, "exported invoices");

    Ok(ExportFile {
        file_name,
        content,
        row_count: rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineItem;
    use bigdecimal::BigDecimal;

    fn invoice(id: &str, day: u32, gst: bool) -> Invoice {
        let mut inv = Invoice::new(
            id.to_string(),
            NaiveDate::from_ymd_opt(2024, 8, day).unwrap(),
            format!("MD/{}", id),
            "c1".to_string(),
        );
        inv.is_gst_bill = gst;
        inv.add_line_item(LineItem::new(
            "Banner".to_string(),
            "4911".to_string(),
            BigDecimal::from(2),
            BigDecimal::from(500),
            "NOS".to_string(),
        ));
        inv
    }

    #[test]
    fn test_row_defaults() {
        let mut inv = invoice("1", 3, true);
        inv.invoice_type = None;
        inv.payment_mode = None;
        let row = ExportRow::from_invoice(&inv);

        assert_eq!(row.invoice_type, "SALE");
        assert_eq!(row.payment_mode, "CREDIT");
        assert_eq!(row.party_name, "N/A");
        assert_eq!(row.gstin, "N/A");
        assert_eq!(row.taxable_value, "1000.00");
        assert_eq!(row.cgst, "90.00");
        assert_eq!(row.total_amount, "1180.00");
        assert_eq!(row.status, "GST");
    }

    #[test]
    fn test_rows_latest_first_and_filtered() {
        let invoices = vec![invoice("1", 3, true), invoice("2", 9, false), invoice("3", 20, true)];
        let filter = ExportFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 8, 5),
            gst: GstFilter::All,
            ..Default::default()
        };
        let rows = build_export_rows(&invoices, &filter, &GstCalculator::default());
        let numbers: Vec<&str> = rows.iter().map(|r| r.invoice_number.as_str()).collect();
        assert_eq!(numbers, vec!["MD/3", "MD/2"]);

        let gst_only = ExportFilter {
            gst: GstFilter::GstOnly,
            ..Default::default()
        };
        assert_eq!(build_export_rows(&invoices, &gst_only, &GstCalculator::default()).len(), 2);
    }

    #[test]
    fn test_csv_output() {
        let mut inv = invoice("7", 1, false);
        inv.party = Some(PartyRef {
            company_name: "Metro, Traders".to_string(),
            gstin: Some("32ABCDE1234F1Z5".to_string()),
        });
        let file = export_invoices(
            &[inv],
            &ExportFilter::default(),
            &GstCalculator::default(),
            "Metro_Invoices",
            NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        )
        .unwrap();

        assert_eq!(file.file_name, "Metro_Invoices_2024-09-01.csv");
        let mut lines = file.content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date,Invoice No,Type,Mode,Party Name,GSTIN,Taxable Value,CGST,SGST,Total Amount,Status"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2024-08-01,MD/7,SALE,CREDIT,\"Metro, Traders\",32ABCDE1234F1Z5,1000.00,0.00,0.00,1000.00,Non-GST"
        );
    }

    #[test]
    fn test_no_matches_is_an_error() {
        let filter = ExportFilter {
            invoice_type: Some(InvoiceType::Purchase),
            ..Default::default()
        };
        let result = export_invoices(
            &[invoice("1", 1, true)],
            &filter,
            &GstCalculator::default(),
            "Metro_Invoices",
            NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        );
        assert!(matches!(result, Err(BillingError::Export(_))));
    }
}
