//! GST (Goods and Services Tax) totals for intra-state invoices

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::config::BillingConfig;
use crate::types::LineItem;

/// Intra-state GST rate split into its central and state halves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstRate {
    /// Total GST rate percentage (e.g., 18 for 18%)
    pub total_rate: BigDecimal,
    /// CGST rate percentage (Central GST)
    pub cgst_rate: BigDecimal,
    /// SGST rate percentage (State GST)
    pub sgst_rate: BigDecimal,
}

impl GstRate {
    /// Split a total rate evenly into CGST and SGST
    pub fn intra_state(total_rate: BigDecimal) -> Self {
        let half_rate = &total_rate / BigDecimal::from(2);
        Self {
            total_rate,
            cgst_rate: half_rate.clone(),
            sgst_rate: half_rate,
        }
    }

    /// The flat 9% + 9% rate billed on every GST invoice
    pub fn standard() -> Self {
        Self::intra_state(BigDecimal::from(18))
    }

    /// Rate taken from configuration
    pub fn from_config(config: &BillingConfig) -> Result<Self, GstError> {
        let rate = Self {
            total_rate: &config.cgst_rate + &config.sgst_rate,
            cgst_rate: config.cgst_rate.clone(),
            sgst_rate: config.sgst_rate.clone(),
        };
        rate.validate()?;
        Ok(rate)
    }

    /// Validate that the GST rate structure is correct
    pub fn validate(&self) -> Result<(), GstError> {
        let zero = BigDecimal::from(0);
        if self.cgst_rate < zero || self.sgst_rate < zero {
            return Err(GstError::InvalidRate(
                "GST rates cannot be negative".to_string(),
            ));
        }

        let calculated_total = &self.cgst_rate + &self.sgst_rate;
        if calculated_total != self.total_rate {
            return Err(GstError::InvalidRate(format!(
                "GST components don't add up to total rate: {} != {}",
                calculated_total, self.total_rate
            )));
        }

        if self.cgst_rate != self.sgst_rate {
            return Err(GstError::InvalidRate(
                "CGST and SGST rates must be equal for intra-state transactions".to_string(),
            ));
        }

        Ok(())
    }

    fn apply(rate: &BigDecimal, amount: &BigDecimal) -> BigDecimal {
        (amount * rate) / BigDecimal::from(100)
    }
}

/// Invoice-level totals derived from line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of line taxable values
    pub taxable_total: BigDecimal,
    /// Central GST
    pub cgst: BigDecimal,
    /// State GST
    pub sgst: BigDecimal,
    /// `taxable_total + cgst + sgst`
    pub grand_total: BigDecimal,
}

impl InvoiceTotals {
    /// CGST and SGST together
    pub fn total_tax(&self) -> BigDecimal {
        &self.cgst + &self.sgst
    }
}

/// Calculator for invoice totals at a fixed GST rate
#[derive(Debug, Clone)]
pub struct GstCalculator {
    rate: GstRate,
}

impl Default for GstCalculator {
    fn default() -> Self {
        Self::new(GstRate::standard())
    }
}

impl GstCalculator {
    pub fn new(rate: GstRate) -> Self {
        Self { rate }
    }

    /// Calculator using the configured rates
    pub fn from_config(config: &BillingConfig) -> Result<Self, GstError> {
        Ok(Self::new(GstRate::from_config(config)?))
    }

    pub fn rate(&self) -> &GstRate {
        &self.rate
    }

    /// Compute invoice totals; line values are summed without intermediate rounding
    pub fn totals(&self, line_items: &[LineItem], is_gst_bill: bool) -> InvoiceTotals {
        let taxable_total: BigDecimal = line_items
            .iter()
            .map(|item| &item.quantity * &item.rate)
            .sum();

        let (cgst, sgst) = if is_gst_bill {
            (
                GstRate::apply(&self.rate.cgst_rate, &taxable_total),
                GstRate::apply(&self.rate.sgst_rate, &taxable_total),
            )
        } else {
            (BigDecimal::from(0), BigDecimal::from(0))
        };

        let grand_total = &taxable_total + &cgst + &sgst;

        InvoiceTotals {
            taxable_total,
            cgst,
            sgst,
            grand_total,
        }
    }

    /// Per-line tax fields as persisted alongside the invoice
    pub fn item_record(
        &self,
        invoice_id: &str,
        item: &LineItem,
        is_gst_bill: bool,
    ) -> InvoiceItemRecord {
        let taxable_value = &item.quantity * &item.rate;
        let zero = BigDecimal::from(0);
        let (cgst_rate, sgst_rate) = if is_gst_bill {
            (self.rate.cgst_rate.clone(), self.rate.sgst_rate.clone())
        } else {
            (zero.clone(), zero)
        };

        InvoiceItemRecord {
            invoice_id: invoice_id.to_string(),
            description: item.description.clone(),
            subheading: item.subheading.clone(),
            hsn_sac_code: item.hsn_code.clone(),
            quantity_billed: item.quantity.clone(),
            quantity_shipped: item.quantity.clone(),
            rate: item.rate.clone(),
            unit: item.unit.clone(),
            cgst_amount: GstRate::apply(&cgst_rate, &taxable_value),
            sgst_amount: GstRate::apply(&sgst_rate, &taxable_value),
            cgst_rate,
            sgst_rate,
            taxable_value,
        }
    }

    /// Item records for every line of an invoice
    pub fn item_records(
        &self,
        invoice_id: &str,
        line_items: &[LineItem],
        is_gst_bill: bool,
    ) -> Vec<InvoiceItemRecord> {
        line_items
            .iter()
            .map(|item| self.item_record(invoice_id, item, is_gst_bill))
            .collect()
    }
}

/// Compute invoice totals at the standard 9% + 9% split
pub fn compute_invoice_totals(line_items: &[LineItem], is_gst_bill: bool) -> InvoiceTotals {
    GstCalculator::default().totals(line_items, is_gst_bill)
}

/// Invoice line as stored, with its tax split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItemRecord {
    pub invoice_id: String,
    pub description: String,
    pub subheading: Option<String>,
    pub hsn_sac_code: String,
    pub quantity_billed: BigDecimal,
    pub quantity_shipped: BigDecimal,
    pub rate: BigDecimal,
    pub unit: String,
    pub taxable_value: BigDecimal,
    pub cgst_rate: BigDecimal,
    pub sgst_rate: BigDecimal,
    pub cgst_amount: BigDecimal,
    pub sgst_amount: BigDecimal,
}

impl InvoiceItemRecord {
    /// Rebuild the editable line from the stored record
    pub fn to_line_item(&self) -> LineItem {
        LineItem {
            description: self.description.clone(),
            subheading: self.subheading.clone(),
            hsn_code: self.hsn_sac_code.clone(),
            quantity: self.quantity_billed.clone(),
            rate: self.rate.clone(),
            unit: self.unit.clone(),
            taxable_value: self.taxable_value.clone(),
        }
    }
}

/// GST-related errors
#[derive(Debug, thiserror::Error)]
pub enum GstError {
    #[error("Invalid GST rate: {0}")]
    InvalidRate(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn line(qty: &str, rate: &str) -> LineItem {
        LineItem::new(
            "Flex Printing".to_string(),
            "4911".to_string(),
            BigDecimal::from_str(qty).unwrap(),
            BigDecimal::from_str(rate).unwrap(),
            "SQFT".to_string(),
        )
    }

    #[test]
    fn test_gst_rate_intra_state() {
        let rate = GstRate::intra_state(BigDecimal::from(18));
        assert_eq!(rate.total_rate, BigDecimal::from(18));
        assert_eq!(rate.cgst_rate, BigDecimal::from(9));
        assert_eq!(rate.sgst_rate, BigDecimal::from(9));
        assert!(rate.validate().is_ok());
    }

    #[test]
    fn test_gst_rate_rejects_uneven_split() {
        let rate = GstRate {
            total_rate: BigDecimal::from(18),
            cgst_rate: BigDecimal::from(10),
            sgst_rate: BigDecimal::from(8),
        };
        assert!(rate.validate().is_err());
    }

    #[test]
    fn test_gst_invoice_totals() {
        let items = vec![line("2", "500"), line("1", "300")];
        let totals = compute_invoice_totals(&items, true);

        assert_eq!(totals.taxable_total, BigDecimal::from(1300));
        assert_eq!(totals.cgst, BigDecimal::from(117));
        assert_eq!(totals.sgst, BigDecimal::from(117));
        assert_eq!(totals.total_tax(), BigDecimal::from(234)); // 18% of 1300
        assert_eq!(totals.grand_total, BigDecimal::from(1534));
    }

    #[test]
    fn test_non_gst_bill_has_no_tax() {
        let items = vec![line("3", "99.99")];
        let totals = compute_invoice_totals(&items, false);

        assert_eq!(totals.cgst, BigDecimal::from(0));
        assert_eq!(totals.sgst, BigDecimal::from(0));
        assert_eq!(totals.grand_total, totals.taxable_total);
    }

    #[test]
    fn test_empty_invoice_is_zero() {
        let totals = compute_invoice_totals(&[], true);
        assert_eq!(totals.taxable_total, BigDecimal::from(0));
        assert_eq!(totals.grand_total, BigDecimal::from(0));
    }

    #[test]
    fn test_grand_total_identity_and_symmetric_split() {
        let items = vec![line("1.5", "33.33"), line("7", "0.07"), line("12", "1250.5")];
        for is_gst in [true, false] {
            let totals = compute_invoice_totals(&items, is_gst);
            assert_eq!(totals.cgst, totals.sgst);
            assert_eq!(
                totals.grand_total,
                &totals.taxable_total + &totals.cgst + &totals.sgst
            );
        }
    }

    #[test]
    fn test_line_taxable_values_are_not_rounded() {
        let items = vec![line("1", "0.333"), line("1", "0.333")];
        let totals = compute_invoice_totals(&items, false);
        assert_eq!(totals.taxable_total, BigDecimal::from_str("0.666").unwrap());
    }

    #[test]
    fn test_line_tax_sums_to_invoice_tax() {
        let calculator = GstCalculator::default();
        let items = vec![line("1.5", "33.33"), line("7", "0.07"), line("12", "1250.5")];
        let totals = calculator.totals(&items, true);
        let records = calculator.item_records("inv1", &items, true);

        let line_cgst: BigDecimal = records.iter().map(|r| &r.cgst_amount).sum();
        let line_sgst: BigDecimal = records.iter().map(|r| &r.sgst_amount).sum();
        assert_eq!(line_cgst, totals.cgst);
        assert_eq!(line_sgst, totals.sgst);
        assert_eq!(records[0].cgst_rate, BigDecimal::from(9));
        assert_eq!(records[2].quantity_shipped, records[2].quantity_billed);
    }

    #[test]
    fn test_negative_quantity_is_accepted() {
        let totals = compute_invoice_totals(&[line("-2", "100")], true);
        assert_eq!(totals.taxable_total, BigDecimal::from(-200));
        assert_eq!(totals.grand_total, BigDecimal::from(-236));
    }

    #[test]
    fn test_totals_are_repeatable() {
        let items = vec![line("2.25", "19.99")];
        assert_eq!(
            compute_invoice_totals(&items, true),
            compute_invoice_totals(&items, true)
        );
    }
}
