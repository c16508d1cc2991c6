//! Month-by-month invoice register with running closing balances

use bigdecimal::BigDecimal;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::tax::gst::{GstCalculator, InvoiceTotals};
use crate::types::*;

/// Restriction on the GST flag of invoices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GstFilter {
    #[default]
    All,
    GstOnly,
    NonGstOnly,
}

impl GstFilter {
    pub fn matches(&self, is_gst_bill: bool) -> bool {
        match self {
            GstFilter::All => true,
            GstFilter::GstOnly => is_gst_bill,
            GstFilter::NonGstOnly => !is_gst_bill,
        }
    }
}

/// Filters applied after voucher numbers are assigned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollupFilter {
    /// Only this type; `None` keeps every type
    pub invoice_type: Option<InvoiceType>,
    pub gst: GstFilter,
}

/// Invoice with its register-wide voucher number and derived totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberedInvoice {
    /// 1-based position in the unfiltered, date-ordered register
    pub vch_no: u64,
    pub invoice: Invoice,
    pub totals: InvoiceTotals,
}

impl NumberedInvoice {
    /// Case-insensitive match on voucher number or party name
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.vch_no.to_string().contains(&term)
            || self.invoice.party_name().to_lowercase().contains(&term)
    }
}

/// Invoices of one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyGroup {
    /// `YYYY-MM`
    pub month_key: String,
    pub year: i32,
    pub month: u32,
    /// Sorted by voucher number, highest first
    pub invoices: Vec<NumberedInvoice>,
    /// Sum of grand totals in the month
    pub total_debit: BigDecimal,
    /// Sum of monthly totals up to and including this month
    pub closing_balance: BigDecimal,
}

impl MonthlyGroup {
    /// Drill-down within the month; numbering and totals are unaffected
    pub fn search(&self, term: &str) -> Vec<&NumberedInvoice> {
        self.invoices
            .iter()
            .filter(|inv| inv.matches_search(term))
            .collect()
    }
}

/// Result of a monthly rollup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRollup {
    /// Most recent month first
    pub groups: Vec<MonthlyGroup>,
    /// Distinct years present in `groups`, most recent first
    pub available_years: Vec<i32>,
}

impl MonthlyRollup {
    /// Groups belonging to one year, most recent month first
    pub fn groups_for_year(&self, year: i32) -> Vec<&MonthlyGroup> {
        self.groups.iter().filter(|g| g.year == year).collect()
    }

    /// Keep the selected year if it still has data, otherwise fall back to the latest year
    pub fn resolve_selected_year(&self, selected: Option<i32>) -> Option<i32> {
        match selected {
            Some(year) if self.available_years.contains(&year) => Some(year),
            _ => {
                let fallback = self.available_years.first().copied();
                if selected.is_some() {
                    warn!(?selected, ?fallback, "selected year has no invoices, resetting");
                }
                fallback
            }
        }
    }
}

/// Number every invoice by its position in date order, before any filtering.
///
/// Invoices sharing a date keep their input (fetch) order.
pub fn number_invoices(invoices: &[Invoice]) -> Vec<NumberedInvoice> {
    number_invoices_with(invoices, &GstCalculator::default())
}

/// Same as [`number_invoices`], with totals taken at the calculator's rate
pub fn number_invoices_with(invoices: &[Invoice], calculator: &GstCalculator) -> Vec<NumberedInvoice> {
    let mut ordered: Vec<&Invoice> = invoices.iter().collect();
    ordered.sort_by_key(|inv| inv.date);

    ordered
        .into_iter()
        .zip(1u64..)
        .map(|(invoice, vch_no)| NumberedInvoice {
            vch_no,
            totals: calculator.totals(&invoice.line_items, invoice.is_gst_bill),
            invoice: invoice.clone(),
        })
        .collect()
}

fn month_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Group invoices by month with per-month totals and a running closing balance
pub fn compute_monthly_rollup(invoices: &[Invoice], filter: &RollupFilter) -> MonthlyRollup {
    compute_monthly_rollup_with(invoices, filter, &GstCalculator::default())
}

/// Monthly rollup with totals taken at the calculator's rate
pub fn compute_monthly_rollup_with(
    invoices: &[Invoice],
    filter: &RollupFilter,
    calculator: &GstCalculator,
) -> MonthlyRollup {
    let numbered = number_invoices_with(invoices, calculator);
    let total_count = numbered.len();

    let mut months: BTreeMap<(i32, u32), Vec<NumberedInvoice>> = BTreeMap::new();
    for inv in numbered {
        let type_ok = filter
            .invoice_type
            .is_none_or(|t| inv.invoice.effective_type() == t);
        if !type_ok || !filter.gst.matches(inv.invoice.is_gst_bill) {
            continue;
        }
        let key = (inv.invoice.date.year(), inv.invoice.date.month());
        months.entry(key).or_default().push(inv);
    }

    let mut running = BigDecimal::from(0);
    let mut groups: Vec<MonthlyGroup> = months
        .into_iter()
        .map(|((year, month), mut invoices)| {
            invoices.sort_by(|a, b| b.vch_no.cmp(&a.vch_no));
            let total_debit: BigDecimal = invoices.iter().map(|i| &i.totals.grand_total).sum();
            running += &total_debit;
            MonthlyGroup {
                month_key: month_key(year, month),
                year,
                month,
                invoices,
                total_debit,
                closing_balance: running.clone(),
            }
        })
        .collect();
    groups.reverse();

    let mut available_years: Vec<i32> = groups.iter().map(|g| g.year).collect();
    available_years.dedup();

    debug!(
        invoices = total_count,
        months = groups.len(),
        ?filter,
        "recomputed monthly rollup"
    );

    MonthlyRollup {
        groups,
        available_years,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineItem;
    use chrono::NaiveDate;

    fn invoice(id: &str, y: i32, m: u32, d: u32, kind: Option<InvoiceType>, amount: i64) -> Invoice {
        let mut inv = Invoice::new(
            id.to_string(),
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            format!("MD/{}", id),
            "c1".to_string(),
        );
        inv.invoice_type = kind;
        inv.add_line_item(LineItem::new(
            "Printing".to_string(),
            "4911".to_string(),
            BigDecimal::from(1),
            BigDecimal::from(amount),
            "NOS".to_string(),
        ));
        inv
    }

    fn vch_nos(group: &MonthlyGroup) -> Vec<u64> {
        group.invoices.iter().map(|i| i.vch_no).collect()
    }

    #[test]
    fn test_numbering_survives_filtering() {
        let invoices = vec![
            invoice("a", 2024, 1, 1, Some(InvoiceType::Sale), 100),
            invoice("b", 2024, 1, 5, Some(InvoiceType::Purchase), 200),
            invoice("c", 2024, 2, 1, Some(InvoiceType::Sale), 300),
        ];

        let all = compute_monthly_rollup(&invoices, &RollupFilter::default());
        let mut numbers: Vec<u64> = all
            .groups
            .iter()
            .flat_map(|g| g.invoices.iter().map(|i| i.vch_no))
            .collect();
        numbers.sort();
        assert_eq!(numbers, vec![1, 2, 3]);

        let sales = compute_monthly_rollup(
            &invoices,
            &RollupFilter {
                invoice_type: Some(InvoiceType::Sale),
                gst: GstFilter::All,
            },
        );
        assert_eq!(sales.groups.len(), 2);
        assert_eq!(vch_nos(&sales.groups[0]), vec![3]);
        assert_eq!(vch_nos(&sales.groups[1]), vec![1]);
    }

    #[test]
    fn test_groups_descending_with_running_closing() {
        let invoices = vec![
            invoice("a", 2023, 12, 30, None, 50),
            invoice("b", 2024, 1, 3, None, 100),
            invoice("c", 2024, 1, 20, None, 150),
            invoice("d", 2024, 3, 2, None, 400),
        ];
        let rollup = compute_monthly_rollup(&invoices, &RollupFilter::default());

        let keys: Vec<&str> = rollup.groups.iter().map(|g| g.month_key.as_str()).collect();
        assert_eq!(keys, vec!["2024-03", "2024-01", "2023-12"]);

        let jan = &rollup.groups[1];
        assert_eq!(jan.total_debit, BigDecimal::from(250));
        assert_eq!(jan.closing_balance, BigDecimal::from(300));
        assert_eq!(vch_nos(jan), vec![3, 2]);

        assert_eq!(rollup.groups[0].closing_balance, BigDecimal::from(700));
        assert_eq!(rollup.available_years, vec![2024, 2023]);
    }

    #[test]
    fn test_closing_balance_never_decreases() {
        let invoices: Vec<Invoice> = (1..=12)
            .map(|m| invoice(&format!("i{}", m), 2024, m, 10, None, (m as i64) * 10))
            .collect();
        let rollup = compute_monthly_rollup(&invoices, &RollupFilter::default());

        let ascending: Vec<&BigDecimal> =
            rollup.groups.iter().rev().map(|g| &g.closing_balance).collect();
        assert!(ascending.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_gst_filter_and_missing_type() {
        let mut gst = invoice("a", 2024, 5, 1, None, 1000);
        gst.is_gst_bill = true;
        let plain = invoice("b", 2024, 5, 2, None, 500);

        let only_gst = compute_monthly_rollup(
            &[gst.clone(), plain.clone()],
            &RollupFilter {
                invoice_type: Some(InvoiceType::Sale),
                gst: GstFilter::GstOnly,
            },
        );
        assert_eq!(only_gst.groups.len(), 1);
        assert_eq!(vch_nos(&only_gst.groups[0]), vec![1]);
        assert_eq!(only_gst.groups[0].total_debit, BigDecimal::from(1180));

        let non_gst = compute_monthly_rollup(
            &[gst, plain],
            &RollupFilter {
                invoice_type: None,
                gst: GstFilter::NonGstOnly,
            },
        );
        assert_eq!(vch_nos(&non_gst.groups[0]), vec![2]);
    }

    #[test]
    fn test_same_day_keeps_fetch_order() {
        let invoices = vec![
            invoice("first", 2024, 6, 1, None, 10),
            invoice("second", 2024, 6, 1, None, 20),
        ];
        let numbered = number_invoices(&invoices);
        assert_eq!(numbered[0].invoice.id, "first");
        assert_eq!(numbered[1].vch_no, 2);
    }

    #[test]
    fn test_empty_input() {
        let rollup = compute_monthly_rollup(&[], &RollupFilter::default());
        assert!(rollup.groups.is_empty());
        assert!(rollup.available_years.is_empty());
        assert_eq!(rollup.resolve_selected_year(Some(2024)), None);
    }

    #[test]
    fn test_selected_year_resets_to_latest() {
        let invoices = vec![
            invoice("a", 2022, 4, 1, Some(InvoiceType::Purchase), 10),
            invoice("b", 2023, 4, 1, Some(InvoiceType::Sale), 10),
            invoice("c", 2024, 4, 1, Some(InvoiceType::Purchase), 10),
        ];
        let purchases = compute_monthly_rollup(
            &invoices,
            &RollupFilter {
                invoice_type: Some(InvoiceType::Purchase),
                gst: GstFilter::All,
            },
        );
        assert_eq!(purchases.available_years, vec![2024, 2022]);
        assert_eq!(purchases.resolve_selected_year(Some(2022)), Some(2022));
        assert_eq!(purchases.resolve_selected_year(Some(2023)), Some(2024));
        assert_eq!(purchases.groups_for_year(2022).len(), 1);
    }

    #[test]
    fn test_search_within_month() {
        let mut a = invoice("a", 2024, 7, 1, None, 10);
        a.party = Some(PartyRef {
            company_name: "Lulu Hypermarket".to_string(),
            gstin: None,
        });
        let mut b = invoice("b", 2024, 7, 2, None, 20);
        b.party = Some(PartyRef {
            company_name: "Oberon Mall".to_string(),
            gstin: None,
        });

        let rollup = compute_monthly_rollup(&[a, b], &RollupFilter::default());
        let july = &rollup.groups[0];

        let hits = july.search("lulu");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].vch_no, 1);
        assert_eq!(july.search("2")[0].invoice.id, "b");
        assert_eq!(july.search("").len(), 2);
        assert_eq!(july.total_debit, BigDecimal::from(30));
    }
}
