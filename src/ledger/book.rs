//! Cash book and bank book aggregation: running, opening and closing balances

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::ledger::voucher::assign_display_numbers;
use crate::types::*;
use crate::utils::format::format_amount;

/// Side of a ledger balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalanceSide {
    /// Zero or positive balance
    Dr,
    /// Negative balance
    Cr,
}

impl BalanceSide {
    pub fn of(balance: &BigDecimal) -> Self {
        if *balance >= BigDecimal::from(0) {
            BalanceSide::Dr
        } else {
            BalanceSide::Cr
        }
    }
}

impl fmt::Display for BalanceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceSide::Dr => write!(f, "Dr"),
            BalanceSide::Cr => write!(f, "Cr"),
        }
    }
}

/// One row of a ledger report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Chronological rank shown in the Vch No. column
    pub display_number: u64,
    pub entry: LedgerEntry,
    /// Balance after this entry
    pub running_balance: BigDecimal,
}

/// Ledger view over a full snapshot of a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerReport {
    pub opening_balance: BigDecimal,
    /// Entries in chronological order
    pub lines: Vec<LedgerLine>,
    pub total_debit: BigDecimal,
    pub total_credit: BigDecimal,
    /// `opening_balance + total_debit - total_credit`
    pub closing_balance: BigDecimal,
}

impl LedgerReport {
    /// Running balance after each entry, in chronological order
    pub fn running_balances(&self) -> Vec<BigDecimal> {
        self.lines
            .iter()
            .map(|line| line.running_balance.clone())
            .collect()
    }

    pub fn closing_side(&self) -> BalanceSide {
        BalanceSide::of(&self.closing_balance)
    }

    /// Closing balance as printed, e.g. `1400.00 Dr`
    pub fn closing_label(&self) -> String {
        format!(
            "{} {}",
            format_amount(&self.closing_balance),
            self.closing_side()
        )
    }
}

/// Build a ledger report from the opening balance and every entry of the book.
///
/// Entries are ordered by date, then creation time, before balances are
/// accumulated. The report is always recomputed from the full list.
pub fn compute_ledger_report(
    opening_balance: BigDecimal,
    entries: Vec<LedgerEntry>,
) -> BillingResult<LedgerReport> {
    for entry in &entries {
        entry.validate()?;
    }

    let mut running = opening_balance.clone();
    let mut total_debit = BigDecimal::from(0);
    let mut total_credit = BigDecimal::from(0);

    let lines: Vec<LedgerLine> = assign_display_numbers(entries)
        .into_iter()
        .map(|ranked| {
            total_debit += &ranked.entry.debit;
            total_credit += &ranked.entry.credit;
            running += ranked.entry.net();
            LedgerLine {
                display_number: ranked.display_number,
                entry: ranked.entry,
                running_balance: running.clone(),
            }
        })
        .collect();

    let closing_balance = &opening_balance + &total_debit - &total_credit;

    debug!(
        entries = lines.len(),
        %total_debit,
        %total_credit,
        %closing_balance,
        "recomputed ledger report"
    );

    Ok(LedgerReport {
        opening_balance,
        lines,
        total_debit,
        total_credit,
        closing_balance,
    })
}
