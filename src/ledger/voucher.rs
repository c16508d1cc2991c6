//! Voucher numbering for cash/bank entries and invoices
//!
//! Two schemes coexist. The stored voucher number is assigned once, when an
//! entry is created, from the number of rows already in the book. The display
//! number is a re-rank of the entries in chronological order and is never
//! persisted.

use serde::{Deserialize, Serialize};

use crate::types::LedgerEntry;

/// Next stored voucher number for a book holding `existing_count` rows
pub fn next_voucher_number(existing_count: u64) -> u64 {
    existing_count + 1
}

/// Next voucher number when the row count may be unavailable; an unknown count reads as zero
pub fn next_voucher_number_or_first(existing_count: Option<u64>) -> u64 {
    next_voucher_number(existing_count.unwrap_or(0))
}

/// Voucher number for a saved entry: edits keep the stored number, new entries take the next one
pub fn resolve_voucher_number(existing: Option<&LedgerEntry>, existing_count: u64) -> u64 {
    match existing {
        Some(entry) => entry.voucher_number,
        None => next_voucher_number(existing_count),
    }
}

/// Sort entries by date, then creation time; entries equal on both keep their input order
pub fn sort_chronologically(entries: &mut [LedgerEntry]) {
    entries.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

/// Entry paired with its display-time voucher number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// 1-based rank in chronological order
    pub display_number: u64,
    pub entry: LedgerEntry,
}

/// Rank entries chronologically, leaving their stored voucher numbers untouched
pub fn assign_display_numbers(mut entries: Vec<LedgerEntry>) -> Vec<RankedEntry> {
    sort_chronologically(&mut entries);
    entries
        .into_iter()
        .zip(1u64..)
        .map(|(entry, display_number)| RankedEntry {
            display_number,
            entry,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VoucherType;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn entry(id: &str, day: u32, hour: u32, voucher_number: u64) -> LedgerEntry {
        LedgerEntry {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            voucher_type: VoucherType::Payment,
            voucher_number,
            particulars: format!("Entry {}", id),
            debit: BigDecimal::from(0),
            credit: BigDecimal::from(100),
            created_at: NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_next_voucher_number() {
        assert_eq!(next_voucher_number(0), 1);
        assert_eq!(next_voucher_number(41), 42);
        assert_eq!(next_voucher_number_or_first(None), 1);
        assert_eq!(next_voucher_number_or_first(Some(7)), 8);
    }

    #[test]
    fn test_edit_keeps_stored_number() {
        let existing = entry("a", 5, 9, 3);
        assert_eq!(resolve_voucher_number(Some(&existing), 10), 3);
        assert_eq!(resolve_voucher_number(None, 10), 11);
    }

    #[test]
    fn test_display_numbers_follow_date_then_creation() {
        // Inserted out of date order: stored numbers reflect insertion
        let entries = vec![
            entry("late", 20, 8, 1),
            entry("early_second", 3, 11, 2),
            entry("early_first", 3, 10, 3),
        ];

        let ranked = assign_display_numbers(entries);
        let order: Vec<(&str, u64, u64)> = ranked
            .iter()
            .map(|r| (r.entry.id.as_str(), r.display_number, r.entry.voucher_number))
            .collect();

        assert_eq!(
            order,
            vec![("early_first", 1, 3), ("early_second", 2, 2), ("late", 3, 1)]
        );
    }

    #[test]
    fn test_empty_book_ranks_nothing() {
        assert!(assign_display_numbers(Vec::new()).is_empty());
    }
}
