//! # Billing Core
//!
//! Billing and bookkeeping library for a small Indian business: GST
//! invoices, cash and bank books, a monthly invoice register, CSV export
//! and amounts in words.
//!
//! ## Features
//!
//! - **GST invoicing**: Intra-state CGST/SGST split with exact decimal totals
//! - **Cash and bank books**: Voucher numbering and running Dr/Cr balances
//! - **Monthly register**: Invoices grouped by month with per-month closing balances
//! - **Export**: Filtered invoice register as CSV
//! - **Amounts in words**: Indian numbering with crore, lakh and paise
//! - **Storage abstraction**: Database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use billing_core::{compute_ledger_report, number_to_words, BalanceSide, LedgerEntryDraft, VoucherType};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
//! let entry = LedgerEntryDraft {
//!     date,
//!     particulars: "Counter sale".to_string(),
//!     voucher_type: VoucherType::Receipt,
//!     amount: BigDecimal::from(500),
//! }
//! .into_entry("e1".to_string(), 1, date.and_hms_opt(9, 0, 0).unwrap())
//! .unwrap();
//!
//! let report = compute_ledger_report(BigDecimal::from(1000), vec![entry]).unwrap();
//! assert_eq!(report.closing_balance, BigDecimal::from(1500));
//! assert_eq!(report.closing_side(), BalanceSide::Dr);
//!
//! assert_eq!(number_to_words(&BigDecimal::from(100000)).unwrap(), "One Lakh Only");
//! ```

pub mod billing;
pub mod config;
pub mod ledger;
pub mod report;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;
pub mod words;

// Re-export commonly used types
pub use billing::*;
pub use config::*;
pub use ledger::*;
pub use report::*;
pub use tax::gst::*;
pub use traits::*;
pub use types::*;
pub use words::*;
