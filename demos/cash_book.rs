//! Cash book and bank book example

use billing_core::utils::{format_amount, format_display_date, MemoryStore};
use billing_core::{Billing, LedgerBook, LedgerEntryDraft, VoucherType};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("📒 Billing Core - Cash Book Example\n");

    let mut billing = Billing::new(MemoryStore::new());

    // 1. Opening balances
    billing
        .set_opening_balance(LedgerBook::Cash, BigDecimal::from(1000))
        .await?;
    billing
        .set_opening_balance(LedgerBook::Bank, BigDecimal::from(25000))
        .await?;

    // 2. Record vouchers out of date order
    println!("💰 Recording vouchers...");
    let vouchers = [
        (LedgerBook::Cash, 5, VoucherType::Receipt, "Counter sale", 500),
        (LedgerBook::Cash, 2, VoucherType::Payment, "Tea and snacks", 200),
        (LedgerBook::Cash, 9, VoucherType::Receipt, "Walk-in print job", 100),
        (LedgerBook::Bank, 3, VoucherType::BankPayment, "Vinyl roll supplier", 18000),
        (LedgerBook::Bank, 7, VoucherType::BankReceipt, "Acme Traders", 4500),
    ];

    for (book, day, voucher_type, particulars, amount) in vouchers {
        let entry = billing
            .record_entry(
                book,
                LedgerEntryDraft {
                    date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                    particulars: particulars.to_string(),
                    voucher_type,
                    amount: BigDecimal::from(amount),
                },
            )
            .await?;
        println!(
            "  ✓ {:?} #{} {} - {}",
            book,
            entry.voucher_number,
            voucher_type.label(),
            particulars
        );
    }
    println!();

    // 3. Print both books
    for book in [LedgerBook::Cash, LedgerBook::Bank] {
        let report = billing.ledger_report(book).await?;
        println!("📊 {:?} Book", book);
        println!("  Opening Balance: ₹{}", format_amount(&report.opening_balance));
        for line in &report.lines {
            println!(
                "  {:>3}  {}  {:<22} Dr {:>10}  Cr {:>10}  Bal {:>10}",
                line.display_number,
                format_display_date(line.entry.date),
                line.entry.particulars,
                format_amount(&line.entry.debit),
                format_amount(&line.entry.credit),
                format_amount(&line.running_balance)
            );
        }
        println!("  Closing Balance: ₹{}\n", report.closing_label());
    }

    println!("🎉 Example completed successfully!");
    Ok(())
}
