//! GST invoice example

use billing_core::utils::{format_amount, MemoryStore};
use billing_core::{
    Billing, CompanyProfile, Customer, ExportFilter, Invoice, LineItem, Role, RollupFilter,
    Session,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 Billing Core - GST Invoice Example\n");

    let mut billing = Billing::new(MemoryStore::new());
    let admin = Session::new("owner".to_string(), Role::Admin);

    billing
        .update_company_profile(
            &admin,
            CompanyProfile {
                name: "Metro Digital Prints".to_string(),
                address: "Palarivattom, Kochi".to_string(),
                gstin: Some("32AAAAA0000A1Z5".to_string()),
                phone: Some("0484 000000".to_string()),
                state: "Kerala".to_string(),
                state_code: 32,
                bank_details: None,
            },
        )
        .await?;

    let customer = billing
        .save_customer(Customer {
            id: String::new(),
            company_name: "Acme Traders".to_string(),
            address: "MG Road, Kochi".to_string(),
            gstin: Some("32ABCDE1234F1Z5".to_string()),
            phone: None,
            state: String::new(),
            state_code: 0,
            place_of_supply: String::new(),
        })
        .await?;

    // 1. Build and save a GST invoice
    let mut invoice = Invoice::new(
        String::new(),
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        "MD/01".to_string(),
        customer.id.clone(),
    );
    invoice.is_gst_bill = true;
    invoice.add_line_item(LineItem::new(
        "Flex Banner".to_string(),
        "4911".to_string(),
        BigDecimal::from(2),
        BigDecimal::from(500),
        "NOS".to_string(),
    ));
    invoice.add_line_item(
        LineItem::new(
            "Vinyl Lettering".to_string(),
            "3919".to_string(),
            BigDecimal::from(30),
            BigDecimal::from(10),
            "SQFT".to_string(),
        )
        .with_subheading("Shop front".to_string()),
    );

    let saved = billing.save_invoice(invoice).await?;

    // 2. Print view
    let view = billing.print_view(&saved.id).await?;
    println!("📄 Tax Invoice {} for {}", view.invoice.invoice_number, view.customer.company_name);
    for item in &view.invoice.line_items {
        println!(
            "  {:<18} {:>6} {:<5} @ ₹{:>8} = ₹{:>10}",
            item.description,
            item.quantity,
            item.unit,
            format_amount(&item.rate),
            format_amount(&item.taxable_value)
        );
    }
    println!("  Taxable Value: ₹{}", format_amount(&view.totals.taxable_total));
    println!("  CGST (9%):     ₹{}", format_amount(&view.totals.cgst));
    println!("  SGST (9%):     ₹{}", format_amount(&view.totals.sgst));
    println!("  Grand Total:   ₹{}", format_amount(&view.totals.grand_total));
    println!("  Amount in words: {}", view.amount_in_words);
    println!("  Tax in words:    {}", view.tax_in_words);
    println!();

    // 3. Register and export
    let rollup = billing.monthly_rollup(&RollupFilter::default()).await?;
    let year = rollup.resolve_selected_year(Some(2023)).unwrap_or(2024);
    println!("📆 Register for {}", year);
    for group in rollup.groups_for_year(year) {
        println!(
            "📅 {}: {} invoice(s), closing ₹{}",
            group.month_key,
            group.invoices.len(),
            format_amount(&group.closing_balance)
        );
    }

    let export = billing
        .export_csv(
            &ExportFilter::default(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .await?;
    println!("\n📤 {} ({} rows)\n{}", export.file_name, export.row_count, export.content);

    println!("🎉 Example completed successfully!");
    Ok(())
}
