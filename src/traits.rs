//! Traits for storage abstraction

use async_trait::async_trait;
use bigdecimal::BigDecimal;

use crate::tax::gst::InvoiceItemRecord;
use crate::types::*;

/// Storage abstraction for the billing system
///
/// The billing core owns no schema. A hosted database, SQLite, or the
/// in-memory store used in tests can back it by implementing these methods.
/// Every listing returns rows in insertion order.
#[async_trait]
pub trait BillingStore: Send + Sync {
    /// Insert an invoice or replace the one with the same ID, along with all of its items
    async fn save_invoice(
        &mut self,
        invoice: &Invoice,
        items: &[InvoiceItemRecord],
    ) -> BillingResult<()>;

    /// Get an invoice by ID, with the customer joined in when known
    async fn get_invoice(&self, invoice_id: &str) -> BillingResult<Option<Invoice>>;

    /// Stored item records of an invoice
    async fn get_invoice_items(&self, invoice_id: &str) -> BillingResult<Vec<InvoiceItemRecord>>;

    /// List all invoice headers with customers joined in.
    ///
    /// Line items may be left empty; reports rebuild them from
    /// [`get_invoice_items`](Self::get_invoice_items).
    async fn list_invoices(&self) -> BillingResult<Vec<Invoice>>;

    /// Delete an invoice and its items
    async fn delete_invoice(&mut self, invoice_id: &str) -> BillingResult<()>;

    /// Insert or replace a customer
    async fn save_customer(&mut self, customer: &Customer) -> BillingResult<()>;

    async fn get_customer(&self, customer_id: &str) -> BillingResult<Option<Customer>>;

    async fn list_customers(&self) -> BillingResult<Vec<Customer>>;

    async fn delete_customer(&mut self, customer_id: &str) -> BillingResult<()>;

    /// Insert or replace a product
    async fn save_product(&mut self, product: &Product) -> BillingResult<()>;

    async fn list_products(&self) -> BillingResult<Vec<Product>>;

    async fn delete_product(&mut self, product_id: &str) -> BillingResult<()>;

    /// Number of rows in a book, across all voucher types
    async fn count_entries(&self, book: LedgerBook) -> BillingResult<u64>;

    async fn insert_entry(&mut self, book: LedgerBook, entry: &LedgerEntry) -> BillingResult<()>;

    async fn update_entry(&mut self, book: LedgerBook, entry: &LedgerEntry) -> BillingResult<()>;

    async fn get_entry(&self, book: LedgerBook, entry_id: &str)
        -> BillingResult<Option<LedgerEntry>>;

    async fn list_entries(&self, book: LedgerBook) -> BillingResult<Vec<LedgerEntry>>;

    async fn delete_entry(&mut self, book: LedgerBook, entry_id: &str) -> BillingResult<()>;

    /// Numeric value from the ledger settings store
    async fn get_setting(&self, key: &str) -> BillingResult<Option<BigDecimal>>;

    async fn set_setting(&mut self, key: &str, value: &BigDecimal) -> BillingResult<()>;

    async fn list_users(&self) -> BillingResult<Vec<AppUser>>;

    async fn save_user(&mut self, user: &AppUser) -> BillingResult<()>;

    async fn delete_user(&mut self, user_id: &str) -> BillingResult<()>;

    async fn get_company(&self) -> BillingResult<Option<CompanyProfile>>;

    async fn save_company(&mut self, company: &CompanyProfile) -> BillingResult<()>;
}
