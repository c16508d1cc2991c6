//! Billing orchestrator that wires the pure calculators to a storage backend

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::BillingConfig;
use crate::ledger::book::{compute_ledger_report, LedgerReport};
use crate::ledger::voucher::{next_voucher_number, next_voucher_number_or_first};
use crate::report::export::{export_invoices, ExportFile, ExportFilter};
use crate::report::monthly::{compute_monthly_rollup_with, MonthlyRollup, RollupFilter};
use crate::tax::gst::{GstCalculator, InvoiceTotals};
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::*;
use crate::words::{invoice_amount_in_words, tax_amount_in_words};

/// Outcome of saving an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedInvoice {
    pub id: String,
    pub totals: InvoiceTotals,
}

/// Everything the printed invoice shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintView {
    pub invoice: Invoice,
    pub customer: Customer,
    pub company: CompanyProfile,
    pub totals: InvoiceTotals,
    /// Grand total in words, rounded to whole rupees
    pub amount_in_words: String,
    /// CGST + SGST in words; empty on non-GST bills
    pub tax_in_words: String,
    /// Whether tax and HSN/SAC columns are printed
    pub show_gst: bool,
}

/// Main billing system that orchestrates invoices, books and master data
pub struct Billing<S: BillingStore> {
    store: S,
    config: BillingConfig,
    calculator: GstCalculator,
}

impl<S: BillingStore> Billing<S> {
    /// Create a billing system with the default configuration
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: BillingConfig::default(),
            calculator: GstCalculator::default(),
        }
    }

    /// Create a billing system with a custom configuration
    pub fn with_config(store: S, config: BillingConfig) -> BillingResult<Self> {
        config.validate()?;
        let calculator = GstCalculator::from_config(&config)?;
        Ok(Self {
            store,
            config,
            calculator,
        })
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // Cash and bank books

    /// Voucher number for the next new entry of a book.
    ///
    /// Counts every row of the book regardless of voucher type. If the count
    /// cannot be read the book is treated as empty.
    pub async fn next_voucher_number(&self, book: LedgerBook) -> u64 {
        match self.store.count_entries(book).await {
            Ok(count) => next_voucher_number(count),
            Err(e) => {
                warn!(?book, error = %e, "could not count entries, numbering from 1");
                next_voucher_number_or_first(None)
            }
        }
    }

    fn check_voucher_type(book: LedgerBook, voucher_type: VoucherType) -> BillingResult<()> {
        if !book.accepts(voucher_type) {
            return Err(BillingError::Validation(format!(
                "Voucher type '{}' does not belong to the {:?} book",
                voucher_type.label(),
                book
            )));
        }
        Ok(())
    }

    /// Record a new entry with the next stored voucher number
    pub async fn record_entry(
        &mut self,
        book: LedgerBook,
        draft: LedgerEntryDraft,
    ) -> BillingResult<LedgerEntry> {
        Self::check_voucher_type(book, draft.voucher_type)?;

        let voucher_number = self.next_voucher_number(book).await;
        let entry = draft.into_entry(
            Uuid::new_v4().to_string(),
            voucher_number,
            chrono::Utc::now().naive_utc(),
        )?;
        self.store.insert_entry(book, &entry).await?;

        info!(?book, id = %entry.id, voucher_number, "recorded ledger entry");
        Ok(entry)
    }

    /// Edit an entry; its stored voucher number and creation time are kept
    pub async fn update_entry(
        &mut self,
        book: LedgerBook,
        entry_id: &str,
        draft: LedgerEntryDraft,
    ) -> BillingResult<LedgerEntry> {
        Self::check_voucher_type(book, draft.voucher_type)?;

        let existing = self
            .store
            .get_entry(book, entry_id)
            .await?
            .ok_or_else(|| BillingError::NotFound(format!("Entry '{}'", entry_id)))?;

        let entry = draft.into_entry(existing.id, existing.voucher_number, existing.created_at)?;
        self.store.update_entry(book, &entry).await?;

        info!(?book, id = %entry.id, "updated ledger entry");
        Ok(entry)
    }

    /// Delete an entry
    pub async fn delete_entry(&mut self, book: LedgerBook, entry_id: &str) -> BillingResult<()> {
        self.store.delete_entry(book, entry_id).await?;
        info!(?book, id = %entry_id, "deleted ledger entry");
        Ok(())
    }

    /// Opening balance of a book; zero when never set
    pub async fn opening_balance(&self, book: LedgerBook) -> BillingResult<BigDecimal> {
        Ok(self
            .store
            .get_setting(self.config.opening_key(book))
            .await?
            .unwrap_or_else(|| BigDecimal::from(0)))
    }

    /// Persist a new opening balance for a book
    pub async fn set_opening_balance(
        &mut self,
        book: LedgerBook,
        amount: BigDecimal,
    ) -> BillingResult<()> {
        let key = self.config.opening_key(book).to_string();
        self.store.set_setting(&key, &amount).await?;
        info!(?book, %amount, "updated opening balance");
        Ok(())
    }

    /// Ledger report over the whole book
    pub async fn ledger_report(&self, book: LedgerBook) -> BillingResult<LedgerReport> {
        let opening = self.opening_balance(book).await?;
        let entries = self.store.list_entries(book).await?;
        compute_ledger_report(opening, entries)
    }

    // Invoices

    /// Totals for an invoice at the configured rate
    pub fn invoice_totals(&self, invoice: &Invoice) -> InvoiceTotals {
        self.calculator
            .totals(&invoice.line_items, invoice.is_gst_bill)
    }

    /// Save a new invoice or replace an existing one.
    ///
    /// Totals and per-line tax fields are always recomputed from the line
    /// items. Stored items of an edited invoice are replaced wholesale.
    pub async fn save_invoice(&mut self, mut invoice: Invoice) -> BillingResult<SavedInvoice> {
        validate_invoice(&invoice)?;
        for item in &mut invoice.line_items {
            item.taxable_value = &item.quantity * &item.rate;
            if item.unit.trim().is_empty() {
                item.unit = self.config.default_unit.clone();
            }
        }
        if invoice.id.trim().is_empty() {
            invoice.id = Uuid::new_v4().to_string();
        }
        invoice.party = None;

        let totals = self.invoice_totals(&invoice);
        let items = self
            .calculator
            .item_records(&invoice.id, &invoice.line_items, invoice.is_gst_bill);
        self.store.save_invoice(&invoice, &items).await?;

        info!(
            id = %invoice.id,
            number = %invoice.invoice_number,
            grand_total = %totals.grand_total,
            "saved invoice"
        );
        Ok(SavedInvoice {
            id: invoice.id,
            totals,
        })
    }

    /// Load an invoice with its line items rebuilt from the stored item records
    pub async fn load_invoice(&self, invoice_id: &str) -> BillingResult<Invoice> {
        let mut invoice = self
            .store
            .get_invoice(invoice_id)
            .await?
            .ok_or_else(|| BillingError::NotFound(format!("Invoice '{}'", invoice_id)))?;
        let items = self.store.get_invoice_items(invoice_id).await?;
        invoice.line_items = items.iter().map(|r| r.to_line_item()).collect();
        Ok(invoice)
    }

    pub async fn delete_invoice(&mut self, invoice_id: &str) -> BillingResult<()> {
        self.store.delete_invoice(invoice_id).await?;
        info!(id = %invoice_id, "deleted invoice");
        Ok(())
    }

    /// Every stored invoice with its line items rebuilt from the stored item records
    async fn list_invoices_with_items(&self) -> BillingResult<Vec<Invoice>> {
        let mut invoices = self.store.list_invoices().await?;
        for invoice in &mut invoices {
            let items = self.store.get_invoice_items(&invoice.id).await?;
            invoice.line_items = items.iter().map(|r| r.to_line_item()).collect();
        }
        Ok(invoices)
    }

    /// Invoice history, newest first, filtered by type and by an
    /// invoice-number or party-name search
    pub async fn invoice_history(
        &self,
        invoice_type: Option<InvoiceType>,
        search: &str,
    ) -> BillingResult<Vec<Invoice>> {
        let term = search.trim().to_lowercase();
        let mut invoices = self.store.list_invoices().await?;
        invoices.reverse();
        invoices.retain(|inv| {
            invoice_type.is_none_or(|t| inv.effective_type() == t)
                && (inv.invoice_number.to_lowercase().contains(&term)
                    || inv.party_name().to_lowercase().contains(&term))
        });
        debug!(matches = invoices.len(), "filtered invoice history");
        Ok(invoices)
    }

    /// Monthly register over every stored invoice, at the configured rate
    pub async fn monthly_rollup(&self, filter: &RollupFilter) -> BillingResult<MonthlyRollup> {
        let invoices = self.list_invoices_with_items().await?;
        Ok(compute_monthly_rollup_with(&invoices, filter, &self.calculator))
    }

    /// CSV export of matching invoices, named for `today`
    pub async fn export_csv(
        &self,
        filter: &ExportFilter,
        today: NaiveDate,
    ) -> BillingResult<ExportFile> {
        let invoices = self.list_invoices_with_items().await?;
        export_invoices(
            &invoices,
            filter,
            &self.calculator,
            &self.config.export_file_prefix,
            today,
        )
    }

    /// Data for the printed invoice
    pub async fn print_view(&self, invoice_id: &str) -> BillingResult<PrintView> {
        let invoice = self.load_invoice(invoice_id).await?;
        let customer = self
            .store
            .get_customer(&invoice.customer_id)
            .await?
            .ok_or_else(|| BillingError::NotFound(format!("Customer '{}'", invoice.customer_id)))?;
        let company = self
            .store
            .get_company()
            .await?
            .ok_or_else(|| BillingError::NotFound("Company profile".to_string()))?;

        let totals = self.invoice_totals(&invoice);
        let amount_in_words = invoice_amount_in_words(&totals.grand_total)?;
        let tax_in_words = tax_amount_in_words(&totals.cgst, &totals.sgst)?;

        Ok(PrintView {
            show_gst: invoice.is_gst_bill,
            invoice,
            customer,
            company,
            totals,
            amount_in_words,
            tax_in_words,
        })
    }

    // Master data

    /// Add or edit a customer; blank IDs get a fresh one and blank state fields the configured defaults
    pub async fn save_customer(&mut self, mut customer: Customer) -> BillingResult<Customer> {
        validate_customer(&customer)?;
        if customer.id.trim().is_empty() {
            customer.id = Uuid::new_v4().to_string();
        }
        if customer.state.trim().is_empty() {
            customer.state = self.config.default_state.clone();
            customer.state_code = self.config.default_state_code;
        }
        if customer.place_of_supply.trim().is_empty() {
            customer.place_of_supply = self.config.default_place_of_supply.clone();
        }
        self.store.save_customer(&customer).await?;
        info!(id = %customer.id, name = %customer.company_name, "saved customer");
        Ok(customer)
    }

    pub async fn list_customers(&self) -> BillingResult<Vec<Customer>> {
        self.store.list_customers().await
    }

    pub async fn delete_customer(&mut self, customer_id: &str) -> BillingResult<()> {
        self.store.delete_customer(customer_id).await
    }

    /// Add or edit a product; a blank unit takes the configured default
    pub async fn save_product(&mut self, mut product: Product) -> BillingResult<Product> {
        validate_product(&product)?;
        if product.id.trim().is_empty() {
            product.id = Uuid::new_v4().to_string();
        }
        if product.unit.trim().is_empty() {
            product.unit = self.config.default_unit.clone();
        }
        self.store.save_product(&product).await?;
        info!(id = %product.id, name = %product.item_name, "saved product");
        Ok(product)
    }

    pub async fn list_products(&self) -> BillingResult<Vec<Product>> {
        self.store.list_products().await
    }

    /// Product with the given name, for prefilling a line
    pub async fn find_product(&self, item_name: &str) -> BillingResult<Option<Product>> {
        Ok(self
            .store
            .list_products()
            .await?
            .into_iter()
            .find(|p| p.item_name == item_name))
    }

    pub async fn delete_product(&mut self, product_id: &str) -> BillingResult<()> {
        self.store.delete_product(product_id).await
    }

    pub async fn company_profile(&self) -> BillingResult<Option<CompanyProfile>> {
        self.store.get_company().await
    }

    pub async fn update_company_profile(
        &mut self,
        session: &Session,
        company: CompanyProfile,
    ) -> BillingResult<()> {
        session.require_admin()?;
        validate_required("Company name", &company.name)?;
        self.store.save_company(&company).await
    }

    // Users

    pub async fn list_users(&self, session: &Session) -> BillingResult<Vec<AppUser>> {
        session.require_admin()?;
        self.store.list_users().await
    }

    /// Create a user; only administrators may do so
    pub async fn add_user(
        &mut self,
        session: &Session,
        username: String,
        role: Role,
    ) -> BillingResult<AppUser> {
        session.require_admin()?;
        let user = AppUser {
            id: Uuid::new_v4().to_string(),
            username,
            role,
        };
        validate_user(&user)?;

        if self
            .store
            .list_users()
            .await?
            .iter()
            .any(|u| u.username == user.username)
        {
            return Err(BillingError::Validation(format!(
                "User '{}' already exists",
                user.username
            )));
        }

        self.store.save_user(&user).await?;
        info!(by = %session.username, user = %user.username, "added user");
        Ok(user)
    }

    pub async fn remove_user(&mut self, session: &Session, user_id: &str) -> BillingResult<()> {
        session.require_admin()?;
        self.store.delete_user(user_id).await?;
        info!(by = %session.username, id = %user_id, "removed user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStore;

    fn draft(day: u32, voucher_type: VoucherType, amount: i64) -> LedgerEntryDraft {
        LedgerEntryDraft {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            particulars: "Counter sale".to_string(),
            voucher_type,
            amount: BigDecimal::from(amount),
        }
    }

    #[tokio::test]
    async fn test_voucher_numbers_are_global_per_book() {
        let mut billing = Billing::new(MemoryStore::new());

        let first = billing
            .record_entry(LedgerBook::Cash, draft(5, VoucherType::Receipt, 100))
            .await
            .unwrap();
        let second = billing
            .record_entry(LedgerBook::Cash, draft(2, VoucherType::Payment, 40))
            .await
            .unwrap();
        let bank = billing
            .record_entry(LedgerBook::Bank, draft(1, VoucherType::BankReceipt, 900))
            .await
            .unwrap();

        assert_eq!(first.voucher_number, 1);
        assert_eq!(second.voucher_number, 2);
        assert_eq!(bank.voucher_number, 1);
    }

    #[tokio::test]
    async fn test_count_failure_numbers_from_one() {
        let store = MemoryStore::new();
        let mut billing = Billing::new(store.clone());
        billing
            .record_entry(LedgerBook::Cash, draft(1, VoucherType::Receipt, 10))
            .await
            .unwrap();

        store.set_count_unavailable(true);
        assert_eq!(billing.next_voucher_number(LedgerBook::Cash).await, 1);
    }

    #[tokio::test]
    async fn test_wrong_book_voucher_type() {
        let mut billing = Billing::new(MemoryStore::new());
        let result = billing
            .record_entry(LedgerBook::Bank, draft(1, VoucherType::Receipt, 10))
            .await;
        assert!(matches!(result, Err(BillingError::Validation(_))));
    }

    #[tokio::test]
    async fn test_opening_balance_defaults_to_zero() {
        let mut billing = Billing::new(MemoryStore::new());
        assert_eq!(
            billing.opening_balance(LedgerBook::Bank).await.unwrap(),
            BigDecimal::from(0)
        );

        billing
            .set_opening_balance(LedgerBook::Bank, BigDecimal::from(5000))
            .await
            .unwrap();
        assert_eq!(
            billing.opening_balance(LedgerBook::Bank).await.unwrap(),
            BigDecimal::from(5000)
        );
        assert_eq!(
            billing.opening_balance(LedgerBook::Cash).await.unwrap(),
            BigDecimal::from(0)
        );
    }

    #[tokio::test]
    async fn test_save_invoice_requires_items() {
        let mut billing = Billing::new(MemoryStore::new());
        let invoice = Invoice::new(
            String::new(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "MD/01".to_string(),
            "c1".to_string(),
        );
        assert!(matches!(
            billing.save_invoice(invoice).await,
            Err(BillingError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_user_management_requires_admin() {
        let mut billing = Billing::new(MemoryStore::new());
        let admin = Session::new("owner".to_string(), Role::Admin);
        let clerk = Session::new("clerk".to_string(), Role::User);

        let user = billing
            .add_user(&admin, "clerk".to_string(), Role::User)
            .await
            .unwrap();
        assert!(matches!(
            billing.add_user(&admin, "clerk".to_string(), Role::User).await,
            Err(BillingError::Validation(_))
        ));
        assert!(matches!(
            billing.list_users(&clerk).await,
            Err(BillingError::Unauthorized(_))
        ));
        assert!(matches!(
            billing.remove_user(&clerk, &user.id).await,
            Err(BillingError::Unauthorized(_))
        ));

        billing.remove_user(&admin, &user.id).await.unwrap();
        assert!(billing.list_users(&admin).await.unwrap().is_empty());
    }
}
