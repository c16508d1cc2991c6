//! In-memory storage implementation for testing

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::tax::gst::InvoiceItemRecord;
use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    invoices: Arc<RwLock<Vec<Invoice>>>,
    invoice_items: Arc<RwLock<Vec<InvoiceItemRecord>>>,
    customers: Arc<RwLock<Vec<Customer>>>,
    products: Arc<RwLock<Vec<Product>>>,
    cash_book: Arc<RwLock<Vec<LedgerEntry>>>,
    bank_book: Arc<RwLock<Vec<LedgerEntry>>>,
    settings: Arc<RwLock<HashMap<String, BigDecimal>>>,
    users: Arc<RwLock<Vec<AppUser>>>,
    company: Arc<RwLock<Option<CompanyProfile>>>,
    count_unavailable: Arc<AtomicBool>,
}

fn read<T>(lock: &RwLock<T>) -> BillingResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| BillingError::Storage("lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> BillingResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| BillingError::Storage("lock poisoned".to_string()))
}

/// Replace the row with a matching key or append it
fn upsert<T: Clone>(rows: &mut Vec<T>, row: &T, same: impl Fn(&T) -> bool) {
    match rows.iter_mut().find(|r| same(r)) {
        Some(existing) => *existing = row.clone(),
        None => rows.push(row.clone()),
    }
}

/// Remove the row with a matching key, failing when there is none
fn remove<T>(rows: &mut Vec<T>, what: &str, id: &str, same: impl Fn(&T) -> bool) -> BillingResult<()> {
    let before = rows.len();
    rows.retain(|r| !same(r));
    if rows.len() == before {
        return Err(BillingError::NotFound(format!("{} '{}'", what, id)));
    }
    Ok(())
}

impl MemoryStore {
    /// Create a new memory store instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Make row counts fail, as a dropped connection would
    pub fn set_count_unavailable(&self, unavailable: bool) {
        self.count_unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn book(&self, book: LedgerBook) -> &RwLock<Vec<LedgerEntry>> {
        match book {
            LedgerBook::Cash => &self.cash_book,
            LedgerBook::Bank => &self.bank_book,
        }
    }

    fn join_party(&self, mut invoice: Invoice) -> BillingResult<Invoice> {
        if let Some(customer) = read(&self.customers)?
            .iter()
            .find(|c| c.id == invoice.customer_id)
        {
            invoice.party = Some(customer.as_party());
        }
        Ok(invoice)
    }
}

#[async_trait]
impl BillingStore for MemoryStore {
    async fn save_invoice(
        &mut self,
        invoice: &Invoice,
        items: &[InvoiceItemRecord],
    ) -> BillingResult<()> {
        upsert(&mut *write(&self.invoices)?, invoice, |i| i.id == invoice.id);

        let mut stored = write(&self.invoice_items)?;
        stored.retain(|item| item.invoice_id != invoice.id);
        stored.extend(items.iter().cloned());
        Ok(())
    }

    async fn get_invoice(&self, invoice_id: &str) -> BillingResult<Option<Invoice>> {
        let found = read(&self.invoices)?
            .iter()
            .find(|i| i.id == invoice_id)
            .cloned();
        found.map(|inv| self.join_party(inv)).transpose()
    }

    async fn get_invoice_items(&self, invoice_id: &str) -> BillingResult<Vec<InvoiceItemRecord>> {
        Ok(read(&self.invoice_items)?
            .iter()
            .filter(|item| item.invoice_id == invoice_id)
            .cloned()
            .collect())
    }

    async fn list_invoices(&self) -> BillingResult<Vec<Invoice>> {
        let invoices = read(&self.invoices)?.clone();
        invoices
            .into_iter()
            .map(|inv| self.join_party(inv))
            .collect()
    }

    async fn delete_invoice(&mut self, invoice_id: &str) -> BillingResult<()> {
        remove(&mut *write(&self.invoices)?, "Invoice", invoice_id, |i| {
            i.id == invoice_id
        })?;
        write(&self.invoice_items)?.retain(|item| item.invoice_id != invoice_id);
        Ok(())
    }

    async fn save_customer(&mut self, customer: &Customer) -> BillingResult<()> {
        upsert(&mut *write(&self.customers)?, customer, |c| c.id == customer.id);
        Ok(())
    }

    async fn get_customer(&self, customer_id: &str) -> BillingResult<Option<Customer>> {
        Ok(read(&self.customers)?
            .iter()
            .find(|c| c.id == customer_id)
            .cloned())
    }

    async fn list_customers(&self) -> BillingResult<Vec<Customer>> {
        Ok(read(&self.customers)?.clone())
    }

    async fn delete_customer(&mut self, customer_id: &str) -> BillingResult<()> {
        remove(&mut *write(&self.customers)?, "Customer", customer_id, |c| {
            c.id == customer_id
        })
    }

    async fn save_product(&mut self, product: &Product) -> BillingResult<()> {
        upsert(&mut *write(&self.products)?, product, |p| p.id == product.id);
        Ok(())
    }

    async fn list_products(&self) -> BillingResult<Vec<Product>> {
        Ok(read(&self.products)?.clone())
    }

    async fn delete_product(&mut self, product_id: &str) -> BillingResult<()> {
        remove(&mut *write(&self.products)?, "Product", product_id, |p| {
            p.id == product_id
        })
    }

    async fn count_entries(&self, book: LedgerBook) -> BillingResult<u64> {
        if self.count_unavailable.load(Ordering::SeqCst) {
            return Err(BillingError::Storage("count unavailable".to_string()));
        }
        Ok(read(self.book(book))?.len() as u64)
    }

    async fn insert_entry(&mut self, book: LedgerBook, entry: &LedgerEntry) -> BillingResult<()> {
        let mut rows = write(self.book(book))?;
        if rows.iter().any(|e| e.id == entry.id) {
            return Err(BillingError::Storage(format!(
                "Entry '{}' already exists",
                entry.id
            )));
        }
        rows.push(entry.clone());
        Ok(())
    }

    async fn update_entry(&mut self, book: LedgerBook, entry: &LedgerEntry) -> BillingResult<()> {
        let mut rows = write(self.book(book))?;
        match rows.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => {
                *existing = entry.clone();
                Ok(())
            }
            None => Err(BillingError::NotFound(format!("Entry '{}'", entry.id))),
        }
    }

    async fn get_entry(
        &self,
        book: LedgerBook,
        entry_id: &str,
    ) -> BillingResult<Option<LedgerEntry>> {
        Ok(read(self.book(book))?
            .iter()
            .find(|e| e.id == entry_id)
            .cloned())
    }

    async fn list_entries(&self, book: LedgerBook) -> BillingResult<Vec<LedgerEntry>> {
        Ok(read(self.book(book))?.clone())
    }

    async fn delete_entry(&mut self, book: LedgerBook, entry_id: &str) -> BillingResult<()> {
        remove(&mut *write(self.book(book))?, "Entry", entry_id, |e| {
            e.id == entry_id
        })
    }

    async fn get_setting(&self, key: &str) -> BillingResult<Option<BigDecimal>> {
        Ok(read(&self.settings)?.get(key).cloned())
    }

    async fn set_setting(&mut self, key: &str, value: &BigDecimal) -> BillingResult<()> {
        write(&self.settings)?.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn list_users(&self) -> BillingResult<Vec<AppUser>> {
        Ok(read(&self.users)?.clone())
    }

    async fn save_user(&mut self, user: &AppUser) -> BillingResult<()> {
        upsert(&mut *write(&self.users)?, user, |u| u.id == user.id);
        Ok(())
    }

    async fn delete_user(&mut self, user_id: &str) -> BillingResult<()> {
        remove(&mut *write(&self.users)?, "User", user_id, |u| u.id == user_id)
    }

    async fn get_company(&self) -> BillingResult<Option<CompanyProfile>> {
        Ok(read(&self.company)?.clone())
    }

    async fn save_company(&mut self, company: &CompanyProfile) -> BillingResult<()> {
        *write(&self.company)? = Some(company.clone());
        Ok(())
    }
}
