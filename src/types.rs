//! Core types and data structures for the billing system

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::tax::gst::GstError;

/// Kind of invoice recorded in the invoice register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceType {
    /// Outgoing sale to a customer
    Sale,
    /// Incoming purchase bill
    Purchase,
    /// Raw material purchase
    RawMaterials,
    /// Machine maintenance bill
    MachineMaintenance,
}

impl InvoiceType {
    /// Stored/exported representation
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceType::Sale => "SALE",
            InvoiceType::Purchase => "PURCHASE",
            InvoiceType::RawMaterials => "RAW_MATERIALS",
            InvoiceType::MachineMaintenance => "MACHINE_MAINTENANCE",
        }
    }
}

/// How an invoice was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    Credit,
    Cash,
    Bank,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Credit => "CREDIT",
            PaymentMode::Cash => "CASH",
            PaymentMode::Bank => "BANK",
        }
    }
}

/// Which book a ledger entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerBook {
    /// Cash book, voucher types `Payment` / `Receipt`
    Cash,
    /// Bank book, voucher types `Bank Payment` / `Bank Receipt`
    Bank,
}

impl LedgerBook {
    /// Voucher type used for money going out of this book
    pub fn payment_type(&self) -> VoucherType {
        match self {
            LedgerBook::Cash => VoucherType::Payment,
            LedgerBook::Bank => VoucherType::BankPayment,
        }
    }

    /// Voucher type used for money coming into this book
    pub fn receipt_type(&self) -> VoucherType {
        match self {
            LedgerBook::Cash => VoucherType::Receipt,
            LedgerBook::Bank => VoucherType::BankReceipt,
        }
    }

    /// Whether the voucher type may be posted to this book
    pub fn accepts(&self, voucher_type: VoucherType) -> bool {
        voucher_type == self.payment_type() || voucher_type == self.receipt_type()
    }
}

/// Voucher types of the cash and bank books
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoucherType {
    #[serde(rename = "Payment")]
    Payment,
    #[serde(rename = "Receipt")]
    Receipt,
    #[serde(rename = "Bank Payment")]
    BankPayment,
    #[serde(rename = "Bank Receipt")]
    BankReceipt,
}

impl VoucherType {
    /// Receipts are inflows and land on the debit side
    pub fn is_receipt(&self) -> bool {
        matches!(self, VoucherType::Receipt | VoucherType::BankReceipt)
    }

    pub fn label(&self) -> &'static str {
        match self {
            VoucherType::Payment => "Payment",
            VoucherType::Receipt => "Receipt",
            VoucherType::BankPayment => "Bank Payment",
            VoucherType::BankReceipt => "Bank Receipt",
        }
    }
}

/// Single billed line of an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item description (usually the product name)
    pub description: String,
    /// Optional italic subheading printed under the description
    pub subheading: Option<String>,
    /// HSN/SAC code
    pub hsn_code: String,
    /// Billed quantity
    pub quantity: BigDecimal,
    /// Rate per unit, before tax
    pub rate: BigDecimal,
    /// Unit of measure (NOS, SQFT, KG, MTR)
    pub unit: String,
    /// `quantity * rate`, kept in step with both fields
    pub taxable_value: BigDecimal,
}

impl LineItem {
    /// Create a new line item and derive its taxable value
    pub fn new(
        description: String,
        hsn_code: String,
        quantity: BigDecimal,
        rate: BigDecimal,
        unit: String,
    ) -> Self {
        let taxable_value = &quantity * &rate;
        Self {
            description,
            subheading: None,
            hsn_code,
            quantity,
            rate,
            unit,
            taxable_value,
        }
    }

    /// Prefill a line from a product: one unit at the product's default rate
    pub fn from_product(product: &Product) -> Self {
        Self::new(
            product.item_name.clone(),
            product.hsn_sac_code.clone(),
            BigDecimal::from(1),
            product.default_rate.clone(),
            product.unit.clone(),
        )
    }

    /// Attach a subheading
    pub fn with_subheading(mut self, subheading: String) -> Self {
        self.subheading = Some(subheading);
        self
    }

    pub fn set_quantity(&mut self, quantity: BigDecimal) {
        self.quantity = quantity;
        self.recompute();
    }

    pub fn set_rate(&mut self, rate: BigDecimal) {
        self.rate = rate;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.taxable_value = &self.quantity * &self.rate;
    }
}

/// Customer fields joined onto an invoice by the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyRef {
    pub company_name: String,
    pub gstin: Option<String>,
}

/// Invoice header with its ordered line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: String,
    /// Invoice date
    pub date: NaiveDate,
    /// Printed invoice number (e.g. MD/01)
    pub invoice_number: String,
    /// Optional reference/quotation number
    pub reference_number: Option<String>,
    /// Billed customer
    pub customer_id: String,
    /// Joined customer snapshot, when the store provides it
    pub party: Option<PartyRef>,
    /// Invoice type; older records may not carry one
    pub invoice_type: Option<InvoiceType>,
    /// Payment mode; older records may not carry one
    pub payment_mode: Option<PaymentMode>,
    /// Whether CGST/SGST apply
    pub is_gst_bill: bool,
    /// Billed lines, in entry order
    pub line_items: Vec<LineItem>,
}

impl Invoice {
    /// Create an empty sale invoice
    pub fn new(id: String, date: NaiveDate, invoice_number: String, customer_id: String) -> Self {
        Self {
            id,
            date,
            invoice_number,
            reference_number: None,
            customer_id,
            party: None,
            invoice_type: Some(InvoiceType::Sale),
            payment_mode: Some(PaymentMode::Credit),
            is_gst_bill: false,
            line_items: Vec::new(),
        }
    }

    /// Invoice type with missing values read as a sale
    pub fn effective_type(&self) -> InvoiceType {
        self.invoice_type.unwrap_or(InvoiceType::Sale)
    }

    /// Payment mode with missing values read as credit
    pub fn effective_payment_mode(&self) -> PaymentMode {
        self.payment_mode.unwrap_or(PaymentMode::Credit)
    }

    /// Party name used for display and search; empty when unknown
    pub fn party_name(&self) -> &str {
        self.party
            .as_ref()
            .map(|p| p.company_name.as_str())
            .unwrap_or("")
    }

    /// Add a line item
    pub fn add_line_item(&mut self, item: LineItem) {
        self.line_items.push(item);
    }

    /// Totals recomputed from the line items at the standard 9% + 9% split
    pub fn totals(&self) -> crate::tax::gst::InvoiceTotals {
        crate::tax::gst::compute_invoice_totals(&self.line_items, self.is_gst_bill)
    }
}

/// One row of the cash book or bank book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier
    pub id: String,
    /// Posting date
    pub date: NaiveDate,
    /// Payment/receipt voucher type
    pub voucher_type: VoucherType,
    /// Voucher number stored at creation, never renumbered
    pub voucher_number: u64,
    /// Narration / party
    pub particulars: String,
    /// Inflow amount
    pub debit: BigDecimal,
    /// Outflow amount
    pub credit: BigDecimal,
    /// Creation time, used to order entries sharing a date
    pub created_at: NaiveDateTime,
}

impl LedgerEntry {
    /// Net effect on the book balance
    pub fn net(&self) -> BigDecimal {
        &self.debit - &self.credit
    }

    /// Check that the entry is exactly one non-negative inflow or outflow
    pub fn validate(&self) -> BillingResult<()> {
        let zero = BigDecimal::from(0);
        if self.debit < zero || self.credit < zero {
            return Err(BillingError::Validation(format!(
                "Entry '{}' has a negative amount",
                self.id
            )));
        }
        if (self.debit == zero) == (self.credit == zero) {
            return Err(BillingError::Validation(format!(
                "Entry '{}' must carry exactly one of debit or credit",
                self.id
            )));
        }
        Ok(())
    }
}

/// Form data for a new or edited cash/bank entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntryDraft {
    pub date: NaiveDate,
    pub particulars: String,
    pub voucher_type: VoucherType,
    pub amount: BigDecimal,
}

impl LedgerEntryDraft {
    /// Turn the draft into an entry: receipts debit the book, payments credit it
    pub fn into_entry(
        self,
        id: String,
        voucher_number: u64,
        created_at: NaiveDateTime,
    ) -> BillingResult<LedgerEntry> {
        crate::utils::validation::validate_required("particulars", &self.particulars)?;
        crate::utils::validation::validate_positive_amount(&self.amount)?;

        let zero = BigDecimal::from(0);
        let (debit, credit) = if self.voucher_type.is_receipt() {
            (self.amount, zero)
        } else {
            (zero, self.amount)
        };

        Ok(LedgerEntry {
            id,
            date: self.date,
            voucher_type: self.voucher_type,
            voucher_number,
            particulars: self.particulars,
            debit,
            credit,
            created_at,
        })
    }
}

/// Customer master record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub company_name: String,
    /// Multi-line postal address
    pub address: String,
    pub gstin: Option<String>,
    pub phone: Option<String>,
    pub state: String,
    pub state_code: u32,
    pub place_of_supply: String,
}

impl Customer {
    /// Party snapshot for joining onto invoices
    pub fn as_party(&self) -> PartyRef {
        PartyRef {
            company_name: self.company_name.clone(),
            gstin: self.gstin.clone(),
        }
    }
}

/// Product master record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub item_name: String,
    pub hsn_sac_code: String,
    pub default_rate: BigDecimal,
    pub unit: String,
    /// Total GST percentage recorded for the product
    pub gst_rate: BigDecimal,
}

/// Seller details printed on invoices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub address: String,
    pub gstin: Option<String>,
    pub phone: Option<String>,
    pub state: String,
    pub state_code: u32,
    pub bank_details: Option<String>,
}

/// Application role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// Application user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppUser {
    pub id: String,
    pub username: String,
    pub role: Role,
}

/// Identity of the caller, passed explicitly into operations that need it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn new(username: String, role: Role) -> Self {
        Self { username, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail unless the session belongs to an administrator
    pub fn require_admin(&self) -> BillingResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(BillingError::Unauthorized(format!(
                "User '{}' is not an administrator",
                self.username
            )))
        }
    }
}

/// Errors that can occur in the billing system
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Unsupported magnitude: {0}")]
    UnsupportedMagnitude(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Export error: {0}")]
    Export(String),
    #[error("Tax error: {0}")]
    Tax(#[from] GstError),
}

/// Result type for billing operations
pub type BillingResult<T> = Result<T, BillingError>;
