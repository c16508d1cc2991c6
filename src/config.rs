//! Billing configuration
//!
//! Every field has a default, so a partial TOML document only overrides
//! what it names:
//!
//! ```toml
//! cgst_rate = "6"
//! sgst_rate = "6"
//! default_unit = "SQFT"
//! ```

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::tax::gst::GstRate;
use crate::types::{BillingError, BillingResult, LedgerBook};

/// Configuration for the billing core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// CGST percentage applied to GST bills
    pub cgst_rate: BigDecimal,
    /// SGST percentage applied to GST bills
    pub sgst_rate: BigDecimal,
    /// Unit used when a line or product has none
    pub default_unit: String,
    /// State recorded on new customers
    pub default_state: String,
    pub default_state_code: u32,
    pub default_place_of_supply: String,
    /// Settings key holding the cash book opening balance
    pub cash_opening_key: String,
    /// Settings key holding the bank book opening balance
    pub bank_opening_key: String,
    /// Prefix of exported CSV file names
    pub export_file_prefix: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            cgst_rate: BigDecimal::from(9),
            sgst_rate: BigDecimal::from(9),
            default_unit: "NOS".to_string(),
            default_state: "Kerala".to_string(),
            default_state_code: 32,
            default_place_of_supply: "Kerala".to_string(),
            cash_opening_key: "cash_opening".to_string(),
            bank_opening_key: "bank_opening".to_string(),
            export_file_prefix: "Metro_Invoices".to_string(),
        }
    }
}

impl BillingConfig {
    /// Parse configuration from a TOML document
    pub fn from_toml_str(source: &str) -> BillingResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| BillingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> BillingResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| BillingError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Check that the configured tax split is a valid intra-state rate
    pub fn validate(&self) -> BillingResult<()> {
        GstRate::from_config(self).map_err(|e| BillingError::Config(e.to_string()))?;
        if self.default_unit.trim().is_empty() {
            return Err(BillingError::Config(
                "default_unit cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings key of the opening balance for a book
    pub fn opening_key(&self, book: LedgerBook) -> &str {
        match book {
            LedgerBook::Cash => &self.cash_opening_key,
            LedgerBook::Bank => &self.bank_opening_key,
        }
    }
}
