//! Validation and parsing of raw form input

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;

use crate::types::*;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> BillingResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(BillingError::Validation(
            "Amount must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that a required text field is filled in
pub fn validate_required(field: &str, value: &str) -> BillingResult<()> {
    if value.trim().is_empty() {
        return Err(BillingError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

/// Parse a numeric form field such as quantity, rate or amount
pub fn parse_amount(field: &str, raw: &str) -> BillingResult<BigDecimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BillingError::Validation(format!("{} is required", field)));
    }
    BigDecimal::from_str(trimmed)
        .map_err(|_| BillingError::Validation(format!("{} must be a number, got '{}'", field, raw)))
}

/// Parse an ISO `YYYY-MM-DD` date field
pub fn parse_date(field: &str, raw: &str) -> BillingResult<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BillingError::Validation(format!("{} is required", field)));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|e| BillingError::Validation(format!("{} '{}' is not a valid date: {}", field, raw, e)))
}

/// Validate a customer before saving
pub fn validate_customer(customer: &Customer) -> BillingResult<()> {
    validate_required("Company name", &customer.company_name)?;

    if let Some(gstin) = &customer.gstin {
        let gstin = gstin.trim();
        if !gstin.is_empty() && gstin.len() != 15 {
            return Err(BillingError::Validation(format!(
                "GSTIN '{}' must be 15 characters",
                gstin
            )));
        }
    }

    Ok(())
}

/// Validate a product before saving
pub fn validate_product(product: &Product) -> BillingResult<()> {
    validate_required("Item name", &product.item_name)?;

    if product.default_rate < BigDecimal::from(0) {
        return Err(BillingError::Validation(
            "Default rate cannot be negative".to_string(),
        ));
    }

    Ok(())
}

/// Validate an invoice before saving; line amounts themselves are not restricted
pub fn validate_invoice(invoice: &Invoice) -> BillingResult<()> {
    validate_required("Customer", &invoice.customer_id)?;

    if invoice.line_items.is_empty() {
        return Err(BillingError::Validation(
            "Invoice must have at least one item".to_string(),
        ));
    }

    Ok(())
}

/// Validate an application user
pub fn validate_user(user: &AppUser) -> BillingResult<()> {
    validate_required("Username", &user.username)?;

    if !user
        .username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '_' || c == '-')
    {
        return Err(BillingError::Validation(
            "Username can only contain alphanumeric characters, dots, dashes, and underscores"
                .to_string(),
        ));
    }

    Ok(())
}
