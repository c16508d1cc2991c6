//! Amounts in words, Indian numbering (crore, lakh, thousand, hundred)

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};

use crate::types::{BillingError, BillingResult};

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// One hundred crore; whole-rupee parts at or above this do not fit the 9-digit window
const RUPEE_LIMIT: u64 = 1_000_000_000;

/// Words for 1..=99
fn two_digits(n: u64) -> String {
    let n = n as usize;
    if n < 20 {
        ONES[n].to_string()
    } else if n % 10 == 0 {
        TENS[n / 10].to_string()
    } else {
        format!("{} {}", TENS[n / 10], ONES[n % 10])
    }
}

/// Words for a whole number below one hundred crore; empty for zero
fn rupee_words(rupees: u64) -> String {
    let groups = [
        (rupees / 10_000_000, "Crore"),
        ((rupees / 100_000) % 100, "Lakh"),
        ((rupees / 1_000) % 100, "Thousand"),
        ((rupees / 100) % 10, "Hundred"),
    ];

    let mut parts: Vec<String> = groups
        .iter()
        .filter(|(value, _)| *value != 0)
        .map(|(value, suffix)| format!("{} {}", two_digits(*value), suffix))
        .collect();

    let units = rupees % 100;
    if units != 0 {
        if !parts.is_empty() {
            parts.push("and".to_string());
        }
        parts.push(two_digits(units));
    }

    parts.join(" ")
}

/// Split an amount into whole rupees and paise after rounding to two places
fn split_rupees_paise(amount: &BigDecimal) -> BillingResult<(u64, u64)> {
    if *amount < BigDecimal::from(0) {
        return Err(BillingError::Validation(format!(
            "Cannot express negative amount {} in words",
            amount
        )));
    }

    let (paise_total, _) = amount
        .with_scale_round(2, RoundingMode::HalfUp)
        .as_bigint_and_exponent();
    let paise_total = paise_total
        .to_u64()
        .ok_or_else(|| BillingError::UnsupportedMagnitude(amount.to_string()))?;

    let rupees = paise_total / 100;
    if rupees >= RUPEE_LIMIT {
        return Err(BillingError::UnsupportedMagnitude(format!(
            "{} is 100 crore or more",
            amount
        )));
    }

    Ok((rupees, paise_total % 100))
}

/// Convert an amount into words, e.g. `1234.50` becomes
/// "One Thousand Two Hundred and Thirty Four and Fifty Paise Only".
///
/// A zero amount yields an empty string; callers choose what to print instead.
/// Negative amounts and amounts of 100 crore or more are rejected.
pub fn number_to_words(amount: &BigDecimal) -> BillingResult<String> {
    let (rupees, paise) = split_rupees_paise(amount)?;

    let mut output = rupee_words(rupees);
    if paise > 0 {
        if !output.is_empty() {
            output.push_str(" and ");
        }
        output.push_str(&two_digits(paise));
        output.push_str(" Paise");
    }

    if output.is_empty() {
        return Ok(output);
    }
    output.push_str(" Only");
    Ok(output)
}

/// Invoice total in words, rounded to the nearest whole rupee first
pub fn invoice_amount_in_words(grand_total: &BigDecimal) -> BillingResult<String> {
    number_to_words(&grand_total.with_scale_round(0, RoundingMode::HalfUp))
}

/// Combined CGST + SGST in words, paise kept
pub fn tax_amount_in_words(cgst: &BigDecimal, sgst: &BigDecimal) -> BillingResult<String> {
    number_to_words(&(cgst + sgst))
}
