//! Display formatting for amounts and dates

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, RoundingMode};
use chrono::NaiveDate;

/// Amount with exactly two decimals, rounded half away from zero.
///
/// Built from the scaled integer so zero keeps its decimals (`0.00`) and a
/// negative amount rounding to zero loses its sign.
pub fn format_amount(amount: &BigDecimal) -> String {
    let (paise, _) = amount
        .with_scale_round(2, RoundingMode::HalfUp)
        .with_scale(2)
        .as_bigint_and_exponent();

    let sign = if paise < BigInt::from(0) { "-" } else { "" };
    let digits = format!("{:0>3}", paise.magnitude().to_string());
    let (whole, fraction) = digits.split_at(digits.len() - 2);
    format!("{}{}.{}", sign, whole, fraction)
}

/// Date as printed on vouchers and invoices, e.g. `05-Jan-24`
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d-%b-%y").to_string()
}
