//! Conversions between the major-unit prices entered in forms (rupees) and the
//! minor-unit integers (paise) the backend accepts on write.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    #[error("Invalid money amount '{0}'")]
    InvalidAmount(String),
}

/// Converts a major-unit price to minor units, rounding away float noise (`19.99 * 100`)
pub fn to_minor_units(major: f64) -> i64 {
    (major * MINOR_UNITS_PER_MAJOR).round() as i64
}

pub fn to_major_units(minor: i64) -> f64 {
    minor as f64 / MINOR_UNITS_PER_MAJOR
}

/// Reads the decimal string the backend sends in `Money::amount`
pub fn parse_money_amount(amount: &str) -> Result<f64, PriceError> {
    Decimal::from_str(amount.trim())
        .ok()
        .and_then(|decimal| decimal.to_f64())
        .ok_or_else(|| PriceError::InvalidAmount(amount.to_string()))
}

/// True when the shortest decimal form of the value has at most two fraction digits.
/// Values outside the `Decimal` range (and NaN) never pass
pub fn has_at_most_two_decimals(major: f64) -> bool {
    Decimal::from_str(&major.to_string())
        .map(|decimal| decimal.normalize().scale() <= 2)
        .unwrap_or(false)
}

/// Discount shown next to a variant price, whole percent
pub fn discount_percentage(original_price: f64, discounted_price: f64) -> u32 {
    if original_price <= 0.0 || discounted_price >= original_price {
        return 0;
    }
    (((original_price - discounted_price) / original_price) * 100.0).round() as u32
}

/// Minor units rendered for people, `₹299.00` for rupees and `USD 12.50` otherwise
pub fn format_minor_units(minor: i64, currency: &str) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    let amount = format!("{}{}.{:02}", sign, abs / 100, abs % 100);
    match currency {
        "INR" => format!("₹{}", amount),
        other => format!("{} {}", other, amount),
    }
}
