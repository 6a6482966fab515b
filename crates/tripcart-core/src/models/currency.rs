//! Price conversion between the purchase currency and the home currency.

use crate::error::{Error, Result};

/// Convert `amount` with `rate`, rounded half away from zero to cents.
///
/// ```
/// use tripcart_core::models::convert;
///
/// assert_eq!(convert(120.0, 0.028), 3.36);
/// ```
#[must_use]
pub fn convert(amount: f64, rate: f64) -> f64 {
    (amount * rate * 100.0).round() / 100.0
}

/// Normalize a three-letter ISO 4217 code to upper case.
pub fn normalize_currency_code(code: &str) -> Result<String> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(Error::InvalidInput(format!(
            "currency code must be three letters, got '{code}'"
        )))
    }
}

/// Reject non-finite and non-positive exchange rates.
pub fn validate_rate(rate: f64) -> Result<f64> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(Error::InvalidInput(format!(
            "exchange rate must be a positive number, got {rate}"
        )))
    }
}

/// Reject negative and non-finite prices.
pub fn validate_price(price: f64) -> Result<f64> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(Error::InvalidInput(format!(
            "price must be zero or more, got {price}"
        )))
    }
}
