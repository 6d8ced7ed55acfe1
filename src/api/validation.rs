use chrono::{NaiveDate, Utc};
use regex::Regex;
use std::sync::OnceLock;

use super::ApiError;
use crate::domain::normalize_email;

pub const DEFAULT_PAGE_LIMIT: u64 = 20;
const MAX_PAGE_LIMIT: u64 = 100;
const MIN_SHIPPING_ADDRESS_LEN: usize = 10;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{10,15}$").expect("valid regex"))
}

/// Trimmed value of a mandatory text field.
pub fn require(field: &str, value: Option<&str>) -> Result<String, ApiError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ApiError::validation(format!("{field} is required"))),
    }
}

/// Returns the normalized (trimmed, lower-cased) address.
pub fn validate_email(email: Option<&str>) -> Result<String, ApiError> {
    let email = normalize_email(&require("Email", email)?);
    if !email_regex().is_match(&email) {
        return Err(ApiError::validation("Please provide a valid email address"));
    }
    Ok(email)
}

/// Strips spaces, dashes and parentheses, then expects 10 to 15 digits.
pub fn validate_phone(phone: Option<&str>) -> Result<String, ApiError> {
    let phone: String = require("Phone number", phone)?
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '-' | '(' | ')'))
        .collect();
    if !phone_regex().is_match(&phone) {
        return Err(ApiError::validation(
            "Please provide a valid phone number (10-15 digits)",
        ));
    }
    Ok(phone)
}

pub fn validate_password(password: Option<&str>, min_len: usize) -> Result<String, ApiError> {
    let password = password.unwrap_or_default();
    if password.chars().count() < min_len {
        return Err(ApiError::validation(format!(
            "Password must be at least {min_len} characters long"
        )));
    }
    Ok(password.to_string())
}

/// Parses a closed-set value such as a gender or product type.
pub fn parse_choice<T>(field: &str, value: Option<&str>) -> Result<T, ApiError>
where
    T: std::str::FromStr<Err = crate::domain::UnknownVariant>,
{
    let value = require(field, value)?;
    value
        .to_lowercase()
        .parse::<T>()
        .map_err(|e| ApiError::validation(e.to_string()))
}

/// Expects `YYYY-MM-DD` strictly in the past; returns the canonical form.
pub fn validate_date_of_birth(value: Option<&str>) -> Result<String, ApiError> {
    let value = require("Date of birth", value)?;
    let date = NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| {
        ApiError::validation("Date of birth must be a valid date (YYYY-MM-DD)")
    })?;
    if date >= Utc::now().date_naive() {
        return Err(ApiError::validation("Date of birth must be in the past"));
    }
    Ok(date.format("%Y-%m-%d").to_string())
}

pub fn validate_price(price: Option<f64>) -> Result<f64, ApiError> {
    match price {
        Some(p) if p.is_finite() && p >= 0.0 => Ok(p),
        Some(_) => Err(ApiError::validation("Price must be a non-negative number")),
        None => Err(ApiError::validation("Price is required")),
    }
}

pub fn validate_stock(quantity: Option<i32>) -> Result<i32, ApiError> {
    match quantity {
        Some(q) if q >= 0 => Ok(q),
        Some(_) => Err(ApiError::validation("Quantity must be a non-negative integer")),
        None => Err(ApiError::validation("Quantity is required")),
    }
}

/// -1 means "one size" and is the default.
pub fn validate_size(size: Option<i32>) -> Result<i32, ApiError> {
    let size = size.unwrap_or(-1);
    if size < -1 {
        return Err(ApiError::validation("Size must be -1 or a non-negative integer"));
    }
    Ok(size)
}

/// Units requested for a cart line.
pub fn validate_quantity(quantity: Option<i32>) -> Result<i32, ApiError> {
    match quantity {
        Some(q) if q >= 1 => Ok(q),
        _ => Err(ApiError::validation("Quantity must be at least 1")),
    }
}

pub fn validate_shipping_address(address: Option<&str>) -> Result<String, ApiError> {
    let address = require("Shipping address", address)?;
    if address.chars().count() < MIN_SHIPPING_ADDRESS_LEN {
        return Err(ApiError::validation(format!(
            "Shipping address must be at least {MIN_SHIPPING_ADDRESS_LEN} characters"
        )));
    }
    Ok(address)
}

pub fn validate_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Returns `(page, limit)`, defaulting to the first page of 20.
pub fn validate_pagination(page: Option<u64>, limit: Option<u64>) -> Result<(u64, u64), ApiError> {
    let page = page.unwrap_or(1);
    if page < 1 {
        return Err(ApiError::validation("Page must be at least 1"));
    }

    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between 1 and {MAX_PAGE_LIMIT}"
        )));
    }

    let in_range = (page - 1)
        .checked_mul(limit)
        .is_some_and(|offset| i64::try_from(offset).is_ok());
    if !in_range {
        return Err(ApiError::validation(format!("Page {page} is out of range")));
    }

    Ok((page, limit))
}
