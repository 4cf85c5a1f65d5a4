use std::str::FromStr;

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{CustodyError, Result};

/// Largest amount accepted for a single deposit or withdrawal, in ETH.
pub const MAX_ETH_AMOUNT: Decimal = Decimal::from_parts(79, 0, 0, false, 0);

/// Most fractional digits accepted in an ETH amount.
pub const MAX_ETH_DECIMALS: usize = 6;

const WEI_PER_ETH: u64 = 1_000_000_000_000_000_000;

// --- Validation ---

/// `0x` followed by 40 hex digits. Mixed-case input must carry a valid
/// EIP-55 checksum; all-lowercase or all-uppercase input is accepted as is.
pub fn validate_address(address: &str) -> bool {
    parse_address(address).is_ok()
}

/// Parse an address, enforcing the checksum rule of [`validate_address`].
///
/// # Errors
///
/// Returns `CustodyError::Validation` for malformed or mis-checksummed input.
pub fn parse_address(address: &str) -> Result<Address> {
    let invalid = || CustodyError::Validation(format!("invalid address: {address}"));
    let digits = address.strip_prefix("0x").ok_or_else(invalid)?;
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let parsed = Address::from_str(address).map_err(|_| invalid())?;

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && parsed.to_checksum(None) != address {
        return Err(invalid());
    }
    Ok(parsed)
}

/// EIP-55 form of `address`, or `None` if it does not validate.
pub fn to_checksum_address(address: &str) -> Option<String> {
    parse_address(address.trim()).ok().map(|a| a.to_checksum(None))
}

/// `0 < amount <= 79` with at most six fractional digits.
pub fn validate_eth_amount(amount: &str) -> bool {
    parse_eth_amount(amount).is_ok()
}

/// Parse an ETH amount under the rules of [`validate_eth_amount`].
///
/// # Errors
///
/// Returns `CustodyError::Validation` describing the first rule broken.
pub fn parse_eth_amount(amount: &str) -> Result<Decimal> {
    let amount = amount.trim();
    let value = Decimal::from_str(amount)
        .map_err(|_| CustodyError::Validation(format!("invalid amount: {amount:?}")))?;
    if value <= Decimal::ZERO {
        return Err(CustodyError::Validation("amount must be greater than 0".into()));
    }
    if value > MAX_ETH_AMOUNT {
        return Err(CustodyError::Validation(format!(
            "amount must not exceed {MAX_ETH_AMOUNT} ETH"
        )));
    }
    let decimals = amount.split_once('.').map_or(0, |(_, frac)| frac.len());
    if decimals > MAX_ETH_DECIMALS {
        return Err(CustodyError::Validation(format!(
            "amount allows at most {MAX_ETH_DECIMALS} decimal places"
        )));
    }
    Ok(value)
}

pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let clean = |s: &str| !s.is_empty() && !s.contains('@') && !s.chars().any(char::is_whitespace);
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    clean(local) && clean(host) && clean(tld)
}

/// At least eight characters, including a letter and a digit.
pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

// --- Conversion ---

/// Convert ETH to wei.
///
/// # Errors
///
/// Returns `CustodyError::Validation` if the value is negative or overflows.
pub fn eth_to_wei(eth: Decimal) -> Result<U256> {
    let wei = eth * Decimal::from(WEI_PER_ETH);
    wei.trunc()
        .to_u128()
        .map(U256::from)
        .ok_or_else(|| CustodyError::Validation(format!("cannot convert {eth} ETH to wei")))
}

// --- Formatting ---

/// Render a decimal wei string as ETH without trailing zeros.
///
/// # Errors
///
/// Returns `CustodyError::Validation` if `wei` is not an unsigned integer.
pub fn format_wei_to_eth(wei: &str) -> Result<String> {
    let wei = U256::from_str_radix(wei.trim(), 10)
        .map_err(|e| CustodyError::Validation(format!("invalid wei amount {wei:?}: {e}")))?;
    let unit = U256::from(WEI_PER_ETH);
    let whole = wei / unit;
    let frac = wei % unit;
    if frac.is_zero() {
        return Ok(whole.to_string());
    }
    let frac = format!("{:0>18}", frac.to_string());
    Ok(format!("{whole}.{}", frac.trim_end_matches('0')))
}

/// Parse a decimal wei string into an ETH amount.
pub fn wei_to_eth(wei: &str) -> Result<Decimal> {
    let eth = format_wei_to_eth(wei)?;
    Decimal::from_str(&eth)
        .map_err(|e| CustodyError::Validation(format!("wei amount {wei:?} out of range: {e}")))
}

/// `0x1234...abcd`.
pub fn truncate_address(address: &str) -> String {
    truncate(address, 6, 4)
}

/// `0x12345678...9abcdef0`.
pub fn truncate_tx_hash(hash: &str) -> String {
    truncate(hash, 10, 8)
}

fn truncate(value: &str, head: usize, tail: usize) -> String {
    if value.is_empty() {
        return String::new();
    }
    if value.len() <= head + tail || !value.is_ascii() {
        return value.to_string();
    }
    format!("{}...{}", &value[..head], &value[value.len() - tail..])
}

/// `YYYY-MM-DD HH:MM` in UTC; unparseable input is returned unchanged.
pub fn format_date(value: &str) -> String {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| format_timestamp(dt.with_timezone(&Utc)))
        .unwrap_or_else(|_| value.to_string())
}

/// Unix seconds as `YYYY-MM-DD HH:MM` UTC.
pub fn format_unix(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(format_timestamp)
        .unwrap_or_else(|| secs.to_string())
}

fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}
