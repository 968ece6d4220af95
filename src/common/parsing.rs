// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::error::AppError;
use alloy::primitives::{Address, U256};
use std::str::FromStr;

pub fn parse_boolish(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Parse a hex address, with or without prefix, in any letter case.
pub fn parse_address_hex(s: &str) -> Result<Address, AppError> {
    let trimmed = s.trim();
    Address::from_str(strip_0x(trimmed)).map_err(|_| AppError::InvalidAddress(trimmed.to_string()))
}

/// Blank input means "not set"; anything else must be a valid address.
pub fn parse_optional_address(raw: Option<&str>) -> Result<Option<Address>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_address_hex(s).map(Some),
        None => Ok(None),
    }
}

fn parse_decimal_u256(field: &str, raw: &str) -> Result<U256, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::validation(field, format!("'{raw}' is not a uint256")));
    }
    U256::from_str_radix(trimmed, 10)
        .map_err(|_| AppError::validation(field, format!("'{raw}' is not a uint256")))
}

/// Vault ids are rendered as decimal `uint256` values.
pub fn parse_vault_id(raw: &str) -> Result<U256, AppError> {
    parse_decimal_u256("vault_id", raw)
}

/// Token amounts are given in base units (wei for 18-decimal tokens).
pub fn parse_token_amount(raw: &str) -> Result<U256, AppError> {
    parse_decimal_u256("amount", raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_parse_regardless_of_case_and_prefix() {
        let lower = parse_address_hex("0xdea01fc5289af2c440ca65582e3c44767c0fcf08").unwrap();
        let upper = parse_address_hex("0XDEA01FC5289AF2C440CA65582E3C44767C0FCF08").unwrap();
        let bare = parse_address_hex("dea01fc5289af2c440ca65582e3c44767c0fcf08").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower, bare);
    }

    #[test]
    fn optional_address_treats_blank_as_unset() {
        assert_eq!(parse_optional_address(None).unwrap(), None);
        assert_eq!(parse_optional_address(Some("   ")).unwrap(), None);
        assert!(matches!(
            parse_optional_address(Some("0x1234")),
            Err(AppError::InvalidAddress(_))
        ));
    }

    #[test]
    fn vault_ids_are_decimal() {
        assert_eq!(parse_vault_id("42").unwrap(), U256::from(42u64));
        assert!(parse_vault_id("0x2a").is_err());
        assert!(parse_vault_id("").is_err());
    }

    #[test]
    fn token_amounts_are_base_units() {
        assert_eq!(
            parse_token_amount("1000000000000000000").unwrap(),
            U256::from(10u64).pow(U256::from(18u64))
        );
        assert!(matches!(
            parse_token_amount("1.5"),
            Err(AppError::Validation { ref field, .. }) if field == "amount"
        ));
    }

    #[test]
    fn parse_boolish_rejects_invalid_values() {
        assert_eq!(parse_boolish("true"), Some(true));
        assert_eq!(parse_boolish("OFF"), Some(false));
        assert_eq!(parse_boolish("tru"), None);
    }
}
