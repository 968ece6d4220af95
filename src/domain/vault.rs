// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::constants::{BPS_PER_PERCENT, MAX_ALLOCATION_BPS};
use crate::domain::error::{AppError, BridgeError};
use alloy::primitives::{Address, U256};
use serde::{Serialize, Serializer};
use std::fmt;
use std::iter::Sum;

/// A share of MetaVault deposits, held in integer basis points (1 = 0.01%).
///
/// The ledger stores basis points; percent is only a presentation of it, so
/// all cap arithmetic happens on the integer value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Allocation(u64);

impl Allocation {
    pub const ZERO: Self = Self(0);
    pub const FULL: Self = Self(MAX_ALLOCATION_BPS);

    pub const fn from_bps(bps: u64) -> Self {
        Self(bps)
    }

    /// Convert a percentage in `[0, 100]` to basis points, rounding to the
    /// nearest unit.
    pub fn from_percent(percent: f64) -> Result<Self, AppError> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(AppError::validation(
                "allocation",
                format!("{percent} is outside 0..=100 percent"),
            ));
        }
        Ok(Self((percent * BPS_PER_PERCENT as f64).round() as u64))
    }

    /// Decode a raw on-chain basis-point value.
    pub fn from_raw(raw: U256, method: &'static str) -> Result<Self, BridgeError> {
        u64::try_from(raw)
            .map(Self)
            .map_err(|_| BridgeError::Decode {
                method,
                reason: format!("allocation {raw} does not fit in u64"),
            })
    }

    pub const fn bps(self) -> u64 {
        self.0
    }

    pub fn percent(self) -> f64 {
        self.0 as f64 / BPS_PER_PERCENT as f64
    }

    pub fn to_u256(self) -> U256 {
        U256::from(self.0)
    }

    pub fn exceeds_cap(self) -> bool {
        self.0 > MAX_ALLOCATION_BPS
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}%",
            self.0 / BPS_PER_PERCENT,
            self.0 % BPS_PER_PERCENT
        )
    }
}

impl Serialize for Allocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.percent())
    }
}

impl Sum for Allocation {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.fold(0u64, |acc, a| acc.saturating_add(a.0)))
    }
}

/// Raw basis-point yield to percent; values beyond u64 saturate.
pub fn apy_percent(raw: U256) -> f64 {
    let bps = u64::try_from(raw).unwrap_or(u64::MAX);
    bps as f64 / BPS_PER_PERCENT as f64
}

/// One underlying vault as observed on the ledger during a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaultRecord {
    pub id: String,
    #[serde(serialize_with = "serialize_address")]
    pub address: Address,
    pub allocation: Allocation,
    pub name: String,
    pub apy: f64,
    pub is_active: bool,
}

impl VaultRecord {
    /// Display label for the vault at `index` (0-based) in query order.
    pub fn display_name(index: usize) -> String {
        format!("Vault {}", index + 1)
    }
}

fn serialize_address<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{address:#x}"))
}

/// Sum of allocations over active records only.
pub fn active_total(records: &[VaultRecord]) -> Allocation {
    records
        .iter()
        .filter(|v| v.is_active)
        .map(|v| v.allocation)
        .sum()
}

/// `None` for the unset or zero address, which is how the factory reports a
/// user without a MetaVault.
pub fn configured_meta_vault(meta_vault: Option<Address>) -> Option<Address> {
    meta_vault.filter(|a| !a.is_zero())
}
