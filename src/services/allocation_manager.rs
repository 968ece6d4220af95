// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::parsing::parse_vault_id;
use crate::domain::constants::{BPS_PER_PERCENT, MAX_ALLOCATION_BPS};
use crate::domain::error::AppError;
use crate::domain::vault::{Allocation, active_total, configured_meta_vault};
use crate::network::bridge::{ContractCall, LedgerBridge};
use crate::services::vault_reader::VaultReader;
use alloy::primitives::{Address, TxHash};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

// `percent * 100` is not exact in binary (1.1 * 100 = 110.00000000000001).
const CAP_TOLERANCE_BPS: f64 = 1e-6;

/// Applies allocation changes after checking the 100% cap against a fresh
/// ledger read.
///
/// Check and submit run under a per-MetaVault lock, so two changes issued
/// through the same manager never validate against the same stale total.
pub struct AllocationManager {
    reader: VaultReader,
    bridge: Arc<dyn LedgerBridge>,
    locks: DashMap<Address, Arc<Mutex<()>>>,
}

impl AllocationManager {
    pub fn new(bridge: Arc<dyn LedgerBridge>) -> Self {
        Self {
            reader: VaultReader::new(bridge.clone()),
            bridge,
            locks: DashMap::new(),
        }
    }

    pub fn reader(&self) -> &VaultReader {
        &self.reader
    }

    /// Set one vault's allocation. `false` on any failure, which is logged.
    pub async fn update_allocation(
        &self,
        meta_vault: Option<Address>,
        vault_id: &str,
        percent: f64,
    ) -> bool {
        match self.try_update_allocation(meta_vault, vault_id, percent).await {
            Ok(hash) => {
                tracing::info!(
                    target: "allocation",
                    vault_id,
                    percent,
                    tx = %hash,
                    "Allocation updated"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    target: "allocation",
                    vault_id,
                    percent,
                    error = %e,
                    "Error updating allocation"
                );
                false
            }
        }
    }

    pub async fn try_update_allocation(
        &self,
        meta_vault: Option<Address>,
        vault_id: &str,
        percent: f64,
    ) -> Result<TxHash, AppError> {
        let meta_vault = require_meta_vault(meta_vault)?;
        let allocation = Allocation::from_percent(percent)?;
        let raw_id = parse_vault_id(vault_id)?;
        // Ledger ids render without leading zeros.
        let canonical_id = raw_id.to_string();
        let vault_id = canonical_id.as_str();

        let lock = self.lock_for(meta_vault);
        let _guard = lock.lock().await;

        // One snapshot serves both the total and the lookup.
        let vaults = self.reader.list_vaults(Some(meta_vault)).await?;
        let current = vaults
            .iter()
            .find(|v| v.id == vault_id && v.is_active)
            .map(|v| v.allocation)
            .ok_or_else(|| AppError::VaultNotFound {
                vault_id: vault_id.to_string(),
            })?;

        let others = active_total(&vaults).bps().saturating_sub(current.bps());
        let projected = check_cap(others, percent, allocation)?;
        tracing::debug!(
            target: "allocation",
            vault_id,
            current = %current,
            requested = %allocation,
            projected = %projected,
            "Cap check passed"
        );

        let hash = self
            .bridge
            .send_transaction(
                meta_vault,
                ContractCall::UpdateAllocation {
                    vault_id: raw_id,
                    allocation,
                },
            )
            .await?;
        Ok(hash)
    }

    /// Register a new underlying vault with an initial allocation.
    pub async fn add_vault(
        &self,
        meta_vault: Option<Address>,
        vault: Address,
        percent: f64,
    ) -> Result<TxHash, AppError> {
        let meta_vault = require_meta_vault(meta_vault)?;
        if vault.is_zero() {
            return Err(AppError::InvalidAddress(format!("{vault:#x}")));
        }
        let allocation = Allocation::from_percent(percent)?;

        let lock = self.lock_for(meta_vault);
        let _guard = lock.lock().await;

        let vaults = self.reader.list_vaults(Some(meta_vault)).await?;
        if vaults.iter().any(|v| v.address == vault) {
            return Err(AppError::validation(
                "vault",
                format!("{vault:#x} is already part of this MetaVault"),
            ));
        }
        check_cap(active_total(&vaults).bps(), percent, allocation)?;

        let hash = self
            .bridge
            .send_transaction(meta_vault, ContractCall::AddVault { vault, allocation })
            .await?;
        tracing::info!(
            target: "allocation",
            vault = %format!("{vault:#x}"),
            allocation = %allocation,
            tx = %hash,
            "Vault added"
        );
        Ok(hash)
    }

    /// Drop an underlying vault. Removal only lowers the total, so no cap check.
    pub async fn remove_vault(
        &self,
        meta_vault: Option<Address>,
        vault: Address,
    ) -> Result<TxHash, AppError> {
        let meta_vault = require_meta_vault(meta_vault)?;

        let lock = self.lock_for(meta_vault);
        let _guard = lock.lock().await;

        let vaults = self.reader.list_vaults(Some(meta_vault)).await?;
        let Some(record) = vaults.iter().find(|v| v.address == vault) else {
            return Err(AppError::VaultNotFound {
                vault_id: format!("{vault:#x}"),
            });
        };
        let vault_id = record.id.clone();

        let hash = self
            .bridge
            .send_transaction(meta_vault, ContractCall::RemoveVault { vault })
            .await?;
        tracing::info!(
            target: "allocation",
            vault_id = %vault_id,
            vault = %format!("{vault:#x}"),
            tx = %hash,
            "Vault removed"
        );
        Ok(hash)
    }

    fn lock_for(&self, meta_vault: Address) -> Arc<Mutex<()>> {
        self.locks
            .entry(meta_vault)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

fn require_meta_vault(meta_vault: Option<Address>) -> Result<Address, AppError> {
    configured_meta_vault(meta_vault)
        .ok_or_else(|| AppError::Config("No MetaVault configured".to_string()))
}

/// Cap check on the exact request, then on the rounded value that gets submitted.
/// `others` is the active total excluding the vault being changed.
fn check_cap(others: u64, percent: f64, requested: Allocation) -> Result<Allocation, AppError> {
    let exact = others as f64 + percent * BPS_PER_PERCENT as f64;
    let projected = Allocation::from_bps(others.saturating_add(requested.bps()));
    if exact > MAX_ALLOCATION_BPS as f64 + CAP_TOLERANCE_BPS || projected.exceeds_cap() {
        return Err(AppError::AllocationCapExceeded {
            projected_bps: (exact.ceil() as u64).max(projected.bps()),
            cap_bps: MAX_ALLOCATION_BPS,
        });
    }
    Ok(projected)
}
