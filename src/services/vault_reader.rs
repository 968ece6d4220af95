// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::error::AppError;
use crate::domain::vault::{
    Allocation, VaultRecord, active_total, apy_percent, configured_meta_vault,
};
use crate::network::bridge::{ContractCall, LedgerBridge};
use alloy::primitives::Address;
use futures::future::join_all;
use std::sync::Arc;

/// Reads the active vault set of a MetaVault straight from the ledger.
///
/// Nothing is cached between calls; every operation re-queries.
#[derive(Clone)]
pub struct VaultReader {
    bridge: Arc<dyn LedgerBridge>,
}

impl VaultReader {
    pub fn new(bridge: Arc<dyn LedgerBridge>) -> Self {
        Self { bridge }
    }

    /// Active vaults in ledger order. An unset MetaVault yields an empty list.
    pub async fn list_vaults(&self, meta_vault: Option<Address>) -> Result<Vec<VaultRecord>, AppError> {
        let Some(meta_vault) = configured_meta_vault(meta_vault) else {
            tracing::debug!(target: "vault_reader", "No MetaVault configured; nothing to list");
            return Ok(Vec::new());
        };

        let (active, allocations) = self
            .bridge
            .call(meta_vault, ContractCall::GetActiveVaults)
            .await
            .and_then(|out| out.into_active_vaults())
            .and_then(|active| {
                active.check_aligned()?;
                let allocations = active
                    .allocations
                    .iter()
                    .map(|raw| Allocation::from_raw(*raw, "getActiveVaults"))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((active, allocations))
            })
            .map_err(|e| {
                tracing::error!(
                    target: "vault_reader",
                    meta_vault = %format!("{:#x}", meta_vault),
                    error = %e,
                    "Error getting vaults"
                );
                AppError::from(e)
            })?;

        let apys = join_all(active.addresses.iter().map(|vault| self.vault_apy(*vault))).await;

        let records: Vec<VaultRecord> = active
            .ids
            .iter()
            .zip(&active.addresses)
            .zip(allocations.into_iter().zip(apys))
            .enumerate()
            .map(|(index, ((id, address), (allocation, apy)))| VaultRecord {
                id: id.to_string(),
                address: *address,
                allocation,
                name: VaultRecord::display_name(index),
                apy,
                is_active: true,
            })
            .collect();

        tracing::debug!(
            target: "vault_reader",
            meta_vault = %format!("{:#x}", meta_vault),
            vaults = records.len(),
            total = %active_total(&records),
            "Fetched active vaults"
        );
        Ok(records)
    }

    pub async fn total_allocation(&self, meta_vault: Option<Address>) -> Result<Allocation, AppError> {
        let vaults = self.list_vaults(meta_vault).await?;
        Ok(active_total(&vaults))
    }

    pub async fn is_vault_active(&self, meta_vault: Option<Address>, vault_id: &str) -> Result<bool, AppError> {
        let vaults = self.list_vaults(meta_vault).await?;
        Ok(vaults.iter().any(|v| v.id == vault_id && v.is_active))
    }

    /// One bad vault must not block the listing: failures read as zero APY.
    async fn vault_apy(&self, vault: Address) -> f64 {
        match self
            .bridge
            .call(vault, ContractCall::GetApy)
            .await
            .and_then(|out| out.into_apy())
        {
            Ok(raw) => apy_percent(raw),
            Err(e) => {
                tracing::warn!(
                    target: "vault_reader",
                    vault = %format!("{:#x}", vault),
                    error = %e,
                    "Error getting APY; defaulting to 0"
                );
                0.0
            }
        }
    }
}
