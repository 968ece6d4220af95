// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::error::AppError;
use crate::domain::vault::configured_meta_vault;
use crate::network::bridge::{ContractCall, LedgerBridge};
use alloy::primitives::{Address, TxHash, U256};
use std::sync::Arc;

/// Hashes of the two transactions a deposit takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositReceipt {
    pub approve_tx: TxHash,
    pub deposit_tx: TxHash,
}

/// Funds a MetaVault: ERC-20 `approve` to the MetaVault, then `deposit`.
/// The deposit is only sent once the approval is confirmed.
pub struct DepositFlow {
    bridge: Arc<dyn LedgerBridge>,
}

impl DepositFlow {
    pub fn new(bridge: Arc<dyn LedgerBridge>) -> Self {
        Self { bridge }
    }

    pub async fn deposit(
        &self,
        meta_vault: Option<Address>,
        token: Address,
        amount: U256,
    ) -> Result<DepositReceipt, AppError> {
        let meta_vault = configured_meta_vault(meta_vault)
            .ok_or_else(|| AppError::Config("No MetaVault configured".to_string()))?;
        if token.is_zero() {
            return Err(AppError::InvalidAddress(format!("{token:#x}")));
        }
        if amount.is_zero() {
            return Err(AppError::validation("amount", "deposit amount must be positive"));
        }

        let approve_tx = self
            .bridge
            .send_transaction(
                token,
                ContractCall::Approve {
                    spender: meta_vault,
                    amount,
                },
            )
            .await
            .inspect_err(|e| {
                tracing::error!(
                    target: "deposit",
                    token = %format!("{token:#x}"),
                    error = %e,
                    "Approval failed; deposit not sent"
                );
            })?;
        tracing::debug!(target: "deposit", tx = %approve_tx, "Approval confirmed");

        let deposit_tx = self
            .bridge
            .send_transaction(
                meta_vault,
                ContractCall::Deposit {
                    asset: token,
                    amount,
                },
            )
            .await?;
        tracing::info!(
            target: "deposit",
            meta_vault = %format!("{meta_vault:#x}"),
            token = %format!("{token:#x}"),
            %amount,
            tx = %deposit_tx,
            "Deposit confirmed"
        );
        Ok(DepositReceipt {
            approve_tx,
            deposit_tx,
        })
    }
}
