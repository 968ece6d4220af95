// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::error::BridgeError;
use crate::network::bridge::{CallOutput, ContractCall, LedgerBridge};
use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use std::sync::Arc;

/// Forwards reads to the wrapped bridge and logs writes instead of sending them.
pub struct DryRunBridge {
    inner: Arc<dyn LedgerBridge>,
}

impl DryRunBridge {
    pub fn new(inner: Arc<dyn LedgerBridge>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LedgerBridge for DryRunBridge {
    async fn connect(&self) -> Result<bool, BridgeError> {
        self.inner.connect().await
    }

    async fn connected_address(&self) -> Result<Option<Address>, BridgeError> {
        self.inner.connected_address().await
    }

    async fn call(&self, contract: Address, call: ContractCall) -> Result<CallOutput, BridgeError> {
        self.inner.call(contract, call).await
    }

    async fn send_transaction(
        &self,
        contract: Address,
        call: ContractCall,
    ) -> Result<TxHash, BridgeError> {
        tracing::info!(
            target: "bridge",
            dry_run = true,
            method = call.method(),
            contract = %format!("{:#x}", contract),
            call = ?call,
            "Skipping transaction submission"
        );
        Ok(TxHash::ZERO)
    }

    async fn chain_id(&self) -> Result<u64, BridgeError> {
        self.inner.chain_id().await
    }
}
