// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::retry::{RetryPolicy, retry_async_if};
use crate::data::abi::{IERC20, IMetaVault, IMetaVaultFactory, IYieldVault, decode_revert_reason};
use crate::domain::constants::{RPC_CODE_EXECUTION_REVERTED, RPC_CODE_USER_REJECTED};
use crate::domain::error::BridgeError;
use crate::network::bridge::{ActiveVaults, CallOutput, ContractCall, LedgerBridge};
use crate::network::provider::LedgerProvider;
use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, TxHash};
use alloy::providers::{PendingTransactionError, Provider, WatchTxError};
use alloy::transports::TransportError;
use async_trait::async_trait;
use std::time::Duration;

/// `LedgerBridge` over a JSON-RPC endpoint, signing with a local key.
#[derive(Clone)]
pub struct RpcBridge {
    provider: LedgerProvider,
    signer_address: Option<Address>,
    read_retry: RetryPolicy,
    receipt_timeout: Duration,
    confirmations: u64,
}

impl RpcBridge {
    pub fn new(
        provider: LedgerProvider,
        signer_address: Option<Address>,
        read_retry: RetryPolicy,
        receipt_timeout: Duration,
        confirmations: u64,
    ) -> Self {
        Self {
            provider,
            signer_address,
            read_retry,
            receipt_timeout,
            confirmations: confirmations.max(1),
        }
    }

    async fn read_once(&self, contract: Address, call: &ContractCall) -> Result<CallOutput, BridgeError> {
        let method = call.method();
        let provider = self.provider.clone();
        match call {
            ContractCall::GetActiveVaults => {
                let out = IMetaVault::new(contract, provider)
                    .getActiveVaults()
                    .call()
                    .await
                    .map_err(|e| classify_contract_error(method, e))?;
                Ok(CallOutput::ActiveVaults(ActiveVaults {
                    ids: out.ids,
                    addresses: out.addresses,
                    allocations: out.allocations,
                }))
            }
            ContractCall::GetApy => IYieldVault::new(contract, provider)
                .getAPY()
                .call()
                .await
                .map(CallOutput::Apy)
                .map_err(|e| classify_contract_error(method, e)),
            ContractCall::HasMetaVault { user } => IMetaVaultFactory::new(contract, provider)
                .hasMetaVault(*user)
                .call()
                .await
                .map(CallOutput::Bool)
                .map_err(|e| classify_contract_error(method, e)),
            ContractCall::GetUserMetaVault { user } => IMetaVaultFactory::new(contract, provider)
                .getUserMetaVault(*user)
                .call()
                .await
                .map(CallOutput::Address)
                .map_err(|e| classify_contract_error(method, e)),
            _ => Err(BridgeError::Unsupported {
                method,
                kind: "read",
            }),
        }
    }
}

#[async_trait]
impl LedgerBridge for RpcBridge {
    async fn connect(&self) -> Result<bool, BridgeError> {
        if self.signer_address.is_none() {
            return Ok(false);
        }
        // A signer is only useful if the endpoint answers.
        self.chain_id().await?;
        Ok(true)
    }

    async fn connected_address(&self) -> Result<Option<Address>, BridgeError> {
        Ok(self.signer_address)
    }

    async fn call(&self, contract: Address, call: ContractCall) -> Result<CallOutput, BridgeError> {
        if !call.is_read_only() {
            return Err(BridgeError::Unsupported {
                method: call.method(),
                kind: "read",
            });
        }
        let call_ref = &call;
        retry_async_if(
            call.method(),
            self.read_retry,
            |_| self.read_once(contract, call_ref),
            BridgeError::is_transient,
        )
        .await
    }

    async fn send_transaction(
        &self,
        contract: Address,
        call: ContractCall,
    ) -> Result<TxHash, BridgeError> {
        let method = call.method();
        if self.signer_address.is_none() {
            return Err(BridgeError::NotConnected);
        }
        let provider = self.provider.clone();
        let pending = match call {
            ContractCall::UpdateAllocation {
                vault_id,
                allocation,
            } => {
                IMetaVault::new(contract, provider)
                    .updateAllocation(vault_id, allocation.to_u256())
                    .send()
                    .await
            }
            ContractCall::AddVault { vault, allocation } => {
                IMetaVault::new(contract, provider)
                    .addVault(vault, allocation.to_u256())
                    .send()
                    .await
            }
            ContractCall::RemoveVault { vault } => {
                IMetaVault::new(contract, provider)
                    .removeVault(vault)
                    .send()
                    .await
            }
            ContractCall::Approve { spender, amount } => {
                IERC20::new(contract, provider)
                    .approve(spender, amount)
                    .send()
                    .await
            }
            ContractCall::Deposit { asset, amount } => {
                IMetaVault::new(contract, provider)
                    .deposit(asset, amount)
                    .send()
                    .await
            }
            ContractCall::CreateMetaVault => {
                IMetaVaultFactory::new(contract, provider)
                    .createMetaVault()
                    .send()
                    .await
            }
            _ => {
                return Err(BridgeError::Unsupported {
                    method,
                    kind: "transaction",
                });
            }
        }
        .map_err(|e| classify_contract_error(method, e))?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(
            target: "bridge",
            method,
            contract = %format!("{:#x}", contract),
            tx = %format!("{:#x}", tx_hash),
            "Transaction submitted; awaiting receipt"
        );

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .with_timeout(Some(self.receipt_timeout))
            .get_receipt()
            .await
            .map_err(|e| {
                tracing::warn!(
                    target: "bridge",
                    method,
                    tx = %format!("{:#x}", tx_hash),
                    error = %e,
                    "Receipt wait failed"
                );
                classify_pending_error(method, e)
            })?;

        if !receipt.status() {
            return Err(BridgeError::Reverted {
                method,
                reason: format!("transaction {:#x} reverted", tx_hash),
            });
        }
        Ok(receipt.transaction_hash())
    }

    async fn chain_id(&self) -> Result<u64, BridgeError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| classify_transport_error("eth_chainId", &e))
    }
}

fn classify_contract_error(method: &'static str, err: alloy::contract::Error) -> BridgeError {
    match err {
        alloy::contract::Error::TransportError(e) => classify_transport_error(method, &e),
        alloy::contract::Error::ZeroData(..) => BridgeError::Decode {
            method,
            reason: "empty return data; is the contract deployed on this chain?".to_string(),
        },
        other => BridgeError::Decode {
            method,
            reason: other.to_string(),
        },
    }
}

fn classify_pending_error(method: &'static str, err: PendingTransactionError) -> BridgeError {
    match err {
        PendingTransactionError::TxWatcher(WatchTxError::Timeout) => BridgeError::Timeout { method },
        PendingTransactionError::TransportError(e) => classify_transport_error(method, &e),
        other => BridgeError::Network(other.to_string()),
    }
}

fn classify_transport_error(method: &'static str, err: &TransportError) -> BridgeError {
    let Some(payload) = err.as_error_resp() else {
        return BridgeError::Network(err.to_string());
    };
    if payload.code == RPC_CODE_USER_REJECTED {
        return BridgeError::UserRejected;
    }
    let message = payload.message.to_string();
    if payload.code == RPC_CODE_EXECUTION_REVERTED || message.to_ascii_lowercase().contains("revert") {
        let reason = payload
            .as_revert_data()
            .and_then(|data| decode_revert_reason(&data))
            .map(ToString::to_string)
            .unwrap_or(message);
        return BridgeError::Reverted { method, reason };
    }
    BridgeError::Network(format!("rpc error {}: {}", payload.code, message))
}
