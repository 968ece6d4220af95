// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

//! The seam between the allocation core and whatever reaches the wallet and
//! the ledger. Calls and results are typed per contract method so callers
//! never guess at the shape of a dynamic value.

use crate::domain::error::BridgeError;
use crate::domain::vault::Allocation;
use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    /// MetaVault: parallel arrays of ids, addresses and basis-point allocations.
    GetActiveVaults,
    /// Yield vault: annualized yield in basis points.
    GetApy,
    HasMetaVault {
        user: Address,
    },
    GetUserMetaVault {
        user: Address,
    },
    CreateMetaVault,
    UpdateAllocation {
        vault_id: U256,
        allocation: Allocation,
    },
    AddVault {
        vault: Address,
        allocation: Allocation,
    },
    RemoveVault {
        vault: Address,
    },
    /// ERC-20 allowance for the MetaVault; sent to the token contract.
    Approve {
        spender: Address,
        amount: U256,
    },
    /// MetaVault pulls `amount` of `asset` from the caller.
    Deposit {
        asset: Address,
        amount: U256,
    },
}

impl ContractCall {
    pub fn method(&self) -> &'static str {
        match self {
            ContractCall::GetActiveVaults => "getActiveVaults",
            ContractCall::GetApy => "getAPY",
            ContractCall::HasMetaVault { .. } => "hasMetaVault",
            ContractCall::GetUserMetaVault { .. } => "getUserMetaVault",
            ContractCall::CreateMetaVault => "createMetaVault",
            ContractCall::UpdateAllocation { .. } => "updateAllocation",
            ContractCall::AddVault { .. } => "addVault",
            ContractCall::RemoveVault { .. } => "removeVault",
            ContractCall::Approve { .. } => "approve",
            ContractCall::Deposit { .. } => "deposit",
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            ContractCall::GetActiveVaults
                | ContractCall::GetApy
                | ContractCall::HasMetaVault { .. }
                | ContractCall::GetUserMetaVault { .. }
        )
    }
}

/// Raw `getActiveVaults` result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveVaults {
    pub ids: Vec<U256>,
    pub addresses: Vec<Address>,
    pub allocations: Vec<U256>,
}

impl ActiveVaults {
    /// The three arrays describe the same vaults and must line up.
    pub fn check_aligned(&self) -> Result<(), BridgeError> {
        if self.ids.len() == self.addresses.len() && self.ids.len() == self.allocations.len() {
            return Ok(());
        }
        Err(BridgeError::Decode {
            method: "getActiveVaults",
            reason: format!(
                "length mismatch: {} ids, {} addresses, {} allocations",
                self.ids.len(),
                self.addresses.len(),
                self.allocations.len()
            ),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutput {
    ActiveVaults(ActiveVaults),
    Apy(U256),
    Bool(bool),
    Address(Address),
}

impl CallOutput {
    fn kind(&self) -> &'static str {
        match self {
            CallOutput::ActiveVaults(_) => "active vaults",
            CallOutput::Apy(_) => "apy",
            CallOutput::Bool(_) => "bool",
            CallOutput::Address(_) => "address",
        }
    }

    pub fn into_active_vaults(self) -> Result<ActiveVaults, BridgeError> {
        match self {
            CallOutput::ActiveVaults(v) => Ok(v),
            other => Err(other.mismatch("getActiveVaults", "active vaults")),
        }
    }

    pub fn into_apy(self) -> Result<U256, BridgeError> {
        match self {
            CallOutput::Apy(v) => Ok(v),
            other => Err(other.mismatch("getAPY", "apy")),
        }
    }

    pub fn into_bool(self, method: &'static str) -> Result<bool, BridgeError> {
        match self {
            CallOutput::Bool(v) => Ok(v),
            other => Err(other.mismatch(method, "bool")),
        }
    }

    pub fn into_address(self, method: &'static str) -> Result<Address, BridgeError> {
        match self {
            CallOutput::Address(v) => Ok(v),
            other => Err(other.mismatch(method, "address")),
        }
    }

    fn mismatch(&self, method: &'static str, expected: &'static str) -> BridgeError {
        tracing::debug!(target: "bridge", method, got = self.kind(), expected, "Output shape mismatch");
        BridgeError::UnexpectedOutput { method, expected }
    }
}

/// Wallet and ledger access consumed by the allocation core.
#[async_trait]
pub trait LedgerBridge: Send + Sync {
    /// Request wallet access; `false` when there is nothing to connect.
    async fn connect(&self) -> Result<bool, BridgeError>;

    /// `None` when no account is connected.
    async fn connected_address(&self) -> Result<Option<Address>, BridgeError>;

    /// Read-only contract query.
    async fn call(&self, contract: Address, call: ContractCall) -> Result<CallOutput, BridgeError>;

    /// State-changing call; resolves after on-chain confirmation.
    async fn send_transaction(
        &self,
        contract: Address,
        call: ContractCall,
    ) -> Result<TxHash, BridgeError>;

    async fn chain_id(&self) -> Result<u64, BridgeError>;
}
