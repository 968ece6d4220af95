// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

//! In-memory ledger for unit tests.

use crate::domain::error::BridgeError;
use crate::network::bridge::{ActiveVaults, CallOutput, ContractCall, LedgerBridge};
use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct MockState {
    vaults: HashMap<Address, ActiveVaults>,
    apy: HashMap<Address, U256>,
    apy_failures: HashSet<Address>,
    listing_failure: Option<BridgeError>,
    send_failure: Option<BridgeError>,
    method_failures: HashMap<&'static str, BridgeError>,
    account: Option<Address>,
    chain_id: u64,
    user_vaults: HashMap<Address, Address>,
    created_meta_vault: Address,
    /// (token, spender) -> remaining allowance
    allowances: HashMap<(Address, Address), U256>,
    /// (meta vault, asset) -> deposited amount
    deposits: HashMap<(Address, Address), U256>,
    sent: Vec<(Address, ContractCall)>,
    reads: usize,
}

pub(crate) struct MockLedger {
    state: Mutex<MockState>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                chain_id: 1,
                created_meta_vault: Address::repeat_byte(0xC0),
                ..MockState::default()
            }),
        }
    }

    fn edit(mut self, f: impl FnOnce(&mut MockState)) -> Self {
        f(self.state.get_mut().unwrap());
        self
    }

    pub fn with_vault(self, meta_vault: Address, id: u64, vault: Address, bps: u64) -> Self {
        self.with_raw_allocation(meta_vault, id, vault, U256::from(bps))
    }

    pub fn with_raw_allocation(self, meta_vault: Address, id: u64, vault: Address, raw: U256) -> Self {
        self.edit(|s| {
            let entry = s.vaults.entry(meta_vault).or_default();
            entry.ids.push(U256::from(id));
            entry.addresses.push(vault);
            entry.allocations.push(raw);
        })
    }

    pub fn with_apy(self, vault: Address, bps: u64) -> Self {
        self.edit(|s| {
            s.apy.insert(vault, U256::from(bps));
        })
    }

    pub fn failing_apy(self, vault: Address) -> Self {
        self.edit(|s| {
            s.apy_failures.insert(vault);
        })
    }

    pub fn failing_listing(self, err: BridgeError) -> Self {
        self.edit(|s| s.listing_failure = Some(err))
    }

    pub fn failing_send(self, err: BridgeError) -> Self {
        self.edit(|s| s.send_failure = Some(err))
    }

    /// Fail only sends of `method`.
    pub fn failing_method(self, method: &'static str, err: BridgeError) -> Self {
        self.edit(|s| {
            s.method_failures.insert(method, err);
        })
    }

    pub fn with_account(self, account: Address) -> Self {
        self.edit(|s| s.account = Some(account))
    }

    pub fn with_chain(self, chain_id: u64) -> Self {
        self.edit(|s| s.chain_id = chain_id)
    }

    pub fn with_user_meta_vault(self, user: Address, meta_vault: Address) -> Self {
        self.edit(|s| {
            s.user_vaults.insert(user, meta_vault);
        })
    }

    pub fn sent(&self) -> Vec<(Address, ContractCall)> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn deposited(&self, meta_vault: Address, asset: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .deposits
            .get(&(meta_vault, asset))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    pub fn reads(&self) -> usize {
        self.state.lock().unwrap().reads
    }

    fn apply(state: &mut MockState, contract: Address, call: &ContractCall) -> Result<(), BridgeError> {
        match call {
            ContractCall::UpdateAllocation {
                vault_id,
                allocation,
            } => {
                if let Some(v) = state.vaults.get_mut(&contract)
                    && let Some(idx) = v.ids.iter().position(|id| id == vault_id)
                {
                    v.allocations[idx] = allocation.to_u256();
                }
            }
            ContractCall::AddVault { vault, allocation } => {
                let v = state.vaults.entry(contract).or_default();
                let next_id = U256::from(v.ids.len() as u64 + 1);
                v.ids.push(next_id);
                v.addresses.push(*vault);
                v.allocations.push(allocation.to_u256());
            }
            ContractCall::RemoveVault { vault } => {
                if let Some(v) = state.vaults.get_mut(&contract)
                    && let Some(idx) = v.addresses.iter().position(|a| a == vault)
                {
                    v.ids.remove(idx);
                    v.addresses.remove(idx);
                    v.allocations.remove(idx);
                }
            }
            ContractCall::CreateMetaVault => {
                if let Some(account) = state.account {
                    let created = state.created_meta_vault;
                    state.user_vaults.insert(account, created);
                }
            }
            ContractCall::Approve { spender, amount } => {
                state.allowances.insert((contract, *spender), *amount);
            }
            ContractCall::Deposit { asset, amount } => {
                let allowance = state.allowances.entry((*asset, contract)).or_default();
                if *allowance < *amount {
                    return Err(BridgeError::Reverted {
                        method: "deposit",
                        reason: "ERC20: insufficient allowance".into(),
                    });
                }
                *allowance -= *amount;
                *state.deposits.entry((contract, *asset)).or_default() += *amount;
            }
            _ => {}
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerBridge for MockLedger {
    async fn connect(&self) -> Result<bool, BridgeError> {
        Ok(self.state.lock().unwrap().account.is_some())
    }

    async fn connected_address(&self) -> Result<Option<Address>, BridgeError> {
        Ok(self.state.lock().unwrap().account)
    }

    async fn call(&self, contract: Address, call: ContractCall) -> Result<CallOutput, BridgeError> {
        // Let other tasks interleave between reads and writes.
        tokio::task::yield_now().await;
        let mut s = self.state.lock().unwrap();
        s.reads += 1;
        match call {
            ContractCall::GetActiveVaults => {
                if let Some(err) = &s.listing_failure {
                    return Err(err.clone());
                }
                Ok(CallOutput::ActiveVaults(
                    s.vaults.get(&contract).cloned().unwrap_or_default(),
                ))
            }
            ContractCall::GetApy => {
                if s.apy_failures.contains(&contract) {
                    return Err(BridgeError::Network("apy endpoint down".into()));
                }
                Ok(CallOutput::Apy(
                    s.apy.get(&contract).copied().unwrap_or(U256::ZERO),
                ))
            }
            ContractCall::HasMetaVault { user } => {
                Ok(CallOutput::Bool(s.user_vaults.contains_key(&user)))
            }
            ContractCall::GetUserMetaVault { user } => Ok(CallOutput::Address(
                s.user_vaults.get(&user).copied().unwrap_or(Address::ZERO),
            )),
            other => Err(BridgeError::Unsupported {
                method: other.method(),
                kind: "read",
            }),
        }
    }

    async fn send_transaction(
        &self,
        contract: Address,
        call: ContractCall,
    ) -> Result<TxHash, BridgeError> {
        tokio::task::yield_now().await;
        let mut s = self.state.lock().unwrap();
        if let Some(err) = s.send_failure.as_ref().or(s.method_failures.get(call.method())) {
            return Err(err.clone());
        }
        Self::apply(&mut s, contract, &call)?;
        s.sent.push((contract, call));
        Ok(TxHash::with_last_byte(s.sent.len() as u8))
    }

    async fn chain_id(&self) -> Result<u64, BridgeError> {
        Ok(self.state.lock().unwrap().chain_id)
    }
}
