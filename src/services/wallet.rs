// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::error::{AppError, BridgeError};
use crate::domain::vault::configured_meta_vault;
use crate::data::address_registry::AddressRegistry;
use crate::network::bridge::{ContractCall, LedgerBridge};
use alloy::primitives::{Address, TxHash};
use std::sync::Arc;

/// Wallet connection plus MetaVault discovery through the factory of the
/// connected network.
pub struct WalletSession {
    bridge: Arc<dyn LedgerBridge>,
    registry: AddressRegistry,
}

impl WalletSession {
    pub fn new(bridge: Arc<dyn LedgerBridge>, registry: AddressRegistry) -> Self {
        Self { bridge, registry }
    }

    /// `true` once an account is available. A missing wallet or a rejected
    /// prompt is logged and reported as `false`.
    pub async fn connect_wallet(&self) -> bool {
        match self.bridge.connect().await {
            Ok(true) => true,
            Ok(false) => {
                tracing::warn!(target: "wallet", "No account available to connect");
                false
            }
            Err(e) => {
                tracing::error!(target: "wallet", error = %e, "Error connecting wallet");
                false
            }
        }
    }

    pub async fn connected_address(&self) -> Result<Option<Address>, AppError> {
        Ok(self.bridge.connected_address().await?)
    }

    pub async fn network_id(&self) -> Result<u64, AppError> {
        Ok(self.bridge.chain_id().await?)
    }

    /// Human name of the connected network, or `Unknown Network (<id>)`.
    pub async fn network_name(&self) -> Result<String, AppError> {
        let chain_id = self.network_id().await?;
        Ok(self
            .registry
            .network_name(chain_id)
            .unwrap_or_else(|| format!("Unknown Network ({chain_id})")))
    }

    pub async fn factory_address(&self) -> Result<Address, AppError> {
        let chain_id = self.network_id().await?;
        self.registry.factory(chain_id).ok_or_else(|| {
            AppError::Config(format!(
                "No MetaVault factory for chain {chain_id}; switch to a supported network"
            ))
        })
    }

    /// Whether `user` (or the connected account) owns a MetaVault.
    pub async fn has_meta_vault(&self, user: Option<Address>) -> Result<bool, AppError> {
        let Some(user) = self.resolve_user(user).await? else {
            return Ok(false);
        };
        let factory = self.factory_address().await?;
        let out = self
            .bridge
            .call(factory, ContractCall::HasMetaVault { user })
            .await?;
        Ok(out.into_bool("hasMetaVault")?)
    }

    /// MetaVault owned by `user`; `None` when the factory reports the zero address.
    pub async fn user_meta_vault(&self, user: Option<Address>) -> Result<Option<Address>, AppError> {
        let Some(user) = self.resolve_user(user).await? else {
            return Ok(None);
        };
        let factory = self.factory_address().await?;
        let out = self
            .bridge
            .call(factory, ContractCall::GetUserMetaVault { user })
            .await?;
        Ok(configured_meta_vault(Some(out.into_address("getUserMetaVault")?)))
    }

    /// MetaVault of the connected account, if any.
    pub async fn current_meta_vault(&self) -> Result<Option<Address>, AppError> {
        self.user_meta_vault(None).await
    }

    /// An explicitly configured MetaVault wins; otherwise ask the factory.
    /// Factory failures propagate rather than reading as "none".
    pub async fn resolve_meta_vault(&self, configured: Option<Address>) -> Result<Option<Address>, AppError> {
        if let Some(addr) = configured_meta_vault(configured) {
            return Ok(Some(addr));
        }
        self.current_meta_vault().await.inspect_err(|e| {
            tracing::error!(target: "wallet", error = %e, "MetaVault lookup via factory failed");
        })
    }

    /// Deploy a MetaVault for the connected account and return its address.
    pub async fn create_meta_vault(&self) -> Result<(TxHash, Option<Address>), AppError> {
        let user = self
            .bridge
            .connected_address()
            .await?
            .ok_or(BridgeError::NotConnected)?;
        if let Some(existing) = self.user_meta_vault(Some(user)).await? {
            return Err(AppError::validation(
                "meta_vault",
                format!("{user:#x} already owns MetaVault {existing:#x}"),
            ));
        }

        let factory = self.factory_address().await?;
        let hash = self
            .bridge
            .send_transaction(factory, ContractCall::CreateMetaVault)
            .await?;
        let created = self.user_meta_vault(Some(user)).await?;
        tracing::info!(
            target: "wallet",
            owner = %format!("{user:#x}"),
            meta_vault = ?created.map(|a| format!("{a:#x}")),
            tx = %hash,
            "MetaVault created"
        );
        Ok((hash, created))
    }

    async fn resolve_user(&self, user: Option<Address>) -> Result<Option<Address>, AppError> {
        match user {
            Some(user) => Ok(Some(user)),
            None => self.connected_address().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constants::{CHAIN_ETHEREUM, CHAIN_SEPOLIA};
    use crate::network::mock::MockLedger;

    fn factory() -> Address {
        Address::repeat_byte(0xFA)
    }

    fn registry() -> AddressRegistry {
        let mut registry = AddressRegistry::builtin();
        registry.set_factory(CHAIN_SEPOLIA, factory());
        registry
    }

    fn user() -> Address {
        Address::repeat_byte(0x11)
    }

    #[tokio::test]
    async fn connect_reports_account_availability() {
        let none = WalletSession::new(Arc::new(MockLedger::new()), registry());
        assert!(!none.connect_wallet().await);
        assert_eq!(none.connected_address().await.unwrap(), None);

        let some = WalletSession::new(Arc::new(MockLedger::new().with_account(user())), registry());
        assert!(some.connect_wallet().await);
        assert_eq!(some.connected_address().await.unwrap(), Some(user()));
    }

    #[tokio::test]
    async fn network_names_fall_back_to_unknown() {
        let sepolia = WalletSession::new(Arc::new(MockLedger::new().with_chain(CHAIN_SEPOLIA)), registry());
        assert_eq!(sepolia.network_name().await.unwrap(), "Sepolia Testnet");

        let other = WalletSession::new(Arc::new(MockLedger::new().with_chain(31337)), registry());
        assert_eq!(other.network_name().await.unwrap(), "Unknown Network (31337)");
    }

    #[tokio::test]
    async fn unsupported_network_has_no_factory() {
        let session = WalletSession::new(
            Arc::new(MockLedger::new().with_chain(CHAIN_ETHEREUM).with_account(user())),
            registry(),
        );
        let err = session.factory_address().await.unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("supported network")));
        assert!(session.has_meta_vault(None).await.is_err());
    }

    #[tokio::test]
    async fn lookup_uses_connected_account_by_default() {
        let mv = Address::repeat_byte(0xAA);
        let ledger = MockLedger::new()
            .with_chain(CHAIN_SEPOLIA)
            .with_account(user())
            .with_user_meta_vault(user(), mv);
        let session = WalletSession::new(Arc::new(ledger), registry());

        assert!(session.has_meta_vault(None).await.unwrap());
        assert_eq!(session.current_meta_vault().await.unwrap(), Some(mv));
        assert!(!session.has_meta_vault(Some(Address::repeat_byte(0x22))).await.unwrap());
        assert_eq!(
            session.user_meta_vault(Some(Address::repeat_byte(0x22))).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn resolution_prefers_configured_and_surfaces_lookup_failures() {
        let configured = Address::repeat_byte(0xBB);
        let ledger = Arc::new(MockLedger::new().with_chain(CHAIN_ETHEREUM).with_account(user()));
        let session = WalletSession::new(ledger.clone(), registry());

        assert_eq!(session.resolve_meta_vault(Some(configured)).await.unwrap(), Some(configured));
        assert_eq!(ledger.reads(), 0);

        // Account present but no factory on this chain: an error, not "no MetaVault".
        let err = session.resolve_meta_vault(None).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        let err = session.resolve_meta_vault(Some(Address::ZERO)).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let no_account = WalletSession::new(Arc::new(MockLedger::new().with_chain(CHAIN_ETHEREUM)), registry());
        assert_eq!(no_account.resolve_meta_vault(None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_deploys_once_per_owner() {
        let ledger = Arc::new(MockLedger::new().with_chain(CHAIN_SEPOLIA).with_account(user()));
        let session = WalletSession::new(ledger.clone(), registry());

        let (_, created) = session.create_meta_vault().await.unwrap();
        assert_eq!(created, Some(Address::repeat_byte(0xC0)));
        assert_eq!(ledger.sent(), vec![(factory(), ContractCall::CreateMetaVault)]);

        let again = session.create_meta_vault().await.unwrap_err();
        assert!(matches!(again, AppError::Validation { ref field, .. } if field == "meta_vault"));
        assert_eq!(ledger.sent().len(), 1);
    }

    #[tokio::test]
    async fn create_requires_a_connected_account() {
        let session = WalletSession::new(Arc::new(MockLedger::new().with_chain(CHAIN_SEPOLIA)), registry());
        let err = session.create_meta_vault().await.unwrap_err();
        assert!(matches!(err, AppError::Bridge(BridgeError::NotConnected)));
    }
}
