// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use alloy::network::{Ethereum, EthereumWallet};
use alloy::providers::{DynProvider, Provider, ProviderBuilder, RootProvider};
use alloy::signers::local::PrivateKeySigner;
use url::Url;

pub type HttpProvider = RootProvider<Ethereum>;
/// Provider with fillers (nonce, gas, chain id) and an optional local wallet.
pub type LedgerProvider = DynProvider<Ethereum>;

pub struct ConnectionFactory;

impl ConnectionFactory {
    fn parse_url(rpc_url: &str) -> Result<Url, AppError> {
        Url::parse(rpc_url.trim()).map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))
    }

    /// Bare read-only provider.
    pub fn http(rpc_url: &str) -> Result<HttpProvider, AppError> {
        let url = Self::parse_url(rpc_url)?;
        Ok(RootProvider::new_http(url))
    }

    /// Provider used by the ledger bridge; signs locally when a key is configured.
    pub fn ledger(rpc_url: &str, signer: Option<PrivateKeySigner>) -> Result<LedgerProvider, AppError> {
        let url = Self::parse_url(rpc_url)?;
        let provider = match signer {
            Some(signer) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_http(url)
                .erased(),
            None => ProviderBuilder::new().connect_http(url).erased(),
        };
        Ok(provider)
    }
}
