// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::constants::{CHAIN_ETHEREUM, CHAIN_GOERLI, CHAIN_SEPOLIA, builtin_network_name};
use crate::domain::error::AppError;
use crate::network::provider::HttpProvider;
use alloy::primitives::Address;
use alloy::providers::Provider;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Static deployment data for one network.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkEntry {
    pub name: Option<String>,
    pub factory: Option<Address>,
}

#[derive(Deserialize, Debug)]
struct AddressRegistryFile {
    chains: HashMap<String, NetworkEntryFile>,
}

#[derive(Deserialize, Debug)]
struct NetworkEntryFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    factory: Option<String>,
}

/// Chain id -> factory deployment. Chain ids are opaque selectors here.
#[derive(Clone, Debug, Default)]
pub struct AddressRegistry {
    chains: HashMap<u64, NetworkEntry>,
}

impl AddressRegistry {
    /// Supported networks with names only; factories come from configuration.
    pub fn builtin() -> Self {
        let chains = [CHAIN_ETHEREUM, CHAIN_GOERLI, CHAIN_SEPOLIA]
            .into_iter()
            .map(|id| {
                (
                    id,
                    NetworkEntry {
                        name: builtin_network_name(id).map(ToString::to_string),
                        factory: None,
                    },
                )
            })
            .collect();
        Self { chains }
    }

    pub fn load_from_file(path: &str) -> Result<Self, AppError> {
        let p = Path::new(path);
        if !p.exists() {
            return Err(AppError::Config(format!(
                "Address registry not found: {}",
                path
            )));
        }
        let raw = fs::read_to_string(p)
            .map_err(|e| AppError::Config(format!("Failed to read registry {}: {e}", path)))?;
        Self::from_json(&raw)
            .map_err(|e| AppError::Config(format!("Failed to parse registry {}: {e}", path)))
    }

    fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let file: AddressRegistryFile = serde_json::from_str(raw)?;

        let mut chains = HashMap::new();
        for (chain_str, entry) in file.chains {
            let Ok(chain_id) = chain_str.trim().parse::<u64>() else {
                tracing::warn!(target: "registry", chain = %chain_str, "Skipping non-numeric chain id");
                continue;
            };
            let factory = entry.factory.as_deref().and_then(|s| {
                let parsed = Address::from_str(s.trim()).ok();
                if parsed.is_none() {
                    tracing::warn!(target: "registry", chain_id, factory = %s, "Skipping invalid factory address");
                }
                parsed
            });
            chains.insert(
                chain_id,
                NetworkEntry {
                    name: entry.name,
                    factory,
                },
            );
        }
        Ok(Self { chains })
    }

    /// Overlay `other`; its non-empty fields win.
    pub fn merge(&mut self, other: AddressRegistry) {
        for (chain_id, entry) in other.chains {
            let slot = self.chains.entry(chain_id).or_default();
            if entry.name.is_some() {
                slot.name = entry.name;
            }
            if entry.factory.is_some() {
                slot.factory = entry.factory;
            }
        }
    }

    pub fn set_factory(&mut self, chain_id: u64, factory: Address) {
        self.chains.entry(chain_id).or_default().factory = Some(factory);
    }

    pub fn factory(&self, chain_id: u64) -> Option<Address> {
        self.chains.get(&chain_id).and_then(|c| c.factory)
    }

    pub fn network_name(&self, chain_id: u64) -> Option<String> {
        self.chains.get(&chain_id).and_then(|c| c.name.clone())
    }

    pub fn is_supported(&self, chain_id: u64) -> bool {
        self.factory(chain_id).is_some()
    }
}

/// Warn when the configured factory has no bytecode on the connected chain.
pub async fn factory_has_code(provider: &HttpProvider, chain_id: u64, factory: Address) -> bool {
    match provider.get_code_at(factory).await {
        Ok(code) if !code.is_empty() => true,
        Ok(_) => {
            tracing::warn!(
                target: "registry",
                chain_id,
                address = %format!("{:#x}", factory),
                "Factory address has no code"
            );
            false
        }
        Err(e) => {
            tracing::warn!(
                target: "registry",
                chain_id,
                address = %format!("{:#x}", factory),
                error = %e,
                "Failed to fetch factory code; treating as invalid"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_names_networks_without_factories() {
        let reg = AddressRegistry::builtin();
        assert_eq!(reg.network_name(CHAIN_GOERLI).as_deref(), Some("Goerli Testnet"));
        assert!(!reg.is_supported(CHAIN_ETHEREUM));
    }

    #[test]
    fn file_entries_skip_bad_chain_ids_and_addresses() {
        let reg = AddressRegistry::from_json(
            r#"{
  "chains": {
    "11155111": { "factory": "0x9f2aFA649C0b23661fB51D12ba6fFc552E675507" },
    "mainnet": { "factory": "0x9f2aFA649C0b23661fB51D12ba6fFc552E675507" },
    "31337": { "name": "Anvil", "factory": "not-an-address" }
  }
}"#,
        )
        .expect("parse registry");

        assert!(reg.is_supported(CHAIN_SEPOLIA));
        assert_eq!(reg.network_name(31337).as_deref(), Some("Anvil"));
        assert_eq!(reg.factory(31337), None);
        assert_eq!(reg.chains.len(), 2);
    }

    #[test]
    fn merge_keeps_builtin_names_when_file_omits_them() {
        let mut reg = AddressRegistry::builtin();
        let file = AddressRegistry::from_json(
            r#"{ "chains": { "1": { "factory": "0x0000000000000000000000000000000000000abc" } } }"#,
        )
        .unwrap();
        reg.merge(file);
        assert_eq!(reg.network_name(CHAIN_ETHEREUM).as_deref(), Some("Ethereum Mainnet"));
        assert_eq!(
            reg.factory(CHAIN_ETHEREUM),
            Some(Address::from_str("0x0000000000000000000000000000000000000abc").unwrap())
        );
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = AddressRegistry::load_from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("not found")));
    }
}
