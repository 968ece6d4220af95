// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::parsing::{parse_address_hex, parse_optional_address};
use crate::common::retry::RetryPolicy;
use crate::domain::constants;
use crate::domain::error::AppError;
use crate::infrastructure::data::address_registry::AddressRegistry;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalSettings {
    // General
    #[serde(default)]
    pub debug: bool,
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_json: bool,
    /// Do not submit transactions, only validate and log them.
    #[serde(default)]
    pub dry_run: bool,

    // Network
    pub chain_id: Option<u64>,
    pub http_providers: Option<HashMap<String, String>>,

    // Identity
    pub wallet_key: Option<String>,
    pub meta_vault_address: Option<String>,

    // Contracts
    /// Chain id -> MetaVault factory address; wins over the registry file.
    pub factory_addresses: Option<HashMap<String, String>>,
    pub address_registry_path: Option<String>,

    // Transactions
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,
    #[serde(default = "default_receipt_confirm_blocks")]
    pub receipt_confirm_blocks: u64,
    #[serde(default = "default_read_retry_attempts")]
    pub read_retry_attempts: usize,
    #[serde(default = "default_read_retry_delay_ms")]
    pub read_retry_delay_ms: u64,
}

// Defaults
fn default_receipt_timeout_ms() -> u64 {
    constants::DEFAULT_RECEIPT_TIMEOUT_MS
}
fn default_receipt_confirm_blocks() -> u64 {
    constants::DEFAULT_RECEIPT_CONFIRM_BLOCKS
}
fn default_read_retry_attempts() -> usize {
    constants::DEFAULT_READ_RETRY_ATTEMPTS
}
fn default_read_retry_delay_ms() -> u64 {
    constants::DEFAULT_READ_RETRY_DELAY_MS
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: None,
            log_json: false,
            dry_run: false,
            chain_id: None,
            http_providers: None,
            wallet_key: None,
            meta_vault_address: None,
            factory_addresses: None,
            address_registry_path: None,
            receipt_timeout_ms: default_receipt_timeout_ms(),
            receipt_confirm_blocks: default_receipt_confirm_blocks(),
            read_retry_attempts: default_read_retry_attempts(),
            read_retry_delay_ms: default_read_retry_delay_ms(),
        }
    }
}

impl GlobalSettings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let selected_config = resolve_config_path(path);
        let mut builder = Config::builder();

        if let Some(ref selected_path) = selected_config {
            builder = builder.add_source(File::from(Path::new(selected_path)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        // Deterministic precedence: CLI (in main) > env/.env > selected profile file.
        builder = builder.add_source(Environment::default());

        let settings: GlobalSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;

        if let Some(path) = selected_config {
            tracing::debug!(target: "config", path = %path, "Loaded configuration file");
        }
        Ok(settings)
    }

    pub fn load() -> Result<Self, AppError> {
        Self::load_with_path(None)
    }

    /// Fail early on malformed addresses and keys rather than at first use.
    fn validate(&self) -> Result<(), AppError> {
        self.meta_vault_address()?;
        self.factory_overrides()?;
        self.wallet_signer()?;
        if self.receipt_timeout_ms == 0 {
            return Err(AppError::Config(
                "receipt_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn log_level_value(&self) -> String {
        self.log_level
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .unwrap_or_else(|| if self.debug { "debug" } else { "info" }.to_string())
    }

    /// Best-effort primary HTTP RPC URL when the chain is not known yet.
    pub fn primary_http_provider(&self) -> Option<String> {
        // Prefer explicit map entry with smallest key
        if let Some(map) = &self.http_providers
            && let Some((_, v)) = map
                .iter()
                .filter_map(|(k, v)| k.parse::<u64>().ok().map(|id| (id, v)))
                .min_by_key(|(id, _)| *id)
        {
            return Some(v.clone());
        }
        env_non_empty("http_provider")
    }

    /// Helper to get RPC URL for a specific chain
    pub fn get_http_provider(&self, chain_id: u64) -> Result<String, AppError> {
        if let Some(urls) = &self.http_providers
            && let Some(url) = urls.get(&chain_id.to_string())
        {
            return Ok(url.clone());
        }

        // Fallback to env var convention: http_provider_1, http_provider_137, then generic http_provider
        let candidates = [format!("http_provider_{}", chain_id), "http_provider".to_string()];
        for key in candidates {
            if let Some(v) = env_non_empty(&key) {
                return Ok(v);
            }
        }

        Err(AppError::Config(format!(
            "No RPC URL found for chain {}",
            chain_id
        )))
    }

    /// RPC URL for the configured chain, or the primary one when no chain is pinned.
    pub fn rpc_url(&self) -> Result<String, AppError> {
        match self.chain_id {
            Some(chain_id) => self.get_http_provider(chain_id),
            None => self
                .primary_http_provider()
                .ok_or_else(|| AppError::Config("No RPC URL configured".to_string())),
        }
    }

    pub fn wallet_signer(&self) -> Result<Option<PrivateKeySigner>, AppError> {
        let Some(key) = self
            .wallet_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return Ok(None);
        };
        PrivateKeySigner::from_str(key)
            .map(Some)
            .map_err(|e| AppError::Config(format!("Invalid wallet key: {}", e)))
    }

    pub fn meta_vault_address(&self) -> Result<Option<Address>, AppError> {
        parse_optional_address(self.meta_vault_address.as_deref())
            .map_err(|e| AppError::Config(format!("meta_vault_address: {e}")))
    }

    pub fn factory_overrides(&self) -> Result<HashMap<u64, Address>, AppError> {
        let Some(raw) = &self.factory_addresses else {
            return Ok(HashMap::new());
        };
        parse_chain_address_map(raw, "factory_addresses")
    }

    /// Built-in networks, then the registry file (if configured), then explicit overrides.
    pub fn address_registry(&self) -> Result<AddressRegistry, AppError> {
        let mut registry = AddressRegistry::builtin();
        if let Some(path) = self
            .address_registry_path
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            registry.merge(AddressRegistry::load_from_file(path)?);
        }
        for (chain_id, factory) in self.factory_overrides()? {
            registry.set_factory(chain_id, factory);
        }
        Ok(registry)
    }

    pub fn read_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.read_retry_attempts.max(1),
            Duration::from_millis(self.read_retry_delay_ms),
        )
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_millis(self.receipt_timeout_ms.max(1))
    }

    pub fn receipt_confirm_blocks_value(&self) -> u64 {
        self.receipt_confirm_blocks.max(1)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn resolve_config_path(path: Option<&str>) -> Option<String> {
    if let Some(path) = path {
        return Some(path.to_string());
    }
    detect_active_config_file()
}

fn detect_active_config_file() -> Option<String> {
    let priority_files = [
        "config.prod.toml",
        "config.dev.toml",
        "config.testnet.toml",
        "config.toml",
    ];

    for file in priority_files.iter() {
        if let Some(true) = config_has_active_flag(file) {
            return Some((*file).to_string());
        }
    }

    // Fallback: scan current dir for config.*.toml with THIS_ACTIVE = true
    if let Ok(entries) = fs::read_dir(".") {
        let mut names: Vec<String> = entries
            .flatten()
            .filter_map(|e| e.file_name().to_str().map(ToString::to_string))
            .filter(|name| name.starts_with("config.") && name.ends_with(".toml"))
            .collect();
        names.sort();
        for name in names {
            if let Some(true) = config_has_active_flag(&name) {
                return Some(name);
            }
        }
    }

    None
}

fn config_has_active_flag(path: &str) -> Option<bool> {
    let p = Path::new(path);
    if !p.exists() {
        return None;
    }

    Config::builder()
        .add_source(File::from(p))
        .build()
        .ok()?
        .get_bool("THIS_ACTIVE")
        .ok()
}

fn parse_chain_address_map(
    raw: &HashMap<String, String>,
    field: &str,
) -> Result<HashMap<u64, Address>, AppError> {
    raw.iter()
        .map(|(k, v)| {
            let chain_id = k
                .trim()
                .parse::<u64>()
                .map_err(|_| AppError::Config(format!("{field}: invalid chain id '{k}'")))?;
            let address = parse_address_hex(v)
                .map_err(|_| AppError::Config(format!("{field}.{k}: invalid address '{v}'")))?;
            Ok((chain_id, address))
        })
        .collect()
}
