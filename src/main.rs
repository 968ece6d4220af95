// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use clap::{Parser, Subcommand};
use metavault_allocator::app::config::GlobalSettings;
use metavault_allocator::app::logging::setup_logging;
use metavault_allocator::common::parsing::{parse_address_hex, parse_optional_address, parse_token_amount};
use metavault_allocator::data::address_registry::{AddressRegistry, factory_has_code};
use metavault_allocator::domain::error::AppError;
use metavault_allocator::network::bridge::LedgerBridge;
use metavault_allocator::network::dry_run::DryRunBridge;
use metavault_allocator::network::provider::ConnectionFactory;
use metavault_allocator::network::rpc_bridge::RpcBridge;
use metavault_allocator::{AllocationManager, DepositFlow, WalletSession};
use alloy::primitives::Address;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "MetaVault allocation manager")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// MetaVault to operate on (overrides config/env and factory lookup)
    #[arg(long, global = true)]
    meta_vault: Option<String>,

    /// Emit JSON logs on stderr
    #[arg(long, default_value_t = false, global = true)]
    json_logs: bool,

    /// Validate and log transactions without submitting them
    #[arg(long, default_value_t = false, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the active vaults as JSON
    List,
    /// Print the summed allocation of active vaults
    Total,
    /// Check whether a vault id is active
    IsActive { vault_id: String },
    /// Set a vault's allocation, in percent
    Update { vault_id: String, percent: f64 },
    /// Register an underlying vault with an initial allocation, in percent
    Add { vault: String, percent: f64 },
    /// Drop an underlying vault
    Remove { vault: String },
    /// Approve and deposit an ERC-20 amount, in token base units
    Deposit { token: String, amount: String },
    /// Show the connected account, network and MetaVault
    Whoami,
    /// Deploy a MetaVault for the connected account
    Create,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let settings = GlobalSettings::load_with_path(cli.config.as_deref())?;
    setup_logging(&settings.log_level_value(), cli.json_logs || settings.log_json)?;
    let dry_run = cli.dry_run || settings.dry_run;

    let rpc_url = settings.rpc_url()?;
    let signer = settings.wallet_signer()?;
    let signer_address = signer.as_ref().map(|s| s.address());
    let provider = ConnectionFactory::ledger(&rpc_url, signer)?;

    let rpc_bridge: Arc<dyn LedgerBridge> = Arc::new(RpcBridge::new(
        provider,
        signer_address,
        settings.read_retry_policy(),
        settings.receipt_timeout(),
        settings.receipt_confirm_blocks_value(),
    ));
    let bridge: Arc<dyn LedgerBridge> = if dry_run {
        tracing::warn!(target: "config", "Dry run: transactions will be logged, not sent");
        Arc::new(DryRunBridge::new(rpc_bridge))
    } else {
        rpc_bridge
    };

    let chain_id = bridge.chain_id().await?;
    if let Some(expected) = settings.chain_id
        && expected != chain_id
    {
        return Err(AppError::Config(format!(
            "RPC reports chain {chain_id} but config pins chain {expected}"
        )));
    }

    let registry = settings.address_registry()?;
    check_factory(&rpc_url, &registry, chain_id).await?;

    let session = WalletSession::new(bridge.clone(), registry);
    let deposits = DepositFlow::new(bridge.clone());
    let manager = AllocationManager::new(bridge);

    tracing::info!(
        target: "config",
        chain_id,
        network = %session.network_name().await?,
        account = ?signer_address.map(|a| format!("{a:#x}")),
        dry_run,
        "Connected"
    );

    match cli.command {
        Command::List => {
            let meta_vault = resolve_meta_vault(cli.meta_vault.as_deref(), &settings, &session).await?;
            let vaults = manager.reader().list_vaults(meta_vault).await?;
            let json = serde_json::to_string_pretty(&vaults)
                .map_err(|e| anyhow::anyhow!("serialize vaults: {e}"))?;
            println!("{json}");
        }
        Command::Total => {
            let meta_vault = resolve_meta_vault(cli.meta_vault.as_deref(), &settings, &session).await?;
            println!("{}", manager.reader().total_allocation(meta_vault).await?);
        }
        Command::IsActive { vault_id } => {
            let meta_vault = resolve_meta_vault(cli.meta_vault.as_deref(), &settings, &session).await?;
            println!("{}", manager.reader().is_vault_active(meta_vault, &vault_id).await?);
        }
        Command::Update { vault_id, percent } => {
            let meta_vault = resolve_meta_vault(cli.meta_vault.as_deref(), &settings, &session).await?;
            let hash = manager
                .try_update_allocation(meta_vault, &vault_id, percent)
                .await?;
            println!("{hash}");
        }
        Command::Add { vault, percent } => {
            let meta_vault = resolve_meta_vault(cli.meta_vault.as_deref(), &settings, &session).await?;
            let vault = parse_address_hex(&vault)?;
            println!("{}", manager.add_vault(meta_vault, vault, percent).await?);
        }
        Command::Remove { vault } => {
            let meta_vault = resolve_meta_vault(cli.meta_vault.as_deref(), &settings, &session).await?;
            let vault = parse_address_hex(&vault)?;
            println!("{}", manager.remove_vault(meta_vault, vault).await?);
        }
        Command::Deposit { token, amount } => {
            let meta_vault = resolve_meta_vault(cli.meta_vault.as_deref(), &settings, &session).await?;
            let token = parse_address_hex(&token)?;
            let amount = parse_token_amount(&amount)?;
            let receipt = deposits.deposit(meta_vault, token, amount).await?;
            println!("approve: {}", receipt.approve_tx);
            println!("deposit: {}", receipt.deposit_tx);
        }
        Command::Whoami => {
            let connected = session.connect_wallet().await;
            let account = session.connected_address().await?;
            let meta_vault = if connected {
                session.current_meta_vault().await.unwrap_or_else(|e| {
                    tracing::warn!(target: "wallet", error = %e, "MetaVault lookup failed");
                    None
                })
            } else {
                None
            };
            println!(
                "account: {}",
                account.map_or_else(|| "-".to_string(), |a| format!("{a:#x}"))
            );
            println!("network: {} ({chain_id})", session.network_name().await?);
            println!(
                "factory: {}",
                session
                    .factory_address()
                    .await
                    .map_or_else(|_| "-".to_string(), |a| format!("{a:#x}"))
            );
            println!(
                "meta_vault: {}",
                meta_vault.map_or_else(|| "-".to_string(), |a| format!("{a:#x}"))
            );
        }
        Command::Create => {
            if !session.connect_wallet().await {
                return Err(AppError::Config(
                    "wallet_key is required to create a MetaVault".to_string(),
                ));
            }
            let (hash, created) = session.create_meta_vault().await?;
            println!("tx: {hash}");
            println!(
                "meta_vault: {}",
                created.map_or_else(|| "-".to_string(), |a| format!("{a:#x}"))
            );
        }
    }
    Ok(())
}

/// CLI flag, then settings, then the factory record of the connected account.
async fn resolve_meta_vault(
    flag: Option<&str>,
    settings: &GlobalSettings,
    session: &WalletSession,
) -> Result<Option<Address>, AppError> {
    let configured = match parse_optional_address(flag)? {
        Some(addr) => Some(addr),
        None => settings.meta_vault_address()?,
    };
    let resolved = session.resolve_meta_vault(configured).await?;
    if resolved.is_none() {
        tracing::warn!(target: "config", "No MetaVault configured or owned by the connected account");
    }
    Ok(resolved)
}

async fn check_factory(rpc_url: &str, registry: &AddressRegistry, chain_id: u64) -> Result<(), AppError> {
    let Some(factory) = registry.factory(chain_id) else {
        tracing::warn!(target: "registry", chain_id, "No MetaVault factory configured for this network");
        return Ok(());
    };
    let http = ConnectionFactory::http(rpc_url)?;
    if factory_has_code(&http, chain_id, factory).await {
        tracing::debug!(
            target: "registry",
            chain_id,
            factory = %format!("{factory:#x}"),
            "Factory verified"
        );
    }
    Ok(())
}
