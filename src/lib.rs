// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod app;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Short paths used across the crate
pub use infrastructure::data;
pub use infrastructure::network;
pub use services::allocation_manager::AllocationManager;
pub use services::deposit::{DepositFlow, DepositReceipt};
pub use services::vault_reader::VaultReader;
pub use services::wallet::WalletSession;
