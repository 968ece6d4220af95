// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

// =============================================================================
// NETWORK CONSTANTS
// =============================================================================

pub const CHAIN_ETHEREUM: u64 = 1;
pub const CHAIN_GOERLI: u64 = 5;
pub const CHAIN_SEPOLIA: u64 = 11_155_111;

pub fn builtin_network_name(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        CHAIN_ETHEREUM => Some("Ethereum Mainnet"),
        CHAIN_GOERLI => Some("Goerli Testnet"),
        CHAIN_SEPOLIA => Some("Sepolia Testnet"),
        _ => None,
    }
}

// =============================================================================
// ALLOCATION CONSTANTS
// =============================================================================

/// 10_000 basis points == 100%.
pub const MAX_ALLOCATION_BPS: u64 = 10_000;
pub const BPS_PER_PERCENT: u64 = 100;

// =============================================================================
// TRANSACTION CONSTANTS
// =============================================================================

pub const DEFAULT_RECEIPT_TIMEOUT_MS: u64 = 120_000;
pub const DEFAULT_RECEIPT_CONFIRM_BLOCKS: u64 = 1;
pub const DEFAULT_READ_RETRY_ATTEMPTS: usize = 3;
pub const DEFAULT_READ_RETRY_DELAY_MS: u64 = 100;

/// JSON-RPC code wallets use for a user-declined request (EIP-1193).
pub const RPC_CODE_USER_REJECTED: i64 = 4001;
/// JSON-RPC code nodes use for execution reverted.
pub const RPC_CODE_EXECUTION_REVERTED: i64 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_networks_have_names() {
        assert_eq!(builtin_network_name(1), Some("Ethereum Mainnet"));
        assert_eq!(builtin_network_name(11_155_111), Some("Sepolia Testnet"));
        assert_eq!(builtin_network_name(42161), None);
    }
}
