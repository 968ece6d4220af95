// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use alloy::sol;
use alloy_sol_types::SolError;

sol! {
    #[sol(rpc)]
    interface IMetaVault {
        function getActiveVaults() external view returns (
            uint256[] memory ids,
            address[] memory addresses,
            uint256[] memory allocations
        );
        function updateAllocation(uint256 vaultId, uint256 newAllocation) external;
        function addVault(address vault, uint256 allocation) external;
        function removeVault(address vault) external;
        function deposit(address asset, uint256 amount) external;
        function owner() external view returns (address);

        error AllocationTooHigh();
        error InvalidAllocation();
        error TotalAllocationExceeded();
        error Unauthorized();
        error VaultAlreadyAdded();
        error VaultNotFound();
        error DailyLimitExceeded();
    }

    #[sol(rpc)]
    interface IMetaVaultFactory {
        function createMetaVault() external returns (address);
        function hasMetaVault(address user) external view returns (bool);
        function getUserMetaVault(address user) external view returns (address);
    }

    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }

    #[sol(rpc)]
    interface IYieldVault {
        function getAPY() external view returns (uint256);
    }
}

/// Name a MetaVault custom error from raw revert data, if it is one of ours.
pub fn decode_revert_reason(data: &[u8]) -> Option<&'static str> {
    let selector: [u8; 4] = data.get(..4)?.try_into().ok()?;
    let known: [([u8; 4], &'static str); 7] = [
        (IMetaVault::AllocationTooHigh::SELECTOR, "AllocationTooHigh"),
        (IMetaVault::InvalidAllocation::SELECTOR, "InvalidAllocation"),
        (
            IMetaVault::TotalAllocationExceeded::SELECTOR,
            "TotalAllocationExceeded",
        ),
        (IMetaVault::Unauthorized::SELECTOR, "Unauthorized"),
        (IMetaVault::VaultAlreadyAdded::SELECTOR, "VaultAlreadyAdded"),
        (IMetaVault::VaultNotFound::SELECTOR, "VaultNotFound"),
        (IMetaVault::DailyLimitExceeded::SELECTOR, "DailyLimitExceeded"),
    ];
    known
        .iter()
        .find(|(sel, _)| *sel == selector)
        .map(|(_, name)| *name)
}
