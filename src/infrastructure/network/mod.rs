// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod bridge;
pub mod dry_run;
pub mod provider;
pub mod rpc_bridge;

#[cfg(test)]
pub(crate) mod mock;
