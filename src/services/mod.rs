// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod allocation_manager;
pub mod deposit;
pub mod vault_reader;
pub mod wallet;
