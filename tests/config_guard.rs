// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use regex::Regex;
use std::fs;
use std::path::Path;

/// Fail CI if config files contain 64-hex private keys.
#[test]
fn no_committed_hex_keys_in_configs() {
    let re = Regex::new(r"0x?[a-fA-F0-9]{64}").unwrap();
    let candidates = ["config.toml", "config.example.toml", "config.dev.toml", ".env.example"];
    for file in candidates {
        if !Path::new(file).exists() {
            continue;
        }
        let body = fs::read_to_string(file).expect("read config");
        for (idx, line) in body.lines().enumerate() {
            if re.is_match(line) {
                panic!("Secret-looking hex in {} at line {}", file, idx + 1);
            }
        }
    }
}

/// The example config must not be marked active, or it would shadow a real one.
#[test]
fn example_config_is_not_active() {
    let file = "config.example.toml";
    if !Path::new(file).exists() {
        return;
    }
    let body = fs::read_to_string(file).expect("read config");
    let re = Regex::new(r"(?m)^\s*THIS_ACTIVE\s*=\s*true").unwrap();
    assert!(!re.is_match(&body), "{file} must not set THIS_ACTIVE = true");
}
