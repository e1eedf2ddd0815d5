//! # Runtime Configuration
//!
//! Coroutine runtime settings read from the environment at startup.
//!
//! ### `KENNEL_STACK_SIZE`
//!
//! Stack size for handler coroutines, decimal (`65536`) or hex (`0x10000`).
//! Defaults to 64 KB. Unparseable values fall back to the default.

use std::env;

pub const DEFAULT_STACK_SIZE: usize = 0x10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let stack_size = lookup("KENNEL_STACK_SIZE")
            .and_then(|val| parse_size(&val))
            .unwrap_or(DEFAULT_STACK_SIZE);
        Self { stack_size }
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
    .filter(|size| *size > 0)
}
