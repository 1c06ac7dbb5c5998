//! # Runtime Configuration
//!
//! Coroutine runtime settings read from the environment at startup.
//!
//! ## `BRRTB_STACK_SIZE`
//!
//! Stack size of each `may` coroutine, decimal (`16384`) or hexadecimal
//! (`0x4000`). Default `0x4000` (16 KB). Handlers here are shallow and
//! allocation-light, so the default is enough; raise it for deeper handlers.
//!
//! ```rust
//! use brrtbind::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! assert!(config.stack_size > 0);
//! ```

use std::env;

/// Default coroutine stack size (16 KB)
pub const DEFAULT_STACK_SIZE: usize = 0x4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Coroutine stack size in bytes
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
        let stack_size = env::var("BRRTB_STACK_SIZE")
            .ok()
            .and_then(|v| parse_size(&v))
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig { stack_size }
    }

    /// Apply the settings to the global `may` configuration.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

/// Decimal or `0x`-prefixed hexadecimal; zero is rejected.
fn parse_size(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    };
    parsed.filter(|&n| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("0x8000"), Some(0x8000));
        assert_eq!(parse_size("32768"), Some(32768));
        assert_eq!(parse_size(" 0X10 "), Some(16));
        assert_eq!(parse_size("0"), None);
        assert_eq!(parse_size("big"), None);
    }

    #[test]
    fn test_default() {
        assert_eq!(RuntimeConfig::default().stack_size, 0x4000);
    }
}
