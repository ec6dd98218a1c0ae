//! Weak block configuration from environment variables.

use std::env;
use thiserror::Error;

/// Default ratio of full difficulty at which a block is considered weak.
pub const DEFAULT_CONSIDER_POW_RATIO: u32 = 30;

/// Default minimum ratio of full difficulty accepted for a weak block.
pub const DEFAULT_MIN_POW_RATIO: u32 = 600;

/// Ratios used on networks without difficulty retargeting.
pub const NO_RETARGETING_CONSIDER_POW_RATIO: u32 = 4;
pub const NO_RETARGETING_MIN_POW_RATIO: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Consider PoW ratio {consider} exceeds minimum PoW ratio {minimum}")]
    ConsiderRatioAboveMinimum { consider: u32, minimum: u32 },

    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Weak block feature configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeakBlocksConfig {
    /// Whether weak blocks are tracked at all.
    pub enabled: bool,

    /// Target ratio between full and weak difficulty when mining.
    pub consider_pow_ratio: u32,

    /// Largest ratio between full and weak difficulty a peer's weak block
    /// may have. Must not be below `consider_pow_ratio`.
    pub min_pow_ratio: u32,
}

impl Default for WeakBlocksConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            consider_pow_ratio: DEFAULT_CONSIDER_POW_RATIO,
            min_pow_ratio: DEFAULT_MIN_POW_RATIO,
        }
    }
}

impl WeakBlocksConfig {
    /// Defaults for a network. Networks without retargeting use fixed,
    /// much lower ratios.
    pub fn for_network(no_retargeting: bool) -> Self {
        if no_retargeting {
            Self {
                consider_pow_ratio: NO_RETARGETING_CONSIDER_POW_RATIO,
                min_pow_ratio: NO_RETARGETING_MIN_POW_RATIO,
                ..Self::default()
            }
        } else {
            Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_WEAKBLOCKS_ENABLE`: `true`/`1` or `false`/`0` (default: true)
    /// - `QC_WEAKBLOCKS_CONSIDER_POW_RATIO`: (default: 30)
    /// - `QC_WEAKBLOCKS_MIN_POW_RATIO`: (default: 600)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup. Missing variables keep
    /// their defaults; malformed ones are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("QC_WEAKBLOCKS_ENABLE") {
            config.enabled = parse_flag("QC_WEAKBLOCKS_ENABLE", value)?;
        }
        if let Some(value) = lookup("QC_WEAKBLOCKS_CONSIDER_POW_RATIO") {
            config.consider_pow_ratio = parse_ratio("QC_WEAKBLOCKS_CONSIDER_POW_RATIO", value)?;
        }
        if let Some(value) = lookup("QC_WEAKBLOCKS_MIN_POW_RATIO") {
            config.min_pow_ratio = parse_ratio("QC_WEAKBLOCKS_MIN_POW_RATIO", value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Startup check: the consider ratio must not exceed the minimum ratio.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.consider_pow_ratio > self.min_pow_ratio {
            return Err(ConfigError::ConsiderRatioAboveMinimum {
                consider: self.consider_pow_ratio,
                minimum: self.min_pow_ratio,
            });
        }
        Ok(())
    }
}

fn parse_flag(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { var, value }),
    }
}

fn parse_ratio(var: &'static str, value: String) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(ratio) if ratio > 0 => Ok(ratio),
        _ => Err(ConfigError::InvalidValue { var, value }),
    }
}
