//! # Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file is a valid config.
//!
//! ```toml
//! [coalescer]
//! initial_capacity = 100
//! reentry = "next_drain"   # or "same_pass"
//!
//! [frame_loop]
//! tick_rate = 60
//! max_frames = 600
//! ```

use std::path::Path;

use framelatch_core::CoalescerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{HostError, HostResult};
use crate::DEFAULT_TICK_RATE;

/// Frame loop settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameLoopConfig {
    /// Ticks per second.
    pub tick_rate: u32,
    /// Stop after this many frames. `None` runs until stopped.
    pub max_frames: Option<u64>,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            max_frames: None,
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramelatchConfig {
    /// `[coalescer]` table.
    pub coalescer: CoalescerConfig,
    /// `[frame_loop]` table.
    pub frame_loop: FrameLoopConfig,
}

impl FramelatchConfig {
    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema, or
    /// if validation fails.
    pub fn from_toml_str(text: &str) -> HostResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> HostResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| HostError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks values serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidTickRate`] for a zero tick rate.
    pub fn validate(&self) -> HostResult<()> {
        if self.frame_loop.tick_rate == 0 {
            return Err(HostError::InvalidTickRate(0));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framelatch_core::ReentryPolicy;

    #[test]
    fn test_empty_config_is_default() {
        let config = FramelatchConfig::from_toml_str("").unwrap();
        assert_eq!(config, FramelatchConfig::default());
        assert_eq!(config.frame_loop.tick_rate, 60);
        assert_eq!(config.coalescer.initial_capacity, 100);
    }

    #[test]
    fn test_full_config() {
        let config = FramelatchConfig::from_toml_str(
            r#"
            [coalescer]
            initial_capacity = 16
            reentry = "same_pass"

            [frame_loop]
            tick_rate = 120
            max_frames = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.coalescer.initial_capacity, 16);
        assert_eq!(config.coalescer.reentry, ReentryPolicy::SamePass);
        assert_eq!(config.frame_loop.tick_rate, 120);
        assert_eq!(config.frame_loop.max_frames, Some(10));
    }

    #[test]
    fn test_partial_table_keeps_defaults() {
        let config = FramelatchConfig::from_toml_str("[frame_loop]\nmax_frames = 3\n").unwrap();
        assert_eq!(config.frame_loop.tick_rate, 60);
        assert_eq!(config.coalescer.reentry, ReentryPolicy::NextDrain);
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        let err = FramelatchConfig::from_toml_str("[frame_loop]\ntick_rate = 0\n").unwrap_err();
        assert!(matches!(err, HostError::InvalidTickRate(0)));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err = FramelatchConfig::from_toml_str("[coalescer]\nreentry = \"sometimes\"\n")
            .unwrap_err();
        assert!(matches!(err, HostError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = FramelatchConfig::from_file("/nonexistent/framelatch.toml").unwrap_err();
        assert!(matches!(err, HostError::ConfigIo { .. }));
        assert!(err.to_string().contains("/nonexistent/framelatch.toml"));
    }
}
