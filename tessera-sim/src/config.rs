//! Simulator configuration
//!
//! The TOML file carries the same sections as the firmware's harness.toml
//! plus a `[sim]` section describing the simulated board. Every key is
//! optional.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tessera_core::config::HarnessConfig;

/// Behaviour of the simulated peripherals
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimOptions {
    /// Milliseconds between simulated button presses, 0 for none
    pub button_interval_ms: u64,
    /// PLMN the modem reports in `+COPS?`
    pub operator: String,
    /// Whether the accelerometer answers on the bus
    pub accel_present: bool,
    /// Whether the modem registers on the network
    pub link_up: bool,
    /// Every Nth modem reply arrives only after the host has timed out; 0 for never
    pub late_reply_every: u32,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            button_interval_ms: 1500,
            operator: "311480".to_string(),
            accel_present: true,
            link_up: true,
            late_reply_every: 0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SimSection {
    sim: SimOptions,
}

/// Everything the simulator reads from its config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimConfig {
    pub harness: HarnessConfig,
    pub sim: SimOptions,
}

impl SimConfig {
    /// Parse and validate a configuration document
    pub fn parse(text: &str) -> Result<Self> {
        let harness: HarnessConfig = toml::from_str(text).context("invalid harness sections")?;
        let section: SimSection = toml::from_str(text).context("invalid [sim] section")?;

        let config = Self {
            harness,
            sim: section.sim,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Check the harness values
    pub fn validate(&self) -> Result<()> {
        self.harness
            .validate()
            .map_err(|e| anyhow!("invalid harness configuration: {:?}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::config::ConfigError;

    #[test]
    fn test_empty_document_is_all_defaults() {
        let config = SimConfig::parse("").unwrap();
        assert_eq!(config, SimConfig::default());
        assert_eq!(config.harness.dashboard.columns, 3);
        assert_eq!(config.harness.poster.thing.as_str(), "tessera_dashboard");
        assert!(config.sim.accel_present);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = SimConfig::parse(
            "[dashboard]\ncolumns = 2\n\n[poster]\nthing = \"bench\"\n\n[sim]\nlink_up = false\n",
        )
        .unwrap();

        assert_eq!(config.harness.dashboard.columns, 2);
        assert_eq!(config.harness.dashboard.rows, 3);
        assert_eq!(config.harness.poster.thing.as_str(), "bench");
        assert_eq!(config.harness.poster.period_s, 60);
        assert!(!config.sim.link_up);
        assert_eq!(config.sim.operator, "311480");
    }

    #[test]
    fn test_zero_rate_rejected() {
        let err = SimConfig::parse("[accel]\nsample_rate_hz = 0\n").unwrap_err();
        let expected = format!("{:?}", ConfigError::ZeroRate("accel.sample_rate_hz"));
        assert!(err.to_string().contains(&expected), "{err}");
    }

    #[test]
    fn test_zero_grid_rejected() {
        assert!(SimConfig::parse("[dashboard]\nrows = 0\n").is_err());
    }

    #[test]
    fn test_wrong_type_rejected() {
        assert!(SimConfig::parse("[cell]\nselect_sim = \"yes\"\n").is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = SimConfig::load(Path::new("/nonexistent/sim.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/sim.toml"));
    }
}
