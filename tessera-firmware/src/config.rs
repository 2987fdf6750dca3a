//! Harness configuration
//!
//! `harness()` is generated by build.rs from harness.toml, which is
//! validated at build time.

use tessera_core::config::{
    AccelConfig, BlinkyConfig, CellConfig, ConfigError, DashboardConfig, HarnessConfig,
    PosterConfig,
};

include!(concat!(env!("OUT_DIR"), "/harness.rs"));
