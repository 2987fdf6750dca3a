//! Harness configuration
//!
//! Board-agnostic settings for every task in the harness. The firmware
//! bakes these in at build time from `harness.toml`; the simulator loads
//! the same file at run time.

use heapless::String;

use crate::grid::{GridError, GridGeometry};
use crate::poster::MAX_THING_LEN;

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Dashboard grid is unusable
    Grid(GridError),
    /// A rate or period is zero
    ZeroRate(&'static str),
    /// Thing name is empty, too long, or not URL-safe
    InvalidThing,
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        ConfigError::Grid(e)
    }
}

/// Dashboard layout and refresh
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct DashboardConfig {
    /// Windows per row
    pub columns: u16,
    /// Window rows
    pub rows: u16,
    /// Window width in characters
    pub window_width: u16,
    /// Window height in lines
    pub window_height: u16,
    /// Seconds between passes
    pub period_s: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            rows: 3,
            window_width: 20,
            window_height: 8,
            period_s: 1,
        }
    }
}

impl DashboardConfig {
    /// Grid geometry for these settings
    pub fn geometry(&self) -> Result<GridGeometry, GridError> {
        GridGeometry::new(
            self.columns,
            self.rows,
            self.window_width,
            self.window_height,
        )
    }
}

/// Accelerometer sampling
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct AccelConfig {
    /// Samples per second
    pub sample_rate_hz: u16,
}

impl Default for AccelConfig {
    fn default() -> Self {
        Self { sample_rate_hz: 10 }
    }
}

/// Cellular modem polling
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct CellConfig {
    /// Seconds between polls
    pub period_s: u16,
    /// Run the SIM select sequence before polling
    pub select_sim: bool,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            period_s: 10,
            select_sim: true,
        }
    }
}

/// LED blinker
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct BlinkyConfig {
    /// Full on/off cycles per second
    pub rate_hz: u16,
    /// GPIO number of the LED
    pub pin: u8,
}

impl Default for BlinkyConfig {
    fn default() -> Self {
        Self {
            rate_hz: 1,
            pin: 25,
        }
    }
}

/// Outbound poster
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct PosterConfig {
    /// Seconds between passes
    pub period_s: u16,
    /// Name requests are posted under
    pub thing: String<MAX_THING_LEN>,
}

impl Default for PosterConfig {
    fn default() -> Self {
        let mut thing = String::new();
        // Fits: shorter than MAX_THING_LEN
        let _ = thing.push_str(DEFAULT_THING);
        Self {
            period_s: 60,
            thing,
        }
    }
}

impl PosterConfig {
    /// Create a poster configuration
    pub fn with_thing(period_s: u16, thing: &str) -> Result<Self, ConfigError> {
        let mut name = String::new();
        name.push_str(thing).map_err(|_| ConfigError::InvalidThing)?;
        Ok(Self {
            period_s,
            thing: name,
        })
    }
}

/// Default thing name for posted requests
pub const DEFAULT_THING: &str = "tessera_dashboard";

/// Complete harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct HarnessConfig {
    pub dashboard: DashboardConfig,
    pub accel: AccelConfig,
    pub cell: CellConfig,
    pub blinky: BlinkyConfig,
    pub poster: PosterConfig,
}

impl HarnessConfig {
    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dashboard.geometry()?;

        let rates = [
            ("dashboard.period_s", self.dashboard.period_s),
            ("accel.sample_rate_hz", self.accel.sample_rate_hz),
            ("cell.period_s", self.cell.period_s),
            ("blinky.rate_hz", self.blinky.rate_hz),
            ("poster.period_s", self.poster.period_s),
        ];
        for (name, value) in rates {
            if value == 0 {
                return Err(ConfigError::ZeroRate(name));
            }
        }

        if !is_valid_thing(&self.poster.thing) {
            return Err(ConfigError::InvalidThing);
        }

        Ok(())
    }
}

/// Check a thing name fits a request path unescaped: `[A-Za-z0-9_-]+`
pub fn is_valid_thing(thing: &str) -> bool {
    !thing.is_empty()
        && thing
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
