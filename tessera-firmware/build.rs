//! Build script for tessera-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates harness.toml at compile time
//! - Generates `harness()` from the validated values

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Longest thing name the poster accepts
const MAX_THING_LEN: usize = 64;

/// Highest user GPIO on the RP2040
const MAX_GPIO: i64 = 29;

/// GPIOs wired to the console, modem and accelerometer buses
const BUS_PINS: [i64; 6] = [0, 1, 2, 3, 4, 5];

/// GPIO wired to the button
const BUTTON_PIN: i64 = 6;

fn main() {
    setup_linker();
    let config = validate_config();
    generate_harness(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validated harness values, with defaults filled in
struct Harness {
    columns: i64,
    rows: i64,
    window_width: i64,
    window_height: i64,
    dashboard_period_s: i64,
    accel_rate_hz: i64,
    cell_period_s: i64,
    select_sim: bool,
    blinky_rate_hz: i64,
    blinky_pin: i64,
    poster_period_s: i64,
    thing: String,
}

/// Validate harness.toml configuration at compile time
fn validate_config() -> Harness {
    println!("cargo:rerun-if-changed=harness.toml");

    let config_path = Path::new("harness.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: harness.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a harness.toml configuration file.        ║\n\
            ║  Please create one in the tessera-firmware directory.            ║\n\
            ║  An empty file selects the board defaults.                       ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read harness.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in harness.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    let harness = Harness {
        columns: positive(&config, "dashboard", "columns", 3, &mut errors),
        rows: positive(&config, "dashboard", "rows", 3, &mut errors),
        window_width: positive(&config, "dashboard", "window_width", 20, &mut errors),
        window_height: positive(&config, "dashboard", "window_height", 8, &mut errors),
        dashboard_period_s: positive(&config, "dashboard", "period_s", 1, &mut errors),
        accel_rate_hz: positive(&config, "accel", "sample_rate_hz", 10, &mut errors),
        cell_period_s: positive(&config, "cell", "period_s", 10, &mut errors),
        select_sim: boolean(&config, "cell", "select_sim", true, &mut errors),
        blinky_rate_hz: positive(&config, "blinky", "rate_hz", 1, &mut errors),
        blinky_pin: positive_or_zero(&config, "blinky", "pin", 25, &mut errors),
        poster_period_s: positive(&config, "poster", "period_s", 60, &mut errors),
        thing: string(&config, "poster", "thing", "tessera_dashboard", &mut errors),
    };

    // The whole grid must be addressable in 16-bit screen coordinates
    if harness.columns * harness.window_width > i64::from(u16::MAX)
        || harness.rows * harness.window_height > i64::from(u16::MAX)
    {
        errors.push("[dashboard] grid is larger than the addressable screen".to_string());
    }

    if harness.blinky_pin > MAX_GPIO {
        errors.push(format!("[blinky] pin must be 0-{}", MAX_GPIO));
    } else if BUS_PINS.contains(&harness.blinky_pin) || harness.blinky_pin == BUTTON_PIN {
        errors.push(format!(
            "[blinky] pin {} is reserved for a bus or the button",
            harness.blinky_pin
        ));
    }

    if harness.thing.is_empty() {
        errors.push("[poster] thing must not be empty".to_string());
    } else if harness.thing.len() > MAX_THING_LEN {
        errors.push(format!(
            "[poster] thing must be at most {} bytes",
            MAX_THING_LEN
        ));
    } else if !harness
        .thing
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        errors.push("[poster] thing may only use letters, digits, '_' and '-'".to_string());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid harness configuration                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=harness.toml validated successfully");
    harness
}

/// Look up `[section] key`
fn lookup<'a>(config: &'a toml::Value, section: &str, key: &str) -> Option<&'a toml::Value> {
    config.get(section).and_then(|s| s.get(key))
}

/// Read a non-negative integer that fits in a u16
fn positive_or_zero(
    config: &toml::Value,
    section: &str,
    key: &str,
    default: i64,
    errors: &mut Vec<String>,
) -> i64 {
    match lookup(config, section, key) {
        None => default,
        Some(toml::Value::Integer(n)) if (0..=i64::from(u16::MAX)).contains(n) => *n,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be 0-{}", section, key, u16::MAX));
            default
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            default
        }
    }
}

/// Read a rate or dimension; zero is rejected
fn positive(
    config: &toml::Value,
    section: &str,
    key: &str,
    default: i64,
    errors: &mut Vec<String>,
) -> i64 {
    let value = positive_or_zero(config, section, key, default, errors);
    if value == 0 {
        errors.push(format!("[{}] {} must not be zero", section, key));
        return default;
    }
    value
}

fn boolean(
    config: &toml::Value,
    section: &str,
    key: &str,
    default: bool,
    errors: &mut Vec<String>,
) -> bool {
    match lookup(config, section, key) {
        None => default,
        Some(toml::Value::Boolean(b)) => *b,
        Some(_) => {
            errors.push(format!("[{}] {} must be true or false", section, key));
            default
        }
    }
}

fn string(
    config: &toml::Value,
    section: &str,
    key: &str,
    default: &str,
    errors: &mut Vec<String>,
) -> String {
    match lookup(config, section, key) {
        None => default.to_string(),
        Some(toml::Value::String(s)) => s.clone(),
        Some(_) => {
            errors.push(format!("[{}] {} must be a string", section, key));
            default.to_string()
        }
    }
}

/// Write `harness.rs` into OUT_DIR
fn generate_harness(h: &Harness) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let source = format!(
        "/// Harness configuration compiled from harness.toml\n\
        pub fn harness() -> Result<HarnessConfig, ConfigError> {{\n\
        \x20   let config = HarnessConfig {{\n\
        \x20       dashboard: DashboardConfig {{\n\
        \x20           columns: {},\n\
        \x20           rows: {},\n\
        \x20           window_width: {},\n\
        \x20           window_height: {},\n\
        \x20           period_s: {},\n\
        \x20       }},\n\
        \x20       accel: AccelConfig {{ sample_rate_hz: {} }},\n\
        \x20       cell: CellConfig {{ period_s: {}, select_sim: {} }},\n\
        \x20       blinky: BlinkyConfig {{ rate_hz: {}, pin: {} }},\n\
        \x20       poster: PosterConfig::with_thing({}, {:?})?,\n\
        \x20   }};\n\
        \x20   config.validate()?;\n\
        \x20   Ok(config)\n\
        }}\n",
        h.columns,
        h.rows,
        h.window_width,
        h.window_height,
        h.dashboard_period_s,
        h.accel_rate_hz,
        h.cell_period_s,
        h.select_sim,
        h.blinky_rate_hz,
        h.blinky_pin,
        h.poster_period_s,
        h.thing,
    );

    let mut f = File::create(out_dir.join("harness.rs")).unwrap();
    f.write_all(source.as_bytes()).unwrap();
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
