//! Tessera simulator binary
//!
//! Writes the dashboard's VT100 stream to stdout and logs to stderr
//! (`RUST_LOG` controls the level).

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;
use tessera_display::Screen;

use tessera_sim::{run, RunOptions, SimConfig, SimTransport, StdoutConsole};

/// Dashboard passes in snapshot mode when `--passes` is not given
const SNAPSHOT_PASSES: u32 = 3;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "tessera-sim",
    about = "Run the Tessera applet dashboard on simulated peripherals",
    version
)]
struct Cli {
    /// Harness configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dashboard refresh period in seconds, overriding the config file
    #[arg(long)]
    period: Option<u16>,

    /// Stop after this many dashboard passes
    #[arg(long)]
    passes: Option<u32>,

    /// Run the simulated board this many times faster than real time
    #[arg(long, default_value_t = 1)]
    speed: u32,

    /// Render into an in-memory screen and print it as plain text at the end
    #[arg(long)]
    snapshot: bool,

    /// Post requests to this TCP address instead of logging them
    #[arg(long)]
    post_to: Option<SocketAddr>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(period) = cli.period {
        config.harness.dashboard.period_s = period;
    }

    let options = RunOptions {
        passes: cli.passes.or(cli.snapshot.then_some(SNAPSHOT_PASSES)),
        speed: cli.speed,
        transport: cli
            .post_to
            .map(SimTransport::Tcp)
            .unwrap_or(SimTransport::Log),
    };
    info!("Starting simulator: {:?}", options);

    if cli.snapshot {
        let (screen, _) = run(&config, &options, Screen::<80, 26>::new())?;
        print!("{screen}");
    } else {
        run(&config, &options, StdoutConsole::new())?;
    }

    Ok(())
}
