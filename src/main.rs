//! Binary entrypoint for wallpaper-loader.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use wallpaper_loader::config;
use wallpaper_loader::platform::desktop::DesktopWallpaper;
use wallpaper_loader::processing::{decode, sample};
use wallpaper_loader::{Placement, WallpaperLoader, WallpaperRequest, WallpaperWorker};

#[derive(Debug, Parser)]
#[command(name = "wallpaper-loader", about = "Decode an image and set it as the wallpaper")]
struct Cli {
    /// Path to YAML config file; defaults apply when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode PATH and apply it as the wallpaper
    Set {
        path: PathBuf,

        /// Surface flags: 1 home, 2 lock, 3 both (anything else means 3);
        /// defaults to the config's default-placement
        #[arg(short, long, allow_negative_numbers = true)]
        placement: Option<i64>,
    },
    /// Print dimensions and the decode scale factor for PATH
    Probe { path: PathBuf },
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("wallpaper_loader={level}").parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    let cfg = config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Probe { path } => {
            let probe = decode::probe(&path)
                .with_context(|| format!("probing {}", path.display()))?;
            let s = sample::sample_size(probe.width, probe.height, cfg.max_dimension);
            let (w, h) = sample::sampled_dimensions(probe.width, probe.height, s);
            println!(
                "{}x{} ({:?}) -> scale 1/{s} -> {w}x{h}",
                probe.width, probe.height, probe.format
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Set { path, placement } => {
            let placement =
                placement.map_or(cfg.default_placement, Placement::from_flags_or_default);
            let facility = Arc::new(DesktopWallpaper::new(&cfg.staging_dir));
            let loader = WallpaperLoader::new(facility).with_max_dimension(cfg.max_dimension);
            let worker = WallpaperWorker::spawn(loader).context("starting wallpaper worker")?;

            let ok = worker.submit(WallpaperRequest::new(path, placement)).wait();
            worker.shutdown();

            if ok {
                info!("done");
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!("wallpaper was not set");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
