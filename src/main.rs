//! viewbot
//!
//! Watches an Android device over adb, recognizes the current screen by
//! sampling a few pixels, and replays the taps configured for that screen.

mod automation;
mod capture;
mod device;
mod error;
mod paths;
mod tools;
mod view;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use automation::{BotConfig, Dispatcher, LogSink, ThreadPacer};
use capture::ScreenSample;
use device::{AdbDevice, Device};

#[derive(Parser, Debug)]
#[command(name = "viewbot", version, about = "Recognize device screens by pixel color and replay taps")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll the device forever, acting on every recognized view
    Run(RunArgs),
    /// Save the current screen as a raw dump (for a view's `reference`)
    Snapshot(SnapshotArgs),
    /// Write a PNG next to every reference dump in the catalog
    Convert(CommonArgs),
    /// Refresh search pixel colors from the reference dumps
    Collect(CollectArgs),
    /// Classify a saved screen dump against the catalog
    Check(CheckArgs),
    /// Print the device orientation and screen size
    Device(CommonArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Settings file (defaults to config.json next to the executable)
    #[arg(long)]
    config: Option<PathBuf>,
    /// View catalog JSON file
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Network device address, x.x.x.x:port
    #[arg(long)]
    address: Option<String>,
    /// Run shell commands directly on the device instead of through adb
    #[arg(long)]
    on_device: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Base wait after an unrecognized screen, in milliseconds
    #[arg(long)]
    interval: Option<u64>,
    /// Use the configured screen size as-is instead of following device rotation
    #[arg(long)]
    no_orientation: bool,
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Output dump path
    out: PathBuf,
}

#[derive(Args, Debug)]
struct CollectArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Write the refreshed colors back into the catalog file
    #[arg(long)]
    save: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Raw screen dump to classify
    dump: PathBuf,
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => command_run(args),
        Commands::Snapshot(args) => command_snapshot(args),
        Commands::Convert(args) => command_convert(args),
        Commands::Collect(args) => command_collect(args),
        Commands::Check(args) => command_check(args),
        Commands::Device(args) => command_device(args),
    }
}

/// Logs to stderr with a millisecond timestamp. `RUST_LOG` overrides the `info` default.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {:<5} {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .init();
}

/// Loads settings and applies command-line overrides.
fn resolve_config(args: &CommonArgs) -> Result<BotConfig> {
    let path = args
        .config
        .clone()
        .unwrap_or_else(automation::default_config_path);
    let mut config = automation::load_config(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;

    if let Some(catalog) = &args.catalog {
        config.catalog_path = catalog.clone();
    }
    if let Some(address) = &args.address {
        config.device_address = Some(address.clone());
    }
    if args.on_device {
        config.run_on_device = true;
    }
    config.validate()?;
    Ok(config)
}

fn open_device(config: &BotConfig) -> AdbDevice {
    let device = AdbDevice::new(
        config.adb_path.clone(),
        config.device_address.clone(),
        config.run_on_device,
    );
    if let Err(e) = device.connect() {
        log::warn!("Could not connect to device: {}", e);
    }
    device
}

fn command_run(args: RunArgs) -> Result<()> {
    let mut config = resolve_config(&args.common)?;
    if let Some(interval) = args.interval {
        config.base_interval_ms = interval;
    }
    if args.no_orientation {
        config.detect_orientation = false;
    }

    let catalog = view::load_catalog(&config.catalog_path)
        .with_context(|| format!("Failed to load views from {}", config.catalog_path.display()))?;
    let device = open_device(&config);

    let mut dispatcher = Dispatcher::new(device, catalog, &config, ThreadPacer, LogSink);
    dispatcher
        .run()
        .context("View catalog does not fit the device screen")?;
    Ok(())
}

fn command_snapshot(args: SnapshotArgs) -> Result<()> {
    let config = resolve_config(&args.common)?;
    let device = open_device(&config);

    let size = match device.physical_size() {
        Ok(size) => size,
        Err(e) => {
            log::warn!("Screen size unavailable ({}), using configured size", e);
            config.screen_size()
        }
    };
    let size = match device.orientation() {
        Ok(orientation) => {
            log::info!("Device is in {} orientation", orientation);
            orientation.oriented_size(size)
        }
        Err(_) => size,
    };

    tools::snapshot(&device, size, &args.out)
}

fn command_convert(args: CommonArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let document = view::read_catalog_document(&config.catalog_path)?;
    let base_dir = paths::catalog_base_dir(&config.catalog_path);

    let written = tools::convert_references(&document, &base_dir, config.screen_size())?;
    for path in &written {
        log::info!("  Image: {}", path.display());
    }
    Ok(())
}

fn command_collect(args: CollectArgs) -> Result<()> {
    let config = resolve_config(&args.common)?;
    let mut document = view::read_catalog_document(&config.catalog_path)?;
    let base_dir = paths::catalog_base_dir(&config.catalog_path);

    let changed = tools::collect_pixel_values(&mut document, &base_dir, config.screen_size())?;
    log::info!("{} search pixel color(s) differ from the reference dumps", changed);

    if args.save {
        tools::save_document(&document, &config.catalog_path)?;
    }
    Ok(())
}

fn command_check(args: CheckArgs) -> Result<()> {
    let config = resolve_config(&args.common)?;
    let catalog = view::load_catalog(&config.catalog_path)?;
    let (width, height) = config.screen_size();
    let screen = ScreenSample::from_dump(&args.dump, width, height)?;

    match automation::find_match(&screen, &catalog)? {
        Some(view) => println!(
            "{} (reference: {})",
            view.name(),
            view.reference_path().display()
        ),
        None => println!("No view found"),
    }
    Ok(())
}

fn command_device(args: CommonArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let device = open_device(&config);

    let orientation = device.orientation().context("Failed to read orientation")?;
    let (width, height) = device.physical_size().context("Failed to read screen size")?;
    println!("Orientation: {}", orientation);
    println!("Screen size: {}x{}", width, height);
    Ok(())
}
