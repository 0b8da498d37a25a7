use std::path::PathBuf;

use clap::Parser;
use seisview::{run_viewer, ViewerConfig};

#[derive(Parser)]
#[command(name = "seisview", version, about = "Interactive miniSEED waveform viewer")]
struct Cli {
    /// miniSEED file to open on start
    file: Option<PathBuf>,
    /// Number of stacked plots (channels shown at once)
    #[arg(long)]
    slots: Option<usize>,
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the effective configuration to this path and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load_json(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(slots) = cli.slots {
        config.slot_count = slots;
    }
    config.validate()?;

    if let Some(path) = &cli.dump_config {
        config.save_json(path)?;
        log::info!("configuration written to {}", path.display());
        return Ok(());
    }

    run_viewer(config, cli.file)?;
    Ok(())
}
