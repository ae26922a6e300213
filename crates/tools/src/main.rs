use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use locator::LocatorConfig;
use tools::{ReplayOptions, replay};

#[derive(Parser, Debug)]
#[command(author, version, about = "Terrain locator tooling")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a recorded GPS track through the page controller
    Replay {
        /// Page configuration (config.json)
        #[arg(long)]
        config: PathBuf,

        /// Track file: JSON array of {t?, longitude, latitude, accuracy?}
        #[arg(long)]
        track: PathBuf,

        /// Asset directory with terrain/ and tilesets/
        #[arg(long, default_value = ".")]
        data: PathBuf,

        /// Feed fixes through a follow subscription (camera follows the marker)
        #[arg(long)]
        follow: bool,

        /// Height offset in meters
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<f64>,

        /// Print only the final JSON report
        #[arg(long)]
        quiet: bool,
    },

    /// Validate a config.json
    CheckConfig { file: PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    match Args::parse().command {
        Command::Replay {
            config,
            track,
            data,
            follow,
            offset,
            quiet,
        } => {
            let options = ReplayOptions {
                config,
                track,
                data,
                follow,
                offset_m: offset,
                echo: !quiet,
            };
            let report = replay(&options).map_err(|e| e.to_string())?;
            let payload = serde_json::to_string_pretty(&report).map_err(|e| format!("json: {e}"))?;
            println!("{payload}");
            Ok(())
        }
        Command::CheckConfig { file } => {
            let payload = fs::read_to_string(&file).map_err(|e| format!("read {file:?}: {e}"))?;
            let config = LocatorConfig::from_json_str(&payload).map_err(|e| e.to_string())?;
            let view = config.start_view;
            println!(
                "ok: asset {} | {} | start {:.5}, {:.5} at {} m, heading {} pitch {} roll {}",
                config.ion_asset_id,
                if config.use_world_terrain {
                    "world terrain"
                } else {
                    "ellipsoid"
                },
                view.longitude,
                view.latitude,
                view.height,
                view.heading,
                view.pitch,
                view.roll
            );
            Ok(())
        }
    }
}
