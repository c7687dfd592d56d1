use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

mod app;
mod config;
mod edit;
mod gamestate;
mod timestep;

use app::App;
use config::{AppConfig, load_app_config};

#[derive(Parser, Debug)]
#[command(
    name = "cubefield",
    about = "Headless voxel world: terrain, light, meshing and player physics"
)]
struct Args {
    /// TOML config; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured frame count.
    #[arg(long)]
    frames: Option<u32>,
    /// Overrides the world seed.
    #[arg(long)]
    seed: Option<i32>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => {
            let cfg = load_app_config(path)?;
            log::info!("loaded config {}", path.display());
            cfg
        }
        None => AppConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.world.seed = seed;
    }
    let frames = args.frames.unwrap_or(cfg.frames);
    cfg.validate()?;

    let mut app = App::new(cfg);
    let summary = app.run(frames);
    if summary.mesh_failures > 0 {
        log::warn!("{} mesh builds failed", summary.mesh_failures);
    }
    Ok(())
}
