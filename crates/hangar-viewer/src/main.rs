//! Hangar - native entry point

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "hangar")]
#[command(about = "Interactive 3D model viewer with toggleable lights and post-processing")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "hangar.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Hangar v{}", env!("CARGO_PKG_VERSION"));

    if args.write_default_config {
        hangar_core::config::save_default_config(&args.config)?;
        info!(path = %args.config.display(), "Default configuration written");
        return Ok(());
    }

    let config = hangar_core::config::load_config(&args.config)?;
    info!(
        asset_root = %config.scene.asset_root,
        primary = %config.models.primary.asset,
        "Configuration loaded"
    );

    hangar_viewer::app::run(config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["hangar"]).unwrap();
        assert_eq!(args.config, PathBuf::from("hangar.toml"));
        assert_eq!(args.log_level, "info");
        assert!(!args.write_default_config);
    }

    #[test]
    fn test_write_default_config_flag() {
        let args =
            Args::try_parse_from(["hangar", "-c", "custom.toml", "--write-default-config"]).unwrap();
        assert_eq!(args.config, PathBuf::from("custom.toml"));
        assert!(args.write_default_config);
    }
}
