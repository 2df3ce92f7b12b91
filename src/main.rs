use clap::Parser;
use log::error;
use std::path::PathBuf;
use std::process::exit;

use endoflife_exporter::config::Config;
use endoflife_exporter::exporter;

/// Prometheus exporter that collects end-of-life dates for various products.
#[derive(Parser)]
#[command(
    name = "endoflife-exporter",
    version,
    about,
    long_about = "A Prometheus exporter that collects end-of-life dates for various products.

Example usage:
  endoflife-exporter --config config.yaml

The config file should be in YAML format with the following structure:
  port: 2112
  products:
    - ubuntu:
        host: localhost
        version: \"22.04\"
    - nodejs:
        host: localhost
        version: \"16\""
)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if !cli.config.exists() {
        error!("Config file not found at {}", cli.config.display());
        error!("Please provide a valid config file using the --config flag");
        error!("Example config file format:\n{}", Config::example_yaml());
        exit(1);
    }

    let cfg = match Config::from_file(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("Error reading config file: {}", err);
            exit(1);
        }
    };

    if let Err(err) = exporter::run(&cfg) {
        error!("{}", err);
        exit(1);
    }
}
