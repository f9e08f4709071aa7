use anyhow::Result;
use clap::Parser;
use tracing::info;

mod archive;
mod config;
mod core;
mod data_config;
mod hosting;
mod log_formatter;
mod pipeline;
mod trainer;

use config::{Args, PipelineConfig};
use log_formatter::BracketedFormatter;

fn main() -> Result<()> {
    // Bracketed log format; default level "info", overridable via RUST_LOG
    tracing_subscriber::fmt()
        .event_format(BracketedFormatter)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = PipelineConfig::from_env(&args)?;
    info!(
        "Starting YOLO dataset pipeline for dataset version {}",
        config.dataset_id
    );

    pipeline::run(&config)
}
