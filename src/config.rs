use std::env;
use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::split::SplitRatios;

pub const ENV_API_TOKEN: &str = "PICSELLIA_API_TOKEN";
pub const ENV_DATASET_ID: &str = "PICSELLIA_DATASET_ID";
pub const ENV_HOST: &str = "PICSELLIA_HOST";

const DEFAULT_HOST: &str = "https://app.picsellia.com";

/// Error types for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(key) => {
                write!(f, "Environment variable '{}' is missing or empty", key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Command line arguments. Values given here win over the environment.
#[derive(Debug, Parser)]
#[command(name = "yolo-dataset-pipeline")]
#[command(about = "Download a Picsellia dataset, restructure it for YOLO and train")]
pub struct Args {
    /// Dataset version id to download (falls back to PICSELLIA_DATASET_ID)
    #[arg(long)]
    pub dataset_id: Option<String>,

    /// Working directory for downloaded and restructured files
    #[arg(long, default_value = "datasets")]
    pub base_dir: PathBuf,

    /// Base model weights handed to the trainer
    #[arg(long, default_value = "yolov8n.pt")]
    pub model: String,

    /// Directory where training runs are written
    #[arg(long, default_value = "runs")]
    pub project_dir: PathBuf,

    /// Fraction of pairs assigned to the train split
    #[arg(long, default_value_t = 0.6)]
    pub train_ratio: f64,

    /// Fraction of pairs assigned to the val split
    #[arg(long, default_value_t = 0.2)]
    pub val_ratio: f64,

    /// Fraction of pairs assigned to the test split
    #[arg(long, default_value_t = 0.2)]
    pub test_ratio: f64,

    /// Prepare the dataset but skip the training step
    #[arg(long)]
    pub skip_training: bool,
}

/// Training knobs forwarded to the YOLO trainer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub epochs: u32,
    pub batch: u32,
    pub imgsz: u32,
    pub patience: u32,
    pub seed: u64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            epochs: 100,
            batch: 16,
            imgsz: 640,
            patience: 50,
            seed: 42,
        }
    }
}

/// Fully resolved pipeline configuration, validated once at startup.
#[derive(Debug)]
pub struct PipelineConfig {
    pub api_token: String,
    pub host: String,
    pub dataset_id: String,
    pub base_dir: PathBuf,
    pub model: String,
    pub project_dir: PathBuf,
    pub ratios: SplitRatios,
    pub hyperparameters: Hyperparameters,
    pub skip_training: bool,
}

impl PipelineConfig {
    /// Build the configuration from a `.env` file, the process environment
    /// and the command line. Required values are checked eagerly so the run
    /// fails before any network or filesystem work happens.
    pub fn from_env(args: &Args) -> Result<Self, ConfigError> {
        // A missing .env file is fine; variables may come from the shell.
        if dotenvy::dotenv().is_ok() {
            debug!("Loaded environment from .env");
        }

        let api_token = require_env(ENV_API_TOKEN)?;
        let dataset_id = match &args.dataset_id {
            Some(id) => id.clone(),
            None => require_env(ENV_DATASET_ID)?,
        };
        let host = optional_env(ENV_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string());

        Ok(Self {
            api_token,
            host,
            dataset_id,
            base_dir: args.base_dir.clone(),
            model: args.model.clone(),
            project_dir: args.project_dir.clone(),
            ratios: SplitRatios {
                train: args.train_ratio,
                val: args.val_ratio,
                test: args.test_ratio,
            },
            hyperparameters: Hyperparameters::default(),
            skip_training: args.skip_training,
        })
    }
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVariable(key.to_string())),
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_env_rejects_missing_variable() {
        let result = require_env("PIPELINE_TEST_UNSET_VARIABLE");
        assert!(matches!(result, Err(ConfigError::MissingVariable(_))));
    }

    #[test]
    fn test_require_env_rejects_empty_variable() {
        env::set_var("PIPELINE_TEST_EMPTY_VARIABLE", "");
        let result = require_env("PIPELINE_TEST_EMPTY_VARIABLE");
        assert!(matches!(result, Err(ConfigError::MissingVariable(_))));
    }

    #[test]
    fn test_require_env_returns_value() {
        env::set_var("PIPELINE_TEST_SET_VARIABLE", "token-123");
        assert_eq!(
            require_env("PIPELINE_TEST_SET_VARIABLE").unwrap(),
            "token-123"
        );
    }

    #[test]
    fn test_optional_env_filters_empty() {
        env::set_var("PIPELINE_TEST_OPTIONAL_EMPTY", "  ");
        assert!(optional_env("PIPELINE_TEST_OPTIONAL_EMPTY").is_none());
    }
}
