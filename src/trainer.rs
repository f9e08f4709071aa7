use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::config::Hyperparameters;

/// Compute device handed to the trainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cuda,
    Mps,
}

impl Device {
    pub fn as_str(&self) -> &str {
        match self {
            Device::Cuda => "cuda",
            Device::Mps => "mps",
        }
    }

    /// Pick the device from the host operating system: CUDA on Windows and
    /// Linux, Metal on macOS. Anything else is fatal.
    pub fn detect() -> Result<Self> {
        Self::for_os(std::env::consts::OS)
    }

    fn for_os(os: &str) -> Result<Self> {
        match os {
            "windows" | "linux" => Ok(Device::Cuda),
            "macos" => Ok(Device::Mps),
            other => bail!("unrecognized operating system '{}', cannot pick a device", other),
        }
    }
}

/// Boundary to the Ultralytics training routine, invoked through its CLI.
/// The trainer owns device placement details, the optimizer, augmentation
/// and checkpointing; this side only hands over the configuration.
pub struct YoloTrainer {
    model: String,
}

impl YoloTrainer {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
        }
    }

    pub fn train(
        &self,
        data_config: &Path,
        hyperparameters: &Hyperparameters,
        project_dir: &Path,
        device: Device,
    ) -> Result<()> {
        let args = self.build_args(data_config, hyperparameters, project_dir, device);
        info!("Launching training: yolo {}", args.join(" "));

        let status = Command::new("yolo")
            .args(&args)
            .status()
            .context("failed to launch the `yolo` trainer (is ultralytics installed?)")?;

        if !status.success() {
            bail!("training exited with status {}", status);
        }
        info!("Training finished");
        Ok(())
    }

    fn build_args(
        &self,
        data_config: &Path,
        h: &Hyperparameters,
        project_dir: &Path,
        device: Device,
    ) -> Vec<String> {
        vec![
            "detect".to_string(),
            "train".to_string(),
            format!("model={}", self.model),
            format!("data={}", data_config.display()),
            format!("project={}", project_dir.display()),
            format!("device={}", device.as_str()),
            format!("epochs={}", h.epochs),
            format!("batch={}", h.batch),
            format!("imgsz={}", h.imgsz),
            format!("patience={}", h.patience),
            format!("seed={}", h.seed),
        ]
    }
}
