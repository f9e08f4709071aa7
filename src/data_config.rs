use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::layout::StructuredLayout;
use crate::core::split::DatasetSplit;

/// Class inventory shipped with the annotation export (`nc` + `names`).
/// Unknown keys in the source file are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassManifest {
    pub nc: usize,
    pub names: Vec<String>,
}

impl ClassManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let manifest: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML from {}", path.display()))?;
        Ok(manifest)
    }

    /// Find the class manifest that came with the export. The exporter puts
    /// `data.yaml` either inside the extracted annotations or at the dataset
    /// root, depending on the format version.
    pub fn locate(annotations_dir: &Path, base_dir: &Path) -> Result<Self> {
        for dir in [annotations_dir, base_dir] {
            let candidate = dir.join("data.yaml");
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }
        bail!(
            "no data.yaml with class names found under {} or {}",
            annotations_dir.display(),
            base_dir.display()
        );
    }
}

/// The `data.yaml` consumed by the YOLO trainer: absolute image-directory
/// paths per split plus the class inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub train: PathBuf,
    pub val: PathBuf,
    pub test: PathBuf,
    pub nc: usize,
    pub names: Vec<String>,
}

impl DataConfig {
    /// Build the trainer configuration from a prepared layout. Paths are
    /// canonicalized so the trainer resolves them regardless of its own
    /// working directory.
    pub fn from_layout(layout: &StructuredLayout, classes: &ClassManifest) -> Result<Self> {
        let absolute = |split: DatasetSplit| -> Result<PathBuf> {
            let dir = layout.images_dir(split);
            fs::canonicalize(&dir)
                .with_context(|| format!("failed to resolve {}", dir.display()))
        };
        Ok(Self {
            train: absolute(DatasetSplit::Train)?,
            val: absolute(DatasetSplit::Val)?,
            test: absolute(DatasetSplit::Test)?,
            nc: classes.nc,
            names: classes.names.clone(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("failed to serialize data config")?;
        fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote trainer configuration to {:?}", path);
        Ok(())
    }
}
