use anyhow::{Context, Result};
use tracing::info;

use crate::archive;
use crate::config::PipelineConfig;
use crate::core::{pair_images_and_labels, split_pairs, StructuredLayout};
use crate::data_config::{ClassManifest, DataConfig};
use crate::hosting::{PicselliaClient, ANNOTATION_FORMAT_YOLO};
use crate::trainer::{Device, YoloTrainer};

/// Run the full pipeline: download, export, extract, restructure, train.
///
/// The sequence is linear with no retries and no rollback. A failure partway
/// through the restructuring leaves the working directory in a mixed state,
/// which is acceptable for a single-run preparation step.
pub fn run(config: &PipelineConfig) -> Result<()> {
    let client = PicselliaClient::new(&config.host, &config.api_token)?;

    info!("Downloading dataset version {}", config.dataset_id);
    let downloaded = client
        .download_dataset(&config.dataset_id, &config.base_dir)
        .context("dataset download failed")?;
    info!("Downloaded {} asset(s)", downloaded);

    let zip_path = config.base_dir.join("annotations.zip");
    client
        .export_annotations(&config.dataset_id, ANNOTATION_FORMAT_YOLO, &zip_path)
        .context("annotation export failed")?;

    let annotations_dir = config.base_dir.join("annotations");
    archive::extract_annotations(&config.base_dir, &annotations_dir)?;

    let pairs = pair_images_and_labels(&config.base_dir, &annotations_dir)
        .context("failed to pair images with labels")?;
    let assignment = split_pairs(pairs, &config.ratios);

    let structured_dir = config.base_dir.join("structured");
    let layout = StructuredLayout::prepare(&structured_dir)?;
    layout.place(&assignment, &config.base_dir, &annotations_dir)?;

    let classes = ClassManifest::locate(&annotations_dir, &config.base_dir)?;
    let data_config = DataConfig::from_layout(&layout, &classes)?;
    let config_path = structured_dir.join("data.yaml");
    data_config.save(&config_path)?;

    if config.skip_training {
        info!("Dataset prepared; training skipped as requested");
        return Ok(());
    }

    let device = Device::detect()?;
    info!("Selected device '{}'", device.as_str());
    YoloTrainer::new(&config.model).train(
        &config_path,
        &config.hyperparameters,
        &config.project_dir,
        device,
    )
}
