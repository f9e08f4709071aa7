use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

/// Annotation export format understood by the hosting service.
pub const ANNOTATION_FORMAT_YOLO: &str = "YOLO";

/// Blocking client for the Picsellia dataset-hosting API.
///
/// This is an opaque boundary: the client is consumed through its documented
/// contract only (fetch a dataset version, download its assets, export the
/// annotations as a zip). No retries are attempted.
pub struct PicselliaClient {
    http: Client,
    base_url: String,
    api_token: String,
}

#[derive(Debug, Deserialize)]
struct AssetListing {
    items: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    filename: String,
    url: String,
}

impl PicselliaClient {
    pub fn new(base_url: &str, api_token: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        })
    }

    /// Download every asset of the dataset version into `dest_dir`.
    /// Returns the number of files written.
    pub fn download_dataset(&self, dataset_id: &str, dest_dir: &Path) -> Result<usize> {
        fs::create_dir_all(dest_dir)
            .with_context(|| format!("failed to create {}", dest_dir.display()))?;

        let listing: AssetListing = self
            .get(&format!("/api/dataset/version/{}/assets", dataset_id))
            .send()
            .context("asset listing request failed")?
            .error_for_status()
            .context("asset listing rejected by the server")?
            .json()
            .context("failed to decode asset listing")?;

        info!(
            "Downloading {} asset(s) for dataset version {}",
            listing.items.len(),
            dataset_id
        );
        for asset in &listing.items {
            self.download_file(&asset.url, &dest_dir.join(&asset.filename))
                .with_context(|| format!("failed to download asset '{}'", asset.filename))?;
        }

        Ok(listing.items.len())
    }

    /// Request an annotation export in the named format and write the
    /// resulting zip archive to `dest_zip`.
    pub fn export_annotations(&self, dataset_id: &str, format: &str, dest_zip: &Path) -> Result<()> {
        info!(
            "Exporting annotations for dataset version {} in {} format",
            dataset_id, format
        );
        let mut response = self
            .get(&format!(
                "/api/dataset/version/{}/annotations/export",
                dataset_id
            ))
            .query(&[("format", format)])
            .send()
            .context("annotation export request failed")?
            .error_for_status()
            .context("annotation export rejected by the server")?;

        let mut out = File::create(dest_zip)
            .with_context(|| format!("failed to create {}", dest_zip.display()))?;
        io::copy(&mut response, &mut out).context("failed to write annotation archive")?;

        Ok(())
    }

    fn get(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Token {}", self.api_token))
    }

    fn download_file(&self, url: &str, dest: &Path) -> Result<()> {
        debug!("Downloading {}", dest.display());
        let mut response = self
            .http
            .get(url)
            .send()
            .context("asset download request failed")?
            .error_for_status()
            .context("asset download rejected by the server")?;

        let mut out = File::create(dest)
            .with_context(|| format!("failed to create {}", dest.display()))?;
        io::copy(&mut response, &mut out).context("failed to write asset")?;
        Ok(())
    }
}
