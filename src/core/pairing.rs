use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Image extensions recognized when scanning the source directory.
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// An image file and its matching YOLO label file, associated by base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPair {
    /// Image file name within the images directory
    pub image: String,
    /// Label file name within the annotations directory
    pub label: String,
}

/// Scan the images and annotations directories and pair each image with the
/// label file sharing its base name (`foo.jpg` -> `foo.txt`, extension
/// case-insensitive).
///
/// A pair exists only when both files are present. Unmatched images and
/// labels are dropped from the pool; the dropped counts are logged so a
/// lopsided export is visible in the output.
///
/// Listings are sorted before pairing so the downstream seeded shuffle
/// produces the same assignment on every platform.
pub fn pair_images_and_labels(
    images_dir: &Path,
    annotations_dir: &Path,
) -> io::Result<Vec<AssetPair>> {
    let mut image_files = list_files(images_dir, has_image_extension)?;
    image_files.sort();

    let label_files: HashSet<String> = list_files(annotations_dir, |name| name.ends_with(".txt"))?
        .into_iter()
        .collect();

    let mut pairs = Vec::new();
    let mut dropped_images = 0usize;
    for image in image_files {
        let label = label_name_for(&image);
        if label_files.contains(&label) {
            pairs.push(AssetPair { image, label });
        } else {
            dropped_images += 1;
        }
    }

    if dropped_images > 0 {
        warn!(
            "Dropped {} image(s) with no matching label file",
            dropped_images
        );
    }
    let unmatched_labels = label_files.len().saturating_sub(pairs.len());
    if unmatched_labels > 0 {
        warn!(
            "{} label file(s) have no matching image and will be ignored",
            unmatched_labels
        );
    }
    info!("Paired {} image(s) with their labels", pairs.len());

    Ok(pairs)
}

/// Derive the expected label file name by swapping the extension for `.txt`.
fn label_name_for(image: &str) -> String {
    match image.rsplit_once('.') {
        Some((stem, _)) => format!("{}.txt", stem),
        None => format!("{}.txt", image),
    }
}

fn has_image_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn list_files(dir: &Path, keep: impl Fn(&str) -> bool) -> io::Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if keep(&name) {
            files.push(name);
        }
    }
    Ok(files)
}
