use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;
use zip::ZipArchive;

/// Walk `base_dir` recursively and return the first `.zip` file found.
///
/// Directory entries are visited in sorted order so the result is stable
/// when more than one archive is present.
pub fn find_zip_file(base_dir: &Path) -> Option<PathBuf> {
    let mut entries: Vec<PathBuf> = fs::read_dir(base_dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    for path in &entries {
        if path.is_file() && path.extension().map(|e| e == "zip").unwrap_or(false) {
            return Some(path.clone());
        }
    }
    for path in &entries {
        if path.is_dir() {
            if let Some(found) = find_zip_file(path) {
                return Some(found);
            }
        }
    }
    None
}

/// Locate the exported annotation archive under `base_dir`, extract it into
/// `annotations_dir` and delete the archive. Missing archive is fatal; the
/// export is not retried.
pub fn extract_annotations(base_dir: &Path, annotations_dir: &Path) -> Result<()> {
    let Some(zip_path) = find_zip_file(base_dir) else {
        bail!(
            "no zip archive found under {} after annotation export",
            base_dir.display()
        );
    };

    fs::create_dir_all(annotations_dir)
        .with_context(|| format!("failed to create {}", annotations_dir.display()))?;

    let file = File::open(&zip_path)
        .with_context(|| format!("failed to open archive {}", zip_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("failed to read archive {}", zip_path.display()))?;
    archive
        .extract(annotations_dir)
        .with_context(|| format!("failed to extract {}", zip_path.display()))?;

    fs::remove_file(&zip_path)
        .with_context(|| format!("failed to remove archive {}", zip_path.display()))?;

    info!(
        "Extracted {} annotation file(s) into {:?}",
        archive.len(),
        annotations_dir
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_find_zip_in_nested_directory() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("export").join("yolo");
        fs::create_dir_all(&nested).unwrap();
        write_zip(&nested.join("annotations.zip"), &[("a.txt", "0 0 0 0 0")]);

        let found = find_zip_file(root.path()).unwrap();

        assert_eq!(found.file_name().unwrap(), "annotations.zip");
    }

    #[test]
    fn test_find_zip_returns_none_when_absent() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("readme.md"), "no archives here").unwrap();

        assert!(find_zip_file(root.path()).is_none());
    }

    #[test]
    fn test_extract_unpacks_and_removes_archive() {
        let root = TempDir::new().unwrap();
        let zip_path = root.path().join("annotations.zip");
        write_zip(
            &zip_path,
            &[("a.txt", "0 0.5 0.5 0.1 0.1"), ("b.txt", "1 0.2 0.2 0.3 0.3")],
        );
        let annotations_dir = root.path().join("annotations");

        extract_annotations(root.path(), &annotations_dir).unwrap();

        assert!(annotations_dir.join("a.txt").exists());
        assert!(annotations_dir.join("b.txt").exists());
        assert!(!zip_path.exists());
    }

    #[test]
    fn test_extract_fails_without_archive() {
        let root = TempDir::new().unwrap();
        let annotations_dir = root.path().join("annotations");

        let result = extract_annotations(root.path(), &annotations_dir);

        assert!(result.is_err());
    }
}
