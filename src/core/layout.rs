use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::file_ops::{move_file, FileOpResult};
use crate::core::split::{DatasetSplit, SplitAssignment};

/// The directory tree the YOLO trainer expects:
/// `<root>/images/{train,val,test}` and `<root>/labels/{train,val,test}`.
pub struct StructuredLayout {
    root: PathBuf,
}

impl StructuredLayout {
    /// Create all six destination directories. Idempotent: directories that
    /// already exist are left alone.
    pub fn prepare(root: &Path) -> FileOpResult<Self> {
        let layout = Self {
            root: root.to_path_buf(),
        };
        for split in DatasetSplit::all() {
            fs::create_dir_all(layout.images_dir(split))?;
            fs::create_dir_all(layout.labels_dir(split))?;
        }
        info!("Prepared structured layout under {:?}", root);
        Ok(layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self, split: DatasetSplit) -> PathBuf {
        self.root.join("images").join(split.as_str())
    }

    pub fn labels_dir(&self, split: DatasetSplit) -> PathBuf {
        self.root.join("labels").join(split.as_str())
    }

    /// Move every assigned pair out of the source directories into its
    /// split's images/labels directories. Destructive on the sources; a
    /// source file that vanished between listing and move is an error.
    ///
    /// There is no rollback. A failure partway leaves some files moved and
    /// some not, which is acceptable for a single-run preparation step.
    pub fn place(
        &self,
        assignment: &SplitAssignment,
        images_src: &Path,
        labels_src: &Path,
    ) -> FileOpResult<usize> {
        let mut moved = 0usize;
        for split in DatasetSplit::all() {
            let pairs = assignment.get(split);
            for pair in pairs {
                move_file(
                    &images_src.join(&pair.image),
                    &self.images_dir(split).join(&pair.image),
                )?;
                move_file(
                    &labels_src.join(&pair.label),
                    &self.labels_dir(split).join(&pair.label),
                )?;
                moved += 1;
            }
            info!(
                "Moved {} pair(s) into split '{}'",
                pairs.len(),
                split.as_str()
            );
        }
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pairing::AssetPair;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_prepare_creates_all_six_directories() {
        let root = TempDir::new().unwrap();
        let structured = root.path().join("structured");

        let layout = StructuredLayout::prepare(&structured).unwrap();

        for split in DatasetSplit::all() {
            assert!(layout.images_dir(split).is_dir());
            assert!(layout.labels_dir(split).is_dir());
        }
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let root = TempDir::new().unwrap();
        let structured = root.path().join("structured");

        StructuredLayout::prepare(&structured).unwrap();
        let layout = StructuredLayout::prepare(&structured).unwrap();

        assert!(layout.images_dir(DatasetSplit::Train).is_dir());
    }

    #[test]
    fn test_place_moves_images_and_labels() {
        let root = TempDir::new().unwrap();
        let images_src = root.path().join("pool");
        let labels_src = root.path().join("annotations");
        fs::create_dir_all(&images_src).unwrap();
        fs::create_dir_all(&labels_src).unwrap();
        touch(&images_src, "a.jpg");
        touch(&labels_src, "a.txt");

        let layout = StructuredLayout::prepare(&root.path().join("structured")).unwrap();
        let assignment = SplitAssignment {
            train: vec![AssetPair {
                image: "a.jpg".to_string(),
                label: "a.txt".to_string(),
            }],
            ..Default::default()
        };

        let moved = layout.place(&assignment, &images_src, &labels_src).unwrap();

        assert_eq!(moved, 1);
        assert!(layout.images_dir(DatasetSplit::Train).join("a.jpg").exists());
        assert!(layout.labels_dir(DatasetSplit::Train).join("a.txt").exists());
        assert!(!images_src.join("a.jpg").exists());
        assert!(!labels_src.join("a.txt").exists());
    }

    #[test]
    fn test_place_with_empty_assignment_moves_nothing() {
        let root = TempDir::new().unwrap();
        let images_src = root.path().join("pool");
        let labels_src = root.path().join("annotations");
        fs::create_dir_all(&images_src).unwrap();
        fs::create_dir_all(&labels_src).unwrap();

        let layout = StructuredLayout::prepare(&root.path().join("structured")).unwrap();
        let moved = layout
            .place(&SplitAssignment::default(), &images_src, &labels_src)
            .unwrap();

        assert_eq!(moved, 0);
    }

    #[test]
    fn test_place_fails_when_source_vanished() {
        let root = TempDir::new().unwrap();
        let images_src = root.path().join("pool");
        let labels_src = root.path().join("annotations");
        fs::create_dir_all(&images_src).unwrap();
        fs::create_dir_all(&labels_src).unwrap();

        let layout = StructuredLayout::prepare(&root.path().join("structured")).unwrap();
        let assignment = SplitAssignment {
            val: vec![AssetPair {
                image: "ghost.jpg".to_string(),
                label: "ghost.txt".to_string(),
            }],
            ..Default::default()
        };

        assert!(layout.place(&assignment, &images_src, &labels_src).is_err());
    }
}
