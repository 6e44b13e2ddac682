//! On-disk layout of a YOLO project: `images/`, `labels/` and `classes.txt`.

use glob::{glob_with, MatchOptions, Pattern};
use log::{debug, info};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::IMG_FORMATS;
use crate::utils::create_output_directory;

pub const IMAGES_DIR: &str = "images";
pub const LABELS_DIR: &str = "labels";
pub const CLASSES_FILE: &str = "classes.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn labels_dir(&self) -> PathBuf {
        self.root.join(LABELS_DIR)
    }

    pub fn classes_path(&self) -> PathBuf {
        self.root.join(CLASSES_FILE)
    }

    /// Label file belonging to an image: same stem, `.txt`, under `labels/`.
    pub fn label_path(&self, image_path: &Path) -> PathBuf {
        let mut file_name = image_path.file_stem().unwrap_or_default().to_os_string();
        file_name.push(".txt");
        self.labels_dir().join(file_name)
    }

    /// Path an image of the given file name takes under `images/`.
    pub fn image_path(&self, image_path: &Path) -> PathBuf {
        self.images_dir().join(image_path.file_name().unwrap_or_default())
    }

    /// Lines of the label file for `image_path`, verbatim. No file means no lines.
    pub fn read_label_lines(&self, image_path: &Path) -> Result<Vec<String>> {
        let label_path = self.label_path(image_path);
        if !label_path.is_file() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&label_path)?;
        Ok(content.lines().map(str::to_string).collect())
    }

    /// Whether both projects live in the same directory.
    pub fn same_location(&self, other: &Project) -> bool {
        if self.root == other.root {
            return true;
        }
        match (fs::canonicalize(&self.root), fs::canonicalize(&other.root)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Fail unless `images/` and `labels/` both exist.
    pub fn ensure_readable(&self) -> Result<()> {
        for dir in [self.images_dir(), self.labels_dir()] {
            if !dir.is_dir() {
                return Err(Error::MissingPath(dir));
            }
        }
        Ok(())
    }

    /// Image files directly under `images/`, sorted by path.
    pub fn list_images(&self) -> Result<Vec<PathBuf>> {
        let images_dir = self.images_dir();
        if !images_dir.is_dir() {
            return Err(Error::MissingPath(images_dir));
        }
        let escaped = Pattern::escape(&images_dir.to_string_lossy());
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };

        let mut images = BTreeSet::new();
        for ext in IMG_FORMATS {
            let pattern = format!("{}/*.{}", escaped, ext);
            images.extend(
                glob_with(&pattern, options)?
                    .filter_map(|entry| entry.ok())
                    .filter(|path| path.is_file()),
            );
        }
        debug!("Found {} images in {}", images.len(), images_dir.display());
        Ok(images.into_iter().collect())
    }

    /// Delete anything at the project root and recreate empty `images/` and `labels/`.
    pub fn reset(&self) -> Result<()> {
        create_output_directory(&self.root)?;
        fs::create_dir_all(self.images_dir())?;
        fs::create_dir_all(self.labels_dir())?;
        Ok(())
    }

    /// Copy every file in `source`'s `labels/` into this project's `labels/` unchanged.
    pub fn copy_labels_from(&self, source: &Project) -> Result<usize> {
        let target_dir = self.labels_dir();
        let mut copied = 0;
        for entry in fs::read_dir(source.labels_dir())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            fs::copy(entry.path(), target_dir.join(entry.file_name()))?;
            copied += 1;
        }
        info!(
            "Copied {} label files from {}",
            copied,
            source.labels_dir().display()
        );
        Ok(copied)
    }

    /// Copy `source`'s classes file if it has one. Returns whether a file was copied.
    pub fn copy_classes_from(&self, source: &Project) -> Result<bool> {
        let classes_path = source.classes_path();
        if !classes_path.is_file() {
            return Ok(false);
        }
        fs::copy(&classes_path, self.classes_path())?;
        Ok(true)
    }
}
