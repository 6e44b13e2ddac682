//! Sources of model predictions.
//!
//! The merge and redaction pipelines only see the [`DetectionProvider`] trait. The
//! bundled [`PredictionFile`] serves predictions that were exported from a model
//! run into a JSON document.

use log::{debug, info};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Detection;

/// Runs a detection model over single images.
pub trait DetectionProvider: Sync {
    /// Detections for the image at `image_path`, in the order the model produced them.
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>>;

    /// Human-readable name of a class in the model's taxonomy.
    fn class_name(&self, index: usize) -> Option<&str>;
}

// On-disk layout of an exported prediction file
#[derive(Debug, Deserialize)]
struct PredictionDocument {
    names: BTreeMap<usize, String>,
    #[serde(default)]
    images: HashMap<String, Vec<Detection>>,
}

/// Predictions keyed by image file name, with the model's class names.
#[derive(Debug, Clone, Default)]
pub struct PredictionFile {
    names: BTreeMap<usize, String>,
    images: HashMap<String, Vec<Detection>>,
}

impl PredictionFile {
    pub fn from_parts(
        names: BTreeMap<usize, String>,
        images: HashMap<String, Vec<Detection>>,
    ) -> Self {
        Self { names, images }
    }

    /// Read a prediction document such as
    /// `{"names": {"0": "person"}, "images": {"a.jpg": [{"box": [0, 0, 10, 10], "confidence": 0.9, "class": 0}]}}`.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingPath(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        let document: PredictionDocument = serde_json::from_reader(reader)?;
        info!(
            "Loaded predictions for {} images ({} classes) from {}",
            document.images.len(),
            document.names.len(),
            path.display()
        );
        Ok(Self {
            names: document.names,
            images: document.images,
        })
    }

    pub fn names(&self) -> &BTreeMap<usize, String> {
        &self.names
    }
}

impl DetectionProvider for PredictionFile {
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>> {
        let file_name = image_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::Provider {
                image: image_path.to_path_buf(),
                message: "image path has no usable file name".to_string(),
            })?;

        match self.images.get(file_name) {
            Some(detections) => Ok(detections.clone()),
            None => {
                debug!("No predictions recorded for {}", file_name);
                Ok(Vec::new())
            }
        }
    }

    fn class_name(&self, index: usize) -> Option<&str> {
        self.names.get(&index).map(String::as_str)
    }
}
