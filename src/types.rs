use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

// Image extensions picked up from a project's images/ directory
pub const IMG_FORMATS: &[&str] = &["jpg", "jpeg", "png"];

/// A single prediction in pixel coordinates of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Corners as `[x1, y1, x2, y2]`
    #[serde(rename = "box")]
    pub bbox: [f64; 4],
    pub confidence: f32,
    /// Class index in the model's own taxonomy
    #[serde(rename = "class")]
    pub class_index: usize,
}

impl Detection {
    pub fn new(bbox: [f64; 4], confidence: f32, class_index: usize) -> Self {
        Self {
            bbox,
            confidence,
            class_index,
        }
    }

    /// True when the confidence and every coordinate are finite numbers.
    pub fn is_well_formed(&self) -> bool {
        self.confidence.is_finite() && self.bbox.iter().all(|v| v.is_finite())
    }
}

// Per-run counters, summed over images
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub images_processed: usize,
    pub images_copied: usize,
    pub detections_total: usize,
    pub detections_kept: usize,
    pub detections_filtered: usize,
    pub malformed_detections: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_summary(&self, operation: &str) {
        log::info!("=== {} Summary ===", operation);
        log::info!("Images processed: {}", self.images_processed);
        if self.images_copied > 0 {
            log::info!("Images copied: {}", self.images_copied);
        }
        log::info!("Detections returned by model: {}", self.detections_total);
        log::info!("Detections kept: {}", self.detections_kept);
        log::info!("Detections filtered out: {}", self.detections_filtered);

        if self.malformed_detections > 0 {
            log::warn!(
                "Malformed detections (non-finite confidence or coordinates): {}",
                self.malformed_detections
            );
        }
    }
}

impl AddAssign for ProcessingStats {
    fn add_assign(&mut self, other: Self) {
        self.images_processed += other.images_processed;
        self.images_copied += other.images_copied;
        self.detections_total += other.detections_total;
        self.detections_kept += other.detections_kept;
        self.detections_filtered += other.detections_filtered;
        self.malformed_detections += other.malformed_detections;
    }
}
