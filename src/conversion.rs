use log::warn;
use std::collections::BTreeSet;

use crate::config::Config;
use crate::types::Detection;

/// Decides whether a detection takes part in merging or redaction.
#[derive(Debug, Clone, Default)]
pub struct DetectionFilter {
    pub confidence_threshold: f32,
    /// Admitted source classes; empty admits every class
    pub target_classes: BTreeSet<usize>,
}

impl DetectionFilter {
    pub fn new(confidence_threshold: f32, target_classes: BTreeSet<usize>) -> Self {
        Self {
            confidence_threshold,
            target_classes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.confidence_threshold,
            config.target_class_filter.clone(),
        )
    }

    /// Confidence at or above the threshold and class inside the filter, if any.
    /// A non-finite confidence never passes.
    pub fn admits(&self, detection: &Detection) -> bool {
        detection.confidence >= self.confidence_threshold
            && (self.target_classes.is_empty()
                || self.target_classes.contains(&detection.class_index))
    }
}

/// Convert a pixel box to YOLO `(x_center, y_center, width, height)`, normalized by the image size
pub fn normalize_box(bbox: [f64; 4], image_width: u32, image_height: u32) -> (f64, f64, f64, f64) {
    let [x1, y1, x2, y2] = bbox;
    let image_width = image_width as f64;
    let image_height = image_height as f64;

    let x_center = (x1 + x2) / 2.0 / image_width;
    let y_center = (y1 + y2) / 2.0 / image_height;
    let width = (x2 - x1) / image_width;
    let height = (y2 - y1) / image_height;

    (x_center, y_center, width, height)
}

/// Format one YOLO label line (without the trailing newline)
pub fn format_label_line(
    class_index: usize,
    detection: &Detection,
    image_width: u32,
    image_height: u32,
) -> String {
    let (x_center, y_center, width, height) =
        normalize_box(detection.bbox, image_width, image_height);
    let normalized = [x_center, y_center, width, height];
    if normalized.iter().any(|v| !(0.0..=1.0).contains(v)) {
        warn!(
            "Detection box {:?} falls outside the {}x{} image",
            detection.bbox, image_width, image_height
        );
    }

    format!(
        "{} {} {} {} {}",
        class_index, x_center, y_center, width, height
    )
}

/// Combine existing label lines with new ones into label file content
pub fn build_label_content(existing: &[String], new_lines: &[String]) -> String {
    let mut content = String::with_capacity((existing.len() + new_lines.len()) * 48);
    for line in existing.iter().chain(new_lines) {
        content.push_str(line);
        content.push('\n');
    }
    content
}
