//! Model predictions to YOLO dataset annotations
//!
//! This library merges detections from a pretrained model into the labels of a YOLO
//! project (`images/`, `labels/`, `classes.txt`) and can paint over detected regions
//! to produce redacted copies of the images.

pub mod class_table;
pub mod config;
pub mod conversion;
pub mod error;
pub mod merge;
pub mod project;
pub mod provider;
pub mod redact;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use class_table::{ClassTable, PLACEHOLDER};
pub use config::{Args, ClassIndexMap, Config, Mode};
pub use conversion::DetectionFilter;
pub use error::{Error, Result};
pub use merge::merge;
pub use project::Project;
pub use provider::{DetectionProvider, PredictionFile};
pub use redact::redact;
pub use types::{Detection, ProcessingStats};
