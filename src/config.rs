use clap::{Parser, ValueEnum};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::provider::DetectionProvider;

/// Command-line arguments for merging model predictions into a YOLO project.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Operation to run: 'merge' predictions into labels or 'redact' detected regions
    #[arg(long = "mode", value_enum, default_value = "merge")]
    pub mode: Mode,

    /// YOLO project to read (images/, labels/, classes.txt)
    #[arg(short = 'i', long = "input_dir")]
    pub input_dir: PathBuf,

    /// YOLO project to write; may equal input_dir to update in place
    #[arg(short = 'o', long = "output_dir")]
    pub output_dir: PathBuf,

    /// Prediction file exported from the detection model
    #[arg(short = 'm', long = "model_path")]
    pub model_path: PathBuf,

    /// Minimum confidence for a detection to be used
    #[arg(long = "confidence", default_value_t = 0.5, value_parser = validate_confidence)]
    pub confidence: f32,

    /// Source class indices to admit; all classes when empty
    #[arg(long = "target_classes", use_value_delimiter = true)]
    pub target_classes: Vec<usize>,

    /// Source to target index pairs, e.g. 29:3,39:1
    #[arg(long = "class_map", use_value_delimiter = true, value_parser = parse_class_mapping)]
    pub class_map: Vec<(usize, usize)>,

    /// Name of the single target class; every admitted detection maps to it
    #[arg(long = "class_name", requires = "class_index", conflicts_with = "class_map")]
    pub class_name: Option<String>,

    /// Index of the single target class
    #[arg(long = "class_index", requires = "class_name")]
    pub class_index: Option<usize>,

    /// Fill color for redacted regions as R,G,B
    #[arg(long = "fill_color", default_value = "255,255,255", value_parser = parse_color)]
    pub fill_color: [u8; 3],
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum Mode {
    Merge,
    Redact,
}

impl Args {
    pub fn to_config(&self) -> Config {
        let class_index_map = match (&self.class_name, self.class_index) {
            (Some(name), Some(index)) => ClassIndexMap::Uniform {
                name: name.clone(),
                index,
            },
            _ => ClassIndexMap::PerSource(self.class_map.iter().copied().collect()),
        };

        Config {
            input_path: self.input_dir.clone(),
            output_path: self.output_dir.clone(),
            model_path: self.model_path.clone(),
            confidence_threshold: self.confidence,
            target_class_filter: self.target_classes.iter().copied().collect(),
            class_index_map,
            fill_color: self.fill_color,
        }
    }
}

/// Everything one merge or redaction run needs.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub model_path: PathBuf,
    pub confidence_threshold: f32,
    /// Admitted source classes; empty admits every class
    pub target_class_filter: BTreeSet<usize>,
    pub class_index_map: ClassIndexMap,
    pub fill_color: [u8; 3],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("project"),
            output_path: PathBuf::from("output"),
            model_path: PathBuf::from("predictions.json"),
            confidence_threshold: 0.5,
            target_class_filter: BTreeSet::new(),
            class_index_map: ClassIndexMap::default(),
            fill_color: [255, 255, 255],
        }
    }
}

/// Translation from the model's class indices to the project's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassIndexMap {
    /// Every source class maps to `index`, registered under `name`.
    Uniform { name: String, index: usize },
    /// Explicit source index to target index pairs.
    PerSource(BTreeMap<usize, usize>),
}

impl Default for ClassIndexMap {
    fn default() -> Self {
        ClassIndexMap::PerSource(BTreeMap::new())
    }
}

impl ClassIndexMap {
    /// Target index for a source class, or `None` if the class is not mapped.
    pub fn target_for(&self, source: usize) -> Option<usize> {
        match self {
            ClassIndexMap::Uniform { index, .. } => Some(*index),
            ClassIndexMap::PerSource(map) => map.get(&source).copied(),
        }
    }

    /// `(target index, name)` pairs to record in the project's class table.
    pub fn registrations(&self, provider: &dyn DetectionProvider) -> Result<Vec<(usize, String)>> {
        match self {
            ClassIndexMap::Uniform { name, index } => Ok(vec![(*index, name.clone())]),
            ClassIndexMap::PerSource(map) => map
                .iter()
                .map(|(&source, &target)| {
                    provider
                        .class_name(source)
                        .map(|name| (target, name.to_string()))
                        .ok_or(Error::UnknownSourceClass(source))
                })
                .collect(),
        }
    }
}

// Validate that the confidence is between 0.0 and 1.0
pub fn validate_confidence(s: &str) -> std::result::Result<f32, String> {
    match f32::from_str(s) {
        Ok(val) if (0.0..=1.0).contains(&val) => Ok(val),
        _ => Err("CONFIDENCE must be between 0.0 and 1.0".to_string()),
    }
}

/// Parse a `source:target` class index pair.
pub fn parse_class_mapping(s: &str) -> std::result::Result<(usize, usize), String> {
    let (source, target) = s
        .split_once(':')
        .ok_or_else(|| format!("expected SOURCE:TARGET, got '{}'", s))?;
    let source = usize::from_str(source.trim())
        .map_err(|e| format!("invalid source index '{}': {}", source, e))?;
    let target = usize::from_str(target.trim())
        .map_err(|e| format!("invalid target index '{}': {}", target, e))?;
    Ok((source, target))
}

/// Parse an `R,G,B` color with 0-255 components.
pub fn parse_color(s: &str) -> std::result::Result<[u8; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected R,G,B, got '{}'", s));
    }
    let mut color = [0u8; 3];
    for (channel, part) in color.iter_mut().zip(parts) {
        *channel = u8::from_str(part)
            .map_err(|_| format!("color component '{}' must be between 0 and 255", part))?;
    }
    Ok(color)
}
