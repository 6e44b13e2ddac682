use std::path::PathBuf;

/// Errors raised while merging predictions or redacting a YOLO project.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to parse predictions: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A directory or file the input project must contain is absent.
    #[error("required path does not exist: {}", .0.display())]
    MissingPath(PathBuf),

    /// Two different names claim the same target class index.
    #[error("class index {index} is already assigned to '{existing}', cannot assign '{incoming}'")]
    ClassCollision {
        index: usize,
        existing: String,
        incoming: String,
    },

    /// The class map references a source index the model has no name for.
    #[error("model has no class name for source index {0}")]
    UnknownSourceClass(usize),

    #[error("detection failed for {}: {message}", image.display())]
    Provider { image: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
