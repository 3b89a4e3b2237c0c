use std::path::PathBuf;

/// Errors raised by the filter pipeline.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("pixel count {actual} does not match {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual: usize,
    },
    #[error("kernel must have at least one weight")]
    EmptyKernel,
    #[error("invalid {name} kernel size {size}")]
    InvalidKernelSize { name: &'static str, size: u32 },
    #[error("failed to read preset {path}: {source}")]
    PresetIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse preset: {0}")]
    PresetParse(#[from] serde_json::Error),
}
