use cameo_capture::CaptureError;
use cameo_core::FilterError;

/// Errors that stop the demo.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("no input images found in {0}")]
    NoInput(std::path::PathBuf),
}
