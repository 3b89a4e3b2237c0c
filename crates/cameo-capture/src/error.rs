use std::path::PathBuf;

use crate::fourcc::FourCc;

/// Errors raised by the capture session, its collaborators and the preview
/// window.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("enter_frame called again without a matching exit_frame")]
    ProtocolViolation,

    #[error("capture source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("failed to write image {path}: {source}")]
    ImageExport {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("unsupported video codec {0}")]
    UnsupportedCodec(FourCc),

    #[error("frame is {actual:?}, encoder expects {expected:?}")]
    FrameSizeMismatch { expected: (u32, u32), actual: (u32, u32) },

    #[error("video encoder error: {0}")]
    Encoder(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("window backend error: {0}")]
    Backend(String),
}
