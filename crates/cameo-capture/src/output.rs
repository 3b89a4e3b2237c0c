//! Sinks for processed frames: still-image export and video encoding.

use std::path::Path;

use cameo_core::BgrImage;
use tracing::info;

use crate::error::CaptureError;
use crate::fourcc::FourCc;

/// An open video stream. Frame rate and frame size are fixed at construction.
pub trait VideoEncoder {
    /// Append one frame. Its size must equal [`frame_size`](Self::frame_size).
    fn write(&mut self, frame: &BgrImage) -> Result<(), CaptureError>;

    /// Frame rate the stream was opened with.
    fn fps(&self) -> f64;

    /// `(width, height)` the stream was opened with.
    fn frame_size(&self) -> (u32, u32);

    /// Flush and close the stream.
    fn finish(self: Box<Self>) -> Result<(), CaptureError>;
}

/// Opens video encoders on demand.
pub trait EncoderFactory {
    fn open(
        &mut self,
        path: &Path,
        fourcc: FourCc,
        fps: f64,
        frame_size: (u32, u32),
    ) -> Result<Box<dyn VideoEncoder>, CaptureError>;
}

/// Writes a single frame to an image file.
pub trait ImageWriter {
    fn write_image(&mut self, path: &Path, frame: &BgrImage) -> Result<(), CaptureError>;
}

/// [`ImageWriter`] backed by the `image` crate. The format follows the path
/// extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImageWriter;

impl ImageWriter for FileImageWriter {
    fn write_image(&mut self, path: &Path, frame: &BgrImage) -> Result<(), CaptureError> {
        frame.to_rgb_image().save(path).map_err(|source| CaptureError::ImageExport {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "wrote snapshot");
        Ok(())
    }
}
