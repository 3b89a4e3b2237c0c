//! Frame sources.
//!
//! [`CaptureSource`] mirrors the grab/retrieve split of camera drivers: `grab`
//! advances to the next frame cheaply, `retrieve` decodes it on demand.

use std::path::{Path, PathBuf};

use cameo_core::BgrImage;
use tracing::{debug, info, warn};

use crate::error::CaptureError;

/// A device or file that yields BGR frames.
pub trait CaptureSource {
    /// Advance to the next frame. `false` means no frame is available.
    fn grab(&mut self) -> bool;

    /// Decode the grabbed frame for `channel`, or `None` on failure.
    fn retrieve(&mut self, channel: u32) -> Option<BgrImage>;

    /// Frame rate reported by the device. Zero or negative when unknown.
    fn reported_fps(&self) -> f64;

    /// `(width, height)` of the frames this source produces.
    fn frame_size(&self) -> (u32, u32);
}

/// Plays a list of still images as a capture source.
///
/// Only channel 0 exists. The reported frame rate is 0 unless set, which
/// makes recordings estimate their rate from the loop timing.
#[derive(Debug)]
pub struct ImageSequenceSource {
    frames: Vec<BgrImage>,
    cursor: Option<usize>,
    repeat: bool,
    fps: f64,
}

impl ImageSequenceSource {
    /// Load every path up front. Fails if the list is empty or any file
    /// cannot be decoded.
    pub fn open<P: AsRef<Path>>(paths: &[P]) -> Result<Self, CaptureError> {
        if paths.is_empty() {
            return Err(CaptureError::SourceUnavailable("no input images".to_string()));
        }
        let frames = paths
            .iter()
            .map(|p| load_frame(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        info!(count = frames.len(), "opened image sequence");
        Self::from_frames(frames)
    }

    /// Use already decoded frames. All frames must share one size.
    pub fn from_frames(frames: Vec<BgrImage>) -> Result<Self, CaptureError> {
        let Some(first) = frames.first() else {
            return Err(CaptureError::SourceUnavailable("no input images".to_string()));
        };
        let expected = first.dimensions();
        if let Some(other) = frames.iter().find(|f| f.dimensions() != expected) {
            return Err(CaptureError::FrameSizeMismatch {
                expected,
                actual: other.dimensions(),
            });
        }
        Ok(Self {
            frames,
            cursor: None,
            repeat: false,
            fps: 0.0,
        })
    }

    /// Start over after the last frame instead of running dry.
    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// Report `fps` as the device rate.
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Number of frames in one pass.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn load_frame(path: &Path) -> Result<BgrImage, CaptureError> {
    let decoded = image::open(path).map_err(|e| {
        warn!(path = %path.display(), error = %e, "failed to load input image");
        CaptureError::SourceUnavailable(format!("{}: {e}", path.display()))
    })?;
    Ok(BgrImage::from(&decoded.to_rgb8()))
}

impl CaptureSource for ImageSequenceSource {
    fn grab(&mut self) -> bool {
        let next = self.cursor.map_or(0, |i| i + 1);
        if next < self.frames.len() {
            self.cursor = Some(next);
            true
        } else if self.repeat {
            self.cursor = Some(0);
            true
        } else {
            debug!("image sequence exhausted");
            false
        }
    }

    fn retrieve(&mut self, channel: u32) -> Option<BgrImage> {
        if channel != 0 {
            return None;
        }
        self.cursor.and_then(|i| self.frames.get(i).cloned())
    }

    fn reported_fps(&self) -> f64 {
        self.fps
    }

    fn frame_size(&self) -> (u32, u32) {
        self.frames.first().map_or((0, 0), BgrImage::dimensions)
    }
}

/// Sorted image paths in `dir` with a common still-image extension.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, CaptureError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg" | "bmp"))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(n: u8) -> Vec<BgrImage> {
        (0..n).map(|i| BgrImage::filled(2, 2, [i, i, i])).collect()
    }

    #[test]
    fn test_plays_once_without_repeat() {
        let mut source = ImageSequenceSource::from_frames(frames(2)).expect("source");
        assert!(source.grab());
        assert_eq!(source.retrieve(0).expect("frame").pixel(0, 0), [0, 0, 0]);
        assert!(source.grab());
        assert_eq!(source.retrieve(0).expect("frame").pixel(0, 0), [1, 1, 1]);
        assert!(!source.grab());
    }

    #[test]
    fn test_repeat_wraps_around() {
        let mut source = ImageSequenceSource::from_frames(frames(2)).expect("source").with_repeat(true);
        for _ in 0..3 {
            assert!(source.grab());
        }
        assert_eq!(source.retrieve(0).expect("frame").pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_only_channel_zero() {
        let mut source = ImageSequenceSource::from_frames(frames(1)).expect("source");
        assert!(source.retrieve(0).is_none());
        assert!(source.grab());
        assert!(source.retrieve(1).is_none());
        assert!(source.retrieve(0).is_some());
    }

    #[test]
    fn test_rejects_empty_and_mixed_sizes() {
        assert!(matches!(
            ImageSequenceSource::from_frames(Vec::new()),
            Err(CaptureError::SourceUnavailable(_))
        ));
        let mixed = vec![BgrImage::filled(2, 2, [0; 3]), BgrImage::filled(3, 2, [0; 3])];
        assert!(matches!(
            ImageSequenceSource::from_frames(mixed),
            Err(CaptureError::FrameSizeMismatch { .. })
        ));
        let no_paths: [&str; 0] = [];
        assert!(ImageSequenceSource::open(&no_paths).is_err());
    }

    #[test]
    fn test_reported_fps_and_size() {
        let source = ImageSequenceSource::from_frames(frames(1)).expect("source").with_fps(30.0);
        assert_eq!(source.reported_fps(), 30.0);
        assert_eq!(source.frame_size(), (2, 2));
    }
}
