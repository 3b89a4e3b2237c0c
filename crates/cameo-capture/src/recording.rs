//! Recording state for a capture session.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::fourcc::FourCc;
use crate::output::VideoEncoder;

/// Where a session is in the lifecycle of a video recording.
///
/// Recording is armed by a path and codec, but the encoder needs a frame
/// rate. When the source does not report one, the session stays in
/// [`ArmedPendingRate`](Self::ArmedPendingRate) while it measures the rate.
#[derive(Default)]
pub enum Recording {
    #[default]
    Unarmed,
    ArmedPendingRate { path: PathBuf, fourcc: FourCc },
    ArmedReady { path: PathBuf, encoder: Box<dyn VideoEncoder> },
}

impl Recording {
    pub fn is_armed(&self) -> bool {
        !matches!(self, Self::Unarmed)
    }

    /// Output path while armed.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Unarmed => None,
            Self::ArmedPendingRate { path, .. } | Self::ArmedReady { path, .. } => Some(path.as_path()),
        }
    }

    /// The open encoder, once the rate is known.
    pub fn encoder(&self) -> Option<&dyn VideoEncoder> {
        match self {
            Self::ArmedReady { encoder, .. } => Some(&**encoder),
            _ => None,
        }
    }
}

impl fmt::Debug for Recording {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unarmed => f.write_str("Unarmed"),
            Self::ArmedPendingRate { path, fourcc } => f
                .debug_struct("ArmedPendingRate")
                .field("path", path)
                .field("fourcc", fourcc)
                .finish(),
            Self::ArmedReady { path, encoder } => f
                .debug_struct("ArmedReady")
                .field("path", path)
                .field("fps", &encoder.fps())
                .field("frame_size", &encoder.frame_size())
                .finish(),
        }
    }
}
