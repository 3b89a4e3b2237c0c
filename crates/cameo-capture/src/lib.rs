//! Cameo Capture: frame capture lifecycle, recording and preview windows.
//!
//! The camera, the video encoder, the image writer and the window system are
//! collaborators behind traits. Concrete implementations that need nothing
//! but files are included: an image-sequence source, an `image`-crate
//! snapshot writer, an MJPEG AVI encoder and a headless window.

pub mod avi;
pub mod clock;
pub mod error;
pub mod fourcc;
pub mod headless;
pub mod output;
pub mod recording;
pub mod session;
pub mod source;
pub mod window;

pub use avi::{MjpegAviEncoder, MjpegAviFactory};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::CaptureError;
pub use fourcc::FourCc;
pub use headless::HeadlessWindow;
pub use output::{EncoderFactory, FileImageWriter, ImageWriter, VideoEncoder};
pub use recording::Recording;
pub use session::{FPS_ESTIMATION_FRAMES, FrameSession};
pub use source::{CaptureSource, ImageSequenceSource};
pub use window::{DisplaySurface, PointerEvent, PolledEvents, WindowBackend};
