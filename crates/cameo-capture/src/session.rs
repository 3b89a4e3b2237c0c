//! Per-frame capture lifecycle.
//!
//! Each iteration of the application loop brackets its work between
//! [`FrameSession::enter_frame`] and [`FrameSession::exit_frame`]. Entering
//! grabs a frame from the source; the frame is decoded lazily on first
//! access; exiting hands it to the preview, the pending snapshot and the
//! video recording, then releases it.

use std::path::PathBuf;
use std::time::Instant;

use cameo_core::BgrImage;
use tracing::{debug, info, warn};

use crate::avi::MjpegAviFactory;
use crate::clock::{Clock, SystemClock};
use crate::error::CaptureError;
use crate::fourcc::FourCc;
use crate::output::{EncoderFactory, FileImageWriter, ImageWriter};
use crate::recording::Recording;
use crate::source::CaptureSource;
use crate::window::DisplaySurface;

/// Frames timed before an estimated rate is trusted for a recording.
pub const FPS_ESTIMATION_FRAMES: u64 = 20;

/// Owns a capture source and routes each processed frame to its sinks.
pub struct FrameSession<S: CaptureSource> {
    source: S,
    encoders: Box<dyn EncoderFactory>,
    images: Box<dyn ImageWriter>,
    clock: Box<dyn Clock>,
    preview: Option<DisplaySurface>,
    mirror_preview: bool,
    channel: u32,
    entered_frame: bool,
    frame: Option<BgrImage>,
    image_request: Option<PathBuf>,
    recording: Recording,
    recording_start: Option<Instant>,
    frames_elapsed: u64,
    fps_estimate: Option<f64>,
}

impl<S: CaptureSource> FrameSession<S> {
    /// Session writing snapshots with the `image` crate and video as
    /// MJPEG AVI, timed by the system clock.
    pub fn new(source: S) -> Self {
        Self {
            source,
            encoders: Box::new(MjpegAviFactory::default()),
            images: Box::new(FileImageWriter),
            clock: Box::new(SystemClock),
            preview: None,
            mirror_preview: false,
            channel: 0,
            entered_frame: false,
            frame: None,
            image_request: None,
            recording: Recording::Unarmed,
            recording_start: None,
            frames_elapsed: 0,
            fps_estimate: None,
        }
    }

    pub fn with_preview(mut self, preview: DisplaySurface) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn with_mirror_preview(mut self, mirror: bool) -> Self {
        self.mirror_preview = mirror;
        self
    }

    pub fn with_encoder_factory(mut self, encoders: Box<dyn EncoderFactory>) -> Self {
        self.encoders = encoders;
        self
    }

    pub fn with_image_writer(mut self, images: Box<dyn ImageWriter>) -> Self {
        self.images = images;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn preview(&self) -> Option<&DisplaySurface> {
        self.preview.as_ref()
    }

    pub fn preview_mut(&mut self) -> Option<&mut DisplaySurface> {
        self.preview.as_mut()
    }

    pub fn mirror_preview(&self) -> bool {
        self.mirror_preview
    }

    /// Mirror the preview horizontally. Snapshots and recordings are not
    /// affected.
    pub fn set_mirror_preview(&mut self, mirror: bool) {
        self.mirror_preview = mirror;
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    /// Switch the source channel. A change drops the cached frame.
    pub fn set_channel(&mut self, channel: u32) {
        if self.channel != channel {
            self.channel = channel;
            self.frame = None;
        }
    }

    /// Whether a snapshot is waiting for the next exited frame.
    pub fn is_writing_image(&self) -> bool {
        self.image_request.is_some()
    }

    /// Whether recording is armed, whether or not the encoder is open yet.
    pub fn is_writing_video(&self) -> bool {
        self.recording.is_armed()
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Measured frame rate, once two frames have been processed.
    pub fn fps_estimate(&self) -> Option<f64> {
        self.fps_estimate
    }

    /// Frames that made it through [`exit_frame`](Self::exit_frame).
    pub fn frames_elapsed(&self) -> u64 {
        self.frames_elapsed
    }

    /// Grab the next frame.
    ///
    /// Returns whether a frame was grabbed. A failed grab is not an error;
    /// the following `exit_frame` is then a no-op. Entering twice without
    /// exiting is a [`CaptureError::ProtocolViolation`].
    pub fn enter_frame(&mut self) -> Result<bool, CaptureError> {
        if self.entered_frame {
            return Err(CaptureError::ProtocolViolation);
        }
        self.entered_frame = self.source.grab();
        if !self.entered_frame {
            debug!("grab failed");
        }
        Ok(self.entered_frame)
    }

    /// The current frame, decoded on first access after `enter_frame`.
    pub fn frame(&mut self) -> Option<&BgrImage> {
        self.fetch_frame();
        self.frame.as_ref()
    }

    /// Mutable access to the current frame, for in-place filtering.
    pub fn frame_mut(&mut self) -> Option<&mut BgrImage> {
        self.fetch_frame();
        self.frame.as_mut()
    }

    /// Release the current frame: update the rate estimate, show it, write
    /// any pending snapshot and append it to the recording.
    ///
    /// Snapshot and encoder failures are returned after the frame has been
    /// released, so the session is always ready for the next `enter_frame`.
    pub fn exit_frame(&mut self) -> Result<(), CaptureError> {
        self.fetch_frame();
        self.entered_frame = false;
        let Some(frame) = self.frame.take() else {
            return Ok(());
        };

        self.update_fps_estimate();
        self.frames_elapsed += 1;

        if let Some(preview) = self.preview.as_mut() {
            let shown = if self.mirror_preview {
                preview.show(&frame.mirrored())
            } else {
                preview.show(&frame)
            };
            if let Err(e) = shown {
                warn!(error = %e, "failed to show frame");
            }
        }

        let snapshot = match self.image_request.take() {
            Some(path) => self.images.write_image(&path, &frame),
            None => Ok(()),
        };

        let video = self.write_video_frame(&frame);
        snapshot.and(video)
    }

    /// Write the next exited frame to `path`.
    pub fn write_image(&mut self, path: impl Into<PathBuf>) {
        self.image_request = Some(path.into());
    }

    /// Record exited frames to `path`. Any recording in progress is closed
    /// first.
    pub fn start_writing_video(&mut self, path: impl Into<PathBuf>, fourcc: FourCc) -> Result<(), CaptureError> {
        let closed = self.stop_writing_video();
        let path = path.into();
        info!(path = %path.display(), %fourcc, "armed recording");
        self.recording = Recording::ArmedPendingRate { path, fourcc };
        closed
    }

    /// Stop recording and close the encoder, if one was opened.
    pub fn stop_writing_video(&mut self) -> Result<(), CaptureError> {
        match std::mem::take(&mut self.recording) {
            Recording::ArmedReady { path, encoder } => {
                info!(path = %path.display(), "stopped recording");
                encoder.finish()
            }
            Recording::ArmedPendingRate { path, .. } => {
                debug!(path = %path.display(), "recording stopped before the encoder opened");
                Ok(())
            }
            Recording::Unarmed => Ok(()),
        }
    }

    fn fetch_frame(&mut self) {
        if self.entered_frame && self.frame.is_none() {
            self.frame = self.source.retrieve(self.channel);
            if self.frame.is_none() {
                debug!(channel = self.channel, "retrieve failed");
            }
        }
    }

    fn update_fps_estimate(&mut self) {
        let now = self.clock.now();
        match self.recording_start {
            Some(start) if self.frames_elapsed > 0 => {
                let elapsed = now.duration_since(start).as_secs_f64();
                if elapsed > 0.0 {
                    self.fps_estimate = Some(self.frames_elapsed as f64 / elapsed);
                }
            }
            _ => self.recording_start = Some(now),
        }
    }

    /// Rate for a new encoder, or `None` while it is still being measured.
    fn recording_rate(&self) -> Option<f64> {
        let reported = self.source.reported_fps();
        if reported > 0.0 {
            return Some(reported);
        }
        if self.frames_elapsed < FPS_ESTIMATION_FRAMES {
            return None;
        }
        self.fps_estimate
    }

    fn write_video_frame(&mut self, frame: &BgrImage) -> Result<(), CaptureError> {
        match std::mem::take(&mut self.recording) {
            Recording::Unarmed => Ok(()),
            Recording::ArmedPendingRate { path, fourcc } => {
                let Some(fps) = self.recording_rate() else {
                    debug!(frames = self.frames_elapsed, "measuring frame rate, frame not recorded");
                    self.recording = Recording::ArmedPendingRate { path, fourcc };
                    return Ok(());
                };
                let size = self.source.frame_size();
                let mut encoder = self.encoders.open(&path, fourcc, fps, size).inspect_err(|e| {
                    warn!(path = %path.display(), error = %e, "failed to open encoder, recording stopped");
                })?;
                info!(path = %path.display(), fps, width = size.0, height = size.1, "recording started");
                let written = encoder.write(frame);
                self.recording = Recording::ArmedReady { path, encoder };
                written
            }
            Recording::ArmedReady { path, mut encoder } => {
                let written = encoder.write(frame);
                self.recording = Recording::ArmedReady { path, encoder };
                written
            }
        }
    }
}

impl<S: CaptureSource> Drop for FrameSession<S> {
    fn drop(&mut self) {
        if let Err(e) = self.stop_writing_video() {
            warn!(error = %e, "failed to close recording");
        }
    }
}
