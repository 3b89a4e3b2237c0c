//! The Cameo application loop.

use std::cell::Cell;
use std::rc::Rc;

use cameo_capture::source::list_images;
use cameo_capture::{Clock, DisplaySurface, FourCc, FrameSession, HeadlessWindow, ImageSequenceSource};
use cameo_core::{BgrImage, CurvePreset, EdgeStroke, Filter, LookupFilter};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::DemoError;

pub const KEY_SPACE: i32 = 32;
pub const KEY_TAB: i32 = 9;
pub const KEY_ESCAPE: i32 = 27;

const WINDOW_NAME: &str = "Cameo";
const PATTERN_SIZE: (u32, u32) = (96, 64);
const PATTERN_FRAMES: u32 = 24;

/// What a finished run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub window_closed: bool,
}

/// Captures frames, strokes their edges, grades them with a curve preset and
/// previews them. Space takes a snapshot, tab toggles recording, escape quits.
pub struct Cameo {
    config: AppConfig,
    session: FrameSession<ImageSequenceSource>,
    window: HeadlessWindow,
    pressed: Rc<Cell<Option<i32>>>,
    stroke: EdgeStroke,
    curves: LookupFilter,
}

impl Cameo {
    pub fn new(config: AppConfig, source: ImageSequenceSource, clock: Box<dyn Clock>) -> Result<Self, DemoError> {
        let preset = match &config.preset {
            Some(path) => CurvePreset::load(path)?,
            None => CurvePreset::portra(),
        };
        info!(preset = %preset.name, "loaded curve preset");

        let window = HeadlessWindow::new();
        for &(frames, code) in &config.keys {
            window.schedule_key(frames, code);
        }

        let pressed = Rc::new(Cell::new(None));
        let mut preview = DisplaySurface::new(WINDOW_NAME, Box::new(window.clone()));
        let sink = Rc::clone(&pressed);
        preview.set_key_callback(move |code| sink.set(Some(code)));

        let session = FrameSession::new(source)
            .with_preview(preview)
            .with_mirror_preview(config.mirror)
            .with_clock(clock);

        Ok(Self {
            session,
            window,
            pressed,
            stroke: EdgeStroke::default(),
            curves: preset.to_filter(),
            config,
        })
    }

    /// Handle for inspecting what the preview window showed.
    pub fn window(&self) -> &HeadlessWindow {
        &self.window
    }

    pub fn session(&self) -> &FrameSession<ImageSequenceSource> {
        &self.session
    }

    /// Run until the window is closed, the source runs dry or the frame
    /// limit is reached.
    pub fn run(&mut self) -> Result<RunSummary, DemoError> {
        self.preview()?.create_window()?;

        while self.preview()?.is_window_created() && self.session.frames_elapsed() < self.config.max_frames as u64 {
            if !self.session.enter_frame()? {
                self.session.exit_frame()?;
                info!("source exhausted");
                break;
            }
            if let Some(frame) = self.session.frame_mut() {
                self.stroke.apply_in_place(frame)?;
                self.curves.apply_in_place(frame)?;
            }
            if let Err(e) = self.session.exit_frame() {
                warn!(error = %e, "frame output failed");
            }

            self.preview()?.process_events()?;
            if let Some(code) = self.pressed.take() {
                self.on_keypress(code)?;
            }
        }

        if let Err(e) = self.session.stop_writing_video() {
            warn!(error = %e, "failed to close recording");
        }
        let summary = RunSummary {
            frames: self.session.frames_elapsed(),
            window_closed: !self.preview()?.is_window_created(),
        };
        info!(frames = summary.frames, "stopped");
        Ok(summary)
    }

    /// Space: snapshot. Tab: start or stop recording. Escape: quit.
    pub fn on_keypress(&mut self, code: i32) -> Result<(), DemoError> {
        match code {
            KEY_SPACE => self.session.write_image(&self.config.snapshot_path),
            KEY_TAB => {
                if self.session.is_writing_video() {
                    self.session.stop_writing_video()?;
                } else {
                    self.session.start_writing_video(&self.config.video_path, FourCc::MJPG)?;
                }
            }
            KEY_ESCAPE => self.preview()?.destroy_window()?,
            _ => {}
        }
        Ok(())
    }

    fn preview(&mut self) -> Result<&mut DisplaySurface, DemoError> {
        self.session
            .preview_mut()
            .ok_or_else(|| cameo_capture::CaptureError::Backend("no preview window".to_string()).into())
    }
}

/// Open the configured input, or a generated test pattern.
pub fn open_source(config: &AppConfig) -> Result<ImageSequenceSource, DemoError> {
    let source = match &config.input {
        Some(path) if path.is_dir() => {
            let paths = list_images(path)?;
            if paths.is_empty() {
                return Err(DemoError::NoInput(path.clone()));
            }
            ImageSequenceSource::open(&paths)?
        }
        Some(path) => ImageSequenceSource::open(&[path.as_path()])?,
        None => ImageSequenceSource::from_frames(test_pattern(PATTERN_SIZE, PATTERN_FRAMES))?,
    };
    Ok(source.with_repeat(true).with_fps(config.fps))
}

/// A bright square drifting across a gradient.
pub fn test_pattern((width, height): (u32, u32), frames: u32) -> Vec<BgrImage> {
    (0..frames)
        .map(|n| {
            let side = height / 3;
            let left = n * (width - side) / frames.max(1);
            let top = height / 3;
            let pixels = (0..height)
                .flat_map(|y| (0..width).map(move |x| (x, y)))
                .map(|(x, y)| {
                    if (left..left + side).contains(&x) && (top..top + side).contains(&y) {
                        [230, 220, 200]
                    } else {
                        [(x * 255 / width) as u8, 96, (y * 255 / height) as u8]
                    }
                })
                .collect();
            BgrImage { width, height, pixels }
        })
        .collect()
}
