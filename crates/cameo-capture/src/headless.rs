//! In-process window backend with no display.
//!
//! Input is scripted: keys and pointer events are queued by the caller, and
//! keys may be held back until a number of frames has been shown. Clones
//! share state, so a test or the application can keep one handle while the
//! [`DisplaySurface`](crate::DisplaySurface) owns another.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use cameo_core::BgrImage;
use tracing::trace;

use crate::error::CaptureError;
use crate::window::{PointerEvent, PolledEvents, WindowBackend};

#[derive(Debug, Default)]
struct HeadlessState {
    open: Option<String>,
    created_count: usize,
    shown: usize,
    last_frame: Option<BgrImage>,
    keys: VecDeque<i32>,
    /// `(shown frame count, key)` pairs released once that many frames are shown.
    scheduled: Vec<(usize, i32)>,
    pointer: Vec<PointerEvent>,
}

/// Headless [`WindowBackend`] that records what it is shown.
#[derive(Debug, Clone, Default)]
pub struct HeadlessWindow {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a key for the next poll.
    pub fn push_key(&self, code: i32) {
        self.state.borrow_mut().keys.push_back(code);
    }

    /// Queue `code` once `frames` frames have been shown.
    pub fn schedule_key(&self, frames: usize, code: i32) {
        self.state.borrow_mut().scheduled.push((frames, code));
    }

    /// Queue a pointer event for the next poll.
    pub fn push_pointer(&self, event: PointerEvent) {
        self.state.borrow_mut().pointer.push(event);
    }

    /// Frames shown since construction.
    pub fn shown_count(&self) -> usize {
        self.state.borrow().shown
    }

    /// Most recently shown frame.
    pub fn last_frame(&self) -> Option<BgrImage> {
        self.state.borrow().last_frame.clone()
    }

    /// Name of the open window, if any.
    pub fn open_window(&self) -> Option<String> {
        self.state.borrow().open.clone()
    }

    /// Number of times a window was created.
    pub fn created_count(&self) -> usize {
        self.state.borrow().created_count
    }
}

impl WindowBackend for HeadlessWindow {
    fn create_window(&mut self, name: &str) -> Result<(), CaptureError> {
        let mut state = self.state.borrow_mut();
        if let Some(open) = &state.open {
            return Err(CaptureError::Backend(format!("window {open:?} is already open")));
        }
        state.open = Some(name.to_string());
        state.created_count += 1;
        Ok(())
    }

    fn show(&mut self, name: &str, frame: &BgrImage) -> Result<(), CaptureError> {
        let mut state = self.state.borrow_mut();
        if state.open.as_deref() != Some(name) {
            return Err(CaptureError::Backend(format!("no window named {name:?}")));
        }
        state.shown += 1;
        state.last_frame = Some(frame.clone());
        trace!(window = name, shown = state.shown, "frame shown");
        Ok(())
    }

    fn destroy_window(&mut self, name: &str) -> Result<(), CaptureError> {
        let mut state = self.state.borrow_mut();
        if state.open.as_deref() != Some(name) {
            return Err(CaptureError::Backend(format!("no window named {name:?}")));
        }
        state.open = None;
        Ok(())
    }

    fn wait_events(&mut self, _timeout: Duration) -> Result<PolledEvents, CaptureError> {
        let mut state = self.state.borrow_mut();
        let shown = state.shown;
        let (due, pending): (Vec<_>, Vec<_>) = state.scheduled.drain(..).partition(|&(at, _)| at <= shown);
        state.scheduled = pending;
        state.keys.extend(due.into_iter().map(|(_, code)| code));

        Ok(PolledEvents {
            key: state.keys.pop_front(),
            pointer: std::mem::take(&mut state.pointer),
        })
    }
}
