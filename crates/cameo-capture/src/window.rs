//! Preview window lifecycle and input dispatch.

use std::fmt;
use std::time::Duration;

use cameo_core::BgrImage;
use tracing::{debug, info};

use crate::error::CaptureError;

/// How long [`DisplaySurface::process_events`] waits for input.
pub const EVENT_WAIT: Duration = Duration::from_millis(1);

/// Pointer event kinds, numbered like the common desktop toolkits.
pub mod pointer {
    pub const MOVE: i32 = 0;
    pub const LEFT_DOWN: i32 = 1;
    pub const RIGHT_DOWN: i32 = 2;
    pub const MIDDLE_DOWN: i32 = 3;
    pub const LEFT_UP: i32 = 4;
    pub const RIGHT_UP: i32 = 5;
    pub const MIDDLE_UP: i32 = 6;
}

/// A pointer event inside the preview window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// One of the [`pointer`] kinds.
    pub kind: i32,
    pub x: i32,
    pub y: i32,
    /// Button and modifier bit flags.
    pub flags: i32,
}

/// Input collected by one [`WindowBackend::wait_events`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolledEvents {
    /// At most one key code.
    pub key: Option<i32>,
    pub pointer: Vec<PointerEvent>,
}

/// A native windowing system, or a stand-in for one.
pub trait WindowBackend {
    fn create_window(&mut self, name: &str) -> Result<(), CaptureError>;

    fn show(&mut self, name: &str, frame: &BgrImage) -> Result<(), CaptureError>;

    fn destroy_window(&mut self, name: &str) -> Result<(), CaptureError>;

    /// Wait up to `timeout` for input and return what arrived.
    fn wait_events(&mut self, timeout: Duration) -> Result<PolledEvents, CaptureError>;
}

type KeyCallback = Box<dyn FnMut(i32)>;
type PointerCallback = Box<dyn FnMut(PointerEvent)>;

/// A named preview window with single-slot key and pointer callbacks.
pub struct DisplaySurface {
    name: String,
    created: bool,
    backend: Box<dyn WindowBackend>,
    key_callback: Option<KeyCallback>,
    pointer_callback: Option<PointerCallback>,
    pointer_bound: bool,
}

impl DisplaySurface {
    pub fn new(name: impl Into<String>, backend: Box<dyn WindowBackend>) -> Self {
        Self {
            name: name.into(),
            created: false,
            backend,
            key_callback: None,
            pointer_callback: None,
            pointer_bound: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_window_created(&self) -> bool {
        self.created
    }

    /// Replace the key callback.
    pub fn set_key_callback(&mut self, callback: impl FnMut(i32) + 'static) {
        self.key_callback = Some(Box::new(callback));
    }

    /// Replace the pointer callback. Takes effect at the next
    /// [`create_window`](Self::create_window).
    pub fn set_pointer_callback(&mut self, callback: impl FnMut(PointerEvent) + 'static) {
        self.pointer_callback = Some(Box::new(callback));
    }

    /// Create the window if it does not exist yet.
    pub fn create_window(&mut self) -> Result<(), CaptureError> {
        if self.created {
            return Ok(());
        }
        self.backend.create_window(&self.name)?;
        self.created = true;
        self.pointer_bound = self.pointer_callback.is_some();
        info!(window = %self.name, pointer = self.pointer_bound, "created window");
        Ok(())
    }

    /// Display `frame`. Does nothing while the window does not exist.
    pub fn show(&mut self, frame: &BgrImage) -> Result<(), CaptureError> {
        if !self.created {
            return Ok(());
        }
        self.backend.show(&self.name, frame)
    }

    /// Close the window. Safe to call when it was never created.
    pub fn destroy_window(&mut self) -> Result<(), CaptureError> {
        if !self.created {
            return Ok(());
        }
        self.backend.destroy_window(&self.name)?;
        self.created = false;
        self.pointer_bound = false;
        info!(window = %self.name, "destroyed window");
        Ok(())
    }

    /// Wait briefly for input and dispatch it.
    ///
    /// Pointer events go to the pointer callback if it was bound at window
    /// creation. At most one key is delivered per call.
    pub fn process_events(&mut self) -> Result<(), CaptureError> {
        let events = self.backend.wait_events(EVENT_WAIT)?;

        if self.pointer_bound {
            if let Some(callback) = self.pointer_callback.as_mut() {
                for event in events.pointer {
                    callback(event);
                }
            }
        }

        if let Some(code) = events.key {
            debug!(window = %self.name, code, "key pressed");
            if let Some(callback) = self.key_callback.as_mut() {
                callback(code);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for DisplaySurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplaySurface")
            .field("name", &self.name)
            .field("created", &self.created)
            .field("key_callback", &self.key_callback.is_some())
            .field("pointer_callback", &self.pointer_callback.is_some())
            .finish()
    }
}
