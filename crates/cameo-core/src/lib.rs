//! Cameo Core: pixel buffers and the per-frame filter pipeline.
//!
//! This crate contains the convolution kernels, curve interpolation, lookup
//! tables and the edge-stroke compositing used on every captured frame.
//! No capture, window or encoder dependencies.

pub mod border;
pub mod curve;
pub mod edges;
pub mod error;
pub mod filter;
pub mod image;
pub mod presets;

// Re-exports for convenience.
pub use curve::{CurveFunction, compose};
pub use edges::{EdgeStroke, stroke_edges};
pub use error::FilterError;
pub use filter::{Filter, KernelFilter, LookupFilter, LookupTable};
pub use image::{BgrImage, GrayImage};
pub use presets::CurvePreset;
