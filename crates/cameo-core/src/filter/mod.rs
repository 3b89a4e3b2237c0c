//! Per-frame filters: spatial kernels and per-channel lookup tables.

mod kernel;
mod lookup;

pub use kernel::{Kernel, KernelFilter};
pub use lookup::{LookupFilter, LookupTable};

use crate::error::FilterError;
use crate::image::BgrImage;

/// A transform from one BGR frame to another of the same size.
pub trait Filter {
    /// Filter `src` into a new frame.
    fn apply(&self, src: &BgrImage) -> Result<BgrImage, FilterError>;

    /// Filter `image` in place. The destination aliases the source.
    fn apply_in_place(&self, image: &mut BgrImage) -> Result<(), FilterError> {
        *image = self.apply(image)?;
        Ok(())
    }
}
