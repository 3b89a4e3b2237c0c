//! 256-entry lookup tables and the per-channel lookup filter.

use crate::curve::{ChannelFn, CurveFunction, compose};
use crate::error::FilterError;
use crate::filter::Filter;
use crate::image::BgrImage;

/// Number of distinct 8-bit inputs.
const TABLE_LEN: usize = 256;

/// Precomputed mapping for every 8-bit input value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTable {
    entries: [u8; TABLE_LEN],
}

impl LookupTable {
    /// Table that maps every value to itself.
    pub fn identity() -> Self {
        Self {
            entries: std::array::from_fn(|i| i as u8),
        }
    }

    /// Tabulate `func` at `0..=255`.
    ///
    /// Results are clamped to `[0, 255]` and truncated toward zero. Inputs
    /// where `func` is undefined map to 0.
    pub fn from_fn(func: impl Fn(f64) -> Option<f64>) -> Self {
        Self {
            entries: std::array::from_fn(|i| match func(i as f64) {
                Some(v) if !v.is_nan() => v.clamp(0.0, (TABLE_LEN - 1) as f64) as u8,
                _ => 0,
            }),
        }
    }

    /// Output for `value`.
    pub fn get(&self, value: u8) -> u8 {
        self.entries[value as usize]
    }

    /// All 256 entries.
    pub fn entries(&self) -> &[u8; TABLE_LEN] {
        &self.entries
    }
}

/// Filter that maps each of blue, green and red through its own table.
///
/// A missing table leaves that channel untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFilter {
    blue: Option<LookupTable>,
    green: Option<LookupTable>,
    red: Option<LookupTable>,
}

impl LookupFilter {
    /// Build from per-channel functions plus a shared `value` function that
    /// runs first on every channel: `channel(value(x))`.
    pub fn from_functions(
        value: Option<ChannelFn<'_>>,
        blue: Option<ChannelFn<'_>>,
        green: Option<ChannelFn<'_>>,
        red: Option<ChannelFn<'_>>,
    ) -> Self {
        Self {
            blue: channel_table(blue, value),
            green: channel_table(green, value),
            red: channel_table(red, value),
        }
    }

    /// Build from control-point curves. Any curve may be absent.
    pub fn from_curves(
        value: Option<&CurveFunction>,
        blue: Option<&CurveFunction>,
        green: Option<&CurveFunction>,
        red: Option<&CurveFunction>,
    ) -> Self {
        let value = value.map(|c| c.as_fn());
        let blue = blue.map(|c| c.as_fn());
        let green = green.map(|c| c.as_fn());
        let red = red.map(|c| c.as_fn());
        Self::from_functions(
            value.as_ref().map(|f| f as ChannelFn<'_>),
            blue.as_ref().map(|f| f as ChannelFn<'_>),
            green.as_ref().map(|f| f as ChannelFn<'_>),
            red.as_ref().map(|f| f as ChannelFn<'_>),
        )
    }

    /// Build from precomputed tables.
    pub fn from_tables(blue: Option<LookupTable>, green: Option<LookupTable>, red: Option<LookupTable>) -> Self {
        Self { blue, green, red }
    }

    /// Tables in `[blue, green, red]` order.
    pub fn tables(&self) -> [Option<&LookupTable>; 3] {
        [self.blue.as_ref(), self.green.as_ref(), self.red.as_ref()]
    }
}

fn channel_table(channel: Option<ChannelFn<'_>>, value: Option<ChannelFn<'_>>) -> Option<LookupTable> {
    compose(channel, value).map(|f| LookupTable::from_fn(|x| f.eval(x)))
}

impl Filter for LookupFilter {
    fn apply(&self, src: &BgrImage) -> Result<BgrImage, FilterError> {
        src.check_size()?;
        let tables = self.tables();
        if tables.iter().all(Option::is_none) {
            return Ok(src.clone());
        }
        let mut planes = src.split();
        for (plane, table) in planes.iter_mut().zip(tables) {
            if let Some(table) = table {
                plane.pixels.iter_mut().for_each(|v| *v = table.get(*v));
            }
        }
        BgrImage::merge(&planes)
    }
}
