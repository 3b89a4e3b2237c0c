//! Spatial convolution kernels.
//!
//! Kernels are applied as a correlation (no flip) with the anchor at the
//! kernel centre and `Reflect101` borders. Results are rounded half-to-even
//! and saturated to `u8`, each channel independently.

use crate::border::{BorderMode, map_index};
use crate::error::FilterError;
use crate::filter::Filter;
use crate::image::{BgrImage, GrayImage};

/// A dense `rows × cols` weight matrix, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    rows: usize,
    cols: usize,
    weights: Vec<f64>,
}

impl Kernel {
    /// Build a kernel from equally long rows.
    pub fn new(rows: &[&[f64]]) -> Result<Self, FilterError> {
        let cols = rows.first().map_or(0, |r| r.len());
        if cols == 0 {
            return Err(FilterError::EmptyKernel);
        }
        if rows.iter().any(|r| r.len() != cols) {
            return Err(FilterError::SizeMismatch {
                width: cols as u32,
                height: rows.len() as u32,
                actual: rows.iter().map(|r| r.len()).sum(),
            });
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            weights: rows.concat(),
        })
    }

    /// Outer product `column[r] × row[c]`, for separable kernels.
    pub(crate) fn outer(column: &[f64], row: &[f64]) -> Self {
        let weights = column
            .iter()
            .flat_map(|&cw| row.iter().map(move |&rw| cw * rw))
            .collect();
        Self {
            rows: column.len(),
            cols: row.len(),
            weights,
        }
    }

    /// Element-wise sum of two kernels of the same shape.
    pub(crate) fn plus(&self, other: &Self) -> Self {
        debug_assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        Self {
            rows: self.rows,
            cols: self.cols,
            weights: self.weights.iter().zip(&other.weights).map(|(a, b)| a + b).collect(),
        }
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Sum of all weights. 1 preserves flat regions, 0 maps them to black.
    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Weight at `(row, col)`.
    pub fn weight(&self, row: usize, col: usize) -> f64 {
        self.weights[row * self.cols + col]
    }
}

/// Correlate interleaved 8-bit data with `kernel`.
fn correlate(
    src: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    kernel: &Kernel,
    border: BorderMode,
) -> Vec<u8> {
    let (w, h) = (width as usize, height as usize);
    let mut dst = vec![0u8; src.len()];
    if w == 0 || h == 0 {
        return dst;
    }

    let anchor_y = (kernel.rows / 2) as isize;
    let anchor_x = (kernel.cols / 2) as isize;

    // Precompute source columns for every output column and kernel tap.
    let col_map: Vec<usize> = (0..w as isize)
        .flat_map(|x| (0..kernel.cols as isize).map(move |kx| (x, kx)))
        .map(|(x, kx)| map_index(x + kx - anchor_x, w, border))
        .collect();

    let mut acc = vec![0.0_f64; channels];
    for y in 0..h {
        for x in 0..w {
            acc.fill(0.0);
            for ky in 0..kernel.rows {
                let sy = map_index(y as isize + ky as isize - anchor_y, h, border);
                let row = &src[sy * w * channels..(sy + 1) * w * channels];
                for kx in 0..kernel.cols {
                    let weight = kernel.weights[ky * kernel.cols + kx];
                    if weight == 0.0 {
                        continue;
                    }
                    let sx = col_map[x * kernel.cols + kx];
                    for (c, slot) in acc.iter_mut().enumerate() {
                        *slot += weight * row[sx * channels + c] as f64;
                    }
                }
            }
            let out = &mut dst[(y * w + x) * channels..(y * w + x + 1) * channels];
            for (o, v) in out.iter_mut().zip(&acc) {
                *o = saturate_u8(*v);
            }
        }
    }
    dst
}

fn saturate_u8(v: f64) -> u8 {
    v.round_ties_even().clamp(0.0, 255.0) as u8
}

/// Filter that correlates every channel with a fixed kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelFilter {
    kernel: Kernel,
}

impl KernelFilter {
    /// Wrap an arbitrary kernel.
    pub fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }

    /// Sharpen with a 1-pixel radius. Weights sum to 1.
    pub fn sharpen() -> Self {
        Self::ring(9.0)
    }

    /// Find edges with a 1-pixel radius. Weights sum to 0.
    pub fn find_edges() -> Self {
        Self::ring(8.0)
    }

    /// Blur with a 2-pixel radius: 5×5 uniform average.
    pub fn blur() -> Self {
        Self {
            kernel: Kernel {
                rows: 5,
                cols: 5,
                weights: vec![0.04; 25],
            },
        }
    }

    /// Emboss with a 1-pixel radius, lit from the bottom right.
    pub fn emboss() -> Self {
        Self::from_rows([[-2.0, -1.0, 0.0], [-1.0, 1.0, 1.0], [0.0, 1.0, 2.0]])
    }

    /// 5×5 high-pass kernel that keeps finer edge detail than
    /// [`find_edges`](Self::find_edges).
    pub fn high_pass() -> Self {
        Self::from_rows([
            [-1.0, -1.0, -1.0, -1.0, -1.0],
            [-1.0, 1.0, 2.0, 1.0, -1.0],
            [-1.0, 2.0, 4.0, 2.0, -1.0],
            [-1.0, 1.0, 2.0, 1.0, -1.0],
            [-1.0, -1.0, -1.0, -1.0, -1.0],
        ])
    }

    /// The kernel in use.
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Filter a single-channel image.
    pub fn apply_gray(&self, src: &GrayImage) -> Result<GrayImage, FilterError> {
        src.check_size()?;
        Ok(GrayImage {
            width: src.width,
            height: src.height,
            pixels: correlate(&src.pixels, src.width, src.height, 1, &self.kernel, BorderMode::Reflect101),
        })
    }

    fn ring(center: f64) -> Self {
        Self::from_rows([[-1.0, -1.0, -1.0], [-1.0, center, -1.0], [-1.0, -1.0, -1.0]])
    }

    fn from_rows<const N: usize>(rows: [[f64; N]; N]) -> Self {
        Self {
            kernel: Kernel {
                rows: N,
                cols: N,
                weights: rows.concat(),
            },
        }
    }
}

impl Filter for KernelFilter {
    fn apply(&self, src: &BgrImage) -> Result<BgrImage, FilterError> {
        src.check_size()?;
        let bytes = correlate(src.as_bytes(), src.width, src.height, 3, &self.kernel, BorderMode::Reflect101);
        let pixels = bytes.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        BgrImage::from_pixels(src.width, src.height, pixels)
    }
}
