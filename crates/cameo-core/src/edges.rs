//! Edge stroking: darken a frame along its detected edges.
//!
//! # Algorithm
//! 1. Median blur the source (skipped when the blur size is below 3), then
//!    convert to grayscale.
//! 2. Laplacian of the grayscale image, saturated to `u8`.
//! 3. Inverse alpha per pixel: `alpha = (255 − edge) / 255`.
//! 4. Multiply every channel of the *original* source by `alpha`.
//!
//! Flat regions have alpha 1 and pass through; strong edges go toward black.

use crate::border::{BorderMode, map_index};
use crate::error::FilterError;
use crate::filter::{Filter, Kernel, KernelFilter};
use crate::image::{BgrImage, GrayImage};

/// Default median blur aperture.
pub const DEFAULT_BLUR_KSIZE: u32 = 7;
/// Default Laplacian aperture.
pub const DEFAULT_EDGE_KSIZE: u32 = 5;
/// Largest supported Laplacian aperture.
const MAX_EDGE_KSIZE: u32 = 31;

/// Edge stroking as a reusable [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeStroke {
    /// Median blur aperture. Below 3 disables blurring.
    pub blur_ksize: u32,
    /// Laplacian aperture: 1 or an odd size up to 31.
    pub edge_ksize: u32,
}

impl Default for EdgeStroke {
    fn default() -> Self {
        Self {
            blur_ksize: DEFAULT_BLUR_KSIZE,
            edge_ksize: DEFAULT_EDGE_KSIZE,
        }
    }
}

impl Filter for EdgeStroke {
    fn apply(&self, src: &BgrImage) -> Result<BgrImage, FilterError> {
        stroke_edges(src, self.blur_ksize, self.edge_ksize)
    }
}

/// Darken `src` along its edges. See the module docs for the steps.
pub fn stroke_edges(src: &BgrImage, blur_ksize: u32, edge_ksize: u32) -> Result<BgrImage, FilterError> {
    src.check_size()?;
    let gray = if blur_ksize >= 3 {
        median_blur(src, blur_ksize)?.to_gray()
    } else {
        src.to_gray()
    };
    let edges = laplacian(&gray, edge_ksize)?;

    let alpha: Vec<f64> = edges.pixels.iter().map(|&edge| (1.0 / 255.0) * (255 - edge) as f64).collect();
    let mut planes = src.split();
    for plane in &mut planes {
        for (value, a) in plane.pixels.iter_mut().zip(&alpha) {
            *value = (*value as f64 * a) as u8;
        }
    }
    BgrImage::merge(&planes)
}

/// Median of each `ksize × ksize` neighbourhood, per channel, with
/// replicated borders. `ksize` must be odd; 1 returns a copy.
pub fn median_blur(src: &BgrImage, ksize: u32) -> Result<BgrImage, FilterError> {
    if ksize == 0 || ksize % 2 == 0 {
        return Err(FilterError::InvalidKernelSize { name: "median", size: ksize });
    }
    src.check_size()?;
    if ksize == 1 || src.pixels.is_empty() {
        return Ok(src.clone());
    }

    let (w, h) = (src.width as usize, src.height as usize);
    let radius = (ksize / 2) as isize;
    let mut window: [Vec<u8>; 3] = Default::default();
    let mut pixels = Vec::with_capacity(src.pixels.len());

    for y in 0..h as isize {
        for x in 0..w as isize {
            window.iter_mut().for_each(Vec::clear);
            for dy in -radius..=radius {
                let sy = map_index(y + dy, h, BorderMode::Replicate);
                for dx in -radius..=radius {
                    let sx = map_index(x + dx, w, BorderMode::Replicate);
                    let px = src.pixels[sy * w + sx];
                    for (values, v) in window.iter_mut().zip(px) {
                        values.push(v);
                    }
                }
            }
            let mid = window[0].len() / 2;
            pixels.push(std::array::from_fn(|c| *window[c].select_nth_unstable(mid).1));
        }
    }
    BgrImage::from_pixels(src.width, src.height, pixels)
}

/// Second-derivative edge response `d²/dx² + d²/dy²`, saturated to `u8`.
///
/// `ksize` 1 uses the 4-neighbour 3×3 kernel; odd sizes 3..=31 use separable
/// Sobel derivative and smoothing kernels.
pub fn laplacian(src: &GrayImage, ksize: u32) -> Result<GrayImage, FilterError> {
    KernelFilter::new(laplacian_kernel(ksize)?).apply_gray(src)
}

fn laplacian_kernel(ksize: u32) -> Result<Kernel, FilterError> {
    if ksize == 1 {
        let rows: [&[f64]; 3] = [&[0.0, 1.0, 0.0], &[1.0, -4.0, 1.0], &[0.0, 1.0, 0.0]];
        return Kernel::new(&rows);
    }
    if ksize % 2 == 0 || !(3..=MAX_EDGE_KSIZE).contains(&ksize) {
        return Err(FilterError::InvalidKernelSize { name: "laplacian", size: ksize });
    }

    let size = ksize as usize;
    let second = sobel_coefficients(2, size);
    let smooth = sobel_coefficients(0, size);
    Ok(Kernel::outer(&smooth, &second).plus(&Kernel::outer(&second, &smooth)))
}

/// 1-D Sobel coefficients of derivative `order` and length `size`: binomial
/// smoothing convolved `order` times with `[-1, 1]`.
fn sobel_coefficients(order: usize, size: usize) -> Vec<f64> {
    let mut coeffs = vec![1.0];
    for _ in 0..size - order - 1 {
        coeffs = convolve(&coeffs, &[1.0, 1.0]);
    }
    for _ in 0..order {
        coeffs = convolve(&coeffs, &[-1.0, 1.0]);
    }
    coeffs
}

fn convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_on_gray(size: u32) -> BgrImage {
        let mut image = BgrImage::filled(size, size, [90, 90, 90]);
        let (lo, hi) = (size / 3, 2 * size / 3);
        for y in lo..hi {
            for x in lo..hi {
                image.pixels[(y * size + x) as usize] = [220, 200, 180];
            }
        }
        image
    }

    #[test]
    fn test_sobel_coefficients() {
        assert_eq!(sobel_coefficients(0, 3), vec![1.0, 2.0, 1.0]);
        assert_eq!(sobel_coefficients(2, 3), vec![1.0, -2.0, 1.0]);
        assert_eq!(sobel_coefficients(0, 5), vec![1.0, 4.0, 6.0, 4.0, 1.0]);
        assert_eq!(sobel_coefficients(2, 5), vec![1.0, 0.0, -2.0, 0.0, 1.0]);
    }

    #[test]
    fn test_laplacian_kernels_sum_to_zero() {
        for ksize in [1, 3, 5, 7] {
            assert_eq!(laplacian_kernel(ksize).expect("valid").sum(), 0.0, "ksize {ksize}");
        }
        assert_eq!(laplacian_kernel(3).expect("valid").weight(1, 1), -8.0);
    }

    #[test]
    fn test_invalid_sizes_are_rejected() {
        assert!(laplacian_kernel(4).is_err());
        assert!(laplacian_kernel(33).is_err());
        let image = BgrImage::filled(4, 4, [0, 0, 0]);
        assert!(median_blur(&image, 4).is_err());
        assert!(stroke_edges(&image, 6, 5).is_err());
        assert!(stroke_edges(&image, 7, 2).is_err());
    }

    #[test]
    fn test_mismatched_buffer_is_rejected() {
        let mut image = square_on_gray(6);
        image.pixels.truncate(30);
        assert!(matches!(stroke_edges(&image, 7, 5), Err(FilterError::SizeMismatch { actual: 30, .. })));
        assert!(matches!(median_blur(&image, 3), Err(FilterError::SizeMismatch { .. })));
        assert!(matches!(EdgeStroke::default().apply(&image), Err(FilterError::SizeMismatch { .. })));
    }

    #[test]
    fn test_median_removes_salt_noise() {
        let mut image = BgrImage::filled(5, 5, [50, 60, 70]);
        image.pixels[12] = [255, 255, 255];
        let out = median_blur(&image, 3).expect("blur");
        assert_eq!(out.pixel(2, 2), [50, 60, 70]);
    }

    #[test]
    fn test_flat_frame_passes_through() {
        let flat = BgrImage::filled(9, 9, [17, 128, 240]);
        assert_eq!(stroke_edges(&flat, 7, 5).expect("stroke"), flat);
        assert_eq!(stroke_edges(&flat, 0, 1).expect("stroke"), flat);
    }

    #[test]
    fn test_edges_are_darkened() {
        let image = square_on_gray(15);
        let out = stroke_edges(&image, 1, 3).expect("stroke");
        // Interior of the gray surround stays as is.
        assert_eq!(out.pixel(0, 0), image.pixel(0, 0));
        // Just outside the bright square the Laplacian is large.
        let [b, g, r] = out.pixel(4, 7);
        let [sb, sg, sr] = image.pixel(4, 7);
        assert!(b < sb && g < sg && r < sr);
    }

    #[test]
    fn test_small_blur_size_skips_blurring() {
        let image = square_on_gray(12);
        let expected_edges = laplacian(&image.to_gray(), 5).expect("laplacian");
        let out = stroke_edges(&image, 2, 5).expect("stroke");
        for (i, (px, edge)) in image.pixels.iter().zip(&expected_edges.pixels).enumerate() {
            let alpha = (1.0 / 255.0) * (255 - *edge) as f64;
            assert_eq!(out.pixels[i], px.map(|c| (c as f64 * alpha) as u8));
        }

        let mut salted = image.clone();
        salted.pixels[13] = [255, 255, 255];
        assert_ne!(stroke_edges(&salted, 1, 5).expect("stroke"), stroke_edges(&salted, 3, 5).expect("stroke"));
    }

    #[test]
    fn test_edge_stroke_filter_defaults() {
        let stroke = EdgeStroke::default();
        assert_eq!((stroke.blur_ksize, stroke.edge_ksize), (7, 5));
        let image = square_on_gray(10);
        assert_eq!(stroke.apply(&image).expect("filter"), stroke_edges(&image, 7, 5).expect("stroke"));
    }
}
