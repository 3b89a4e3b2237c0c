//! Pixel buffers flowing through the capture and filter pipeline.
//!
//! Color frames are always 8-bit, three channels, row-major, in blue-green-red
//! order. Grayscale intermediates are single-channel 8-bit.

use ::image::{Rgb, RgbImage};

use crate::error::FilterError;

/// Rec. 601 luma weights for BGR → gray in 14-bit fixed point.
const GRAY_B: u32 = 1868;
const GRAY_G: u32 = 9617;
const GRAY_R: u32 = 4899;
const GRAY_SHIFT: u32 = 14;

/// Three-channel 8-bit frame in BGR order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgrImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data, `[b, g, r]` per pixel, row-major.
    pub pixels: Vec<[u8; 3]>,
}

/// Single-channel 8-bit image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data, row-major.
    pub pixels: Vec<u8>,
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

fn check_len(width: u32, height: u32, actual: usize) -> Result<(), FilterError> {
    if actual != pixel_count(width, height) {
        return Err(FilterError::SizeMismatch { width, height, actual });
    }
    Ok(())
}

impl BgrImage {
    /// Create a frame with every pixel set to `value`.
    pub fn filled(width: u32, height: u32, value: [u8; 3]) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; pixel_count(width, height)],
        }
    }

    /// Wrap existing pixel data, checking that it covers `width × height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[u8; 3]>) -> Result<Self, FilterError> {
        check_len(width, height, pixels.len())?;
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Check that the pixel data covers `width × height`.
    pub fn check_size(&self) -> Result<(), FilterError> {
        check_len(self.width, self.height, self.pixels.len())
    }

    /// Interleaved `b, g, r, b, g, r, ...` bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Left-right mirror of this frame.
    pub fn mirrored(&self) -> Self {
        let width = self.width as usize;
        let pixels = if width == 0 {
            Vec::new()
        } else {
            self.pixels
                .chunks_exact(width)
                .flat_map(|row| row.iter().rev().copied())
                .collect()
        };
        Self {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    /// Split into blue, green and red planes.
    pub fn split(&self) -> [GrayImage; 3] {
        std::array::from_fn(|c| GrayImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|px| px[c]).collect(),
        })
    }

    /// Merge blue, green and red planes of identical size.
    pub fn merge(planes: &[GrayImage; 3]) -> Result<Self, FilterError> {
        let [b, g, r] = planes;
        let (width, height) = (b.width, b.height);
        for plane in planes {
            if (plane.width, plane.height) != (width, height) {
                return Err(FilterError::SizeMismatch {
                    width,
                    height,
                    actual: pixel_count(plane.width, plane.height),
                });
            }
            plane.check_size()?;
        }

        let pixels = b
            .pixels
            .iter()
            .zip(&g.pixels)
            .zip(&r.pixels)
            .map(|((&b, &g), &r)| [b, g, r])
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Convert to grayscale with Rec. 601 weights, rounded like the usual
    /// fixed-point BGR → gray path.
    pub fn to_gray(&self) -> GrayImage {
        let pixels = self
            .pixels
            .iter()
            .map(|&[b, g, r]| {
                let y = b as u32 * GRAY_B + g as u32 * GRAY_G + r as u32 * GRAY_R;
                ((y + (1 << (GRAY_SHIFT - 1))) >> GRAY_SHIFT) as u8
            })
            .collect();
        GrayImage {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    /// Convert to an RGB image for encoding.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let [b, g, r] = self.pixel(x, y);
            Rgb([r, g, b])
        })
    }
}

impl From<&RgbImage> for BgrImage {
    fn from(rgb: &RgbImage) -> Self {
        let (width, height) = rgb.dimensions();
        let pixels = rgb.pixels().map(|p| [p.0[2], p.0[1], p.0[0]]).collect();
        Self {
            width,
            height,
            pixels,
        }
    }
}

impl GrayImage {
    /// Create a gray image with every pixel set to `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; pixel_count(width, height)],
        }
    }

    /// Check that the pixel data covers `width × height`.
    pub fn check_size(&self) -> Result<(), FilterError> {
        check_len(self.width, self.height, self.pixels.len())
    }

    /// Pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> BgrImage {
        let mut pixels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push([x as u8, y as u8, (x + y) as u8]);
            }
        }
        BgrImage::from_pixels(width, height, pixels).expect("valid size")
    }

    #[test]
    fn test_from_pixels_rejects_wrong_length() {
        let result = BgrImage::from_pixels(2, 2, vec![[0; 3]; 3]);
        assert!(matches!(result, Err(FilterError::SizeMismatch { actual: 3, .. })));
    }

    #[test]
    fn test_check_size_catches_edited_buffers() {
        let mut image = gradient(3, 2);
        assert!(image.check_size().is_ok());
        image.pixels.pop();
        assert!(matches!(image.check_size(), Err(FilterError::SizeMismatch { actual: 5, .. })));

        let mut gray = GrayImage::filled(2, 2, 0);
        gray.width = 3;
        assert!(gray.check_size().is_err());
        let planes = [GrayImage::filled(2, 2, 0), gray, GrayImage::filled(2, 2, 0)];
        assert!(BgrImage::merge(&planes).is_err());
    }

    #[test]
    fn test_mirrored_reverses_each_row() {
        let image = gradient(3, 2);
        let mirrored = image.mirrored();
        assert_eq!(mirrored.pixel(0, 0), image.pixel(2, 0));
        assert_eq!(mirrored.pixel(2, 1), image.pixel(0, 1));
        assert_eq!(mirrored.mirrored(), image);
    }

    #[test]
    fn test_split_then_merge_is_lossless() {
        let image = gradient(4, 3);
        let planes = image.split();
        assert_eq!(planes[2].pixel(3, 2), 5);
        assert_eq!(BgrImage::merge(&planes).expect("same size"), image);
    }

    #[test]
    fn test_gray_of_neutral_pixel_is_unchanged() {
        let image = BgrImage::filled(2, 2, [128, 128, 128]);
        assert!(image.to_gray().pixels.iter().all(|&v| v == 128));

        let white = BgrImage::filled(1, 1, [255, 255, 255]);
        assert_eq!(white.to_gray().pixels, vec![255]);
    }

    #[test]
    fn test_gray_weights_green_heaviest() {
        let blue = BgrImage::filled(1, 1, [255, 0, 0]).to_gray().pixels[0];
        let green = BgrImage::filled(1, 1, [0, 255, 0]).to_gray().pixels[0];
        let red = BgrImage::filled(1, 1, [0, 0, 255]).to_gray().pixels[0];
        assert_eq!((blue, green, red), (29, 150, 76));
    }

    #[test]
    fn test_rgb_conversion_swaps_channel_order() {
        let image = BgrImage::filled(1, 1, [10, 20, 30]);
        let rgb = image.to_rgb_image();
        assert_eq!(rgb.get_pixel(0, 0).0, [30, 20, 10]);
        assert_eq!(BgrImage::from(&rgb), image);
    }
}
