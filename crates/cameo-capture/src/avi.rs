//! Motion-JPEG in an AVI 1.0 container.
//!
//! The file layout is fixed-size headers, a `movi` list of `00dc` JPEG
//! chunks and a trailing `idx1` index. Headers are written with zero totals
//! when the stream opens and rewritten on [`MjpegAviEncoder::close`].

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use cameo_core::BgrImage;
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, info};

use crate::error::CaptureError;
use crate::fourcc::FourCc;
use crate::output::{EncoderFactory, VideoEncoder};

const AVIF_HASINDEX: u32 = 0x10;
const AVIIF_KEYFRAME: u32 = 0x10;
const RATE_SCALE: u32 = 1000;
/// RIFF header, `hdrl` list and the `movi` list header.
const HEADER_LEN: usize = 224;
const DEFAULT_QUALITY: u8 = 90;

/// Writes BGR frames as JPEG chunks into an AVI stream.
#[derive(Debug)]
pub struct MjpegAviEncoder<W: Write + Seek> {
    out: W,
    fps: f64,
    width: u32,
    height: u32,
    quality: u8,
    /// `(offset from 'movi', payload length)` per frame.
    index: Vec<(u32, u32)>,
    movi_len: u32,
    largest_chunk: u32,
}

impl<W: Write + Seek> MjpegAviEncoder<W> {
    /// Start a stream at `fps` frames per second with fixed `(width, height)`.
    pub fn new(mut out: W, fps: f64, frame_size: (u32, u32), quality: u8) -> Result<Self, CaptureError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(CaptureError::Encoder(format!("invalid frame rate {fps}")));
        }
        let (width, height) = frame_size;
        if width == 0 || height == 0 || width > u16::MAX as u32 || height > u16::MAX as u32 {
            return Err(CaptureError::Encoder(format!("invalid frame size {width}x{height}")));
        }
        out.seek(SeekFrom::Start(0))?;
        let mut encoder = Self {
            out,
            fps,
            width,
            height,
            quality: quality.clamp(1, 100),
            index: Vec::new(),
            movi_len: 0,
            largest_chunk: 0,
        };
        let header = encoder.header()?;
        encoder.out.write_all(&header)?;
        Ok(encoder)
    }

    /// Frames appended so far.
    pub fn frame_count(&self) -> usize {
        self.index.len()
    }

    /// Write the index, patch the headers and return the underlying writer.
    pub fn close(mut self) -> Result<W, CaptureError> {
        let header = self.header()?;
        let mut idx = Vec::with_capacity(8 + 16 * self.index.len());
        idx.extend_from_slice(b"idx1");
        put_u32(&mut idx, to_u32(16 * self.index.len())?);
        for &(offset, len) in &self.index {
            idx.extend_from_slice(b"00dc");
            put_u32(&mut idx, AVIIF_KEYFRAME);
            put_u32(&mut idx, offset);
            put_u32(&mut idx, len);
        }
        self.out.write_all(&idx)?;

        self.out.seek(SeekFrom::Start(0))?;
        self.out.write_all(&header)?;
        self.out.seek(SeekFrom::End(0))?;
        self.out.flush()?;
        info!(frames = self.index.len(), fps = self.fps, "closed MJPEG stream");
        Ok(self.out)
    }

    fn header(&self) -> Result<Vec<u8>, CaptureError> {
        let frames = to_u32(self.index.len())?;
        let riff_len = checked_u32(riff_len(self.movi_len as u64, frames as u64))?;
        let movi_list_len = checked_u32(4 + self.movi_len as u64)?;
        let micros_per_frame = (1_000_000.0 / self.fps).round() as u32;
        let rate = (self.fps * RATE_SCALE as f64).round() as u32;
        let buffer = self.largest_chunk.max(self.width.saturating_mul(self.height).saturating_mul(3));

        let mut h = Vec::with_capacity(HEADER_LEN);
        h.extend_from_slice(b"RIFF");
        put_u32(&mut h, riff_len);
        h.extend_from_slice(b"AVI ");

        h.extend_from_slice(b"LIST");
        put_u32(&mut h, 192);
        h.extend_from_slice(b"hdrl");

        h.extend_from_slice(b"avih");
        put_u32(&mut h, 56);
        put_u32(&mut h, micros_per_frame);
        put_u32(&mut h, (self.largest_chunk as f64 * self.fps).round() as u32);
        put_u32(&mut h, 0);
        put_u32(&mut h, AVIF_HASINDEX);
        put_u32(&mut h, frames);
        put_u32(&mut h, 0);
        put_u32(&mut h, 1);
        put_u32(&mut h, buffer);
        put_u32(&mut h, self.width);
        put_u32(&mut h, self.height);
        h.extend_from_slice(&[0; 16]);

        h.extend_from_slice(b"LIST");
        put_u32(&mut h, 116);
        h.extend_from_slice(b"strl");

        h.extend_from_slice(b"strh");
        put_u32(&mut h, 56);
        h.extend_from_slice(b"vids");
        h.extend_from_slice(&FourCc::MJPG.bytes());
        put_u32(&mut h, 0);
        put_u16(&mut h, 0);
        put_u16(&mut h, 0);
        put_u32(&mut h, 0);
        put_u32(&mut h, RATE_SCALE);
        put_u32(&mut h, rate);
        put_u32(&mut h, 0);
        put_u32(&mut h, frames);
        put_u32(&mut h, buffer);
        put_u32(&mut h, u32::MAX);
        put_u32(&mut h, 0);
        put_u16(&mut h, 0);
        put_u16(&mut h, 0);
        put_u16(&mut h, self.width as u16);
        put_u16(&mut h, self.height as u16);

        h.extend_from_slice(b"strf");
        put_u32(&mut h, 40);
        put_u32(&mut h, 40);
        put_u32(&mut h, self.width);
        put_u32(&mut h, self.height);
        put_u16(&mut h, 1);
        put_u16(&mut h, 24);
        h.extend_from_slice(&FourCc::MJPG.bytes());
        put_u32(&mut h, self.width.saturating_mul(self.height).saturating_mul(3));
        h.extend_from_slice(&[0; 16]);

        h.extend_from_slice(b"LIST");
        put_u32(&mut h, movi_list_len);
        h.extend_from_slice(b"movi");

        debug_assert_eq!(h.len(), HEADER_LEN);
        Ok(h)
    }
}

impl<W: Write + Seek> VideoEncoder for MjpegAviEncoder<W> {
    fn write(&mut self, frame: &BgrImage) -> Result<(), CaptureError> {
        let actual = frame.dimensions();
        if actual != (self.width, self.height) {
            return Err(CaptureError::FrameSizeMismatch {
                expected: (self.width, self.height),
                actual,
            });
        }

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.quality)
            .encode_image(&frame.to_rgb_image())
            .map_err(|e| CaptureError::Encoder(e.to_string()))?;
        let len = to_u32(jpeg.len())?;
        let padded = len as u64 + (len & 1) as u64;
        let movi_len = self.movi_len as u64 + 8 + padded;
        if riff_len(movi_len, self.index.len() as u64 + 1) > u32::MAX as u64 {
            return Err(CaptureError::Encoder("stream would exceed 4 GiB".to_string()));
        }

        let mut chunk = Vec::with_capacity(8 + jpeg.len() + 1);
        chunk.extend_from_slice(b"00dc");
        put_u32(&mut chunk, len);
        chunk.extend_from_slice(&jpeg);
        if len & 1 == 1 {
            chunk.push(0);
        }
        self.out.write_all(&chunk)?;

        self.index.push((4 + self.movi_len, len));
        self.movi_len = checked_u32(movi_len)?;
        self.largest_chunk = self.largest_chunk.max(len);
        debug!(frame = self.index.len(), bytes = len, "appended MJPEG frame");
        Ok(())
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn finish(self: Box<Self>) -> Result<(), CaptureError> {
        (*self).close().map(drop)
    }
}

/// Opens [`MjpegAviEncoder`]s on files. Only `MJPG` is supported.
#[derive(Debug, Clone, Copy)]
pub struct MjpegAviFactory {
    pub quality: u8,
}

impl Default for MjpegAviFactory {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

impl EncoderFactory for MjpegAviFactory {
    fn open(
        &mut self,
        path: &Path,
        fourcc: FourCc,
        fps: f64,
        frame_size: (u32, u32),
    ) -> Result<Box<dyn VideoEncoder>, CaptureError> {
        if fourcc != FourCc::MJPG {
            return Err(CaptureError::UnsupportedCodec(fourcc));
        }
        let file = BufWriter::new(File::create(path)?);
        let encoder = MjpegAviEncoder::new(file, fps, frame_size, self.quality)?;
        info!(path = %path.display(), fps, width = frame_size.0, height = frame_size.1, "opened MJPEG stream");
        Ok(Box::new(encoder))
    }
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// RIFF payload length for `movi_len` bytes of chunks and `frames` index entries.
fn riff_len(movi_len: u64, frames: u64) -> u64 {
    (HEADER_LEN as u64 - 8) + movi_len + 8 + 16 * frames
}

fn checked_u32(len: u64) -> Result<u32, CaptureError> {
    u32::try_from(len).map_err(|_| CaptureError::Encoder(format!("stream length {len} exceeds 4 GiB")))
}

fn to_u32(len: usize) -> Result<u32, CaptureError> {
    u32::try_from(len).map_err(|_| CaptureError::Encoder(format!("chunk of {len} bytes is too large")))
}
