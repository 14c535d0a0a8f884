//! Frame data structures for camera content

use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};

use ticketscan_core::CaptureError;

/// A single camera frame, stored as RGBA.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbaImage,
    /// When the frame was grabbed from the device
    pub timestamp: Instant,
}

impl Frame {
    /// Wrap raw RGBA bytes. Fails if the buffer does not match the dimensions.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Result<Self, CaptureError> {
        let len = data.len();
        let image = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
            CaptureError::InvalidFrame(format!("{len} bytes is not a {width}x{height} RGBA buffer"))
        })?;
        Ok(Self::from_buffer(image))
    }

    pub fn from_buffer(image: RgbaImage) -> Self {
        Self {
            image,
            timestamp: Instant::now(),
        }
    }

    pub fn from_image(image: &DynamicImage) -> Self {
        Self::from_buffer(image.to_rgba8())
    }

    /// Decode an image file into a frame.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| CaptureError::InvalidFrame(format!("{}: {e}", path.display())))?;
        Ok(Self::from_image(&image))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Raw RGBA bytes in row-major order
    pub fn data(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Resample to a fixed analysis size, ignoring aspect ratio the way a
    /// canvas `drawImage` into a fixed-size target does.
    pub fn downscale(&self, width: u32, height: u32) -> RgbaImage {
        if self.dimensions() == (width, height) {
            return self.image.clone();
        }
        imageops::resize(&self.image, width, height, FilterType::Triangle)
    }

    /// Encode as PNG for upload.
    pub fn encode_png(&self) -> Result<Vec<u8>, CaptureError> {
        let mut out = Cursor::new(Vec::new());
        self.image
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| CaptureError::InvalidFrame(format!("PNG encoding failed: {e}")))?;
        Ok(out.into_inner())
    }
}

#[cfg(test)]
pub(crate) mod test_frames {
    use super::*;

    pub const W: u32 = 640;
    pub const H: u32 = 480;

    /// Uniform frame of one grey level.
    pub fn solid(level: u8) -> Frame {
        let data = [level, level, level, 255].repeat((W * H) as usize);
        Frame::from_rgba(data, W, H).unwrap()
    }

    /// Every sampled pixel alternates black/white, which maxes out both
    /// the contrast and the edge statistics.
    pub fn striped() -> Frame {
        let mut data = Vec::with_capacity((W * H * 4) as usize);
        for i in 0..(W * H) as usize {
            let v = if (i / 4) % 2 == 0 { 0 } else { 255 };
            data.extend_from_slice(&[v, v, v, 255]);
        }
        Frame::from_rgba(data, W, H).unwrap()
    }
}
