use image::{GrayImage, Luma};

use crate::models::PixelBuffer;

/// BT.601 luma weights. Circularity thresholds are tuned against these.
pub const LUMA_R: f64 = 0.299;
pub const LUMA_G: f64 = 0.587;
pub const LUMA_B: f64 = 0.114;

/// Per-pixel luminance on a 0-255 scale, index `y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct LuminanceBuffer {
    width: u32,
    height: u32,
    values: Vec<f64>,
}

impl LuminanceBuffer {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.values[y as usize * self.width as usize + x as usize])
    }

    /// Rounded 8-bit rendering, for debug output.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let v = self.values[y as usize * self.width as usize + x as usize];
            Luma([v.round().clamp(0.0, 255.0) as u8])
        })
    }
}

/// Foreground/background mask derived from a luminance buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryBitmap {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl BinaryBitmap {
    /// Build a bitmap from a predicate; mostly useful for tests and tools.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self { width, height, bits }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Signed lookup for neighbour checks; out-of-bounds reads as background.
    pub fn is_foreground_i(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.bits[y as usize * self.width as usize + x as usize]
    }

    pub fn count_foreground(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Foreground as white (255), background as black (0).
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.is_foreground(x, y) { Luma([255u8]) } else { Luma([0u8]) }
        })
    }
}

/// Convert RGBA to luminance. Alpha is ignored.
pub fn to_luminance(img: &PixelBuffer) -> LuminanceBuffer {
    let values = img
        .as_raw()
        .chunks_exact(4)
        .map(|px| LUMA_R * px[0] as f64 + LUMA_G * px[1] as f64 + LUMA_B * px[2] as f64)
        .collect();

    LuminanceBuffer {
        width: img.width(),
        height: img.height(),
        values,
    }
}

/// Fixed-threshold binarization: foreground iff `luminance > threshold`.
pub fn binarize(luma: &LuminanceBuffer, threshold: f64) -> BinaryBitmap {
    BinaryBitmap {
        width: luma.width,
        height: luma.height,
        bits: luma.values.iter().map(|&v| v > threshold).collect(),
    }
}
