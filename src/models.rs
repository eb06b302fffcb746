use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DetectError;

/// Decoded RGBA input image, validated on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes (row-major, 4 bytes per pixel).
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, DetectError> {
        if width == 0 || height == 0 {
            return Err(DetectError::EmptyImage { width, height });
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(DetectError::SizeMismatch {
                width,
                height,
                expected: usize::MAX,
                actual: data.len(),
            })?;

        if data.len() != expected {
            return Err(DetectError::SizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self { width, height, data })
    }

    pub fn from_rgba_image(img: &RgbaImage) -> Result<Self, DetectError> {
        Self::new(img.width(), img.height(), img.as_raw().clone())
    }

    /// Convert any decoded image, expanding missing channels to RGBA.
    pub fn from_image(img: &DynamicImage) -> Result<Self, DetectError> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new(width, height, rgba.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// RGBA quadruple at `(x, y)`, or `None` outside the image.
    pub fn rgba(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// One 8-connected foreground region, pixels in discovery order.
///
/// Never empty; the bounds are tracked while pixels are collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pixels: Vec<Point>,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Blob {
    /// Build a blob from an ordered pixel list. Returns `None` when empty.
    pub fn from_pixels(pixels: Vec<Point>) -> Option<Self> {
        let first = *pixels.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &pixels[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            pixels,
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    pub fn pixels(&self) -> &[Point] {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Raw pixel count.
    pub fn area(&self) -> u32 {
        self.pixels.len() as u32
    }

    /// Midpoint of the bounding box; may land on a half pixel.
    pub fn center(&self) -> Center {
        Center {
            x: (self.min_x as f64 + self.max_x as f64) / 2.0,
            y: (self.min_y as f64 + self.max_y as f64) / 2.0,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            x: self.min_x,
            y: self.min_y,
            width: self.width(),
            height: self.height(),
        }
    }

    /// Long side over short side of the bounding box, always >= 1.
    pub fn aspect_ratio(&self) -> f64 {
        let w = self.width() as f64;
        let h = self.height() as f64;
        w.max(h) / w.min(h)
    }
}

/// Bounding box in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn max_x(&self) -> u32 {
        self.x + self.width - 1
    }

    pub fn max_y(&self) -> u32 {
        self.y + self.height - 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Center {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Square,
    Rectangle,
    Triangle,
    Pentagon,
    Star,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Square => "square",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Pentagon => "pentagon",
            ShapeKind::Star => "star",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified blob.
///
/// `confidence` is the circularity score for circles and is not clamped,
/// so it can exceed 1.0 for compact blobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedShape {
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub confidence: f64,
    pub bounding_box: BoundingBox,
    pub center: Center,
    pub area: u32,
}

/// Output of one pipeline invocation. Shapes are in blob discovery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub shapes: Vec<DetectedShape>,
    pub processing_time_ms: f64,
    pub image_width: u32,
    pub image_height: u32,
}

impl DetectionResult {
    pub fn count_of(&self, kind: ShapeKind) -> usize {
        self.shapes.iter().filter(|s| s.kind == kind).count()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
