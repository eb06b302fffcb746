use std::f64::consts::PI;

use crate::detection::blobs::NEIGHBOURS_8;
use crate::detection::corners::CornerEstimator;
use crate::detection::preprocessing::BinaryBitmap;
use crate::models::{Blob, BoundingBox, Center, DetectedShape, ShapeKind};
use crate::params::DetectionParams;

pub const BOX_CONFIDENCE: f64 = 0.7;
pub const POLYGON_CONFIDENCE: f64 = 0.6;
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Geometric measurements of one blob
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDescriptors {
    pub bounding_box: BoundingBox,
    pub center: Center,
    pub area: u32,
    /// Number of blob pixels touching background or the image edge.
    pub border: u32,
    pub circularity: f64,
    pub aspect_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub kind: ShapeKind,
    pub confidence: f64,
    /// Only set when the corner estimator was consulted.
    pub corners: Option<u32>,
}

/// Count blob pixels with at least one background or out-of-bounds neighbour.
pub fn count_border_pixels(blob: &Blob, bitmap: &BinaryBitmap) -> u32 {
    blob.pixels()
        .iter()
        .filter(|p| {
            NEIGHBOURS_8
                .iter()
                .any(|(dx, dy)| !bitmap.is_foreground_i(p.x as i64 + dx, p.y as i64 + dy))
        })
        .count() as u32
}

/// `4*pi*area / (border^2 + epsilon)`; unbounded above.
pub fn circularity(area: u32, border: u32, epsilon: f64) -> f64 {
    let border = border as f64;
    4.0 * PI * area as f64 / (border * border + epsilon)
}

pub fn describe(blob: &Blob, bitmap: &BinaryBitmap, epsilon: f64) -> ShapeDescriptors {
    let border = count_border_pixels(blob, bitmap);
    let area = blob.area();

    ShapeDescriptors {
        bounding_box: blob.bounding_box(),
        center: blob.center(),
        area,
        border,
        circularity: circularity(area, border, epsilon),
        aspect_ratio: blob.aspect_ratio(),
    }
}

/// Decision tree, first match wins:
/// circle by circularity, then square / rectangle by aspect ratio, then
/// triangle / pentagon / star by corner count, else a low-confidence
/// rectangle.
pub fn decide(
    desc: &ShapeDescriptors,
    blob: &Blob,
    params: &DetectionParams,
    corners: &dyn CornerEstimator,
) -> Classification {
    if desc.circularity > params.circle_threshold {
        return Classification {
            kind: ShapeKind::Circle,
            confidence: desc.circularity,
            corners: None,
        };
    }

    if desc.aspect_ratio < params.square_max_ratio {
        return Classification {
            kind: ShapeKind::Square,
            confidence: BOX_CONFIDENCE,
            corners: None,
        };
    }

    if desc.aspect_ratio < params.rectangle_max_ratio {
        return Classification {
            kind: ShapeKind::Rectangle,
            confidence: BOX_CONFIDENCE,
            corners: None,
        };
    }

    let count = corners.count_corners(blob, desc.border);
    let (kind, confidence) = match count {
        0..=3 => (ShapeKind::Triangle, POLYGON_CONFIDENCE),
        5 => (ShapeKind::Pentagon, POLYGON_CONFIDENCE),
        c if c >= 7 => (ShapeKind::Star, POLYGON_CONFIDENCE),
        _ => (ShapeKind::Rectangle, FALLBACK_CONFIDENCE),
    };

    Classification {
        kind,
        confidence,
        corners: Some(count),
    }
}

pub fn classify(
    blob: &Blob,
    bitmap: &BinaryBitmap,
    params: &DetectionParams,
    corners: &dyn CornerEstimator,
) -> DetectedShape {
    let desc = describe(blob, bitmap, params.circularity_epsilon);
    let class = decide(&desc, blob, params, corners);

    log::trace!(
        "blob at ({}, {}) {}x{}: area={}, border={}, circ={:.3}, ratio={:.2}, corners={:?} -> {} ({:.2})",
        desc.bounding_box.x,
        desc.bounding_box.y,
        desc.bounding_box.width,
        desc.bounding_box.height,
        desc.area,
        desc.border,
        desc.circularity,
        desc.aspect_ratio,
        class.corners,
        class.kind,
        class.confidence
    );

    DetectedShape {
        kind: class.kind,
        confidence: class.confidence,
        bounding_box: desc.bounding_box,
        center: desc.center,
        area: desc.area,
    }
}
