mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from shapedetect for tests
pub use shapedetect::{
    BoundingBox, DetectedShape, DetectionPipeline, DetectionResult, PixelBuffer, Point, ShapeKind,
};
