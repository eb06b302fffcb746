pub mod detection;
pub mod models;
pub mod params;
pub mod error;
pub mod io;
pub mod debug;

pub use models::{
    Blob, BoundingBox, Center, DetectedShape, DetectionResult, PixelBuffer, Point, ShapeKind,
};
pub use detection::DetectionPipeline;
pub use detection::corners::{CornerEstimator, StrideCornerEstimator};
pub use error::DetectError;
pub use params::DetectionParams;
pub use debug::DebugConfig;
