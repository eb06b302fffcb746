pub mod preprocessing;
pub mod blobs;
pub mod corners;
pub mod classify;

use anyhow::Context;
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::debug::{self, DebugConfig};
use crate::models::{Blob, DetectedShape, DetectionResult, PixelBuffer};
use crate::params::DetectionParams;
use blobs::Blobs;
use corners::{CornerEstimator, StrideCornerEstimator};
use preprocessing::{BinaryBitmap, LuminanceBuffer};

/// Main detection pipeline orchestrator
///
/// Runs grayscale conversion, binarization, blob extraction and
/// classification over one image. Holds no per-image state, so one
/// instance can serve many images concurrently.
#[derive(Clone)]
pub struct DetectionPipeline {
    params: DetectionParams,
    corner_estimator: Arc<dyn CornerEstimator>,
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

impl DetectionPipeline {
    pub fn new() -> Self {
        let params = DetectionParams::default();
        let corner_estimator = Arc::new(StrideCornerEstimator::new(
            params.corner_stride_divisor,
            params.corner_angle_threshold,
        ));
        Self {
            params,
            corner_estimator,
            verbose: false,
            debug: None,
        }
    }

    /// Replace the parameters after validating them. The corner estimator
    /// is rebuilt from them, replacing any custom one installed earlier.
    pub fn with_params(mut self, params: DetectionParams) -> anyhow::Result<Self> {
        params.validate()?;
        self.corner_estimator = Arc::new(StrideCornerEstimator::new(
            params.corner_stride_divisor,
            params.corner_angle_threshold,
        ));
        self.params = params;
        Ok(self)
    }

    pub fn with_corner_estimator(mut self, estimator: Arc<dyn CornerEstimator>) -> Self {
        self.corner_estimator = estimator;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> anyhow::Result<Self> {
        self.debug = Some(DebugConfig::prepare(output_dir)?);
        Ok(self)
    }

    pub fn params(&self) -> &DetectionParams {
        &self.params
    }

    pub fn corner_estimator(&self) -> &dyn CornerEstimator {
        self.corner_estimator.as_ref()
    }

    /// Run the full detection pass over a validated buffer.
    pub fn detect(&self, img: &PixelBuffer) -> DetectionResult {
        let (_, _, result) = self.detect_stages(img);
        result
    }

    /// Detection pass that also hands back the intermediate stages.
    fn detect_stages(&self, img: &PixelBuffer) -> (LuminanceBuffer, BinaryBitmap, DetectionResult) {
        let start = Instant::now();

        let luma = preprocessing::to_luminance(img);
        let bitmap = preprocessing::binarize(&luma, self.params.luminance_threshold);
        log::debug!(
            "Binarized {}x{} image: {} foreground pixels",
            bitmap.width(),
            bitmap.height(),
            bitmap.count_foreground()
        );
        let shapes: Vec<DetectedShape> = Blobs::new(&bitmap, self.params.min_blob_pixels)
            .map(|blob| {
                classify::classify(&blob, &bitmap, &self.params, self.corner_estimator.as_ref())
            })
            .collect();

        let processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        let result = DetectionResult {
            shapes,
            processing_time_ms,
            image_width: img.width(),
            image_height: img.height(),
        };
        self.log_result(&result);
        (luma, bitmap, result)
    }

    /// Convert a decoded image and run [`Self::detect`] on it.
    pub fn detect_image(&self, img: &DynamicImage) -> Result<DetectionResult, crate::DetectError> {
        Ok(self.detect(&PixelBuffer::from_image(img)?))
    }

    /// Detect and, when debug mode is on, dump every stage to disk.
    pub fn run(&self, img: &DynamicImage) -> anyhow::Result<DetectionResult> {
        let buffer = PixelBuffer::from_image(img).context("Rejected input image")?;
        self.run_with_debug(&buffer, self.debug.as_ref())
    }

    pub fn run_with_debug(
        &self,
        buffer: &PixelBuffer,
        debug_config: Option<&DebugConfig>,
    ) -> anyhow::Result<DetectionResult> {
        let Some(config) = debug_config.filter(|c| c.enabled) else {
            return Ok(self.detect(buffer));
        };

        let (luma, bitmap, result) = self.detect_stages(buffer);
        debug::save_debug_artifacts(config, buffer, &luma, &bitmap, &result, self.verbose)?;
        Ok(result)
    }

    /// Luminance stage only (for debugging)
    pub fn get_luminance(&self, img: &PixelBuffer) -> LuminanceBuffer {
        preprocessing::to_luminance(img)
    }

    /// Binary bitmap stage (for debugging)
    pub fn get_bitmap(&self, img: &PixelBuffer) -> BinaryBitmap {
        let luma = preprocessing::to_luminance(img);
        preprocessing::binarize(&luma, self.params.luminance_threshold)
    }

    /// Surviving blobs in discovery order (for debugging)
    pub fn get_blobs(&self, img: &PixelBuffer) -> Vec<Blob> {
        let bitmap = self.get_bitmap(img);
        blobs::find_blobs(&bitmap, self.params.min_blob_pixels)
    }

    fn log_result(&self, result: &DetectionResult) {
        log::debug!(
            "Detected {} shapes in {}x{} image ({:.2} ms, corners: {})",
            result.shapes.len(),
            result.image_width,
            result.image_height,
            result.processing_time_ms,
            self.corner_estimator.name()
        );

        if self.verbose {
            log::info!("Analyzing shapes (showing first 10):");
            for (i, shape) in result.shapes.iter().take(10).enumerate() {
                let b = shape.bounding_box;
                log::info!(
                    "  Shape {}: {} conf={:.3} bbox=({}, {}) {}x{} area={}",
                    i + 1,
                    shape.kind,
                    shape.confidence,
                    b.x,
                    b.y,
                    b.width,
                    b.height,
                    shape.area
                );
            }
        }
    }
}

impl Default for DetectionPipeline {
    fn default() -> Self {
        Self::new()
    }
}
