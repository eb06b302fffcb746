use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_3;
use std::path::Path;

pub const LUMINANCE_THRESHOLD: f64 = 128.0;
pub const MIN_BLOB_PIXELS: usize = 80;
pub const CIRCULARITY_EPSILON: f64 = 1e-6;
pub const CIRCLE_THRESHOLD: f64 = 0.8;
pub const SQUARE_MAX_RATIO: f64 = 1.2;
pub const RECTANGLE_MAX_RATIO: f64 = 1.8;
pub const CORNER_STRIDE_DIVISOR: u32 = 20;
pub const CORNER_ANGLE_THRESHOLD: f64 = FRAC_PI_3;

/// Detection parameters
///
/// The defaults reproduce the fixed heuristic; overriding them changes
/// which blobs survive and how they are labelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    /// A pixel is foreground when its luminance is strictly above this.
    pub luminance_threshold: f64,
    /// Blobs with fewer pixels are dropped as noise.
    pub min_blob_pixels: usize,
    pub circularity_epsilon: f64,
    pub circle_threshold: f64,
    pub square_max_ratio: f64,
    pub rectangle_max_ratio: f64,
    /// Corner sampling stride is `floor(border / divisor)`, at least 1.
    pub corner_stride_divisor: u32,
    /// Radians between successive sample directions that count as a corner.
    pub corner_angle_threshold: f64,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            luminance_threshold: LUMINANCE_THRESHOLD,
            min_blob_pixels: MIN_BLOB_PIXELS,
            circularity_epsilon: CIRCULARITY_EPSILON,
            circle_threshold: CIRCLE_THRESHOLD,
            square_max_ratio: SQUARE_MAX_RATIO,
            rectangle_max_ratio: RECTANGLE_MAX_RATIO,
            corner_stride_divisor: CORNER_STRIDE_DIVISOR,
            corner_angle_threshold: CORNER_ANGLE_THRESHOLD,
        }
    }
}

impl DetectionParams {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json).context("Failed to parse detection params")?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("luminance_threshold", self.luminance_threshold),
            ("circularity_epsilon", self.circularity_epsilon),
            ("circle_threshold", self.circle_threshold),
            ("square_max_ratio", self.square_max_ratio),
            ("rectangle_max_ratio", self.rectangle_max_ratio),
            ("corner_angle_threshold", self.corner_angle_threshold),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                bail!("{} must be finite, got {}", name, value);
            }
        }

        if self.min_blob_pixels == 0 {
            bail!("min_blob_pixels must be at least 1");
        }
        if self.circularity_epsilon <= 0.0 {
            bail!("circularity_epsilon must be positive, got {}", self.circularity_epsilon);
        }
        if self.square_max_ratio < 1.0 || self.rectangle_max_ratio < self.square_max_ratio {
            bail!(
                "ratios must satisfy 1 <= square_max_ratio ({}) <= rectangle_max_ratio ({})",
                self.square_max_ratio,
                self.rectangle_max_ratio
            );
        }
        if self.corner_stride_divisor == 0 {
            bail!("corner_stride_divisor must be at least 1");
        }
        Ok(())
    }
}
