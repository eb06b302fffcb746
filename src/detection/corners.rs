use crate::models::Blob;

/// Strategy for estimating how many corners a blob outline has.
///
/// The classifier only consults this for elongated, non-circular blobs.
pub trait CornerEstimator: Send + Sync {
    fn count_corners(&self, blob: &Blob, border: u32) -> u32;

    /// Human-readable name (used in log output)
    fn name(&self) -> &str;
}

/// Fixed-stride direction sampling over the blob's pixel list.
///
/// Walks indices `0, step, 2*step, ...` with `step = floor(border / divisor)`
/// (at least 1), takes the direction from pixel `k` to pixel
/// `(k + step) mod n`, and counts a corner whenever the absolute
/// difference to the previous direction exceeds `angle_threshold`.
/// Not rotation invariant and sensitive to the flood-fill visit order.
#[derive(Debug, Clone, PartialEq)]
pub struct StrideCornerEstimator {
    pub divisor: u32,
    pub angle_threshold: f64,
}

impl StrideCornerEstimator {
    pub fn new(divisor: u32, angle_threshold: f64) -> Self {
        Self {
            divisor: divisor.max(1),
            angle_threshold,
        }
    }

    pub fn step(&self, border: u32) -> usize {
        ((border / self.divisor.max(1)) as usize).max(1)
    }
}

impl Default for StrideCornerEstimator {
    fn default() -> Self {
        Self::new(
            crate::params::CORNER_STRIDE_DIVISOR,
            crate::params::CORNER_ANGLE_THRESHOLD,
        )
    }
}

impl CornerEstimator for StrideCornerEstimator {
    fn count_corners(&self, blob: &Blob, border: u32) -> u32 {
        let pixels = blob.pixels();
        let n = pixels.len();
        let step = self.step(border);

        let mut corners = 0;
        let mut prev_angle: Option<f64> = None;

        for k in (0..n).step_by(step) {
            let a = pixels[k];
            let b = pixels[(k + step) % n];
            let angle = (b.y as f64 - a.y as f64).atan2(b.x as f64 - a.x as f64);

            if let Some(prev) = prev_angle {
                if (angle - prev).abs() > self.angle_threshold {
                    corners += 1;
                }
            }
            prev_angle = Some(angle);
        }

        corners
    }

    fn name(&self) -> &str {
        "Stride Sampling"
    }
}
