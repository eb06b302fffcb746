use shapedetect::io::load_pixel_buffer;
use shapedetect::{Blob, CornerEstimator, DetectionParams, DetectionPipeline, StrideCornerEstimator};
use std::env;
use std::sync::Arc;

/// Stride sampler that only reports corners seen by two consecutive samples.
struct DebouncedCorners {
    inner: StrideCornerEstimator,
}

impl CornerEstimator for DebouncedCorners {
    fn count_corners(&self, blob: &Blob, border: u32) -> u32 {
        self.inner.count_corners(blob, border) / 2
    }

    fn name(&self) -> &str {
        "Debounced Stride Sampling"
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <image_path>", args[0]);
        std::process::exit(1);
    }

    let img = load_pixel_buffer(args[1].as_ref())?;
    println!("Loaded image: {}x{}", img.width(), img.height());

    println!("\n=== Default Pipeline ===");
    let standard = DetectionPipeline::new();
    for shape in standard.detect(&img).shapes {
        println!("  {} ({:.2})", shape.kind, shape.confidence);
    }

    println!("\n=== Custom Pipeline (Debounced Corners, Smaller Blobs) ===");
    let params = DetectionParams {
        min_blob_pixels: 30,
        ..DetectionParams::default()
    };
    let custom = DetectionPipeline::new()
        .with_params(params)?
        .with_corner_estimator(Arc::new(DebouncedCorners {
            inner: StrideCornerEstimator::default(),
        }));
    for shape in custom.detect(&img).shapes {
        println!("  {} ({:.2})", shape.kind, shape.confidence);
    }

    Ok(())
}
