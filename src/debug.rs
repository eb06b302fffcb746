use anyhow::{Context, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

use crate::detection::preprocessing::{BinaryBitmap, LuminanceBuffer};
use crate::models::{DetectionResult, PixelBuffer, ShapeKind};

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Directory receiving the stage images
    pub output_dir: PathBuf,
    pub enabled: bool,
}

impl DebugConfig {
    /// The directory must be empty or non-existent; it is created if missing.
    pub fn prepare(output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)
                .with_context(|| format!("Failed to read debug directory {}", output_dir.display()))?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)
                .with_context(|| format!("Failed to create debug directory {}", output_dir.display()))?;
        }

        Ok(Self {
            output_dir,
            enabled: true,
        })
    }
}

pub const INPUT_FILE: &str = "00_input.png";
pub const GRAYSCALE_FILE: &str = "01_grayscale.png";
pub const BINARY_FILE: &str = "02_binary.png";
pub const DETECTIONS_FILE: &str = "03_detections.png";
pub const RESULT_FILE: &str = "result.json";

pub fn kind_color(kind: ShapeKind) -> Rgba<u8> {
    match kind {
        ShapeKind::Circle => Rgba([230, 25, 75, 255]),
        ShapeKind::Square => Rgba([60, 180, 75, 255]),
        ShapeKind::Rectangle => Rgba([0, 130, 200, 255]),
        ShapeKind::Triangle => Rgba([245, 130, 48, 255]),
        ShapeKind::Pentagon => Rgba([145, 30, 180, 255]),
        ShapeKind::Star => Rgba([255, 225, 25, 255]),
    }
}

/// Copy of the input with every detection's box and center drawn on it.
pub fn annotate(input: &PixelBuffer, result: &DetectionResult) -> Result<RgbaImage> {
    let mut canvas = input
        .to_rgba_image()
        .context("Pixel buffer does not match its dimensions")?;

    for shape in &result.shapes {
        let color = kind_color(shape.kind);
        let b = shape.bounding_box;
        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(b.x as i32, b.y as i32).of_size(b.width, b.height),
            color,
        );
        draw_cross_mut(
            &mut canvas,
            color,
            shape.center.x.round() as i32,
            shape.center.y.round() as i32,
        );
    }

    Ok(canvas)
}

fn save_png(img: &DynamicImage, dir: &Path, name: &str, verbose: bool) -> Result<()> {
    let path = dir.join(name);
    img.save(&path)
        .map_err(|e| anyhow::anyhow!("Failed to save debug image {}: {}", path.display(), e))?;
    if verbose {
        log::info!("Debug: saved {}", path.display());
    } else {
        log::debug!("Debug: saved {}", path.display());
    }
    Ok(())
}

/// Write every stage of one detection run into `config.output_dir`.
pub fn save_debug_artifacts(
    config: &DebugConfig,
    input: &PixelBuffer,
    luma: &LuminanceBuffer,
    bitmap: &BinaryBitmap,
    result: &DetectionResult,
    verbose: bool,
) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }
    let dir = config.output_dir.as_path();
    std::fs::create_dir_all(dir)?;

    let original = input
        .to_rgba_image()
        .context("Pixel buffer does not match its dimensions")?;
    save_png(&DynamicImage::ImageRgba8(original), dir, INPUT_FILE, verbose)?;
    save_png(&DynamicImage::ImageLuma8(luma.to_gray_image()), dir, GRAYSCALE_FILE, verbose)?;
    save_png(&DynamicImage::ImageLuma8(bitmap.to_gray_image()), dir, BINARY_FILE, verbose)?;
    save_png(&DynamicImage::ImageRgba8(annotate(input, result)?), dir, DETECTIONS_FILE, verbose)?;

    let json = result.to_json_pretty()?;
    std::fs::write(dir.join(RESULT_FILE), json)
        .with_context(|| format!("Failed to write {}", dir.join(RESULT_FILE).display()))?;

    Ok(())
}
