mod common;

use approx::assert_relative_eq;
use common::*;
use image::DynamicImage;
use shapedetect::{Blob, CornerEstimator, DetectError, DetectionParams};
use std::sync::Arc;

fn detect(img: &image::RgbaImage) -> DetectionResult {
    DetectionPipeline::new().detect(&buffer(img))
}

#[test]
fn solid_disk_yields_one_compact_blob() {
    let result = detect(&disk_image(80, 80, 40, 40, 30));

    assert_eq!(result.shapes.len(), 1);
    let shape = &result.shapes[0];
    assert_eq!(shape.bounding_box, BoundingBox { x: 10, y: 10, width: 61, height: 61 });
    assert_eq!((shape.center.x, shape.center.y), (40.0, 40.0));
    assert_eq!(shape.area, 2821);
    // The pixel-count border overestimates a disk's perimeter, so the
    // circularity stays near 0.64 and the square-ratio branch wins.
    assert_eq!(shape.kind, ShapeKind::Square);
    assert_eq!(shape.confidence, 0.7);
}

#[test]
fn disk_on_minimal_canvas() {
    let result = detect(&disk_image(62, 62, 31, 31, 30));
    assert_eq!(result.shapes.len(), 1);
    assert_eq!(result.shapes[0].bounding_box, BoundingBox { x: 1, y: 1, width: 61, height: 61 });
}

#[test]
fn solid_square_block() {
    let result = detect(&rect_image(60, 60, 10, 10, 40, 40));

    assert_eq!(result.shapes.len(), 1);
    let shape = &result.shapes[0];
    assert_eq!(shape.bounding_box.width, 40);
    assert_eq!(shape.bounding_box.height, 40);
    assert_eq!(shape.area, 1600);
    // 4*pi*1600 / 156^2 is just above the circle cut-off.
    assert_eq!(shape.kind, ShapeKind::Circle);
    assert_relative_eq!(shape.confidence, 0.8262, epsilon = 1e-4);
}

#[test]
fn wide_block_is_rectangle() {
    let result = detect(&rect_image(100, 100, 10, 10, 60, 40));
    assert_eq!(result.shapes.len(), 1);
    assert_eq!(result.shapes[0].kind, ShapeKind::Rectangle);
    assert_eq!(result.shapes[0].confidence, 0.7);
}

#[test]
fn elongated_bar_falls_to_corner_estimate() {
    let result = detect(&rect_image(120, 30, 10, 10, 100, 10));
    assert_eq!(result.shapes.len(), 1);
    assert_eq!(result.shapes[0].kind, ShapeKind::Star);
    assert_eq!(result.shapes[0].confidence, 0.6);
}

#[test]
fn two_disjoint_blocks() {
    let mut img = blank(100, 60);
    fill_rect(&mut img, 10, 10, 20, 20);
    fill_rect(&mut img, 50, 10, 30, 30);

    let result = detect(&img);
    assert_eq!(result.shapes.len(), 2);
    assert_eq!(result.shapes[0].bounding_box, BoundingBox { x: 10, y: 10, width: 20, height: 20 });
    assert_eq!(result.shapes[1].bounding_box, BoundingBox { x: 50, y: 10, width: 30, height: 30 });
    assert_eq!(result.shapes[0].area, 400);
    assert_eq!(result.shapes[1].area, 900);
}

#[test]
fn all_background_yields_no_shapes() {
    let result = detect(&blank(64, 48));
    assert!(result.shapes.is_empty());
    assert_eq!((result.image_width, result.image_height), (64, 48));
    assert!(result.processing_time_ms >= 0.0);
}

#[test]
fn sub_threshold_blob_is_dropped() {
    let result = detect(&rect_image(20, 20, 5, 5, 5, 5));
    assert!(result.shapes.is_empty());
}

#[test]
fn lower_noise_threshold_exposes_unclamped_confidence() {
    let params = DetectionParams {
        min_blob_pixels: 10,
        ..DetectionParams::default()
    };
    let pipeline = DetectionPipeline::new().with_params(params).unwrap();
    let result = pipeline.detect(&buffer(&rect_image(20, 20, 5, 5, 5, 5)));

    assert_eq!(result.shapes.len(), 1);
    assert_eq!(result.shapes[0].kind, ShapeKind::Circle);
    assert!(result.shapes[0].confidence > 1.0);
}

#[test]
fn colored_shapes_are_binarized_by_luminance() {
    let mut img = image::RgbaImage::from_pixel(60, 60, image::Rgba([255, 0, 0, 255]));
    imageproc::drawing::draw_filled_rect_mut(
        &mut img,
        imageproc::rect::Rect::at(10, 10).of_size(40, 25),
        image::Rgba([0, 255, 0, 255]),
    );

    let result = detect(&img);
    assert_eq!(result.shapes.len(), 1);
    assert_eq!(result.shapes[0].bounding_box, BoundingBox { x: 10, y: 10, width: 40, height: 25 });
}

#[test]
fn detection_is_deterministic() {
    let mut img = disk_image(120, 80, 30, 40, 20);
    fill_rect(&mut img, 70, 10, 40, 12);
    fill_rect(&mut img, 70, 40, 30, 30);

    let pipeline = DetectionPipeline::new();
    let a = pipeline.detect(&buffer(&img));
    let b = pipeline.detect(&buffer(&img));
    assert_eq!(a.shapes, b.shapes);
    assert_eq!(a.shapes.len(), 3);
}

#[test]
fn shapes_match_their_source_blobs() {
    let mut img = disk_image(160, 100, 40, 50, 25);
    fill_rect(&mut img, 80, 10, 70, 12);
    fill_rect(&mut img, 90, 40, 45, 30);
    fill_rect(&mut img, 80, 80, 4, 4);

    let pipeline = DetectionPipeline::new();
    let input = buffer(&img);
    let blobs: Vec<Blob> = pipeline.get_blobs(&input);
    let result = pipeline.detect(&input);

    assert_eq!(blobs.len(), result.shapes.len());
    for (blob, shape) in blobs.iter().zip(&result.shapes) {
        assert_eq!(shape.area as usize, blob.pixels().len());
        assert_eq!(shape.bounding_box.x, blob.min_x);
        assert_eq!(shape.bounding_box.max_x(), blob.max_x);
        assert_eq!(shape.bounding_box.y, blob.min_y);
        assert_eq!(shape.bounding_box.max_y(), blob.max_y);
        assert!(blob.pixels().len() >= 80);
    }
}

#[test]
fn non_circle_confidences_come_from_the_fixed_set() {
    let mut img = blank(200, 120);
    fill_rect(&mut img, 5, 5, 60, 40);
    fill_rect(&mut img, 80, 5, 100, 10);
    fill_rect(&mut img, 80, 30, 30, 28);
    fill_rect(&mut img, 5, 70, 80, 1);
    fill_rect(&mut img, 120, 70, 60, 30);

    let result = detect(&img);
    assert!(!result.shapes.is_empty());
    for shape in &result.shapes {
        if shape.kind != ShapeKind::Circle {
            assert!(
                [0.5, 0.6, 0.7].contains(&shape.confidence),
                "{} had confidence {}",
                shape.kind,
                shape.confidence
            );
        } else {
            assert!(shape.confidence > 0.8);
        }
    }
}

#[test]
fn short_bar_falls_back_to_rectangle() {
    let result = detect(&rect_image(40, 20, 10, 10, 21, 4));

    assert_eq!(result.shapes.len(), 1);
    let shape = &result.shapes[0];
    assert_eq!(shape.bounding_box, BoundingBox { x: 10, y: 10, width: 21, height: 4 });
    assert_eq!(shape.area, 84);
    assert_eq!(shape.kind, ShapeKind::Rectangle);
    assert_eq!(shape.confidence, 0.5);
}

#[test]
fn bar_labels_follow_the_fill_order() {
    let four_rows = detect(&rect_image(62, 24, 10, 10, 42, 4));
    assert_eq!(four_rows.shapes.len(), 1);
    assert_eq!(four_rows.shapes[0].kind, ShapeKind::Pentagon);
    assert_eq!(four_rows.shapes[0].confidence, 0.6);

    let three_rows = detect(&rect_image(62, 24, 10, 10, 42, 3));
    assert_eq!(three_rows.shapes.len(), 1);
    assert_eq!(three_rows.shapes[0].area, 126);
    assert_eq!(three_rows.shapes[0].kind, ShapeKind::Triangle);
    assert_eq!(three_rows.shapes[0].confidence, 0.6);
}

#[test]
fn invalid_params_are_rejected_by_the_builder() {
    let params = DetectionParams {
        min_blob_pixels: 0,
        ..DetectionParams::default()
    };
    assert!(DetectionPipeline::new().with_params(params).is_err());

    let params = DetectionParams {
        square_max_ratio: 2.0,
        rectangle_max_ratio: 1.5,
        ..DetectionParams::default()
    };
    assert!(DetectionPipeline::new().with_params(params).is_err());
}

struct FixedCorners(u32);

impl CornerEstimator for FixedCorners {
    fn count_corners(&self, _blob: &Blob, _border: u32) -> u32 {
        self.0
    }

    fn name(&self) -> &str {
        "Fixed"
    }
}

#[test]
fn corner_strategy_is_pluggable() {
    let img = rect_image(120, 30, 10, 10, 100, 10);

    let pentagon = DetectionPipeline::new().with_corner_estimator(Arc::new(FixedCorners(5)));
    assert_eq!(pentagon.detect(&buffer(&img)).shapes[0].kind, ShapeKind::Pentagon);

    let fallback = DetectionPipeline::new().with_corner_estimator(Arc::new(FixedCorners(4)));
    let shape = &fallback.detect(&buffer(&img)).shapes[0];
    assert_eq!(shape.kind, ShapeKind::Rectangle);
    assert_eq!(shape.confidence, 0.5);
}

#[test]
fn empty_dynamic_image_is_rejected() {
    let err = DetectionPipeline::new()
        .detect_image(&DynamicImage::new_rgba8(0, 0))
        .unwrap_err();
    assert!(matches!(err, DetectError::EmptyImage { .. }));
}

#[test]
fn run_without_debug_matches_detect() {
    let img = rect_image(60, 60, 10, 10, 40, 40);
    let pipeline = DetectionPipeline::new();
    let ran = pipeline.run(&DynamicImage::ImageRgba8(img.clone())).unwrap();
    let detected = pipeline.detect(&buffer(&img));
    assert_eq!(ran.shapes, detected.shapes);
}

#[test]
fn result_serializes_with_camel_case_fields() {
    let result = detect(&rect_image(60, 60, 10, 10, 40, 40));
    let json: serde_json::Value = serde_json::from_str(&result.to_json_pretty().unwrap()).unwrap();

    assert_eq!(json["imageWidth"], 60);
    assert_eq!(json["imageHeight"], 60);
    assert!(json["processingTimeMs"].is_number());
    assert_eq!(json["shapes"][0]["type"], "circle");
    assert_eq!(json["shapes"][0]["boundingBox"]["width"], 40);
    assert_eq!(json["shapes"][0]["area"], 1600);
    assert_eq!(result.count_of(ShapeKind::Circle), 1);
    assert_eq!(result.count_of(ShapeKind::Star), 0);
}

#[tokio::test]
async fn independent_invocations_run_concurrently() -> anyhow::Result<()> {
    let pipeline = Arc::new(DetectionPipeline::new());
    let images = vec![
        rect_image(60, 60, 10, 10, 40, 40),
        disk_image(80, 80, 40, 40, 30),
        rect_image(120, 30, 10, 10, 100, 10),
        blank(30, 30),
    ];

    let mut handles = Vec::new();
    for img in images.clone() {
        let pipeline = Arc::clone(&pipeline);
        handles.push(tokio::task::spawn_blocking(move || pipeline.detect(&buffer(&img))));
    }

    for (img, handle) in images.iter().zip(handles) {
        let concurrent = handle.await?;
        let sequential = pipeline.detect(&buffer(img));
        assert_eq!(concurrent.shapes, sequential.shapes);
    }
    Ok(())
}
