use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use shapedetect::{DetectionPipeline, PixelBuffer};

fn main() -> anyhow::Result<()> {
    let white = Rgba([255u8, 255, 255, 255]);
    let mut img = RgbaImage::from_pixel(400, 200, Rgba([0, 0, 0, 255]));

    draw_filled_circle_mut(&mut img, (60, 60), 35, white);
    draw_filled_rect_mut(&mut img, Rect::at(130, 25).of_size(70, 70), white);
    draw_filled_rect_mut(&mut img, Rect::at(230, 30).of_size(100, 60), white);
    draw_filled_rect_mut(&mut img, Rect::at(20, 140).of_size(160, 14), white);
    draw_polygon_mut(
        &mut img,
        &[Point::new(230, 180), Point::new(380, 180), Point::new(305, 120)],
        white,
    );

    let out = "synthetic_shapes.png";
    img.save(out)?;
    println!("Created {} ({}x{})", out, img.width(), img.height());

    let result = DetectionPipeline::new().detect(&PixelBuffer::from_rgba_image(&img)?);

    println!("\n=== Results ({:.2} ms) ===", result.processing_time_ms);
    for (i, shape) in result.shapes.iter().enumerate() {
        let b = shape.bounding_box;
        println!(
            "  {}: {} (confidence: {:.2}) bbox ({}, {}) {}x{} area {}",
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

    Ok(())
}
