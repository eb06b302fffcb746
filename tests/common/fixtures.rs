#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use shapedetect::detection::preprocessing::BinaryBitmap;
use shapedetect::{Blob, PixelBuffer};

/// Color constants for tests
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A black canvas of the given size.
pub fn blank(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, BLACK)
}

/// White wherever `inside(x, y)` holds, black elsewhere.
pub fn canvas_from_fn(width: u32, height: u32, inside: impl Fn(u32, u32) -> bool) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| if inside(x, y) { WHITE } else { BLACK })
}

/// Fill a white `w`x`h` block with its top-left corner at `(x, y)`.
pub fn fill_rect(img: &mut RgbaImage, x: i32, y: i32, w: u32, h: u32) {
    draw_filled_rect_mut(img, Rect::at(x, y).of_size(w, h), WHITE);
}

/// Canvas holding a single white block.
pub fn rect_image(width: u32, height: u32, x: i32, y: i32, w: u32, h: u32) -> RgbaImage {
    let mut img = blank(width, height);
    fill_rect(&mut img, x, y, w, h);
    img
}

/// Lattice disk `(x - cx)^2 + (y - cy)^2 <= r^2`.
pub fn disk_image(width: u32, height: u32, cx: i64, cy: i64, r: i64) -> RgbaImage {
    canvas_from_fn(width, height, |x, y| {
        let dx = x as i64 - cx;
        let dy = y as i64 - cy;
        dx * dx + dy * dy <= r * r
    })
}

pub fn buffer(img: &RgbaImage) -> PixelBuffer {
    PixelBuffer::from_rgba_image(img).expect("test image should be valid")
}

pub fn bitmap_from_fn(width: u32, height: u32, f: impl FnMut(u32, u32) -> bool) -> BinaryBitmap {
    BinaryBitmap::from_fn(width, height, f)
}

pub fn blob_of(pixels: &[(u32, u32)]) -> Blob {
    Blob::from_pixels(pixels.iter().map(|&(x, y)| shapedetect::Point { x, y }).collect())
        .expect("blob needs at least one pixel")
}
