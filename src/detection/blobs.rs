use crate::detection::preprocessing::BinaryBitmap;
use crate::models::{Blob, Point};

/// Neighbour order: right, left, down, up, then the diagonals
/// down-right, down-left, up-right, up-left.
pub const NEIGHBOURS_8: [(i64, i64); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// Per-pass record of pixels already claimed by a blob.
#[derive(Debug, Clone)]
pub struct VisitedMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl VisitedMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn is_visited(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[self.index(x, y)]
    }

    pub fn mark(&mut self, x: u32, y: u32) {
        let i = self.index(x, y);
        self.bits[i] = true;
    }
}

/// Collect the 8-connected foreground region containing `seed`.
///
/// Depth-first over an explicit stack: a popped position is skipped if it
/// is out of bounds, background or already visited; otherwise it is marked,
/// appended to the blob, and all 8 neighbours are pushed in
/// [`NEIGHBOURS_8`] order (so the last one pushed is explored first).
/// Returns `None` if the seed is background or already visited.
pub fn flood_fill(bitmap: &BinaryBitmap, visited: &mut VisitedMask, seed: Point) -> Option<Blob> {
    if !bitmap.is_foreground(seed.x, seed.y) || visited.is_visited(seed.x, seed.y) {
        return None;
    }

    let mut pixels = Vec::new();
    let mut stack: Vec<(i64, i64)> = vec![(seed.x as i64, seed.y as i64)];

    while let Some((x, y)) = stack.pop() {
        if !bitmap.is_foreground_i(x, y) {
            continue;
        }
        let (px, py) = (x as u32, y as u32);
        if visited.is_visited(px, py) {
            continue;
        }
        visited.mark(px, py);
        pixels.push(Point { x: px, y: py });

        for (dx, dy) in NEIGHBOURS_8 {
            stack.push((x + dx, y + dy));
        }
    }

    Blob::from_pixels(pixels)
}

/// Lazy blob scan over one bitmap.
///
/// Seeds are taken row-major from the interior only (`1..=W-2`,
/// `1..=H-2`); the flood fill itself may still reach the outer ring.
/// Blobs smaller than `min_pixels` are consumed but not yielded.
pub struct Blobs<'a> {
    bitmap: &'a BinaryBitmap,
    visited: VisitedMask,
    min_pixels: usize,
    x: u32,
    y: u32,
}

impl<'a> Blobs<'a> {
    pub fn new(bitmap: &'a BinaryBitmap, min_pixels: usize) -> Self {
        Self {
            bitmap,
            visited: VisitedMask::new(bitmap.width(), bitmap.height()),
            min_pixels,
            x: 1,
            y: 1,
        }
    }

    fn advance(&mut self) {
        self.x += 1;
        if self.x + 1 >= self.bitmap.width() {
            self.x = 1;
            self.y += 1;
        }
    }
}

impl Iterator for Blobs<'_> {
    type Item = Blob;

    fn next(&mut self) -> Option<Blob> {
        let w = self.bitmap.width();
        let h = self.bitmap.height();
        if w < 3 {
            return None;
        }

        while self.y + 1 < h {
            let seed = Point { x: self.x, y: self.y };
            self.advance();

            if let Some(blob) = flood_fill(self.bitmap, &mut self.visited, seed) {
                if blob.pixels().len() >= self.min_pixels {
                    return Some(blob);
                }
                log::trace!(
                    "dropping {}px blob seeded at ({}, {})",
                    blob.pixels().len(),
                    seed.x,
                    seed.y
                );
            }
        }

        None
    }
}

/// Eager form of [`Blobs`].
pub fn find_blobs(bitmap: &BinaryBitmap, min_pixels: usize) -> Vec<Blob> {
    Blobs::new(bitmap, min_pixels).collect()
}
