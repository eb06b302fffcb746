use image::ImageReader;
use std::path::Path;

use crate::error::DetectError;
use crate::models::PixelBuffer;

/// Decode an image file (any format the `image` crate knows) into RGBA.
pub fn load_pixel_buffer(path: &Path) -> Result<PixelBuffer, DetectError> {
    let img = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|source| DetectError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    log::debug!("Loaded {}: {}x{}", path.display(), img.width(), img.height());
    PixelBuffer::from_image(&img)
}
