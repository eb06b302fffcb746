use std::path::PathBuf;
use thiserror::Error;

/// Errors raised before any detection work starts.
///
/// `EmptyImage` and `SizeMismatch` are the invalid-input class: they are
/// reported when a pixel buffer is constructed, so a detection run never
/// fails half way through.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("invalid input: image dimensions {width}x{height} contain no pixels")]
    EmptyImage { width: u32, height: u32 },

    #[error("invalid input: {width}x{height} RGBA image needs {expected} bytes, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DetectError {
    /// True for malformed buffers (zero dimensions or wrong byte count).
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::EmptyImage { .. } | Self::SizeMismatch { .. })
    }
}
