//! Tile image decoding.
//!
//! Response bodies are fully decoded to validate them. PNG bodies are kept
//! as-is; anything else the `image` crate can read is re-encoded to PNG so
//! every overlay in the artifact has a uniform image format.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{ImageFormat, ImageReader};

use crate::error::FetchError;

/// A decoded tile, normalised to PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// PNG-encoded pixel data
    pub data: Bytes,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

impl RasterImage {
    /// Decode a response body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::DecodeFailed`] if the body is empty, not a
    /// recognised image format, or corrupt.
    pub fn decode(body: Bytes) -> Result<Self, FetchError> {
        if body.is_empty() {
            return Err(FetchError::DecodeFailed("empty response body".to_string()));
        }

        let reader = ImageReader::new(Cursor::new(&body[..]))
            .with_guessed_format()
            .map_err(|e| FetchError::DecodeFailed(e.to_string()))?;

        let format = reader
            .format()
            .ok_or_else(|| FetchError::DecodeFailed("unrecognised image format".to_string()))?;

        let img = reader
            .decode()
            .map_err(|e| FetchError::DecodeFailed(e.to_string()))?;

        let (width, height) = (img.width(), img.height());

        let data = if format == ImageFormat::Png {
            body
        } else {
            let mut output = Vec::new();
            img.write_with_encoder(PngEncoder::new(&mut output))
                .map_err(|e| FetchError::DecodeFailed(format!("PNG re-encode failed: {}", e)))?;
            Bytes::from(output)
        };

        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Pixel dimensions as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
