//! Image encoding: `DynamicImage` → base64 JPEG wrapped in [`RasterizedPage`].
//!
//! Vision APIs take images inline as base64 with a MIME tag. JPEG has no
//! alpha channel, so the page is flattened to RGB before encoding.

use crate::error::AtsError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const JPEG_MIME: &str = "image/jpeg";

/// The first résumé page, ready to embed in an inference request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterizedPage {
    pub mime_type: String,
    /// Base64 (standard alphabet, padded) of the encoded image.
    pub data: String,
}

impl std::fmt::Debug for RasterizedPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterizedPage")
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl RasterizedPage {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Encode a rendered page as a base64 JPEG.
pub fn encode_page(img: &DynamicImage, quality: u8) -> Result<RasterizedPage, AtsError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buf = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)))
        .map_err(|e| AtsError::ImageEncodingFailed {
            detail: e.to_string(),
        })?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Encoded {}x{} page → {} bytes JPEG, {} bytes base64",
        rgb.width(),
        rgb.height(),
        buf.len(),
        b64.len()
    );

    Ok(RasterizedPage::new(b64, JPEG_MIME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_rgba_image_as_jpeg() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 128])));
        let page = encode_page(&img, 90).expect("encode should succeed");
        assert_eq!(page.mime_type, "image/jpeg");

        let decoded = STANDARD.decode(&page.data).expect("valid base64");
        // JPEG SOI marker
        assert_eq!(&decoded[..2], &[0xFF, 0xD8]);

        let back = image::load_from_memory(&decoded).expect("decodable JPEG");
        assert_eq!((back.width(), back.height()), (10, 10));
    }

    #[test]
    fn encoding_is_deterministic() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 8, Rgba([10, 20, 30, 255])));
        assert_eq!(encode_page(&img, 75).unwrap(), encode_page(&img, 75).unwrap());
    }

    #[test]
    fn debug_hides_payload() {
        let page = RasterizedPage::new("QUJD", JPEG_MIME);
        let dbg = format!("{page:?}");
        assert!(!dbg.contains("QUJD"));
        assert!(dbg.contains("data_len"));
    }
}
