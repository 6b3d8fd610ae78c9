//! Image encoding: `data:image/...` URL → decoded bitmap → PNG bytes.
//!
//! Every embedded image is re-encoded as PNG so the container only ever has
//! to declare one media type. PNG is lossless, so re-encoding a JPEG source
//! costs size but never quality.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Prefix every embeddable image source must start with.
pub const DATA_IMAGE_PREFIX: &str = "data:image/";

/// Why a data URL could not be turned into image bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataUrlError {
    #[error("not a data:image URL")]
    NotDataImage,
    #[error("data URL has no payload")]
    MissingPayload,
    #[error("invalid base64 payload: {0}")]
    Base64(String),
}

/// Check whether a source string is an embedded image.
pub fn is_data_image(src: &str) -> bool {
    src.starts_with(DATA_IMAGE_PREFIX)
}

/// Decode the base64 payload of a `data:image/<kind>;base64,<payload>` URL.
///
/// Whitespace inside the payload (line-wrapped base64) is ignored.
pub fn decode_data_url(src: &str) -> Result<Vec<u8>, DataUrlError> {
    if !is_data_image(src) {
        return Err(DataUrlError::NotDataImage);
    }
    let (_, payload) = src.split_once(',').ok_or(DataUrlError::MissingPayload)?;
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| DataUrlError::Base64(e.to_string()))?;
    debug!("Decoded data URL → {} bytes", bytes.len());
    Ok(bytes)
}

/// Encode a decoded bitmap as PNG bytes for embedding.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!(
        "Encoded {}×{} image → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}

/// A short, log-safe prefix of an image source (never the whole payload).
pub fn source_prefix(src: &str) -> String {
    src.chars().take(32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let png = encode_png(&img).expect("encode should succeed");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn decode_round_trips_through_base64() {
        let url = format!("data:image/png;base64,{}", STANDARD.encode(b"hello"));
        assert_eq!(decode_data_url(&url).unwrap(), b"hello");
    }

    #[test]
    fn decode_ignores_wrapped_payload() {
        let url = "data:image/png;base64,aGVs\nbG8=";
        assert_eq!(decode_data_url(url).unwrap(), b"hello");
    }

    #[test]
    fn decode_rejects_other_sources() {
        assert_eq!(
            decode_data_url("https://example.com/a.png"),
            Err(DataUrlError::NotDataImage)
        );
        assert_eq!(
            decode_data_url("data:image/png;base64"),
            Err(DataUrlError::MissingPayload)
        );
        assert!(matches!(
            decode_data_url("data:image/png;base64,!!!"),
            Err(DataUrlError::Base64(_))
        ));
    }

    #[test]
    fn source_prefix_is_bounded() {
        let long = "x".repeat(500);
        assert_eq!(source_prefix(&long).len(), 32);
    }
}
