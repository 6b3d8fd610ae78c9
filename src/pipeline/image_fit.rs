//! Image sizing: native pixel size and resolution → display size in inches.
//!
//! [`fit`] is the pure calculation. [`measure`] decodes raw bytes and reads
//! the resolution the file declares, so the two can be tested separately.

use crate::config::BoundingBox;
use image::DynamicImage;
use tracing::debug;

/// Resolution assumed when a file declares none.
pub const DEFAULT_DPI: f64 = 96.0;

/// Native size of a bitmap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSpec {
    pub width_px: u32,
    pub height_px: u32,
    /// Dots per inch; non-positive values are treated as [`DEFAULT_DPI`].
    pub dpi: f64,
}

impl ImageSpec {
    pub fn new(width_px: u32, height_px: u32, dpi: f64) -> Self {
        Self {
            width_px,
            height_px,
            dpi,
        }
    }

    /// Size in inches at the declared resolution.
    pub fn native_inches(&self) -> (f64, f64) {
        let dpi = if self.dpi.is_finite() && self.dpi > 0.0 {
            self.dpi
        } else {
            DEFAULT_DPI
        };
        (self.width_px as f64 / dpi, self.height_px as f64 / dpi)
    }
}

/// Display size chosen for an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    pub width_in: f64,
    pub height_in: f64,
}

/// Compute the display size of an image inside `bbox`.
///
/// Images that fit are used at native size. Otherwise both dimensions are
/// multiplied by `min(box_w / w, box_h / h)`, which preserves aspect ratio and
/// makes the limiting dimension exactly fill the box.
pub fn fit(spec: ImageSpec, bbox: BoundingBox) -> FitResult {
    let (w, h) = spec.native_inches();
    if w > bbox.width_in || h > bbox.height_in {
        let scale = (bbox.width_in / w).min(bbox.height_in / h);
        FitResult {
            width_in: w * scale,
            height_in: h * scale,
        }
    } else {
        FitResult {
            width_in: w,
            height_in: h,
        }
    }
}

/// A decoded bitmap with its native size.
pub struct DecodedImage {
    pub image: DynamicImage,
    pub spec: ImageSpec,
}

/// Decode `bytes` and determine its native size.
///
/// The resolution comes from the PNG `pHYs` chunk or the JPEG JFIF header;
/// `fallback_dpi` is used when neither is present.
pub fn measure(bytes: &[u8], fallback_dpi: f64) -> Result<DecodedImage, image::ImageError> {
    let image = image::load_from_memory(bytes)?;
    let dpi = declared_dpi(bytes).unwrap_or(fallback_dpi);
    let spec = ImageSpec::new(image.width(), image.height(), dpi);
    debug!(
        "Measured image {}×{} px at {:.1} dpi",
        spec.width_px, spec.height_px, spec.dpi
    );
    Ok(DecodedImage { image, spec })
}

/// Horizontal resolution declared in the file header, if any.
pub fn declared_dpi(bytes: &[u8]) -> Option<f64> {
    png_dpi(bytes)
        .or_else(|| jpeg_dpi(bytes))
        .filter(|d| d.is_finite() && *d > 0.0)
}

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

fn read_u32(b: &[u8], at: usize) -> Option<u32> {
    let s = b.get(at..at + 4)?;
    Some(u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
}

fn read_u16(b: &[u8], at: usize) -> Option<u16> {
    let s = b.get(at..at + 2)?;
    Some(u16::from_be_bytes([s[0], s[1]]))
}

/// `pHYs` stores pixels per metre; only unit 1 (metre) carries a resolution.
fn png_dpi(bytes: &[u8]) -> Option<f64> {
    if !bytes.starts_with(PNG_SIGNATURE) {
        return None;
    }
    let mut pos = PNG_SIGNATURE.len();
    while let Some(len) = read_u32(bytes, pos) {
        let kind = bytes.get(pos + 4..pos + 8)?;
        let body = pos + 8;
        match kind {
            b"pHYs" => {
                let ppm_x = read_u32(bytes, body)?;
                let unit = *bytes.get(body + 8)?;
                return (unit == 1).then(|| ppm_x as f64 * 0.0254);
            }
            // pHYs must precede the image data.
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }
        pos = body.checked_add(len as usize)?.checked_add(4)?;
    }
    None
}

/// JFIF APP0: units 1 = dots per inch, 2 = dots per centimetre.
fn jpeg_dpi(bytes: &[u8]) -> Option<f64> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut pos = 2;
    while bytes.get(pos) == Some(&0xFF) {
        let marker = *bytes.get(pos + 1)?;
        // Start of scan / end of image: no more header segments.
        if marker == 0xDA || marker == 0xD9 {
            return None;
        }
        let seg_len = read_u16(bytes, pos + 2)? as usize;
        let body = pos + 4;
        if marker == 0xE0 && bytes.get(body..body + 5) == Some(b"JFIF\0") {
            let units = *bytes.get(body + 7)?;
            let x_density = read_u16(bytes, body + 8)? as f64;
            return match units {
                1 => Some(x_density),
                2 => Some(x_density * 2.54),
                _ => None,
            };
        }
        pos = pos + 2 + seg_len;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn bbox() -> BoundingBox {
        BoundingBox::new(6.0, 8.0)
    }

    #[test]
    fn wide_image_is_scaled_to_box_width() {
        let r = fit(ImageSpec::new(1200, 600, 96.0), bbox());
        assert!((r.width_in - 6.0).abs() < 1e-9);
        assert!((r.height_in - 3.0).abs() < 1e-9);
    }

    #[test]
    fn small_image_is_unscaled() {
        let r = fit(ImageSpec::new(300, 150, 96.0), bbox());
        assert!((r.width_in - 3.125).abs() < 1e-9);
        assert!((r.height_in - 1.5625).abs() < 1e-9);
    }

    #[test]
    fn tall_image_is_limited_by_height() {
        let r = fit(ImageSpec::new(960, 1920, 96.0), bbox());
        assert!((r.height_in - 8.0).abs() < 1e-9);
        assert!((r.width_in - 4.0).abs() < 1e-9);
    }

    #[test]
    fn aspect_ratio_is_preserved() {
        for (w, h) in [(1234, 567), (5000, 4999), (10, 4000), (4000, 10)] {
            let r = fit(ImageSpec::new(w, h, 72.0), bbox());
            let src = w as f64 / h as f64;
            assert!((r.width_in / r.height_in - src).abs() < 1e-9 * src.max(1.0));
            assert!(r.width_in <= 6.0 + 1e-9 && r.height_in <= 8.0 + 1e-9);
        }
    }

    #[test]
    fn non_positive_dpi_falls_back() {
        let r = fit(ImageSpec::new(192, 96, 0.0), bbox());
        assert!((r.width_in - 2.0).abs() < 1e-9);
    }

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([1, 2, 3])));
        crate::pipeline::encode::encode_png(&img).unwrap()
    }

    /// Insert a pHYs chunk right after IHDR (CRC is not checked by the reader).
    fn with_phys(png: &[u8], ppm: u32) -> Vec<u8> {
        let ihdr_end = 8 + 4 + 4 + 13 + 4;
        let mut out = png[..ihdr_end].to_vec();
        out.extend_from_slice(&9u32.to_be_bytes());
        out.extend_from_slice(b"pHYs");
        out.extend_from_slice(&ppm.to_be_bytes());
        out.extend_from_slice(&ppm.to_be_bytes());
        out.push(1);
        out.extend_from_slice(&[0, 0, 0, 0]);
        out.extend_from_slice(&png[ihdr_end..]);
        out
    }

    #[test]
    fn measure_uses_fallback_without_phys() {
        let m = measure(&png_bytes(40, 20), 96.0).unwrap();
        assert_eq!((m.spec.width_px, m.spec.height_px), (40, 20));
        assert_eq!(m.spec.dpi, 96.0);
    }

    #[test]
    fn png_phys_is_read() {
        // 11811 px/m ≈ 300 dpi
        let bytes = with_phys(&png_bytes(4, 4), 11811);
        let dpi = declared_dpi(&bytes).unwrap();
        assert!((dpi - 300.0).abs() < 0.1, "dpi = {dpi}");
    }

    #[test]
    fn jfif_density_is_read() {
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        jpeg.extend_from_slice(b"JFIF\0");
        jpeg.extend_from_slice(&[1, 1, 1, 0x00, 0x48, 0x00, 0x48, 0, 0]);
        assert_eq!(declared_dpi(&jpeg), Some(72.0));

        // dots per centimetre
        jpeg[13] = 2;
        jpeg[14..16].copy_from_slice(&100u16.to_be_bytes());
        assert!((declared_dpi(&jpeg).unwrap() - 254.0).abs() < 1e-9);
    }

    #[test]
    fn garbage_declares_nothing() {
        assert_eq!(declared_dpi(b"not an image"), None);
        assert!(measure(b"not an image", 96.0).is_err());
    }
}
