//! Upload type checks and image re-encoding.
//!
//! [`optimize_image`] never fails: anything it cannot decode, or cannot make
//! smaller, is handed back untouched.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Longest edge, in pixels, of a stored image.
pub const MAX_IMAGE_DIMENSION: u32 = 1600;

/// JPEG quality used when re-encoding opaque images.
pub const JPEG_QUALITY: u8 = 80;

/// MIME types accepted by the upload filter.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

// ---------------------------------------------------------------------------
// Type checks
// ---------------------------------------------------------------------------

fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether `content_type` (parameters ignored) is an accepted image type.
pub fn is_allowed_image_type(content_type: &str) -> bool {
    let essence = essence(content_type);
    ALLOWED_IMAGE_TYPES.contains(&essence.as_str())
}

/// File extension for an accepted image type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match essence(content_type).as_str() {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Optimization
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Image could not be decoded: {0}")]
    Decode(image::ImageError),

    #[error("Image could not be encoded: {0}")]
    Encode(image::ImageError),
}

/// Bytes ready to be stored, with the type they should be stored under.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub extension: &'static str,
    /// `false` when the original upload is being passed through.
    pub optimized: bool,
}

/// Decode, downscale to fit [`MAX_IMAGE_DIMENSION`] and re-encode.
///
/// Opaque images become JPEG at [`JPEG_QUALITY`]; images with an alpha
/// channel become PNG. Returns the encoded bytes and their MIME type.
pub fn reencode(bytes: &[u8], max_dimension: u32) -> Result<(Vec<u8>, &'static str), ImageError> {
    let mut img = image::load_from_memory(bytes).map_err(ImageError::Decode)?;

    if img.width() > max_dimension || img.height() > max_dimension {
        img = img.resize(max_dimension, max_dimension, FilterType::Lanczos3);
    }

    let mut out = Cursor::new(Vec::new());
    if img.color().has_alpha() {
        img.write_with_encoder(PngEncoder::new(&mut out))
            .map_err(ImageError::Encode)?;
        Ok((out.into_inner(), "image/png"))
    } else {
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))
            .map_err(ImageError::Encode)?;
        Ok((out.into_inner(), "image/jpeg"))
    }
}

/// Optimize an upload, falling back to the original bytes.
///
/// The returned payload is never larger than `bytes`.
pub fn optimize_image(bytes: Vec<u8>, content_type: &str) -> ProcessedImage {
    let original_ext = extension_for(content_type).unwrap_or("bin");

    match reencode(&bytes, MAX_IMAGE_DIMENSION) {
        Ok((encoded, mime)) if encoded.len() < bytes.len() => ProcessedImage {
            bytes: encoded,
            content_type: mime.to_string(),
            extension: extension_for(mime).unwrap_or(original_ext),
            optimized: true,
        },
        Ok(_) => ProcessedImage {
            bytes,
            content_type: essence(content_type),
            extension: original_ext,
            optimized: false,
        },
        Err(e) => {
            tracing::debug!(error = %e, content_type, "Keeping original image bytes");
            ProcessedImage {
                bytes,
                content_type: essence(content_type),
                extension: original_ext,
                optimized: false,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn noisy_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            let v = ((x * 7919 + y * 104_729) % 251) as u8;
            Rgb([v, v.wrapping_mul(3), v.wrapping_add(91)])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn allowed_types() {
        assert!(is_allowed_image_type("image/png"));
        assert!(is_allowed_image_type("IMAGE/JPEG; charset=binary"));
        assert!(is_allowed_image_type("image/gif"));
        assert!(!is_allowed_image_type("application/pdf"));
        assert!(!is_allowed_image_type("text/plain"));
        assert!(!is_allowed_image_type("image/svg+xml"));
    }

    #[test]
    fn extensions() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/webp"), Some("webp"));
        assert_eq!(extension_for("text/csv"), None);
    }

    #[test]
    fn large_opaque_image_is_downscaled_to_jpeg() {
        let input = noisy_png(2000, 1000);
        let out = optimize_image(input.clone(), "image/png");

        assert!(out.optimized);
        assert_eq!(out.content_type, "image/jpeg");
        assert_eq!(out.extension, "jpg");
        assert!(out.bytes.len() < input.len());

        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.width(), 1600);
        assert_eq!(decoded.height(), 800);
    }

    #[test]
    fn alpha_images_stay_png() {
        let img = RgbaImage::from_fn(40, 40, |x, y| Rgba([x as u8, y as u8, 0, 128]));
        let (_, mime) = reencode(&DynamicImage::ImageRgba8(img).into_bytes_png(), 1600).unwrap();
        assert_eq!(mime, "image/png");
    }

    #[test]
    fn undecodable_bytes_pass_through() {
        let input = b"definitely not an image".to_vec();
        let out = optimize_image(input.clone(), "image/webp");
        assert!(!out.optimized);
        assert_eq!(out.bytes, input);
        assert_eq!(out.extension, "webp");
    }

    #[test]
    fn output_is_never_larger_than_input() {
        for (w, h) in [(1, 1), (16, 16), (300, 200)] {
            let input = noisy_png(w, h);
            let out = optimize_image(input.clone(), "image/png");
            assert!(out.bytes.len() <= input.len());
        }
    }

    trait IntoPngBytes {
        fn into_bytes_png(self) -> Vec<u8>;
    }

    impl IntoPngBytes for DynamicImage {
        fn into_bytes_png(self) -> Vec<u8> {
            let mut out = Cursor::new(Vec::new());
            self.write_to(&mut out, ImageFormat::Png).unwrap();
            out.into_inner()
        }
    }
}
