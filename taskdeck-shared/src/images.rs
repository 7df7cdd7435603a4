/// Avatar upload processing
///
/// Uploads are screened cheaply first (file extension, byte cap) and only
/// then decoded. Accepted images are resized to a fixed 250x250 canvas with
/// a cover crop and re-encoded as PNG, so every stored avatar has the same
/// shape and format regardless of what was uploaded.

use image::{imageops::FilterType, ImageFormat};

/// Side length of the stored avatar thumbnail
pub const AVATAR_DIMENSION: u32 = 250;

/// Maximum accepted upload size in bytes
pub const MAX_AVATAR_BYTES: usize = 1_000_000;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Error type for avatar processing
#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    /// Filename extension is not jpg/jpeg/png
    #[error("Please upload an image file of either jpg, jpeg or png type")]
    UnsupportedType,

    /// Upload exceeds the byte cap
    #[error("Image exceeds the maximum upload size of {MAX_AVATAR_BYTES} bytes")]
    TooLarge,

    /// Bytes could not be decoded as an image
    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Checks an uploaded filename against the accepted extensions
/// (case-insensitive)
pub fn has_allowed_extension(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Converts an accepted upload into the stored avatar form
///
/// Enforces the byte cap, decodes, resizes to exactly
/// [`AVATAR_DIMENSION`]x[`AVATAR_DIMENSION`] (cover crop, so aspect ratio
/// is preserved and overflow is trimmed), and re-encodes as PNG.
///
/// # Errors
///
/// Returns [`AvatarError::TooLarge`] before decoding oversized input, or
/// [`AvatarError::Decode`] when the bytes are not a decodable image.
pub fn to_avatar_png(data: &[u8]) -> Result<Vec<u8>, AvatarError> {
    if data.len() > MAX_AVATAR_BYTES {
        return Err(AvatarError::TooLarge);
    }

    let img = image::load_from_memory(data)?;
    let thumbnail = img.resize_to_fill(AVATAR_DIMENSION, AVATAR_DIMENSION, FilterType::Triangle);

    let mut out = Vec::new();
    thumbnail.write_to(&mut std::io::Cursor::new(&mut out), ImageFormat::Png)?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_extension_check() {
        assert!(has_allowed_extension("me.jpg"));
        assert!(has_allowed_extension("me.jpeg"));
        assert!(has_allowed_extension("Holiday Photo.PNG"));
        assert!(!has_allowed_extension("malware.exe"));
        assert!(!has_allowed_extension("archive.tar.gz"));
        assert!(!has_allowed_extension("noextension"));
    }

    #[test]
    fn test_resizes_to_fixed_canvas() {
        let upload = sample_png(40, 90);
        let stored = to_avatar_png(&upload).unwrap();

        let decoded = image::load_from_memory(&stored).unwrap();
        assert_eq!(decoded.width(), AVATAR_DIMENSION);
        assert_eq!(decoded.height(), AVATAR_DIMENSION);
    }

    #[test]
    fn test_output_is_png() {
        let upload = sample_png(10, 10);
        let stored = to_avatar_png(&upload).unwrap();

        assert_eq!(
            image::guess_format(&stored).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn test_rejects_oversized_upload() {
        let oversized = vec![0u8; MAX_AVATAR_BYTES + 1];
        assert!(matches!(
            to_avatar_png(&oversized),
            Err(AvatarError::TooLarge)
        ));
    }

    #[test]
    fn test_rejects_non_image_bytes() {
        let garbage = b"definitely not an image";
        assert!(matches!(
            to_avatar_png(garbage),
            Err(AvatarError::Decode(_))
        ));
    }
}
