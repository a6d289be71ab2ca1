//! Profile picture variants: JPEG data URLs at two fixed sizes.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError};
use std::sync::Arc;

use crate::emoji::data_url;

/// A target size and JPEG quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub max: u32,
    pub quality: u8,
}

/// Small enough to live in the identity provider's photo field.
pub const THUMBNAIL: Variant = Variant {
    max: 32,
    quality: 70,
};

pub const DISPLAY: Variant = Variant {
    max: 256,
    quality: 85,
};

/// Both variants of one upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Resized {
    pub thumbnail: String,
    pub display: String,
}

/// Target dimensions: the longer side becomes `max`, the other keeps the
/// aspect ratio. Square images take the height branch.
pub fn target_size(width: u32, height: u32, max: u32) -> (u32, u32) {
    let scale = |short: u32, long: u32| {
        ((short as f64 * max as f64 / long as f64).round() as u32).max(1)
    };
    if width > height {
        (max, scale(height, width))
    } else {
        (scale(width, height), max)
    }
}

/// Resize and encode as a `data:image/jpeg;base64,…` URL.
pub fn to_data_url(img: &DynamicImage, variant: Variant) -> Result<String, ImageError> {
    let (width, height) = target_size(img.width(), img.height(), variant.max);
    // JPEG has no alpha channel
    let rgb = img.resize_exact(width, height, FilterType::Lanczos3).to_rgb8();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, variant.quality).encode_image(&rgb)?;
    Ok(data_url::encode(Some("image/jpeg"), &out))
}

/// Decode `bytes` and build both variants in parallel on the blocking pool.
pub async fn resize_variants(bytes: Vec<u8>) -> Result<Resized, ImageError> {
    let img = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(join_error)??;
    let img = Arc::new(img);

    let thumb_src = Arc::clone(&img);
    let (thumbnail, display) = tokio::join!(
        tokio::task::spawn_blocking(move || to_data_url(&thumb_src, THUMBNAIL)),
        tokio::task::spawn_blocking(move || to_data_url(&img, DISPLAY)),
    );

    Ok(Resized {
        thumbnail: thumbnail.map_err(join_error)??,
        display: display.map_err(join_error)??,
    })
}

fn join_error(e: tokio::task::JoinError) -> ImageError {
    ImageError::IoError(std::io::Error::other(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 90, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn dimensions(url: &str) -> (u32, u32) {
        let (mime, bytes) = data_url::decode(url).unwrap();
        assert_eq!(mime, "image/jpeg");
        let img = image::load_from_memory(&bytes).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn landscape_scales_width_to_max() {
        assert_eq!(target_size(1000, 500, 256), (256, 128));
        assert_eq!(target_size(300, 100, 32), (32, 11));
    }

    #[test]
    fn portrait_and_square_scale_height_to_max() {
        assert_eq!(target_size(500, 1000, 256), (128, 256));
        assert_eq!(target_size(40, 40, 32), (32, 32));
    }

    #[test]
    fn small_images_are_scaled_up() {
        assert_eq!(target_size(16, 8, 256), (256, 128));
    }

    #[test]
    fn short_side_never_collapses_to_zero() {
        assert_eq!(target_size(5000, 10, 32), (32, 1));
    }

    #[tokio::test]
    async fn builds_both_variants() {
        let resized = resize_variants(png(400, 200)).await.unwrap();
        assert_eq!(dimensions(&resized.thumbnail), (32, 16));
        assert_eq!(dimensions(&resized.display), (256, 128));
    }

    #[tokio::test]
    async fn garbage_is_rejected() {
        assert!(resize_variants(b"not an image".to_vec()).await.is_err());
    }
}
