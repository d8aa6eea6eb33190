use image::{RgbImage, imageops};
use tracing::debug;
use crate::{
    error::{FacesheetError, Result},
    types::BoundingBox,
};

/// Default cap on either side of a thumbnail
pub const THUMBNAIL_SIZE: u32 = 100;

/// Cut each box out of the color raster, in box order.
///
/// Every crop has exactly the box's size; any part of a box that lies past
/// the page edge comes out black.
pub fn crop_faces<'a>(
    pixels: &RgbImage,
    boxes: impl IntoIterator<Item = &'a BoundingBox>,
) -> Result<Vec<RgbImage>> {
    boxes
        .into_iter()
        .map(|bbox| crop_region(pixels, bbox))
        .collect()
}

fn crop_region(pixels: &RgbImage, bbox: &BoundingBox) -> Result<RgbImage> {
    if bbox.is_empty() {
        return Err(FacesheetError::EmptyCrop(*bbox));
    }

    let mut crop = RgbImage::new(bbox.width, bbox.height);
    let visible = imageops::crop_imm(pixels, bbox.x, bbox.y, bbox.width, bbox.height).to_image();
    imageops::replace(&mut crop, &visible, 0, 0);
    Ok(crop)
}

/// Shrink to fit within `max_dim` x `max_dim`, keeping the aspect ratio.
/// Images already inside the bound are returned unchanged; nothing is upscaled.
pub fn thumbnail(image: &RgbImage, max_dim: u32) -> Result<RgbImage> {
    if max_dim == 0 {
        return Err(FacesheetError::InvalidThumbnailSize);
    }

    let (width, height) = image.dimensions();
    if width <= max_dim && height <= max_dim {
        return Ok(image.clone());
    }

    let (new_width, new_height) = fit_within(width, height, max_dim);
    debug!("Thumbnail {}x{} -> {}x{}", width, height, new_width, new_height);
    Ok(imageops::thumbnail(image, new_width, new_height))
}

/// Thumbnail every crop, preserving order
pub fn thumbnail_all(images: &[RgbImage], max_dim: u32) -> Result<Vec<RgbImage>> {
    images.iter().map(|image| thumbnail(image, max_dim)).collect()
}

fn fit_within(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    let scale = (max_dim as f64 / width as f64).min(max_dim as f64 / height as f64);
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max_dim);
    (scaled(width), scaled(height))
}
