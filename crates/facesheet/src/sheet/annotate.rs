use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use tracing::debug;

use crate::types::BoundingBox;

const OUTLINE_THICKNESS: u32 = 3;
const OUTLINE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Copy of `pixels` with a white outline around every box, for eyeballing
/// what the face filter kept.
pub fn annotate_faces<'a>(
    pixels: &RgbImage,
    boxes: impl IntoIterator<Item = &'a BoundingBox>,
) -> RgbImage {
    let mut annotated = pixels.clone();
    let (width, height) = annotated.dimensions();

    for bbox in boxes {
        // outline spans x..=x+w like the crop rectangle it marks
        for t in 0..OUTLINE_THICKNESS {
            let (left, top) = (bbox.x.saturating_add(t), bbox.y.saturating_add(t));
            let (Ok(rect_left), Ok(rect_top)) = (i32::try_from(left), i32::try_from(top)) else {
                debug!("Skipping outline of {:?}, outside drawable range", bbox);
                break;
            };
            if left >= width || top >= height {
                break;
            }

            // edges past the image are clipped, so cap the extent one pixel beyond it
            let inner_w = bbox.width.saturating_add(1).saturating_sub(2 * t).min(width - left + 1);
            let inner_h = bbox.height.saturating_add(1).saturating_sub(2 * t).min(height - top + 1);
            if inner_w > 0 && inner_h > 0 {
                let rect = Rect::at(rect_left, rect_top).of_size(inner_w, inner_h);
                draw_hollow_rect_mut(&mut annotated, rect, OUTLINE_COLOR);
            }
        }
    }

    annotated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_drawn_on_copy() {
        let pixels = RgbImage::new(100, 100);
        let bbox = BoundingBox::new(10, 10, 50, 40).unwrap();
        let annotated = annotate_faces(&pixels, [&bbox]);

        assert_eq!(annotated.get_pixel(10, 10), &OUTLINE_COLOR);
        assert_eq!(annotated.get_pixel(12, 30), &OUTLINE_COLOR);
        assert_eq!(annotated.get_pixel(60, 50), &OUTLINE_COLOR);
        assert_eq!(annotated.get_pixel(13, 30), &Rgb([0, 0, 0]));
        assert_eq!(annotated.get_pixel(35, 30), &Rgb([0, 0, 0]));
        // source untouched
        assert_eq!(pixels.get_pixel(10, 10), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_boxes_at_coordinate_limits_do_not_panic() {
        let pixels = RgbImage::new(20, 20);
        let huge = BoundingBox::new(u32::MAX - 1, u32::MAX - 1, u32::MAX, u32::MAX).unwrap();
        let wide = BoundingBox::new(5, 5, u32::MAX, u32::MAX).unwrap();
        let annotated = annotate_faces(&pixels, [&huge, &wide]);

        assert_eq!(annotated.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(annotated.get_pixel(5, 5), &OUTLINE_COLOR);
        assert_eq!(annotated.get_pixel(19, 7), &OUTLINE_COLOR);
    }
}
