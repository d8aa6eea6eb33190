use image::{RgbImage, imageops};

use super::ContactSheet;

/// Place `below` under `top` on a new canvas; neither input is touched
pub fn stack(top: &ContactSheet, below: &ContactSheet) -> ContactSheet {
    let width = top.width().max(below.width());
    let mut canvas = RgbImage::new(width, top.height() + below.height());

    imageops::replace(&mut canvas, top.image(), 0, 0);
    imageops::replace(&mut canvas, below.image(), 0, i64::from(top.height()));

    ContactSheet::from_parts(canvas, top.thumbnail_count() + below.thumbnail_count())
}

/// Left fold in iteration order: the first sheet seeds, each next one goes below.
/// `None` when there is nothing to stack.
pub fn stack_all<I>(sheets: I) -> Option<ContactSheet>
where
    I: IntoIterator<Item = ContactSheet>,
{
    sheets.into_iter().reduce(|acc, next| stack(&acc, &next))
}
