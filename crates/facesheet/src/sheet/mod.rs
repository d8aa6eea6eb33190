pub mod annotate;
pub mod compositor;

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage, imageops};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_text_mut},
    rect::Rect,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FacesheetError, Result};

/// Shown in the first grid row when a matching document had no faces
pub const NO_FACES_MESSAGE: &str = "But there were no faces in that file!";

/// Grid geometry of a contact sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SheetLayout {
    /// Thumbnails per row
    #[schemars(range(min = 1))]
    pub columns: u32,
    /// Side of a square grid cell
    #[schemars(range(min = 1))]
    pub cell_size: u32,
    /// Height of the caption banner above the grid
    #[schemars(range(min = 1))]
    pub banner_height: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            columns: 5,
            cell_size: 100,
            banner_height: 50,
        }
    }
}

impl SheetLayout {
    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 || self.cell_size == 0 || self.banner_height == 0 {
            return Err(FacesheetError::InvalidLayout(format!(
                "columns, cell_size and banner_height must all be > 0 (got {}, {}, {})",
                self.columns, self.cell_size, self.banner_height
            )));
        }
        if self.columns.checked_mul(self.cell_size).is_none() {
            return Err(FacesheetError::InvalidLayout(format!(
                "{} columns of {}px overflow the sheet width",
                self.columns, self.cell_size
            )));
        }
        self.height(0)?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.columns.saturating_mul(self.cell_size)
    }

    /// `ceil(count / columns)`, but at least one row so the
    /// no-faces message has somewhere to go
    pub fn rows(&self, count: usize) -> u32 {
        let columns = self.columns.max(1) as usize;
        u32::try_from(count.div_ceil(columns).max(1)).unwrap_or(u32::MAX)
    }

    /// Banner plus grid height for `count` thumbnails
    pub fn height(&self, count: usize) -> Result<u32> {
        self.rows(count)
            .checked_mul(self.cell_size)
            .and_then(|grid| grid.checked_add(self.banner_height))
            .ok_or_else(|| {
                FacesheetError::InvalidLayout(format!(
                    "{} thumbnails in {}px rows overflow the sheet height",
                    count, self.cell_size
                ))
            })
    }
}

/// Colours and text size used when drawing a sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SheetStyle {
    pub background: [u8; 3],
    pub banner: [u8; 3],
    pub text: [u8; 3],
    #[schemars(range(min = 1.0, max = 200.0))]
    pub font_size: f32,
}

impl Default for SheetStyle {
    fn default() -> Self {
        Self {
            background: [0, 0, 0],
            banner: [255, 255, 255],
            text: [0, 0, 0],
            font_size: 30.0,
        }
    }
}

/// A finished contact sheet. Never modified after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSheet {
    image: RgbImage,
    thumbnail_count: usize,
}

impl ContactSheet {
    pub(crate) fn from_parts(image: RgbImage, thumbnail_count: usize) -> Self {
        Self {
            image,
            thumbnail_count,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Thumbnails placed on this sheet (summed over stacked sheets)
    pub fn thumbnail_count(&self) -> usize {
        self.thumbnail_count
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Write the sheet; format follows the file extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }
}

/// Lays thumbnails out on a fixed-width grid under a caption banner
pub struct SheetBuilder {
    layout: SheetLayout,
    style: SheetStyle,
    font: Option<FontVec>,
}

impl SheetBuilder {
    pub fn new(layout: SheetLayout, style: SheetStyle) -> Result<Self> {
        layout.validate()?;
        Ok(Self {
            layout,
            style,
            font: None,
        })
    }

    /// Use this font for captions
    pub fn with_font(mut self, font: FontVec) -> Self {
        self.font = Some(font);
        self
    }

    /// Parse TrueType/OpenType bytes into the caption font
    pub fn with_font_bytes(self, bytes: Vec<u8>) -> Result<Self> {
        let font = FontVec::try_from_vec(bytes).map_err(|e| FacesheetError::Font(e.to_string()))?;
        Ok(self.with_font(font))
    }

    /// Load the caption font from a file
    pub fn with_font_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        self.with_font_bytes(bytes)
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Build one sheet: banner with `caption`, then the thumbnails row-major,
    /// each pasted top-left-anchored in its cell.
    pub fn build_sheet(&self, thumbnails: &[RgbImage], caption: &str) -> Result<ContactSheet> {
        let layout = &self.layout;
        let width = layout.width();
        let height = layout.height(thumbnails.len())?;
        let mut canvas = RgbImage::from_pixel(width, height, Rgb(self.style.background));

        self.draw_banner(&mut canvas, 0, layout.banner_height, caption);
        if thumbnails.is_empty() {
            self.draw_banner(&mut canvas, layout.banner_height, layout.cell_size, NO_FACES_MESSAGE);
        }

        let (mut x, mut y) = (0u32, layout.banner_height);
        for thumbnail in thumbnails {
            imageops::replace(&mut canvas, thumbnail, x.into(), y.into());
            x += layout.cell_size;
            if x == width {
                x = 0;
                y += layout.cell_size;
            }
        }

        debug!(
            "Built {}x{} sheet with {} thumbnails",
            width,
            height,
            thumbnails.len()
        );
        Ok(ContactSheet::from_parts(canvas, thumbnails.len()))
    }

    fn draw_banner(&self, canvas: &mut RgbImage, top: u32, height: u32, text: &str) {
        let rect = Rect::at(0, top as i32).of_size(canvas.width(), height);
        draw_filled_rect_mut(canvas, rect, Rgb(self.style.banner));

        match &self.font {
            Some(font) => draw_text_mut(
                canvas,
                Rgb(self.style.text),
                5,
                top as i32 + 5,
                PxScale::from(self.style.font_size),
                font,
                text,
            ),
            None => debug!("No caption font loaded, skipping text '{}'", text),
        }
    }
}

impl Default for SheetBuilder {
    fn default() -> Self {
        Self {
            layout: SheetLayout::default(),
            style: SheetStyle::default(),
            font: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Solid thumbnail whose colour encodes its index
    fn thumb(index: u8, width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([index + 1, 100, 50]))
    }

    fn thumbs(count: u8) -> Vec<RgbImage> {
        (0..count).map(|i| thumb(i, 100, 100)).collect()
    }

    #[test]
    fn test_sheet_heights() {
        let builder = SheetBuilder::default();
        assert_eq!(builder.build_sheet(&[], "none").unwrap().height(), 150);
        assert_eq!(builder.build_sheet(&thumbs(5), "five").unwrap().height(), 150);
        assert_eq!(builder.build_sheet(&thumbs(6), "six").unwrap().height(), 250);
        assert_eq!(builder.build_sheet(&thumbs(10), "ten").unwrap().height(), 250);
        assert_eq!(builder.build_sheet(&thumbs(11), "eleven").unwrap().height(), 350);
        assert_eq!(builder.build_sheet(&thumbs(6), "six").unwrap().width(), 500);
    }

    #[test]
    fn test_grid_placement_row_major() {
        let sheet = SheetBuilder::default().build_sheet(&thumbs(7), "seven").unwrap();
        let image = sheet.image();
        assert_eq!(sheet.thumbnail_count(), 7);

        for i in 0..7u32 {
            let (x, y) = ((i % 5) * 100, 50 + (i / 5) * 100);
            assert_eq!(image.get_pixel(x, y), &Rgb([i as u8 + 1, 100, 50]), "thumbnail {i}");
            assert_eq!(image.get_pixel(x + 99, y + 99), &Rgb([i as u8 + 1, 100, 50]));
        }
        // unused cells stay background
        assert_eq!(image.get_pixel(200, 150), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(499, 249), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_small_thumbnail_anchored_top_left() {
        let sheet = SheetBuilder::default().build_sheet(&[thumb(0, 40, 60), thumb(1, 100, 30)], "x").unwrap();
        let image = sheet.image();
        assert_eq!(image.get_pixel(0, 50), &Rgb([1, 100, 50]));
        assert_eq!(image.get_pixel(39, 109), &Rgb([1, 100, 50]));
        assert_eq!(image.get_pixel(40, 50), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(0, 110), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(100, 50), &Rgb([2, 100, 50]));
        assert_eq!(image.get_pixel(100, 80), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_banner_and_empty_message_row() {
        let builder = SheetBuilder::default();
        let empty = builder.build_sheet(&[], "Results found in file a-0.png").unwrap();
        assert_eq!(empty.thumbnail_count(), 0);
        assert_eq!(empty.image().get_pixel(250, 10), &Rgb([255, 255, 255]));
        assert_eq!(empty.image().get_pixel(499, 149), &Rgb([255, 255, 255]));

        let full = builder.build_sheet(&thumbs(1), "one").unwrap();
        assert_eq!(full.image().get_pixel(250, 10), &Rgb([255, 255, 255]));
        assert_eq!(full.image().get_pixel(250, 60), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_invalid_layout_rejected() {
        let layout = SheetLayout { columns: 0, ..SheetLayout::default() };
        assert!(SheetBuilder::new(layout, SheetStyle::default()).is_err());
    }

    #[test]
    fn test_bad_font_bytes_rejected() {
        let result = SheetBuilder::default().with_font_bytes(b"not a font".to_vec());
        assert!(matches!(result, Err(FacesheetError::Font(_))));
    }

    #[test]
    fn test_custom_layout_geometry() {
        let layout = SheetLayout { columns: 3, cell_size: 40, banner_height: 20 };
        assert_eq!(layout.width(), 120);
        assert_eq!(layout.rows(0), 1);
        assert_eq!(layout.rows(3), 1);
        assert_eq!(layout.rows(4), 2);
        assert_eq!(layout.height(7).unwrap(), 140);
    }

    #[test]
    fn test_overflowing_layout_rejected() {
        let wide = SheetLayout { columns: u32::MAX, cell_size: 2, banner_height: 50 };
        assert!(matches!(wide.validate(), Err(FacesheetError::InvalidLayout(_))));

        let tall = SheetLayout { columns: 1, cell_size: u32::MAX, banner_height: 50 };
        assert!(SheetBuilder::new(tall, SheetStyle::default()).is_err());

        let layout = SheetLayout { columns: 1, cell_size: u32::MAX / 2, banner_height: 1 };
        assert!(layout.validate().is_ok());
        assert!(layout.height(3).is_err());
    }

    const FIXTURE_FONT: &[u8] =
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSansMono.ttf"));

    fn dark_pixels(image: &RgbImage, rows: std::ops::Range<u32>) -> usize {
        rows.flat_map(|y| (0..image.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| image.get_pixel(x, y)[0] < 128)
            .count()
    }

    #[test]
    fn test_caption_and_no_faces_text_drawn() {
        let builder = SheetBuilder::default()
            .with_font_bytes(FIXTURE_FONT.to_vec())
            .unwrap();
        assert!(builder.has_font());

        let sheet = builder.build_sheet(&[], "Results found in file a-0.png").unwrap();
        let image = sheet.image();

        // caption in [0, 50), no-faces message in [50, 150)
        assert!(dark_pixels(image, 0..50) > 100);
        assert!(dark_pixels(image, 50..150) > 100);
        // both start 5px below their banner's top edge
        assert_eq!(dark_pixels(image, 0..5), 0);
        assert_eq!(dark_pixels(image, 50..55), 0);
    }

    #[test]
    fn test_caption_only_when_thumbnails_present() {
        let builder = SheetBuilder::default()
            .with_font_bytes(FIXTURE_FONT.to_vec())
            .unwrap();
        let sheet = builder
            .build_sheet(&[RgbImage::from_pixel(100, 100, Rgb([200, 200, 200]))], "one")
            .unwrap();
        assert!(dark_pixels(sheet.image(), 0..50) > 0);
        assert_eq!(dark_pixels(sheet.image(), 50..150), 400 * 100);
    }
}
