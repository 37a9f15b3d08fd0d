/// Dominant-color estimation over a pixel region.
use image::{DynamicImage, GenericImageView};

use crate::layout::geometry::BoundingBox;
use crate::layout::types::ColorInfo;

/// Mean RGB over the region, truncated to integers. Returns the neutral
/// gray sentinel when the region falls outside the image or has zero
/// area; sampling never fails the caller.
pub fn sample_dominant(image: &DynamicImage, bbox: &BoundingBox) -> ColorInfo {
    let (iw, ih) = (image.width() as i64, image.height() as i64);
    let (x, y, w, h) = (
        bbox.x as i64,
        bbox.y as i64,
        bbox.width as i64,
        bbox.height as i64,
    );

    if x < 0 || y < 0 || w <= 0 || h <= 0 || x + w > iw || y + h > ih {
        tracing::debug!(?bbox, image_w = iw, image_h = ih, "invalid sample region");
        return ColorInfo::neutral_gray();
    }

    let mut sum_r = 0u64;
    let mut sum_g = 0u64;
    let mut sum_b = 0u64;
    for py in y..y + h {
        for px in x..x + w {
            let p = image.get_pixel(px as u32, py as u32);
            sum_r += p[0] as u64;
            sum_g += p[1] as u64;
            sum_b += p[2] as u64;
        }
    }

    let n = (w * h) as u64;
    let (r, g, b) = ((sum_r / n) as u8, (sum_g / n) as u8, (sum_b / n) as u8);

    ColorInfo {
        dominant_rgb: format!("rgb({r}, {g}, {b})"),
        dominant_hex: format!("#{r:02x}{g:02x}{b:02x}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn solid_region_returns_that_color() {
        let img = solid(20, 20, [255, 0, 0]);
        let info = sample_dominant(&img, &BoundingBox::new(2, 2, 10, 10));
        assert_eq!(info.dominant_rgb, "rgb(255, 0, 0)");
        assert_eq!(info.dominant_hex, "#ff0000");
    }

    #[test]
    fn out_of_bounds_region_returns_gray_sentinel() {
        let img = solid(10, 10, [0, 0, 255]);
        let info = sample_dominant(&img, &BoundingBox::new(5, 5, 20, 20));
        assert_eq!(info, ColorInfo::neutral_gray());
        assert_eq!(info.dominant_hex, "#808080");
    }

    #[test]
    fn zero_area_region_returns_gray_sentinel() {
        let img = solid(10, 10, [0, 255, 0]);
        let info = sample_dominant(&img, &BoundingBox::new(3, 3, 0, 5));
        assert_eq!(info, ColorInfo::neutral_gray());
    }

    #[test]
    fn negative_origin_returns_gray_sentinel() {
        let img = solid(10, 10, [0, 255, 0]);
        let info = sample_dominant(&img, &BoundingBox::new(-1, 0, 5, 5));
        assert_eq!(info, ColorInfo::neutral_gray());
    }
}
