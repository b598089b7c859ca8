use crate::microscopy::raster::RgbaBuffer;
use crate::microscopy::segmentation::types::Region;

pub const GOLDEN_ANGLE_DEGREES: f64 = 137.508;

const MASK_SATURATION: f64 = 0.8;
const MASK_VALUE: f64 = 0.9;
const MASK_ALPHA: u8 = 200;

/// `hue` in degrees, `saturation` and `value` in `[0, 1]`.
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> [u8; 3] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = value * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = value - c;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    ]
}

/// Color of the `index`-th region. Consecutive indices land far apart on the hue wheel.
pub fn region_color(index: usize) -> [u8; 3] {
    let hue = (index as f64 * GOLDEN_ANGLE_DEGREES) % 360.0;
    hsv_to_rgb(hue, MASK_SATURATION, MASK_VALUE)
}

/// Overlay mask: background transparent, region pixels at alpha 200.
pub fn render_mask(width: usize, height: usize, regions: &[Region]) -> RgbaBuffer {
    let mut mask = RgbaBuffer::transparent(width, height);
    let out = mask.data_mut();
    for (index, region) in regions.iter().enumerate() {
        let [r, g, b] = region_color(index);
        for &i in &region.pixels {
            out[i * 4..i * 4 + 4].copy_from_slice(&[r, g, b, MASK_ALPHA]);
        }
    }
    mask
}
