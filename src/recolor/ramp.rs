//! Luminosity ramp: map each pixel's perceived brightness onto a two-color
//! gradient.
//!
//!   l   = (0.2126·R + 0.7152·G + 0.0722·B) / 255      (Rec. 709)
//!   l   = 1 - l                                        if the palette inverts
//!   out = dark·(1 - l) + light·l
//!
//! Channels are stored the way a canvas byte buffer stores them: rounded to
//! nearest (ties to even) and clamped to 0..=255. Alpha is never written and
//! fully transparent pixels are skipped.

use image::RgbaImage;
use rayon::prelude::*;

use crate::theme::ThemePalette;

/// Rec. 709 luma weights
pub const REC709: [f64; 3] = [0.2126, 0.7152, 0.0722];

const INV_255: f64 = 1.0 / 255.0;

/// Normalized luminosity in [0, 1].
#[inline(always)]
pub fn luminosity(r: u8, g: u8, b: u8) -> f64 {
    (REC709[0] * r as f64 + REC709[1] * g as f64 + REC709[2] * b as f64) * INV_255
}

#[inline(always)]
fn store_channel(v: f64) -> u8 {
    v.round_ties_even().clamp(0.0, 255.0) as u8
}

/// Remap one RGBA pixel in place.
#[inline]
pub fn remap_pixel(px: &mut [u8], palette: &ThemePalette) {
    if px[3] == 0 {
        return;
    }

    let mut l = luminosity(px[0], px[1], px[2]);
    if palette.invert_luminosity {
        l = 1.0 - l;
    }

    let dark = palette.dark_point.to_f64();
    let light = palette.light_point.to_f64();
    for c in 0..3 {
        px[c] = store_channel(dark[c] * (1.0 - l) + light[c] * l);
    }
}

/// Remap a tightly packed RGBA buffer. Pixels are independent, so the buffer
/// is split across the rayon pool.
pub fn remap_rgba(buf: &mut [u8], palette: &ThemePalette) {
    buf.par_chunks_exact_mut(4)
        .for_each(|px| remap_pixel(px, palette));
}

pub fn remap_image(img: &mut RgbaImage, palette: &ThemePalette) {
    remap_rgba(img, palette);
}
