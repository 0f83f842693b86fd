//! Offline theme conversion effects for post artwork.
//!
//! - `Standard`: filled duotone of the image's luminosity
//! - `Outline`: edge map only, like a technical line drawing
//! - `Mixed`: duotone fill with the edges inked on top
//!
//! Unlike the in-page ramp these operate on opaque RGB and truncate channel
//! values, matching the images already published on the site.

use image::imageops::{self, filter3x3};
use image::{DynamicImage, GrayImage, Rgb as Pixel, RgbImage};

use crate::theme::{Rgb, Theme, ThemePalette};

/// 3×3 Laplacian edge detector
const FIND_EDGES: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];
/// Center-weighted smoothing (normalized by its sum)
const SMOOTH: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Effect {
    #[default]
    Standard,
    Outline,
    Mixed,
}

/// Map a grayscale image onto the `from` → `to` gradient.
pub fn gradient_map(gray: &GrayImage, from: Rgb, to: Rgb) -> RgbImage {
    let from = from.to_f64();
    let to = to.to_f64();
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let l = gray.get_pixel(x, y)[0] as f64 / 255.0;
        let ch = |c: usize| (from[c] * (1.0 - l) + to[c] * l) as u8;
        Pixel([ch(0), ch(1), ch(2)])
    })
}

fn edges(gray: &GrayImage) -> GrayImage {
    filter3x3(gray, &FIND_EDGES)
}

/// Per-channel max ("lighter" blend)
fn lighter(a: &RgbImage, b: &RgbImage) -> RgbImage {
    RgbImage::from_fn(a.width(), a.height(), |x, y| {
        let (pa, pb) = (a.get_pixel(x, y), b.get_pixel(x, y));
        Pixel([pa[0].max(pb[0]), pa[1].max(pb[1]), pa[2].max(pb[2])])
    })
}

/// Multiply blend
fn multiply(a: &RgbImage, b: &RgbImage) -> RgbImage {
    RgbImage::from_fn(a.width(), a.height(), |x, y| {
        let (pa, pb) = (a.get_pixel(x, y), b.get_pixel(x, y));
        let m = |c: usize| (pa[c] as u16 * pb[c] as u16 / 255) as u8;
        Pixel([m(0), m(1), m(2)])
    })
}

/// Convert `img` to `theme`'s colors with the chosen effect.
///
/// `invert` flips the input first (handy for turning light artwork dark);
/// the outline effect ignores it since edges do not depend on polarity.
pub fn convert(img: &DynamicImage, theme: Theme, effect: Effect, invert: bool) -> RgbImage {
    let palette: &ThemePalette = theme.palette();
    let mut rgb = img.to_rgb8();
    if invert && effect != Effect::Outline {
        imageops::invert(&mut rgb);
    }
    let gray = imageops::grayscale(&rgb);

    match effect {
        Effect::Standard => gradient_map(&gray, palette.dark_point, palette.light_point),
        Effect::Outline => {
            // Dark: light lines on dark ground. Light: dark ink on light ground.
            let colors = match theme {
                Theme::Dark => *palette,
                Theme::Light => palette.swapped(),
            };
            gradient_map(&edges(&gray), colors.dark_point, colors.light_point)
        }
        Effect::Mixed => {
            let filled = gradient_map(&gray, palette.dark_point, palette.light_point);
            let soft_edges: GrayImage = filter3x3(&edges(&gray), &SMOOTH);
            match theme {
                Theme::Dark => {
                    let overlay = gradient_map(&soft_edges, Rgb::BLACK, palette.light_point);
                    lighter(&filled, &overlay)
                }
                Theme::Light => {
                    let overlay = gradient_map(&soft_edges, Rgb::WHITE, palette.dark_point);
                    multiply(&filled, &overlay)
                }
            }
        }
    }
}
