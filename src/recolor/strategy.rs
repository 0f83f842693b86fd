//! The two ways an image can follow the theme.
//!
//! - [`PixelRemap`]: full luminosity ramp, encoded to PNG
//! - [`ApproximateFilter`]: original image under a fixed CSS filter, for hosts
//!   that cannot read pixels back

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use super::ramp::remap_image;
use super::source::PixelAccess;
use super::RecolorError;
use crate::theme::Theme;

pub const PNG_MIME: &str = "image/png";

/// Output of a strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Processed image bytes
    Encoded { bytes: Vec<u8>, mime: &'static str },
    /// Show the original with this CSS `filter`
    Filtered(&'static str),
}

pub trait RecolorStrategy {
    fn name(&self) -> &'static str;
    fn render(&self, image: DynamicImage, theme: Theme) -> Result<Rendered, RecolorError>;
}

pub struct PixelRemap;

impl RecolorStrategy for PixelRemap {
    fn name(&self) -> &'static str {
        "pixel-remap"
    }

    fn render(&self, image: DynamicImage, theme: Theme) -> Result<Rendered, RecolorError> {
        let mut rgba = image.into_rgba8();
        remap_image(&mut rgba, theme.palette());

        let mut bytes = Vec::new();
        rgba.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| RecolorError {
                message: format!("Failed to encode PNG: {}", e),
                phase: "encode",
            })?;

        Ok(Rendered::Encoded { bytes, mime: PNG_MIME })
    }
}

pub struct ApproximateFilter;

impl RecolorStrategy for ApproximateFilter {
    fn name(&self) -> &'static str {
        "approximate-filter"
    }

    fn render(&self, _image: DynamicImage, theme: Theme) -> Result<Rendered, RecolorError> {
        Ok(Rendered::Filtered(css_filter(theme)))
    }
}

/// Coarse stand-in for the ramp: blue-tinted inversion for dark, warm wash for light.
pub fn css_filter(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => "invert(1) hue-rotate(180deg) saturate(0.3) brightness(0.8)",
        Theme::Light => "sepia(0.3) saturate(0.8) brightness(1.1)",
    }
}

pub fn select_strategy(access: PixelAccess) -> Box<dyn RecolorStrategy> {
    match access {
        PixelAccess::Granted => Box::new(PixelRemap),
        PixelAccess::Denied => Box::new(ApproximateFilter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn pixel_remap_encodes_recolored_png() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255])));
        let Rendered::Encoded { bytes, mime } = PixelRemap.render(img, Theme::Light).unwrap() else {
            panic!("expected encoded output");
        };
        assert_eq!(mime, PNG_MIME);

        let decoded = image::load_from_memory(&bytes).unwrap().into_rgba8();
        assert_eq!(decoded.get_pixel(1, 1), &Rgba([230, 228, 221, 255]));
    }

    #[test]
    fn filter_strategy_picks_per_theme_filter() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(1, 1));
        assert_eq!(
            ApproximateFilter.render(img.clone(), Theme::Dark).unwrap(),
            Rendered::Filtered("invert(1) hue-rotate(180deg) saturate(0.3) brightness(0.8)")
        );
        assert_eq!(
            ApproximateFilter.render(img, Theme::Light).unwrap(),
            Rendered::Filtered("sepia(0.3) saturate(0.8) brightness(1.1)")
        );
    }

    #[test]
    fn capability_selects_strategy() {
        assert_eq!(select_strategy(PixelAccess::Granted).name(), "pixel-remap");
        assert_eq!(select_strategy(PixelAccess::Denied).name(), "approximate-filter");
    }
}
