//! Theme palettes: the two endpoints each theme maps luminosity onto.

use super::Theme;

/// Opaque RGB color (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as f64, matching the precision the luminosity ramp runs at.
    #[inline(always)]
    pub fn to_f64(self) -> [f64; 3] {
        [self.r as f64, self.g as f64, self.b as f64]
    }

    /// `#RRGGBB`, upper case.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Two-point gradient a theme maps luminosity onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    /// Output color for minimum luminosity
    pub dark_point: Rgb,
    /// Output color for maximum luminosity
    pub light_point: Rgb,
    /// Flip the ramp so light input lands on the dark end first
    pub invert_luminosity: bool,
}

/// Deep navy `#05080E` → bright blue `#58A6FF`, ramp inverted.
pub const DARK: ThemePalette = ThemePalette {
    dark_point: Rgb::new(5, 8, 14),
    light_point: Rgb::new(88, 166, 255),
    invert_luminosity: true,
};

/// Deep blue `#2A5D9C` → beige `#E6E4DD`.
pub const LIGHT: ThemePalette = ThemePalette {
    dark_point: Rgb::new(42, 93, 156),
    light_point: Rgb::new(230, 228, 221),
    invert_luminosity: false,
};

impl ThemePalette {
    pub fn for_theme(theme: Theme) -> &'static ThemePalette {
        match theme {
            Theme::Dark => &DARK,
            Theme::Light => &LIGHT,
        }
    }

    /// Swap the endpoints (light-mode outline drawings put ink on the dark end).
    pub fn swapped(self) -> Self {
        Self {
            dark_point: self.light_point,
            light_point: self.dark_point,
            ..self
        }
    }
}
