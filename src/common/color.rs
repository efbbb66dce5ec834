//! Color type conversions and utilities
//!
//! Provides type-safe color handling with conversions between:
//! - Hex strings (#RRGGBB or #AARRGGBB format)
//! - ARGB32 values (u32)
//! - egui colors, with an optional opacity override

/// Hex color in ARGB32 format (#AARRGGBB)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor(u32);

impl HexColor {
    /// Parse hex color string supporting multiple formats:
    /// - 6 digits: RRGGBB (full opacity assumed, becomes FFRRGGBB)
    /// - 8 digits: AARRGGBB (explicit alpha)
    /// - Optional '#' prefix supported but not required
    pub fn parse(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 && hex.len() != 8 {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;

        let argb = if hex.len() == 6 {
            0xFF_00_00_00 | value
        } else {
            value
        };

        Some(Self(argb))
    }

    /// Get raw ARGB32 value
    #[cfg(test)]
    pub fn argb32(self) -> u32 {
        self.0
    }

    fn channels(self) -> [u8; 4] {
        let [a, r, g, b] = self.0.to_be_bytes();
        [r, g, b, a]
    }

    pub fn to_color32(self) -> egui::Color32 {
        let [r, g, b, a] = self.channels();
        egui::Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    /// Same color with the alpha channel replaced
    pub fn with_opacity(self, opacity: Opacity) -> egui::Color32 {
        let [r, g, b, _] = self.channels();
        egui::Color32::from_rgba_unmultiplied(r, g, b, opacity.alpha())
    }
}

/// Convert HEX string to egui::Color32, white if the string is not a color
pub fn hex_to_color32(hex: &str) -> egui::Color32 {
    HexColor::parse(hex)
        .map(HexColor::to_color32)
        .unwrap_or(egui::Color32::WHITE)
}

/// Opacity as percentage (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opacity(u8);

impl Opacity {
    /// Create from percentage (clamped to 0-100)
    pub fn from_percent(percent: u8) -> Self {
        Self(percent.min(100))
    }

    /// Get opacity as percentage (0-100)
    #[cfg(test)]
    pub fn percent(self) -> u8 {
        self.0
    }

    /// Opacity as an 8-bit alpha value
    pub fn alpha(self) -> u8 {
        (self.0 as f32 / 100.0 * 255.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_parsing() {
        // 8-digit format (AARRGGBB)
        assert_eq!(HexColor::parse("#7FFF0000"), Some(HexColor(0x7FFF0000)));
        assert_eq!(HexColor::parse("7FFF0000"), Some(HexColor(0x7FFF0000)));

        // 6-digit format (RRGGBB) - should prepend FF for full opacity
        assert_eq!(HexColor::parse("#FF4444"), Some(HexColor(0xFFFF4444)));
        assert_eq!(HexColor::parse("#1bc454"), Some(HexColor(0xFF1BC454)));
        assert_eq!(HexColor::parse("00FF44").map(HexColor::argb32), Some(0xFF00FF44));

        // Invalid
        assert_eq!(HexColor::parse("invalid"), None);
        assert_eq!(HexColor::parse(""), None);
        assert_eq!(HexColor::parse("#FFF"), None);
    }

    #[test]
    fn test_to_color32() {
        let color = HexColor::parse("#4A9EFF").unwrap().to_color32();
        assert_eq!(color, egui::Color32::from_rgb(0x4A, 0x9E, 0xFF));
        assert_eq!(hex_to_color32("nope"), egui::Color32::WHITE);
    }

    #[test]
    fn test_with_opacity() {
        let color = HexColor::parse("#1E1E1E")
            .unwrap()
            .with_opacity(Opacity::from_percent(80));
        assert_eq!(color.a(), 204);
    }

    #[test]
    fn test_opacity_percent() {
        let opacity = Opacity::from_percent(75);
        assert_eq!(opacity.percent(), 75);

        let opacity = Opacity::from_percent(150); // clamped
        assert_eq!(opacity.percent(), 100);
        assert_eq!(opacity.alpha(), 255);
        assert_eq!(Opacity::from_percent(0).alpha(), 0);
    }
}
