/// A colour, expressed in RGB or CMYK colour spaces
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Colour {
    /// DeviceRGB colour; r, g, b, range from 0.0 to 1.0
    RGB { r: f32, g: f32, b: f32 },
    /// DeviceCMYK colour; c, m, y, and k range from 0.0 to 1.0
    CMYK { c: f32, m: f32, y: f32, k: f32 },
    /// DeviceGray colour; g ranges from 0.0 to 1.0
    Grey { g: f32 },
}

impl Colour {
    /// Create a new colour in the RGB space. r, g, and b range from 0.0 to 1.0
    pub const fn new_rgb(r: f32, g: f32, b: f32) -> Colour {
        Colour::RGB { r, g, b }
    }

    /// Create a new colour in the RGB space. r, g, and b range from 0 to 255
    pub const fn new_rgb_bytes(r: u8, g: u8, b: u8) -> Colour {
        Colour::RGB {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parse a `#rrggbb` hex string, as used in letterhead configuration
    pub fn from_hex(hex: &str) -> Option<Colour> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Colour::new_rgb_bytes(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl From<(u8, u8, u8)> for Colour {
    fn from(c: (u8, u8, u8)) -> Self {
        Colour::new_rgb_bytes(c.0, c.1, c.2)
    }
}

/// A list of pre-defined colour constants
pub mod colours {
    use super::*;

    pub const BLACK: Colour = Colour::Grey { g: 0.0 };
    pub const WHITE: Colour = Colour::Grey { g: 1.0 };

    /// Brand blue used for headings, the table header and its border
    pub const PRIMARY: Colour = Colour::new_rgb_bytes(0x1a, 0x56, 0xdb);
    /// Dark teal for section titles
    pub const SECONDARY: Colour = Colour::new_rgb_bytes(0x06, 0x4e, 0x3b);
    pub const MUTED: Colour = Colour::new_rgb_bytes(0x66, 0x66, 0x66);
    pub const FAINT: Colour = Colour::new_rgb_bytes(0x99, 0x99, 0x99);
    pub const RULE: Colour = Colour::new_rgb_bytes(200, 200, 200);
    pub const STRIPE: Colour = Colour::new_rgb_bytes(240, 240, 240);
    pub const HIGHLIGHT: Colour = Colour::new_rgb_bytes(230, 240, 255);
    pub const TOTAL_FILL: Colour = Colour::new_rgb_bytes(240, 249, 255);
    pub const TOTAL_STROKE: Colour = Colour::new_rgb_bytes(59, 130, 246);
    pub const BALANCE_FILL: Colour = Colour::new_rgb_bytes(254, 226, 226);
    pub const BALANCE_STROKE: Colour = Colour::new_rgb_bytes(239, 68, 68);
    pub const BALANCE_TEXT: Colour = Colour::new_rgb_bytes(185, 28, 28);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colours() {
        assert_eq!(Colour::from_hex("#1a56db"), Some(colours::PRIMARY));
        assert_eq!(Colour::from_hex("064e3b"), Some(colours::SECONDARY));
        assert_eq!(Colour::from_hex("#12345"), None);
        assert_eq!(Colour::from_hex("#zz0000"), None);
    }
}
