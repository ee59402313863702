use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An RGB color with components in [0, 1], as authored (sRGB).
///
/// Serializes as a `#rrggbb` string so configs read like a color picker.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    BadLength(usize),
    BadDigit(char),
}

impl std::fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorParseError::BadLength(n) => {
                write!(f, "hex color must have 3 or 6 digits, got {n}")
            }
            ColorParseError::BadDigit(c) => write!(f, "invalid hex digit {c:?} in color"),
        }
    }
}

impl std::error::Error for ColorParseError {}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Parses `#rrggbb`, `rrggbb`, `#rgb` or `rgb`.
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let digits = s.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);

        let mut nibbles = Vec::with_capacity(6);
        for c in digits.chars() {
            let v = c.to_digit(16).ok_or(ColorParseError::BadDigit(c))?;
            nibbles.push(v as u8);
        }

        match nibbles.as_slice() {
            [r, g, b] => Ok(Self::from_rgb8(r * 17, g * 17, b * 17)),
            [r1, r0, g1, g0, b1, b0] => Ok(Self::from_rgb8(
                r1 * 16 + r0,
                g1 * 16 + g0,
                b1 * 16 + b0,
            )),
            other => Err(ColorParseError::BadLength(other.len())),
        }
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl std::str::FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, ColorParseError};

    #[test]
    fn parses_long_and_short_hex() {
        let c = Color::from_hex("#00aaff").expect("color");
        assert_eq!(c.to_rgb8(), [0x00, 0xaa, 0xff]);

        let c = Color::from_hex("9E3AC5").expect("color");
        assert_eq!(c.to_hex(), "#9e3ac5");

        let c = Color::from_hex("#0af").expect("color");
        assert_eq!(c.to_hex(), "#00aaff");
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(Color::from_hex("#12345"), Err(ColorParseError::BadLength(5)));
        assert_eq!(Color::from_hex("#00aagg"), Err(ColorParseError::BadDigit('g')));
        assert_eq!(Color::from_hex(""), Err(ColorParseError::BadLength(0)));
    }

    #[test]
    fn components_are_unit_range() {
        let c = Color::from_hex("#ff0000").expect("color");
        assert_eq!((c.r, c.g, c.b), (1.0, 0.0, 0.0));
    }
}
