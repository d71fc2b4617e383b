use indexmap::IndexSet;
use std::fmt;

/// 8-bit RGB color used by the scene and the backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Fill used for every mark when no color binding applies
pub const DEFAULT_MARK_COLOR: Rgb = Rgb(0x69, 0xb3, 0xa2);

/// Ten-color categorical scheme, cycled when there are more categories
pub const CATEGORY10: [Rgb; 10] = [
    Rgb(0x1f, 0x77, 0xb4),
    Rgb(0xff, 0x7f, 0x0e),
    Rgb(0x2c, 0xa0, 0x2c),
    Rgb(0xd6, 0x27, 0x28),
    Rgb(0x94, 0x67, 0xbd),
    Rgb(0x8c, 0x56, 0x4b),
    Rgb(0xe3, 0x77, 0xc2),
    Rgb(0x7f, 0x7f, 0x7f),
    Rgb(0xbc, 0xbd, 0x22),
    Rgb(0x17, 0xbe, 0xcf),
];

/// Ordinal color scale: the n-th distinct value (first-seen order) gets the
/// n-th palette entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    domain: IndexSet<String>,
    palette: &'static [Rgb],
}

impl ColorScale {
    pub fn new<S: AsRef<str>>(values: &[S]) -> Self {
        Self::with_palette(values, &CATEGORY10)
    }

    pub fn with_palette<S: AsRef<str>>(values: &[S], palette: &'static [Rgb]) -> Self {
        Self {
            domain: values.iter().map(|v| v.as_ref().to_string()).collect(),
            palette,
        }
    }

    pub fn domain(&self) -> impl Iterator<Item = &str> {
        self.domain.iter().map(String::as_str)
    }

    /// Color for `value`; unseen values fall back to the default mark color
    pub fn color(&self, value: &str) -> Rgb {
        match (self.domain.get_index_of(value), self.palette.is_empty()) {
            (Some(idx), false) => self.palette[idx % self.palette.len()],
            _ => DEFAULT_MARK_COLOR,
        }
    }

    /// Legend entries in domain order
    pub fn entries(&self) -> Vec<(String, Rgb)> {
        self.domain.iter().map(|v| (v.clone(), self.color(v))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(Rgb::from_hex("#69b3a2"), Some(DEFAULT_MARK_COLOR));
        assert_eq!(DEFAULT_MARK_COLOR.to_string(), "#69b3a2");
        assert_eq!(Rgb::from_hex("69b3a2"), None);
        assert_eq!(Rgb::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_color_assignment_follows_first_seen_order() {
        let scale = ColorScale::new(&["gold", "silver", "gold", "bronze"]);
        assert_eq!(scale.domain().collect::<Vec<_>>(), vec!["gold", "silver", "bronze"]);
        assert_eq!(scale.color("gold"), CATEGORY10[0]);
        assert_eq!(scale.color("silver"), CATEGORY10[1]);
        assert_eq!(scale.color("bronze"), CATEGORY10[2]);
        assert_eq!(scale.color("platinum"), DEFAULT_MARK_COLOR);
    }

    #[test]
    fn test_palette_cycles() {
        let values: Vec<String> = (0..12).map(|i| format!("c{}", i)).collect();
        let scale = ColorScale::new(&values);
        assert_eq!(scale.color("c10"), CATEGORY10[0]);
        assert_eq!(scale.color("c11"), CATEGORY10[1]);
        assert_eq!(scale.entries().len(), 12);
    }
}
