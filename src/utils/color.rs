use eframe::egui::Color32;
use std::fmt;

pub const DEFAULT_FOREGROUND: CanonicalColor = CanonicalColor::from_rgb(0xD1, 0xD1, 0xD1);
pub const DEFAULT_BACKGROUND: CanonicalColor = CanonicalColor::from_rgb(0x1F, 0x1F, 0x1F);

/// A color in canonical `#RRGGBB` form.
///
/// Only [`normalize_hex`] and [`CanonicalColor::from_rgb`] build one, so the
/// `Display` output is always seven characters with uppercase digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalColor {
    r: u8,
    g: u8,
    b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl CanonicalColor {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn rgb(&self) -> Rgb {
        Rgb(self.r, self.g, self.b)
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for CanonicalColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.0, self.1, self.2)
    }
}

/// Canonicalizes user or attribute input into `#RRGGBB`.
///
/// Accepts 3 or 6 hex digits with an optional leading `#`, in any case and
/// with surrounding whitespace. Anything else is `None`, which callers treat
/// as "keep the previous color".
pub fn normalize_hex(raw: &str) -> Option<CanonicalColor> {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    let digits = lowered.strip_prefix('#').unwrap_or(&lowered);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };

    hex_to_rgb(&format!("#{}", expanded))
        .map(|Rgb(r, g, b)| CanonicalColor::from_rgb(r, g, b))
}

/// Reads the digit pairs at offsets 1, 3 and 5 of a `#RRGGBB` string.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let pair = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
    };
    Some(Rgb(pair(1)?, pair(3)?, pair(5)?))
}

/// The hex/RGB text shown under the icon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HudReadout {
    pub hex: String,
    pub rgb: String,
}

impl HudReadout {
    pub fn show(&mut self, color: CanonicalColor) {
        self.hex = color.to_string();
        self.rgb = color.rgb().to_string();
    }
}

pub trait ColorExt {
    fn from_canonical(color: CanonicalColor) -> Self;
    fn to_canonical(&self) -> CanonicalColor;
}

impl ColorExt for Color32 {
    fn from_canonical(color: CanonicalColor) -> Self {
        let [r, g, b] = color.to_array();
        Color32::from_rgb(r, g, b)
    }

    fn to_canonical(&self) -> CanonicalColor {
        CanonicalColor::from_rgb(self.r(), self.g(), self.b())
    }
}
