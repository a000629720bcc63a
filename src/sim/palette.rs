//! Ball color palette
//!
//! The order of the palette matters: level `n` uses its first `num_colors`
//! entries.

use serde::{Deserialize, Serialize};

/// One palette entry: the pairing key and the display color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColor {
    pub key: String,
    /// 0xRRGGBB
    pub hex: u32,
}

impl PaletteColor {
    pub fn new(key: impl Into<String>, hex: u32) -> Self {
        Self {
            key: key.into(),
            hex,
        }
    }

    /// CSS color string (`#rrggbb`)
    pub fn css(&self) -> String {
        format!("#{:06x}", self.hex & 0xff_ffff)
    }
}

/// Ordered list of colors available to the generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    colors: Vec<PaletteColor>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(vec![
            PaletteColor::new("red", 0xe74c3c),
            PaletteColor::new("blue", 0x3498db),
            PaletteColor::new("green", 0x2ecc71),
            PaletteColor::new("orange", 0xf39c12),
            PaletteColor::new("purple", 0x9b59b6),
        ])
    }
}

impl Palette {
    pub fn new(colors: Vec<PaletteColor>) -> Self {
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PaletteColor> {
        self.colors.get(index)
    }

    /// Look up a color by its pairing key
    pub fn find(&self, key: &str) -> Option<&PaletteColor> {
        self.colors.iter().find(|c| c.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaletteColor> {
        self.colors.iter()
    }
}
