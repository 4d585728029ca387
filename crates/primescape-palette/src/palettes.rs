use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Named colour palettes offered by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Palette {
    /// Perceptually uniform, dark to light.
    Magma,
    /// Perceptually uniform, black through red to yellow.
    Inferno,
    /// Perceptually uniform, blue through red to yellow.
    Plasma,
    /// Perceptually uniform, purple through green to yellow.
    Viridis,
    /// Colour-vision-deficiency friendly variant of viridis.
    Cividis,
    /// Rainbow-like high contrast map.
    #[default]
    Turbo,
    /// Ten categorical colours.
    Category10,
    /// Eight dark categorical colours.
    Dark2,
}

impl Palette {
    /// Every palette, in declaration order.
    pub const ALL: [Palette; 8] = [
        Palette::Magma,
        Palette::Inferno,
        Palette::Plasma,
        Palette::Viridis,
        Palette::Cividis,
        Palette::Turbo,
        Palette::Category10,
        Palette::Dark2,
    ];

    /// Resolves a palette case-insensitively; unknown names fall back to Turbo.
    pub fn from_name(name: &str) -> Self {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|palette| palette.name().eq_ignore_ascii_case(wanted))
            .unwrap_or_default()
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Palette::Magma => "Magma",
            Palette::Inferno => "Inferno",
            Palette::Plasma => "Plasma",
            Palette::Viridis => "Viridis",
            Palette::Cividis => "Cividis",
            Palette::Turbo => "Turbo",
            Palette::Category10 => "Category10",
            Palette::Dark2 => "Dark2",
        }
    }

    /// Largest number of colours the palette offers.
    pub fn capacity(&self) -> usize {
        match self {
            Palette::Category10 => 10,
            Palette::Dark2 => 8,
            _ => 256,
        }
    }
}

impl Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Categorical factor labels `"0"` to `"n-1"` for a categorical colour mapper.
pub fn color_factors(bucket_count: usize) -> Vec<String> {
    (0..bucket_count).map(|index| index.to_string()).collect()
}
