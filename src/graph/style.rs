use serde::{Deserialize, Serialize};

const SIZE_SCALE: f32 = 6.0;

/// How connected a note is. Drives node mass in the simulation and
/// sizing in the viewer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Main,
    Secondary,
    #[default]
    Isolated,
}

impl Classification {
    pub fn for_degree(degree: usize, main_threshold: usize) -> Self {
        if degree >= main_threshold.max(1) {
            Self::Main
        } else if degree >= 1 {
            Self::Secondary
        } else {
            Self::Isolated
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Secondary => "secondary",
            Self::Isolated => "isolated",
        }
    }
}

/// Degree-banded palette slot. Bands are ordered by degree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBand {
    Isolated,
    Low,
    Medium,
    High,
}

impl ColorBand {
    pub fn for_degree(degree: usize) -> Self {
        match degree {
            0 => Self::Isolated,
            1..=4 => Self::Low,
            5..=9 => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            Self::Isolated => [120, 128, 140],
            Self::Low => [84, 160, 214],
            Self::Medium => [150, 120, 220],
            Self::High => [236, 112, 84],
        }
    }
}

/// Sub-linear size so hubs stand out without dominating the layout.
pub fn node_size(degree: usize) -> f32 {
    ((degree as f32 + 1.0).ln() * SIZE_SCALE).max(1.0)
}
