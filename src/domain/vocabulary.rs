//! Vocabularies
//!
//! Fixed category and level sets used by the plant, decoration and container
//! catalogs. Each value has a stable integer code and a display name;
//! lookups by code never panic.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident = $code:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every value, in code order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(self) -> i32 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Look up a value by its code
            pub fn from_code(code: i32) -> Option<Self> {
                Self::ALL.iter().copied().find(|value| value.code() == code)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl From<$name> for VocabularyEntry {
            fn from(value: $name) -> Self {
                VocabularyEntry {
                    code: value.code(),
                    name: value.name(),
                }
            }
        }
    };
}

/// Code/name pair as exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VocabularyEntry {
    pub code: i32,
    pub name: &'static str,
}

vocabulary! {
    /// Light a plant needs
    LightLevel {
        Shade = 1 => "Shade",
        PartialShade = 2 => "Partial shade",
        BrightIndirect = 3 => "Bright indirect",
        DirectSun = 4 => "Direct sun",
    }
}

vocabulary! {
    /// Watering a plant needs
    WaterLevel {
        Low = 1 => "Low",
        Moderate = 2 => "Moderate",
        High = 3 => "High",
    }
}

vocabulary! {
    /// Ambient humidity a plant needs
    HumidityLevel {
        Low = 1 => "Low",
        Moderate = 2 => "Moderate",
        High = 3 => "High",
    }
}

vocabulary! {
    /// Physical size of a plant, decoration or container
    ItemSize {
        Small = 1 => "Small",
        Medium = 2 => "Medium",
        Large = 3 => "Large",
    }
}

vocabulary! {
    DecorationCategory {
        Stone = 1 => "Stone",
        Wood = 2 => "Wood",
        Moss = 3 => "Moss",
        Figurine = 4 => "Figurine",
        Other = 5 => "Other",
    }
}

/// Which vocabulary a request refers to, by URL slug
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabularyKind {
    LightLevels,
    WaterLevels,
    HumidityLevels,
    ItemSizes,
    DecorationCategories,
}

impl VocabularyKind {
    pub const ALL: &'static [VocabularyKind] = &[
        VocabularyKind::LightLevels,
        VocabularyKind::WaterLevels,
        VocabularyKind::HumidityLevels,
        VocabularyKind::ItemSizes,
        VocabularyKind::DecorationCategories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VocabularyKind::LightLevels => "light-levels",
            VocabularyKind::WaterLevels => "water-levels",
            VocabularyKind::HumidityLevels => "humidity-levels",
            VocabularyKind::ItemSizes => "item-sizes",
            VocabularyKind::DecorationCategories => "decoration-categories",
        }
    }

    /// All entries of this vocabulary, in code order
    pub fn entries(&self) -> Vec<VocabularyEntry> {
        match self {
            VocabularyKind::LightLevels => LightLevel::ALL.iter().map(|&v| v.into()).collect(),
            VocabularyKind::WaterLevels => WaterLevel::ALL.iter().map(|&v| v.into()).collect(),
            VocabularyKind::HumidityLevels => {
                HumidityLevel::ALL.iter().map(|&v| v.into()).collect()
            }
            VocabularyKind::ItemSizes => ItemSize::ALL.iter().map(|&v| v.into()).collect(),
            VocabularyKind::DecorationCategories => {
                DecorationCategory::ALL.iter().map(|&v| v.into()).collect()
            }
        }
    }

    pub fn lookup(&self, code: i32) -> Option<VocabularyEntry> {
        match self {
            VocabularyKind::LightLevels => LightLevel::from_code(code).map(Into::into),
            VocabularyKind::WaterLevels => WaterLevel::from_code(code).map(Into::into),
            VocabularyKind::HumidityLevels => HumidityLevel::from_code(code).map(Into::into),
            VocabularyKind::ItemSizes => ItemSize::from_code(code).map(Into::into),
            VocabularyKind::DecorationCategories => {
                DecorationCategory::from_code(code).map(Into::into)
            }
        }
    }
}

impl fmt::Display for VocabularyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown vocabulary slug
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown vocabulary: {0}")]
pub struct UnknownVocabulary(pub String);

impl FromStr for VocabularyKind {
    type Err = UnknownVocabulary;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownVocabulary(s.to_string()))
    }
}
