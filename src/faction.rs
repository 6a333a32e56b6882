use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// The four agent populations sharing the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Human,
    Elf,
    Dwarf,
    Orc,
}

impl Faction {
    pub const ALL: [Faction; 4] = [Faction::Human, Faction::Elf, Faction::Dwarf, Faction::Orc];

    pub fn index(self) -> usize {
        match self {
            Faction::Human => 0,
            Faction::Elf => 1,
            Faction::Dwarf => 2,
            Faction::Orc => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Faction::Human => "human",
            Faction::Elf => "elf",
            Faction::Dwarf => "dwarf",
            Faction::Orc => "orc",
        }
    }

    /// RGB used by renderers for the faction's agents.
    pub fn agent_color(self) -> [u8; 3] {
        match self {
            Faction::Human => [255, 0, 0],
            Faction::Elf => [0, 255, 0],
            Faction::Dwarf => [139, 69, 19],
            Faction::Orc => [128, 128, 128],
        }
    }

    /// RGB used by renderers for settlement outlines.
    pub fn settlement_color(self) -> [u8; 3] {
        match self {
            Faction::Human => [255, 165, 0],
            Faction::Elf => [0, 255, 0],
            Faction::Dwarf => [139, 69, 19],
            Faction::Orc => [128, 0, 128],
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Faction {
    type Err = WorldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Faction::ALL
            .into_iter()
            .find(|faction| faction.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| WorldError::UnknownFaction(value.to_string()))
    }
}

/// Base attributes a faction hands to every agent at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactionStats {
    pub max_age: u32,
    pub strength: u32,
    pub speed: f64,
}

impl FactionStats {
    pub fn base(faction: Faction) -> Self {
        match faction {
            Faction::Human => Self {
                max_age: 500,
                strength: 5,
                speed: 1.0,
            },
            Faction::Elf => Self {
                max_age: 800,
                strength: 4,
                speed: 1.2,
            },
            Faction::Dwarf => Self {
                max_age: 600,
                strength: 6,
                speed: 0.8,
            },
            Faction::Orc => Self {
                max_age: 400,
                strength: 7,
                speed: 1.1,
            },
        }
    }
}

/// Whole movement sub-steps per tick for a fractional speed.
pub fn whole_steps(speed: f64) -> u32 {
    if speed.is_finite() && speed > 0.0 {
        speed.floor() as u32
    } else {
        0
    }
}

/// Per-faction values indexed by [`Faction::index`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactionTable<T> {
    entries: [T; 4],
}

impl<T> FactionTable<T> {
    pub fn from_fn(f: impl FnMut(Faction) -> T) -> Self {
        Self {
            entries: Faction::ALL.map(f),
        }
    }

    pub fn get(&self, faction: Faction) -> &T {
        &self.entries[faction.index()]
    }

    pub fn get_mut(&mut self, faction: Faction) -> &mut T {
        &mut self.entries[faction.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Faction, &T)> {
        Faction::ALL.into_iter().zip(self.entries.iter())
    }
}

impl<T: Default> Default for FactionTable<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}
