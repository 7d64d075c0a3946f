use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultySettings {
    pub name: &'static str,
    pub skill_level: u8,
    pub depth: u32,
    pub elo: &'static str,
}

pub const DIFFICULTY_LEVELS: [DifficultySettings; 6] = [
    DifficultySettings { name: "Beginner", skill_level: 0, depth: 1, elo: "~800" },
    DifficultySettings { name: "Casual", skill_level: 5, depth: 5, elo: "~1200" },
    DifficultySettings { name: "Intermediate", skill_level: 10, depth: 10, elo: "~1600" },
    DifficultySettings { name: "Advanced", skill_level: 15, depth: 15, elo: "~2000" },
    DifficultySettings { name: "Expert", skill_level: 20, depth: 20, elo: "~2400" },
    DifficultySettings { name: "Maximum", skill_level: 20, depth: 25, elo: "~3500" },
];

/// Engine strength, levels 1 through 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    pub fn level(self) -> u8 { self.0 }

    pub fn settings(self) -> &'static DifficultySettings { &DIFFICULTY_LEVELS[usize::from(self.0 - 1)] }
}

impl Default for Difficulty {
    fn default() -> Self { Self(3) }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level).ok_or_else(|| format!("difficulty must be {}..={}, got {level}", Self::MIN, Self::MAX))
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> u8 { d.0 }
}
