//! Scenario files: an ASCII level plus the character and hostiles on it.
//!
//! Scenarios are RON documents. The map is drawn with:
//!
//! | glyph | terrain          |
//! |-------|------------------|
//! | `#`   | wall             |
//! | `.`   | floor            |
//! | `@`   | floor, start     |
//! | `:`   | rubble           |
//! | `~`   | chasm            |
//! | `^`   | floor, trap      |
//! | `+`   | closed door      |
//! | `'`   | open door        |
//! | `>`   | down stairs      |
//! | `<`   | up stairs        |
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use automaton::{
    Alertness, Appraisal, Cell, Light, LightKind, PackItem, Skill, SlotKind, Species, Stance,
    Terrain,
};
use serde::{Deserialize, Serialize};

const BUILTIN: &str = include_str!("../scenarios/cave.ron");

/// Starting character.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSpec {
    pub hp: u32,
    pub max_hp: u32,
    pub depth: u32,
    pub min_depth: u32,
    pub food: u32,
    pub perception: i32,
    pub skills: [u32; Skill::COUNT],
    pub unspent_exp: u32,
    pub weapon: bool,
    pub bow: bool,
    pub arrows: u32,
    pub light: Option<Light>,
    pub pack: Vec<PackItem>,
}

impl Default for PlayerSpec {
    fn default() -> Self {
        Self {
            hp: 30,
            max_hp: 30,
            depth: 1,
            min_depth: 1,
            food: 4000,
            perception: 4,
            skills: [0; Skill::COUNT],
            unspent_exp: 0,
            weapon: true,
            bow: false,
            arrows: 0,
            light: Some(Light {
                kind: LightKind::Torch,
                fuel: 3000,
            }),
            pack: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostileSpec {
    pub at: (i32, i32),
    #[serde(default)]
    pub hp: u32,
    #[serde(default)]
    pub alertness: Alertness,
    #[serde(default)]
    pub stance: Stance,
    pub species: Species,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub at: (i32, i32),
    pub value: i32,
    #[serde(default)]
    pub slot: SlotKind,
}

impl ItemSpec {
    pub fn cell(&self) -> Cell {
        Cell::new(self.at.0, self.at.1)
    }

    pub fn appraisal(&self) -> Appraisal {
        Appraisal {
            value: self.value,
            slot: self.slot,
        }
    }
}

impl HostileSpec {
    pub fn cell(&self) -> Cell {
        Cell::new(self.at.0, self.at.1)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub rows: Vec<String>,
    /// Chebyshev radius the character sees.
    #[serde(default = "default_sight_radius")]
    pub sight_radius: i32,
    #[serde(default)]
    pub player: PlayerSpec,
    #[serde(default)]
    pub hostiles: Vec<HostileSpec>,
    #[serde(default)]
    pub items: Vec<ItemSpec>,
}

fn default_sight_radius() -> i32 {
    4
}

/// Terrain, trap flag and start marker of one glyph.
pub fn glyph(symbol: char) -> Option<(Terrain, bool, bool)> {
    let parsed = match symbol {
        '#' => (Terrain::Wall, false, false),
        '.' => (Terrain::Floor, false, false),
        '@' => (Terrain::Floor, false, true),
        ':' => (Terrain::Rubble, false, false),
        '~' => (Terrain::Chasm, false, false),
        '^' => (Terrain::Floor, true, false),
        '+' => (Terrain::ClosedDoor, false, false),
        '\'' => (Terrain::OpenDoor, false, false),
        '>' => (Terrain::StairsDown, false, false),
        '<' => (Terrain::StairsUp, false, false),
        _ => return None,
    };
    Some(parsed)
}

impl Scenario {
    /// The scenario shipped with the sandbox.
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN).context("Failed to parse built-in scenario")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse scenario RON: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Scenario = ron::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        let Some(first) = self.rows.first() else {
            bail!("scenario '{}' has no rows", self.name);
        };
        let width = first.chars().count();
        ensure!(width >= 3 && self.rows.len() >= 3, "map must be at least 3x3");

        let mut starts = 0;
        for (y, row) in self.rows.iter().enumerate() {
            let row_width = row.chars().count();
            ensure!(row_width == width, "row {y} is {row_width} wide, expected {width}");
            for (x, symbol) in row.chars().enumerate() {
                let Some((_, _, start)) = glyph(symbol) else {
                    bail!("unknown glyph {symbol:?} at ({y}, {x})");
                };
                starts += usize::from(start);
            }
        }
        ensure!(starts == 1, "map needs exactly one '@', found {starts}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(rows: &[&str]) -> String {
        format!("(name: \"test\", rows: {rows:?})")
    }

    #[test]
    fn builtin_scenario_is_valid() {
        let scenario = Scenario::builtin().unwrap();
        assert!(!scenario.rows.is_empty());
        assert!(!scenario.hostiles.is_empty());
    }

    #[test]
    fn missing_start_is_rejected() {
        let source = document(&["###", "#.#", "###"]);
        let err = Scenario::parse(&source).unwrap_err();
        assert!(err.to_string().contains("exactly one"));
    }

    #[test]
    fn defaults_fill_omitted_fields() {
        let source = document(&["###", "#@#", "###"]);
        let scenario = Scenario::parse(&source).unwrap();
        assert_eq!(scenario.sight_radius, 4);
        assert_eq!(scenario.player, PlayerSpec::default());
        assert!(scenario.items.is_empty());
    }

    #[test]
    fn long_wall_runs_parse() {
        let source = document(&["########", "#@....>#", "########"]);
        let scenario = Scenario::parse(&source).unwrap();
        assert_eq!(scenario.rows[0], "########");
        assert_eq!(scenario.rows.len(), 3);
    }
}
