//! Tunable parameters of the automaton.
use std::env;

use crate::flow::MIN_MAX_DIST;
use crate::world::Skill;

/// Automaton configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutomatonConfig {
    /// Flow-field ceiling. Costs at or above it mean "unreached".
    /// Flow fields raise anything below [`MIN_MAX_DIST`] to it.
    pub max_dist: u32,
    /// Number of keys the command queue holds before overflowing.
    pub queue_capacity: usize,
    /// Relative desire to raise each skill, indexed by [`Skill`].
    pub skill_weights: [u32; Skill::COUNT],
    /// Bash a known closed door instead of opening it one time in `n`.
    /// 0 disables bashing.
    pub door_bash_one_in: u32,
    /// Seed for the door-bashing die. `None` draws from entropy.
    pub rng_seed: Option<u64>,
    /// Eat when food drops below this.
    pub hungry_below: u32,
    /// Renew a torch or lantern when fuel drops below this.
    pub light_renew_below: u32,
    /// A spare torch or lantern must hold more fuel than this to be worth swapping in.
    pub spare_light_min_fuel: u32,
    /// Combat-field radius within which hostiles add to the threat estimate.
    pub threat_radius: u32,
    /// Combat-field distance a hostile must be within to be engaged.
    pub engage_radius: u32,
    /// Do not travel this far or further to uncover one unknown cell.
    pub explore_radius: u32,
    /// Keep descending while shallower than `min_depth + descend_margin`.
    pub descend_margin: u32,
}

impl AutomatonConfig {
    pub const DEFAULT_MAX_DIST: u32 = 100;
    pub const DEFAULT_QUEUE_CAPACITY: usize = 8192;
    /// Melee, Archery, Evasion, Stealth, Perception, Will, Smithing, Song.
    pub const DEFAULT_SKILL_WEIGHTS: [u32; Skill::COUNT] = [100, 50, 100, 0, 0, 50, 0, 0];
    pub const DEFAULT_DOOR_BASH_ONE_IN: u32 = 5;
    pub const DEFAULT_HUNGRY_BELOW: u32 = 2000;
    pub const DEFAULT_LIGHT_RENEW_BELOW: u32 = 110;
    pub const DEFAULT_SPARE_LIGHT_MIN_FUEL: u32 = 100;
    pub const DEFAULT_THREAT_RADIUS: u32 = 20;
    /// Short bows reach 12 cells.
    pub const DEFAULT_ENGAGE_RADIUS: u32 = 12;
    pub const DEFAULT_EXPLORE_RADIUS: u32 = 50;
    pub const DEFAULT_DESCEND_MARGIN: u32 = 3;

    pub fn new() -> Self {
        Self {
            max_dist: Self::DEFAULT_MAX_DIST,
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
            skill_weights: Self::DEFAULT_SKILL_WEIGHTS,
            door_bash_one_in: Self::DEFAULT_DOOR_BASH_ONE_IN,
            rng_seed: None,
            hungry_below: Self::DEFAULT_HUNGRY_BELOW,
            light_renew_below: Self::DEFAULT_LIGHT_RENEW_BELOW,
            spare_light_min_fuel: Self::DEFAULT_SPARE_LIGHT_MIN_FUEL,
            threat_radius: Self::DEFAULT_THREAT_RADIUS,
            engage_radius: Self::DEFAULT_ENGAGE_RADIUS,
            explore_radius: Self::DEFAULT_EXPLORE_RADIUS,
            descend_margin: Self::DEFAULT_DESCEND_MARGIN,
        }
    }

    /// Clamped to [`MIN_MAX_DIST`].
    pub fn with_max_dist(mut self, max_dist: u32) -> Self {
        self.max_dist = max_dist.max(MIN_MAX_DIST);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn with_door_bash_one_in(mut self, n: u32) -> Self {
        self.door_bash_one_in = n;
        self
    }

    pub fn with_skill_weights(mut self, weights: [u32; Skill::COUNT]) -> Self {
        self.skill_weights = weights;
        self
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `AUTOMATON_QUEUE_CAPACITY` - Command queue size in keys (default: 8192)
    /// - `AUTOMATON_DOOR_BASH_ONE_IN` - Door bashing odds, 0 to disable (default: 5)
    /// - `AUTOMATON_SEED` - Fixed seed for the door-bashing die (default: entropy)
    /// - `AUTOMATON_DESCEND_MARGIN` - Levels to dive past the minimum depth (default: 3)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("AUTOMATON_QUEUE_CAPACITY") {
            config.queue_capacity = capacity.max(1);
        }

        if let Some(n) = read_env::<u32>("AUTOMATON_DOOR_BASH_ONE_IN") {
            config.door_bash_one_in = n;
        }

        config.rng_seed = read_env::<u64>("AUTOMATON_SEED");

        if let Some(margin) = read_env::<u32>("AUTOMATON_DESCEND_MARGIN") {
            config.descend_margin = margin;
        }

        config
    }
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    parse_value(key, &env::var(key).ok()?)
}

fn parse_value<T>(key: &str, raw: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = raw, "ignoring unparsable environment variable");
            None
        }
    }
}
