//! Priority-ordered decision policies.
//!
//! Each turn the [`Arbiter`] offers the turn to its policies in a fixed
//! order. A policy either declines, names a target cell for the turn
//! controller to walk towards, or emits host keys directly. The first policy
//! that does not decline ends the search.
//!
//! Policies are stateless: everything they read is on the [`TurnContext`],
//! which is rebuilt every turn.
mod combat;
mod explore;
mod objects;
mod pickup;
mod position;
mod rest;
mod skills;
mod stairs;
mod supplies;

use arrayvec::ArrayVec;

pub use combat::{CombatStrategy, engage};
pub use explore::{Explore, SeekSecretDoor};
pub use objects::SeekObject;
pub use pickup::PickupItem;
pub use position::{fighting_position, safety_position};
pub use rest::Rest;
pub use skills::SkillAllocation;
pub use stairs::{LeaveLevel, SeekDownStairs, SeekUpStairs};
pub use supplies::{EatFood, RenewLight};

use crate::config::AutomatonConfig;
use crate::flow::{FlowChannel, FlowFields};
use crate::grid::Cell;
use crate::knowledge::KnowledgeMask;
use crate::memory::HealthMemory;
use crate::queue::Key;
use crate::world::{PlayerSheet, Terrain, World};

/// Longest key sequence a single policy emits.
pub const MAX_SEQUENCE: usize = 16;

pub type KeySequence = ArrayVec<Key, MAX_SEQUENCE>;

/// Builds a [`KeySequence`] from a literal.
///
/// # Panics
///
/// Panics if `text` holds more than [`MAX_SEQUENCE`] keys.
pub fn keys(text: &str) -> KeySequence {
    text.chars().collect()
}

/// Pack label of inventory slot `index` (`a` for the first slot).
pub(crate) fn pack_letter(index: usize) -> Option<Key> {
    let index = u8::try_from(index).ok().filter(|i| *i < 26)?;
    Some(char::from(b'a' + index))
}

/// What a policy decided for this turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Declined,
    /// Walk one step towards this cell, or hold when it is the player's own.
    Target(Cell),
    /// Hand these keys to the host and end the turn.
    Commands(KeySequence),
}

impl Outcome {
    pub fn is_declined(&self) -> bool {
        matches!(self, Outcome::Declined)
    }

    /// Replaces a decline with `Target(cell)`.
    pub fn or_target(self, cell: Cell) -> Self {
        match self {
            Outcome::Declined => Outcome::Target(cell),
            claimed => claimed,
        }
    }

    fn from_target(target: Option<Cell>) -> Self {
        target.map_or(Outcome::Declined, Outcome::Target)
    }
}

/// Blackboard shared by every policy during one decision.
#[derive(Clone, Copy)]
pub struct TurnContext<'a> {
    pub world: &'a dyn World,
    pub knowledge: &'a KnowledgeMask,
    /// All three channels computed from the player's position.
    pub flows: &'a FlowFields,
    pub memory: &'a HealthMemory,
    pub config: &'a AutomatonConfig,
}

impl<'a> TurnContext<'a> {
    pub fn player(&self) -> &'a PlayerSheet {
        self.world.player()
    }

    pub fn position(&self) -> Cell {
        self.world.player().position
    }

    /// True when the player has less health than at the end of last turn.
    pub fn health_dropped(&self) -> bool {
        self.memory.dropped(self.world.player().hp)
    }

    pub fn distance(&self, channel: FlowChannel, cell: Cell) -> u32 {
        self.flows.distance(channel, cell)
    }

    /// Initial "best so far" for nearest-target scans.
    pub fn unreached(&self) -> u32 {
        self.flows.max_dist().saturating_sub(1)
    }

    pub fn is_known(&self, cell: Cell) -> bool {
        self.knowledge.is_known(self.world, cell)
    }

    /// Neighbours of `cell` that are solid rock, not counting rubble.
    ///
    /// Seven of them around open floor usually means a dead end with a
    /// secret door.
    pub fn solid_wall_count(&self, cell: Cell) -> usize {
        cell.neighbors()
            .filter(|around| self.world.terrain(*around) == Terrain::Wall)
            .count()
    }

    /// Perception needed to find secret doors at the current depth.
    pub fn search_threshold(&self) -> i32 {
        let depth = i32::try_from(self.player().depth).unwrap_or(i32::MAX);
        5 + depth / 2
    }
}

/// A single decision rule offered the turn by the [`Arbiter`].
pub trait Policy: Send + Sync {
    /// Stable name used in logs and turn reports.
    fn name(&self) -> &'static str;

    fn attempt(&self, ctx: &TurnContext<'_>) -> Outcome;
}

/// The first policy that did not decline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub policy: &'static str,
    pub outcome: Outcome,
}

/// Ordered list of policies; earlier entries win.
pub struct Arbiter {
    policies: Vec<Box<dyn Policy>>,
}

impl Arbiter {
    /// # Panics
    ///
    /// Panics if `policies` is empty. An arbiter that can never claim a turn
    /// is a programming error.
    pub fn new(policies: Vec<Box<dyn Policy>>) -> Self {
        assert!(!policies.is_empty(), "Arbiter must have at least one policy");
        Self { policies }
    }

    /// The standard priority order.
    ///
    /// Stairs are checked twice: after exploring, so the agent walks off a
    /// fully explored level, and again after looking for secret doors.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(SkillAllocation),
            Box::new(CombatStrategy),
            Box::new(PickupItem),
            Box::new(RenewLight),
            Box::new(Rest),
            Box::new(EatFood),
            Box::new(SeekObject),
            Box::new(Explore),
            Box::new(LeaveLevel),
            Box::new(SeekDownStairs),
            Box::new(SeekSecretDoor),
            Box::new(LeaveLevel),
            Box::new(SeekUpStairs),
        ])
    }

    pub fn policy_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.policies.iter().map(|policy| policy.name())
    }

    /// Runs the policies in order and returns the first claim.
    pub fn decide(&self, ctx: &TurnContext<'_>) -> Option<Decision> {
        for policy in &self.policies {
            let outcome = policy.attempt(ctx);
            if outcome.is_declined() {
                tracing::trace!(policy = policy.name(), "declined");
                continue;
            }
            tracing::debug!(policy = policy.name(), ?outcome, "policy claimed the turn");
            return Some(Decision {
                policy: policy.name(),
                outcome,
            });
        }
        None
    }
}

impl Default for Arbiter {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_letters() {
        assert_eq!(pack_letter(0), Some('a'));
        assert_eq!(pack_letter(3), Some('d'));
        assert_eq!(pack_letter(25), Some('z'));
        assert_eq!(pack_letter(26), None);
    }

    #[test]
    fn or_target_only_replaces_declines() {
        let own = Cell::new(2, 2);
        assert_eq!(Outcome::Declined.or_target(own), Outcome::Target(own));
        assert_eq!(
            Outcome::Target(Cell::new(1, 1)).or_target(own),
            Outcome::Target(Cell::new(1, 1))
        );
        assert_eq!(
            Outcome::Commands(keys("ff")).or_target(own),
            Outcome::Commands(keys("ff"))
        );
    }

    #[test]
    fn standard_order() {
        let names: Vec<_> = Arbiter::standard().policy_names().collect();
        assert_eq!(
            names,
            [
                "skill_allocation",
                "combat_strategy",
                "pickup_item",
                "renew_light",
                "rest",
                "eat_food",
                "seek_object",
                "explore",
                "leave_level",
                "seek_down_stairs",
                "seek_secret_door",
                "leave_level",
                "seek_up_stairs",
            ]
        );
    }

    #[test]
    #[should_panic(expected = "at least one policy")]
    fn empty_arbiter_panics() {
        let _ = Arbiter::new(Vec::new());
    }
}
