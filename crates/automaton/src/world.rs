//! Read-only view of the host game consumed by the decision core.
//!
//! The automaton never touches engine state directly. Everything it knows
//! about terrain, hostiles, items and the character sheet comes through the
//! two traits in this module:
//!
//! - [`WorldView`]: facts a human player could read off the screen.
//! - [`PrivilegedView`]: facts a human player would *not* have. They are
//!   kept on a separate trait so adapters and tests can see exactly which
//!   privileged queries the automaton makes.
//!
//! Values here are snapshots supplied by the host; the automaton never
//! mutates them.
use bitflags::bitflags;

use crate::grid::{Cell, Dimensions};

/// Static terrain feature of a cell as the host currently reports it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Terrain {
    #[default]
    Floor,
    /// Granite, permanent rock, or a secret door not yet found.
    Wall,
    Rubble,
    Chasm,
    ClosedDoor,
    OpenDoor,
    StairsDown,
    ShaftDown,
    StairsUp,
    ShaftUp,
}

impl Terrain {
    /// Blocks sight and movement. Rubble counts as wall.
    pub fn is_wall(self) -> bool {
        matches!(self, Terrain::Wall | Terrain::Rubble)
    }

    /// Excluded from every flow field regardless of channel.
    pub fn blocks_flow(self) -> bool {
        matches!(self, Terrain::Wall | Terrain::Rubble | Terrain::Chasm)
    }

    /// Open ground a character can stand on and search from.
    pub fn is_floorlike(self) -> bool {
        matches!(
            self,
            Terrain::Floor
                | Terrain::OpenDoor
                | Terrain::StairsDown
                | Terrain::ShaftDown
                | Terrain::StairsUp
                | Terrain::ShaftUp
        )
    }

    pub fn is_down_stairs(self) -> bool {
        matches!(self, Terrain::StairsDown | Terrain::ShaftDown)
    }

    pub fn is_up_stairs(self) -> bool {
        matches!(self, Terrain::StairsUp | Terrain::ShaftUp)
    }

    pub fn is_stairs(self) -> bool {
        self.is_down_stairs() || self.is_up_stairs()
    }
}

bitflags! {
    /// Per-cell knowledge and visibility flags maintained by the host.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CellFlags: u8 {
        /// Remembered on the player's map.
        const MARKED = 1 << 0;
        /// Currently seen (lit and in view).
        const SEEN   = 1 << 1;
        /// In line of sight, lit or not.
        const VIEW   = 1 << 2;
        /// A projectile from the player's cell can reach it.
        const FIRE   = 1 << 3;
        const TRAP   = 1 << 4;
        /// The trap has not been discovered yet.
        const HIDDEN = 1 << 5;
    }
}

/// How aware a hostile is of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alertness {
    Asleep,
    #[default]
    Unwary,
    Alert,
}

impl Alertness {
    pub fn is_alert(self) -> bool {
        self >= Alertness::Alert
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stance {
    #[default]
    Confident,
    Aggressive,
    Fleeing,
}

/// Species-level attributes shared by every hostile of a kind.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Species {
    /// Native depth; used as the hostile's threat value.
    pub level: u32,
    pub speed: i32,
    /// Chance in `1/n` of using a ranged attack; 0 means melee only.
    pub ranged_freq: u8,
    pub never_move: bool,
    /// Waits for the player to come out of corridors instead of charging.
    pub smart: bool,
}

impl Species {
    pub fn is_melee_only(&self) -> bool {
        self.ranged_freq == 0
    }
}

/// A live hostile entity.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hostile {
    pub position: Cell,
    pub alertness: Alertness,
    pub stance: Stance,
    /// Visible to the player this turn.
    pub visible: bool,
    pub species: Species,
}

/// Which equipment slot family an item would go into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlotKind {
    /// Not wieldable: goes into the pack.
    #[default]
    Pack,
    Quiver,
    /// Weapon, bow, armour, jewellery or light.
    Equipment,
}

/// Host appraisal of an item relative to what the character already wears.
///
/// Positive values mean "better than the current equipment". The scoring
/// tables behind it belong to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Appraisal {
    pub value: i32,
    pub slot: SlotKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroundItem {
    pub position: Cell,
    /// The player knows the item is there.
    pub marked: bool,
    /// Carried by a hostile.
    pub held: bool,
    pub appraisal: Appraisal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LightKind {
    #[default]
    Torch,
    Lantern,
    LesserJewel,
    Feanorian,
    Silmaril,
}

impl LightKind {
    /// Torches and lanterns run out; jewels shine forever.
    pub fn burns_fuel(self) -> bool {
        matches!(self, LightKind::Torch | LightKind::Lantern)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Light {
    pub kind: LightKind,
    /// Turns of fuel left. Ignored for lights that do not burn fuel.
    pub fuel: u32,
}

impl Light {
    /// False only for a fuel-burning light that has gone out.
    pub fn is_working(&self) -> bool {
        !self.kind.burns_fuel() || self.fuel > 0
    }
}

/// One inventory slot of the pack. Slot `i` is labelled `'a' + i`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PackItem {
    Food,
    /// Oil flask for refuelling a lantern.
    Flask,
    Light(Light),
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quiver {
    pub count: u32,
    pub appraisal: i32,
}

impl Quiver {
    pub fn is_occupied(&self) -> bool {
        self.count > 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Equipment {
    /// A melee weapon is wielded.
    pub weapon: bool,
    pub bow: bool,
    pub light: Option<Light>,
    pub quivers: [Quiver; 2],
}

bitflags! {
    /// Timed status effects on the character.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Conditions: u16 {
        const CONFUSED      = 1 << 0;
        const AFRAID        = 1 << 1;
        const BLIND         = 1 << 2;
        const POISONED      = 1 << 3;
        const STUNNED       = 1 << 4;
        const HALLUCINATING = 1 << 5;
        const SLOWED        = 1 << 6;
        const BLEEDING      = 1 << 7;

        /// Any of these makes resting in place worthwhile.
        const IMPAIRING = Self::CONFUSED.bits()
            | Self::AFRAID.bits()
            | Self::BLIND.bits()
            | Self::POISONED.bits()
            | Self::STUNNED.bits()
            | Self::HALLUCINATING.bits()
            | Self::SLOWED.bits()
            | Self::BLEEDING.bits();
    }
}

/// Skill order used by the skill-point table and the skills screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Skill {
    Melee,
    Archery,
    Evasion,
    Stealth,
    Perception,
    Will,
    Smithing,
    Song,
}

impl Skill {
    pub const COUNT: usize = 8;
}

/// The character sheet as the player sees it.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerSheet {
    pub position: Cell,
    pub hp: u32,
    pub max_hp: u32,
    pub speed: i32,
    pub depth: u32,
    /// Shallowest depth the character is still allowed to be on.
    pub min_depth: u32,
    pub food: u32,
    pub conditions: Conditions,
    /// Effective perception score.
    pub perception: i32,
    /// Base skill levels, indexed by [`Skill`].
    pub skills: [u32; Skill::COUNT],
    pub unspent_exp: u32,
    pub equipment: Equipment,
    pub pack: Vec<PackItem>,
}

impl PlayerSheet {
    /// Health as an integer percentage of maximum.
    pub fn hp_percent(&self) -> u32 {
        if self.max_hp == 0 {
            return 0;
        }
        self.hp * 100 / self.max_hp
    }

    pub fn has(&self, condition: Conditions) -> bool {
        self.conditions.contains(condition)
    }
}

/// Facts the player could know: terrain memory, what is in view, the
/// character sheet and remembered items.
pub trait WorldView {
    fn dimensions(&self) -> Dimensions;

    /// Terrain of `cell`. Out-of-bounds cells report [`Terrain::Wall`].
    fn terrain(&self, cell: Cell) -> Terrain;

    /// Flags of `cell`. Out-of-bounds cells report no flags.
    fn flags(&self, cell: Cell) -> CellFlags;

    /// The hostile on `cell` if the player can currently see it.
    fn visible_hostile_at(&self, cell: Cell) -> Option<&Hostile>;

    /// Ground items the host exposes (marked or not).
    fn ground_items(&self) -> &[GroundItem];

    fn player(&self) -> &PlayerSheet;

    fn contains(&self, cell: Cell) -> bool {
        self.dimensions().contains(cell)
    }

    fn is_wall(&self, cell: Cell) -> bool {
        self.terrain(cell).is_wall()
    }

    fn is_marked(&self, cell: Cell) -> bool {
        self.flags(cell).contains(CellFlags::MARKED)
    }

    fn has_visible_trap(&self, cell: Cell) -> bool {
        let flags = self.flags(cell);
        flags.contains(CellFlags::TRAP) && !flags.contains(CellFlags::HIDDEN)
    }

    fn is_known_closed_door(&self, cell: Cell) -> bool {
        self.is_marked(cell) && self.terrain(cell) == Terrain::ClosedDoor
    }
}

/// Facts a human player would not have.
///
/// The automaton relies on them in two places:
/// - [`PrivilegedView::occupant`]: hostile presence on a cell whether or not
///   it is visible (safety-channel avoidance, flow ring penalties, counting
///   adjacent attackers).
/// - [`PrivilegedView::hostiles`] entries with `visible == false`: alert
///   archers lurking in darkness are still engaged.
pub trait PrivilegedView {
    /// Every live hostile on the level, seen or not.
    fn hostiles(&self) -> &[Hostile];

    /// The hostile standing on `cell`, seen or not.
    fn occupant(&self, cell: Cell) -> Option<&Hostile>;
}

/// Everything the automaton needs from the host.
pub trait World: WorldView + PrivilegedView {}

impl<T: WorldView + PrivilegedView + ?Sized> World for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rubble_is_wall_and_chasm_only_blocks_flow() {
        assert!(Terrain::Rubble.is_wall());
        assert!(Terrain::Rubble.blocks_flow());
        assert!(!Terrain::Chasm.is_wall());
        assert!(Terrain::Chasm.blocks_flow());
        assert!(!Terrain::ClosedDoor.blocks_flow());
        assert!(!Terrain::ClosedDoor.is_floorlike());
        assert!(Terrain::ShaftUp.is_stairs());
    }

    #[test]
    fn jewels_never_burn_out() {
        let torch = Light {
            kind: LightKind::Torch,
            fuel: 0,
        };
        let jewel = Light {
            kind: LightKind::Silmaril,
            fuel: 0,
        };
        assert!(!torch.is_working());
        assert!(jewel.is_working());
    }

    #[test]
    fn impairing_covers_every_condition() {
        assert_eq!(Conditions::IMPAIRING, Conditions::all());
        assert!(Conditions::IMPAIRING.contains(Conditions::BLEEDING));
    }

    #[test]
    fn hp_percent_handles_zero_max() {
        let mut player = PlayerSheet {
            hp: 15,
            max_hp: 20,
            ..PlayerSheet::default()
        };
        assert_eq!(player.hp_percent(), 75);
        player.max_hp = 0;
        assert_eq!(player.hp_percent(), 0);
    }
}
