//! A tiny simulated level the automaton can play.
//!
//! The simulation is deliberately crude: sight is a square around the
//! character, every hostile hits for its level, and a single arrow or blow
//! takes one hit point. It exists to drive the automaton's key stream, not
//! to be a game.
use automaton::{
    Alertness, Cell, CellFlags, Dimensions, Direction, Equipment, GroundItem, Hostile, Light,
    LightKind, PackItem, PlayerSheet, PrivilegedView, Quiver, Skill, Stance, Terrain, WorldView,
};

use crate::scenario::{Scenario, glyph};

/// Food burnt per game turn.
const FOOD_PER_TURN: u32 = 1;
const FULL_STOMACH: u32 = 5000;
const FLASK_FUEL: u32 = 1500;
const SKILL_COST: u32 = 100;
/// Row order of the skills screen.
const SKILL_ROWS: [Skill; Skill::COUNT] = [
    Skill::Melee,
    Skill::Archery,
    Skill::Evasion,
    Skill::Stealth,
    Skill::Perception,
    Skill::Will,
    Skill::Smithing,
    Skill::Song,
];

/// A hostile plus the hit points the sandbox tracks for it.
#[derive(Clone, Debug)]
struct Monster {
    hostile: Hostile,
    hp: u32,
}

pub struct SandboxWorld {
    dimensions: Dimensions,
    terrain: Vec<Terrain>,
    flags: Vec<CellFlags>,
    sight_radius: i32,
    monsters: Vec<Monster>,
    /// Cache of `monsters` handed out through [`PrivilegedView::hostiles`].
    hostiles: Vec<Hostile>,
    items: Vec<GroundItem>,
    player: PlayerSheet,
    turn: u64,
}

impl SandboxWorld {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let height = scenario.rows.len();
        let width = scenario.rows.first().map_or(0, |row| row.chars().count());
        let dimensions = Dimensions::new(height as u32, width as u32);

        let mut terrain = Vec::with_capacity(dimensions.area());
        let mut flags = Vec::with_capacity(dimensions.area());
        let mut start = Cell::default();

        for (y, row) in scenario.rows.iter().enumerate() {
            for (x, symbol) in row.chars().enumerate() {
                let (kind, trap, is_start) =
                    glyph(symbol).unwrap_or((Terrain::Wall, false, false));
                if is_start {
                    start = Cell::new(y as i32, x as i32);
                }
                terrain.push(kind);
                flags.push(if trap { CellFlags::TRAP } else { CellFlags::empty() });
            }
        }

        let spec = &scenario.player;
        let player = PlayerSheet {
            position: start,
            hp: spec.hp,
            max_hp: spec.max_hp,
            speed: 0,
            depth: spec.depth,
            min_depth: spec.min_depth,
            food: spec.food,
            conditions: Default::default(),
            perception: spec.perception,
            skills: spec.skills,
            unspent_exp: spec.unspent_exp,
            equipment: Equipment {
                weapon: spec.weapon,
                bow: spec.bow,
                light: spec.light,
                quivers: [
                    Quiver {
                        count: spec.arrows,
                        appraisal: 1,
                    },
                    Quiver::default(),
                ],
            },
            pack: spec.pack.clone(),
        };

        let monsters = scenario
            .hostiles
            .iter()
            .map(|spec| Monster {
                hostile: Hostile {
                    position: spec.cell(),
                    alertness: spec.alertness,
                    stance: spec.stance,
                    visible: false,
                    species: spec.species.clone(),
                },
                hp: spec.hp.max(1),
            })
            .collect();

        let items = scenario
            .items
            .iter()
            .map(|spec| GroundItem {
                position: spec.cell(),
                marked: false,
                held: false,
                appraisal: spec.appraisal(),
            })
            .collect();

        let mut world = Self {
            dimensions,
            terrain,
            flags,
            sight_radius: scenario.sight_radius.max(1),
            monsters,
            hostiles: Vec::new(),
            items,
            player,
            turn: 0,
        };
        world.refresh_view();
        world
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn is_defeated(&self) -> bool {
        self.player.hp == 0
    }

    pub fn hostiles_left(&self) -> usize {
        self.monsters.len()
    }

    /// Map glyph of `cell` as the player remembers it.
    pub fn glyph_at(&self, cell: Cell) -> char {
        if cell == self.player.position {
            return '@';
        }
        if self.visible_hostile_at(cell).is_some() {
            return 'o';
        }
        if !self.is_marked(cell) {
            return ' ';
        }
        if self
            .items
            .iter()
            .any(|item| item.marked && item.position == cell)
        {
            return '*';
        }
        if self.has_visible_trap(cell) {
            return '^';
        }
        match self.terrain(cell) {
            Terrain::Floor => '.',
            Terrain::Wall => '#',
            Terrain::Rubble => ':',
            Terrain::Chasm => '~',
            Terrain::ClosedDoor => '+',
            Terrain::OpenDoor => '\'',
            Terrain::StairsDown | Terrain::ShaftDown => '>',
            Terrain::StairsUp | Terrain::ShaftUp => '<',
        }
    }

    /// Moves one step, attacking whatever stands in the way.
    pub fn walk(&mut self, direction: Direction) -> Option<String> {
        if direction == Direction::Hold {
            return self.search();
        }

        let target = self.player.position.step(direction);
        if self.strike(target) {
            return Some(format!("You hit the monster at {target}."));
        }

        match self.terrain(target) {
            Terrain::ClosedDoor => {
                self.set_terrain(target, Terrain::OpenDoor);
                Some("You open the door.".to_owned())
            }
            terrain if terrain.blocks_flow() => Some(format!("There is a {terrain} in the way.")),
            _ => {
                self.player.position = target;
                self.has_visible_trap(target)
                    .then(|| "You tiptoe across the trap.".to_owned())
            }
        }
    }

    pub fn bash(&mut self, direction: Direction) -> Option<String> {
        let target = self.player.position.step(direction);
        if self.terrain(target) == Terrain::ClosedDoor {
            self.set_terrain(target, Terrain::OpenDoor);
            return Some("You slam the door open.".to_owned());
        }
        self.walk(direction)
    }

    /// Heals a little and reveals the cells around the player.
    fn search(&mut self) -> Option<String> {
        self.player.hp = (self.player.hp + 1).min(self.player.max_hp);
        let around: Vec<Cell> = self.player.position.neighbors().collect();
        for cell in around {
            self.add_flags(cell, CellFlags::MARKED);
        }
        None
    }

    pub fn take_stairs(&mut self) -> Option<String> {
        let terrain = self.terrain(self.player.position);
        if terrain.is_down_stairs() {
            self.player.depth += 1;
            Some(format!("You descend to depth {}.", self.player.depth))
        } else if terrain.is_up_stairs() {
            self.player.depth = self.player.depth.saturating_sub(1).max(1);
            Some(format!("You climb to depth {}.", self.player.depth))
        } else {
            Some("There are no stairs here.".to_owned())
        }
    }

    pub fn use_item(&mut self, letter: char) -> Option<String> {
        let index = (letter as usize).checked_sub('a' as usize)?;
        if index >= self.player.pack.len() {
            return Some(format!("You have no item '{letter}'."));
        }

        let item = self.player.pack[index];
        let message = match item {
            PackItem::Food => {
                self.player.food = FULL_STOMACH;
                self.player.pack.remove(index);
                "You eat."
            }
            PackItem::Flask => match self.player.equipment.light.as_mut() {
                Some(light) if light.kind == LightKind::Lantern => {
                    light.fuel += FLASK_FUEL;
                    self.player.pack.remove(index);
                    "You refuel the lantern."
                }
                _ => "You have nothing to refuel.",
            },
            PackItem::Light(spare) => {
                let previous = self.player.equipment.light.replace(spare);
                self.player.pack.remove(index);
                if let Some(old) = previous.filter(|old: &Light| old.is_working()) {
                    self.player.pack.push(PackItem::Light(old));
                }
                "You swap your light."
            }
            PackItem::Other => "Nothing happens.",
        };
        Some(message.to_owned())
    }

    /// Picks up the item under the player into the pack.
    pub fn pick_up(&mut self) -> Option<String> {
        let item = self.take_item_here()?;
        self.player.pack.push(PackItem::Other);
        Some(format!("You pick up an item worth {}.", item.appraisal.value))
    }

    /// Wields the item under the player. `quiver` names the slot to replace
    /// when both quivers are full.
    pub fn wield(&mut self, quiver: Option<usize>) -> Option<String> {
        let item = self.take_item_here()?;
        if item.appraisal.slot == automaton::SlotKind::Quiver {
            let slot = quiver.unwrap_or_else(|| {
                usize::from(self.player.equipment.quivers[0].is_occupied())
            });
            self.player.equipment.quivers[slot.min(1)] = Quiver {
                count: 10,
                appraisal: item.appraisal.value,
            };
        }
        Some(format!("You wield an item worth {}.", item.appraisal.value))
    }

    /// Shoots at the nearest visible hostile from quiver `slot`.
    pub fn fire(&mut self, slot: usize) -> Option<String> {
        let quiver = self.player.equipment.quivers.get_mut(slot)?;
        if !quiver.is_occupied() {
            return Some("Your quiver is empty.".to_owned());
        }
        quiver.count -= 1;

        let own = self.player.position;
        let target = self
            .monsters
            .iter()
            .filter(|monster| monster.hostile.visible)
            .map(|monster| monster.hostile.position)
            .min_by_key(|cell| own.distance(*cell))?;
        self.strike(target);
        Some(format!("You fire at {target}."))
    }

    /// Raises the skill on row `row` of the skills screen.
    pub fn raise_skill(&mut self, row: usize) -> Option<String> {
        let rank = self.player.skills.get_mut(row)?;
        let cost = (*rank + 1) * SKILL_COST;
        if self.player.unspent_exp < cost {
            return Some("You need more experience.".to_owned());
        }
        self.player.unspent_exp -= cost;
        *rank += 1;
        Some(format!("You raise {} to {rank}.", SKILL_ROWS[row]))
    }

    /// Lets the hostiles act and the character's upkeep tick.
    pub fn end_turn(&mut self) -> Vec<String> {
        self.turn += 1;
        self.player.food = self.player.food.saturating_sub(FOOD_PER_TURN);
        if let Some(light) = self.player.equipment.light.as_mut() {
            if light.kind.burns_fuel() {
                light.fuel = light.fuel.saturating_sub(1);
            }
        }

        let mut messages = Vec::new();
        let own = self.player.position;
        for index in 0..self.monsters.len() {
            let hostile = &self.monsters[index].hostile;
            if !hostile.alertness.is_alert() {
                continue;
            }
            if own.distance(hostile.position) <= 1 {
                let damage = hostile.species.level.max(1);
                self.player.hp = self.player.hp.saturating_sub(damage);
                messages.push(format!("The monster hits you for {damage}."));
            } else if !hostile.species.never_move && hostile.stance != Stance::Fleeing {
                self.approach(index);
            }
        }

        self.refresh_view();
        messages
    }

    fn approach(&mut self, index: usize) {
        let from = self.monsters[index].hostile.position;
        let own = self.player.position;
        let step = Direction::SCAN
            .into_iter()
            .map(|direction| from.step(direction))
            .filter(|cell| {
                !self.terrain(*cell).blocks_flow()
                    && self.terrain(*cell) != Terrain::ClosedDoor
                    && *cell != own
                    && self.occupant(*cell).is_none()
            })
            .min_by_key(|cell| own.distance(*cell));

        if let Some(cell) = step.filter(|cell| own.distance(*cell) < own.distance(from)) {
            self.monsters[index].hostile.position = cell;
        }
    }

    /// One hit on the hostile at `cell`. Returns false when nothing is there.
    fn strike(&mut self, cell: Cell) -> bool {
        let Some(index) = self
            .monsters
            .iter()
            .position(|monster| monster.hostile.position == cell)
        else {
            return false;
        };

        let monster = &mut self.monsters[index];
        monster.hostile.alertness = Alertness::Alert;
        monster.hp -= 1;
        if monster.hp == 0 {
            self.monsters.remove(index);
            self.player.unspent_exp += 50;
            tracing::info!(%cell, "monster slain");
        }
        true
    }

    fn take_item_here(&mut self) -> Option<GroundItem> {
        let own = self.player.position;
        let index = self.items.iter().position(|item| item.position == own)?;
        Some(self.items.remove(index))
    }

    /// Recomputes what the character can see after anything moved.
    fn refresh_view(&mut self) {
        const IN_VIEW: CellFlags = CellFlags::SEEN
            .union(CellFlags::VIEW)
            .union(CellFlags::FIRE);

        for flags in &mut self.flags {
            flags.remove(IN_VIEW);
        }

        let own = self.player.position;
        let lit = self
            .player
            .equipment
            .light
            .is_some_and(|light| light.is_working());
        let radius = if lit { self.sight_radius } else { 1 };

        for y in own.y - radius..=own.y + radius {
            for x in own.x - radius..=own.x + radius {
                let cell = Cell::new(y, x);
                if cell != own {
                    self.add_flags(cell, IN_VIEW | CellFlags::MARKED);
                }
            }
        }
        self.add_flags(own, CellFlags::MARKED);

        for item in &mut self.items {
            if own.distance(item.position) <= radius {
                item.marked = true;
            }
        }

        for monster in &mut self.monsters {
            monster.hostile.visible = own.distance(monster.hostile.position) <= radius;
            if monster.hostile.visible && monster.hostile.alertness == Alertness::Unwary {
                monster.hostile.alertness = Alertness::Alert;
            }
        }
        self.hostiles = self.monsters.iter().map(|m| m.hostile.clone()).collect();
    }

    fn set_terrain(&mut self, cell: Cell, terrain: Terrain) {
        if let Some(index) = self.dimensions.index(cell) {
            self.terrain[index] = terrain;
        }
    }

    fn add_flags(&mut self, cell: Cell, flags: CellFlags) {
        if let Some(index) = self.dimensions.index(cell) {
            self.flags[index] |= flags;
        }
    }
}

impl WorldView for SandboxWorld {
    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn terrain(&self, cell: Cell) -> Terrain {
        self.dimensions
            .index(cell)
            .map_or(Terrain::Wall, |index| self.terrain[index])
    }

    fn flags(&self, cell: Cell) -> CellFlags {
        self.dimensions
            .index(cell)
            .map_or(CellFlags::empty(), |index| self.flags[index])
    }

    fn visible_hostile_at(&self, cell: Cell) -> Option<&Hostile> {
        self.hostiles
            .iter()
            .find(|hostile| hostile.visible && hostile.position == cell)
    }

    fn ground_items(&self) -> &[GroundItem] {
        &self.items
    }

    fn player(&self) -> &PlayerSheet {
        &self.player
    }
}

impl PrivilegedView for SandboxWorld {
    fn hostiles(&self) -> &[Hostile] {
        &self.hostiles
    }

    fn occupant(&self, cell: Cell) -> Option<&Hostile> {
        self.hostiles.iter().find(|hostile| hostile.position == cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(rows: &[&str]) -> SandboxWorld {
        let scenario = Scenario {
            name: "test".to_owned(),
            rows: rows.iter().map(|row| (*row).to_owned()).collect(),
            sight_radius: 2,
            player: Default::default(),
            hostiles: Vec::new(),
            items: Vec::new(),
        };
        SandboxWorld::from_scenario(&scenario)
    }

    #[test]
    fn sight_marks_cells_around_the_player() {
        let world = world(&["#######", "#@....#", "#######"]);

        assert!(world.is_marked(Cell::new(1, 3)));
        assert!(world.flags(Cell::new(1, 3)).contains(CellFlags::SEEN));
        assert!(!world.is_marked(Cell::new(1, 4)));
        // The host never flags the player's own cell as seen.
        assert!(!world.flags(Cell::new(1, 1)).contains(CellFlags::SEEN));
    }

    #[test]
    fn walking_into_a_door_opens_it() {
        let mut world = world(&["#####", "#@+.#", "#####"]);

        world.walk(Direction::East);
        assert_eq!(world.terrain(Cell::new(1, 2)), Terrain::OpenDoor);
        assert_eq!(world.player().position, Cell::new(1, 1));

        world.walk(Direction::East);
        assert_eq!(world.player().position, Cell::new(1, 2));
    }

    #[test]
    fn eating_refills_food() {
        let mut world = world(&["####", "#@.#", "####"]);
        world.player.pack = vec![PackItem::Other, PackItem::Food];

        world.use_item('b');

        assert_eq!(world.player().food, FULL_STOMACH);
        assert_eq!(world.player().pack, vec![PackItem::Other]);
    }
}
