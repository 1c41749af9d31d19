//! Synthetic worlds drawn as ASCII maps.
//!
//! | glyph | terrain       | known |
//! |-------|---------------|-------|
//! | `#`   | wall          | yes   |
//! | `.`   | floor         | yes   |
//! | `@`   | floor, player | yes   |
//! | `:`   | rubble        | yes   |
//! | `~`   | chasm         | yes   |
//! | `^`   | floor, trap   | yes   |
//! | `+`   | closed door   | yes   |
//! | `'`   | open door     | yes   |
//! | `>`   | down stairs   | yes   |
//! | `<`   | up stairs     | yes   |
//! | `?`   | floor         | no    |
//! | `&`   | wall          | no    |
//!
//! Known cells are remembered, seen, in view and in line of fire.
#![allow(dead_code)]

use automaton::{
    Alertness, Appraisal, Automaton, AutomatonConfig, Cell, CellFlags, Dimensions, FlowFields,
    FlowInput, GroundItem, HealthMemory, Hostile, KnowledgeMask, Light, LightKind, PlayerSheet,
    PrivilegedView, SlotKind, Species, Stance, Terrain, TurnContext, WorldView,
};

const KNOWN: CellFlags = CellFlags::MARKED
    .union(CellFlags::SEEN)
    .union(CellFlags::VIEW)
    .union(CellFlags::FIRE);

pub struct TestWorld {
    dimensions: Dimensions,
    terrain: Vec<Terrain>,
    flags: Vec<CellFlags>,
    hostiles: Vec<Hostile>,
    items: Vec<GroundItem>,
    player: PlayerSheet,
}

impl TestWorld {
    /// # Panics
    ///
    /// Panics on ragged rows, unknown glyphs, or a map without `@`.
    pub fn parse(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows[0].chars().count();
        let dimensions = Dimensions::new(height as u32, width as u32);

        let mut terrain = Vec::with_capacity(dimensions.area());
        let mut flags = Vec::with_capacity(dimensions.area());
        let mut player_at = None;

        for (y, row) in rows.iter().enumerate() {
            assert_eq!(row.chars().count(), width, "ragged row {y}");
            for (x, glyph) in row.chars().enumerate() {
                let (kind, cell_flags) = match glyph {
                    '#' => (Terrain::Wall, KNOWN),
                    '.' => (Terrain::Floor, KNOWN),
                    '@' => {
                        player_at = Some(Cell::new(y as i32, x as i32));
                        (Terrain::Floor, KNOWN)
                    }
                    ':' => (Terrain::Rubble, KNOWN),
                    '~' => (Terrain::Chasm, KNOWN),
                    '^' => (Terrain::Floor, KNOWN | CellFlags::TRAP),
                    '+' => (Terrain::ClosedDoor, KNOWN),
                    '\'' => (Terrain::OpenDoor, KNOWN),
                    '>' => (Terrain::StairsDown, KNOWN),
                    '<' => (Terrain::StairsUp, KNOWN),
                    '?' => (Terrain::Floor, CellFlags::empty()),
                    '&' => (Terrain::Wall, CellFlags::empty()),
                    other => panic!("unknown glyph {other:?}"),
                };
                terrain.push(kind);
                flags.push(cell_flags);
            }
        }

        let position = player_at.expect("map needs an @");
        Self {
            dimensions,
            terrain,
            flags,
            hostiles: Vec::new(),
            items: Vec::new(),
            player: default_player(position),
        }
    }

    pub fn with_hostile(mut self, hostile: Hostile) -> Self {
        self.hostiles.push(hostile);
        self
    }

    pub fn with_item(mut self, item: GroundItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn player_mut(&mut self) -> &mut PlayerSheet {
        &mut self.player
    }

    pub fn set_flags(&mut self, cell: Cell, flags: CellFlags) {
        let index = self.dimensions.index(cell).expect("cell in bounds");
        self.flags[index] = flags;
    }

    pub fn hostiles_mut(&mut self) -> &mut Vec<Hostile> {
        &mut self.hostiles
    }
}

impl WorldView for TestWorld {
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

impl PrivilegedView for TestWorld {
    fn hostiles(&self) -> &[Hostile] {
        &self.hostiles
    }

    fn occupant(&self, cell: Cell) -> Option<&Hostile> {
        self.hostiles.iter().find(|hostile| hostile.position == cell)
    }
}

/// Healthy, fed, armed level-1 character with a light that never runs out.
pub fn default_player(position: Cell) -> PlayerSheet {
    let mut player = PlayerSheet {
        position,
        hp: 20,
        max_hp: 20,
        speed: 0,
        depth: 1,
        min_depth: 1,
        food: 5000,
        ..PlayerSheet::default()
    };
    player.equipment.weapon = true;
    player.equipment.light = Some(Light {
        kind: LightKind::LesserJewel,
        fuel: 0,
    });
    player
}

/// An alert, visible melee brute.
pub fn orc(y: i32, x: i32) -> Hostile {
    Hostile {
        position: Cell::new(y, x),
        alertness: Alertness::Alert,
        stance: Stance::Aggressive,
        visible: true,
        species: Species {
            level: 3,
            speed: 0,
            ranged_freq: 0,
            never_move: false,
            smart: false,
        },
    }
}

/// An alert archer.
pub fn archer(y: i32, x: i32) -> Hostile {
    Hostile {
        species: Species {
            ranged_freq: 4,
            ..orc(y, x).species
        },
        ..orc(y, x)
    }
}

pub fn item(y: i32, x: i32, value: i32, slot: SlotKind) -> GroundItem {
    GroundItem {
        position: Cell::new(y, x),
        marked: true,
        held: false,
        appraisal: Appraisal { value, slot },
    }
}

/// Deterministic configuration: fixed seed and no door bashing.
pub fn quiet_config() -> AutomatonConfig {
    AutomatonConfig::new().with_seed(42).with_door_bash_one_in(0)
}

pub fn active_automaton(world: &TestWorld, config: AutomatonConfig) -> Automaton {
    let mut automaton = Automaton::new(config);
    automaton.activate(world.dimensions());
    automaton
}

/// Everything needed to evaluate policies against a world in isolation.
pub struct Harness {
    pub world: TestWorld,
    pub knowledge: KnowledgeMask,
    pub flows: FlowFields,
    pub memory: HealthMemory,
    pub config: AutomatonConfig,
}

impl Harness {
    /// Merges the visible map and computes every field from the player.
    pub fn new(world: TestWorld) -> Self {
        Self::with_memory(world, HealthMemory::new())
    }

    pub fn with_memory(world: TestWorld, memory: HealthMemory) -> Self {
        let config = quiet_config();
        let mut knowledge = KnowledgeMask::new(world.dimensions());
        knowledge.merge_visible(&world);

        let mut flows = FlowFields::new(world.dimensions(), config.max_dist);
        let input = FlowInput {
            world: &world,
            knowledge: &knowledge,
            health_dropped: memory.dropped(world.player().hp),
        };
        flows.compute_all(world.player().position, &input);

        Self {
            world,
            knowledge,
            flows,
            memory,
            config,
        }
    }

    pub fn context(&self) -> TurnContext<'_> {
        TurnContext {
            world: &self.world,
            knowledge: &self.knowledge,
            flows: &self.flows,
            memory: &self.memory,
            config: &self.config,
        }
    }
}
