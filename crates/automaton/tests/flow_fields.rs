mod common;

use automaton::{
    Cell, FlowChannel, FlowFields, FlowInput, Hostile, InvalidChannel, KnowledgeMask, Species,
    WorldView, grid_distance,
};
use common::{TestWorld, orc};
use strum::IntoEnumIterator;

const MAX: u32 = 100;

fn fields_from(world: &TestWorld, origin: Cell, health_dropped: bool) -> FlowFields {
    let mut knowledge = KnowledgeMask::new(world.dimensions());
    knowledge.merge_visible(world);
    let mut flows = FlowFields::new(world.dimensions(), MAX);
    flows.compute_all(
        origin,
        &FlowInput {
            world,
            knowledge: &knowledge,
            health_dropped,
        },
    );
    flows
}

fn room() -> TestWorld {
    TestWorld::parse(&[
        "###########",
        "#.........#",
        "#.........#",
        "#....@....#",
        "#.........#",
        "#.........#",
        "###########",
    ])
}

#[test]
fn corridor_costs_count_steps() {
    let world = TestWorld::parse(&["#######", "#@....#", "#######"]);
    let flows = fields_from(&world, Cell::new(1, 1), false);

    for x in 1..=5 {
        assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(1, x)), (x - 1) as u32);
    }
}

#[test]
fn origin_is_zero_and_costs_grow_outwards() {
    let world = room();
    let origin = world.player().position;
    let flows = fields_from(&world, origin, false);

    for channel in FlowChannel::iter() {
        assert_eq!(flows.distance(channel, origin), 0);

        for cell in world.dimensions().interior() {
            let cost = flows.distance(channel, cell);
            assert!(cost < MAX, "{channel} left {cell} unreached");
            let steps = grid_distance(origin.y, origin.x, cell.y, cell.x) as u32;
            assert!(cost >= steps, "{channel} cost {cost} at {cell} under {steps} steps");

            if cell != origin {
                let cheaper_neighbour = cell
                    .neighbors()
                    .any(|around| flows.distance(channel, around) < cost);
                assert!(cheaper_neighbour, "{channel}: {cell} has no cheaper neighbour");
            }
        }
    }
}

#[test]
fn open_floor_costs_extra_once_away_from_walls() {
    let world = room();
    let flows = fields_from(&world, Cell::new(3, 5), false);

    // One step out: no cover penalty yet.
    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(2, 5)), 1);
    // Two steps out, wall adjacent.
    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(1, 5)), 2);
    // Two steps out in the open: 2 + 1 for no wall nearby.
    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(3, 3)), 3);
}

#[test]
fn visible_trap_defers_expansion() {
    let world = TestWorld::parse(&["#######", "#@.^..#", "#######"]);
    let flows = fields_from(&world, Cell::new(1, 1), false);

    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(1, 2)), 1);
    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(1, 3)), 2 + 3);
    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(1, 4)), 6);
    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(1, 5)), 7);
}

#[test]
fn blocked_and_unknown_cells_stay_unreached() {
    let world = TestWorld::parse(&[
        "#########",
        "#@.:.~.?#",
        "#########",
    ]);
    let flows = fields_from(&world, Cell::new(1, 1), false);

    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(1, 2)), 1);
    for x in 3..=7 {
        for channel in FlowChannel::iter() {
            assert_eq!(flows.distance(channel, Cell::new(1, x)), MAX, "x = {x}");
        }
    }
    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(0, 0)), MAX);
    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(-4, 50)), MAX);
}

#[test]
fn channels_share_reachability() {
    let world = room().with_hostile(orc(2, 7)).with_hostile(orc(4, 2));
    let flows = fields_from(&world, world.player().position, false);

    for cell in world.dimensions().interior() {
        let normal = flows.field(FlowChannel::Normal).is_reached(cell);
        assert_eq!(normal, flows.field(FlowChannel::Combat).is_reached(cell));
        assert_eq!(normal, flows.field(FlowChannel::Safety).is_reached(cell));
    }
}

#[test]
fn safety_channel_steers_around_hostiles() {
    let world = room().with_hostile(orc(3, 7));
    let flows = fields_from(&world, world.player().position, false);

    let hostile = Cell::new(3, 7);
    let normal = flows.distance(FlowChannel::Normal, hostile);
    let safety = flows.distance(FlowChannel::Safety, hostile);
    assert!(safety >= normal + 25, "safety {safety}, normal {normal}");
}

#[test]
fn unalert_hostile_costs_more_to_walk_through() {
    let mut sleepy = orc(1, 3);
    sleepy.alertness = automaton::Alertness::Asleep;
    let world = TestWorld::parse(&["#######", "#@....#", "#######"]).with_hostile(sleepy);
    let flows = fields_from(&world, Cell::new(1, 1), false);

    // Step 2 is next to a visible melee hostile that has not noticed us.
    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(1, 2)), 1 + 2 + 1);
}

/// An alert, visible hostile rooted to its cell that only shoots.
fn turret(y: i32, x: i32) -> Hostile {
    Hostile {
        species: Species {
            never_move: true,
            ranged_freq: 2,
            ..orc(y, x).species
        },
        ..orc(y, x)
    }
}

#[test]
fn immobile_hostile_is_costly_to_walk_through() {
    let world = TestWorld::parse(&["#######", "#@....#", "#######"]).with_hostile(turret(1, 4));
    let flows = fields_from(&world, Cell::new(1, 1), false);

    // Out of the turret's reach.
    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(1, 2)), 1);
    // Next to it: +1.
    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(1, 3)), 2 + 1);
    // Onto it: expanded from cost 3 at layer 4, +10.
    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(1, 4)), 4 + 10);
}

#[test]
fn immobile_hostile_next_to_origin_costs_nothing_extra() {
    let world = TestWorld::parse(&["#######", "#@....#", "#######"]).with_hostile(turret(1, 2));
    let flows = fields_from(&world, Cell::new(1, 1), false);

    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(1, 2)), 1);
    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(1, 3)), 2 + 1);

    let world = TestWorld::parse(&["#######", "#@....#", "#######"]).with_hostile(turret(1, 3));
    let flows = fields_from(&world, Cell::new(1, 1), false);

    // First step: the ring penalty does not apply yet.
    assert_eq!(flows.distance(FlowChannel::Normal, Cell::new(1, 2)), 1);
}

#[test]
fn health_drop_raises_safety_origin_once() {
    let world = room();
    let origin = world.player().position;
    let flows = fields_from(&world, origin, true);

    assert_eq!(flows.distance(FlowChannel::Safety, origin), 1);
    assert_eq!(flows.distance(FlowChannel::Normal, origin), 0);
    assert_eq!(flows.distance(FlowChannel::Combat, origin), 0);
}

#[test]
fn out_of_bounds_origin_reaches_nothing() {
    let world = room();
    let flows = fields_from(&world, Cell::new(40, 40), false);

    assert_eq!(flows.field(FlowChannel::Normal).reached_count(), 0);
    assert_eq!(flows.field(FlowChannel::Normal).origin(), None);
}

#[test]
fn raw_channel_index_is_validated() {
    let world = room();
    let mut knowledge = KnowledgeMask::new(world.dimensions());
    knowledge.merge_visible(&world);
    let mut flows = FlowFields::new(world.dimensions(), MAX);
    let input = FlowInput {
        world: &world,
        knowledge: &knowledge,
        health_dropped: false,
    };

    assert_eq!(
        flows.compute_raw(7, Cell::new(3, 5), &input),
        Err(InvalidChannel(7))
    );
    for channel in FlowChannel::iter() {
        assert_eq!(flows.field(channel).reached_count(), 0);
    }

    assert_eq!(flows.compute_raw(1, Cell::new(3, 5), &input), Ok(()));
    assert_eq!(flows.distance(FlowChannel::Combat, Cell::new(3, 5)), 0);
    assert_eq!(flows.field(FlowChannel::Normal).reached_count(), 0);
}
