mod common;

use automaton::{
    Arbiter, Automaton, AutomatonError, Cell, Direction, Outcome, Policy, QueueError, SlotKind,
    TurnAction, TurnContext, WorldView,
};
use common::{TestWorld, active_automaton, item, orc, quiet_config};

fn queued(automaton: &mut Automaton) -> String {
    std::iter::from_fn(|| automaton.next_key()).collect()
}

#[test]
fn explores_towards_the_frontier() {
    let world = TestWorld::parse(&["#######", "#@...?#", "#######"]);
    let mut automaton = active_automaton(&world, quiet_config());

    let report = automaton.take_turn(&world).expect("turn");

    assert_eq!(report.policy, "explore");
    assert_eq!(
        report.action,
        TurnAction::Step {
            direction: Direction::East,
            target: Cell::new(1, 5),
        }
    );
    assert_eq!(queued(&mut automaton), ";6");
}

#[test]
fn attacks_an_adjacent_hostile_by_moving_into_it() {
    let world = TestWorld::parse(&["#######", "#@....#", "#######"]).with_hostile(orc(1, 2));
    let mut automaton = active_automaton(&world, quiet_config());

    let report = automaton.take_turn(&world).expect("turn");

    assert_eq!(report.policy, "combat_strategy");
    assert_eq!(queued(&mut automaton), ";6");
}

#[test]
fn overflowing_queue_drops_the_oldest_key() {
    let world = TestWorld::parse(&["#####", "#@..#", "#####"]);
    let mut automaton = active_automaton(&world, quiet_config().with_queue_capacity(3));

    assert_eq!(automaton.enqueue('a'), Ok(()));
    assert_eq!(automaton.enqueue('b'), Ok(()));
    assert_eq!(automaton.enqueue('c'), Ok(()));
    assert_eq!(
        automaton.enqueue('d'),
        Err(AutomatonError::Queue(QueueError::Overflow))
    );
    assert_eq!(automaton.pending_keys(), 3);
    assert_eq!(queued(&mut automaton), "bcd");
}

#[test]
fn fully_explored_level_deactivates() {
    let mut world = TestWorld::parse(&["#####", "#.@.#", "#####"]);
    world.player_mut().depth = 5;
    let mut automaton = active_automaton(&world, quiet_config());

    let err = automaton.take_turn(&world).unwrap_err();

    assert_eq!(err, AutomatonError::NothingToDo);
    assert_eq!(err.to_string(), "Could not find anything to do.");
    assert!(!automaton.is_active());
    assert_eq!(automaton.pending_keys(), 0);
}

struct WalledOff;

impl Policy for WalledOff {
    fn name(&self) -> &'static str {
        "walled_off"
    }

    fn attempt(&self, _ctx: &TurnContext<'_>) -> Outcome {
        Outcome::Target(Cell::new(1, 5))
    }
}

#[test]
fn unreachable_target_deactivates() {
    let world = TestWorld::parse(&["#######", "#@.#..#", "#######"]);
    let arbiter = Arbiter::new(vec![Box::new(WalledOff)]);
    let mut automaton = Automaton::with_arbiter(quiet_config(), arbiter);
    automaton.activate(world.dimensions());

    let err = automaton.take_turn(&world).unwrap_err();

    assert_eq!(
        err,
        AutomatonError::NoDirection {
            target: Cell::new(1, 5)
        }
    );
    assert!(!automaton.is_active());
}

#[test]
fn closed_doors_are_opened_or_bashed() {
    let world = TestWorld::parse(&["#####", "#@+?#", "#####"]);

    let mut opener = active_automaton(&world, quiet_config());
    opener.take_turn(&world).expect("turn");
    assert_eq!(queued(&mut opener), ";6");

    let mut basher = active_automaton(&world, quiet_config().with_door_bash_one_in(1));
    basher.take_turn(&world).expect("turn");
    assert_eq!(queued(&mut basher), "/6");
}

#[test]
fn stepping_onto_a_known_trap_is_confirmed() {
    let world = TestWorld::parse(&["#####", "#@^?#", "#####"]);
    let mut automaton = active_automaton(&world, quiet_config());

    automaton.take_turn(&world).expect("turn");

    assert_eq!(queued(&mut automaton), ";6y");
}

#[test]
fn searching_in_place_reveals_neighbours() {
    let mut world = TestWorld::parse(&["#&###", "#@.?#", "#####"]);
    world.player_mut().perception = 10;
    let mut automaton = active_automaton(&world, quiet_config());
    let hidden = Cell::new(0, 1);

    let report = automaton.take_turn(&world).expect("turn");

    assert_eq!(report.action, TurnAction::Hold);
    assert_eq!(queued(&mut automaton), ";5");
    let agent = automaton.agent().expect("still active");
    assert!(agent.knowledge.contains(hidden));
    assert_eq!(agent.memory.previous(), Some(20));
}

#[test]
fn wounded_player_keeps_resting_until_healed() {
    let mut world = TestWorld::parse(&["#####", "#.@.#", "#####"]);
    let player = world.player_mut();
    player.hp = 10;
    // Unarmed, so combat never claims the turn first.
    player.equipment.weapon = false;
    let mut automaton = active_automaton(&world, quiet_config());

    for turn in 1..=3 {
        let report = automaton.take_turn(&world).expect("turn");
        assert_eq!(report.turn, turn);
        assert_eq!(report.policy, "rest");
        assert_eq!(report.keys.as_slice(), [';', '5']);
    }
    assert_eq!(automaton.turns(), 3);
    assert_eq!(automaton.pending_keys(), 6);
}

#[test]
fn idle_automaton_refuses_work() {
    let world = TestWorld::parse(&["#####", "#@..#", "#####"]);
    let mut automaton = Automaton::new(quiet_config());

    assert_eq!(automaton.take_turn(&world), Err(AutomatonError::Inactive));
    assert_eq!(automaton.enqueue('x'), Err(AutomatonError::Inactive));
    assert_eq!(automaton.next_key(), None);
}

#[test]
fn zero_ceiling_is_raised_instead_of_underflowing() {
    let world = TestWorld::parse(&["#######", "#@...?#", "#######"])
        .with_item(item(1, 3, 5, SlotKind::Pack));
    let mut config = quiet_config();
    config.max_dist = 0;
    let mut automaton = active_automaton(&world, config);

    let result = automaton.take_turn(&world);

    assert!(matches!(
        result,
        Ok(_) | Err(AutomatonError::NothingToDo) | Err(AutomatonError::NoDirection { .. })
    ));
}
