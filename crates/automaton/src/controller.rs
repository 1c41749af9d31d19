//! Turn controller: owns the agent's state and runs one decision cycle per
//! empty-queue event.
//!
//! # State machine
//!
//! ```text
//! Idle --activate--> Active --(user key | nothing to do | no direction | stop)--> Idle
//! ```
//!
//! Everything the agent remembers lives in [`AgentState`], created on
//! activation and dropped on deactivation.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::AutomatonConfig;
use crate::error::{AutomatonError, Result};
use crate::flow::{FlowChannel, FlowFields, FlowInput};
use crate::grid::{Cell, Dimensions, Direction};
use crate::knowledge::KnowledgeMask;
use crate::memory::HealthMemory;
use crate::policy::{Arbiter, KeySequence, Outcome, TurnContext};
use crate::queue::{CommandQueue, Key};
use crate::world::World;

/// Plain move; stepping into a closed door opens it, holding searches.
const MOVE_KEY: Key = ';';
/// Forces a closed door.
const BASH_KEY: Key = '/';
/// Confirms walking onto a known trap.
const CONFIRM_KEY: Key = 'y';

/// Why the agent went idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StopReason {
    /// A real key was pressed.
    UserInterrupt,
    NothingToDo,
    NoDirection,
    /// Explicit request through the host.
    Requested,
    /// Keys were needed while the host was not at its command prompt.
    NotAtPrompt,
    HostShutdown,
}

/// State that only exists while the agent is active.
#[derive(Debug)]
pub struct AgentState {
    pub knowledge: KnowledgeMask,
    pub flows: FlowFields,
    pub queue: CommandQueue,
    pub memory: HealthMemory,
}

impl AgentState {
    fn new(dimensions: Dimensions, config: &AutomatonConfig) -> Self {
        Self {
            knowledge: KnowledgeMask::new(dimensions),
            flows: FlowFields::new(dimensions, config.max_dist),
            queue: CommandQueue::with_capacity(config.queue_capacity),
            memory: HealthMemory::new(),
        }
    }
}

/// What a turn resolved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnAction {
    /// A policy emitted keys directly.
    Commands,
    /// Stay put.
    Hold,
    Step { direction: Direction, target: Cell },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub turn: u64,
    pub policy: &'static str,
    pub action: TurnAction,
    /// Keys queued this turn.
    pub keys: KeySequence,
    /// The queue overflowed while the keys were written.
    pub overflowed: bool,
}

/// The autonomous player.
pub struct Automaton {
    config: AutomatonConfig,
    arbiter: Arbiter,
    rng: StdRng,
    agent: Option<AgentState>,
    turns: u64,
}

impl Automaton {
    pub fn new(config: AutomatonConfig) -> Self {
        Self::with_arbiter(config, Arbiter::standard())
    }

    pub fn with_arbiter(config: AutomatonConfig, arbiter: Arbiter) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            arbiter,
            rng,
            agent: None,
            turns: 0,
        }
    }

    pub fn config(&self) -> &AutomatonConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.agent.is_some()
    }

    /// Live state, if active.
    pub fn agent(&self) -> Option<&AgentState> {
        self.agent.as_ref()
    }

    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Allocates a fresh queue, knowledge mask and memory.
    ///
    /// Activating an already active automaton starts over from scratch.
    pub fn activate(&mut self, dimensions: Dimensions) {
        self.agent = Some(AgentState::new(dimensions, &self.config));
        tracing::info!(
            height = dimensions.height,
            width = dimensions.width,
            "automaton activated"
        );
    }

    /// Drops every piece of agent state, including pending keys.
    pub fn deactivate(&mut self, reason: StopReason) {
        if let Some(mut agent) = self.agent.take() {
            agent.queue.flush();
            tracing::info!(%reason, turns = self.turns, "automaton deactivated");
        }
    }

    pub fn enqueue(&mut self, key: Key) -> Result<()> {
        let agent = self.agent.as_mut().ok_or(AutomatonError::Inactive)?;
        agent.queue.enqueue(key)?;
        Ok(())
    }

    pub fn peek_key(&self) -> Option<Key> {
        self.agent.as_ref()?.queue.peek()
    }

    pub fn next_key(&mut self) -> Option<Key> {
        self.agent.as_mut()?.queue.dequeue()
    }

    pub fn pending_keys(&self) -> usize {
        self.agent.as_ref().map_or(0, |agent| agent.queue.len())
    }

    /// Runs one decision cycle and queues its keys.
    ///
    /// # Errors
    ///
    /// - [`AutomatonError::Inactive`] when called while idle.
    /// - [`AutomatonError::NothingToDo`] when every policy declined.
    /// - [`AutomatonError::NoDirection`] when the target cannot be reached
    ///   from any neighbouring cell.
    ///
    /// The last two deactivate the automaton before returning.
    pub fn take_turn(&mut self, world: &dyn World) -> Result<TurnReport> {
        let Self {
            config,
            arbiter,
            rng,
            agent,
            turns,
        } = self;
        let agent = agent.as_mut().ok_or(AutomatonError::Inactive)?;

        *turns += 1;
        let turn = *turns;
        let span = tracing::debug_span!("automaton_turn", turn);
        let _guard = span.enter();

        let result = run_turn(agent, arbiter, config, rng, world, turn);

        if let Err(err) = &result {
            let reason = match err {
                AutomatonError::NothingToDo => Some(StopReason::NothingToDo),
                AutomatonError::NoDirection { .. } => Some(StopReason::NoDirection),
                _ => None,
            };
            if let Some(reason) = reason {
                tracing::info!("{err}");
                self.deactivate(reason);
            }
        }

        result
    }
}

fn run_turn(
    agent: &mut AgentState,
    arbiter: &Arbiter,
    config: &AutomatonConfig,
    rng: &mut StdRng,
    world: &dyn World,
    turn: u64,
) -> Result<TurnReport> {
    let player = world.player();
    let origin = player.position;

    agent.knowledge.merge_visible(world);
    let health_dropped = agent.memory.dropped(player.hp);

    let input = FlowInput {
        world,
        knowledge: &agent.knowledge,
        health_dropped,
    };
    agent.flows.compute_all(origin, &input);

    let decision = {
        let ctx = TurnContext {
            world,
            knowledge: &agent.knowledge,
            flows: &agent.flows,
            memory: &agent.memory,
            config,
        };
        arbiter.decide(&ctx).ok_or(AutomatonError::NothingToDo)?
    };

    let target = match decision.outcome {
        Outcome::Commands(keys) => {
            let overflowed = agent.queue.enqueue_all(keys.iter().copied()).is_err();
            return Ok(TurnReport {
                turn,
                policy: decision.policy,
                action: TurnAction::Commands,
                keys,
                overflowed,
            });
        }
        Outcome::Target(target) => target,
        Outcome::Declined => return Err(AutomatonError::NothingToDo),
    };

    let direction = if target == origin {
        Direction::Hold
    } else {
        agent.flows.compute_all(target, &input);
        best_step(&agent.flows, origin).ok_or(AutomatonError::NoDirection { target })?
    };

    let stepped = origin.step(direction);
    let bash = world.is_known_closed_door(stepped)
        && config.door_bash_one_in > 0
        && rng.gen_range(0..config.door_bash_one_in) == 0;

    let mut keys = KeySequence::new();
    keys.push(if bash { BASH_KEY } else { MOVE_KEY });
    keys.push(direction.keypad());
    if world.has_visible_trap(stepped) {
        keys.push(CONFIRM_KEY);
    }

    let overflowed = agent.queue.enqueue_all(keys.iter().copied()).is_err();

    // Searching reveals whether the surrounding cells are passable.
    if !bash && direction == Direction::Hold {
        agent.knowledge.mark_neighbors(origin);
    }

    agent.memory.record(player.hp);

    let action = if direction == Direction::Hold {
        TurnAction::Hold
    } else {
        TurnAction::Step { direction, target }
    };
    tracing::debug!(policy = decision.policy, ?action, keys = ?keys.as_slice(), "turn resolved");

    Ok(TurnReport {
        turn,
        policy: decision.policy,
        action,
        keys,
        overflowed,
    })
}

/// Neighbour of `origin` nearest to the field's origin on the normal channel.
///
/// Orthogonal neighbours are scanned first and win ties.
fn best_step(flows: &FlowFields, origin: Cell) -> Option<Direction> {
    let mut best = None;
    let mut best_distance = flows.max_dist();

    for direction in Direction::SCAN {
        let distance = flows.distance(FlowChannel::Normal, origin.step(direction));
        if distance < best_distance {
            best_distance = distance;
            best = Some(direction);
        }
    }

    best
}
