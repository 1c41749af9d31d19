//! Decision core of an autonomous dungeon-crawl player.
//!
//! The agent reads the host game through the [`WorldView`] and
//! [`PrivilegedView`] traits, keeps its own memory of the level, and each
//! turn emits a short sequence of host keys as if typed by a human.
//!
//! Modules are organized by responsibility:
//! - [`grid`] and [`world`] describe the map and the facts read from the host
//! - [`knowledge`] and [`memory`] hold what the agent remembers between turns
//! - [`flow`] computes the cost fields every decision is based on
//! - [`policy`] holds the decision rules and the [`Arbiter`] that orders them
//! - [`controller`] runs one decision cycle and turns a target into keys
//! - [`queue`] and [`bridge`] deliver those keys to the host's input loop
pub mod bridge;
pub mod config;
pub mod controller;
pub mod error;
pub mod flow;
pub mod grid;
pub mod knowledge;
pub mod memory;
pub mod policy;
pub mod queue;
pub mod world;

pub use bridge::{AutomatonInput, Host, HumanInput, InputRouter, KeySource};
pub use config::AutomatonConfig;
pub use controller::{AgentState, Automaton, StopReason, TurnAction, TurnReport};
pub use error::{AutomatonError, ErrorSeverity, InvalidChannel, QueueError, Result};
pub use flow::{FlowChannel, FlowField, FlowFields, FlowInput, MIN_MAX_DIST};
pub use grid::{Cell, Dimensions, Direction, grid_distance};
pub use knowledge::KnowledgeMask;
pub use memory::HealthMemory;
pub use policy::{Arbiter, Decision, KeySequence, Outcome, Policy, TurnContext};
pub use queue::{CommandQueue, ESCAPE, Key, RETURN};
pub use world::{
    Alertness, Appraisal, CellFlags, Conditions, Equipment, GroundItem, Hostile, Light, LightKind,
    PackItem, PlayerSheet, PrivilegedView, Quiver, Skill, SlotKind, Species, Stance, Terrain,
    World, WorldView,
};
