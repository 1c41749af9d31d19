//! Cost-weighted distance fields over the known map.
//!
//! A flow field stores, for every cell, the accumulated cost of walking from
//! the field's origin to that cell. Three channels share one propagation
//! rule and differ only in the penalties they add:
//!
//! - [`FlowChannel::Normal`]: travel and exploration.
//! - [`FlowChannel::Combat`]: distance to hostiles and fighting positions.
//! - [`FlowChannel::Safety`]: retreat. Steers wide of every hostile.
//!
//! # Propagation
//!
//! Cells are expanded in layers of increasing cost. A neighbour reached
//! from layer `c` is stamped with `c + penalties`. A cell whose stamped cost
//! is still at or above the current layer is carried over to the next layer
//! untouched, so an expensive cell only expands once the rest of the field
//! has caught up with it. Propagation stops at the first empty layer or at
//! the cost ceiling.
//!
//! Reachability never depends on the channel: a cell is reachable when it is
//! in bounds, known, and not wall, rubble or chasm.
use strum::{EnumCount, EnumIter, IntoEnumIterator};

use crate::error::InvalidChannel;
use crate::grid::{Cell, Dimensions};
use crate::knowledge::KnowledgeMask;
use crate::world::{Hostile, World};

/// Smallest usable ceiling: the origin plus one reachable ring.
pub const MIN_MAX_DIST: u32 = 2;

/// Penalty for stepping onto a visible trap.
const TRAP_COST: u32 = 3;
/// Penalty for a visible immobile hostile on the cell.
const IMMOBILE_COST: u32 = 10;
/// Penalty for a visible hostile on the cell that has not noticed the player.
const UNALERT_COST: u32 = 3;
/// Safety channel: any hostile on the cell.
const SAFETY_OCCUPIED_COST: u32 = 25;

/// Second ring: per immobile hostile next to the cell.
const RING_IMMOBILE_COST: u32 = 1;
/// Second ring: per visible melee-only hostile next to the cell.
const RING_MELEE_COST: u32 = 2;
/// Second ring: per visible unalert hostile next to the cell.
const RING_UNALERT_COST: u32 = 1;
/// Second ring, safety channel: per hostile next to the cell.
const RING_SAFETY_COST: u32 = 2;

/// Open floor with no wall around it.
const EXPOSED_COST: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, EnumIter, EnumCount)]
#[strum(serialize_all = "snake_case")]
pub enum FlowChannel {
    Normal = 0,
    Combat = 1,
    Safety = 2,
}

impl FlowChannel {
    fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for FlowChannel {
    type Error = InvalidChannel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FlowChannel::Normal),
            1 => Ok(FlowChannel::Combat),
            2 => Ok(FlowChannel::Safety),
            other => Err(InvalidChannel(other)),
        }
    }
}

/// Everything propagation reads besides the field itself.
#[derive(Clone, Copy)]
pub struct FlowInput<'a> {
    pub world: &'a dyn World,
    pub knowledge: &'a KnowledgeMask,
    /// The player lost health since the last recorded turn.
    pub health_dropped: bool,
}

/// Dense cost grid for one channel.
#[derive(Clone, Debug)]
pub struct FlowField {
    dimensions: Dimensions,
    costs: Vec<u32>,
    origin: Option<Cell>,
    max_dist: u32,
}

impl FlowField {
    pub fn new(dimensions: Dimensions, max_dist: u32) -> Self {
        let max_dist = max_dist.max(MIN_MAX_DIST);
        Self {
            dimensions,
            costs: vec![max_dist; dimensions.area()],
            origin: None,
            max_dist,
        }
    }

    /// Cost of `cell`, or the ceiling when unreached or out of bounds.
    pub fn get(&self, cell: Cell) -> u32 {
        self.dimensions
            .index(cell)
            .map_or(self.max_dist, |index| self.costs[index])
    }

    pub fn is_reached(&self, cell: Cell) -> bool {
        self.get(cell) < self.max_dist
    }

    /// Origin of the last computation.
    pub fn origin(&self) -> Option<Cell> {
        self.origin
    }

    pub fn reached_count(&self) -> usize {
        self.costs.iter().filter(|cost| **cost < self.max_dist).count()
    }

    fn reset(&mut self, dimensions: Dimensions) {
        if dimensions != self.dimensions {
            self.dimensions = dimensions;
            self.costs = vec![self.max_dist; dimensions.area()];
        } else {
            self.costs.fill(self.max_dist);
        }
        self.origin = None;
    }

    fn set(&mut self, cell: Cell, cost: u32) {
        if let Some(index) = self.dimensions.index(cell) {
            self.costs[index] = cost;
        }
    }

    fn propagate(&mut self, channel: FlowChannel, origin: Cell, input: &FlowInput<'_>) {
        self.reset(input.world.dimensions());

        if !self.dimensions.contains(origin) {
            tracing::warn!(%channel, %origin, "flow origin out of bounds, field left unreached");
            return;
        }

        self.origin = Some(origin);
        self.set(origin, 0);

        let mut frontier = vec![origin];
        let mut next = Vec::new();

        for layer in 1..=self.max_dist {
            if frontier.is_empty() {
                break;
            }

            for &cell in &frontier {
                if self.get(cell) >= layer {
                    next.push(cell);
                    continue;
                }

                for neighbor in cell.neighbors() {
                    if !self.is_open(neighbor, input) {
                        continue;
                    }

                    let cost = layer + step_penalty(channel, neighbor, layer, input);
                    if cost >= self.max_dist {
                        continue;
                    }

                    self.set(neighbor, cost);
                    next.push(neighbor);
                }
            }

            std::mem::swap(&mut frontier, &mut next);
            next.clear();
        }

        if channel == FlowChannel::Safety && input.health_dropped {
            let cost = self.get(origin).saturating_add(1).min(self.max_dist);
            self.set(origin, cost);
        }
    }

    /// In bounds, not yet reached, known and passable.
    fn is_open(&self, cell: Cell, input: &FlowInput<'_>) -> bool {
        self.dimensions.contains(cell)
            && self.get(cell) >= self.max_dist
            && input.knowledge.is_known(input.world, cell)
            && !input.world.terrain(cell).blocks_flow()
    }
}

/// Penalties for entering `cell` from a cell expanded at `layer`.
fn step_penalty(channel: FlowChannel, cell: Cell, layer: u32, input: &FlowInput<'_>) -> u32 {
    let world = input.world;
    let mut extra = 0;

    if world.has_visible_trap(cell) {
        extra += TRAP_COST;
    }

    if let Some(hostile) = world.visible_hostile_at(cell) {
        if hostile.species.never_move && layer > 1 {
            extra += IMMOBILE_COST;
        }
        if !hostile.alertness.is_alert() {
            extra += UNALERT_COST;
        }
    }

    let occupied = world.occupant(cell).is_some();
    if channel == FlowChannel::Safety && occupied {
        extra += SAFETY_OCCUPIED_COST;
    }

    let mut next_to_wall = false;
    for around in cell.neighbors() {
        if let Some(hostile) = world.occupant(around) {
            extra += ring_penalty(channel, hostile, layer);
        }
        if world.is_wall(around) {
            next_to_wall = true;
        }
    }

    if !next_to_wall && !occupied && layer > 1 {
        extra += EXPOSED_COST;
    }

    extra
}

fn ring_penalty(channel: FlowChannel, hostile: &Hostile, layer: u32) -> u32 {
    let mut extra = 0;
    if hostile.species.never_move && layer > 1 {
        extra += RING_IMMOBILE_COST;
    }
    if hostile.visible && hostile.species.is_melee_only() {
        extra += RING_MELEE_COST;
    }
    if hostile.visible && !hostile.alertness.is_alert() {
        extra += RING_UNALERT_COST;
    }
    if channel == FlowChannel::Safety {
        extra += RING_SAFETY_COST;
    }
    extra
}

/// One field per channel, all sharing the same ceiling.
#[derive(Clone, Debug)]
pub struct FlowFields {
    fields: [FlowField; FlowChannel::COUNT],
    max_dist: u32,
}

impl FlowFields {
    pub fn new(dimensions: Dimensions, max_dist: u32) -> Self {
        let max_dist = max_dist.max(MIN_MAX_DIST);
        Self {
            fields: std::array::from_fn(|_| FlowField::new(dimensions, max_dist)),
            max_dist,
        }
    }

    /// The "unreached" sentinel.
    pub fn max_dist(&self) -> u32 {
        self.max_dist
    }

    /// Recomputes `channel` from scratch with `origin` as its zero point.
    pub fn compute(&mut self, channel: FlowChannel, origin: Cell, input: &FlowInput<'_>) {
        let field = &mut self.fields[channel.index()];
        field.propagate(channel, origin, input);
        tracing::debug!(
            %channel,
            %origin,
            reached = field.reached_count(),
            "flow field recomputed"
        );
    }

    pub fn compute_all(&mut self, origin: Cell, input: &FlowInput<'_>) {
        for channel in FlowChannel::iter() {
            self.compute(channel, origin, input);
        }
    }

    /// Entry point for callers holding a raw channel index.
    ///
    /// An index outside the three channels is a contract violation: it is
    /// logged and nothing is computed.
    pub fn compute_raw(
        &mut self,
        channel: u8,
        origin: Cell,
        input: &FlowInput<'_>,
    ) -> Result<(), InvalidChannel> {
        let channel = FlowChannel::try_from(channel).inspect_err(|err| {
            tracing::error!(%err, "refusing to compute flow for an invalid channel");
        })?;
        self.compute(channel, origin, input);
        Ok(())
    }

    /// Cost from the channel's origin to `cell`; the ceiling when unreached.
    pub fn distance(&self, channel: FlowChannel, cell: Cell) -> u32 {
        self.fields[channel.index()].get(cell)
    }

    pub fn field(&self, channel: FlowChannel) -> &FlowField {
        &self.fields[channel.index()]
    }
}
