//! Frontier exploration and secret-door hunting.
use super::{Outcome, Policy, TurnContext};
use crate::flow::FlowChannel;
use crate::grid::Cell;
use crate::world::CellFlags;

/// Solid neighbours that mark a dead end.
const DEAD_END_WALLS: usize = 7;

/// Heads for the nearest unknown cell bordering known ground.
///
/// In a dead end the agent first searches in place, provided its
/// perception is good enough to find anything at this depth. Among equally
/// near frontier cells one step away, a cell in the same row or column that
/// is in view wins, which keeps the walker from cutting corridor corners.
pub struct Explore;

impl Policy for Explore {
    fn name(&self) -> &'static str {
        "explore"
    }

    fn attempt(&self, ctx: &TurnContext<'_>) -> Outcome {
        let own = ctx.position();
        let walls = ctx.solid_wall_count(own);

        if walls == DEAD_END_WALLS && ctx.player().perception > ctx.search_threshold() {
            tracing::debug!(%own, "dead end, searching");
            return Outcome::Target(own);
        }

        let mut best = ctx.config.explore_radius;
        let mut target: Option<Cell> = None;

        for cell in ctx.world.dimensions().interior() {
            if cell == own || ctx.is_known(cell) {
                continue;
            }

            let reach = cell
                .neighbors()
                .map(|around| ctx.distance(FlowChannel::Normal, around))
                .fold(ctx.unreached(), u32::min);

            let corner_tie = reach == best
                && reach == 1
                && walls != DEAD_END_WALLS
                && own.is_orthogonal_to(cell)
                && ctx.world.flags(cell).contains(CellFlags::VIEW);

            if reach < best || corner_tie {
                best = reach;
                target = Some(cell);
            }
        }

        Outcome::from_target(target)
    }
}

/// Walks to the nearest dead end to search it for a secret door.
pub struct SeekSecretDoor;

impl Policy for SeekSecretDoor {
    fn name(&self) -> &'static str {
        "seek_secret_door"
    }

    fn attempt(&self, ctx: &TurnContext<'_>) -> Outcome {
        if ctx.player().perception < ctx.search_threshold() {
            return Outcome::Declined;
        }

        let mut best = ctx.unreached();
        let mut target = None;

        for cell in ctx.world.dimensions().interior() {
            if !ctx.is_known(cell) || !ctx.world.terrain(cell).is_floorlike() {
                continue;
            }
            if ctx.solid_wall_count(cell) != DEAD_END_WALLS {
                continue;
            }

            let distance = ctx.distance(FlowChannel::Normal, cell);
            if distance < best {
                best = distance;
                target = Some(cell);
            }
        }

        Outcome::from_target(target)
    }
}
