use super::{Outcome, Policy, TurnContext, keys};
use crate::flow::FlowChannel;
use crate::grid::Cell;
use crate::world::Terrain;

/// Takes the stairs the player is standing on.
pub struct LeaveLevel;

impl Policy for LeaveLevel {
    fn name(&self) -> &'static str {
        "leave_level"
    }

    fn attempt(&self, ctx: &TurnContext<'_>) -> Outcome {
        if ctx.world.terrain(ctx.position()).is_stairs() {
            Outcome::Commands(keys(",y"))
        } else {
            Outcome::Declined
        }
    }
}

fn nearest_marked<F>(ctx: &TurnContext<'_>, wanted: F) -> Option<Cell>
where
    F: Fn(Terrain) -> bool,
{
    let mut best = ctx.unreached();
    let mut target = None;

    for cell in ctx.world.dimensions().interior() {
        if !ctx.world.is_marked(cell) || !wanted(ctx.world.terrain(cell)) {
            continue;
        }
        let distance = ctx.distance(FlowChannel::Normal, cell);
        if distance < best {
            best = distance;
            target = Some(cell);
        }
    }

    target
}

/// Heads for known down stairs while still close to the shallowest allowed
/// depth.
pub struct SeekDownStairs;

impl Policy for SeekDownStairs {
    fn name(&self) -> &'static str {
        "seek_down_stairs"
    }

    fn attempt(&self, ctx: &TurnContext<'_>) -> Outcome {
        let player = ctx.player();
        if player.depth >= player.min_depth + ctx.config.descend_margin {
            return Outcome::Declined;
        }
        Outcome::from_target(nearest_marked(ctx, Terrain::is_down_stairs))
    }
}

pub struct SeekUpStairs;

impl Policy for SeekUpStairs {
    fn name(&self) -> &'static str {
        "seek_up_stairs"
    }

    fn attempt(&self, ctx: &TurnContext<'_>) -> Outcome {
        Outcome::from_target(nearest_marked(ctx, Terrain::is_up_stairs))
    }
}
