use super::{Outcome, Policy, TurnContext};
use crate::flow::FlowChannel;

/// Travel cost that takes one point off an item's appraisal.
const VALUE_DECAY_DISTANCE: u32 = 20;

/// Walks to the nearest remembered item still worth the trip.
pub struct SeekObject;

impl Policy for SeekObject {
    fn name(&self) -> &'static str {
        "seek_object"
    }

    fn attempt(&self, ctx: &TurnContext<'_>) -> Outcome {
        let own = ctx.position();
        let mut best = ctx.unreached();
        let mut target = None;

        for item in ctx.world.ground_items() {
            if item.held || !item.marked || item.position == own {
                continue;
            }

            let distance = ctx.distance(FlowChannel::Normal, item.position);
            let decay = i32::try_from(distance / VALUE_DECAY_DISTANCE).unwrap_or(i32::MAX);
            if item.appraisal.value.saturating_sub(decay) <= 0 {
                continue;
            }

            if distance < best {
                best = distance;
                target = Some(item.position);
            }
        }

        Outcome::from_target(target)
    }
}
