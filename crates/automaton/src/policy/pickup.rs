use super::{KeySequence, Outcome, Policy, TurnContext, keys};
use crate::world::SlotKind;

/// Equipment label of the first quiver.
const QUIVER_ONE_LABEL: char = 'm';
/// Equipment label of the second quiver.
const QUIVER_TWO_LABEL: char = 'n';

/// Picks up or wields a worthwhile item lying under the player.
pub struct PickupItem;

impl Policy for PickupItem {
    fn name(&self) -> &'static str {
        "pickup_item"
    }

    fn attempt(&self, ctx: &TurnContext<'_>) -> Outcome {
        let own = ctx.position();
        let Some(item) = ctx
            .world
            .ground_items()
            .iter()
            .find(|item| item.position == own && !item.held)
        else {
            return Outcome::Declined;
        };

        let appraisal = item.appraisal;
        if appraisal.value <= 0 {
            return Outcome::Declined;
        }

        let sequence = match appraisal.slot {
            SlotKind::Pack => keys("g-"),
            // Worth exactly what is already in the quiver: pick it up so the
            // host merges the stacks.
            SlotKind::Quiver if appraisal.value == 1 => keys("g-"),
            SlotKind::Quiver => {
                let mut sequence: KeySequence = keys("w-");
                let [first, second] = ctx.player().equipment.quivers;
                if first.is_occupied() && second.is_occupied() {
                    // Replace the weaker stack.
                    let replace = if first.appraisal > second.appraisal {
                        QUIVER_TWO_LABEL
                    } else {
                        QUIVER_ONE_LABEL
                    };
                    sequence.push(replace);
                }
                sequence
            }
            SlotKind::Equipment => keys("w-"),
        };

        tracing::debug!(slot = ?appraisal.slot, value = appraisal.value, "picking up item");
        Outcome::Commands(sequence)
    }
}
