use super::{Outcome, Policy, TurnContext};
use crate::world::Conditions;

const REST_BELOW_PERCENT: u32 = 75;

/// Holds position while hurt or impaired.
///
/// Resting is pointless while something is still dealing damage, so the
/// policy stands down when health fell since last turn. Poison is the
/// exception: it drains health on its own and is itself a reason to rest.
pub struct Rest;

impl Policy for Rest {
    fn name(&self) -> &'static str {
        "rest"
    }

    fn attempt(&self, ctx: &TurnContext<'_>) -> Outcome {
        let player = ctx.player();

        if !player.has(Conditions::POISONED) && ctx.health_dropped() {
            return Outcome::Declined;
        }

        if player.hp_percent() < REST_BELOW_PERCENT
            || player.conditions.intersects(Conditions::IMPAIRING)
        {
            return Outcome::Target(ctx.position());
        }

        Outcome::Declined
    }
}
