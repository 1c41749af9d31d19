use strum::IntoEnumIterator;

use super::{KeySequence, Outcome, Policy, TurnContext};
use crate::queue::{ESCAPE, RETURN};
use crate::world::Skill;

/// Spends experience on the skill with the best weight per existing rank.
///
/// A skill's desirability is `weight * 10 / (rank + 1)`, so ranks spread
/// out across the weighted skills instead of piling into one. Experience is
/// only spent once the full cost of the next rank, `(rank + 1) * 100`, is
/// available.
pub struct SkillAllocation;

impl SkillAllocation {
    fn best_skill(ctx: &TurnContext<'_>) -> Skill {
        let player = ctx.player();
        let mut best = Skill::Melee;
        let mut best_value = 0;

        for skill in Skill::iter() {
            let index = skill as usize;
            let value = ctx.config.skill_weights[index] * 10 / (player.skills[index] + 1);
            if value > best_value {
                best_value = value;
                best = skill;
            }
        }

        best
    }
}

impl Policy for SkillAllocation {
    fn name(&self) -> &'static str {
        "skill_allocation"
    }

    fn attempt(&self, ctx: &TurnContext<'_>) -> Outcome {
        let skill = Self::best_skill(ctx);
        let index = skill as usize;
        let cost = (ctx.player().skills[index] + 1) * 100;

        if ctx.player().unspent_exp < cost {
            return Outcome::Declined;
        }

        tracing::debug!(%skill, cost, "raising skill");

        // Open the skills screen, walk down to the row, raise it and leave.
        let mut sequence = KeySequence::new();
        sequence.extend(['@', 'i']);
        sequence.extend(std::iter::repeat_n('2', index));
        sequence.extend(['6', RETURN, ESCAPE]);
        Outcome::Commands(sequence)
    }
}
