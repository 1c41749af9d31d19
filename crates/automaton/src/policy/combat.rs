use super::position::{fighting_position, safety_position};
use super::{Outcome, Policy, TurnContext, keys};
use crate::flow::FlowChannel;
use crate::world::{CellFlags, Conditions, Hostile, Stance};

/// Health percentage below which the agent retreats.
const FLEE_BELOW_PERCENT: u32 = 30;
/// Health percentage below which the agent looks for a better place to fight.
const REPOSITION_BELOW_PERCENT: u32 = 75;

/// Aggregate picture of the hostiles that matter this turn.
#[derive(Debug, Default)]
struct ThreatAssessment {
    /// Sum of the levels of nearby alert hostiles.
    threat: u32,
    count: u32,
    /// No melee-capable hostile is alert and in view.
    only_ranged: bool,
    /// A faster hostile is already adjacent; running is pointless.
    chased: bool,
}

impl ThreatAssessment {
    fn scan(ctx: &TurnContext<'_>) -> Self {
        let player = ctx.player();
        let mut assessment = Self {
            only_ranged: true,
            ..Self::default()
        };

        for hostile in ctx.world.hostiles() {
            if !hostile.visible || !hostile.alertness.is_alert() {
                continue;
            }

            let grid_distance = player.position.distance(hostile.position);
            if hostile.species.never_move && grid_distance > 1 {
                continue;
            }

            if ctx.distance(FlowChannel::Combat, hostile.position) < ctx.config.threat_radius {
                assessment.threat += hostile.species.level;
                assessment.count += 1;
            }

            if hostile.species.is_melee_only() {
                assessment.only_ranged = false;
            }

            if hostile.species.speed > player.speed && grid_distance == 1 {
                assessment.chased = true;
            }
        }

        assessment
    }
}

/// Fights, repositions or retreats depending on the threat around the agent.
pub struct CombatStrategy;

impl CombatStrategy {
    /// Holds position while confused. When hurt, still strikes anything it
    /// can hit without moving.
    fn confused(ctx: &TurnContext<'_>) -> Outcome {
        let own = ctx.position();
        if !ctx.health_dropped() {
            return Outcome::Target(own);
        }

        match engage(ctx) {
            Outcome::Target(cell) if own.distance(cell) <= 1 => Outcome::Target(cell),
            Outcome::Commands(sequence) => Outcome::Commands(sequence),
            _ => Outcome::Target(own),
        }
    }
}

impl Policy for CombatStrategy {
    fn name(&self) -> &'static str {
        "combat_strategy"
    }

    fn attempt(&self, ctx: &TurnContext<'_>) -> Outcome {
        let player = ctx.player();

        let can_see = player.equipment.light.is_some_and(|light| light.is_working());
        if !can_see || player.food < 1 {
            return Outcome::Declined;
        }

        if player.has(Conditions::CONFUSED) {
            return Self::confused(ctx);
        }

        if !player.equipment.weapon {
            return Outcome::Declined;
        }

        let own = ctx.position();
        let afraid = player.has(Conditions::AFRAID);
        let health = player.hp_percent();
        let assessment = ThreatAssessment::scan(ctx);
        tracing::debug!(?assessment, health, "threat assessed");

        if afraid
            || (health < FLEE_BELOW_PERCENT && !assessment.chased && !assessment.only_ranged)
        {
            return match safety_position(ctx) {
                Some(cell) if cell == own && !afraid => engage(ctx).or_target(own),
                Some(cell) => Outcome::Target(cell),
                None => Outcome::Declined,
            };
        }

        let outnumbered = assessment.count > 1
            && assessment.threat > player.depth
            && !assessment.only_ranged;
        if outnumbered || health < REPOSITION_BELOW_PERCENT {
            return match fighting_position(ctx) {
                Some(cell) if cell == own => engage(ctx).or_target(own),
                Some(cell) => Outcome::Target(cell),
                None => Outcome::Declined,
            };
        }

        engage(ctx)
    }
}

fn is_candidate(hostile: &Hostile) -> bool {
    let alert = hostile.alertness.is_alert();
    if !hostile.visible && !alert {
        return false;
    }
    // Unseen archers are still fought; unseen brawlers will show up soon.
    if !hostile.visible && hostile.species.is_melee_only() {
        return false;
    }
    alert
}

/// Picks the nearest alert hostile and either closes on it, waits for it,
/// or shoots at it.
///
/// Only hostiles within the engagement radius on the combat field are
/// considered. Hostiles seen only through privileged knowledge count as two
/// steps further away. Slow-closing melee hostiles two or three cells away
/// are waited for instead of charged, unless every candidate so far is the
/// kind that waits in turn.
pub fn engage(ctx: &TurnContext<'_>) -> Outcome {
    let player = ctx.player();
    if player.has(Conditions::AFRAID) {
        return Outcome::Declined;
    }

    let own = player.position;
    let mut best = ctx.config.engage_radius;
    let mut only_smart = true;
    let mut can_fire = false;
    let mut target = None;

    for hostile in ctx.world.hostiles().iter().filter(|h| is_candidate(h)) {
        let distance = ctx.distance(FlowChannel::Combat, hostile.position);

        if !hostile.species.smart {
            only_smart = false;
        }

        if distance >= best {
            continue;
        }

        best = distance;
        if !hostile.visible {
            best += 2;
        }

        let grid_distance = own.distance(hostile.position);
        can_fire = grid_distance > 1
            && hostile.visible
            && !player.has(Conditions::BLIND)
            && ctx.world.flags(hostile.position).contains(CellFlags::FIRE);

        let wait = (2..=3).contains(&grid_distance)
            && hostile.species.is_melee_only()
            && hostile.alertness.is_alert()
            && !hostile.species.never_move
            && hostile.stance != Stance::Fleeing
            && !only_smart;

        target = Some(if wait { own } else { hostile.position });
    }

    let [first, second] = player.equipment.quivers;
    if can_fire && player.equipment.bow && (first.is_occupied() || second.is_occupied()) {
        let command = if first.is_occupied() { "ff" } else { "Ff" };
        tracing::debug!(command, "firing instead of closing in");
        return Outcome::Commands(keys(command));
    }

    Outcome::from_target(target)
}
