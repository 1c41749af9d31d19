//! Light and food upkeep.
use super::{KeySequence, Outcome, Policy, TurnContext, pack_letter};
use crate::world::{LightKind, PackItem};

fn use_item(index: usize) -> Outcome {
    match pack_letter(index) {
        Some(letter) => {
            let mut sequence = KeySequence::new();
            sequence.extend(['u', letter]);
            Outcome::Commands(sequence)
        }
        None => Outcome::Declined,
    }
}

fn find_in_pack<F>(pack: &[PackItem], predicate: F) -> Option<usize>
where
    F: Fn(&PackItem) -> bool,
{
    pack.iter().position(predicate)
}

/// Swaps in or refuels a light before the current one burns out.
pub struct RenewLight;

impl Policy for RenewLight {
    fn name(&self) -> &'static str {
        "renew_light"
    }

    fn attempt(&self, ctx: &TurnContext<'_>) -> Outcome {
        let player = ctx.player();
        let Some(equipped) = player.equipment.light else {
            return Outcome::Declined;
        };
        if !equipped.kind.burns_fuel() || equipped.fuel >= ctx.config.light_renew_below {
            return Outcome::Declined;
        }

        let pack = &player.pack;

        let refuel = (equipped.kind == LightKind::Lantern)
            .then(|| {
                find_in_pack(pack, |item| match item {
                    PackItem::Flask => true,
                    PackItem::Light(light) => light.kind == LightKind::Lantern && light.fuel > 0,
                    _ => false,
                })
            })
            .flatten();

        let spare = || {
            find_in_pack(pack, |item| {
                matches!(item, PackItem::Light(light)
                    if !light.kind.burns_fuel() || light.fuel > ctx.config.spare_light_min_fuel)
            })
        };

        // Out of fuel entirely: anything that still burns will do.
        let desperate = || {
            (equipped.fuel == 0)
                .then(|| {
                    find_in_pack(pack, |item| {
                        matches!(item, PackItem::Light(light) if light.fuel > 0)
                    })
                })
                .flatten()
        };

        match refuel.or_else(spare).or_else(desperate) {
            Some(index) => {
                tracing::debug!(fuel = equipped.fuel, index, "renewing light");
                use_item(index)
            }
            None => Outcome::Declined,
        }
    }
}

/// Eats the first food in the pack once hungry.
pub struct EatFood;

impl Policy for EatFood {
    fn name(&self) -> &'static str {
        "eat_food"
    }

    fn attempt(&self, ctx: &TurnContext<'_>) -> Outcome {
        let player = ctx.player();
        if player.food >= ctx.config.hungry_below {
            return Outcome::Declined;
        }

        match find_in_pack(&player.pack, |item| matches!(item, PackItem::Food)) {
            Some(index) => {
                tracing::debug!(food = player.food, index, "eating");
                use_item(index)
            }
            None => Outcome::Declined,
        }
    }
}
