//! Pure damage-resolution math.
//!
//! Both the live game and headless simulation go through [`resolve`], so the
//! outcome is deterministic for a given RNG draw.

use rand::Rng;

use super::types::{AttackOutcome, CombatStats};
use crate::constants::{DEFENSE_K, MIN_DAMAGE};
use crate::events::bus::EventBus;
use crate::events::types::GameEvent;

/// Resolves one attack.
///
/// Defense reduces damage on a soft-cap curve (`defense / (defense + K)`),
/// the crit roll multiplies by the attacker's crit coefficient (never below
/// 1.0), and every landed hit deals at least 1 damage.
///
/// A missing attacker or defender resolves to `(0, false)` rather than
/// failing; despawn races at the call site are expected, not errors.
pub fn resolve(
    attacker: Option<&CombatStats>,
    defender: Option<&CombatStats>,
    skill_multiplier: f64,
    rng: &mut impl Rng,
) -> AttackOutcome {
    let (attacker, defender) = match (attacker, defender) {
        (Some(a), Some(d)) => (a, d),
        _ => return AttackOutcome::none(),
    };

    let base = attacker.attack as f64 * skill_multiplier;
    let reduction = defender.defense as f64 / (defender.defense as f64 + DEFENSE_K);
    let raw = base * (1.0 - reduction);

    let was_crit = rng.gen::<f64>() < attacker.crit_chance;
    let final_damage = if was_crit {
        raw * attacker.crit_damage.max(1.0)
    } else {
        raw
    };

    AttackOutcome {
        damage: (final_damage.floor() as u32).max(MIN_DAMAGE),
        was_crit,
    }
}

/// Resolves an attack and publishes the outcome onto the bus.
///
/// Emits [`GameEvent::DamageDealt`] for every landed hit and additionally
/// [`GameEvent::CriticalHit`] when the hit crit. A missing participant emits
/// nothing.
pub fn resolve_on_bus(
    bus: &EventBus,
    attacker: Option<&CombatStats>,
    defender: Option<&CombatStats>,
    skill_multiplier: f64,
    target_id: u64,
    rng: &mut impl Rng,
) -> AttackOutcome {
    let outcome = resolve(attacker, defender, skill_multiplier, rng);
    if outcome.damage == 0 {
        return outcome;
    }

    bus.publish(&GameEvent::DamageDealt {
        damage: outcome.damage,
        was_crit: outcome.was_crit,
        target_id,
    });
    if outcome.was_crit {
        bus.publish(&GameEvent::CriticalHit {
            damage: outcome.damage,
            target_id,
        });
    }
    outcome
}
