//! Combat resolution: does an attacker's current swing connect this tick?
//!
//! A swing can score at most once. It must be past its startup (both time and
//! frame gates), the defender must be hittable, and the defender must be in
//! reach and roughly in front of the attacker at resolution time.

use serde::Serialize;

use crate::animation::AnimState;
use crate::battle_log;
use crate::constants::*;
use crate::engine::Effects;
use crate::fighter::Fighter;
use crate::rng::BattleRng;

/// A connecting hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub damage: u32,
    pub critical: bool,
    pub knockback_x: f32,
    pub knockback_y: f32,
    pub shake: f32,
    pub message: String,
}

/// Gates that must all pass before reach is even tested
pub fn swing_is_live(attacker: &Fighter, defender: &Fighter) -> bool {
    attacker.attacking
        && !attacker.hit_landed
        && !attacker.defeated
        && attacker.hp > 0
        && !defender.defeated
        && !defender.is_invulnerable()
        && !defender.is_stunned()
        && attacker.attack_timer >= ATTACK_STARTUP_SECS
        && attacker.anim.state == AnimState::Attack
        && attacker.anim.frame >= ATTACK_STARTUP_FRAME
}

/// Distance and facing test at the current positions
pub fn in_reach(attacker: &Fighter, defender: &Fighter) -> bool {
    let dist = attacker.distance_to(defender);
    if dist >= ATTACK_REACH {
        return false;
    }
    if dist < POINT_BLANK_RANGE {
        return true;
    }
    let dx = defender.x - attacker.x;
    dx * attacker.facing.sign() >= -FACING_TOLERANCE
}

/// Resolve `attacker`'s swing against `defender`, applying all consequences
pub fn resolve(
    attacker: &mut Fighter,
    defender: &mut Fighter,
    effects: &mut Effects,
    rng: &mut dyn BattleRng,
) -> Option<Hit> {
    if !swing_is_live(attacker, defender) || !in_reach(attacker, defender) {
        return None;
    }

    attacker.hit_landed = true;

    let critical = rng.chance(CRIT_CHANCE);
    let roll = if critical {
        rng.range(CRIT_DAMAGE_MIN, CRIT_DAMAGE_SPAN) * CRIT_MULTIPLIER
    } else {
        rng.range(DAMAGE_MIN, DAMAGE_SPAN)
    };
    let damage = roll.floor().max(0.0) as u32;

    let dealt = defender.apply_damage(damage);
    defender.hitstun = HITSTUN_SECS;
    defender.invulnerable = INVULNERABILITY_SECS;
    defender.cancel_attack();
    if !defender.anim.state.is_terminal() {
        defender.anim.force(AnimState::Hit);
    }

    let dir = {
        let dx = defender.x - attacker.x;
        if dx.abs() > f32::EPSILON {
            dx.signum()
        } else {
            attacker.facing.sign()
        }
    };
    let (kx, ky, shake) = if critical {
        (CRIT_KNOCKBACK_X, CRIT_KNOCKBACK_Y, CRIT_SHAKE)
    } else {
        (KNOCKBACK_X, KNOCKBACK_Y, HIT_SHAKE)
    };
    defender.vx = dir * kx;
    defender.vy = -ky;
    defender.grounded = false;

    effects.shake.pulse(shake);
    let impact_y = defender.y - 40.0;
    effects.particles.emit_sparks(defender.x, impact_y, dir, rng);
    if critical {
        effects.particles.emit_burst(defender.x, impact_y, rng);
    }

    let message = battle_log::hit_message(&attacker.name, dealt, critical, rng);
    tracing::debug!(
        attacker = %attacker.name,
        defender = %defender.name,
        damage = dealt,
        critical,
        hp_left = defender.hp,
        "hit"
    );

    Some(Hit {
        damage: dealt,
        critical,
        knockback_x: dir * kx,
        knockback_y: -ky,
        shake,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationTable, Archetype};
    use crate::fighter::{Facing, Team};
    use crate::rng::ScriptedRng;
    use std::sync::Arc;

    /// Attacker mid-swing, past startup, 50px left of the defender
    fn engaged() -> (Fighter, Fighter) {
        let table = Arc::new(AnimationTable::builtin(Archetype::Swordsman));
        let mut a = Fighter::new("A", Team::Left, 400, Arc::clone(&table));
        let mut d = Fighter::new("D", Team::Right, 400, table);
        a.x = 100.0;
        a.y = 500.0;
        d.x = 150.0;
        d.y = 500.0;
        a.facing = Facing::Right;
        a.start_attack();
        a.attack_timer = ATTACK_STARTUP_SECS;
        a.anim.frame = ATTACK_STARTUP_FRAME;
        (a, d)
    }

    #[test]
    fn test_normal_hit() {
        let (mut a, mut d) = engaged();
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.5);
        let hit = resolve(&mut a, &mut d, &mut fx, &mut rng).unwrap();
        assert!(!hit.critical);
        assert_eq!(hit.damage, 36);
        assert_eq!(d.hp, 364);
        assert_eq!(d.anim.state, AnimState::Hit);
        assert_eq!(d.hitstun, HITSTUN_SECS);
        assert_eq!(d.invulnerable, INVULNERABILITY_SECS);
        assert!(d.vx > 0.0 && d.vy < 0.0);
        assert_eq!(fx.shake.magnitude(), HIT_SHAKE);
        assert!(a.hit_landed);
    }

    #[test]
    fn test_critical_hit() {
        let (mut a, mut d) = engaged();
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::new(vec![0.05, 0.5]);
        let hit = resolve(&mut a, &mut d, &mut fx, &mut rng).unwrap();
        assert!(hit.critical);
        assert_eq!(hit.damage, 69);
        assert_eq!(hit.knockback_x, CRIT_KNOCKBACK_X);
        assert_eq!(fx.shake.magnitude(), CRIT_SHAKE);
        assert!(fx.particles.len() >= SPARK_COUNT + CRIT_BURST_COUNT);
    }

    #[test]
    fn test_one_hit_per_swing() {
        let (mut a, mut d) = engaged();
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.5);
        assert!(resolve(&mut a, &mut d, &mut fx, &mut rng).is_some());
        d.invulnerable = 0.0;
        d.hitstun = 0.0;
        assert!(resolve(&mut a, &mut d, &mut fx, &mut rng).is_none());
    }

    #[test]
    fn test_startup_gates() {
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.5);

        let (mut a, mut d) = engaged();
        a.attack_timer = ATTACK_STARTUP_SECS * 0.5;
        assert!(resolve(&mut a, &mut d, &mut fx, &mut rng).is_none());

        let (mut a, mut d) = engaged();
        a.anim.frame = 0;
        assert!(resolve(&mut a, &mut d, &mut fx, &mut rng).is_none());
        assert_eq!(d.hp, 400);
    }

    #[test]
    fn test_invulnerable_defender_untouched() {
        let (mut a, mut d) = engaged();
        d.invulnerable = 0.1;
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.5);
        assert!(resolve(&mut a, &mut d, &mut fx, &mut rng).is_none());
        assert_eq!(d.hp, 400);
        assert!(!a.hit_landed);
    }

    #[test]
    fn test_out_of_reach_misses() {
        let (mut a, mut d) = engaged();
        d.x = a.x + ATTACK_REACH + 1.0;
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.5);
        assert!(resolve(&mut a, &mut d, &mut fx, &mut rng).is_none());
    }

    #[test]
    fn test_facing_matters_except_point_blank() {
        let (mut a, mut d) = engaged();
        d.x = a.x - 50.0;
        assert!(!in_reach(&a, &d));
        d.x = a.x - 20.0;
        assert!(in_reach(&a, &d));
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.5);
        let hit = resolve(&mut a, &mut d, &mut fx, &mut rng).unwrap();
        // knocked away from the attacker, i.e. further left
        assert!(hit.knockback_x < 0.0);
    }

    #[test]
    fn test_hit_interrupts_defender_attack() {
        let (mut a, mut d) = engaged();
        d.start_attack();
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.5);
        resolve(&mut a, &mut d, &mut fx, &mut rng).unwrap();
        assert!(!d.attacking);
        assert!(d.is_stunned());
    }
}
