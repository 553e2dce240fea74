//! Per-fighter AI controller.
//!
//! Purely reactive: each fighter re-decides on its own randomized interval
//! from the distance vector to its opponent. The staggered intervals keep the
//! two controllers from falling into lockstep.

use crate::constants::*;
use crate::engine::Effects;
use crate::fighter::{Facing, Fighter};
use crate::rng::BattleRng;

/// Outcome of one controller update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Defeated, stunned, terminal or mid-swing
    Skipped,
    /// Decision interval not yet elapsed
    Waiting,
    Attack,
    Chase { jumped: bool },
    Approach,
    Hop,
    Settle,
}

/// Range band the opponent falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBand {
    Attack,
    Brawl,
    Chase,
}

pub fn classify(dx: f32, dy: f32) -> RangeBand {
    let dist = (dx * dx + dy * dy).sqrt();
    if dist < ATTACK_RANGE && dy.abs() < ATTACK_VERTICAL_RANGE {
        RangeBand::Attack
    } else if dist > CHASE_RANGE {
        RangeBand::Chase
    } else {
        RangeBand::Brawl
    }
}

/// Run the controller for `me` against `opponent`
pub fn think(
    me: &mut Fighter,
    opponent: &Fighter,
    dt: f32,
    effects: &mut Effects,
    rng: &mut dyn BattleRng,
) -> Decision {
    if !me.can_act() {
        return Decision::Skipped;
    }

    me.facing = Facing::toward(me.x, opponent.x, me.facing);

    me.decision_timer -= dt;
    if me.decision_timer > 0.0 {
        return Decision::Waiting;
    }

    let dx = opponent.x - me.x;
    let dy = opponent.y - me.y;
    let dir = me.facing.sign();

    match classify(dx, dy) {
        RangeBand::Attack => {
            me.start_attack();
            me.vx *= ATTACK_MOVE_FACTOR;
            me.decision_timer = ATTACK_DECISION_DELAY;
            Decision::Attack
        }
        RangeBand::Chase => {
            me.vx = dir * BASE_SPEED * CHASE_SPEED_FACTOR;
            let mut jumped = false;
            if me.grounded {
                let opponent_above = opponent.y < me.y - OPPONENT_ABOVE_MARGIN;
                let p = if opponent_above {
                    JUMP_CHANCE_OPPONENT_ABOVE
                } else {
                    JUMP_CHANCE_LEVEL
                };
                if rng.chance(p) {
                    launch(me, JUMP_SPEED, effects, rng);
                    jumped = true;
                }
            }
            me.decision_timer = rng.range(CHASE_DECISION_MIN, CHASE_DECISION_SPAN);
            Decision::Chase { jumped }
        }
        RangeBand::Brawl => {
            let roll = rng.next_f64();
            let decision = if roll < BRAWL_APPROACH_CHANCE {
                me.vx = dir * BASE_SPEED * BRAWL_SPEED_FACTOR;
                Decision::Approach
            } else if roll < BRAWL_HOP_CHANCE && me.grounded {
                me.vx = dir * BASE_SPEED * HOP_SPEED_FACTOR;
                launch(me, JUMP_SPEED * HOP_JUMP_FACTOR, effects, rng);
                Decision::Hop
            } else if roll < BRAWL_HOP_CHANCE {
                me.vx = dir * BASE_SPEED * BRAWL_SPEED_FACTOR;
                Decision::Approach
            } else {
                me.vx *= BRAWL_IDLE_DAMPING;
                Decision::Settle
            };
            me.decision_timer = rng.range(BRAWL_DECISION_MIN, BRAWL_DECISION_SPAN);
            decision
        }
    }
}

fn launch(me: &mut Fighter, speed: f32, effects: &mut Effects, rng: &mut dyn BattleRng) {
    me.vy = -speed;
    me.grounded = false;
    effects.particles.emit_dust(me.x, me.y, rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimState, AnimationTable, Archetype};
    use crate::fighter::Team;
    use crate::rng::ScriptedRng;
    use std::sync::Arc;

    fn pair(gap: f32) -> (Fighter, Fighter) {
        let table = Arc::new(AnimationTable::builtin(Archetype::Swordsman));
        let mut a = Fighter::new("A", Team::Left, 400, Arc::clone(&table));
        let mut b = Fighter::new("B", Team::Right, 400, table);
        a.x = 100.0;
        a.y = 500.0;
        a.grounded = true;
        b.x = 100.0 + gap;
        b.y = 500.0;
        b.grounded = true;
        (a, b)
    }

    #[test]
    fn test_classify_bands() {
        assert_eq!(classify(50.0, 0.0), RangeBand::Attack);
        assert_eq!(classify(50.0, 50.0), RangeBand::Brawl);
        assert_eq!(classify(80.0, 0.0), RangeBand::Brawl);
        assert_eq!(classify(-200.0, 0.0), RangeBand::Chase);
    }

    #[test]
    fn test_attack_in_range() {
        let (mut a, b) = pair(50.0);
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.5);
        assert_eq!(think(&mut a, &b, 0.016, &mut fx, &mut rng), Decision::Attack);
        assert!(a.attacking);
        assert_eq!(a.anim.state, AnimState::Attack);
        assert!((a.decision_timer - ATTACK_DECISION_DELAY).abs() < f32::EPSILON);
    }

    #[test]
    fn test_chase_moves_toward_and_faces() {
        let (mut a, b) = pair(-300.0);
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.9);
        let d = think(&mut a, &b, 0.016, &mut fx, &mut rng);
        assert_eq!(d, Decision::Chase { jumped: false });
        assert_eq!(a.facing, Facing::Left);
        assert!(a.vx < 0.0);
        assert!(a.decision_timer >= CHASE_DECISION_MIN);
        assert!(a.decision_timer <= CHASE_DECISION_MIN + CHASE_DECISION_SPAN);
    }

    #[test]
    fn test_chase_jumps_toward_higher_opponent() {
        let (mut a, mut b) = pair(300.0);
        b.y = 300.0;
        let mut fx = Effects::default();
        // 0.2 < 0.35 jump chance when opponent is above
        let mut rng = ScriptedRng::constant(0.2);
        let d = think(&mut a, &b, 0.016, &mut fx, &mut rng);
        assert_eq!(d, Decision::Chase { jumped: true });
        assert!(a.vy < 0.0);
        assert!(!a.grounded);
        assert_eq!(fx.particles.len(), DUST_COUNT);
    }

    #[test]
    fn test_brawl_choices() {
        let mut fx = Effects::default();

        let (mut a, b) = pair(85.0);
        let mut rng = ScriptedRng::constant(0.1);
        assert_eq!(think(&mut a, &b, 0.016, &mut fx, &mut rng), Decision::Approach);

        let (mut a, b) = pair(85.0);
        let mut rng = ScriptedRng::constant(0.6);
        assert_eq!(think(&mut a, &b, 0.016, &mut fx, &mut rng), Decision::Hop);
        assert!(a.vy < 0.0);

        let (mut a, b) = pair(85.0);
        a.vx = 100.0;
        let mut rng = ScriptedRng::constant(0.9);
        assert_eq!(think(&mut a, &b, 0.016, &mut fx, &mut rng), Decision::Settle);
        assert!((a.vx - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_waits_for_decision_interval() {
        let (mut a, b) = pair(50.0);
        a.decision_timer = 0.1;
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.5);
        assert_eq!(think(&mut a, &b, 0.016, &mut fx, &mut rng), Decision::Waiting);
        assert!(!a.attacking);
        assert!(a.decision_timer < 0.1);
    }

    #[test]
    fn test_stunned_fighter_takes_no_action() {
        let (mut a, b) = pair(50.0);
        a.hitstun = 0.2;
        a.decision_timer = 0.0;
        a.vx = 12.0;
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.5);
        assert_eq!(think(&mut a, &b, 0.016, &mut fx, &mut rng), Decision::Skipped);
        assert!(!a.attacking);
        assert_eq!(a.vx, 12.0);
        assert_eq!(rng.draws(), 0);
    }
}
