//! Arcade kinematics for one fighter per tick.
//!
//! Gravity, one-sided (top-only) platform landing, containment inside the
//! arena, ground friction and the locomotion half of the animation state
//! machine. No side or ceiling collision.

use crate::animation::{AnimState, FrameEvent};
use crate::arena::{Bounds, Platform};
use crate::constants::*;
use crate::engine::Effects;
use crate::fighter::Fighter;
use crate::rng::BattleRng;

/// What happened to the fighter this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub landed: bool,
    pub respawned: bool,
    pub attack_finished: bool,
}

/// Advance `fighter` by `dt` seconds against `platforms`
pub fn step(
    fighter: &mut Fighter,
    platforms: &[Platform],
    bounds: Bounds,
    dt: f32,
    effects: &mut Effects,
    rng: &mut dyn BattleRng,
) -> StepReport {
    let mut report = StepReport::default();

    let prev_y = fighter.y;
    fighter.vy = (fighter.vy + GRAVITY * dt).min(MAX_FALL_SPEED);
    fighter.x += fighter.vx * dt;
    fighter.y += fighter.vy * dt;

    fighter.hitstun = (fighter.hitstun - dt).max(0.0);
    fighter.invulnerable = (fighter.invulnerable - dt).max(0.0);
    if fighter.attacking {
        fighter.attack_timer += dt;
    }

    let was_grounded = fighter.grounded;
    fighter.grounded = false;
    if let Some(top) = landing_surface(fighter, prev_y, platforms) {
        fighter.grounded = true;
        fighter.vy = 0.0;
        fighter.y = top;
        if !was_grounded {
            report.landed = true;
            effects.particles.emit_dust(fighter.x, fighter.y, rng);
        }
    }

    contain(fighter, bounds, &mut report);

    let free = !fighter.attacking
        && !fighter.defeated
        && !fighter.is_stunned()
        && !fighter.anim.state.is_terminal();

    if fighter.grounded && !fighter.attacking && !fighter.is_stunned() {
        fighter.vx *= GROUND_FRICTION;
    }

    if !fighter.grounded {
        if free {
            fighter.anim.set(airborne_state(fighter.vy));
        }
    } else if free {
        if report.landed || fighter.anim.state.is_airborne() {
            fighter.anim.set(AnimState::Land);
        } else if matches!(fighter.anim.state, AnimState::Idle | AnimState::Run) {
            if fighter.vx.abs() > RUN_SPEED_THRESHOLD {
                fighter.anim.set(AnimState::Run);
            } else {
                fighter.anim.set(AnimState::Idle);
            }
        }
    }

    if let FrameEvent::Finished(AnimState::Attack) = fighter.anim.advance(dt, &fighter.table) {
        fighter.cancel_attack();
        report.attack_finished = true;
    }
    // a table without an attack clip falls back to idle mid-swing
    if fighter.attacking && fighter.anim.state != AnimState::Attack {
        fighter.cancel_attack();
        report.attack_finished = true;
    }

    report
}

/// Top of the highest platform whose landing band the fighter crossed while
/// moving from `prev_y` to its current height
fn landing_surface(fighter: &Fighter, prev_y: f32, platforms: &[Platform]) -> Option<f32> {
    if fighter.vy < 0.0 {
        return None;
    }
    platforms
        .iter()
        .filter(|p| {
            fighter.x >= p.rect.x + PLATFORM_INNER_MARGIN
                && fighter.x <= p.rect.right() - PLATFORM_INNER_MARGIN
        })
        .map(Platform::top)
        .filter(|top| prev_y <= top + LANDING_BAND_BELOW && fighter.y >= top - LANDING_BAND_ABOVE)
        .min_by(|a, b| a.total_cmp(b))
}

fn contain(fighter: &mut Fighter, bounds: Bounds, report: &mut StepReport) {
    let min_x = FIGHTER_HALF_WIDTH.min(bounds.width / 2.0);
    let max_x = (bounds.width - FIGHTER_HALF_WIDTH).max(min_x);
    if !fighter.x.is_finite() {
        fighter.x = bounds.width / 2.0;
        fighter.vx = 0.0;
    }
    if fighter.x < min_x || fighter.x > max_x {
        fighter.x = fighter.x.clamp(min_x, max_x);
        fighter.vx = 0.0;
    }

    if !fighter.y.is_finite() || fighter.y > bounds.height + FALL_RESET_MARGIN {
        fighter.y = -RESPAWN_HEIGHT;
        fighter.vy = 0.0;
        fighter.grounded = false;
        report.respawned = true;
    }
}

fn airborne_state(vy: f32) -> AnimState {
    if vy < -AIRBORNE_VY_THRESHOLD {
        AnimState::Jump
    } else if vy > AIRBORNE_VY_THRESHOLD {
        AnimState::Fall
    } else {
        AnimState::Airborne
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationTable, Archetype};
    use crate::arena::Rect;
    use crate::fighter::Team;
    use crate::rng::ScriptedRng;
    use std::sync::Arc;

    const DT: f32 = 1.0 / 60.0;

    fn fighter_at(x: f32, y: f32) -> Fighter {
        let mut f = Fighter::new(
            "P",
            Team::Left,
            400,
            Arc::new(AnimationTable::builtin(Archetype::Swordsman)),
        );
        f.x = x;
        f.y = y;
        f
    }

    fn world() -> (Vec<Platform>, Bounds) {
        let bounds = Bounds {
            width: 800.0,
            height: 600.0,
        };
        let platforms = vec![
            Platform::floor(800.0, 600.0),
            Platform::element(Rect::new(300.0, 400.0, 200.0, 60.0)),
        ];
        (platforms, bounds)
    }

    fn run(f: &mut Fighter, ticks: usize) -> Vec<StepReport> {
        let (platforms, bounds) = world();
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.5);
        (0..ticks)
            .map(|_| step(f, &platforms, bounds, DT, &mut fx, &mut rng))
            .collect()
    }

    #[test]
    fn test_falls_and_lands_on_floor() {
        let mut f = fighter_at(100.0, 500.0);
        let reports = run(&mut f, 120);
        assert!(reports.iter().any(|r| r.landed));
        assert!(f.grounded);
        assert_eq!(f.y, 600.0);
        assert_eq!(f.vy, 0.0);
    }

    #[test]
    fn test_lands_on_element_platform() {
        let mut f = fighter_at(400.0, 350.0);
        run(&mut f, 60);
        assert!(f.grounded);
        assert_eq!(f.y, 400.0);
    }

    #[test]
    fn test_rising_passes_through_platform() {
        let mut f = fighter_at(400.0, 410.0);
        f.vy = -JUMP_SPEED;
        let (platforms, bounds) = world();
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.5);
        step(&mut f, &platforms, bounds, DT, &mut fx, &mut rng);
        assert!(!f.grounded);
        assert!(f.y < 410.0);
        assert_eq!(f.anim.state, AnimState::Jump);
    }

    #[test]
    fn test_outside_inner_margin_does_not_land() {
        let mut f = fighter_at(302.0, 399.0);
        f.vy = 10.0;
        let (platforms, bounds) = world();
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.5);
        step(&mut f, &platforms, bounds, DT, &mut fx, &mut rng);
        assert!(!f.grounded);
    }

    #[test]
    fn test_landing_emits_dust_and_land_state() {
        let mut f = fighter_at(100.0, 595.0);
        f.vy = 300.0;
        f.anim.set(AnimState::Fall);
        let (platforms, bounds) = world();
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.5);
        let report = step(&mut f, &platforms, bounds, DT, &mut fx, &mut rng);
        assert!(report.landed);
        assert_eq!(f.anim.state, AnimState::Land);
        assert_eq!(fx.particles.len(), DUST_COUNT);
    }

    #[test]
    fn test_horizontal_clamp() {
        let mut f = fighter_at(790.0, 600.0);
        f.grounded = true;
        f.vx = 500.0;
        run(&mut f, 1);
        assert_eq!(f.x, 800.0 - FIGHTER_HALF_WIDTH);
        assert_eq!(f.vx, 0.0);
    }

    #[test]
    fn test_fall_below_container_resets_above() {
        let mut f = fighter_at(100.0, 600.0 + FALL_RESET_MARGIN + 5.0);
        let reports = run(&mut f, 1);
        assert!(reports[0].respawned);
        assert!(f.y < 0.0);
    }

    #[test]
    fn test_long_step_cannot_tunnel() {
        let (platforms, bounds) = world();
        let mut fx = Effects::default();
        let mut rng = ScriptedRng::constant(0.5);
        let mut f = fighter_at(100.0, 100.0);
        let mut reports = Vec::new();
        for _ in 0..200 {
            reports.push(step(&mut f, &platforms, bounds, 0.12, &mut fx, &mut rng));
        }
        assert!(reports.iter().all(|r| !r.respawned));
        assert!(f.grounded);
        assert_eq!(f.y, 600.0);

        // the element platform sits in the first long fall's path
        let mut f = fighter_at(400.0, 300.0);
        f.vy = MAX_FALL_SPEED;
        step(&mut f, &platforms, bounds, 0.2, &mut fx, &mut rng);
        assert!(f.grounded);
        assert_eq!(f.y, 400.0);
    }

    #[test]
    fn test_timers_never_negative() {
        let mut f = fighter_at(100.0, 600.0);
        f.hitstun = 0.01;
        f.invulnerable = 0.02;
        run(&mut f, 3);
        assert_eq!(f.hitstun, 0.0);
        assert_eq!(f.invulnerable, 0.0);
    }

    #[test]
    fn test_friction_and_run_state() {
        let mut f = fighter_at(100.0, 600.0);
        f.grounded = true;
        f.vx = 200.0;
        run(&mut f, 1);
        assert!(f.vx < 200.0);
        assert_eq!(f.anim.state, AnimState::Run);
        run(&mut f, 60);
        assert_eq!(f.anim.state, AnimState::Idle);
    }

    #[test]
    fn test_attack_clears_flag_when_clip_ends() {
        let mut f = fighter_at(100.0, 600.0);
        f.grounded = true;
        f.start_attack();
        let reports = run(&mut f, 60);
        assert!(reports.iter().any(|r| r.attack_finished));
        assert!(!f.attacking);
        assert_eq!(f.anim.state, AnimState::Idle);
    }
}
