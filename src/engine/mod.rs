//! Battle engine: the simulation clock and everything it owns.
//!
//! Architecture:
//!   Host frame callback → `Simulation::tick(now_ms)` → `Snapshot` → renderer
//!
//! Per tick, in order:
//!   1. Fire due timers (log expiry, end of battle)
//!   2. Query the arena for platforms
//!   3. AI for both fighters
//!   4. Physics for both fighters
//!   5. Combat left→right, then right→left
//!   6. Particles, screen shake, win check

pub mod clock;
pub mod config;
pub mod context;
pub mod plugin;
pub mod snapshot;
pub mod timers;

pub use clock::{BattleStats, CompletionCallback, Simulation};
pub use config::BattleConfig;
pub use context::{Effects, ScreenShake, SimContext};
pub use plugin::{BattleFinished, BattleFrame, BattlePlugin, BattleResource};
pub use snapshot::{FighterView, ParticleView, Renderer, Snapshot};
pub use timers::{TimerEvent, TimerId, TimerQueue};

// =====================================================
// Tests
// =====================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimState;
    use crate::arena::{FixedArena, HostElement, Rect};
    use crate::error::RenderError;
    use crate::fighter::Team;

    fn test_sim() -> Simulation {
        Simulation::new(
            BattleConfig {
                seed: Some(42),
                ..Default::default()
            },
            Box::new(FixedArena::floor_only(960.0, 540.0)),
        )
        .unwrap()
    }

    fn run_until_finished(sim: &mut Simulation, max_ticks: usize) -> f64 {
        let mut now = 0.0;
        for _ in 0..max_ticks {
            sim.tick(now);
            if sim.is_finished() {
                break;
            }
            now += 16.0;
        }
        now
    }

    #[test]
    fn test_seeded_battle_reaches_winner() {
        let mut sim = test_sim();
        run_until_finished(&mut sim, 200_000);
        assert!(sim.is_finished());
        let winner = sim.winner().unwrap();
        let loser = sim.context().fighter(winner.opponent());
        assert_eq!(loser.hp, 0);
        assert!(loser.defeated);
        assert!(sim.stats().hits > 0);
    }

    #[test]
    fn test_same_seed_same_battle() {
        let mut a = test_sim();
        let mut b = test_sim();
        let ta = run_until_finished(&mut a, 200_000);
        let tb = run_until_finished(&mut b, 200_000);
        assert_eq!(ta, tb);
        assert_eq!(a.winner(), b.winner());
        assert_eq!(a.stats(), b.stats());
    }

    #[test]
    fn test_start_places_fighters_on_floor() {
        let sim = test_sim();
        for fighter in &sim.context().fighters {
            assert!(fighter.grounded);
            assert_eq!(fighter.y, 540.0);
        }
    }

    #[test]
    fn test_layout_platforms_reach_context() {
        let mut sim = Simulation::with_layout(BattleConfig {
            seed: Some(1),
            ..Default::default()
        })
        .unwrap();
        sim.set_layout(
            Some(Rect::new(0.0, 0.0, 800.0, 600.0)),
            vec![HostElement {
                selector: "section".into(),
                rect: Rect::new(200.0, 300.0, 300.0, 100.0),
            }],
        );
        sim.tick(0.0);
        assert_eq!(sim.context().platforms.len(), 2);
        assert_eq!(sim.context().bounds.width, 800.0);
    }

    struct FailingRenderer {
        calls: usize,
    }

    impl Renderer for FailingRenderer {
        fn present(&mut self, _frame: &Snapshot) -> Result<(), RenderError> {
            self.calls += 1;
            Err(RenderError::AssetsNotReady("sprites".into()))
        }
    }

    #[test]
    fn test_render_failure_does_not_stop_battle() {
        let mut sim = test_sim();
        let mut renderer = FailingRenderer { calls: 0 };
        for i in 0..10 {
            assert!(sim.tick_and_render(i as f64 * 16.0, &mut renderer).is_some());
        }
        assert_eq!(renderer.calls, 10);
        assert!(sim.is_running());
    }

    #[test]
    fn test_restart_after_knockout() {
        let mut sim = test_sim();
        run_until_finished(&mut sim, 200_000);
        sim.start();
        for fighter in &sim.context().fighters {
            assert_eq!(fighter.hp, fighter.max_hp);
            assert!(!fighter.defeated);
            assert_eq!(fighter.anim.state, AnimState::Idle);
        }
        assert!(sim.winner().is_none());
        assert_eq!(sim.log().len(), 1);
        assert_ne!(
            sim.context().fighter(Team::Left).x,
            sim.context().fighter(Team::Right).x
        );
    }
}
