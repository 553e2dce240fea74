//! Simulation clock: owns the battle and advances it once per host frame.
//!
//! The host calls [`Simulation::tick`] with its own monotonic timestamp in
//! milliseconds. Elapsed time is clamped to `max_step_ms` before it reaches
//! the simulation so a throttled host never causes a burst of catch-up work.
//! Delayed work (end of battle, log expiry) lives in a [`TimerQueue`] keyed
//! by host time and is polled at the top of every tick.

use std::sync::Arc;

use serde::Serialize;

use crate::ai;
use crate::animation::{AnimState, AnimationTable};
use crate::arena::{ArenaProvider, Bounds, HostElement, LayoutArena, Rect};
use crate::battle_log::{self, BattleLog};
use crate::combat;
use crate::error::BattleError;
use crate::fighter::{Fighter, Team};
use crate::physics;
use crate::rng::{BattleRng, SeededRng};

use super::config::BattleConfig;
use super::context::SimContext;
use super::snapshot::{Renderer, Snapshot};
use super::timers::{TimerEvent, TimerQueue};

/// Invoked once with the winning side when a battle ends
pub type CompletionCallback = Box<dyn FnMut(Team) + Send + Sync>;

/// Running totals for the current battle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BattleStats {
    pub ticks: u64,
    pub sim_seconds: f64,
    pub hits: u32,
    pub crits: u32,
}

pub struct Simulation {
    config: BattleConfig,
    ctx: SimContext,
    arena: Box<dyn ArenaProvider>,
    container: Option<Rect>,
    log: BattleLog,
    timers: TimerQueue,
    /// Timers requested before the host reported any time
    deferred: Vec<(f64, TimerEvent)>,
    on_complete: Option<CompletionCallback>,
    host_ms: Option<f64>,
    running: bool,
    finished: bool,
    disposed: bool,
    stats: BattleStats,
}

impl Simulation {
    /// Build a simulation; starts immediately when `config.auto_start` is set
    pub fn new(config: BattleConfig, arena: Box<dyn ArenaProvider>) -> Result<Self, BattleError> {
        config.validate()?;

        let rng: Box<dyn BattleRng> = match config.seed {
            Some(seed) => Box::new(SeededRng::from_seed_u64(seed)),
            None => Box::new(SeededRng::from_entropy()),
        };

        let left_table = Arc::new(AnimationTable::builtin(config.left_archetype));
        let right_table = if config.right_archetype == config.left_archetype {
            Arc::clone(&left_table)
        } else {
            Arc::new(AnimationTable::builtin(config.right_archetype))
        };
        let fighters = [
            Fighter::new(config.left_name.clone(), Team::Left, config.max_hp, left_table),
            Fighter::new(config.right_name.clone(), Team::Right, config.max_hp, right_table),
        ];

        let mut sim = Self {
            log: BattleLog::new(config.log_capacity),
            ctx: SimContext::new(fighters, rng),
            arena,
            container: None,
            timers: TimerQueue::new(),
            deferred: Vec::new(),
            on_complete: None,
            host_ms: None,
            running: false,
            finished: false,
            disposed: false,
            stats: BattleStats::default(),
            config,
        };
        sim.refresh_arena();
        sim.ctx.reset();

        if sim.config.auto_start {
            sim.start();
        }
        Ok(sim)
    }

    /// Simulation whose platforms come from the host page layout
    pub fn with_layout(config: BattleConfig) -> Result<Self, BattleError> {
        let arena = LayoutArena::new(config.platform_selectors.clone()).with_fallback(Bounds {
            width: config.default_arena_width,
            height: config.default_arena_height,
        });
        Self::new(config, Box::new(arena))
    }

    /// Replace the random source
    pub fn with_rng(mut self, rng: Box<dyn BattleRng>) -> Self {
        self.ctx.rng = rng;
        self
    }

    pub fn on_complete(mut self, callback: impl FnMut(Team) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Reset both fighters and begin a fresh battle
    pub fn start(&mut self) {
        if self.disposed {
            return;
        }
        self.timers.clear();
        self.deferred.clear();
        self.log.clear();
        self.refresh_arena();
        self.ctx.reset();
        self.stats = BattleStats::default();
        self.finished = false;
        self.running = true;

        let [left, right] = &self.ctx.fighters;
        let message = battle_log::start_message(&left.name, &right.name);
        tracing::info!(left = %left.name, right = %right.name, "battle started");
        self.push_log(message);
    }

    /// Freeze the battle; fighter state is kept so the last frame can render
    pub fn stop(&mut self) {
        let cancelled = self.timers.len() + self.deferred.len();
        self.timers.clear();
        self.deferred.clear();
        if self.running {
            tracing::info!(cancelled_timers = cancelled, "battle stopped");
        }
        self.running = false;
    }

    /// Stop and detach from the host; later ticks do nothing
    pub fn dispose(&mut self) {
        self.stop();
        self.on_complete = None;
        self.disposed = true;
    }

    // =========================================================================
    // Host input
    // =========================================================================

    /// Set the bounding container in page coordinates (`None` if not mounted)
    pub fn set_container(&mut self, container: Option<Rect>) {
        self.container = container;
    }

    /// Push the host layout: container plus candidate platform elements
    pub fn set_layout(&mut self, container: Option<Rect>, elements: Vec<HostElement>) {
        self.container = container;
        self.arena.update_layout(elements);
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advance to host time `now_ms`; returns `None` once disposed
    pub fn tick(&mut self, now_ms: f64) -> Option<Snapshot> {
        if self.disposed {
            return None;
        }

        let dt_ms = self.advance_host_time(now_ms);
        self.fire_timers();

        if self.running {
            self.step((dt_ms / 1000.0) as f32);
        }

        Some(self.snapshot())
    }

    /// Tick, then hand the frame to `renderer`; render failures are logged only
    pub fn tick_and_render(&mut self, now_ms: f64, renderer: &mut dyn Renderer) -> Option<Snapshot> {
        let frame = self.tick(now_ms)?;
        if let Err(err) = renderer.present(&frame) {
            tracing::warn!(error = %err, "renderer skipped frame");
        }
        Some(frame)
    }

    fn advance_host_time(&mut self, now_ms: f64) -> f64 {
        if !now_ms.is_finite() {
            return 0.0;
        }
        let dt_ms = match self.host_ms {
            Some(prev) => (now_ms - prev).clamp(0.0, self.config.max_step_ms),
            None => 0.0,
        };
        // host time never runs backwards
        let now = self.host_ms.map_or(now_ms, |prev| prev.max(now_ms));
        if self.host_ms.is_none() {
            for (delay, event) in std::mem::take(&mut self.deferred) {
                if let TimerEvent::ExpireLog { entry } = event {
                    self.log.stamp(entry, now);
                }
                self.timers.schedule(now + delay, event);
            }
        }
        self.host_ms = Some(now);
        dt_ms
    }

    fn fire_timers(&mut self) {
        let Some(now) = self.host_ms else {
            return;
        };
        for event in self.timers.due(now) {
            tracing::trace!(?event, now_ms = now, "timer fired");
            match event {
                TimerEvent::ExpireLog { entry } if self.running => {
                    self.log.expire(entry);
                }
                TimerEvent::ExpireLog { .. } => {}
                TimerEvent::EndBattle { winner } => self.finish(winner),
            }
        }
    }

    fn step(&mut self, dt: f32) {
        self.refresh_arena();
        self.stats.ticks += 1;
        self.stats.sim_seconds += f64::from(dt);

        if !self.ctx.battle_over {
            for team in [Team::Left, Team::Right] {
                let (me, opponent, effects, rng) = self.ctx.pair_mut(team);
                ai::think(me, opponent, dt, effects, rng);
            }
        }

        let ctx = &mut self.ctx;
        for fighter in ctx.fighters.iter_mut() {
            physics::step(
                fighter,
                &ctx.platforms,
                ctx.bounds,
                dt,
                &mut ctx.effects,
                &mut *ctx.rng,
            );
        }

        if !self.ctx.battle_over {
            for team in [Team::Left, Team::Right] {
                let (attacker, defender, effects, rng) = self.ctx.pair_mut(team);
                if let Some(hit) = combat::resolve(attacker, defender, effects, rng) {
                    self.stats.hits += 1;
                    if hit.critical {
                        self.stats.crits += 1;
                    }
                    self.push_log(hit.message);
                }
            }
        }

        self.ctx.effects.particles.update(dt);
        self.ctx.effects.shake.decay(dt);

        self.check_winner();
    }

    fn refresh_arena(&mut self) {
        let fallback = Bounds {
            width: self.config.default_arena_width,
            height: self.config.default_arena_height,
        };
        self.ctx.bounds = Bounds::resolve(self.container.as_ref(), fallback);
        self.ctx.platforms = self.arena.platforms(self.container.as_ref());
    }

    // =========================================================================
    // Win condition
    // =========================================================================

    /// Register a KO if a fighter just reached 0 HP; returns the winner the
    /// first time only. The end-of-battle transition is scheduled once.
    pub fn check_winner(&mut self) -> Option<Team> {
        let mut decided = None;

        for team in [Team::Left, Team::Right] {
            let loser = self.ctx.fighter(team);
            if loser.hp > 0 || loser.defeated {
                continue;
            }
            let winner = team.opponent();
            let already_over = self.ctx.battle_over;
            let [left, right] = &mut self.ctx.fighters;
            let (loser, victor) = match team {
                Team::Left => (left, right),
                Team::Right => (right, left),
            };
            loser.defeated = true;
            loser.enter_terminal(AnimState::KnockedOut);

            if already_over {
                continue;
            }
            victor.enter_terminal(AnimState::Victory);
            let message = battle_log::knockout_message(&victor.name, &loser.name);
            tracing::info!(winner = %victor.name, loser = %loser.name, "knockout");

            self.ctx.battle_over = true;
            self.ctx.winner = Some(winner);
            self.schedule_in(self.config.end_delay_ms, TimerEvent::EndBattle { winner });
            self.push_log(message);
            decided = Some(winner);
        }

        decided
    }

    fn finish(&mut self, winner: Team) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.stop();
        tracing::info!(%winner, ticks = self.stats.ticks, "battle finished");
        if let Some(callback) = self.on_complete.as_mut() {
            callback(winner);
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn schedule_in(&mut self, delay_ms: f64, event: TimerEvent) {
        match self.host_ms {
            Some(now) => {
                self.timers.schedule(now + delay_ms, event);
            }
            None => self.deferred.push((delay_ms, event)),
        }
    }

    fn push_log(&mut self, message: String) {
        let now = self.host_ms.unwrap_or(0.0);
        let pushed = self.log.push(message, now);
        for evicted in pushed.evicted {
            self.timers
                .cancel_where(|e| *e == TimerEvent::ExpireLog { entry: evicted });
            self.deferred
                .retain(|(_, e)| *e != TimerEvent::ExpireLog { entry: evicted });
        }
        self.schedule_in(
            self.config.log_display_ms,
            TimerEvent::ExpireLog { entry: pushed.id },
        );
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.ctx, self.log.entries(), self.running)
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    /// Mutable access for hosts and tests that stage a situation directly
    pub fn context_mut(&mut self) -> &mut SimContext {
        &mut self.ctx
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn stats(&self) -> BattleStats {
        self.stats
    }

    pub fn winner(&self) -> Option<Team> {
        self.ctx.winner
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True once the end-of-battle transition has fired
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len() + self.deferred.len()
    }
}
