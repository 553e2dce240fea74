use crate::arena::{Bounds, Platform};
use crate::constants::*;
use crate::fighter::{Fighter, Team};
use crate::particles::ParticleSystem;
use crate::rng::BattleRng;

/// Transient camera shake magnitude
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenShake {
    magnitude: f32,
}

impl ScreenShake {
    /// Raise the magnitude to at least `strength`
    pub fn pulse(&mut self, strength: f32) {
        if strength.is_finite() {
            self.magnitude = self.magnitude.max(strength);
        }
    }

    pub fn decay(&mut self, dt: f32) {
        self.magnitude = (self.magnitude - SHAKE_DECAY_PER_SEC * dt).max(0.0);
    }

    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    pub fn clear(&mut self) {
        self.magnitude = 0.0;
    }
}

/// Visual side effects written by AI, physics and combat
#[derive(Debug, Clone, Default)]
pub struct Effects {
    pub particles: ParticleSystem,
    pub shake: ScreenShake,
}

impl Effects {
    pub fn clear(&mut self) {
        self.particles.clear();
        self.shake.clear();
    }
}

/// Everything one tick mutates, owned by the clock and lent to each stage
pub struct SimContext {
    pub fighters: [Fighter; 2],
    pub effects: Effects,
    pub rng: Box<dyn BattleRng>,
    pub platforms: Vec<Platform>,
    pub bounds: Bounds,
    /// Set once a KO is registered; suppresses further AI and attacks
    pub battle_over: bool,
    pub winner: Option<Team>,
}

impl SimContext {
    pub fn new(fighters: [Fighter; 2], rng: Box<dyn BattleRng>) -> Self {
        Self {
            fighters,
            effects: Effects::default(),
            rng,
            platforms: Vec::new(),
            bounds: Bounds::default(),
            battle_over: false,
            winner: None,
        }
    }

    pub fn fighter(&self, team: Team) -> &Fighter {
        &self.fighters[team.index()]
    }

    pub fn fighter_mut(&mut self, team: Team) -> &mut Fighter {
        &mut self.fighters[team.index()]
    }

    /// Split borrow: `team`'s fighter, its opponent, effects and rng
    pub fn pair_mut(
        &mut self,
        team: Team,
    ) -> (&mut Fighter, &mut Fighter, &mut Effects, &mut dyn BattleRng) {
        let [left, right] = &mut self.fighters;
        let (me, opponent) = match team {
            Team::Left => (left, right),
            Team::Right => (right, left),
        };
        (me, opponent, &mut self.effects, &mut *self.rng)
    }

    /// Put both fighters back on their start marks with full HP
    pub fn reset(&mut self) {
        let offset = self.bounds.width * START_OFFSET_FRACTION;
        let ground = self.bounds.height;
        let [left, right] = &mut self.fighters;
        left.reset(offset, ground);
        right.reset(self.bounds.width - offset, ground);
        left.grounded = true;
        right.grounded = true;
        self.effects.clear();
        self.battle_over = false;
        self.winner = None;
    }
}
