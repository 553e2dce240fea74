//! Short-lived visual debris: landing dust, hit sparks and critical bursts.
//!
//! Particles never affect combat; they exist only for the renderer.

use serde::Serialize;

use crate::constants::*;
use crate::rng::BattleRng;

/// RGBA color, components in 0..=1
pub type Color = [f32; 4];

pub const DUST_COLOR: Color = [0.78, 0.72, 0.62, 0.9];
pub const SPARK_COLOR: Color = [1.0, 0.86, 0.35, 1.0];
pub const CRIT_COLOR: Color = [1.0, 0.32, 0.22, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub color: Color,
    pub gravity: f32,
}

impl Particle {
    /// Opacity for fading, 1.0 when fresh
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 0.0;
        }
        (self.life / self.max_life).clamp(0.0, 1.0)
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Pool of live particles
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Add one particle; the oldest is evicted at capacity
    pub fn spawn(&mut self, particle: Particle) {
        if self.particles.len() >= MAX_PARTICLES {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// Dust puff at a fighter's feet (jump lift-off, landing)
    pub fn emit_dust(&mut self, x: f32, y: f32, rng: &mut dyn BattleRng) {
        for _ in 0..DUST_COUNT {
            let life = rng.range(0.25, 0.2);
            self.spawn(Particle {
                x: x + rng.range(-12.0, 24.0),
                y,
                vx: rng.range(-70.0, 140.0),
                vy: rng.range(-60.0, 40.0),
                life,
                max_life: life,
                size: rng.range(2.0, 3.0),
                color: DUST_COLOR,
                gravity: PARTICLE_GRAVITY * 0.3,
            });
        }
    }

    /// Sparks flying away from the attacker in direction `dir` (+1 right, -1 left)
    pub fn emit_sparks(&mut self, x: f32, y: f32, dir: f32, rng: &mut dyn BattleRng) {
        for _ in 0..SPARK_COUNT {
            let life = rng.range(0.2, 0.25);
            self.spawn(Particle {
                x,
                y,
                vx: dir * rng.range(80.0, 220.0),
                vy: rng.range(-220.0, 180.0),
                life,
                max_life: life,
                size: rng.range(2.0, 2.5),
                color: SPARK_COLOR,
                gravity: PARTICLE_GRAVITY,
            });
        }
    }

    /// Radial burst for a critical hit
    pub fn emit_burst(&mut self, x: f32, y: f32, rng: &mut dyn BattleRng) {
        for i in 0..CRIT_BURST_COUNT {
            let angle = (i as f32 / CRIT_BURST_COUNT as f32) * std::f32::consts::TAU
                + rng.range(0.0, 0.3);
            let speed = rng.range(160.0, 200.0);
            let life = rng.range(0.35, 0.3);
            self.spawn(Particle {
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                life,
                max_life: life,
                size: rng.range(3.0, 3.0),
                color: CRIT_COLOR,
                gravity: 0.0,
            });
        }
    }

    /// Integrate and drop expired particles
    pub fn update(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.vy += p.gravity * dt;
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.life -= dt;
        }
        self.particles.retain(Particle::is_alive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;

    #[test]
    fn test_emitters_counts() {
        let mut rng = ScriptedRng::constant(0.5);
        let mut ps = ParticleSystem::new();
        ps.emit_dust(0.0, 0.0, &mut rng);
        assert_eq!(ps.len(), DUST_COUNT);
        ps.emit_sparks(0.0, 0.0, 1.0, &mut rng);
        assert_eq!(ps.len(), DUST_COUNT + SPARK_COUNT);
        ps.emit_burst(0.0, 0.0, &mut rng);
        assert_eq!(ps.len(), DUST_COUNT + SPARK_COUNT + CRIT_BURST_COUNT);
    }

    #[test]
    fn test_sparks_follow_direction() {
        let mut rng = ScriptedRng::constant(0.5);
        let mut ps = ParticleSystem::new();
        ps.emit_sparks(0.0, 0.0, -1.0, &mut rng);
        assert!(ps.iter().all(|p| p.vx < 0.0));
    }

    #[test]
    fn test_update_expires() {
        let mut rng = ScriptedRng::constant(0.0);
        let mut ps = ParticleSystem::new();
        ps.emit_dust(0.0, 0.0, &mut rng);
        ps.update(0.1);
        assert_eq!(ps.len(), DUST_COUNT);
        assert!(ps.iter().all(|p| p.alpha() < 1.0));
        ps.update(1.0);
        assert!(ps.is_empty());
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut ps = ParticleSystem::new();
        ps.spawn(Particle {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            life: 1.0,
            max_life: 1.0,
            size: 1.0,
            color: DUST_COLOR,
            gravity: 100.0,
        });
        ps.update(0.1);
        let p = ps.iter().next().unwrap();
        assert!(p.vy > 0.0);
        assert!(p.y > 0.0);
    }

    #[test]
    fn test_capacity_bound() {
        let mut rng = ScriptedRng::constant(0.5);
        let mut ps = ParticleSystem::new();
        for _ in 0..100 {
            ps.emit_burst(0.0, 0.0, &mut rng);
        }
        assert_eq!(ps.len(), MAX_PARTICLES);
    }
}
