//! Read-only per-tick output for renderers and HUDs.

use serde::Serialize;

use crate::animation::AnimState;
use crate::battle_log::LogEntry;
use crate::error::RenderError;
use crate::fighter::{Facing, Fighter, Team};
use crate::particles::{Color, Particle};

use super::context::SimContext;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FighterView {
    pub name: String,
    pub team: Team,
    pub x: f32,
    pub y: f32,
    pub hp: u32,
    pub max_hp: u32,
    pub facing: Facing,
    /// Draw the sprite flipped horizontally
    pub mirrored: bool,
    /// HP as a fraction of max, for health bars
    pub health: f32,
    pub state: AnimState,
    pub frame: usize,
    pub row: u32,
    pub defeated: bool,
}

impl From<&Fighter> for FighterView {
    fn from(f: &Fighter) -> Self {
        Self {
            name: f.name.clone(),
            team: f.team,
            x: f.x,
            y: f.y,
            hp: f.hp,
            max_hp: f.max_hp,
            facing: f.facing,
            mirrored: f.facing.is_mirrored(),
            health: f.health_fraction(),
            state: f.anim.state,
            frame: f.anim.frame,
            row: f.sprite_row(),
            defeated: f.defeated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Color,
    pub alpha: f32,
}

impl From<&Particle> for ParticleView {
    fn from(p: &Particle) -> Self {
        Self {
            x: p.x,
            y: p.y,
            size: p.size,
            color: p.color,
            alpha: p.alpha(),
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub fighters: [FighterView; 2],
    pub particles: Vec<ParticleView>,
    pub log: Vec<LogEntry>,
    pub shake: f32,
    pub running: bool,
    pub winner: Option<Team>,
}

impl Snapshot {
    pub fn capture(ctx: &SimContext, log: &[LogEntry], running: bool) -> Self {
        let [left, right] = &ctx.fighters;
        Self {
            fighters: [FighterView::from(left), FighterView::from(right)],
            particles: ctx.effects.particles.iter().map(ParticleView::from).collect(),
            log: log.to_vec(),
            shake: ctx.effects.shake.magnitude(),
            running,
            winner: ctx.winner,
        }
    }

    pub fn fighter(&self, team: Team) -> &FighterView {
        &self.fighters[team.index()]
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Paints snapshots; failures are reported back to the clock, which logs them
pub trait Renderer {
    fn present(&mut self, frame: &Snapshot) -> Result<(), RenderError>;
}
