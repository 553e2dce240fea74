//! Fighter model: kinematics, vitality, combat timers and animation state for
//! one combatant.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::animation::{AnimState, AnimationTable, Animator};

/// Which side of the arena a fighter starts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Left,
    Right,
}

impl Team {
    pub fn opponent(&self) -> Team {
        match self {
            Team::Left => Team::Right,
            Team::Right => Team::Left,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Team::Left => 0,
            Team::Right => 1,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Left => f.write_str("left"),
            Team::Right => f.write_str("right"),
        }
    }
}

/// Horizontal orientation; `Left` means the sprite is mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(&self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn is_mirrored(&self) -> bool {
        *self == Facing::Left
    }

    /// Facing toward `target_x` from `x`; ties keep `current`
    pub fn toward(x: f32, target_x: f32, current: Facing) -> Facing {
        if target_x > x {
            Facing::Right
        } else if target_x < x {
            Facing::Left
        } else {
            current
        }
    }
}

/// One combatant
#[derive(Debug, Clone)]
pub struct Fighter {
    pub name: String,
    pub team: Team,

    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub grounded: bool,
    pub facing: Facing,

    pub hp: u32,
    pub max_hp: u32,
    pub defeated: bool,

    pub attacking: bool,
    pub attack_timer: f32,
    pub hit_landed: bool,
    pub hitstun: f32,
    pub invulnerable: f32,
    pub decision_timer: f32,

    pub anim: Animator,
    pub table: Arc<AnimationTable>,
}

impl Fighter {
    pub fn new(
        name: impl Into<String>,
        team: Team,
        max_hp: u32,
        table: Arc<AnimationTable>,
    ) -> Self {
        Self {
            name: name.into(),
            team,
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            grounded: false,
            facing: match team {
                Team::Left => Facing::Right,
                Team::Right => Facing::Left,
            },
            hp: max_hp,
            max_hp,
            defeated: false,
            attacking: false,
            attack_timer: 0.0,
            hit_landed: false,
            hitstun: 0.0,
            invulnerable: 0.0,
            decision_timer: 0.0,
            anim: Animator::default(),
            table,
        }
    }

    /// Restore full HP and clear all transient state at `(x, y)`
    pub fn reset(&mut self, x: f32, y: f32) {
        let name = std::mem::take(&mut self.name);
        *self = Self::new(name, self.team, self.max_hp, Arc::clone(&self.table));
        self.x = x;
        self.y = y;
    }

    pub fn is_stunned(&self) -> bool {
        self.hitstun > 0.0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }

    /// Able to take an AI decision this tick
    pub fn can_act(&self) -> bool {
        !self.defeated && !self.is_stunned() && !self.attacking && !self.anim.state.is_terminal()
    }

    /// Subtract damage, saturating at 0; returns HP actually removed
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.hp);
        self.hp -= removed;
        removed
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.hp as f32 / self.max_hp as f32
    }

    pub fn distance_to(&self, other: &Fighter) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Begin a swing from frame 0
    pub fn start_attack(&mut self) {
        self.attacking = true;
        self.attack_timer = 0.0;
        self.hit_landed = false;
        self.anim.force(AnimState::Attack);
    }

    /// End any swing in progress
    pub fn cancel_attack(&mut self) {
        self.attacking = false;
        self.attack_timer = 0.0;
    }

    /// Enter a terminal animation and stop all combat activity
    pub fn enter_terminal(&mut self, state: AnimState) {
        self.cancel_attack();
        self.hitstun = 0.0;
        self.anim.force(state);
    }

    pub fn sprite_row(&self) -> u32 {
        self.anim.row(&self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Archetype;

    fn fighter() -> Fighter {
        Fighter::new(
            "Test",
            Team::Left,
            400,
            Arc::new(AnimationTable::builtin(Archetype::Swordsman)),
        )
    }

    #[test]
    fn test_new_fighter_full_hp() {
        let f = fighter();
        assert_eq!(f.hp, 400);
        assert!(!f.defeated);
        assert_eq!(f.facing, Facing::Right);
        assert!(f.can_act());
    }

    #[test]
    fn test_damage_saturates() {
        let mut f = fighter();
        assert_eq!(f.apply_damage(30), 30);
        assert_eq!(f.hp, 370);
        assert_eq!(f.apply_damage(1000), 370);
        assert_eq!(f.hp, 0);
    }

    #[test]
    fn test_reset_restores_everything() {
        let mut f = fighter();
        f.apply_damage(400);
        f.defeated = true;
        f.hitstun = 0.2;
        f.enter_terminal(AnimState::KnockedOut);
        f.reset(10.0, 20.0);
        assert_eq!(f.hp, f.max_hp);
        assert!(!f.defeated);
        assert_eq!(f.anim.state, AnimState::Idle);
        assert_eq!(f.name, "Test");
        assert_eq!((f.x, f.y), (10.0, 20.0));
    }

    #[test]
    fn test_facing_toward() {
        assert_eq!(Facing::toward(0.0, 5.0, Facing::Left), Facing::Right);
        assert_eq!(Facing::toward(5.0, 0.0, Facing::Right), Facing::Left);
        assert_eq!(Facing::toward(5.0, 5.0, Facing::Left), Facing::Left);
    }

    #[test]
    fn test_attack_lifecycle_flags() {
        let mut f = fighter();
        f.start_attack();
        assert!(f.attacking);
        assert!(!f.can_act());
        assert_eq!(f.anim.state, AnimState::Attack);
        f.cancel_attack();
        assert!(!f.attacking);
    }
}
