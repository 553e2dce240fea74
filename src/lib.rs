//! Battle Overlay - Simulation Core Library
//!
//! An autonomous two-fighter battle that runs on top of arbitrary host
//! content:
//! - AI controllers with staggered, randomized decision intervals
//! - Arcade platform physics with one-sided landing on host layout elements
//! - Combat resolution with crits, knockback, hitstun and invulnerability
//! - Per-archetype animation tables and state machine
//! - Particles, screen shake and a rolling battle log
//! - Simulation clock with clamped timestep and host-time timers
//! - Bevy plugin, C-ABI bridge and a headless balance runner

pub mod ai;
pub mod animation;
pub mod arena;
pub mod balance;
pub mod battle_log;
pub mod bridge;
pub mod combat;
pub mod constants;
pub mod engine;
pub mod error;
pub mod fighter;
pub mod logging;
pub mod particles;
pub mod physics;
pub mod rng;
