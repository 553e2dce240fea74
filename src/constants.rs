//! Centralized tuning constants for the battle simulation.
//!
//! Units: distances in container pixels (y grows downward), times in seconds
//! unless the name ends in `_MS`, velocities in pixels per second.

// =====================================================
// Clock
// =====================================================

/// Largest timestep a single tick may simulate (40ms)
pub const MAX_STEP_MS: f64 = 40.0;

/// Delay between a KO and the end-of-battle transition
pub const END_DELAY_MS: f64 = 1500.0;

/// Starting HP for both fighters
pub const DEFAULT_MAX_HP: u32 = 400;

/// Starting offset of each fighter from its container edge, as a fraction of width
pub const START_OFFSET_FRACTION: f32 = 0.2;

// =====================================================
// Arena
// =====================================================

/// Width used when the host container is absent
pub const DEFAULT_ARENA_WIDTH: f32 = 960.0;

/// Height used when the host container is absent
pub const DEFAULT_ARENA_HEIGHT: f32 = 540.0;

/// Thickness of the implicit floor below the container's bottom edge
pub const FLOOR_THICKNESS: f32 = 40.0;

/// Host elements whose top lies above this fraction of the container height are ignored
pub const ARENA_BAND_TOP_FRACTION: f32 = 0.12;

/// Host elements whose top lies below this fraction of the container height are ignored
pub const ARENA_BAND_BOTTOM_FRACTION: f32 = 0.92;

/// Host elements thinner than this are decorative, not platforms
pub const MIN_PLATFORM_HEIGHT: f32 = 24.0;

// =====================================================
// Physics
// =====================================================

/// Downward acceleration
pub const GRAVITY: f32 = 1400.0;

/// Terminal downward speed
pub const MAX_FALL_SPEED: f32 = 650.0;

/// Horizontal velocity multiplier applied per grounded tick
pub const GROUND_FRICTION: f32 = 0.82;

/// Fighters must be this far inside a platform's edges to land on it
pub const PLATFORM_INNER_MARGIN: f32 = 6.0;

/// Landing band above a platform top
pub const LANDING_BAND_ABOVE: f32 = 4.0;

/// Landing band below a platform top
pub const LANDING_BAND_BELOW: f32 = 28.0;

/// Half the fighter's body width, used for horizontal containment
pub const FIGHTER_HALF_WIDTH: f32 = 24.0;

/// Falling this far below the container triggers the containment reset
pub const FALL_RESET_MARGIN: f32 = 80.0;

/// Height above the container's top edge a fallen fighter is dropped back in from
pub const RESPAWN_HEIGHT: f32 = 40.0;

/// Vertical speed separating the rising/apex/falling airborne states
pub const AIRBORNE_VY_THRESHOLD: f32 = 60.0;

/// Grounded horizontal speed above which the run animation plays
pub const RUN_SPEED_THRESHOLD: f32 = 25.0;

// =====================================================
// AI
// =====================================================

/// Base horizontal movement speed
pub const BASE_SPEED: f32 = 220.0;

/// Upward launch speed of a full jump
pub const JUMP_SPEED: f32 = 620.0;

/// Attack is committed below this distance...
pub const ATTACK_RANGE: f32 = 70.0;

/// ...and below this vertical offset
pub const ATTACK_VERTICAL_RANGE: f32 = 45.0;

/// Above this distance the fighter chases
pub const CHASE_RANGE: f32 = 95.0;

/// Chase speed as a fraction of base speed
pub const CHASE_SPEED_FACTOR: f32 = 0.85;

/// Brawl approach speed as a fraction of base speed
pub const BRAWL_SPEED_FACTOR: f32 = 0.5;

/// Horizontal speed kept when committing to an attack
pub const ATTACK_MOVE_FACTOR: f32 = 0.3;

/// Re-decision delay after committing an attack
pub const ATTACK_DECISION_DELAY: f32 = 0.1;

/// Chase re-decision delay: min + random * span
pub const CHASE_DECISION_MIN: f32 = 0.08;
pub const CHASE_DECISION_SPAN: f32 = 0.12;

/// Brawl re-decision delay: min + random * span
pub const BRAWL_DECISION_MIN: f32 = 0.1;
pub const BRAWL_DECISION_SPAN: f32 = 0.2;

/// Jump chance per chase decision when the opponent stands higher
pub const JUMP_CHANCE_OPPONENT_ABOVE: f64 = 0.35;

/// Jump chance per chase decision otherwise
pub const JUMP_CHANCE_LEVEL: f64 = 0.08;

/// The opponent counts as "above" when this much higher
pub const OPPONENT_ABOVE_MARGIN: f32 = 30.0;

/// Brawl roll below this closes distance
pub const BRAWL_APPROACH_CHANCE: f64 = 0.45;

/// Brawl roll below this (and above approach) hops in
pub const BRAWL_HOP_CHANCE: f64 = 0.7;

/// Hop launch speed as a fraction of a full jump
pub const HOP_JUMP_FACTOR: f32 = 0.6;

/// Hop horizontal speed as a fraction of base speed
pub const HOP_SPEED_FACTOR: f32 = 0.6;

/// Velocity kept when a brawl decision settles into idle
pub const BRAWL_IDLE_DAMPING: f32 = 0.4;

// =====================================================
// Combat
// =====================================================

/// Minimum swing time before the blade can connect
pub const ATTACK_STARTUP_SECS: f32 = 0.12;

/// Minimum swing frame before the blade can connect
pub const ATTACK_STARTUP_FRAME: usize = 2;

/// Maximum distance a swing can reach
pub const ATTACK_REACH: f32 = 78.0;

/// Below this distance facing is ignored
pub const POINT_BLANK_RANGE: f32 = 30.0;

/// Slack behind the attacker's facing still counted as "in front"
pub const FACING_TOLERANCE: f32 = 10.0;

/// Non-critical damage roll: floor(min + random * span), 28..=43
pub const DAMAGE_MIN: f32 = 28.0;
pub const DAMAGE_SPAN: f32 = 16.0;

/// Critical base roll before the multiplier: min + random * span
pub const CRIT_DAMAGE_MIN: f32 = 26.0;
pub const CRIT_DAMAGE_SPAN: f32 = 14.5;

/// Critical damage multiplier (floor rounding after)
pub const CRIT_MULTIPLIER: f32 = 2.1;

/// Probability a connecting hit is critical
pub const CRIT_CHANCE: f64 = 0.18;

/// Hitstun applied to the defender
pub const HITSTUN_SECS: f32 = 0.3;

/// Invulnerability window applied to the defender
pub const INVULNERABILITY_SECS: f32 = 0.4;

/// Knockback impulse (horizontal, upward)
pub const KNOCKBACK_X: f32 = 260.0;
pub const KNOCKBACK_Y: f32 = 160.0;
pub const CRIT_KNOCKBACK_X: f32 = 420.0;
pub const CRIT_KNOCKBACK_Y: f32 = 260.0;

/// Screen-shake pulses
pub const HIT_SHAKE: f32 = 5.0;
pub const CRIT_SHAKE: f32 = 12.0;

/// Shake magnitude lost per second
pub const SHAKE_DECAY_PER_SEC: f32 = 40.0;

// =====================================================
// Particles
// =====================================================

/// Upper bound on live particles
pub const MAX_PARTICLES: usize = 256;

pub const DUST_COUNT: usize = 6;
pub const SPARK_COUNT: usize = 8;
pub const CRIT_BURST_COUNT: usize = 22;

/// Gravity applied to dust and sparks
pub const PARTICLE_GRAVITY: f32 = 600.0;

// =====================================================
// Battle log
// =====================================================

/// How long an entry stays on screen
pub const LOG_DISPLAY_MS: f64 = 2800.0;

/// Entries visible at once
pub const LOG_CAPACITY: usize = 3;
