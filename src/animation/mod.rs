//! Sprite animation metadata and the per-fighter frame state machine.
//!
//! An [`AnimationTable`] maps each [`AnimState`] to a sprite-sheet row and a
//! frame count. Tables are immutable and shared between fighters of the same
//! archetype.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BattleError;

/// Animation state tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimState {
    Idle,
    Run,
    Jump,
    Airborne,
    Fall,
    Land,
    Attack,
    Hit,
    KnockedOut,
    Victory,
}

impl AnimState {
    pub const ALL: [AnimState; 10] = [
        AnimState::Idle,
        AnimState::Run,
        AnimState::Jump,
        AnimState::Airborne,
        AnimState::Fall,
        AnimState::Land,
        AnimState::Attack,
        AnimState::Hit,
        AnimState::KnockedOut,
        AnimState::Victory,
    ];

    /// Seconds each frame is held
    pub fn frame_duration(&self) -> f32 {
        match self {
            Self::Idle => 0.14,
            Self::Run => 0.09,
            Self::Jump => 0.1,
            Self::Airborne => 0.12,
            Self::Fall => 0.1,
            Self::Land => 0.07,
            Self::Attack => 0.06,
            Self::Hit => 0.1,
            Self::KnockedOut => 0.16,
            Self::Victory => 0.14,
        }
    }

    /// Terminal states are only left by a fresh start
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::KnockedOut | Self::Victory)
    }

    pub fn is_airborne(&self) -> bool {
        matches!(self, Self::Jump | Self::Airborne | Self::Fall)
    }

    /// What happens after the last frame
    pub fn end_behavior(&self) -> EndBehavior {
        match self {
            Self::Idle | Self::Run | Self::Airborne => EndBehavior::Loop,
            Self::Attack | Self::Hit | Self::Land => EndBehavior::ReturnToIdle,
            Self::Jump | Self::Fall | Self::KnockedOut | Self::Victory => EndBehavior::Hold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndBehavior {
    Loop,
    ReturnToIdle,
    Hold,
}

/// Sprite-sheet row and frame count for one state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clip {
    pub row: u32,
    pub frames: usize,
}

/// Character archetypes with built-in tables; names parse case-insensitively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Archetype {
    Swordsman,
    Brawler,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Swordsman => "swordsman",
            Self::Brawler => "brawler",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Archetype {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "swordsman" => Ok(Self::Swordsman),
            "brawler" => Ok(Self::Brawler),
            other => Err(BattleError::UnknownArchetype(other.to_string())),
        }
    }
}

impl TryFrom<String> for Archetype {
    type Error = BattleError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

const IDLE_FALLBACK: Clip = Clip { row: 0, frames: 1 };

/// Immutable state → clip mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationTable {
    clips: HashMap<AnimState, Clip>,
}

impl AnimationTable {
    /// Build from explicit entries; zero-frame clips are dropped
    pub fn from_entries(entries: impl IntoIterator<Item = (AnimState, Clip)>) -> Self {
        Self {
            clips: entries.into_iter().filter(|(_, c)| c.frames > 0).collect(),
        }
    }

    pub fn builtin(archetype: Archetype) -> Self {
        // (state, frames) in sprite-sheet row order
        let frames: [usize; 10] = match archetype {
            Archetype::Swordsman => [6, 8, 3, 2, 3, 3, 6, 3, 5, 6],
            Archetype::Brawler => [4, 6, 2, 2, 2, 2, 5, 2, 4, 8],
        };
        Self::from_entries(
            AnimState::ALL
                .iter()
                .zip(frames)
                .enumerate()
                .map(|(row, (state, frames))| {
                    (
                        *state,
                        Clip {
                            row: row as u32,
                            frames,
                        },
                    )
                }),
        )
    }

    pub fn clip(&self, state: AnimState) -> Option<Clip> {
        self.clips.get(&state).copied()
    }

    /// Frame count for `state`, falling back to idle
    pub fn frame_count(&self, state: AnimState) -> usize {
        self.clip(state)
            .or_else(|| self.clip(AnimState::Idle))
            .unwrap_or(IDLE_FALLBACK)
            .frames
    }

    pub fn idle_clip(&self) -> Clip {
        self.clip(AnimState::Idle).unwrap_or(IDLE_FALLBACK)
    }
}

/// Current animation position of one fighter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Animator {
    pub state: AnimState,
    pub frame: usize,
    pub elapsed: f32,
}

/// Result of advancing the animator by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    None,
    Advanced,
    /// A non-looping clip finished and the animator returned to idle
    Finished(AnimState),
}

impl Default for Animator {
    fn default() -> Self {
        Self {
            state: AnimState::Idle,
            frame: 0,
            elapsed: 0.0,
        }
    }
}

impl Animator {
    /// Switch state and restart at frame 0; no-op if already in `state`
    pub fn set(&mut self, state: AnimState) {
        if self.state != state {
            self.force(state);
        }
    }

    /// Switch state and restart even if unchanged
    pub fn force(&mut self, state: AnimState) {
        self.state = state;
        self.frame = 0;
        self.elapsed = 0.0;
    }

    /// Advance the frame timer by `dt` seconds
    pub fn advance(&mut self, dt: f32, table: &AnimationTable) -> FrameEvent {
        if table.clip(self.state).is_none() {
            self.force(AnimState::Idle);
        }
        let count = table.frame_count(self.state);
        if self.frame >= count {
            self.frame = count - 1;
        }

        self.elapsed += dt.max(0.0);
        let duration = self.state.frame_duration();
        if self.elapsed < duration {
            return FrameEvent::None;
        }
        self.elapsed -= duration;
        // a single tick never advances more than one frame
        self.elapsed = self.elapsed.min(duration);

        if self.frame + 1 < count {
            self.frame += 1;
            return FrameEvent::Advanced;
        }

        match self.state.end_behavior() {
            EndBehavior::Loop => {
                self.frame = 0;
                FrameEvent::Advanced
            }
            EndBehavior::Hold => {
                self.frame = count - 1;
                FrameEvent::None
            }
            EndBehavior::ReturnToIdle => {
                let finished = self.state;
                self.force(AnimState::Idle);
                FrameEvent::Finished(finished)
            }
        }
    }

    pub fn row(&self, table: &AnimationTable) -> u32 {
        table.clip(self.state).unwrap_or(table.idle_clip()).row
    }
}
