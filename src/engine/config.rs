use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::Archetype;
use crate::constants::*;
use crate::error::BattleError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub left_name: String,
    pub right_name: String,
    pub left_archetype: Archetype,
    pub right_archetype: Archetype,
    pub max_hp: u32,
    pub auto_start: bool,
    /// Host elements carrying one of these selectors double as platforms
    pub platform_selectors: Vec<String>,
    /// Fixed RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
    pub max_step_ms: f64,
    pub end_delay_ms: f64,
    pub log_display_ms: f64,
    pub log_capacity: usize,
    pub default_arena_width: f32,
    pub default_arena_height: f32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            left_name: "Challenger".into(),
            right_name: "Defender".into(),
            left_archetype: Archetype::Swordsman,
            right_archetype: Archetype::Brawler,
            max_hp: DEFAULT_MAX_HP,
            auto_start: true,
            platform_selectors: vec![
                ".battle-platform".into(),
                "header".into(),
                "section".into(),
                "footer".into(),
            ],
            seed: None,
            max_step_ms: MAX_STEP_MS,
            end_delay_ms: END_DELAY_MS,
            log_display_ms: LOG_DISPLAY_MS,
            log_capacity: LOG_CAPACITY,
            default_arena_width: DEFAULT_ARENA_WIDTH,
            default_arena_height: DEFAULT_ARENA_HEIGHT,
        }
    }
}

impl BattleConfig {
    pub fn from_json(json: &str) -> Result<Self, BattleError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, BattleError> {
        let json = std::fs::read_to_string(path).map_err(|source| BattleError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), BattleError> {
        fn invalid(field: &'static str, reason: &str) -> Result<(), BattleError> {
            Err(BattleError::InvalidConfig {
                field,
                reason: reason.into(),
            })
        }

        if self.left_name.trim().is_empty() {
            return invalid("left_name", "must not be empty");
        }
        if self.right_name.trim().is_empty() {
            return invalid("right_name", "must not be empty");
        }
        if self.max_hp == 0 {
            return invalid("max_hp", "must be positive");
        }
        if !self.max_step_ms.is_finite() || self.max_step_ms <= 0.0 {
            return invalid("max_step_ms", "must be a positive number");
        }
        if !self.end_delay_ms.is_finite() || self.end_delay_ms < 0.0 {
            return invalid("end_delay_ms", "must not be negative");
        }
        if !self.log_display_ms.is_finite() || self.log_display_ms < 0.0 {
            return invalid("log_display_ms", "must not be negative");
        }
        if self.log_capacity == 0 {
            return invalid("log_capacity", "must be at least 1");
        }
        if !(self.default_arena_width > 0.0 && self.default_arena_height > 0.0) {
            return invalid("default_arena_width", "arena size must be positive");
        }
        Ok(())
    }
}
