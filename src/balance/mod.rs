//! Headless balance runner.
//!
//! Plays many complete battles in parallel with rayon on a floor-only arena
//! and a fixed host frame step. Each battle gets its own seed derived from the
//! base seed and its index through SHA3, so a run is reproducible and battles
//! are independent of scheduling order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::arena::FixedArena;
use crate::engine::{BattleConfig, Simulation};
use crate::error::BattleError;
use crate::fighter::Team;
use crate::logging::TimingSpan;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    pub battles: u64,
    pub base_seed: u64,
    /// Host frame interval fed to the clock
    pub step_ms: f64,
    /// Battles still undecided after this much host time count as unfinished
    pub time_limit_secs: f64,
    /// Fighters, HP and timing shared by every battle
    pub battle: BattleConfig,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            battles: 1_000,
            base_seed: 42,
            step_ms: 1000.0 / 60.0,
            time_limit_secs: 300.0,
            battle: BattleConfig::default(),
        }
    }
}

/// Result of one headless battle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub seed: u64,
    pub winner: Option<Team>,
    pub duration_secs: f64,
    pub hits: u32,
    pub crits: u32,
    pub winner_hp: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceReport {
    pub matchup: String,
    pub battles: u64,
    pub left_wins: u64,
    pub right_wins: u64,
    pub unfinished: u64,
    pub avg_duration_secs: f64,
    pub avg_hits: f64,
    pub avg_crits: f64,
    pub avg_winner_hp: f64,
    pub left_win_rate: f64,
}

impl BalanceReport {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Seed for battle `index` of a run
pub fn battle_seed(base_seed: u64, index: u64) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Play one battle to completion (or the time limit)
pub fn play_battle(config: &BalanceConfig, seed: u64) -> Result<BattleOutcome, BattleError> {
    let battle = BattleConfig {
        seed: Some(seed),
        auto_start: true,
        ..config.battle.clone()
    };
    let arena = FixedArena::floor_only(battle.default_arena_width, battle.default_arena_height);
    let mut sim = Simulation::new(battle, Box::new(arena))?;

    let step = config.step_ms.max(1.0);
    let limit_ms = config.time_limit_secs * 1000.0;
    let mut now = 0.0;
    while !sim.is_finished() && now <= limit_ms {
        sim.tick(now);
        now += step;
    }

    let stats = sim.stats();
    let winner = sim.winner().filter(|_| sim.is_finished());
    Ok(BattleOutcome {
        seed,
        winner,
        duration_secs: stats.sim_seconds,
        hits: stats.hits,
        crits: stats.crits,
        winner_hp: winner.map_or(0, |team| sim.context().fighter(team).hp),
    })
}

pub fn run_balance(config: &BalanceConfig) -> Result<BalanceReport, BattleError> {
    let _span = TimingSpan::new("run_balance");
    config.battle.validate()?;

    let seeds: Vec<u64> = (0..config.battles)
        .map(|i| battle_seed(config.base_seed, i))
        .collect();

    let outcomes = seeds
        .par_iter()
        .map(|seed| play_battle(config, *seed))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(battles = outcomes.len(), "balance run complete");
    Ok(analyze(config, &outcomes))
}

fn analyze(config: &BalanceConfig, outcomes: &[BattleOutcome]) -> BalanceReport {
    let count = |team: Team| outcomes.iter().filter(|o| o.winner == Some(team)).count() as u64;
    let left_wins = count(Team::Left);
    let right_wins = count(Team::Right);
    let finished: Vec<&BattleOutcome> = outcomes.iter().filter(|o| o.winner.is_some()).collect();

    let decided = left_wins + right_wins;
    BalanceReport {
        matchup: format!(
            "{} ({}) vs {} ({})",
            config.battle.left_name,
            config.battle.left_archetype,
            config.battle.right_name,
            config.battle.right_archetype
        ),
        battles: outcomes.len() as u64,
        left_wins,
        right_wins,
        unfinished: outcomes.len() as u64 - decided,
        avg_duration_secs: mean(finished.iter().map(|o| o.duration_secs)),
        avg_hits: mean(outcomes.iter().map(|o| f64::from(o.hits))),
        avg_crits: mean(outcomes.iter().map(|o| f64::from(o.crits))),
        avg_winner_hp: mean(finished.iter().map(|o| f64::from(o.winner_hp))),
        left_win_rate: if decided == 0 {
            0.0
        } else {
            left_wins as f64 / decided as f64
        },
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
