//! Rolling battle log: short human-readable combat messages.
//!
//! Entries are capped at a small visible count; expiry is scheduled by the
//! clock on host time, independent of the simulation tick.

use serde::Serialize;

use crate::rng::BattleRng;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub id: u64,
    pub message: String,
    pub created_ms: f64,
}

/// Result of pushing a message
#[derive(Debug, Clone, PartialEq)]
pub struct Pushed {
    pub id: u64,
    /// Entries dropped to stay within capacity
    pub evicted: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct BattleLog {
    entries: Vec<LogEntry>,
    capacity: usize,
    next_id: u64,
}

impl BattleLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
            next_id: 1,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, now_ms: f64) -> Pushed {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(LogEntry {
            id,
            message: message.into(),
            created_ms: now_ms,
        });

        let overflow = self.entries.len().saturating_sub(self.capacity);
        let evicted = self.entries.drain(..overflow).map(|e| e.id).collect();
        Pushed { id, evicted }
    }

    /// Remove one entry; false if it was already gone
    pub fn expire(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Re-time an entry pushed before the host clock was known
    pub fn stamp(&mut self, id: u64, now_ms: f64) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.created_ms = now_ms;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const HIT_LINES: [&str; 5] = [
    "{attacker} slashes for {damage}!",
    "{attacker} lands a clean strike: {damage}",
    "{attacker} connects! -{damage}",
    "{attacker} cuts through the guard for {damage}",
    "A swift blow from {attacker} deals {damage}",
];

const CRIT_LINES: [&str; 3] = [
    "CRITICAL! {attacker} smashes for {damage}!",
    "{attacker} finds the opening: critical {damage}!",
    "Devastating hit from {attacker}! {damage}",
];

/// Randomized flavor line for a connecting hit
pub fn hit_message(attacker: &str, damage: u32, critical: bool, rng: &mut dyn BattleRng) -> String {
    let lines: &[&str] = if critical { &CRIT_LINES } else { &HIT_LINES };
    lines[rng.pick(lines.len())]
        .replace("{attacker}", attacker)
        .replace("{damage}", &damage.to_string())
}

pub fn start_message(left: &str, right: &str) -> String {
    format!("{left} vs {right} - FIGHT!")
}

pub fn knockout_message(winner: &str, loser: &str) -> String {
    format!("{loser} is knocked out! {winner} wins!")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;

    #[test]
    fn test_push_caps_visible_entries() {
        let mut log = BattleLog::new(3);
        for i in 0..3 {
            assert!(log.push(format!("m{i}"), 0.0).evicted.is_empty());
        }
        let pushed = log.push("m3", 0.0);
        assert_eq!(pushed.evicted, vec![1]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.entries()[0].message, "m1");
        assert_eq!(log.entries()[2].id, pushed.id);
    }

    #[test]
    fn test_expire_by_id() {
        let mut log = BattleLog::new(3);
        let a = log.push("a", 0.0).id;
        log.push("b", 10.0);
        assert!(log.expire(a));
        assert!(!log.expire(a));
        assert_eq!(log.entries()[0].message, "b");
    }

    #[test]
    fn test_stamp_retimes_one_entry() {
        let mut log = BattleLog::new(3);
        let a = log.push("a", 0.0).id;
        log.push("b", 0.0);
        log.stamp(a, 1234.0);
        log.stamp(99, 1.0);
        assert_eq!(log.entries()[0].created_ms, 1234.0);
        assert_eq!(log.entries()[1].created_ms, 0.0);
    }

    #[test]
    fn test_hit_message_names_attacker_and_damage() {
        let mut rng = ScriptedRng::constant(0.0);
        let msg = hit_message("Ryu", 33, false, &mut rng);
        assert_eq!(msg, "Ryu slashes for 33!");
        let crit = hit_message("Ryu", 84, true, &mut rng);
        assert!(crit.contains("Ryu") && crit.contains("84"));
    }
}
