use std::ops::Range;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::stats::RoundSummary;

pub const TARGET_COUNT: usize = 12;
pub const SUBUNITS_PER_UNIT: u64 = 1000;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Running,
    Cooldown,
}

/// Game constants. One unit is a second in the real game; tests shrink it.
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    pub unit: Duration,
    pub session_units: u32,
    pub start_cooldown_units: u32,
    pub dwell_subunits: Range<u64>,
    pub active_subunits: Range<u64>,
    pub target_cooldown_subunits: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            unit: Duration::from_secs(1),
            session_units: 20,
            start_cooldown_units: 5,
            dwell_subunits: 1000..3500,
            active_subunits: 1000..3500,
            target_cooldown_subunits: 2000,
        }
    }
}

impl Timing {
    /// Default constants with a different length of one time unit
    pub fn with_unit(unit: Duration) -> Self {
        Self {
            unit,
            ..Self::default()
        }
    }

    pub fn subunits(&self, n: u64) -> Duration {
        let nanos = self.unit.as_nanos() as u64;
        Duration::from_nanos(nanos.saturating_mul(n) / SUBUNITS_PER_UNIT)
    }

    pub fn start_cooldown(&self) -> Duration {
        self.unit * self.start_cooldown_units
    }

    pub fn target_cooldown(&self) -> Duration {
        self.subunits(self.target_cooldown_subunits)
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub generation: u64,
    pub phase: Phase,
    pub start_enabled: bool,
    pub remaining: u32,
    pub score: u32,
    pub misses: u32,
    pub reactions: Vec<Duration>,
    pub started_at: Option<DateTime<Local>>,
}

impl SessionState {
    pub fn new(session_units: u32) -> Self {
        Self {
            generation: 0,
            phase: Phase::Idle,
            start_enabled: true,
            remaining: session_units,
            score: 0,
            misses: 0,
            reactions: Vec::new(),
            started_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Clears the per-round counters for a fresh round
    pub fn reset_round(&mut self, session_units: u32) {
        self.remaining = session_units;
        self.score = 0;
        self.misses = 0;
        self.reactions.clear();
        self.started_at = Some(Local::now());
    }

    pub fn record_hit(&mut self, reaction: Duration) -> u32 {
        self.score += 1;
        self.reactions.push(reaction);
        self.score
    }

    pub fn record_miss(&mut self) {
        if self.is_running() {
            self.misses += 1;
        }
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary::new(self.score, self.misses, &self.reactions, self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timing_matches_game_constants() {
        let timing = Timing::default();
        assert_eq!(timing.unit, Duration::from_secs(1));
        assert_eq!(timing.session_units, 20);
        assert_eq!(timing.start_cooldown(), Duration::from_secs(5));
        assert_eq!(timing.target_cooldown(), Duration::from_secs(2));
        assert_eq!(timing.dwell_subunits, 1000..3500);
    }

    #[test]
    fn subunits_scale_with_unit() {
        let timing = Timing::with_unit(Duration::from_millis(10));
        assert_eq!(timing.subunits(1000), Duration::from_millis(10));
        assert_eq!(timing.subunits(3500), Duration::from_millis(35));
        assert_eq!(timing.start_cooldown(), Duration::from_millis(50));
    }

    #[test]
    fn new_session_is_idle_and_armed() {
        let state = SessionState::new(20);
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.start_enabled);
        assert_eq!(state.remaining, 20);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn misses_only_count_while_running() {
        let mut state = SessionState::new(20);
        state.record_miss();
        assert_eq!(state.misses, 0);

        state.phase = Phase::Running;
        state.record_miss();
        assert_eq!(state.misses, 1);
    }

    #[test]
    fn reset_round_clears_counters() {
        let mut state = SessionState::new(20);
        state.phase = Phase::Running;
        state.remaining = 3;
        state.record_hit(Duration::from_millis(400));
        state.record_miss();

        state.reset_round(20);

        assert_eq!(state.remaining, 20);
        assert_eq!(state.score, 0);
        assert_eq!(state.misses, 0);
        assert!(state.reactions.is_empty());
        assert!(state.started_at.is_some());
    }

    #[test]
    fn phase_display() {
        assert_eq!(Phase::Idle.to_string(), "Idle");
        assert_eq!(Phase::Cooldown.to_string(), "Cooldown");
    }
}
