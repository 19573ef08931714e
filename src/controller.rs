use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::error::GameError;
use crate::scheduler::{run_clock, run_target, target_rng, TaskSpawner};
use crate::session::{Phase, SessionState, Timing};
use crate::stats::RoundSummary;
use crate::surface::Surface;
use crate::target::{lock_or_recover, Board};

/// No session is live
const NOT_LIVE: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting down; carries the time left
    Running(u32),
    /// This tick ended the session
    Finished,
    /// The tick belongs to a session that is no longer current
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    Hit { score: u32, reaction: Duration },
    Miss,
}

/// Cancellation handles for the tasks of one session
#[derive(Debug, Clone, Default)]
struct SessionTasks {
    targets: CancelToken,
    clock: CancelToken,
}

impl SessionTasks {
    fn cancel(&self) {
        self.targets.cancel();
        self.clock.cancel();
    }
}

/// Owns the board and the session, and runs the round lifecycle:
/// `Idle -> Running -> Cooldown -> Idle`.
///
/// Lock order is target before session. Nothing holds the session lock
/// while taking a target lock.
pub struct Controller {
    timing: Timing,
    board: Board,
    session: Mutex<SessionState>,
    live: AtomicU64,
    tasks: Mutex<Option<SessionTasks>>,
    surface: Box<dyn Surface>,
    spawner: Box<dyn TaskSpawner>,
    seed: Option<u64>,
}

impl Controller {
    pub fn new(
        timing: Timing,
        surface: impl Surface + 'static,
        spawner: impl TaskSpawner + 'static,
    ) -> Self {
        Self {
            session: Mutex::new(SessionState::new(timing.session_units)),
            timing,
            board: Board::new(),
            live: AtomicU64::new(NOT_LIVE),
            tasks: Mutex::new(None),
            surface: Box::new(surface),
            spawner: Box::new(spawner),
            seed: None,
        }
    }

    /// Makes target schedules reproducible
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Starts a new round. Rejected while the start control is disabled.
    pub fn start(self: &Arc<Self>) -> Result<u64, GameError> {
        let generation = {
            let mut session = lock_or_recover(&self.session);
            if !session.start_enabled {
                log::warn!("start rejected: {}", GameError::StartDisabled);
                return Err(GameError::StartDisabled);
            }
            session.start_enabled = false;
            session.phase = Phase::Running;
            session.generation += 1;
            session.generation
        };
        self.surface.set_start_enabled(false);

        // Retire whatever the previous round left behind before spawning anything new
        if let Some(previous) = lock_or_recover(&self.tasks).take() {
            previous.cancel();
        }
        self.live.store(NOT_LIVE, Ordering::SeqCst);
        self.force_all_dormant();

        {
            let mut session = lock_or_recover(&self.session);
            session.reset_round(self.timing.session_units);
            self.surface.render_score(session.score);
            self.surface.render_remaining_time(session.remaining);
        }

        let tasks = SessionTasks::default();
        *lock_or_recover(&self.tasks) = Some(tasks.clone());
        self.live.store(generation, Ordering::SeqCst);
        log::info!("session {generation} started");

        let clock = Arc::clone(self);
        let token = tasks.clock.clone();
        self.spawner.spawn(
            format!("clock-{generation}"),
            Box::new(move || run_clock(clock, generation, token)),
        );

        for id in 0..self.board.len() {
            let controller = Arc::clone(self);
            let token = tasks.targets.clone();
            let rng = target_rng(self.seed, generation, id);
            self.spawner.spawn(
                format!("target-{generation}-{id}"),
                Box::new(move || run_target(controller, generation, id, token, rng)),
            );
        }

        Ok(generation)
    }

    /// One time unit of the session clock
    pub fn tick(&self, generation: u64) -> TickOutcome {
        let summary = {
            let mut session = lock_or_recover(&self.session);
            if session.generation != generation || !session.is_running() {
                return TickOutcome::Stale;
            }

            session.remaining = session.remaining.saturating_sub(1);
            self.surface.render_remaining_time(session.remaining);
            if session.remaining > 0 {
                return TickOutcome::Running(session.remaining);
            }

            session.phase = Phase::Cooldown;
            self.live.store(NOT_LIVE, Ordering::SeqCst);
            session.summary()
        };

        if let Some(tasks) = lock_or_recover(&self.tasks).as_ref() {
            tasks.targets.cancel();
        }
        self.force_all_dormant();
        self.surface.render_summary(&summary);
        log::info!("session {generation} over: {}", summary.describe());

        TickOutcome::Finished
    }

    /// Cooldown expiry. Re-enables the start control once per session.
    pub fn rearm(&self, generation: u64) -> bool {
        let mut session = lock_or_recover(&self.session);
        if session.generation != generation || session.phase != Phase::Cooldown {
            return false;
        }
        session.phase = Phase::Idle;
        session.start_enabled = true;
        self.surface.set_start_enabled(true);
        log::info!("start control re-armed after session {generation}");
        true
    }

    /// The player picked a target
    pub fn select(&self, id: usize) -> Result<Selection, GameError> {
        let mut target = self.board.lock(id)?;
        let mut session = lock_or_recover(&self.session);

        if !target.is_active() || !session.is_running() {
            session.record_miss();
            return Ok(Selection::Miss);
        }

        let reaction = target.whack().unwrap_or_default();
        self.surface.render_target(id, false);
        self.surface.render_hit(id);

        let score = session.record_hit(reaction);
        self.surface.render_score(score);
        log::debug!("target {id} hit after {}ms", reaction.as_millis());

        Ok(Selection::Hit { score, reaction })
    }

    /// Puts a target up on behalf of the given session.
    /// Returns false if that session is no longer live.
    pub fn raise(&self, generation: u64, id: usize) -> Result<bool, GameError> {
        let mut target = self.board.lock(id)?;
        if !self.is_live(generation) {
            return Ok(false);
        }
        if target.raise() {
            self.surface.render_target(id, true);
            log::trace!("target {id} up");
        }
        Ok(true)
    }

    /// Takes a target down on behalf of the given session.
    /// Returns false if that session is no longer live.
    pub fn lower(&self, generation: u64, id: usize) -> Result<bool, GameError> {
        let mut target = self.board.lock(id)?;
        if !self.is_live(generation) {
            return Ok(false);
        }
        if target.lower() {
            log::trace!("target {id} down");
        }
        // A whacked target keeps its face until its up time ends
        self.surface.render_target(id, false);
        Ok(true)
    }

    /// Stops every task and waits for their threads
    pub fn shutdown(&self) {
        self.live.store(NOT_LIVE, Ordering::SeqCst);
        if let Some(tasks) = lock_or_recover(&self.tasks).take() {
            tasks.cancel();
        }
        self.spawner.join_all();
        log::debug!("controller shut down");
    }

    fn is_live(&self, generation: u64) -> bool {
        generation != NOT_LIVE && self.live.load(Ordering::SeqCst) == generation
    }

    fn force_all_dormant(&self) {
        for id in 0..self.board.len() {
            if let Ok(mut target) = self.board.lock(id) {
                target.lower();
                self.surface.render_target(id, false);
            }
        }
    }

    pub fn phase(&self) -> Phase {
        lock_or_recover(&self.session).phase
    }

    pub fn score(&self) -> u32 {
        lock_or_recover(&self.session).score
    }

    pub fn remaining(&self) -> u32 {
        lock_or_recover(&self.session).remaining
    }

    pub fn is_start_enabled(&self) -> bool {
        lock_or_recover(&self.session).start_enabled
    }

    pub fn generation(&self) -> u64 {
        lock_or_recover(&self.session).generation
    }

    pub fn is_active(&self, id: usize) -> Result<bool, GameError> {
        Ok(self.board.lock(id)?.is_active())
    }

    pub fn active_targets(&self) -> Vec<usize> {
        self.board.active_ids()
    }

    pub fn summary(&self) -> RoundSummary {
        lock_or_recover(&self.session).summary()
    }
}
