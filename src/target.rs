use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::GameError;
use crate::session::TARGET_COUNT;

/// One grid cell: a mole that is either up (active) or down (dormant)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Target {
    activated_at: Option<Instant>,
}

impl Target {
    pub fn is_active(&self) -> bool {
        self.activated_at.is_some()
    }

    pub fn activated_at(&self) -> Option<Instant> {
        self.activated_at
    }

    /// Returns false if the target was already up
    pub fn raise(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        self.activated_at = Some(Instant::now());
        true
    }

    /// Returns true if the target was up
    pub fn lower(&mut self) -> bool {
        self.activated_at.take().is_some()
    }

    /// Knocks an active target down, yielding how long it was up
    pub fn whack(&mut self) -> Option<Duration> {
        self.activated_at.take().map(|at| at.elapsed())
    }
}

/// The fixed set of targets, each behind its own lock
#[derive(Debug)]
pub struct Board {
    targets: Vec<Mutex<Target>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            targets: (0..TARGET_COUNT).map(|_| Mutex::default()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn lock(&self, id: usize) -> Result<MutexGuard<'_, Target>, GameError> {
        self.targets
            .get(id)
            .map(lock_or_recover)
            .ok_or(GameError::UnknownTarget(id))
    }

    pub fn active_ids(&self) -> Vec<usize> {
        self.targets
            .iter()
            .enumerate()
            .filter(|(_, t)| lock_or_recover(t).is_active())
            .map(|(id, _)| id)
            .collect()
    }
}

/// Locks a mutex, taking the data back out of a poisoned lock.
/// Everything guarded in this crate is plain flags and counters.
pub fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
        log::error!("recovering from a poisoned lock");
        poisoned.into_inner()
    })
}
