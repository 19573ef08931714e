use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cancel::CancelToken;
use crate::controller::{Controller, TickOutcome};
use crate::error::GameError;
use crate::target::lock_or_recover;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Where session tasks get run
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, name: String, task: Task);

    /// Wait for everything spawned so far to finish
    fn join_all(&self) {}
}

/// Production spawner: one named OS thread per task
#[derive(Debug, Default)]
pub struct ThreadSpawner {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadSpawner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskSpawner for ThreadSpawner {
    fn spawn(&self, name: String, task: Task) {
        let mut handles = lock_or_recover(&self.handles);
        handles.retain(|h| !h.is_finished());

        match thread::Builder::new().name(name.clone()).spawn(task) {
            Ok(handle) => handles.push(handle),
            Err(e) => log::error!("failed to spawn {name}: {e}"),
        }
    }

    fn join_all(&self) {
        let handles = std::mem::take(&mut *lock_or_recover(&self.handles));
        for handle in handles {
            if handle.join().is_err() {
                log::error!("session task panicked");
            }
        }
    }
}

/// Test spawner: records task names and never runs the tasks,
/// so the controller can be driven tick by tick.
#[derive(Default)]
pub struct ManualSpawner {
    spawned: Mutex<Vec<String>>,
}

impl ManualSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawned(&self) -> Vec<String> {
        lock_or_recover(&self.spawned).clone()
    }
}

impl TaskSpawner for ManualSpawner {
    fn spawn(&self, name: String, _task: Task) {
        lock_or_recover(&self.spawned).push(name);
    }
}

impl<S: TaskSpawner + ?Sized> TaskSpawner for Arc<S> {
    fn spawn(&self, name: String, task: Task) {
        (**self).spawn(name, task)
    }

    fn join_all(&self) {
        (**self).join_all()
    }
}

pub fn target_rng(seed: Option<u64>, generation: u64, id: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ generation.rotate_left(32) ^ id as u64),
        None => StdRng::from_entropy(),
    }
}

/// Cycles one target up and down until the session's target token is cancelled
pub fn run_target(
    controller: Arc<Controller>,
    generation: u64,
    id: usize,
    token: CancelToken,
    mut rng: StdRng,
) {
    let timing = controller.timing().clone();

    loop {
        let dwell = timing.subunits(rng.gen_range(timing.dwell_subunits.clone()));
        let up_for = timing.subunits(rng.gen_range(timing.active_subunits.clone()));

        if !token.sleep(dwell) {
            break;
        }
        if !still_live(controller.raise(generation, id), id) {
            break;
        }

        if !token.sleep(up_for) {
            break;
        }
        if !still_live(controller.lower(generation, id), id) {
            break;
        }

        if !token.sleep(timing.target_cooldown()) {
            break;
        }
    }

    log::trace!("target {id} task for session {generation} exited");
}

fn still_live(result: Result<bool, GameError>, id: usize) -> bool {
    result.unwrap_or_else(|e| {
        log::error!("target task {id}: {e}");
        false
    })
}

/// Counts the session down, then re-arms the start control after the cooldown
pub fn run_clock(controller: Arc<Controller>, generation: u64, token: CancelToken) {
    let unit = controller.timing().unit;

    loop {
        if !token.sleep(unit) {
            log::debug!("clock for session {generation} cancelled");
            return;
        }
        match controller.tick(generation) {
            TickOutcome::Running(_) => {}
            TickOutcome::Finished => break,
            TickOutcome::Stale => return,
        }
    }

    if token.sleep(controller.timing().start_cooldown()) {
        controller.rearm(generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_rngs_are_reproducible() {
        let mut a = target_rng(Some(42), 1, 3);
        let mut b = target_rng(Some(42), 1, 3);
        let xs: Vec<u64> = (0..5).map(|_| a.gen_range(1000..3500)).collect();
        let ys: Vec<u64> = (0..5).map(|_| b.gen_range(1000..3500)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn seeded_rngs_differ_per_target_and_session() {
        let draw = |generation, id| {
            let mut rng = target_rng(Some(42), generation, id);
            (0..8).map(|_| rng.gen::<u64>()).collect::<Vec<_>>()
        };
        assert_ne!(draw(1, 3), draw(1, 4));
        assert_ne!(draw(1, 3), draw(2, 3));
    }

    #[test]
    fn manual_spawner_records_without_running() {
        let spawner = ManualSpawner::new();
        let ran = Arc::new(Mutex::new(false));
        let flag = ran.clone();
        spawner.spawn(
            "task".to_string(),
            Box::new(move || *flag.lock().unwrap() = true),
        );
        assert_eq!(spawner.spawned(), vec!["task".to_string()]);
        assert!(!*ran.lock().unwrap());
    }

    #[test]
    fn thread_spawner_runs_and_joins() {
        let spawner = ThreadSpawner::new();
        let ran = Arc::new(Mutex::new(0));
        for i in 0..3 {
            let counter = ran.clone();
            spawner.spawn(
                format!("worker-{i}"),
                Box::new(move || *counter.lock().unwrap() += 1),
            );
        }
        spawner.join_all();
        assert_eq!(*ran.lock().unwrap(), 3);
    }
}
