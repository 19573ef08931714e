use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::target::lock_or_recover;

/// Cloneable cancellation signal. Every wait a task makes goes through
/// [`CancelToken::sleep`], so cancelling wakes it at once.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, cvar) = &*self.inner;
        *lock_or_recover(flag) = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *lock_or_recover(&self.inner.0)
    }

    /// Waits for `duration`. Returns false if cancelled before or during the wait.
    pub fn sleep(&self, duration: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let guard = lock_or_recover(flag);
        let (guard, _) = cvar
            .wait_timeout_while(guard, duration, |cancelled| !*cancelled)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        !*guard
    }
}
