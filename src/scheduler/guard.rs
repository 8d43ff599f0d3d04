//! Re-entrancy guard: ensures a single [`super::Scheduler`] instance never
//! runs two overlapping searches.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::ScheduleError;

const IDLE: u8 = 0;
const RUNNING: u8 = 1;

/// A single-word atomic state machine, `IDLE <-> RUNNING`, shared by a
/// scheduler instance across threads.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    state: AtomicU8,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(IDLE),
        }
    }

    /// Attempts the `IDLE -> RUNNING` transition. On success, returns a
    /// [`GuardHandle`] whose `Drop` releases the guard back to `IDLE` on
    /// every exit path (success, error, or panic-driven unwind).
    pub fn acquire(&self) -> Result<GuardHandle<'_>, ScheduleError> {
        match self
            .state
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                tracing::debug!("scheduler guard IDLE -> RUNNING");
                Ok(GuardHandle { guard: self })
            }
            Err(_) => {
                tracing::trace!("scheduler guard already RUNNING, rejecting concurrent call");
                Err(ScheduleError::SchedulerBusy)
            }
        }
    }
}

/// RAII handle held for the duration of a search. Releasing is implicit:
/// dropping the handle (including via an early return or `?`) resets the
/// guard to `IDLE`.
pub struct GuardHandle<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for GuardHandle<'_> {
    fn drop(&mut self) {
        self.guard.state.store(IDLE, Ordering::Release);
        tracing::debug!("scheduler guard RUNNING -> IDLE");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn second_concurrent_acquire_fails_busy() {
        let guard = ReentrancyGuard::new();
        let _first = guard.acquire().unwrap();
        let second = guard.acquire();
        assert_eq!(second.unwrap_err(), ScheduleError::SchedulerBusy);
    }

    #[test]
    fn guard_is_reusable_after_release() {
        let guard = ReentrancyGuard::new();
        {
            let _h = guard.acquire().unwrap();
        }
        assert!(guard.acquire().is_ok());
    }

    #[test]
    fn exactly_one_of_n_concurrent_callers_succeeds() {
        let guard = Arc::new(ReentrancyGuard::new());
        let successes = Arc::new(AtomicUsize::new(0));
        let busy = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let successes = Arc::clone(&successes);
                let busy = Arc::clone(&busy);
                thread::spawn(move || match guard.acquire() {
                    Ok(_handle) => {
                        successes.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(20));
                    }
                    Err(ScheduleError::SchedulerBusy) => {
                        busy.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(other) => panic!("unexpected error: {other:?}"),
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(busy.load(Ordering::SeqCst), 99);
        assert!(guard.acquire().is_ok(), "guard must be reusable afterwards");
    }
}
