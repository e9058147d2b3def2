//! Cancellable periodic tasks and request sequencing.
//!
//! A [`PeriodicTask`] runs its tick closure on a worker thread, waits the
//! interval, and repeats until the closure returns [`ControlFlow::Break`] or
//! the [`TaskHandle`] is cancelled or dropped. Ticks of one task never overlap.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Granularity at which a sleeping task notices cancellation.
const CANCEL_CHECK_SLICE: Duration = Duration::from_millis(25);

/// Monotonically increasing request numbers shared across threads.
///
/// Numbers start at 1; 0 means "nothing issued yet".
#[derive(Clone, Debug, Default)]
pub struct RequestSequence {
    last: Arc<AtomicU64>,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next number.
    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recently issued number.
    pub fn current(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

/// Builder for a named periodic background task.
pub struct PeriodicTask {
    name: String,
    interval: Duration,
    run_immediately: bool,
}

impl PeriodicTask {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
            run_immediately: true,
        }
    }

    /// Wait one interval before the first tick instead of ticking at once.
    pub fn delay_first_tick(mut self) -> Self {
        self.run_immediately = false;
        self
    }

    /// Start ticking on a worker thread.
    pub fn spawn<F>(self, mut tick: F) -> TaskHandle
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);
        let worker_finished = Arc::clone(&finished);
        let Self {
            name,
            interval,
            run_immediately,
        } = self;
        let thread_name = name.clone();
        let spawned = thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                if !run_immediately && !sleep_unless_cancelled(interval, &worker_cancel) {
                    worker_finished.store(true, Ordering::SeqCst);
                    return;
                }
                loop {
                    if worker_cancel.load(Ordering::SeqCst) {
                        break;
                    }
                    if tick().is_break() {
                        tracing::debug!("Periodic task {name} finished");
                        break;
                    }
                    if !sleep_unless_cancelled(interval, &worker_cancel) {
                        break;
                    }
                }
                worker_finished.store(true, Ordering::SeqCst);
            });
        let join = match spawned {
            Ok(join) => Some(join),
            Err(err) => {
                tracing::error!("Failed to spawn periodic task: {err}");
                finished.store(true, Ordering::SeqCst);
                None
            }
        };
        TaskHandle {
            cancel,
            finished,
            join,
        }
    }
}

/// Sleep for `interval`, returning `false` as soon as cancellation is seen.
pub(crate) fn sleep_unless_cancelled(interval: Duration, cancel: &AtomicBool) -> bool {
    let deadline = Instant::now() + interval;
    loop {
        if cancel.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(CANCEL_CHECK_SLICE));
    }
}

/// Owner of a running [`PeriodicTask`]; dropping it cancels the task.
#[derive(Debug)]
pub struct TaskHandle {
    cancel: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl TaskHandle {
    /// Stop issuing ticks. A tick already running completes first.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Cancel and wait for the worker thread to exit.
    pub fn cancel_and_join(mut self) {
        self.cancel();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    #[test]
    fn sequence_numbers_increase_from_one() {
        let sequence = RequestSequence::new();
        assert_eq!(sequence.current(), 0);
        let shared = sequence.clone();
        assert_eq!(sequence.next(), 1);
        assert_eq!(shared.next(), 2);
        assert_eq!(sequence.current(), 2);
    }

    #[test]
    fn break_stops_ticking() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let handle = PeriodicTask::new("break-test", Duration::from_millis(1)).spawn(move || {
            if counter.fetch_add(1, Ordering::SeqCst) + 1 >= 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(wait_until(Duration::from_secs(5), || handle.is_finished()));
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn cancel_stops_further_ticks() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let handle = PeriodicTask::new("cancel-test", Duration::from_millis(1)).spawn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        });
        assert!(wait_until(Duration::from_secs(5), || ticks.load(Ordering::SeqCst) >= 2));
        handle.cancel_and_join();
        let after_cancel = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(ticks.load(Ordering::SeqCst), after_cancel);
    }

    #[test]
    fn dropping_handle_cancels_task() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let handle = PeriodicTask::new("drop-test", Duration::from_millis(1)).spawn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        });
        let finished = Arc::clone(&handle.finished);
        drop(handle);
        assert!(wait_until(Duration::from_secs(5), || finished.load(Ordering::SeqCst)));
        let after_drop = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(ticks.load(Ordering::SeqCst), after_drop);
    }

    #[test]
    fn delayed_task_cancelled_before_first_tick_never_ticks() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let handle = PeriodicTask::new("delayed-test", Duration::from_secs(60))
            .delay_first_tick()
            .spawn(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            });
        handle.cancel_and_join();
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }
}
