//! Debouncing on the tokio timer.
//!
//! At most one timer is pending at a time; scheduling a call cancels the
//! pending one. Cancellation only reaches timers that have not fired yet: once
//! a task has started it always runs to completion.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct Pending {
    generation: u64,
    token: Option<CancellationToken>,
}

/// Coalesces rapid calls into one.
///
/// Trailing mode runs only the last call, once the quiet window has passed
/// without further calls. Leading mode runs the first call immediately and
/// swallows the rest until the window has been quiet.
#[derive(Debug)]
pub struct Debouncer {
    wait: Duration,
    trailing: bool,
    pending: Arc<Mutex<Pending>>,
}

impl Debouncer {
    pub fn new(wait: Duration, trailing: bool) -> Self {
        Self {
            wait,
            trailing,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Whether a timer is waiting for the quiet window to expire.
    pub fn is_pending(&self) -> bool {
        self.lock().token.is_some()
    }

    /// Cancel the pending timer, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.lock().token.take() {
            tracing::trace!("Cancelling pending debounce timer");
            token.cancel();
        }
    }

    /// Schedule `task` under the debounce policy. Must be called from within
    /// a tokio runtime.
    pub fn call<F, Fut>(&self, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let (generation, idle) = {
            let mut pending = self.lock();
            let idle = pending.token.is_none();
            if let Some(previous) = pending.token.replace(token.clone()) {
                previous.cancel();
            }
            pending.generation += 1;
            (pending.generation, idle)
        };

        if self.trailing {
            self.spawn_timer(generation, token, Some(task));
        } else {
            self.spawn_timer::<F, Fut>(generation, token, None);
            if idle {
                tokio::spawn(task());
            } else {
                tracing::trace!("Swallowing call inside the quiet window");
            }
        }
    }

    fn spawn_timer<F, Fut>(&self, generation: u64, token: CancellationToken, task: Option<F>)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let wait = self.wait;
        let pending = Arc::clone(&self.pending);

        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => return,
                () = tokio::time::sleep(wait) => {}
            }

            {
                let mut pending = pending
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                if pending.generation != generation {
                    return;
                }
                pending.token = None;
            }

            if let Some(task) = task {
                task().await;
            }
        });
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn push(
        calls: &Arc<Mutex<Vec<u32>>>,
        value: u32,
    ) -> impl FnOnce() -> std::future::Ready<()> + Send + 'static {
        let calls = Arc::clone(calls);
        move || {
            calls.lock().unwrap().push(value);
            std::future::ready(())
        }
    }

    async fn settle(duration: Duration) {
        tokio::time::sleep(duration).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn trailing_runs_only_the_last_call() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let debouncer = Debouncer::new(Duration::from_millis(100), true);

        debouncer.call(push(&calls, 1));
        settle(Duration::from_millis(50)).await;
        debouncer.call(push(&calls, 2));
        settle(Duration::from_millis(50)).await;
        debouncer.call(push(&calls, 3));
        check!(debouncer.is_pending());

        settle(Duration::from_millis(150)).await;
        check!(*calls.lock().unwrap() == vec![3]);
        check!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn trailing_with_zero_wait_still_coalesces() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let debouncer = Debouncer::new(Duration::ZERO, true);

        debouncer.call(push(&calls, 1));
        debouncer.call(push(&calls, 2));
        settle(Duration::from_millis(1)).await;

        check!(*calls.lock().unwrap() == vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn leading_runs_first_call_and_swallows_the_rest() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let debouncer = Debouncer::new(Duration::from_millis(100), false);

        debouncer.call(push(&calls, 1));
        settle(Duration::from_millis(10)).await;
        check!(*calls.lock().unwrap() == vec![1]);

        debouncer.call(push(&calls, 2));
        settle(Duration::from_millis(50)).await;
        debouncer.call(push(&calls, 3));
        settle(Duration::from_millis(150)).await;
        check!(*calls.lock().unwrap() == vec![1]);

        // Window has been quiet, next call fires immediately
        debouncer.call(push(&calls, 4));
        settle(Duration::from_millis(1)).await;
        check!(*calls.lock().unwrap() == vec![1, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_call() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let debouncer = Debouncer::new(Duration::from_millis(100), true);

        debouncer.call(push(&calls, 1));
        debouncer.cancel();
        settle(Duration::from_millis(200)).await;

        check!(calls.lock().unwrap().is_empty());
        check!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn started_task_survives_later_calls() {
        let finished = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(Duration::from_millis(10), true);

        let counter = Arc::clone(&finished);
        debouncer.call(move || async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            counter.fetch_add(1, Ordering::SeqCst);
        });
        settle(Duration::from_millis(20)).await;

        // The first task is now sleeping inside its body
        let counter = Arc::clone(&finished);
        debouncer.call(move || async move {
            counter.fetch_add(10, Ordering::SeqCst);
        });
        settle(Duration::from_millis(600)).await;

        check!(finished.load(Ordering::SeqCst) == 11);
    }
}
