//! Concurrency Limiter
//!
//! Runs async tasks with at most `limit` in flight, admitting queued tasks
//! in submission order as slots free up.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::limiter::TaskHandle;

/// Starts one queued task in the slot it is handed.
type Starter = Box<dyn FnOnce(Slot) + Send>;

#[derive(Default)]
struct QueueState {
    active: usize,
    pending: VecDeque<Starter>,
    /// Set while some thread is draining the queue in `advance`.
    advancing: bool,
}

struct Shared {
    limit: usize,
    state: Mutex<QueueState>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts queued tasks while slots are free.
    ///
    /// Only one caller drains at a time. A nested or concurrent call returns
    /// straight away and the draining loop picks up whatever it queued or
    /// freed, so starts happen one after another in queue order and the
    /// stack stays flat however long the queue is.
    fn advance(self: &Arc<Self>) {
        {
            let mut state = self.state();
            if state.advancing {
                return;
            }
            state.advancing = true;
        }
        let mut drain = DrainGuard {
            shared: self,
            finished: false,
        };

        loop {
            let starter = {
                let mut state = self.state();
                let next = if state.active < self.limit {
                    state.pending.pop_front()
                } else {
                    None
                };
                let Some(starter) = next else {
                    state.advancing = false;
                    drain.finished = true;
                    return;
                };
                state.active += 1;
                trace!(active = state.active, pending = state.pending.len(), "starting task");
                starter
            };

            // The lock is released here so the task closure may call `run`
            starter(Slot {
                shared: Arc::clone(self),
            });
        }
    }
}

/// Hands the drain role back if a task closure panics mid-drain.
struct DrainGuard<'a> {
    shared: &'a Shared,
    finished: bool,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.shared.state().advancing = false;
        }
    }
}

/// One occupied concurrency slot; freed (and the queue advanced) on drop.
struct Slot {
    shared: Arc<Shared>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state();
            state.active -= 1;
        }
        self.shared.advance();
    }
}

// == Concurrency Limiter ==
/// Bounded-concurrency task runner with FIFO admission.
///
/// Clones share the same slots and queue. Started tasks are never cancelled
/// by the limiter; a task that never settles keeps its slot.
///
/// # Example
/// ```no_run
/// # async fn demo() -> tornium_fetch::Result<()> {
/// use tornium_fetch::ConcurrencyLimiter;
///
/// let limiter = ConcurrencyLimiter::new(10)?;
/// let handle = limiter.run(|| async { 2 + 2 });
/// assert_eq!(handle.await?, 4);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConcurrencyLimiter {
    shared: Arc<Shared>,
}

impl ConcurrencyLimiter {
    // == Constructor ==
    /// Creates a limiter allowing `limit` tasks in flight.
    ///
    /// Returns `Error::InvalidLimit` when `limit` is 0.
    pub fn new(limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(Error::InvalidLimit(limit));
        }

        debug!(limit, "concurrency limiter created");
        Ok(Self {
            shared: Arc::new(Shared {
                limit,
                state: Mutex::new(QueueState::default()),
            }),
        })
    }

    // == Run ==
    /// Submits `task` and returns a handle to its output.
    ///
    /// If a slot is free, `task` is called before this returns and the
    /// future it produces is spawned on the current Tokio runtime; otherwise
    /// it is queued behind earlier submissions. The handle resolves to the
    /// future's output unchanged, so a task returning `Err` hands that error
    /// straight to its caller without affecting other tasks.
    ///
    /// Tasks still queued when the runtime shuts down are never called and
    /// their handles resolve to `Error::TaskAborted`.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn run<F, Fut>(&self, task: F) -> TaskHandle<Fut::Output>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        let runtime = Handle::current();
        let (tx, rx) = oneshot::channel();

        let starter: Starter = Box::new(move |slot: Slot| {
            let (launch_tx, launch_rx) = oneshot::channel::<Fut>();
            runtime.spawn(async move {
                if let Ok(future) = launch_rx.await {
                    let output = future.await;
                    // The caller may have dropped its handle
                    let _ = tx.send(output);
                }
                drop(slot);
            });

            // A runtime that has shut down drops the spawned future on the
            // spot; the task must then never be called.
            if launch_tx.is_closed() {
                debug!("runtime shut down, dropping queued task");
                return;
            }
            let _ = launch_tx.send(task());
        });

        self.shared.state().pending.push_back(starter);
        self.shared.advance();

        TaskHandle::new(rx)
    }

    // == Introspection ==
    /// Maximum number of tasks in flight.
    pub fn limit(&self) -> usize {
        self.shared.limit
    }

    /// Number of tasks started but not yet settled.
    pub fn active(&self) -> usize {
        self.shared.state().active
    }

    /// Number of tasks waiting for a slot.
    pub fn pending(&self) -> usize {
        self.shared.state().pending.len()
    }
}

impl std::fmt::Debug for ConcurrencyLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state();
        f.debug_struct("ConcurrencyLimiter")
            .field("limit", &self.shared.limit)
            .field("active", &state.active)
            .field("pending", &state.pending.len())
            .finish()
    }
}
