//! Coalescing update queue.
//!
//! At most one reconciliation runs at a time and at most one more waits.
//! A newer waiting update replaces the older one: under rapid edits only
//! the latest content is rendered next.

use parking_lot::Mutex;

/// Result of [`UpdateQueue::submit`].
#[derive(Debug, PartialEq, Eq)]
pub enum Submission<T> {
    /// Nothing was running; the caller runs `T` now.
    Run(T),
    /// An update is in flight; `T` waits, replacing any earlier waiter.
    Queued,
}

#[derive(Debug)]
struct QueueState<T> {
    running: bool,
    pending: Option<T>,
    superseded: u64,
}

/// Single-flight queue holding at most one pending item.
#[derive(Debug)]
pub struct UpdateQueue<T> {
    state: Mutex<QueueState<T>>,
}

impl<T> UpdateQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                running: false,
                pending: None,
                superseded: 0,
            }),
        }
    }

    pub fn submit(&self, item: T) -> Submission<T> {
        let mut state = self.state.lock();
        if !state.running {
            state.running = true;
            return Submission::Run(item);
        }
        if state.pending.replace(item).is_some() {
            state.superseded += 1;
        }
        Submission::Queued
    }

    /// Finish the running item. Returns the pending item, which is now
    /// running, or marks the queue idle.
    pub fn complete(&self) -> Option<T> {
        let mut state = self.state.lock();
        let next = state.pending.take();
        if next.is_none() {
            state.running = false;
        }
        next
    }

    pub fn is_busy(&self) -> bool {
        self.state.lock().running
    }

    pub fn has_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    /// Number of pending items dropped in favour of newer ones.
    pub fn superseded(&self) -> u64 {
        self.state.lock().superseded
    }
}

impl<T> Default for UpdateQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// PreviewSession (async feature)
// =============================================================================

#[cfg(feature = "async")]
mod session {
    use futures_util::lock::Mutex;

    use super::{Submission, UpdateQueue};
    use crate::node::Element;
    use crate::patch::{MorphPatcher, TreePatcher};
    use crate::reconcile::{ReconcileOutcome, Reconciler, Typesetter};

    /// Result of [`PreviewSession::update`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum UpdateStatus {
        /// This call ran the queue until it drained.
        Applied {
            /// Updates applied by this call, the caller's own included.
            passes: usize,
            /// Outcome of the last pass.
            outcome: ReconcileOutcome,
        },
        /// Another call is running; this content will be applied by it
        /// unless newer content arrives first.
        Queued,
    }

    struct SessionState<T, P> {
        live: Element,
        reconciler: Reconciler<P>,
        typesetter: T,
    }

    /// A live preview: the live tree, its reconciler and its typesetter.
    pub struct PreviewSession<T, P = MorphPatcher> {
        queue: UpdateQueue<Element>,
        state: Mutex<SessionState<T, P>>,
    }

    impl<T: Typesetter> PreviewSession<T> {
        pub fn new(live: Element, reconciler: Reconciler, typesetter: T) -> Self {
            Self::with_reconciler(live, reconciler, typesetter)
        }
    }

    impl<T: Typesetter, P: TreePatcher> PreviewSession<T, P> {
        pub fn with_reconciler(live: Element, reconciler: Reconciler<P>, typesetter: T) -> Self {
            Self {
                queue: UpdateQueue::new(),
                state: Mutex::new(SessionState {
                    live,
                    reconciler,
                    typesetter,
                }),
            }
        }

        /// Bring the live tree up to date with `staged`.
        ///
        /// If an update is already running, `staged` is queued and this
        /// returns at once; the running call picks up the newest queued
        /// content when it finishes.
        pub async fn update(&self, staged: Element) -> UpdateStatus {
            let mut staged = match self.queue.submit(staged) {
                Submission::Run(staged) => staged,
                Submission::Queued => {
                    tracing::debug!(superseded = self.queue.superseded(), "update queued");
                    return UpdateStatus::Queued;
                }
            };

            let mut state = self.state.lock().await;
            let SessionState {
                live,
                reconciler,
                typesetter,
            } = &mut *state;

            let mut passes = 0;
            loop {
                let outcome = reconciler.reconcile_and_typeset(live, &staged, typesetter).await;
                passes += 1;
                match self.queue.complete() {
                    Some(next) => staged = next,
                    None => return UpdateStatus::Applied { passes, outcome },
                }
            }
        }

        /// Read the live tree.
        pub async fn with_live<R>(&self, f: impl FnOnce(&Element) -> R) -> R {
            let state = self.state.lock().await;
            f(&state.live)
        }

        pub fn superseded(&self) -> u64 {
            self.queue.superseded()
        }

        pub fn into_live(self) -> Element {
            self.state.into_inner().live
        }
    }
}

#[cfg(feature = "async")]
pub use session::{PreviewSession, UpdateStatus};
