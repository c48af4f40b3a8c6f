use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use super::state::{reduce, Event, ViewState};

/// Observable holder of the current [`ViewState`]
///
/// Every change goes through [`StateContainer::dispatch`]; subscribers are woken after
/// each applied event. Once disposed, dispatches are dropped.
pub struct StateContainer {
    tx: watch::Sender<ViewState>,
    disposed: AtomicBool,
}

impl StateContainer {
    pub fn new(initial: ViewState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx,
            disposed: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.tx.borrow().clone()
    }

    /// Reads from the current state without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&ViewState) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Applies an event, returning whether it was accepted.
    ///
    /// The staleness check and the transition happen under the channel's write lock,
    /// so no other event can slip in between them.
    pub fn dispatch(&self, event: Event) -> bool {
        if self.is_disposed() {
            tracing::debug!(?event, "Dropping event after shutdown");
            return false;
        }

        self.tx.send_if_modified(|state| {
            if !event.applies_to(state) {
                return false;
            }
            *state = reduce(state, event);
            true
        })
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}
