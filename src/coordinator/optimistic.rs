use std::future::Future;

use crate::error::AppResult;

use super::observable::StateContainer;
use super::state::Event;

/// A local change applied before its remote counterpart completes
pub struct OptimisticMutation {
    pub apply: Event,
    pub rollback: Event,
}

impl OptimisticMutation {
    pub fn new(apply: Event, rollback: Event) -> Self {
        Self { apply, rollback }
    }

    /// Applies the local change, then awaits `remote`.
    ///
    /// On failure the rollback event is dispatched and the error's user message is
    /// surfaced before the error is handed back.
    pub async fn run<T, F>(self, container: &StateContainer, remote: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        container.dispatch(self.apply);

        match remote.await {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(error = %e, "Remote mutation failed; rolling back");
                container.dispatch(self.rollback);
                container.dispatch(Event::ErrorRaised(e.user_message()));
                Err(e)
            }
        }
    }
}
