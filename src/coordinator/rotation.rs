use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::observable::StateContainer;
use super::state::Event;

/// Spawns the ticker that walks the featured index through one committed pool.
///
/// The task holds only a weak reference, so it never keeps the state alive. It stops on
/// its own once its pool is replaced, since the advance event is then rejected.
pub fn spawn_rotation(
    container: Weak<StateContainer>,
    pool_generation: u64,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let Some(container) = container.upgrade() else {
                break;
            };
            if !container.dispatch(Event::FeaturedAdvanced { pool_generation }) {
                tracing::debug!(pool_generation, "Featured rotation stopped");
                break;
            }
        }
    })
}
