use tokio::time::{interval, Duration};

use crate::limiter::rate_limiter::LoginLimiter;

const SWEEP_EVERY: Duration = Duration::from_secs(60);
const IDLE_AFTER: Duration = Duration::from_secs(60 * 10);

/// Forgets clients that have not tried to sign in for a while.
pub async fn start_limiter_sweep(limiter: LoginLimiter) {
    let mut interval = interval(SWEEP_EVERY);

    loop {
        interval.tick().await;

        let evicted = limiter.evict_idle(IDLE_AFTER);
        if evicted > 0 {
            tracing::debug!(evicted, remaining = limiter.tracked_clients(), "Swept idle sign-in throttles");
        }
    }
}
