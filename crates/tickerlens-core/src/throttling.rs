use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::provider_policy::ProviderPolicy;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Client-side call budget. A call over budget is refused, never queued.
#[derive(Clone)]
pub struct QuotaGate {
    limiter: Arc<DirectRateLimiter>,
    clock: DefaultClock,
}

impl QuotaGate {
    pub fn new(quota_window: Duration, quota_limit: u32) -> Self {
        let clock = DefaultClock::default();
        Self {
            limiter: Arc::new(RateLimiter::direct_with_clock(
                quota_from_window(quota_window, quota_limit),
                &clock,
            )),
            clock,
        }
    }

    pub fn from_policy(policy: &ProviderPolicy) -> Self {
        Self::new(policy.quota_window, policy.quota_limit)
    }

    /// Takes one unit of budget, or returns how long until one frees up.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        self.limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }
}

fn quota_from_window(quota_window: Duration, quota_limit: u32) -> Quota {
    let burst = NonZeroU32::new(quota_limit.max(1)).unwrap_or(NonZeroU32::MIN);
    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(burst.get())).max(0.001);

    Quota::with_period(Duration::from_secs_f64(seconds_per_cell))
        .map(|quota| quota.allow_burst(burst))
        .unwrap_or_else(|| Quota::per_second(burst))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_calls_beyond_budget() {
        let gate = QuotaGate::new(Duration::from_secs(60), 2);

        assert!(gate.try_acquire().is_ok());
        assert!(gate.try_acquire().is_ok());

        let wait = gate.try_acquire().expect_err("third call should be refused");
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_secs(30));
    }

    #[test]
    fn zero_limit_still_allows_one_call() {
        let gate = QuotaGate::new(Duration::from_secs(60), 0);
        assert!(gate.try_acquire().is_ok());
        assert!(gate.try_acquire().is_err());
    }
}
