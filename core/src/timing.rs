use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

/// Supplies the random pause taken before a stage request.
///
/// Spreading requests keeps a large batch from hitting the firmware in lockstep.
pub trait JitterSource: Send + Sync {
    fn next_delay(&self) -> Duration;
}

/// Uniform jitter in `[0, max]`, millisecond resolution.
#[derive(Debug, Clone, Copy)]
pub struct RandomJitter {
    max: Duration,
}

impl RandomJitter {
    pub fn new(max: Duration) -> Self {
        Self { max }
    }
}

impl JitterSource for RandomJitter {
    fn next_delay(&self) -> Duration {
        let max_millis = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        if max_millis == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max_millis))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn next_delay(&self) -> Duration {
        Duration::ZERO
    }
}

pub(crate) fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

pub(crate) async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
