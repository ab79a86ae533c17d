use std::time::Duration;

use crate::error::BootstrapError;

/// What the pipeline does with a device after one of its stages fails.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Keep driving the device through the remaining stages.
    #[default]
    Continue,
    /// Remove the device from the working set for the remaining stages.
    ///
    /// The final re-discovery still probes every original candidate.
    DropFailed,
}

/// Tuning for a single discovery-and-bootstrap invocation.
///
/// Nothing here is global: every pipeline owns its own copy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the device web server listens on.
    pub http_port: u16,
    /// Upper bound for a single liveness probe.
    pub probe_timeout: Duration,
    /// Upper bound for a single stage request or log fetch.
    pub request_timeout: Duration,
    /// Total attempts per stage request, first one included.
    pub retry_attempts: u32,
    /// Pause between two attempts of the same stage request.
    pub retry_delay: Duration,
    /// Random delay in `[0, max_jitter]` taken before the first attempt.
    pub max_jitter: Duration,
    /// Cadence of the log page polling.
    pub poll_interval: Duration,
    /// How long a confirmation may take, counted from the start of the poll.
    pub confirm_deadline: Duration,
    /// Issue-then-confirm cycles allowed for the factory defaults stage.
    pub defaults_attempts: u32,
    /// Pause between the last stage and the final re-discovery.
    pub settle_delay: Duration,
    /// Minimum number of candidate addresses the caller needs.
    pub required_devices: Option<usize>,
    pub failure_policy: FailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 80,
            probe_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(5),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(1),
            max_jitter: Duration::from_secs(2),
            poll_interval: Duration::from_secs(1),
            confirm_deadline: Duration::from_secs(20),
            defaults_attempts: 3,
            settle_delay: Duration::from_secs(2),
            required_devices: None,
            failure_policy: FailurePolicy::Continue,
        }
    }
}

impl Config {
    /// Rejects settings that would make the engine loop forever or never try.
    pub fn validate(&self) -> Result<(), BootstrapError> {
        if self.retry_attempts == 0 {
            return Err(BootstrapError::InvalidConfig("retry attempts must be at least 1"));
        }
        if self.defaults_attempts == 0 {
            return Err(BootstrapError::InvalidConfig("defaults attempts must be at least 1"));
        }
        if self.poll_interval.is_zero() {
            return Err(BootstrapError::InvalidConfig("poll interval must be non-zero"));
        }
        if self.confirm_deadline.is_zero() {
            return Err(BootstrapError::InvalidConfig("confirmation deadline must be non-zero"));
        }
        if self.probe_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(BootstrapError::InvalidConfig("timeouts must be non-zero"));
        }
        Ok(())
    }

    /// Checks the caller's device count against the candidate pool.
    pub fn check_candidates(&self, available: usize) -> Result<(), BootstrapError> {
        match self.required_devices {
            Some(requested) if requested > available => {
                Err(BootstrapError::NotEnoughCandidates { requested, available })
            }
            _ => Ok(()),
        }
    }
}
