//! # Bootstrap Pipeline
//!
//! Drives a whole batch of devices through the baseline stages. The batch
//! advances together: every state fans out one task per device and joins all
//! of them before the next state starts, so a slow device holds everyone back.
//!
//! ```text
//! Discovering -> PermissionsOff -> BaselineProfileLoaded -> LogsCleared
//!             -> DefaultsLoaded -> TrafficOff -> Reverifying -> Done
//! ```
//!
//! Without `apply_defaults` the pipeline goes straight from `Discovering` to
//! `Done`. The final live set always comes from a fresh probe of the original
//! candidates, never from the set that entered the stages.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use futures::future::join_all;
use satboot_common::config::{Config, FailurePolicy};
use satboot_common::error::BootstrapError;
use satboot_common::network::range::Candidates;
use satboot_protocols::firmware::Stage;
use tracing::{info, warn};

use crate::executor::StageExecutor;
use crate::http::{DeviceHttp, ReqwestDeviceClient};
use crate::poller::ConfirmationPoller;
use crate::prober::DeviceProber;
use crate::timing::{JitterSource, RandomJitter, pause};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Discovering,
    PermissionsOff,
    BaselineProfileLoaded,
    LogsCleared,
    DefaultsLoaded,
    TrafficOff,
    Reverifying,
    Done,
}

impl PipelineState {
    /// The stage applied to the batch while in this state.
    pub fn stage(self) -> Option<Stage> {
        match self {
            PipelineState::PermissionsOff => Some(Stage::PermissionsOff),
            PipelineState::BaselineProfileLoaded => Some(Stage::BaselineProfile),
            PipelineState::LogsCleared => Some(Stage::ClearLog),
            PipelineState::DefaultsLoaded => Some(Stage::LoadDefaults),
            PipelineState::TrafficOff => Some(Stage::TrafficOff),
            PipelineState::Discovering | PipelineState::Reverifying | PipelineState::Done => None,
        }
    }

    pub fn next(self, apply_defaults: bool) -> Option<PipelineState> {
        match self {
            PipelineState::Discovering if !apply_defaults => Some(PipelineState::Done),
            PipelineState::Discovering => Some(PipelineState::PermissionsOff),
            PipelineState::PermissionsOff => Some(PipelineState::BaselineProfileLoaded),
            PipelineState::BaselineProfileLoaded => Some(PipelineState::LogsCleared),
            PipelineState::LogsCleared => Some(PipelineState::DefaultsLoaded),
            PipelineState::DefaultsLoaded => Some(PipelineState::TrafficOff),
            PipelineState::TrafficOff => Some(PipelineState::Reverifying),
            PipelineState::Reverifying => Some(PipelineState::Done),
            PipelineState::Done => None,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outcome of one stage across the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    /// Devices the stage was fanned out to, in batch order.
    pub attempted: Vec<IpAddr>,
    pub succeeded: Vec<IpAddr>,
}

impl StageReport {
    pub fn failed(&self) -> impl Iterator<Item = &IpAddr> {
        self.attempted
            .iter()
            .filter(|addr| !self.succeeded.contains(addr))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Live set found by the first discovery pass.
    pub discovered: Vec<IpAddr>,
    /// Live set after the last discovery pass; what the caller gets back.
    pub live: Vec<IpAddr>,
    pub states: Vec<PipelineState>,
    pub stages: Vec<StageReport>,
}

pub struct Pipeline {
    config: Config,
    prober: DeviceProber,
    executor: StageExecutor,
    poller: ConfirmationPoller,
}

impl Pipeline {
    pub fn new(config: Config, http: Arc<dyn DeviceHttp>) -> Self {
        let jitter: Arc<dyn JitterSource> = Arc::new(RandomJitter::new(config.max_jitter));
        let prober = DeviceProber::new(http.clone(), config.probe_timeout);
        let executor = StageExecutor::new(
            http.clone(),
            jitter,
            config.request_timeout,
            config.retry_attempts,
            config.retry_delay,
        );
        let poller = ConfirmationPoller::new(
            http,
            config.request_timeout,
            config.poll_interval,
            config.confirm_deadline,
        );

        Self {
            config,
            prober,
            executor,
            poller,
        }
    }

    /// Replaces the random pre-request jitter, e.g. with [`crate::NoJitter`].
    pub fn with_jitter(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.executor.set_jitter(jitter);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Final live set only.
    pub async fn discover_and_bootstrap(
        &self,
        candidates: &[IpAddr],
        apply_defaults: bool,
    ) -> Result<Vec<IpAddr>, BootstrapError> {
        Ok(self.run(candidates, apply_defaults).await?.live)
    }

    /// Runs the state machine over `candidates`.
    ///
    /// Fails only on precondition violations, before any device is contacted.
    /// Per-device failures are logged and reflected in the stage reports.
    pub async fn run(
        &self,
        candidates: &[IpAddr],
        apply_defaults: bool,
    ) -> Result<BootstrapReport, BootstrapError> {
        self.config.validate()?;
        let candidates: Candidates = candidates.iter().copied().collect();
        self.config.check_candidates(candidates.len())?;
        if candidates.is_empty() {
            warn!("no candidate addresses, nothing to probe");
        }

        let mut report = BootstrapReport::default();
        let mut working: Vec<IpAddr> = Vec::new();
        let mut state = PipelineState::Discovering;

        loop {
            info!(%state, devices = working.len(), "entering state");
            report.states.push(state);

            match state {
                PipelineState::Discovering => {
                    working = self.prober.discover(candidates.as_slice()).await;
                    report.discovered = working.clone();
                    report.live = working.clone();
                }
                PipelineState::Reverifying => {
                    pause(self.config.settle_delay).await;
                    report.live = self.prober.discover(candidates.as_slice()).await;
                }
                PipelineState::Done => break,
                _ => {
                    if let Some(stage) = state.stage() {
                        let stage_report = self.run_stage(stage, &working).await;
                        if self.config.failure_policy == FailurePolicy::DropFailed {
                            working = stage_report.succeeded.clone();
                        }
                        report.stages.push(stage_report);
                    }
                }
            }

            match state.next(apply_defaults) {
                Some(next) => state = next,
                None => break,
            }
        }

        info!(live = report.live.len(), "bootstrap finished");
        Ok(report)
    }

    async fn run_stage(&self, stage: Stage, devices: &[IpAddr]) -> StageReport {
        let outcomes = join_all(devices.iter().map(|&addr| self.apply_stage(stage, addr))).await;

        let succeeded: Vec<IpAddr> = devices
            .iter()
            .zip(outcomes)
            .filter_map(|(&addr, ok)| ok.then_some(addr))
            .collect();

        if succeeded.len() < devices.len() {
            warn!(
                %stage,
                failed = devices.len() - succeeded.len(),
                attempted = devices.len(),
                "stage failed on some devices"
            );
        }

        StageReport {
            stage,
            attempted: devices.to_vec(),
            succeeded,
        }
    }

    /// Issues the stage and, for asynchronous stages, waits for its marker.
    async fn apply_stage(&self, stage: Stage, addr: IpAddr) -> bool {
        let cycles = if stage.reissue_on_timeout() {
            self.config.defaults_attempts
        } else {
            1
        };

        for cycle in 1..=cycles {
            if !self.issue(stage, addr).await {
                return false;
            }

            let Some(marker) = stage.confirmation_marker() else {
                return true;
            };

            if self.poller.confirm(addr, marker).await {
                return true;
            }

            if cycle < cycles {
                warn!(ip = %addr, %stage, cycle, "no confirmation, issuing again");
            }
        }

        warn!(ip = %addr, %stage, "stage not confirmed");
        false
    }

    async fn issue(&self, stage: Stage, addr: IpAddr) -> bool {
        for request in stage.requests() {
            if !self.executor.execute(addr, request).await {
                return false;
            }
        }
        true
    }
}

/// Probes `candidates` and, with `apply_defaults`, bootstraps every live
/// device over plain HTTP. Returns the final live set.
pub async fn discover_and_bootstrap(
    candidates: &[IpAddr],
    apply_defaults: bool,
    config: Config,
) -> Result<Vec<IpAddr>, BootstrapError> {
    config.validate()?;
    let client = ReqwestDeviceClient::new(config.http_port)
        .map_err(|err| BootstrapError::ClientSetup(err.to_string()))?;

    Pipeline::new(config, Arc::new(client))
        .discover_and_bootstrap(candidates, apply_defaults)
        .await
}
