//! A scripted modem firmware for scenario tests.
//!
//! Each simulated device serves the status page, keeps a rolling log with
//! timestamps on the tokio clock, and reacts to stage requests the way the
//! real firmware does. Faults are configured per device.

use std::collections::HashMap;
use std::net::IpAddr;
use std::ops::Range;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use satboot_common::config::Config;
use satboot_common::error::TransportError;
use satboot_core::{DeviceHttp, NoJitter, Pipeline};
use satboot_protocols::firmware::{
    DEFAULTS_LOADED_MARKER, FirmwareRequest, LOG_CLEARED_MARKER, LOG_PAGE,
    PROFILE_RUNNING_MARKER, STATUS_PAGE, Stage,
};
use tokio::time::Instant;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const STATUS_BODY: &str =
    "<html><table><tr><td>State</td><td>Operational</td></tr></table></html>";

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

pub fn ips(list: &[&str]) -> Vec<IpAddr> {
    list.iter().map(|s| ip(s)).collect()
}

/// Short deadlines so scenarios stay readable on the paused clock.
pub fn test_config() -> Config {
    Config {
        confirm_deadline: Duration::from_secs(10),
        settle_delay: Duration::from_secs(2),
        ..Config::default()
    }
}

pub fn pipeline(sim: &Arc<SimulatedFirmware>, config: Config) -> Pipeline {
    Pipeline::new(config, sim.clone()).with_jitter(Arc::new(NoJitter))
}

#[derive(Debug, Clone)]
pub struct Call {
    pub addr: IpAddr,
    pub request: FirmwareRequest,
    pub at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct DeviceSpec {
    /// Windows, relative to simulator creation, during which connections are refused.
    pub outages: Vec<Range<Duration>>,
    /// Never answers at all; every request times out.
    pub silent: bool,
    /// Requests refused this many times before they go through.
    pub refuse: HashMap<FirmwareRequest, usize>,
    /// Markers the firmware never writes.
    pub suppressed: Vec<&'static str>,
    /// Load-defaults commands silently ignored before one is honoured.
    pub dropped_defaults: usize,
    /// Delay between a command and its marker showing up in the log.
    pub marker_delay: Duration,
    /// Stage after which the device drops off the network for a while.
    pub bounce_after: Option<(Stage, Duration)>,
}

impl DeviceSpec {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }

    pub fn down_during(mut self, window: Range<Duration>) -> Self {
        self.outages.push(window);
        self
    }

    pub fn refusing(mut self, request: FirmwareRequest, times: usize) -> Self {
        self.refuse.insert(request, times);
        self
    }

    pub fn suppressing(mut self, marker: &'static str) -> Self {
        self.suppressed.push(marker);
        self
    }

    pub fn dropping_defaults(mut self, times: usize) -> Self {
        self.dropped_defaults = times;
        self
    }

    pub fn with_marker_delay(mut self, delay: Duration) -> Self {
        self.marker_delay = delay;
        self
    }

    pub fn bouncing_after(mut self, stage: Stage, downtime: Duration) -> Self {
        self.bounce_after = Some((stage, downtime));
        self
    }
}

#[derive(Debug)]
struct DeviceState {
    spec: DeviceSpec,
    log: Vec<(Instant, String)>,
    down_until: Option<Instant>,
}

impl DeviceState {
    fn reachable(&self, epoch: Instant, now: Instant) -> bool {
        let since_epoch = now - epoch;
        let in_outage = self
            .spec
            .outages
            .iter()
            .any(|window| window.contains(&since_epoch));
        let bounced = self.down_until.is_some_and(|until| now < until);
        !in_outage && !bounced
    }

    fn write_log(&mut self, now: Instant, marker: &'static str) {
        if self.spec.suppressed.contains(&marker) {
            return;
        }
        self.log.push((now + self.spec.marker_delay, marker.to_string()));
    }

    fn log_page(&self, now: Instant) -> String {
        let lines: Vec<&str> = self
            .log
            .iter()
            .filter(|(visible_at, _)| *visible_at <= now)
            .map(|(_, line)| line.as_str())
            .collect();
        format!(
            "<html><body><h2>Event log</h2><pre>{}</pre></body></html>",
            lines.join("\n")
        )
    }

    fn apply(&mut self, now: Instant, request: &FirmwareRequest) {
        let Some(stage) = Stage::ALL
            .into_iter()
            .find(|stage| stage.requests().contains(request))
        else {
            return;
        };

        match stage {
            Stage::BaselineProfile if stage.requests().last() == Some(request) => {
                self.write_log(now, PROFILE_RUNNING_MARKER);
            }
            Stage::ClearLog => {
                self.log.clear();
                self.write_log(now, LOG_CLEARED_MARKER);
            }
            Stage::LoadDefaults => {
                if self.spec.dropped_defaults > 0 {
                    self.spec.dropped_defaults -= 1;
                } else {
                    self.write_log(now, DEFAULTS_LOADED_MARKER);
                }
            }
            _ => {}
        }

        if let Some((bounce_stage, downtime)) = self.spec.bounce_after {
            if bounce_stage == stage {
                self.down_until = Some(now + downtime);
            }
        }
    }
}

pub struct SimulatedFirmware {
    epoch: Instant,
    devices: Mutex<HashMap<IpAddr, DeviceState>>,
    calls: Mutex<Vec<Call>>,
}

impl SimulatedFirmware {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            devices: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_device(self, addr: &str, spec: DeviceSpec) -> Self {
        self.devices.lock().unwrap().insert(
            ip(addr),
            DeviceState {
                spec,
                log: Vec::new(),
                down_until: None,
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, addr: &str, request: &FirmwareRequest) -> usize {
        let addr = ip(addr);
        self.calls()
            .iter()
            .filter(|call| call.addr == addr && call.request == *request)
            .count()
    }

    /// Addresses `request` was sent to, first-seen order.
    pub fn recipients(&self, request: &FirmwareRequest) -> Vec<IpAddr> {
        let mut seen = Vec::new();
        for call in self.calls() {
            if call.request == *request && !seen.contains(&call.addr) {
                seen.push(call.addr);
            }
        }
        seen
    }

    /// Answers one request the way the device at `addr` would right now.
    pub fn respond(&self, addr: IpAddr, request: &FirmwareRequest) -> Reply {
        let now = Instant::now();
        self.calls.lock().unwrap().push(Call {
            addr,
            request: *request,
            at: now,
        });

        let mut devices = self.devices.lock().unwrap();
        let Some(device) = devices.get_mut(&addr) else {
            return Reply::Hang;
        };

        if device.spec.silent {
            return Reply::Hang;
        }
        if !device.reachable(self.epoch, now) {
            return Reply::Refused;
        }
        if let Some(left) = device.spec.refuse.get_mut(request) {
            if *left > 0 {
                *left -= 1;
                return Reply::Refused;
            }
        }

        if *request == STATUS_PAGE {
            return Reply::Body(STATUS_BODY.to_string());
        }
        if *request == LOG_PAGE {
            return Reply::Body(device.log_page(now));
        }

        device.apply(now, request);
        Reply::Body("<html>OK</html>".to_string())
    }
}

pub enum Reply {
    Body(String),
    Refused,
    Hang,
}

#[async_trait]
impl DeviceHttp for SimulatedFirmware {
    async fn get(
        &self,
        addr: IpAddr,
        request: &FirmwareRequest,
        _timeout: Duration,
    ) -> Result<String, TransportError> {
        match self.respond(addr, request) {
            Reply::Body(body) => Ok(body),
            Reply::Refused => Err(TransportError::Connect("connection refused".into())),
            Reply::Hang => std::future::pending().await,
        }
    }
}

/// Every request the firmware understands, for mapping raw HTTP targets back.
fn known_requests() -> Vec<FirmwareRequest> {
    let mut known = vec![STATUS_PAGE, LOG_PAGE];
    for stage in Stage::ALL {
        known.extend_from_slice(stage.requests());
    }
    known
}

/// Answers mock server requests from a [`SimulatedFirmware`] as the device
/// at `addr`.
struct FirmwareResponder {
    sim: Arc<SimulatedFirmware>,
    addr: IpAddr,
}

impl Respond for FirmwareResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let path = request.url.path();
        let query = request.url.query().unwrap_or("");

        let Some(firmware_request) = known_requests()
            .into_iter()
            .find(|known| known.path == path && known.query == query)
        else {
            return ResponseTemplate::new(404);
        };

        match self.sim.respond(self.addr, &firmware_request) {
            Reply::Body(body) => ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(body),
            // A mock server cannot refuse a connection; refusals are covered
            // by addresses nothing listens on.
            Reply::Refused => ResponseTemplate::new(503),
            Reply::Hang => ResponseTemplate::new(200).set_delay(Duration::from_secs(3_600)),
        }
    }
}

/// Serves `sim` over real HTTP on an ephemeral 127.0.0.1 port.
///
/// Every request is answered as the device at 127.0.0.1. Keep the returned
/// server alive for as long as the test needs it.
pub async fn serve_over_http(sim: Arc<SimulatedFirmware>) -> MockServer {
    let server = MockServer::start().await;
    let addr = server.address().ip();

    Mock::given(method("GET"))
        .respond_with(FirmwareResponder { sim, addr })
        .mount(&server)
        .await;

    server
}
