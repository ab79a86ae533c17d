use std::fmt;

/// Status page served by a healthy device.
pub const STATUS_PAGE: FirmwareRequest = FirmwareRequest::new("/cgi-bin/status", "");
/// Rolling log/debug page polled for confirmation markers.
pub const LOG_PAGE: FirmwareRequest = FirmwareRequest::new("/cgi-bin/log", "");

/// Present in [`STATUS_PAGE`] whenever the firmware is up.
pub const LIVENESS_MARKER: &str = "State";

pub const PROFILE_RUNNING_MARKER: &str = "Pr1 manual run";
pub const LOG_CLEARED_MARKER: &str = "Log cleared";
pub const DEFAULTS_LOADED_MARKER: &str = "Config 1 loaded";

/// One GET understood by the firmware: a fixed path and an optional query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FirmwareRequest {
    pub path: &'static str,
    pub query: &'static str,
}

impl FirmwareRequest {
    pub const fn new(path: &'static str, query: &'static str) -> Self {
        Self { path, query }
    }

    /// The request target as sent on the wire, `path[?query]`.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.path.to_string()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

impl fmt::Display for FirmwareRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_and_query())
    }
}

const PERMISSIONS_OFF: &[FirmwareRequest] = &[FirmwareRequest::new(
    "/cgi-bin/admin",
    "cmd=set&remote_mgmt=0&apply=1",
)];

const BASELINE_PROFILE: &[FirmwareRequest] = &[
    FirmwareRequest::new("/cgi-bin/profile", "cmd=select&pr=1"),
    FirmwareRequest::new("/cgi-bin/profile", "cmd=set&pr=1&mode=manual"),
    FirmwareRequest::new("/cgi-bin/profile", "cmd=set&pr=1&tx=0&rx=0"),
    FirmwareRequest::new("/cgi-bin/profile", "cmd=run&pr=1"),
];

const CLEAR_LOG: &[FirmwareRequest] = &[FirmwareRequest::new("/cgi-bin/stats", "cmd=clear&log=1")];

const LOAD_DEFAULTS: &[FirmwareRequest] =
    &[FirmwareRequest::new("/cgi-bin/config", "cmd=load&bank=1")];

const TRAFFIC_OFF: &[FirmwareRequest] =
    &[FirmwareRequest::new("/cgi-bin/trafgen", "cmd=set&enable=0")];

/// A configuration action applied to every device of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    PermissionsOff,
    BaselineProfile,
    ClearLog,
    LoadDefaults,
    TrafficOff,
}

impl Stage {
    /// Stages in the order a batch goes through them.
    pub const ALL: [Stage; 5] = [
        Stage::PermissionsOff,
        Stage::BaselineProfile,
        Stage::ClearLog,
        Stage::LoadDefaults,
        Stage::TrafficOff,
    ];

    /// Requests issued for this stage, in order.
    pub fn requests(self) -> &'static [FirmwareRequest] {
        match self {
            Stage::PermissionsOff => PERMISSIONS_OFF,
            Stage::BaselineProfile => BASELINE_PROFILE,
            Stage::ClearLog => CLEAR_LOG,
            Stage::LoadDefaults => LOAD_DEFAULTS,
            Stage::TrafficOff => TRAFFIC_OFF,
        }
    }

    /// Log marker proving the stage took effect, for asynchronous stages.
    pub fn confirmation_marker(self) -> Option<&'static str> {
        match self {
            Stage::BaselineProfile => Some(PROFILE_RUNNING_MARKER),
            Stage::ClearLog => Some(LOG_CLEARED_MARKER),
            Stage::LoadDefaults => Some(DEFAULTS_LOADED_MARKER),
            Stage::PermissionsOff | Stage::TrafficOff => None,
        }
    }

    /// Whether the firmware may silently drop the command, in which case the
    /// whole issue-then-confirm cycle is repeated.
    pub fn reissue_on_timeout(self) -> bool {
        matches!(self, Stage::LoadDefaults)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::PermissionsOff => "permissions-off",
            Stage::BaselineProfile => "baseline-profile",
            Stage::ClearLog => "clear-log",
            Stage::LoadDefaults => "load-defaults",
            Stage::TrafficOff => "traffic-off",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
