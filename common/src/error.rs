use thiserror::Error;

/// Failure of a single HTTP exchange with a device.
///
/// These never leave the engine: the executor retries them and the poller
/// waits them out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("http error: {0}")]
    Http(String),
}

/// The only errors a bootstrap invocation reports to its caller.
///
/// All of them are raised before any network activity starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    #[error("{requested} devices requested but only {available} candidate addresses were supplied")]
    NotEnoughCandidates { requested: usize, available: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("could not set up the http client: {0}")]
    ClientSetup(String),
}

/// Why an operator-supplied target could not be turned into addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("invalid target: {0}")]
    InvalidHost(String),
    #[error("invalid start of range: {0}")]
    InvalidRangeStart(String),
    #[error("invalid end of range: {0}")]
    InvalidRangeEnd(String),
    #[error("range end precedes range start: {0}")]
    ReversedRange(String),
    #[error("range {target} holds {len} addresses, the limit is {limit}")]
    OversizedRange { target: String, len: u64, limit: u64 },
    #[error("invalid CIDR block: {0}")]
    InvalidCidr(String),
    #[error("no targets in '{0}'")]
    EmptyList(String),
}
