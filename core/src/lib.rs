//! # Discovery and Bootstrap Engine
//!
//! Finds which candidate addresses host a responsive modem and drives every
//! live modem back to a known baseline:
//!
//! * **[`prober`]**: one liveness probe per address, fanned out per batch.
//! * **[`executor`]**: one stage request with jitter and a bounded retry loop.
//! * **[`poller`]**: waits for a confirmation marker in the device log.
//! * **[`pipeline`]**: the batch-wide state machine tying the above together.
//!
//! All device traffic goes through the [`http::DeviceHttp`] trait.

pub mod executor;
pub mod http;
pub mod pipeline;
pub mod poller;
pub mod prober;
pub mod timing;


pub use http::{DeviceHttp, ReqwestDeviceClient};
pub use pipeline::{BootstrapReport, Pipeline, PipelineState, StageReport, discover_and_bootstrap};
pub use timing::{JitterSource, NoJitter, RandomJitter};
