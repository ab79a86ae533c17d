//! Liveness probing.
//!
//! A probe is a point-in-time sample: one bounded GET of the status page,
//! no retries.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use satboot_protocols::firmware::{LIVENESS_MARKER, STATUS_PAGE};
use tracing::{debug, info};

use crate::http::{DeviceHttp, bounded_get};

pub struct DeviceProber {
    http: Arc<dyn DeviceHttp>,
    timeout: Duration,
}

impl DeviceProber {
    pub fn new(http: Arc<dyn DeviceHttp>, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// True when the status page answers in time and carries the firmware marker.
    pub async fn probe(&self, addr: IpAddr) -> bool {
        match bounded_get(self.http.as_ref(), addr, &STATUS_PAGE, self.timeout).await {
            Ok(body) if body.contains(LIVENESS_MARKER) => {
                debug!(ip = %addr, "device is live");
                true
            }
            Ok(_) => {
                debug!(ip = %addr, "status page does not look like device firmware");
                false
            }
            Err(err) => {
                debug!(ip = %addr, error = %err, "probe failed");
                false
            }
        }
    }

    /// Probes every candidate concurrently and returns the live ones in
    /// candidate order.
    pub async fn discover(&self, candidates: &[IpAddr]) -> Vec<IpAddr> {
        let results = join_all(
            candidates
                .iter()
                .map(|&addr| async move { (addr, self.probe(addr).await) }),
        )
        .await;

        let live: Vec<IpAddr> = results
            .into_iter()
            .filter_map(|(addr, is_live)| is_live.then_some(addr))
            .collect();

        info!(
            probed = candidates.len(),
            live = live.len(),
            "discovery pass finished"
        );
        live
    }
}
