use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use satboot_protocols::firmware::LOG_PAGE;
use satboot_protocols::log_page;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::http::{DeviceHttp, bounded_get};
use crate::timing::{pause, remaining};

/// Watches a device's log page for the marker of an asynchronous stage.
pub struct ConfirmationPoller {
    http: Arc<dyn DeviceHttp>,
    request_timeout: Duration,
    interval: Duration,
    deadline: Duration,
}

impl ConfirmationPoller {
    pub fn new(
        http: Arc<dyn DeviceHttp>,
        request_timeout: Duration,
        interval: Duration,
        deadline: Duration,
    ) -> Self {
        Self {
            http,
            request_timeout,
            interval,
            deadline,
        }
    }

    /// Polls until `marker` shows up in the log or the deadline passes.
    ///
    /// The deadline is measured from this call. Fetch errors are not counted,
    /// they only use up time.
    pub async fn confirm(&self, addr: IpAddr, marker: &str) -> bool {
        let started = Instant::now();
        let deadline = started + self.deadline;

        loop {
            let fetch_bound = self.request_timeout.min(remaining(deadline));
            match bounded_get(self.http.as_ref(), addr, &LOG_PAGE, fetch_bound).await {
                Ok(page) if log_page::contains_marker(&page, marker) => {
                    info!(ip = %addr, marker, elapsed = ?started.elapsed(), "confirmed");
                    return true;
                }
                Ok(_) => trace!(ip = %addr, marker, "marker not in log yet"),
                Err(err) => debug!(ip = %addr, error = %err, "log fetch failed"),
            }

            let left = remaining(deadline);
            if left.is_zero() {
                warn!(ip = %addr, marker, "no confirmation within {:?}", self.deadline);
                return false;
            }
            pause(self.interval.min(left)).await;
        }
    }
}
