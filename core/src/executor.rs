use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use satboot_protocols::firmware::FirmwareRequest;
use tracing::{debug, error, warn};

use crate::http::{DeviceHttp, bounded_get};
use crate::timing::{JitterSource, pause};

/// Sends one stage request to one device with a small, fixed retry budget.
///
/// Success only means the device answered; the firmware does not report
/// whether it accepted the command.
pub struct StageExecutor {
    http: Arc<dyn DeviceHttp>,
    jitter: Arc<dyn JitterSource>,
    timeout: Duration,
    attempts: u32,
    retry_delay: Duration,
}

impl StageExecutor {
    pub fn new(
        http: Arc<dyn DeviceHttp>,
        jitter: Arc<dyn JitterSource>,
        timeout: Duration,
        attempts: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            http,
            jitter,
            timeout,
            attempts,
            retry_delay,
        }
    }

    pub fn set_jitter(&mut self, jitter: Arc<dyn JitterSource>) {
        self.jitter = jitter;
    }

    pub async fn execute(&self, addr: IpAddr, request: &FirmwareRequest) -> bool {
        pause(self.jitter.next_delay()).await;

        for attempt in 1..=self.attempts {
            match bounded_get(self.http.as_ref(), addr, request, self.timeout).await {
                Ok(_) => {
                    debug!(ip = %addr, %request, attempt, "stage request delivered");
                    return true;
                }
                Err(err) => {
                    warn!(
                        ip = %addr,
                        %request,
                        attempt,
                        attempts = self.attempts,
                        error = %err,
                        "stage request failed"
                    );
                    if attempt < self.attempts {
                        pause(self.retry_delay).await;
                    }
                }
            }
        }

        error!(ip = %addr, %request, "giving up after {} attempts", self.attempts);
        false
    }
}
