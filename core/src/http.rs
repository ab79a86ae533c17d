use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use satboot_common::error::TransportError;
use satboot_protocols::firmware::FirmwareRequest;

/// The HTTP capability the engine needs from the outside world.
///
/// Implementations must return the full response body as text, or a
/// [`TransportError`] when the device could not be reached in time.
#[async_trait]
pub trait DeviceHttp: Send + Sync {
    async fn get(
        &self,
        addr: IpAddr,
        request: &FirmwareRequest,
        timeout: Duration,
    ) -> Result<String, TransportError>;
}

/// Issues `request` and enforces `timeout` even if the collaborator doesn't.
pub(crate) async fn bounded_get(
    http: &dyn DeviceHttp,
    addr: IpAddr,
    request: &FirmwareRequest,
    timeout: Duration,
) -> Result<String, TransportError> {
    match tokio::time::timeout(timeout, http.get(addr, request, timeout)).await {
        Ok(result) => result,
        Err(_elapsed) => Err(TransportError::Timeout),
    }
}

/// [`DeviceHttp`] over plain HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestDeviceClient {
    client: reqwest::Client,
    port: u16,
}

impl ReqwestDeviceClient {
    pub fn new(port: u16) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().no_proxy().build()?;
        Ok(Self { client, port })
    }

    pub fn url(&self, addr: IpAddr, request: &FirmwareRequest) -> String {
        let socket_addr = SocketAddr::new(addr, self.port);
        format!("http://{}{}", socket_addr, request.path_and_query())
    }
}

#[async_trait]
impl DeviceHttp for ReqwestDeviceClient {
    async fn get(
        &self,
        addr: IpAddr,
        request: &FirmwareRequest,
        timeout: Duration,
    ) -> Result<String, TransportError> {
        let response = self
            .client
            .get(self.url(addr, request))
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        response.text().await.map_err(classify)
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Http(err.to_string())
    }
}
