//! End-to-end runs over real sockets on the loopback interface.
//!
//! The simulated firmware sits behind a mock HTTP server bound to 127.0.0.1.
//! Nothing listens on 127.0.0.2 at the same port, so it refuses.

use std::sync::Arc;
use std::time::Duration;

use satboot_common::config::Config;
use satboot_core::discover_and_bootstrap;
use satboot_protocols::firmware::{STATUS_PAGE, Stage};

use crate::support::{DeviceSpec, SimulatedFirmware, ip, serve_over_http};

fn loopback_config(port: u16) -> Config {
    Config {
        http_port: port,
        probe_timeout: Duration::from_secs(1),
        request_timeout: Duration::from_secs(1),
        retry_delay: Duration::from_millis(50),
        max_jitter: Duration::ZERO,
        poll_interval: Duration::from_millis(50),
        confirm_deadline: Duration::from_secs(2),
        settle_delay: Duration::ZERO,
        ..Config::default()
    }
}

#[tokio::test]
async fn probe_only_run_finds_the_listening_device() -> anyhow::Result<()> {
    let sim = Arc::new(SimulatedFirmware::new().with_device("127.0.0.1", DeviceSpec::healthy()));
    let server = serve_over_http(sim.clone()).await;

    let live = discover_and_bootstrap(
        &[ip("127.0.0.1"), ip("127.0.0.2")],
        false,
        loopback_config(server.address().port()),
    )
    .await?;

    assert_eq!(live, vec![ip("127.0.0.1")]);
    assert_eq!(sim.count("127.0.0.1", &STATUS_PAGE), 1);
    for stage in Stage::ALL {
        for request in stage.requests() {
            assert!(sim.recipients(request).is_empty(), "{stage} was issued");
        }
    }
    Ok(())
}

#[tokio::test]
async fn full_bootstrap_over_http_reaches_every_stage() -> anyhow::Result<()> {
    let sim = Arc::new(SimulatedFirmware::new().with_device("127.0.0.1", DeviceSpec::healthy()));
    let server = serve_over_http(sim.clone()).await;

    let live = discover_and_bootstrap(
        &[ip("127.0.0.1"), ip("127.0.0.2")],
        true,
        loopback_config(server.address().port()),
    )
    .await?;

    assert_eq!(live, vec![ip("127.0.0.1")]);
    for stage in Stage::ALL {
        for request in stage.requests() {
            assert_eq!(sim.recipients(request), vec![ip("127.0.0.1")], "{stage}");
            assert_eq!(sim.count("127.0.0.1", request), 1, "{request}");
        }
    }
    // initial discovery plus reverification
    assert_eq!(sim.count("127.0.0.1", &STATUS_PAGE), 2);
    Ok(())
}

#[tokio::test]
async fn silent_device_times_out_instead_of_hanging_the_run() -> anyhow::Result<()> {
    let sim = Arc::new(SimulatedFirmware::new().with_device("127.0.0.1", DeviceSpec::silent()));
    let server = serve_over_http(sim.clone()).await;

    let started = std::time::Instant::now();
    let live = discover_and_bootstrap(&[ip("127.0.0.1")], true, loopback_config(server.address().port())).await?;

    assert!(live.is_empty());
    assert!(started.elapsed() < Duration::from_secs(5));
    Ok(())
}
