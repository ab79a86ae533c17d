pub mod bootstrap;
pub mod discover;

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use satboot_common::config::{Config, FailurePolicy};
use satboot_common::network::target::Target;
use satboot_core::{NoJitter, Pipeline, ReqwestDeviceClient};

#[derive(Parser)]
#[command(name = "satboot")]
#[command(about = "Discover satellite modems and return them to a known baseline.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Print less; repeat to only print the final result
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Log more; repeat for debug and trace output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Don't print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe candidate addresses and list the live devices
    #[command(alias = "d")]
    Discover {
        /// Addresses, ranges (10.0.0.1-20) or CIDR blocks, comma separated or repeated
        #[arg(required = true)]
        targets: Vec<Target>,
        #[command(flatten)]
        tuning: Tuning,
    },
    /// Probe, then drive every live device back to its factory baseline
    #[command(alias = "b")]
    Bootstrap {
        #[arg(required = true)]
        targets: Vec<Target>,
        #[command(flatten)]
        tuning: Tuning,
        /// Fail before touching the network unless at least N candidates are given
        #[arg(long, value_name = "N")]
        require: Option<usize>,
        /// Stop sending stages to a device once one of its stages failed
        #[arg(long)]
        drop_failed: bool,
    },
}

/// Engine knobs shared by every subcommand. Durations are in seconds.
#[derive(Args, Debug, Clone)]
pub struct Tuning {
    /// Device web server port
    #[arg(long, default_value_t = 80)]
    pub port: u16,
    #[arg(long, value_name = "SECS", value_parser = parse_secs, default_value = "3")]
    pub probe_timeout: Duration,
    #[arg(long, value_name = "SECS", value_parser = parse_secs, default_value = "5")]
    pub request_timeout: Duration,
    /// How long to wait for a stage to show up in the device log
    #[arg(long, value_name = "SECS", value_parser = parse_secs, default_value = "20")]
    pub deadline: Duration,
    #[arg(long, value_name = "SECS", value_parser = parse_secs, default_value = "1")]
    pub poll_interval: Duration,
    #[arg(long, value_name = "SECS", value_parser = parse_secs, default_value = "1")]
    pub retry_delay: Duration,
    #[arg(long, value_name = "SECS", value_parser = parse_secs, default_value = "2")]
    pub max_jitter: Duration,
    /// Send stage requests without the random pre-request delay
    #[arg(long)]
    pub no_jitter: bool,
}

impl Tuning {
    pub fn to_config(&self) -> Config {
        Config {
            http_port: self.port,
            probe_timeout: self.probe_timeout,
            request_timeout: self.request_timeout,
            confirm_deadline: self.deadline,
            poll_interval: self.poll_interval,
            retry_delay: self.retry_delay,
            max_jitter: self.max_jitter,
            ..Config::default()
        }
    }

    pub fn build_pipeline(&self, cfg: Config) -> anyhow::Result<Pipeline> {
        let client = ReqwestDeviceClient::new(cfg.http_port)?;
        let pipeline = Pipeline::new(cfg, Arc::new(client));

        Ok(if self.no_jitter {
            pipeline.with_jitter(Arc::new(NoJitter))
        } else {
            pipeline
        })
    }
}

/// Settings that only affect what gets printed.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub quiet: u8,
    pub no_banner: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn output(&self) -> OutputOptions {
        OutputOptions {
            quiet: self.quiet,
            no_banner: self.no_banner,
        }
    }
}

pub fn failure_policy(drop_failed: bool) -> FailurePolicy {
    if drop_failed {
        FailurePolicy::DropFailed
    } else {
        FailurePolicy::Continue
    }
}

fn parse_secs(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid number of seconds '{s}': {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration '{s}': {e}"))
}
