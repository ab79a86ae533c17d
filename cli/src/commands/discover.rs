use std::net::IpAddr;
use std::time::{Duration, Instant};

use colored::*;
use satboot_common::network::target::{self, Target};
use satboot_core::StageReport;

use crate::commands::{OutputOptions, Tuning};
use crate::sprint;
use crate::terminal::{colors, format, print, spinner};

pub async fn discover(targets: &[Target], tuning: &Tuning, out: OutputOptions) -> anyhow::Result<()> {
    let candidates = target::to_candidates(targets);
    let pipeline = tuning.build_pipeline(tuning.to_config())?;

    spinner::get_spinner().start(format!("Probing {} candidate addresses...", candidates.len()));
    let start_time: Instant = Instant::now();
    let result = pipeline
        .discover_and_bootstrap(candidates.as_slice(), false)
        .await;
    spinner::get_spinner().finish_and_clear();

    let live: Vec<IpAddr> = result?;
    print_live_set(&live, &[], start_time.elapsed(), out);
    Ok(())
}

/// Prints the final live set, one tree entry per device.
pub fn print_live_set(
    live: &[IpAddr],
    stages: &[StageReport],
    total_time: Duration,
    out: OutputOptions,
) {
    if live.is_empty() {
        print::header("zero devices detected", out.quiet);
        print::no_results(out.quiet);
        return;
    }

    print::header("live devices", out.quiet);
    for (idx, addr) in live.iter().enumerate() {
        if out.quiet > 1 {
            sprint!(&addr.to_string());
            continue;
        }
        print_device_tree(addr, idx, stages);
        if idx + 1 != live.len() {
            sprint!();
        }
    }
    print_summary(live.len(), total_time, out);
}

fn print_device_tree(addr: &IpAddr, idx: usize, stages: &[StageReport]) {
    print::tree_head(idx, &addr.to_string());

    let mut details = vec![format::addr_to_detail(addr)];
    if let Some(stage_detail) = format::stages_to_detail(addr, stages) {
        details.push(stage_detail);
    }

    print::as_tree_one_level(details);
}

fn print_summary(live_len: usize, total_time: Duration, out: OutputOptions) {
    let live_devices: ColoredString = format!("{live_len} live devices").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!("Complete: {live_devices} in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    match out.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        1 => print::print_status(&output),
        _ => {}
    }
}
