use std::time::Instant;

use satboot_common::network::target::{self, Target};
use satboot_core::BootstrapReport;

use crate::commands::{OutputOptions, Tuning, discover};
use crate::terminal::{print, spinner};

pub async fn bootstrap(
    targets: &[Target],
    tuning: &Tuning,
    require: Option<usize>,
    drop_failed: bool,
    out: OutputOptions,
) -> anyhow::Result<()> {
    let candidates = target::to_candidates(targets);

    let mut cfg = tuning.to_config();
    cfg.required_devices = require;
    cfg.failure_policy = super::failure_policy(drop_failed);

    let pipeline = tuning.build_pipeline(cfg)?;
    print_plan(candidates.len(), &pipeline, out);

    spinner::get_spinner().start(format!(
        "Bootstrapping devices among {} candidates...",
        candidates.len()
    ));
    let start_time: Instant = Instant::now();
    let result = pipeline.run(candidates.as_slice(), true).await;
    spinner::get_spinner().finish_and_clear();

    let report: BootstrapReport = result?;
    print_stage_summary(&report, out);
    discover::print_live_set(&report.live, &report.stages, start_time.elapsed(), out);
    Ok(())
}

fn print_plan(candidates: usize, pipeline: &satboot_core::Pipeline, out: OutputOptions) {
    if out.quiet > 0 {
        return;
    }

    let cfg = pipeline.config();
    print::header("bootstrap plan", out.quiet);
    print::aligned_line("Targets", format!("{candidates} candidate addresses"));
    print::aligned_line("Port", cfg.http_port.to_string());
    print::aligned_line("Deadline", format!("{:?} per confirmation", cfg.confirm_deadline));
    print::aligned_line("Policy", format!("{:?}", cfg.failure_policy));
}

fn print_stage_summary(report: &BootstrapReport, out: OutputOptions) {
    if out.quiet > 0 || report.stages.is_empty() {
        return;
    }

    print::header("stages", out.quiet);
    print::aligned_line("discover", format!("{} live", report.discovered.len()));
    for stage in &report.stages {
        let failed = stage.failed().count();
        print::aligned_line(
            stage.stage.as_str(),
            format!("{}/{} ok, {failed} failed", stage.succeeded.len(), stage.attempted.len()),
        );
    }
}
