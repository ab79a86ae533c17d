use std::net::IpAddr;

use colored::*;
use satboot_core::StageReport;

use crate::terminal::colors;

type Detail = (String, ColoredString);

pub fn addr_to_detail(addr: &IpAddr) -> Detail {
    match addr {
        IpAddr::V4(v4) => (String::from("IPv4"), v4.to_string().color(colors::IPV4_ADDR)),
        IpAddr::V6(v6) => (String::from("IPv6"), v6.to_string().color(colors::IPV6_ADDR)),
    }
}

/// How a device fared across the stages it was put through.
pub fn stages_to_detail(addr: &IpAddr, stages: &[StageReport]) -> Option<Detail> {
    let attempted: Vec<&StageReport> = stages
        .iter()
        .filter(|report| report.attempted.contains(addr))
        .collect();

    if attempted.is_empty() {
        return None;
    }

    let failed: Vec<String> = attempted
        .iter()
        .filter(|report| !report.succeeded.contains(addr))
        .map(|report| report.stage.to_string())
        .collect();

    let value = if failed.is_empty() {
        format!("{}/{} ok", attempted.len(), attempted.len()).green()
    } else {
        format!("failed {}", failed.join(", ")).color(colors::FAILURE)
    };

    Some((String::from("Stages"), value))
}
