//! # Candidate Target Model
//!
//! Turns operator input into the candidate address list handed to the
//! bootstrap engine. A target can be:
//! * A single IP address (e.g., `10.0.0.5`).
//! * An IPv4 range (e.g., `10.0.0.1-20` or `10.0.0.1-10.0.0.20`).
//! * A CIDR block (e.g., `10.0.0.0/28`).
//! * A comma-separated list of any of the above.

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use tracing::info;

use crate::error::TargetError;
use crate::network::range::{self, Candidates, Ipv4Range, MAX_RANGE_LEN};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// A single device address.
    Host { target_addr: IpAddr },
    /// Every address of an inclusive IPv4 range.
    Range { ipv4_range: Ipv4Range },
    /// Holds a list of different targets
    Multi { targets: Vec<Target> },
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.contains(',') {
            return parse_commas(s);
        }

        if let Some(target) = parse_host(s) {
            return Ok(target);
        }

        if let Some(target) = parse_ip_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_cidr_range(s)? {
            return Ok(target);
        }

        Err(TargetError::InvalidHost(s.to_string()))
    }
}

fn resolve_target(target: &Target, candidates: &mut Candidates) {
    match target {
        Target::Host { target_addr } => {
            candidates.add_single(*target_addr);
        }
        Target::Range { ipv4_range } => {
            candidates.add_range(*ipv4_range);
        }
        Target::Multi { targets } => {
            for target in targets {
                resolve_target(target, candidates);
            }
        }
    }
}

/// Flattens targets into one ordered, duplicate-free candidate list.
pub fn to_candidates(targets: &[Target]) -> Candidates {
    let mut candidates = Candidates::new();

    for target in targets {
        resolve_target(target, &mut candidates);
    }

    let len: usize = candidates.len();
    let unit: &str = if len == 1 { "candidate address" } else { "candidate addresses" };
    info!("{len} {unit} parsed");

    candidates
}

/// Parses a comma-separated list of targets (e.g., "10.0.0.5, 10.0.0.10-20").
fn parse_commas(s: &str) -> Result<Target, TargetError> {
    let mut targets = Vec::new();

    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        targets.push(Target::from_str(part)?);
    }

    if targets.is_empty() {
        return Err(TargetError::EmptyList(s.to_string()));
    }

    Ok(Target::Multi { targets })
}

fn parse_host(s: &str) -> Option<Target> {
    s.parse::<IpAddr>()
        .ok()
        .map(|target_addr| Target::Host { target_addr })
}

/// Parses a range string like "1.1.1.1-2.2.2.2" or "1.1.1.1-50".
fn parse_ip_range(s: &str) -> Result<Option<Target>, TargetError> {
    let Some((start_str, end_str)) = s.split_once('-') else {
        return Ok(None);
    };

    let start_addr = start_str
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| TargetError::InvalidRangeStart(s.to_string()))?;

    let end_addr = parse_range_end_addr(end_str.trim(), &start_addr, s)?;

    let ipv4_range = checked_range(Ipv4Range::new(start_addr, end_addr), s)?;
    Ok(Some(Target::Range { ipv4_range }))
}

/// Helper to parse the end address of a range.
///
/// Handles abbreviated forms like "10.0.0.1-50" (implies 10.0.0.50)
/// and full forms like "10.0.0.1-10.0.0.255".
fn parse_range_end_addr(
    end_str: &str,
    start_addr: &Ipv4Addr,
    original_s: &str,
) -> Result<Ipv4Addr, TargetError> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    if end_str.is_empty() {
        return Err(TargetError::InvalidRangeEnd(original_s.to_string()));
    }

    let mut end_octets = start_addr.octets();
    let partial_octets: Vec<u8> = end_str
        .split('.')
        .map(|octet_str| octet_str.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| TargetError::InvalidRangeEnd(original_s.to_string()))?;

    if partial_octets.len() > 4 {
        return Err(TargetError::InvalidRangeEnd(original_s.to_string()));
    }

    let start_index = 4 - partial_octets.len();
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(Ipv4Addr::from(end_octets))
}

/// Parses CIDR notation like "10.0.0.0/24".
fn parse_cidr_range(s: &str) -> Result<Option<Target>, TargetError> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let invalid = || TargetError::InvalidCidr(s.to_string());

    let ipv4_addr = ip_str.parse::<Ipv4Addr>().map_err(|_| invalid())?;
    let prefix = prefix_str.parse::<u8>().map_err(|_| invalid())?;
    let ipv4_range = range::cidr_range(ipv4_addr, prefix).map_err(|_| invalid())?;

    Ok(Some(Target::Range {
        ipv4_range: checked_range(ipv4_range, s)?,
    }))
}

fn checked_range(ipv4_range: Ipv4Range, original_s: &str) -> Result<Ipv4Range, TargetError> {
    if ipv4_range.is_empty() {
        return Err(TargetError::ReversedRange(original_s.to_string()));
    }
    if ipv4_range.len() > MAX_RANGE_LEN {
        return Err(TargetError::OversizedRange {
            target: original_s.to_string(),
            len: ipv4_range.len(),
            limit: MAX_RANGE_LEN,
        });
    }
    Ok(ipv4_range)
}
