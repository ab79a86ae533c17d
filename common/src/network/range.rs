use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};

/// Largest range a single target may expand to.
pub const MAX_RANGE_LEN: u64 = 65_536;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    /// Number of addresses in the range, zero when `end < start`.
    pub fn len(&self) -> u64 {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        if end < start {
            0
        } else {
            u64::from(end - start) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_iter(&self) -> impl Iterator<Item = IpAddr> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(|ip| IpAddr::V4(Ipv4Addr::from(ip)))
    }
}

pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let network = pnet::ipnetwork::Ipv4Network::new(ip, prefix)?;
    let start = network.network();
    let end = network.broadcast();

    Ok(Ipv4Range::new(start, end))
}

/// Ordered set of candidate device addresses.
///
/// Insertion order is kept and repeated addresses are ignored, so a device is
/// probed at most once per discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    ordered: Vec<IpAddr>,
    seen: HashSet<IpAddr>,
}

impl Candidates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the address was already present.
    pub fn add_single(&mut self, addr: IpAddr) -> bool {
        if !self.seen.insert(addr) {
            return false;
        }
        self.ordered.push(addr);
        true
    }

    pub fn add_range(&mut self, range: Ipv4Range) {
        for addr in range.to_iter() {
            self.add_single(addr);
        }
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn as_slice(&self) -> &[IpAddr] {
        &self.ordered
    }

    pub fn into_vec(self) -> Vec<IpAddr> {
        self.ordered
    }
}

impl FromIterator<IpAddr> for Candidates {
    fn from_iter<T: IntoIterator<Item = IpAddr>>(iter: T) -> Self {
        let mut candidates = Candidates::new();
        for addr in iter {
            candidates.add_single(addr);
        }
        candidates
    }
}
