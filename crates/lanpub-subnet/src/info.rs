//! Subnet derivation and host-range iteration

use std::net::Ipv4Addr;

use lanpub_core::{LanpubError, LanpubResult};

use crate::{from_u32, parse_addr};

/// Immutable snapshot of a subnet derived from (address, mask).
///
/// `first`/`last` bound the usable host range. Blocks with more than two
/// addresses exclude the network and broadcast addresses; blocks with two or
/// fewer treat every address as usable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubnetInfo {
    /// Network address (address & mask)
    pub network: Ipv4Addr,
    /// First usable host address
    pub first: Ipv4Addr,
    /// Last usable host address
    pub last: Ipv4Addr,
    /// Broadcast address of the block
    pub broadcast: Ipv4Addr,
    /// Number of set bits in the mask, in [0, 32]
    pub mask_len: u8,
    /// Number of usable host addresses
    pub num_hosts: u64,
}

impl SubnetInfo {
    /// Derive the subnet containing `addr` under `mask`.
    pub fn compute(addr: Ipv4Addr, mask: Ipv4Addr) -> Self {
        let mask_bits = u32::from(mask);
        let network = u32::from(addr) & mask_bits;
        let mask_len = mask_bits.count_ones() as u8;
        // u64 so a /0 block (2^32 addresses) does not overflow
        let num_addresses = 1u64 << (32 - mask_len as u64);

        let (first, last, num_hosts) = if num_addresses <= 2 {
            (
                network,
                network + (num_addresses as u32 - 1),
                num_addresses,
            )
        } else {
            (
                network + 1,
                (network as u64 + num_addresses - 2) as u32,
                num_addresses - 2,
            )
        };

        SubnetInfo {
            network: from_u32(network),
            first: from_u32(first),
            last: from_u32(last),
            broadcast: from_u32((network as u64 + num_addresses - 1) as u32),
            mask_len,
            num_hosts,
        }
    }

    /// Derive a subnet from dotted-quad strings.
    pub fn parse(addr: &str, mask: &str) -> LanpubResult<Self> {
        let addr = parse_addr(addr)?;
        let mask = parse_addr(mask).map_err(|_| LanpubError::InvalidMask(mask.to_string()))?;
        Ok(Self::compute(addr, mask))
    }

    /// Whether `other` falls inside this block.
    pub fn contains(&self, other: Ipv4Addr) -> bool {
        let network = u32::from(self.network);
        let broadcast = u32::from(self.broadcast);
        (network..=broadcast).contains(&u32::from(other))
    }

    /// Iterate the usable host range `[first, last]` inclusive.
    pub fn hosts(&self) -> HostIter {
        HostIter {
            next: u32::from(self.first) as u64,
            end: u32::from(self.last) as u64,
        }
    }
}

/// Iterator over a subnet's usable host addresses.
pub struct HostIter {
    next: u64,
    end: u64,
}

impl Iterator for HostIter {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Ipv4Addr> {
        if self.next > self.end {
            return None;
        }
        let addr = from_u32(self.next as u32);
        self.next += 1;
        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end + 1).saturating_sub(self.next);
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HostIter {}

#[cfg(test)]
mod tests {
    use super::*;

    fn subnet(addr: &str, mask: &str) -> SubnetInfo {
        SubnetInfo::parse(addr, mask).unwrap()
    }

    #[test]
    fn test_slash_24() {
        let info = subnet("192.168.1.10", "255.255.255.0");
        assert_eq!(info.network, Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(info.first, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(info.last, Ipv4Addr::new(192, 168, 1, 254));
        assert_eq!(info.broadcast, Ipv4Addr::new(192, 168, 1, 255));
        assert_eq!(info.mask_len, 24);
        assert_eq!(info.num_hosts, 254);
    }

    #[test]
    fn test_two_address_block() {
        let info = subnet("10.0.0.1", "255.255.255.254");
        assert_eq!(info.network, Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(info.first, info.network);
        assert_eq!(info.last, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(info.broadcast, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(info.num_hosts, 2);
    }

    #[test]
    fn test_single_address_block() {
        let info = subnet("10.0.0.7", "255.255.255.255");
        assert_eq!(info.first, Ipv4Addr::new(10, 0, 0, 7));
        assert_eq!(info.last, info.first);
        assert_eq!(info.num_hosts, 1);
        assert_eq!(info.mask_len, 32);
    }

    #[test]
    fn test_zero_mask_does_not_overflow() {
        let info = subnet("1.2.3.4", "0.0.0.0");
        assert_eq!(info.mask_len, 0);
        assert_eq!(info.num_hosts, (1u64 << 32) - 2);
        assert_eq!(info.first, Ipv4Addr::new(0, 0, 0, 1));
        assert_eq!(info.last, Ipv4Addr::new(255, 255, 255, 254));
        assert_eq!(info.broadcast, Ipv4Addr::new(255, 255, 255, 255));
    }

    #[test]
    fn test_contains() {
        let info = subnet("192.168.1.10", "255.255.255.0");
        assert!(info.contains(Ipv4Addr::new(192, 168, 1, 0)));
        assert!(info.contains(Ipv4Addr::new(192, 168, 1, 200)));
        assert!(info.contains(Ipv4Addr::new(192, 168, 1, 255)));
        assert!(!info.contains(Ipv4Addr::new(192, 168, 2, 1)));
        assert!(!info.contains(Ipv4Addr::new(192, 168, 0, 255)));
    }

    #[test]
    fn test_hosts_iteration() {
        let info = subnet("192.168.1.10", "255.255.255.248");
        let hosts: Vec<Ipv4Addr> = info.hosts().collect();
        assert_eq!(hosts.len(), 6);
        assert_eq!(hosts[0], Ipv4Addr::new(192, 168, 1, 9));
        assert_eq!(hosts[5], Ipv4Addr::new(192, 168, 1, 14));
        assert_eq!(info.hosts().len(), info.num_hosts as usize);
    }

    #[test]
    fn test_host_iter_size_hint_spans_full_range() {
        let info = subnet("1.2.3.4", "0.0.0.0");
        let (lower, upper) = info.hosts().size_hint();
        assert_eq!(upper, Some(lower));
        assert_eq!(lower as u64, info.num_hosts);
    }

    #[test]
    fn test_malformed_mask() {
        assert!(matches!(
            SubnetInfo::parse("10.0.0.1", "255.255.nope.0"),
            Err(lanpub_core::LanpubError::InvalidMask(_))
        ));
    }
}
