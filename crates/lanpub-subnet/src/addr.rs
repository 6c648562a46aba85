//! Dotted-quad / integer conversion

use std::net::Ipv4Addr;

use lanpub_core::{LanpubError, LanpubResult};

/// Parse a dotted-quad string into an address.
///
/// Rejects anything `Ipv4Addr` would not accept (wrong segment count,
/// octets above 255, empty or non-numeric segments).
pub fn parse_addr(s: &str) -> LanpubResult<Ipv4Addr> {
    s.parse::<Ipv4Addr>()
        .map_err(|_| LanpubError::InvalidAddress(s.to_string()))
}

/// Convert a dotted-quad string to its 32-bit integer form.
pub fn to_u32(s: &str) -> LanpubResult<u32> {
    parse_addr(s).map(u32::from)
}

/// Convert a 32-bit integer back to an address.
pub fn from_u32(n: u32) -> Ipv4Addr {
    Ipv4Addr::from(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_to_u32() {
        assert_eq!(to_u32("192.168.1.10").unwrap(), 0xC0A8_010A);
        assert_eq!(to_u32("0.0.0.0").unwrap(), 0);
        assert_eq!(to_u32("255.255.255.255").unwrap(), u32::MAX);
    }

    #[test]
    fn test_malformed_addresses_rejected() {
        for bad in ["", "1.2.3", "1.2.3.4.5", "256.0.0.1", "a.b.c.d", "1.2.3.-4"] {
            assert!(
                matches!(to_u32(bad), Err(LanpubError::InvalidAddress(_))),
                "expected InvalidAddress for {bad:?}"
            );
        }
    }

    proptest! {
        #[test]
        fn prop_roundtrip(n in any::<u32>()) {
            let addr = from_u32(n);
            prop_assert_eq!(to_u32(&addr.to_string()).unwrap(), n);
        }

        #[test]
        fn prop_string_roundtrip(a in 0u8..=255, b in 0u8..=255, c in 0u8..=255, d in 0u8..=255) {
            let s = format!("{a}.{b}.{c}.{d}");
            let n = to_u32(&s).unwrap();
            prop_assert_eq!(from_u32(n).to_string(), s);
        }
    }
}
