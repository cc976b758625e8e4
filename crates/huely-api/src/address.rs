// Bridge address validation
//
// A bridge is addressed by a bare IPv4 dotted quad. Discovery and manual
// entry both pass through `BridgeAddress::from_str`, so an invalid address
// never reaches URL construction.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// IPv4 address of a Hue bridge on the local network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BridgeAddress(Ipv4Addr);

impl BridgeAddress {
    pub fn ip(&self) -> Ipv4Addr {
        self.0
    }
}

impl FromStr for BridgeAddress {
    type Err = Error;

    /// Four dot-separated groups of 1-3 digits, each within 0-255.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        let well_formed = parts.len() == 4
            && parts
                .iter()
                .all(|p| (1..=3).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_digit()));
        if !well_formed {
            return Err(Error::validation("Invalid IP address format"));
        }

        let mut octets = [0u8; 4];
        for (slot, part) in octets.iter_mut().zip(&parts) {
            // At most three digits, so u16 parsing cannot overflow.
            let value: u16 = part
                .parse()
                .map_err(|_| Error::validation("Invalid IP address format"))?;
            *slot = u8::try_from(value)
                .map_err(|_| Error::validation("IP address numbers must be between 0 and 255"))?;
        }
        Ok(Self(Ipv4Addr::from(octets)))
    }
}

impl TryFrom<String> for BridgeAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BridgeAddress> for String {
    fn from(addr: BridgeAddress) -> Self {
        addr.to_string()
    }
}

impl From<Ipv4Addr> for BridgeAddress {
    fn from(ip: Ipv4Addr) -> Self {
        Self(ip)
    }
}

impl fmt::Display for BridgeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn message(s: &str) -> String {
        match s.parse::<BridgeAddress>() {
            Err(Error::Validation { message }) => message,
            other => panic!("expected validation error for {s:?}, got {other:?}"),
        }
    }

    #[test]
    fn accepts_every_octet_in_range() {
        for octet in 0..=255u16 {
            let s = format!("{octet}.{octet}.0.{octet}");
            let addr: BridgeAddress = s.parse().expect("octet in range");
            assert_eq!(addr.to_string(), s);
        }
    }

    #[test]
    fn accepts_common_addresses() {
        for s in ["192.168.1.2", "10.0.0.5", "0.0.0.0", "255.255.255.255"] {
            assert!(s.parse::<BridgeAddress>().is_ok(), "{s} should be valid");
        }
    }

    #[test]
    fn leading_zeros_are_normalised() {
        let addr: BridgeAddress = "010.001.000.009".parse().expect("valid");
        assert_eq!(addr.to_string(), "10.1.0.9");
    }

    #[test]
    fn rejects_octet_above_255() {
        for s in ["256.0.0.1", "1.2.3.999", "300.300.300.300"] {
            assert_eq!(message(s), "IP address numbers must be between 0 and 255");
        }
    }

    #[test]
    fn rejects_wrong_segment_count() {
        for s in ["", "1.2.3", "1.2.3.4.5", "1..2.3", "1.2.3.4."] {
            assert_eq!(message(s), "Invalid IP address format");
        }
    }

    #[test]
    fn rejects_non_numeric_segments() {
        for s in ["a.b.c.d", "1.2.3.x", "1.2.3.-4", "1.2.3.+4", " 1.2.3.4", "1.2.3.4:80", "1234.1.1.1"] {
            let err = s.parse::<BridgeAddress>().expect_err(s);
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn serde_round_trips_through_string() {
        let addr: BridgeAddress = serde_json::from_str("\"192.168.1.20\"").expect("valid");
        assert_eq!(serde_json::to_string(&addr).expect("serialize"), "\"192.168.1.20\"");
        assert!(serde_json::from_str::<BridgeAddress>("\"999.1.1.1\"").is_err());
    }
}
