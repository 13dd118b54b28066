//! # Device Identity
//!
//! Devices are given on the command line in one of two forms:
//! * `name@address` (e.g. `core-sw1@10.0.0.2`).
//! * A bare address or hostname, which doubles as the name.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    pub name: String,
    pub address: String,
}

impl DeviceIdentity {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl FromStr for DeviceIdentity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let (name, address) = match s.split_once('@') {
            Some((name, address)) => (name.trim(), address.trim()),
            None => (s, s),
        };

        if name.is_empty() {
            return Err(format!("missing device name in '{s}'"));
        }
        if !is_valid_address(address) {
            return Err(format!("invalid device address in '{s}'"));
        }

        Ok(Self::new(name, address))
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.address {
            write!(f, "{}", self.address)
        } else {
            write!(f, "{} ({})", self.name, self.address)
        }
    }
}

fn is_valid_address(address: &str) -> bool {
    if address.parse::<IpAddr>().is_ok() {
        return true;
    }
    !address.is_empty()
        && address
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_devices() {
        let id: DeviceIdentity = "Router2@127.0.0.1".parse().unwrap();
        assert_eq!(id.name, "Router2");
        assert_eq!(id.address, "127.0.0.1");
        assert_eq!(id.to_string(), "Router2 (127.0.0.1)");
    }

    #[test]
    fn bare_address_names_itself() {
        let id: DeviceIdentity = "sw-access-01.lab".parse().unwrap();
        assert_eq!(id.name, "sw-access-01.lab");
        assert_eq!(id.to_string(), "sw-access-01.lab");

        let v6: DeviceIdentity = "edge@2001:db8::1".parse().unwrap();
        assert_eq!(v6.address, "2001:db8::1");
    }

    #[test]
    fn rejects_incomplete_input() {
        assert!("@10.0.0.1".parse::<DeviceIdentity>().is_err());
        assert!("router@".parse::<DeviceIdentity>().is_err());
        assert!("router@bad host".parse::<DeviceIdentity>().is_err());
        assert!("".parse::<DeviceIdentity>().is_err());
    }
}
