use anyhow::{anyhow, bail, Result};
use std::net::IpAddr;

/// A single allow-list entry, either an exact address or a CIDR block.
#[derive(Debug, Clone, PartialEq, Eq)]
enum IpRule {
    Exact(IpAddr),
    Cidr { network: IpAddr, prefix: u8 },
}

impl IpRule {
    fn parse(entry: &str) -> Result<Self> {
        match entry.split_once('/') {
            None => Ok(IpRule::Exact(
                entry
                    .parse()
                    .map_err(|_| anyhow!("invalid ip address: {}", entry))?,
            )),
            Some((addr, prefix)) => {
                let network: IpAddr = addr
                    .parse()
                    .map_err(|_| anyhow!("invalid network address: {}", addr))?;
                let prefix: u8 = prefix
                    .parse()
                    .map_err(|_| anyhow!("invalid prefix length: {}", prefix))?;
                let max = match network {
                    IpAddr::V4(_) => 32,
                    IpAddr::V6(_) => 128,
                };
                if prefix > max {
                    bail!("prefix /{} too long for {}", prefix, addr);
                }
                Ok(IpRule::Cidr { network, prefix })
            }
        }
    }

    fn matches(&self, ip: IpAddr) -> bool {
        match self {
            IpRule::Exact(exact) => *exact == ip,
            IpRule::Cidr { network, prefix } => match (network, ip) {
                (IpAddr::V4(network), IpAddr::V4(ip)) => {
                    let mask = prefix_mask_v4(*prefix);
                    u32::from(*network) & mask == u32::from(ip) & mask
                }
                (IpAddr::V6(network), IpAddr::V6(ip)) => {
                    let mask = prefix_mask_v6(*prefix);
                    u128::from(*network) & mask == u128::from(ip) & mask
                }
                _ => false,
            },
        }
    }
}

fn prefix_mask_v4(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix as u32)
    }
}

fn prefix_mask_v6(prefix: u8) -> u128 {
    if prefix == 0 {
        0
    } else {
        u128::MAX << (128 - prefix as u32)
    }
}

/// Client-IP filter. An empty list admits everyone.
#[derive(Debug, Clone, Default)]
pub struct IpAllowlist {
    rules: Vec<IpRule>,
}

impl IpAllowlist {
    pub fn parse(entries: &[String]) -> Result<Self> {
        let rules = entries
            .iter()
            .map(|entry| IpRule::parse(entry.trim()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn is_allowed(&self, ip: IpAddr) -> bool {
        self.rules.is_empty() || self.rules.iter().any(|rule| rule.matches(ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowlist(entries: &[&str]) -> IpAllowlist {
        IpAllowlist::parse(&entries.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn empty_list_admits_everyone() {
        let list = IpAllowlist::default();
        assert!(list.is_allowed(ip("203.0.113.7")));
    }

    #[test]
    fn exact_address_match() {
        let list = allowlist(&["192.168.1.10"]);
        assert!(list.is_allowed(ip("192.168.1.10")));
        assert!(!list.is_allowed(ip("192.168.1.11")));
    }

    #[test]
    fn cidr_containment() {
        let list = allowlist(&["10.0.0.0/8"]);
        assert!(list.is_allowed(ip("10.0.0.5")));
        assert!(!list.is_allowed(ip("11.0.0.5")));
    }

    #[test]
    fn narrow_cidr_prefix() {
        let list = allowlist(&["192.168.1.0/30"]);
        assert!(list.is_allowed(ip("192.168.1.3")));
        assert!(!list.is_allowed(ip("192.168.1.4")));
    }

    #[test]
    fn zero_prefix_matches_all_v4() {
        let list = allowlist(&["0.0.0.0/0"]);
        assert!(list.is_allowed(ip("203.0.113.7")));
        assert!(!list.is_allowed(ip("::1")));
    }

    #[test]
    fn ipv6_cidr() {
        let list = allowlist(&["fd00::/8"]);
        assert!(list.is_allowed(ip("fd12:3456::1")));
        assert!(!list.is_allowed(ip("fe80::1")));
    }

    #[test]
    fn v4_rule_never_matches_v6_address() {
        let list = allowlist(&["10.0.0.0/8"]);
        assert!(!list.is_allowed(ip("::ffff:a00:5")));
    }

    #[test]
    fn invalid_entries_are_rejected() {
        assert!(IpAllowlist::parse(&["10.0.0.0/33".to_string()]).is_err());
        assert!(IpAllowlist::parse(&["not-an-ip".to_string()]).is_err());
        assert!(IpAllowlist::parse(&["10.0.0.0/x".to_string()]).is_err());
    }
}
