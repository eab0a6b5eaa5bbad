/*
 *     Copyright 2024 The Hostview Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use hostview_core::Result;
use pnet::datalink::{self, NetworkInterface};
use tracing::debug;

/// Network enumerates the network interfaces of the host.
#[derive(Debug, Clone, Default)]
pub struct Network {}

/// Interface represents a network interface with its addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interface {
    /// The name of the network interface.
    pub name: String,

    /// The hardware address, empty for interfaces without one (e.g. loopback).
    pub hardware_addr: String,

    /// The assigned addresses in CIDR notation, e.g. `192.168.1.10/24`.
    pub addrs: Vec<String>,
}

/// Interface implements the conversion from a datalink interface.
impl From<&NetworkInterface> for Interface {
    fn from(interface: &NetworkInterface) -> Self {
        let hardware_addr = match interface.mac {
            Some(mac) if !mac.is_zero() => mac.to_string(),
            _ => String::new(),
        };

        Interface {
            name: interface.name.clone(),
            hardware_addr,
            addrs: interface.ips.iter().map(|ip| ip.to_string()).collect(),
        }
    }
}

impl Network {
    /// Returns the network interfaces in the order the operating system
    /// enumerates them.
    pub fn get_interfaces(&self) -> Result<Vec<Interface>> {
        let interfaces: Vec<Interface> = datalink::interfaces()
            .iter()
            .map(Interface::from)
            .collect();
        debug!("found {} network interfaces", interfaces.len());
        Ok(interfaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnet::datalink::MacAddr;
    use pnet::ipnetwork::IpNetwork;
    use std::net::Ipv4Addr;

    fn datalink_interface(
        name: &str,
        mac: Option<MacAddr>,
        ips: Vec<IpNetwork>,
    ) -> NetworkInterface {
        NetworkInterface {
            name: name.to_string(),
            description: String::new(),
            index: 1,
            mac,
            ips,
            flags: 0,
        }
    }

    #[test]
    fn convert_interface_with_addresses() {
        let ips = vec![
            IpNetwork::new(Ipv4Addr::new(192, 168, 1, 10).into(), 24).unwrap(),
            IpNetwork::new("fe80::1".parse().unwrap(), 64).unwrap(),
        ];
        let interface = datalink_interface(
            "eth0",
            Some(MacAddr::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff)),
            ips,
        );

        let interface = Interface::from(&interface);
        assert_eq!(interface.name, "eth0");
        assert_eq!(interface.hardware_addr, "aa:bb:cc:dd:ee:ff");
        assert_eq!(interface.addrs, vec!["192.168.1.10/24", "fe80::1/64"]);
    }

    #[test]
    fn convert_interface_without_hardware_address() {
        let loopback = datalink_interface(
            "lo",
            Some(MacAddr::zero()),
            vec![IpNetwork::new(Ipv4Addr::LOCALHOST.into(), 8).unwrap()],
        );
        let interface = Interface::from(&loopback);
        assert!(interface.hardware_addr.is_empty());
        assert_eq!(interface.addrs, vec!["127.0.0.1/8"]);

        let tunnel = datalink_interface("tun0", None, vec![]);
        let interface = Interface::from(&tunnel);
        assert!(interface.hardware_addr.is_empty());
        assert!(interface.addrs.is_empty());
    }
}
