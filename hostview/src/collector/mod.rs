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

use hostview_core::{Error, Result};
use hostview_util::sysinfo::{DefaultProvider, Provider};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// DEFAULT_DISK_PATH is the path whose filesystem is reported by default.
const DEFAULT_DISK_PATH: &str = "/";

/// CpuInfo describes one processor of the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuInfo {
    /// Position of the processor, starting from zero.
    pub index: usize,

    pub vendor_id: String,

    pub family: String,

    pub cores: u32,

    pub model: String,

    /// Clock speed, e.g. `2400.00 MHz`.
    pub speed: String,
}

/// InterfaceAddrs is a network interface and the addresses assigned to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceAddrs {
    pub name: String,

    /// Addresses in CIDR notation, in enumeration order.
    pub addresses: Vec<String>,
}

/// Snapshot is a point-in-time capture of the host metrics. Every field
/// keeps its zero value when the query behind it failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub disk_size: u64,

    pub disk_free: u64,

    /// Always `disk_size - disk_free`.
    pub disk_used: u64,

    pub total_memory: u64,

    pub free_memory: u64,

    /// Always `total_memory - free_memory`.
    pub used_memory: u64,

    pub cache_memory: u64,

    pub logical_cpus: usize,

    pub cpu_info: Vec<CpuInfo>,

    /// Utilization of all CPUs in percent.
    pub cpu_percent: f64,

    pub hostname: String,

    pub running_processes: u64,

    pub platform: String,

    pub platform_version: String,

    /// Hardware address of the last enumerated interface that has one.
    pub mac_address: String,

    /// Interfaces in the order they were first enumerated.
    pub interfaces: Vec<InterfaceAddrs>,
}

/// Collector assembles snapshots from a provider.
#[derive(Debug)]
pub struct Collector<P: Provider> {
    provider: P,

    /// Path whose filesystem usage is reported.
    disk_path: PathBuf,
}

impl<P: Provider> Collector<P> {
    /// Creates a collector reporting the filesystem mounted at `/`.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            disk_path: PathBuf::from(DEFAULT_DISK_PATH),
        }
    }

    /// Sets the path whose filesystem usage is reported.
    pub fn with_disk_path(mut self, disk_path: impl Into<PathBuf>) -> Self {
        self.disk_path = disk_path.into();
        self
    }

    /// Collects a snapshot, diagnostics are written to stderr.
    pub fn collect(&self) -> Snapshot {
        self.collect_to(&mut io::stderr())
    }

    /// Collects a snapshot, diagnostics are written to `diagnostics`.
    ///
    /// Provider failures never abort the collection, the affected fields
    /// keep their zero values.
    #[instrument(skip_all)]
    pub fn collect_to<W: Write>(&self, diagnostics: &mut W) -> Snapshot {
        let mut snapshot = Snapshot::default();

        match self.provider.disk_usage(&self.disk_path) {
            Ok(stats) => {
                snapshot.disk_size = stats.total;
                snapshot.disk_free = stats.free;
                snapshot.disk_used = stats.total.saturating_sub(stats.free);
            }
            Err(err) => debug!(
                "get disk usage of {} failed: {}",
                self.disk_path.display(),
                err
            ),
        }

        match self.provider.virtual_memory() {
            Ok(stats) => {
                snapshot.total_memory = stats.total;
                snapshot.free_memory = stats.free;
                snapshot.used_memory = stats.total.saturating_sub(stats.free);
                snapshot.cache_memory = stats.cached;
            }
            Err(err) => debug!("get virtual memory failed: {}", err),
        }

        match self.provider.cpu_info() {
            Ok(descriptors) => {
                snapshot.cpu_info = descriptors
                    .into_iter()
                    .enumerate()
                    .map(|(index, descriptor)| CpuInfo {
                        index,
                        vendor_id: descriptor.vendor_id,
                        family: descriptor.family,
                        cores: descriptor.cores,
                        model: descriptor.model_name,
                        speed: format!("{:.2} MHz", descriptor.mhz),
                    })
                    .collect();
            }
            Err(err) => debug!("get cpu info failed: {}", err),
        }

        match self.cpu_percent() {
            Ok(percent) => snapshot.cpu_percent = percent,
            Err(err) => {
                error!("get cpu percent failed: {}", err);
                if let Err(err) = writeln!(diagnostics, "error getting CPU Percent Usage: {}", err)
                {
                    debug!("write diagnostics failed: {}", err);
                }
            }
        }

        match self.provider.host_info() {
            Ok(stats) => {
                snapshot.hostname = stats.hostname;
                snapshot.running_processes = stats.procs;
                snapshot.platform = stats.platform;
                snapshot.platform_version = stats.platform_version;
            }
            Err(err) => debug!("get host info failed: {}", err),
        }

        match self.provider.interfaces() {
            Ok(interfaces) => {
                for interface in interfaces {
                    if !interface.hardware_addr.is_empty() {
                        snapshot.mac_address = interface.hardware_addr;
                    }

                    let index = match snapshot
                        .interfaces
                        .iter()
                        .position(|entry| entry.name == interface.name)
                    {
                        Some(index) => index,
                        None => {
                            snapshot.interfaces.push(InterfaceAddrs {
                                name: interface.name,
                                addresses: Vec::new(),
                            });
                            snapshot.interfaces.len() - 1
                        }
                    };

                    snapshot.interfaces[index]
                        .addresses
                        .extend(interface.addrs);
                }
            }
            Err(err) => debug!("get network interfaces failed: {}", err),
        }

        snapshot.logical_cpus = self.provider.logical_cpu_count();
        snapshot
    }

    /// Returns the utilization of all CPUs since the previous sample.
    fn cpu_percent(&self) -> Result<f64> {
        self.provider
            .cpu_percent(Duration::ZERO, false)?
            .first()
            .copied()
            .ok_or_else(|| Error::ProviderUnavailable("cpu percent".to_string()))
    }
}

/// Collects a snapshot of the local host with the default provider.
pub fn read_metrics() -> Snapshot {
    Collector::new(DefaultProvider::new()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostview_util::sysinfo::{CPUDescriptor, DiskStats, HostStats, Interface, MemoryStats};
    use std::path::Path;
    use std::sync::Mutex;

    const GIB: u64 = 1024 * 1024 * 1024;

    #[derive(Default)]
    struct FakeProvider {
        failing: bool,
        percents: Vec<f64>,
        interfaces: Vec<Interface>,
        disk_paths: Mutex<Vec<PathBuf>>,
    }

    impl FakeProvider {
        fn healthy() -> Self {
            Self {
                percents: vec![12.5],
                ..Default::default()
            }
        }

        fn check(&self) -> Result<()> {
            if self.failing {
                return Err(Error::ProviderUnavailable("fake".to_string()));
            }

            Ok(())
        }
    }

    impl Provider for FakeProvider {
        fn disk_usage(&self, path: &Path) -> Result<DiskStats> {
            self.disk_paths.lock().unwrap().push(path.to_path_buf());
            self.check()?;
            Ok(DiskStats {
                total: 10 * GIB,
                free: 4 * GIB,
            })
        }

        fn virtual_memory(&self) -> Result<MemoryStats> {
            self.check()?;
            Ok(MemoryStats {
                total: 8 * GIB,
                free: 4 * GIB,
                cached: GIB,
            })
        }

        fn cpu_info(&self) -> Result<Vec<CPUDescriptor>> {
            self.check()?;
            let descriptor = CPUDescriptor {
                vendor_id: "GenuineIntel".to_string(),
                family: "6".to_string(),
                cores: 4,
                model_name: "Intel(R) Core(TM) i7".to_string(),
                mhz: 2400.0,
            };
            Ok(vec![descriptor.clone(), descriptor])
        }

        fn cpu_percent(&self, interval: Duration, per_cpu: bool) -> Result<Vec<f64>> {
            assert!(interval.is_zero());
            assert!(!per_cpu);
            self.check()?;
            Ok(self.percents.clone())
        }

        fn logical_cpu_count(&self) -> usize {
            8
        }

        fn host_info(&self) -> Result<HostStats> {
            self.check()?;
            Ok(HostStats {
                hostname: "builder".to_string(),
                procs: 321,
                platform: "ubuntu".to_string(),
                platform_version: "22.04".to_string(),
            })
        }

        fn interfaces(&self) -> Result<Vec<Interface>> {
            self.check()?;
            Ok(self.interfaces.clone())
        }
    }

    fn interface(name: &str, hardware_addr: &str, addrs: &[&str]) -> Interface {
        Interface {
            name: name.to_string(),
            hardware_addr: hardware_addr.to_string(),
            addrs: addrs.iter().map(|addr| addr.to_string()).collect(),
        }
    }

    #[test]
    fn collect_all_metrics() {
        let collector = Collector::new(FakeProvider::healthy());
        let mut diagnostics = Vec::new();
        let snapshot = collector.collect_to(&mut diagnostics);

        assert!(diagnostics.is_empty());
        assert_eq!(snapshot.disk_size, 10 * GIB);
        assert_eq!(snapshot.disk_free, 4 * GIB);
        assert_eq!(snapshot.disk_used, 6 * GIB);
        assert_eq!(snapshot.total_memory, 8 * GIB);
        assert_eq!(snapshot.free_memory, 4 * GIB);
        assert_eq!(snapshot.used_memory, 4294967296);
        assert_eq!(snapshot.cache_memory, GIB);
        assert_eq!(snapshot.logical_cpus, 8);
        assert_eq!(snapshot.cpu_percent, 12.5);
        assert_eq!(snapshot.hostname, "builder");
        assert_eq!(snapshot.running_processes, 321);
        assert_eq!(snapshot.platform, "ubuntu");
        assert_eq!(snapshot.platform_version, "22.04");

        assert_eq!(snapshot.cpu_info.len(), 2);
        assert_eq!(snapshot.cpu_info[0].index, 0);
        assert_eq!(snapshot.cpu_info[1].index, 1);
        assert_eq!(snapshot.cpu_info[1].model, "Intel(R) Core(TM) i7");
        assert_eq!(snapshot.cpu_info[1].speed, "2400.00 MHz");
    }

    #[test]
    fn collect_disk_usage_of_configured_path() {
        let collector = Collector::new(FakeProvider::healthy());
        collector.collect_to(&mut Vec::new());
        assert_eq!(
            *collector.provider.disk_paths.lock().unwrap(),
            vec![PathBuf::from("/")]
        );

        let collector = Collector::new(FakeProvider::healthy()).with_disk_path("/data");
        collector.collect_to(&mut Vec::new());
        assert_eq!(
            *collector.provider.disk_paths.lock().unwrap(),
            vec![PathBuf::from("/data")]
        );
    }

    #[test]
    fn last_hardware_address_wins() {
        let provider = FakeProvider {
            interfaces: vec![
                interface("lo0", "", &["127.0.0.1/8"]),
                interface("eth0", "AA:BB", &[]),
                interface("eth1", "CC:DD", &[]),
                interface("tun0", "", &[]),
            ],
            ..FakeProvider::healthy()
        };

        let snapshot = Collector::new(provider).collect_to(&mut Vec::new());
        assert_eq!(snapshot.mac_address, "CC:DD");
    }

    #[test]
    fn interfaces_keep_first_seen_order() {
        let provider = FakeProvider {
            interfaces: vec![
                interface("eth0", "aa:bb:cc:dd:ee:ff", &["192.168.1.10/24"]),
                interface("lo", "", &["127.0.0.1/8", "::1/128"]),
                interface("eth0", "aa:bb:cc:dd:ee:ff", &["fe80::1/64"]),
                interface("docker0", "", &[]),
            ],
            ..FakeProvider::healthy()
        };

        let snapshot = Collector::new(provider).collect_to(&mut Vec::new());
        assert_eq!(
            snapshot.interfaces,
            vec![
                InterfaceAddrs {
                    name: "eth0".to_string(),
                    addresses: vec!["192.168.1.10/24".to_string(), "fe80::1/64".to_string()],
                },
                InterfaceAddrs {
                    name: "lo".to_string(),
                    addresses: vec!["127.0.0.1/8".to_string(), "::1/128".to_string()],
                },
                InterfaceAddrs {
                    name: "docker0".to_string(),
                    addresses: vec![],
                },
            ]
        );
    }

    #[test]
    fn failures_keep_zero_values() {
        let provider = FakeProvider {
            failing: true,
            ..FakeProvider::healthy()
        };

        let mut diagnostics = Vec::new();
        let snapshot = Collector::new(provider).collect_to(&mut diagnostics);
        assert_eq!(
            snapshot,
            Snapshot {
                logical_cpus: 8,
                ..Default::default()
            }
        );
        assert_eq!(
            String::from_utf8(diagnostics).unwrap(),
            "error getting CPU Percent Usage: provider fake is unavailable\n"
        );
    }

    #[test]
    fn empty_cpu_percent_is_reported() {
        let provider = FakeProvider {
            percents: vec![],
            ..FakeProvider::healthy()
        };

        let mut diagnostics = Vec::new();
        let snapshot = Collector::new(provider).collect_to(&mut diagnostics);
        assert_eq!(snapshot.cpu_percent, 0.0);
        assert_eq!(snapshot.hostname, "builder");
        assert_eq!(
            String::from_utf8(diagnostics).unwrap(),
            "error getting CPU Percent Usage: provider cpu percent is unavailable\n"
        );
    }

    #[test]
    fn serialize_snapshot() {
        let snapshot = Snapshot {
            hostname: "builder".to_string(),
            interfaces: vec![InterfaceAddrs {
                name: "eth0".to_string(),
                addresses: vec!["10.0.0.2/8".to_string()],
            }],
            ..Default::default()
        };

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["hostname"], "builder");
        assert_eq!(value["diskUsed"], 0);
        assert_eq!(value["interfaces"][0]["name"], "eth0");
        assert_eq!(value["interfaces"][0]["addresses"][0], "10.0.0.2/8");
    }
}
