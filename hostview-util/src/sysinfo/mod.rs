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
use std::path::Path;
use std::time::Duration;

pub mod cpu;
pub mod disk;
pub mod host;
pub mod memory;
pub mod network;

#[cfg(target_os = "linux")]
pub mod linux;

pub use cpu::CPUDescriptor;
pub use disk::DiskStats;
pub use host::HostStats;
pub use memory::MemoryStats;
pub use network::Interface;

/// DefaultProvider is the provider variant for the build target.
#[cfg(target_os = "linux")]
pub type DefaultProvider = linux::LinuxProvider;

/// DefaultProvider is the provider variant for the build target.
#[cfg(not(target_os = "linux"))]
pub type DefaultProvider = SysinfoProvider;

/// Provider is the capability to query the metrics of the local host.
///
/// Every query fails independently, callers decide whether an error is
/// fatal. Implementations exist per operating system, tests substitute
/// their own.
pub trait Provider {
    /// Returns the usage of the filesystem containing `path`.
    fn disk_usage(&self, path: &Path) -> Result<DiskStats>;

    /// Returns the virtual memory statistics.
    fn virtual_memory(&self) -> Result<MemoryStats>;

    /// Returns the processor descriptors.
    fn cpu_info(&self) -> Result<Vec<CPUDescriptor>>;

    /// Returns the CPU usage percentage, one value for all CPUs or one per
    /// CPU when `per_cpu` is set.
    ///
    /// A zero interval returns the usage since the previous call, or since
    /// boot for the first call where the platform allows it. A non-zero
    /// interval blocks for that long between two samples.
    fn cpu_percent(&self, interval: Duration, per_cpu: bool) -> Result<Vec<f64>>;

    /// Returns the number of logical CPUs.
    fn logical_cpu_count(&self) -> usize;

    /// Returns the identity of the host.
    fn host_info(&self) -> Result<HostStats>;

    /// Returns the network interfaces in enumeration order.
    fn interfaces(&self) -> Result<Vec<Interface>>;
}

/// SysinfoProvider is the portable provider backed by sysinfo, fs2 and pnet.
///
/// It aggregates the resource readers for CPU, memory, disk, host and
/// network.
#[derive(Debug, Clone, Default)]
pub struct SysinfoProvider {
    /// CPU reader, keeps the previous usage sample.
    pub cpu: cpu::CPU,

    /// Memory reader.
    pub memory: memory::Memory,

    /// Disk reader.
    pub disk: disk::Disk,

    /// Host identity reader.
    pub host: host::Host,

    /// Network interface reader.
    pub network: network::Network,
}

impl SysinfoProvider {
    /// Constructs a new portable provider.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Provider for SysinfoProvider {
    fn disk_usage(&self, path: &Path) -> Result<DiskStats> {
        self.disk.get_stats(path)
    }

    fn virtual_memory(&self) -> Result<MemoryStats> {
        self.memory.get_stats()
    }

    fn cpu_info(&self) -> Result<Vec<CPUDescriptor>> {
        self.cpu.get_descriptors()
    }

    fn cpu_percent(&self, interval: Duration, per_cpu: bool) -> Result<Vec<f64>> {
        self.cpu.get_used_percent(interval, per_cpu)
    }

    fn logical_cpu_count(&self) -> usize {
        cpu::logical_count()
    }

    fn host_info(&self) -> Result<HostStats> {
        self.host.get_stats()
    }

    fn interfaces(&self) -> Result<Vec<Interface>> {
        self.network.get_interfaces()
    }
}
