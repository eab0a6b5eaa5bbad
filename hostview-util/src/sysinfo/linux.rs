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

use super::{
    cpu::{self, ProcStat},
    disk, host, memory, network, CPUDescriptor, DiskStats, HostStats, Interface, MemoryStats,
    Provider,
};
use hostview_core::{
    error::{ErrorType, OrErr},
    Error, Result,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// DEFAULT_PROC_DIR is the mount point of procfs.
const DEFAULT_PROC_DIR: &str = "/proc";

/// LinuxProvider reads CPU and memory metrics from procfs, which exposes
/// the CPU family, the page cache and the usage since boot that sysinfo
/// does not. Disk, host and network share the portable readers.
#[derive(Debug)]
pub struct LinuxProvider {
    /// Directory procfs is mounted on.
    proc_dir: PathBuf,

    /// Last `/proc/stat` sample, the baseline of zero interval usage queries.
    last_stat: Mutex<Option<ProcStat>>,

    disk: disk::Disk,

    host: host::Host,

    network: network::Network,
}

/// LinuxProvider implements Default.
impl Default for LinuxProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LinuxProvider {
    /// Creates a provider reading from `/proc`.
    pub fn new() -> Self {
        Self::with_proc_dir(DEFAULT_PROC_DIR)
    }

    /// Creates a provider reading procfs files from `proc_dir`.
    pub fn with_proc_dir(proc_dir: impl Into<PathBuf>) -> Self {
        Self {
            proc_dir: proc_dir.into(),
            last_stat: Mutex::new(None),
            disk: disk::Disk::default(),
            host: host::Host::default(),
            network: network::Network::default(),
        }
    }

    /// Reads a file below the procfs directory.
    fn read(&self, name: &str) -> Result<String> {
        let path = self.proc_dir.join(name);
        let content = fs::read_to_string(&path)
            .or_context(ErrorType::ProviderError, format!("read {}", path.display()))?;
        Ok(content)
    }

    /// Reads and parses `/proc/stat`.
    fn read_proc_stat(&self) -> Result<ProcStat> {
        cpu::parse_proc_stat(&self.read("stat")?)
    }
}

impl Provider for LinuxProvider {
    fn disk_usage(&self, path: &Path) -> Result<DiskStats> {
        self.disk.get_stats(path)
    }

    fn virtual_memory(&self) -> Result<MemoryStats> {
        memory::parse_meminfo(&self.read("meminfo")?)
    }

    fn cpu_info(&self) -> Result<Vec<CPUDescriptor>> {
        let descriptors = cpu::parse_cpuinfo(&self.read("cpuinfo")?);
        if descriptors.is_empty() {
            return Err(Error::ProviderUnavailable("cpu info".to_string()));
        }

        Ok(descriptors)
    }

    fn cpu_percent(&self, interval: Duration, per_cpu: bool) -> Result<Vec<f64>> {
        let mut last_stat = self.last_stat.lock().unwrap_or_else(|err| err.into_inner());

        let previous = if interval.is_zero() {
            // Without a previous sample the baseline is boot time.
            last_stat.clone().unwrap_or_default()
        } else {
            let previous = self.read_proc_stat()?;
            thread::sleep(interval);
            previous
        };

        let current = self.read_proc_stat()?;
        debug!(
            "cpu times previous {:?}, current {:?}",
            previous.aggregate, current.aggregate
        );

        let percents = if per_cpu {
            current
                .cpus
                .iter()
                .enumerate()
                .map(|(index, times)| {
                    cpu::used_percent(previous.cpus.get(index).copied().unwrap_or_default(), *times)
                })
                .collect()
        } else {
            vec![cpu::used_percent(previous.aggregate, current.aggregate)]
        };

        *last_stat = Some(current);
        Ok(percents)
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
