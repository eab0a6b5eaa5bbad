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
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sysinfo::{CpuRefreshKind, RefreshKind, System, MINIMUM_CPU_UPDATE_INTERVAL};

/// CPUDescriptor describes one processor as reported by the operating system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CPUDescriptor {
    /// Vendor identifier, e.g. `GenuineIntel`.
    pub vendor_id: String,

    /// CPU family identifier, empty when the platform does not expose it.
    pub family: String,

    /// Number of cores of the physical package.
    pub cores: u32,

    /// Marketing name of the processor.
    pub model_name: String,

    /// Clock speed in MHz.
    pub mhz: f64,
}

/// CPUTimes is a sample of the cumulative time a CPU spent busy and in total,
/// in clock ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CPUTimes {
    /// Ticks spent doing work (everything except idle and iowait).
    pub busy: u64,

    /// Ticks elapsed in all states.
    pub total: u64,
}

/// ProcStat is a parsed sample of `/proc/stat`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcStat {
    /// Aggregate times of all CPUs.
    pub aggregate: CPUTimes,

    /// Per CPU times, ordered by CPU number.
    pub cpus: Vec<CPUTimes>,
}

/// Returns the number of logical CPUs, hyperthreads included.
pub fn logical_count() -> usize {
    num_cpus::get()
}

/// Returns the usage percentage between two samples, clamped to 0.0 - 100.0.
///
/// A zero previous sample yields the usage since boot.
pub fn used_percent(previous: CPUTimes, current: CPUTimes) -> f64 {
    let total = current.total.saturating_sub(previous.total);
    if total == 0 {
        return 0.0;
    }

    let busy = current.busy.saturating_sub(previous.busy);
    ((busy as f64 / total as f64) * 100.0).clamp(0.0, 100.0)
}

/// Parses the content of `/proc/cpuinfo` into one descriptor per processor
/// block. Blocks without a `processor` line (e.g. the trailing hardware
/// summary on ARM) are skipped.
pub fn parse_cpuinfo(content: &str) -> Vec<CPUDescriptor> {
    let mut descriptors = Vec::new();

    for block in content.split("\n\n") {
        let mut is_processor = false;
        let mut descriptor = CPUDescriptor::default();

        for line in block.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };

            let value = value.trim();
            match key.trim() {
                "processor" => is_processor = true,
                "vendor_id" | "CPU implementer" if descriptor.vendor_id.is_empty() => {
                    descriptor.vendor_id = value.to_string()
                }
                "cpu family" | "CPU architecture" if descriptor.family.is_empty() => {
                    descriptor.family = value.to_string()
                }
                "cpu cores" => descriptor.cores = value.parse().unwrap_or_default(),
                "model name" => descriptor.model_name = value.to_string(),
                "cpu MHz" => descriptor.mhz = value.parse().unwrap_or_default(),
                _ => {}
            }
        }

        if is_processor {
            // Kernels without "cpu cores" report one core per processor.
            if descriptor.cores == 0 {
                descriptor.cores = 1;
            }

            descriptors.push(descriptor);
        }
    }

    descriptors
}

/// Parses the content of `/proc/stat`.
///
/// The cpu lines look like:
/// ```text
/// cpu  4705 356 584 3699 23 23 0 0 0 0
/// cpu0 1393 280 290 1803 12 12 0 0 0 0
/// ```
/// with the columns user, nice, system, idle, iowait, irq, softirq, steal,
/// guest and guest_nice. Guest time is already accounted in user and nice,
/// so it is not added to the total.
pub fn parse_proc_stat(content: &str) -> Result<ProcStat> {
    let mut aggregate = None;
    let mut cpus = Vec::new();

    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let Some(name) = fields.next() else {
            continue;
        };

        if !name.starts_with("cpu") {
            continue;
        }

        let values = fields
            .take(8)
            .map(|field| field.parse::<u64>())
            .collect::<std::result::Result<Vec<u64>, _>>()
            .map_err(|_| Error::InvalidProcFile(format!("/proc/stat line {:?}", line)))?;

        if values.len() < 4 {
            return Err(Error::InvalidProcFile(format!(
                "/proc/stat line {:?}",
                line
            )));
        }

        let total: u64 = values.iter().sum();
        let idle = values[3] + values.get(4).copied().unwrap_or_default();
        let times = CPUTimes {
            busy: total.saturating_sub(idle),
            total,
        };

        if name == "cpu" {
            aggregate = Some(times);
        } else {
            cpus.push(times);
        }
    }

    let aggregate =
        aggregate.ok_or_else(|| Error::InvalidProcFile("/proc/stat without cpu line".to_string()))?;

    Ok(ProcStat { aggregate, cpus })
}

/// CPU reports processor information and utilization through sysinfo.
#[derive(Debug, Clone)]
pub struct CPU {
    /// System keeps the previous usage sample between calls.
    system: Arc<Mutex<System>>,
}

/// CPU implements Default.
impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}

impl CPU {
    /// Creates a new CPU instance and takes the first usage sample.
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::new().with_cpu(CpuRefreshKind::new().with_cpu_usage()),
        );

        Self {
            system: Arc::new(Mutex::new(system)),
        }
    }

    /// Returns the processor descriptors. sysinfo lists logical CPUs that
    /// share the same identity, so the package is described once.
    pub fn get_descriptors(&self) -> Result<Vec<CPUDescriptor>> {
        let mut system = self.system.lock().unwrap_or_else(|err| err.into_inner());
        system.refresh_cpu_specifics(CpuRefreshKind::new().with_frequency());

        let Some(cpu) = system.cpus().first() else {
            return Err(Error::ProviderUnavailable("cpu info".to_string()));
        };

        Ok(vec![CPUDescriptor {
            vendor_id: cpu.vendor_id().to_string(),
            family: String::new(),
            cores: system.physical_core_count().unwrap_or_default() as u32,
            model_name: cpu.brand().trim().to_string(),
            mhz: cpu.frequency() as f64,
        }])
    }

    /// Returns the usage percentage of all CPUs, or of each CPU when
    /// `per_cpu` is set.
    ///
    /// A zero interval compares against the previous call, a non-zero
    /// interval blocks between two fresh samples.
    pub fn get_used_percent(&self, interval: Duration, per_cpu: bool) -> Result<Vec<f64>> {
        let mut system = self.system.lock().unwrap_or_else(|err| err.into_inner());

        if !interval.is_zero() {
            system.refresh_cpu_usage();
            std::thread::sleep(interval.max(MINIMUM_CPU_UPDATE_INTERVAL));
        }

        system.refresh_cpu_usage();
        if system.cpus().is_empty() {
            return Err(Error::ProviderUnavailable("cpu usage".to_string()));
        }

        if per_cpu {
            return Ok(system
                .cpus()
                .iter()
                .map(|cpu| cpu.cpu_usage() as f64)
                .collect());
        }

        Ok(vec![system.global_cpu_usage() as f64])
    }
}
