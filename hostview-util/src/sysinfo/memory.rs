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
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

/// Memory represents a memory interface for reading virtual memory statistics.
#[derive(Debug, Clone, Default)]
pub struct Memory {}

/// Represents system-wide memory statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Total physical memory in bytes.
    pub total: u64,

    /// Free memory in bytes (does not include cached/buffered memory).
    pub free: u64,

    /// Page cache in bytes.
    pub cached: u64,
}

/// Parses the content of `/proc/meminfo`. Values are reported in kB.
///
/// `MemTotal` and `MemFree` are required, `Cached` defaults to zero.
pub fn parse_meminfo(content: &str) -> Result<MemoryStats> {
    let mut total = None;
    let mut free = None;
    let mut cached = 0;

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        let parse = || -> Result<u64> {
            let kilobytes = value
                .trim()
                .trim_end_matches("kB")
                .trim()
                .parse::<u64>()
                .map_err(|_| Error::InvalidProcFile(format!("/proc/meminfo line {:?}", line)))?;
            Ok(kilobytes * 1024)
        };

        match key {
            "MemTotal" => total = Some(parse()?),
            "MemFree" => free = Some(parse()?),
            "Cached" => cached = parse()?,
            _ => {}
        }
    }

    match (total, free) {
        (Some(total), Some(free)) => Ok(MemoryStats {
            total,
            free,
            cached,
        }),
        _ => Err(Error::InvalidProcFile(
            "/proc/meminfo without MemTotal or MemFree".to_string(),
        )),
    }
}

impl Memory {
    /// Retrieves system-wide memory statistics through sysinfo. sysinfo does
    /// not expose the page cache, it is approximated by the reclaimable
    /// memory on top of the free memory.
    pub fn get_stats(&self) -> Result<MemoryStats> {
        let sys = System::new_with_specifics(
            RefreshKind::new().with_memory(MemoryRefreshKind::new().with_ram()),
        );

        if sys.total_memory() == 0 {
            return Err(Error::ProviderUnavailable("virtual memory".to_string()));
        }

        Ok(MemoryStats {
            total: sys.total_memory(),
            free: sys.free_memory(),
            cached: sys.available_memory().saturating_sub(sys.free_memory()),
        })
    }
}
