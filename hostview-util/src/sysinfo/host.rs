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
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

/// Host reads the identity of the local host.
#[derive(Debug, Clone, Default)]
pub struct Host {}

/// HostStats is the identity of the host and its process count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostStats {
    pub hostname: String,

    /// Number of processes currently known to the kernel.
    pub procs: u64,

    /// Platform name, the distribution id on Linux (e.g. `ubuntu`).
    pub platform: String,

    pub platform_version: String,
}

impl Host {
    /// Retrieves the host identity. Fails only when the hostname can not
    /// be resolved, the other fields fall back to empty values.
    pub fn get_stats(&self) -> Result<HostStats> {
        let hostname =
            System::host_name().ok_or_else(|| Error::ProviderUnavailable("host name".to_string()))?;

        let mut sys = System::new();
        sys.refresh_processes_specifics(ProcessesToUpdate::All, true, ProcessRefreshKind::new());

        Ok(HostStats {
            hostname,
            procs: sys.processes().len() as u64,
            platform: System::distribution_id(),
            platform_version: System::os_version().unwrap_or_default(),
        })
    }
}
