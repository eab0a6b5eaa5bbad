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

/// Disk represents a disk interface for reading filesystem statistics.
#[derive(Debug, Clone, Default)]
pub struct Disk {}

/// DiskStats represents the filesystem statistics for a specific path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskStats {
    /// The total disk space in bytes.
    pub total: u64,

    /// The free disk space in bytes, including the blocks reserved for the
    /// superuser.
    pub free: u64,
}

impl Disk {
    /// Retrieves the statistics of the filesystem containing `path`.
    pub fn get_stats(&self, path: &Path) -> Result<DiskStats> {
        let stats = fs2::statvfs(path)?;

        Ok(DiskStats {
            total: stats.total_space(),
            free: stats.free_space(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_stats_of_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let stats = Disk::default().get_stats(dir.path()).unwrap();
        assert!(stats.total > 0);
        assert!(stats.free <= stats.total);
    }

    #[test]
    fn get_stats_of_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(Disk::default().get_stats(&missing).is_err());
    }
}
