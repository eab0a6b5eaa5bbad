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

use std::path::PathBuf;

pub mod hostview;

/// NAME is the name of the package.
pub const NAME: &str = "hostview";

/// CARGO_PKG_VERSION is the version of the cargo package.
pub const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// GIT_COMMIT_SHORT_HASH is the abbreviated git hash the binary was built from.
pub const GIT_COMMIT_SHORT_HASH: Option<&str> = option_env!("GIT_COMMIT_SHORT_HASH");

/// BUILD_PLATFORM is the target triple the binary was built for.
pub const BUILD_PLATFORM: Option<&str> = option_env!("BUILD_PLATFORM");

/// version returns the version string shown by the command line,
/// e.g. `0.1.0 (3f2a1b9c0, x86_64-unknown-linux-gnu)`.
pub fn version() -> String {
    let details: Vec<&str> = [GIT_COMMIT_SHORT_HASH, BUILD_PLATFORM]
        .into_iter()
        .flatten()
        .collect();

    if details.is_empty() {
        return CARGO_PKG_VERSION.to_string();
    }

    format!("{} ({})", CARGO_PKG_VERSION, details.join(", "))
}

/// home_dir returns the home directory of the current user, falling back
/// to the working directory when it can not be resolved.
#[cfg(not(target_os = "linux"))]
fn home_dir() -> PathBuf {
    home::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// default_config_dir is the default config directory for hostview.
pub fn default_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    return PathBuf::from("/etc/hostview/");

    #[cfg(not(target_os = "linux"))]
    return home_dir().join(".hostview").join("config");
}

/// default_log_dir is the default log directory for hostview.
pub fn default_log_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    return PathBuf::from("/var/log/hostview/");

    #[cfg(not(target_os = "linux"))]
    return home_dir().join(".hostview").join("logs");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_starts_with_package_version() {
        assert!(version().starts_with(CARGO_PKG_VERSION));
    }

    #[test]
    fn default_dirs_are_named_after_package() {
        assert!(default_config_dir().to_string_lossy().contains(NAME));
        assert!(default_log_dir().to_string_lossy().contains(NAME));
    }
}
