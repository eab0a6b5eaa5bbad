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

use hostview_core::{
    error::{ErrorType, OrErr},
    Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, instrument};
use validator::{Validate, ValidationError};

/// Returns the default config path for hostview.
#[inline]
pub fn default_hostview_config_path() -> PathBuf {
    crate::default_config_dir().join("hostview.yaml")
}

/// Returns the default log directory for hostview.
#[inline]
pub fn default_hostview_log_dir() -> PathBuf {
    crate::default_log_dir()
}

/// Returns the default path whose filesystem is reported as disk usage.
#[inline]
fn default_disk_path() -> PathBuf {
    PathBuf::from("/")
}

/// Checks that the disk path is absolute, relative paths would depend on
/// the working directory of the caller.
fn validate_disk_path(path: &Path) -> std::result::Result<(), ValidationError> {
    if !path.is_absolute() {
        return Err(ValidationError::new("disk path must be absolute"));
    }

    Ok(())
}

/// TableStyle is the visual style of the rendered tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStyle {
    /// Rounded corners drawn with box characters.
    #[default]
    Rounded,

    /// Box characters with square corners and row separators.
    Modern,

    /// Plain ASCII borders.
    Ascii,

    /// PostgreSQL client style.
    Psql,

    /// GitHub flavored markdown.
    Markdown,

    /// No borders at all.
    Blank,
}

impl TableStyle {
    /// All styles in the order they are listed in help messages.
    pub const ALL: [TableStyle; 6] = [
        TableStyle::Rounded,
        TableStyle::Modern,
        TableStyle::Ascii,
        TableStyle::Psql,
        TableStyle::Markdown,
        TableStyle::Blank,
    ];

    /// Returns the lowercase name of the style.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStyle::Rounded => "rounded",
            TableStyle::Modern => "modern",
            TableStyle::Ascii => "ascii",
            TableStyle::Psql => "psql",
            TableStyle::Markdown => "markdown",
            TableStyle::Blank => "blank",
        }
    }
}

impl fmt::Display for TableStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TableStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let style = s.trim().to_ascii_lowercase();
        TableStyle::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == style)
            .ok_or_else(|| {
                let names: Vec<&str> = TableStyle::ALL.iter().map(|s| s.as_str()).collect();
                format!("unknown table style {}, expected one of {}", s, names.join(", "))
            })
    }
}

/// OutputFormat is the format of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human readable tables.
    #[default]
    Table,

    /// The raw snapshot as pretty printed JSON.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown output format {}, expected table or json", s)),
        }
    }
}

/// Disk is the disk usage configuration.
#[derive(Debug, Clone, Validate, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Disk {
    /// Path is a path on the filesystem whose usage is reported.
    #[serde(default = "default_disk_path")]
    #[validate(custom = "validate_disk_path")]
    pub path: PathBuf,
}

/// Disk implements Default.
impl Default for Disk {
    fn default() -> Self {
        Disk {
            path: default_disk_path(),
        }
    }
}

/// Report is the report rendering configuration.
#[derive(Debug, Clone, Default, Validate, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Report {
    /// Style is the visual style of the tables.
    pub style: TableStyle,

    /// Format is the output format of the report.
    pub format: OutputFormat,
}

/// Config is the configuration for hostview.
#[derive(Debug, Clone, Default, Validate, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Disk is the disk usage configuration.
    #[validate]
    pub disk: Disk,

    /// Report is the report rendering configuration.
    #[validate]
    pub report: Report,
}

impl Config {
    /// Load the configuration from file.
    #[instrument(skip_all)]
    pub fn load(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content).or_err(ErrorType::ConfigError)?;

        config.validate().or_err(ErrorType::ValidationError)?;
        Ok(config)
    }

    /// Load the configuration from file if it exists, otherwise fall back to
    /// the defaults. Only used for the implicit default config path, an
    /// explicitly given path must exist.
    #[instrument(skip_all)]
    pub fn load_or_default(path: &Path) -> Result<Config> {
        if !path.exists() {
            info!(
                "config file {} not found, using defaults",
                path.display()
            );
            return Ok(Config::default());
        }

        Self::load(path)
    }
}
