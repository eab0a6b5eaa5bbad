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

use clap::Parser;
use hostview::collector::Collector;
use hostview::report::Report;
use hostview::tracing::init_tracing;
use hostview_config::hostview::{self as config, Config, OutputFormat, TableStyle};
use hostview_core::{
    error::{ErrorType, OrErr},
    Result,
};
use hostview_util::sysinfo::DefaultProvider;
use std::io;
use std::path::PathBuf;
use tracing::{error, info, Level};
use validator::Validate;

#[derive(Debug, Parser)]
#[command(
    name = hostview_config::NAME,
    author,
    version,
    about = "hostview prints a snapshot of the host's system metrics",
    long_about = "A command line that collects disk, memory, CPU, platform and network metrics of the local host \
    and prints them as tables or JSON."
)]
struct Args {
    #[arg(
        short = 'c',
        long = "config",
        help = "Specify the path of the configuration file, defaults to hostview.yaml in the config directory"
    )]
    config: Option<PathBuf>,

    #[arg(
        long = "style",
        help = "Specify the table style [rounded, modern, ascii, psql, markdown, blank]"
    )]
    style: Option<TableStyle>,

    #[arg(
        long = "format",
        help = "Specify the output format [table, json]"
    )]
    format: Option<OutputFormat>,

    #[arg(
        long = "disk-path",
        help = "Specify the absolute path whose filesystem usage is reported"
    )]
    disk_path: Option<PathBuf>,

    #[arg(
        short = 'l',
        long,
        default_value = "info",
        help = "Specify the logging level [trace, debug, info, warn, error]"
    )]
    log_level: Level,

    #[arg(
        long,
        default_value_os_t = config::default_hostview_log_dir(),
        help = "Specify the log directory"
    )]
    log_dir: PathBuf,

    #[arg(
        long,
        default_value_t = 6,
        help = "Specify the max number of log files"
    )]
    log_max_files: usize,

    #[arg(
        long = "verbose",
        default_value_t = false,
        help = "Specify whether to print log to stderr"
    )]
    verbose: bool,
}

impl Args {
    /// Loads the configuration and applies the command line overrides. An
    /// explicit config path must exist, the default one may be missing.
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load_or_default(&config::default_hostview_config_path())?,
        };

        if let Some(style) = self.style {
            config.report.style = style;
        }

        if let Some(format) = self.format {
            config.report.format = format;
        }

        if let Some(disk_path) = &self.disk_path {
            config.disk.path = disk_path.clone();
        }

        config.validate().or_err(ErrorType::ValidationError)?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments.
    let args = Args::parse();

    // Initialize tracing.
    let _guards = init_tracing(
        hostview_config::NAME,
        &args.log_dir,
        args.log_level,
        args.log_max_files,
        args.verbose,
    );
    info!("hostview version {}", hostview_config::version());

    // Load config.
    let config = args
        .load_config()
        .inspect_err(|err| error!("load config failed: {}", err))?;
    info!("load config: {:?}", config);

    // Collect the snapshot.
    let collector = Collector::new(DefaultProvider::new()).with_disk_path(&config.disk.path);
    let snapshot = collector.collect();

    // Write the report.
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    Report::from(&config.report)
        .render(&snapshot, &mut handle)
        .inspect_err(|err| error!("write report failed: {}", err))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    #[test]
    fn parse_args_with_defaults() {
        let args = Args::try_parse_from(["hostview"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.style.is_none());
        assert!(args.format.is_none());
        assert_eq!(args.log_level, Level::INFO);
        assert_eq!(args.log_max_files, 6);
        assert!(!args.verbose);
    }

    #[test]
    fn parse_args_with_overrides() {
        let args = Args::try_parse_from([
            "hostview",
            "--style",
            "ASCII",
            "--format",
            "json",
            "--disk-path",
            "/data",
            "-l",
            "debug",
            "--verbose",
        ])
        .unwrap();
        assert_eq!(args.style, Some(TableStyle::Ascii));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.disk_path, Some(PathBuf::from("/data")));
        assert_eq!(args.log_level, Level::DEBUG);
        assert!(args.verbose);
    }

    #[test]
    fn parse_args_with_unknown_style() {
        assert!(Args::try_parse_from(["hostview", "--style", "fancy"]).is_err());
    }

    #[test]
    fn load_config_with_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "disk:\n  path: /var\nreport:\n  style: psql").unwrap();
        let path = file.path().to_str().unwrap();

        let args = Args::try_parse_from(["hostview", "--config", path]).unwrap();
        let config = args.load_config().unwrap();
        assert_eq!(config.disk.path, Path::new("/var"));
        assert_eq!(config.report.style, TableStyle::Psql);
        assert_eq!(config.report.format, OutputFormat::Table);

        let args = Args::try_parse_from([
            "hostview",
            "--config",
            path,
            "--style",
            "markdown",
            "--disk-path",
            "/home",
        ])
        .unwrap();
        let config = args.load_config().unwrap();
        assert_eq!(config.disk.path, Path::new("/home"));
        assert_eq!(config.report.style, TableStyle::Markdown);
    }

    #[test]
    fn load_config_with_invalid_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "report:\n  format: json").unwrap();
        let path = file.path().to_str().unwrap();

        let args =
            Args::try_parse_from(["hostview", "--config", path, "--disk-path", "relative"]).unwrap();
        assert!(args.load_config().is_err());
    }

    #[test]
    fn load_config_from_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hostview.yaml");

        let args = Args::try_parse_from(["hostview", "--config", path.to_str().unwrap()]).unwrap();
        assert!(args.load_config().is_err());
    }
}
