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

use rolling_file::*;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_log::LogTracer;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{time::ChronoLocal, Layer},
    prelude::*,
    EnvFilter, Registry,
};

/// Initializes the global subscriber with an stderr layer, enabled by
/// `verbose`, and an hourly rolling file layer in `log_dir`. The returned
/// guards flush the writers when dropped and must live until exit.
pub fn init_tracing(
    name: &str,
    log_dir: &Path,
    log_level: Level,
    log_max_files: usize,
    verbose: bool,
) -> Vec<WorkerGuard> {
    let mut guards = vec![];

    // Setup stderr layer, stdout carries the report.
    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(io::stderr());

    // Initialize stderr layer.
    let stderr_filter = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    };
    let stderr_logging_layer = Layer::new()
        .with_writer(stderr_writer)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_timer(ChronoLocal::rfc_3339())
        .pretty()
        .with_filter(stderr_filter);
    guards.push(stderr_guard);

    // Setup file layer, skipped when the log directory is not writable.
    let (file_logging_layer, file_err) = match rolling_appender(name, log_dir, log_max_files) {
        Ok(rolling_appender) => {
            let (rolling_writer, rolling_writer_guard) =
                tracing_appender::non_blocking(rolling_appender);
            guards.push(rolling_writer_guard);

            let layer = Layer::new()
                .with_writer(rolling_writer)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_thread_names(false)
                .with_thread_ids(false)
                .with_timer(ChronoLocal::rfc_3339())
                .compact();
            (Some(layer), None)
        }
        Err(err) => (None, Some(err)),
    };

    // Setup env filter for log level.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(log_level.into()));

    let subscriber = Registry::default()
        .with(env_filter)
        .with(file_logging_layer)
        .with(stderr_logging_layer);

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set global subscriber: {}", err);
        return guards;
    }

    if let Err(err) = LogTracer::init() {
        debug!("failed to init LogTracer: {}", err);
    }

    match file_err {
        Some(err) => warn!(
            "file logging disabled, can not use log directory {}: {}",
            log_dir.display(),
            err
        ),
        None => info!(
            "tracing initialized directory: {}, level: {}",
            log_dir.display(),
            log_level
        ),
    }

    guards
}

/// Creates the log directory and an hourly rolling appender writing
/// `<name>.log` in it.
fn rolling_appender(
    name: &str,
    log_dir: &Path,
    log_max_files: usize,
) -> io::Result<BasicRollingFileAppender> {
    fs::create_dir_all(log_dir)?;
    BasicRollingFileAppender::new(
        log_dir.join(name).with_extension("log"),
        RollingConditionBasic::new().hourly(),
        log_max_files,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn create_rolling_appender() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        let mut appender = rolling_appender("hostview", &log_dir, 6).unwrap();
        appender.write_all(b"hello\n").unwrap();
        appender.flush().unwrap();

        assert!(log_dir.join("hostview.log").exists());
    }

    #[test]
    fn create_rolling_appender_below_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(rolling_appender("hostview", &file.path().join("logs"), 6).is_err());
    }
}
