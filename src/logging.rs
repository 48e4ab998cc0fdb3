//! Tracing configuration and log routing.
//!
//! Events are written to stdout and mirrored to a log file (`DOCQA_LOG_FILE`, or
//! `logs/docqa.log` when unset). The file is written through a non-blocking worker.
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_ENV: &str = "DOCQA_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "logs/docqa.log";
const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. If the log file cannot be opened, a warning is
/// printed and only the stdout layer is installed.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stdout_layer = fmt::layer().with_target(false).compact();
    let file_layer = file_writer().map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

fn file_writer() -> Option<NonBlocking> {
    let path = log_file_path(std::env::var_os(LOG_FILE_ENV).map(PathBuf::from));
    match open_append(&path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(writer)
        }
        Err(err) => {
            eprintln!("docqa: file logging disabled, cannot open {}: {err}", path.display());
            None
        }
    }
}

fn log_file_path(configured: Option<PathBuf>) -> PathBuf {
    configured
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
