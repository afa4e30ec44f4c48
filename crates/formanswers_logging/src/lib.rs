//! Logging setup for Form Answers binaries.
//!
//! Two sinks: a size-rotated log file under `<home>/logs/` that always receives
//! the full filter, and stderr, which only shows warnings unless verbose.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Overrides the home directory.
pub const HOME_ENV: &str = "FORMANSWERS_HOME";

const HOME_DIR_NAME: &str = ".formanswers";
const DEFAULT_LOG_FILTER: &str = "formanswers=info,formanswers_db=info,formanswers_sinks=info";
const QUIET_CONSOLE_FILTER: &str = "warn";
const MAX_LOG_FILES: usize = 5;
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = ensure_logs_dir()?;
    let file_writer = SharedRollingWriter::new(&log_dir, config.app_name)?;

    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    } else {
        EnvFilter::new(QUIET_CONSOLE_FILTER)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter),
        )
        .try_init()
        .map_err(|err| anyhow!("Failed to install tracing subscriber: {err}"))?;

    tracing::debug!(dir = %log_dir.display(), app = config.app_name, "Logging initialized");
    Ok(())
}

/// Home directory: `$FORMANSWERS_HOME`, else `~/.formanswers`.
pub fn formanswers_home() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(HOME_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(HOME_DIR_NAME))
        .ok_or_else(|| anyhow!("Could not determine home directory; set {HOME_ENV}"))
}

pub fn logs_dir() -> Result<PathBuf> {
    Ok(formanswers_home()?.join("logs"))
}

pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir()?;
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

/// Appends to `<name>.log`, shifting full files to `<name>.log.1 .. .N`.
struct RollingFile {
    dir: PathBuf,
    stem: String,
    keep: usize,
    max_size: u64,
    file: Option<File>,
    written: u64,
}

impl RollingFile {
    fn open(dir: &Path, app_name: &str, keep: usize, max_size: u64) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let mut rolling = Self {
            dir: dir.to_path_buf(),
            stem: log_stem(app_name),
            keep: keep.max(1),
            max_size,
            file: None,
            written: 0,
        };
        rolling.reopen()?;
        if rolling.written > rolling.max_size {
            rolling.roll()?;
        }
        Ok(rolling)
    }

    fn active_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.stem))
    }

    fn archived_path(&self, generation: usize) -> PathBuf {
        self.dir.join(format!("{}.log.{}", self.stem, generation))
    }

    fn reopen(&mut self) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.active_path())?;
        self.written = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn roll(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }

        let oldest = self.keep - 1;
        if oldest > 0 {
            let dropped = self.archived_path(oldest);
            if dropped.exists() {
                fs::remove_file(&dropped)?;
            }
            for generation in (1..oldest).rev() {
                let from = self.archived_path(generation);
                if from.exists() {
                    fs::rename(&from, self.archived_path(generation + 1))?;
                }
            }
            let active = self.active_path();
            if active.exists() {
                fs::rename(active, self.archived_path(1))?;
            }
        } else {
            // Single-file mode: start over
            fs::write(self.active_path(), b"")?;
        }

        self.reopen()
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_size {
            self.roll()?;
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file closed"))?;
        let n = file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

#[derive(Clone)]
struct SharedRollingWriter {
    inner: Arc<Mutex<RollingFile>>,
}

impl SharedRollingWriter {
    fn new(dir: &Path, app_name: &str) -> Result<Self> {
        let file = RollingFile::open(dir, app_name, MAX_LOG_FILES, MAX_LOG_FILE_SIZE)
            .with_context(|| format!("Failed to open log file for {}", app_name))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(file)),
        })
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedRollingWriter {
    type Writer = SharedRollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for SharedRollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?
            .flush()
    }
}

fn log_stem(app_name: &str) -> String {
    let stem: String = app_name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect();
    if stem.is_empty() {
        "formanswers".to_string()
    } else {
        stem
    }
}
