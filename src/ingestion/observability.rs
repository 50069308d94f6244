//! Load outcome reporting.
//!
//! [`super::load_from_path`] reports every attempt to an optional [`LoadObserver`]: one
//! `on_success` with [`LoadStats`], or one `on_failure` (plus `on_alert` when the
//! [`LoadSeverity`] reaches the configured threshold).

use std::fmt::{self, Display};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{error, info, warn};

use crate::error::LoadError;

use super::unified::InputFormat;

/// How bad a load outcome is. Ordered, so it can be compared against an alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    Info,
    Warning,
    /// The file was read but could not be turned into a series (schema, empty result, parse).
    Error,
    /// The file could not be read at all (missing, permissions, truncated I/O).
    Critical,
}

/// Which file was loaded, and how.
#[derive(Debug, Clone)]
pub struct LoadContext {
    pub path: PathBuf,
    pub format: InputFormat,
}

/// Counters reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Raw data rows read from the input.
    pub rows: usize,
    /// Observations that survived normalization.
    pub observations: usize,
    /// Distinct regions.
    pub regions: usize,
    /// Candidates discarded for a blank region, bad date or bad value.
    pub dropped: usize,
    /// Repeated (region, date) pairs seen.
    pub duplicates: usize,
}

/// Receives load outcomes. All methods default to no-ops.
pub trait LoadObserver: Send + Sync {
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &LoadError) {}

    /// Called after `on_failure` when `severity` meets the alert threshold. Forwards to
    /// [`Self::on_failure`] unless overridden.
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Forwards every callback to each inner observer, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }

    pub fn with(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.observers.iter().for_each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.observers
            .iter()
            .for_each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.observers
            .iter()
            .for_each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Emits load outcomes as `tracing` events: `info` on success, `warn` on failure, `error` on
/// alert.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        info!(
            format = ?ctx.format,
            path = %ctx.path.display(),
            rows = stats.rows,
            observations = stats.observations,
            regions = stats.regions,
            dropped = stats.dropped,
            duplicates = stats.duplicates,
            "series loaded"
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        warn!(
            ?severity,
            format = ?ctx.format,
            path = %ctx.path.display(),
            user_message = error.user_message(),
            %error,
            "series load failed"
        );
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        error!(
            ?severity,
            format = ?ctx.format,
            path = %ctx.path.display(),
            %error,
            "series load alert"
        );
    }
}

/// Appends one line per load outcome to a local file.
///
/// Line shape: `<unix secs> <ok|fail|ALERT> format=<fmt> path=<path> <details>`. Writing is
/// best-effort; I/O errors on the log file are ignored.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(&self, tag: &str, ctx: &LoadContext, details: impl Display) {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let line = format!(
            "{secs} {tag} format={:?} path={} {details}",
            ctx.format,
            ctx.path.display()
        );

        let _guard = self.write_lock.lock().ok();
        let file = OpenOptions::new().create(true).append(true).open(&self.path);
        if let Ok(mut file) = file {
            let _ = writeln!(file, "{line}");
        }
    }
}

impl LoadObserver for FileObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.record(
            "ok",
            ctx,
            format_args!(
                "rows={} observations={} regions={} dropped={} duplicates={}",
                stats.rows, stats.observations, stats.regions, stats.dropped, stats.duplicates
            ),
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.record("fail", ctx, format_args!("severity={severity:?} err={error}"));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.record("ALERT", ctx, format_args!("severity={severity:?} err={error}"));
    }
}
