// src/progress.rs

//! Progress reporting for transfer runs
//!
//! The orchestrator reports each resource it works on through
//! [`ProgressTracker`]. Implementations:
//! - `CliProgress`: an indicatif bar on stderr
//! - `LogProgress`: tracing lines, for non-interactive use
//! - `CallbackProgress`: forwards [`ProgressEvent`]s to a closure
//! - `SilentProgress`: no output
//!
//! While a `CliProgress` bar is on screen, log output has to go through
//! [`CliProgress::log_writer`] or it is drawn over by the bar.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Receives per-resource progress from a transfer run
pub trait ProgressTracker {
    /// Number of resources the run will process
    fn set_length(&self, length: u64);

    /// Announce the resource being worked on
    fn set_message(&self, message: &str);

    /// Mark `amount` more resources as processed
    fn increment(&self, amount: u64);

    /// Close out the run with a summary line
    fn finish_with_message(&self, message: &str);
}

/// Discards all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl SilentProgress {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressTracker for SilentProgress {
    fn set_length(&self, _length: u64) {}

    fn set_message(&self, _message: &str) {}

    fn increment(&self, _amount: u64) {}

    fn finish_with_message(&self, _message: &str) {}
}

/// Emits one info line per resource
#[derive(Debug)]
pub struct LogProgress {
    name: String,
    position: AtomicU64,
    length: AtomicU64,
}

impl LogProgress {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: AtomicU64::new(0),
            length: AtomicU64::new(0),
        }
    }
}

impl ProgressTracker for LogProgress {
    fn set_length(&self, length: u64) {
        self.length.store(length, Ordering::Relaxed);
    }

    fn set_message(&self, message: &str) {
        info!(
            "{} [{}/{}]: {}",
            self.name,
            self.position.load(Ordering::Relaxed) + 1,
            self.length.load(Ordering::Relaxed),
            message
        );
    }

    fn increment(&self, amount: u64) {
        self.position.fetch_add(amount, Ordering::Relaxed);
    }

    fn finish_with_message(&self, message: &str) {
        info!("{}: {}", self.name, message);
    }
}

/// Events emitted by [`CallbackProgress`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Work started on a resource
    Message(String),
    /// Position changed
    Position { current: u64, total: u64 },
    /// Run finished
    Finished(String),
}

/// Forwards every update to a closure
pub struct CallbackProgress<F: Fn(ProgressEvent)> {
    callback: F,
    position: AtomicU64,
    length: AtomicU64,
}

impl<F: Fn(ProgressEvent)> CallbackProgress<F> {
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            position: AtomicU64::new(0),
            length: AtomicU64::new(0),
        }
    }
}

impl<F: Fn(ProgressEvent)> ProgressTracker for CallbackProgress<F> {
    fn set_length(&self, length: u64) {
        self.length.store(length, Ordering::Relaxed);
    }

    fn set_message(&self, message: &str) {
        (self.callback)(ProgressEvent::Message(message.to_string()));
    }

    fn increment(&self, amount: u64) {
        let current = self.position.fetch_add(amount, Ordering::Relaxed) + amount;
        (self.callback)(ProgressEvent::Position {
            current,
            total: self.length.load(Ordering::Relaxed),
        });
    }

    fn finish_with_message(&self, message: &str) {
        (self.callback)(ProgressEvent::Finished(message.to_string()));
    }
}

/// Terminal progress bar.
///
/// The bar stays hidden until the run announces its length, so nothing is
/// drawn for dry runs or runs that fail during setup.
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    pub fn new(operation: &str) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden());
        let style = ProgressStyle::default_bar()
            .template("{msg} ({pos}/{len}) [{bar:40.green/dim}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        bar.set_style(style);
        bar.set_prefix(operation.to_string());
        bar.set_message(operation.to_string());
        Self { bar }
    }

    /// Writer for log output that clears the bar while a line is printed
    pub fn log_writer(&self) -> BarLogWriter {
        BarLogWriter {
            bar: self.bar.clone(),
        }
    }
}

impl ProgressTracker for CliProgress {
    fn set_length(&self, length: u64) {
        self.bar.set_length(length);
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    fn set_message(&self, message: &str) {
        self.bar.set_message(format!("{} {}", self.bar.prefix(), message));
    }

    fn increment(&self, amount: u64) {
        self.bar.inc(amount);
    }

    fn finish_with_message(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// stderr writer that suspends a [`CliProgress`] bar around each write
#[derive(Clone)]
pub struct BarLogWriter {
    bar: ProgressBar,
}

impl Write for BarLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bar.suspend(|| io::stderr().write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}
