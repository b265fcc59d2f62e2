//! Bundled listeners that are not console loggers
//!
//! - [`TracingListener`] forwards build events into `tracing`.
//! - [`JsonLogger`] writes one JSON object per event. It works as a logger
//!   (wired to the output stream) and as a listener (writing to a file).

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::core::configuration::MessageLevel;
use crate::core::event::{BuildEvent, BuildListener, BuildLogger};
use crate::infra::streams::OutputStream;

/// Forwards build events to the `tracing` subscriber
#[derive(Debug, Default)]
pub struct TracingListener;

impl BuildListener for TracingListener {
    fn build_started(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        tracing::info!(project = event.project, "build started");
        Ok(())
    }

    fn build_finished(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        match event.failure {
            Some(failure) => tracing::error!(failure = %failure, "build failed"),
            None => tracing::info!("build finished"),
        }
        Ok(())
    }

    fn target_started(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        tracing::debug!(target_name = event.target, "target started");
        Ok(())
    }

    fn target_finished(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        tracing::debug!(
            target_name = event.target,
            failed = event.failure.is_some(),
            "target finished"
        );
        Ok(())
    }

    fn task_started(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        tracing::trace!(target_name = event.target, task = event.task, "task started");
        Ok(())
    }

    fn task_finished(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        tracing::trace!(target_name = event.target, task = event.task, "task finished");
        Ok(())
    }

    fn message_logged(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        let message = event.message.unwrap_or_default();
        let (target_name, task) = (event.target, event.task);
        match event.level {
            MessageLevel::Error => tracing::error!(target_name, task, "{message}"),
            MessageLevel::Warn => tracing::warn!(target_name, task, "{message}"),
            MessageLevel::Info => tracing::info!(target_name, task, "{message}"),
            MessageLevel::Verbose => tracing::debug!(target_name, task, "{message}"),
            MessageLevel::Debug => tracing::trace!(target_name, task, "{message}"),
        }
        Ok(())
    }
}

/// One line of the JSON event log
#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<MessageLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_ms: Option<u128>,
}

/// JSON-lines event log
#[derive(Debug)]
pub struct JsonLogger {
    out: OutputStream,
    level: MessageLevel,
    started: Option<Instant>,
}

impl JsonLogger {
    /// Logger form, writing to stdout until a stream is wired
    pub fn new() -> Self {
        Self {
            out: OutputStream::stdout(),
            level: MessageLevel::Info,
            started: None,
        }
    }

    /// Listener form, recording every event into `path`
    pub fn to_file(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            out: OutputStream::new(BufWriter::new(file)),
            level: MessageLevel::Debug,
            started: None,
        })
    }

    fn record(&self, event: &BuildEvent<'_>, elapsed_ms: Option<u128>) -> io::Result<()> {
        let record = EventRecord {
            event: event.kind.as_str(),
            level: event.message.map(|_| event.level),
            project: event.project,
            target: event.target,
            task: event.task,
            message: event.message,
            failure: event.failure.map(ToString::to_string),
            elapsed_ms,
        };
        let line = serde_json::to_string(&record).map_err(io::Error::other)?;
        self.out.line(&line)
    }
}

impl Default for JsonLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildListener for JsonLogger {
    fn build_started(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        self.started = Some(Instant::now());
        self.record(event, None)
    }

    fn build_finished(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        let elapsed = self.started.map(|s| s.elapsed().as_millis());
        self.record(event, elapsed)?;
        self.out.flush()
    }

    fn target_started(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        self.record(event, None)
    }

    fn target_finished(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        self.record(event, None)
    }

    fn task_started(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        self.record(event, None)
    }

    fn task_finished(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        self.record(event, None)
    }

    fn message_logged(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        if event.level > self.level {
            return Ok(());
        }
        self.record(event, None)
    }
}

impl BuildLogger for JsonLogger {
    fn set_message_output_level(&mut self, level: MessageLevel) {
        self.level = level;
    }

    fn set_output_stream(&mut self, stream: OutputStream) {
        self.out = stream;
    }

    fn set_error_stream(&mut self, _stream: OutputStream) {}

    fn set_emacs_mode(&mut self, _emacs: bool) {}
}
