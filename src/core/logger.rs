//! Build event logger
//!
//! Renders lifecycle events to an output and an error stream, filtered by
//! a verbosity threshold. One type covers the bundled console loggers;
//! they differ only in their [`BannerStyle`].

use std::io;
use std::time::{Duration, Instant, SystemTime};

use crate::config::defaults::LEFT_COLUMN_SIZE;
use crate::core::configuration::MessageLevel;
use crate::core::event::{BuildEvent, BuildListener, BuildLogger};
use crate::core::failure;
use crate::infra::streams::OutputStream;

pub const BUILD_SUCCESSFUL: &str = "BUILD SUCCESSFUL";
pub const BUILD_FAILED: &str = "BUILD FAILED";

/// How a console logger announces targets and the build result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerStyle {
    /// Banner for every target, plain result banner
    Standard,
    /// Target banner only once the target logs something
    NoBanner,
    /// Result banner carries a timestamp
    Timestamped,
    /// No target banners, no success banner
    Silent,
}

/// Console build logger
#[derive(Debug)]
pub struct EventLogger {
    out: OutputStream,
    err: OutputStream,
    level: MessageLevel,
    emacs: bool,
    style: BannerStyle,
    started: Option<Instant>,
    pending_target: Option<String>,
}

impl EventLogger {
    pub fn new(style: BannerStyle) -> Self {
        Self {
            out: OutputStream::stdout(),
            err: OutputStream::stderr(),
            level: MessageLevel::Info,
            emacs: false,
            style,
            started: None,
            pending_target: None,
        }
    }

    fn verbose(&self) -> bool {
        self.level >= MessageLevel::Verbose
    }

    fn target_banner(&self, target: &str) -> io::Result<()> {
        self.out.line("")?;
        self.out.line(&format!("{target}:"))
    }

    fn result_banner(&self, base: &str) -> String {
        match self.style {
            BannerStyle::Timestamped => format!(
                "{base} - at {}",
                humantime::format_rfc3339_seconds(SystemTime::now())
            ),
            _ => base.to_string(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }
}

impl BuildListener for EventLogger {
    fn build_started(&mut self, _event: &BuildEvent<'_>) -> io::Result<()> {
        self.started = Some(Instant::now());
        Ok(())
    }

    fn build_finished(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        let total = format!("Total time: {}", format_elapsed(self.elapsed()));
        match event.failure {
            None => {
                if self.style == BannerStyle::Silent {
                    return Ok(());
                }
                let banner = self.result_banner(BUILD_SUCCESSFUL);
                self.out.line(&format!("\n{banner}\n{total}"))
            }
            Some(error) => {
                let banner = self.result_banner(BUILD_FAILED);
                let detail = failure::render(error, self.verbose());
                self.err.line(&format!("\n{banner}\n{detail}\n{total}"))
            }
        }
    }

    fn target_started(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        let Some(target) = event.target.filter(|t| !t.is_empty()) else {
            return Ok(());
        };
        if self.level < MessageLevel::Info {
            return Ok(());
        }
        match self.style {
            BannerStyle::Standard | BannerStyle::Timestamped => self.target_banner(target),
            BannerStyle::NoBanner => {
                self.pending_target = Some(target.to_string());
                Ok(())
            }
            BannerStyle::Silent => Ok(()),
        }
    }

    fn target_finished(&mut self, _event: &BuildEvent<'_>) -> io::Result<()> {
        self.pending_target = None;
        Ok(())
    }

    fn message_logged(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        if event.level > self.level {
            return Ok(());
        }
        if let Some(target) = self.pending_target.take() {
            self.target_banner(&target)?;
        }

        let text = format_message(event.message.unwrap_or_default(), event.task, self.emacs);
        if event.level == MessageLevel::Error {
            self.err.line(&text)
        } else {
            self.out.line(&text)
        }
    }
}

impl BuildLogger for EventLogger {
    fn set_message_output_level(&mut self, level: MessageLevel) {
        self.level = level;
    }

    fn set_output_stream(&mut self, stream: OutputStream) {
        self.out = stream;
    }

    fn set_error_stream(&mut self, stream: OutputStream) {
        self.err = stream;
    }

    fn set_emacs_mode(&mut self, emacs: bool) {
        self.emacs = emacs;
    }
}

/// Prefix every line of a task message with a right-aligned `[task]` label
pub fn format_message(message: &str, task: Option<&str>, emacs: bool) -> String {
    let Some(task) = task.filter(|_| !emacs) else {
        return message.to_string();
    };
    let label = format!("[{task}] ");
    let prefix = format!("{label:>width$}", width = LEFT_COLUMN_SIZE);
    message
        .lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format an elapsed wall-clock duration
///
/// At least a minute renders as `"<M> minute(s) <S.SS> second(s)"`,
/// anything shorter as `"<S.SSSS> second(s)"`. Each unit is singular only
/// when its whole value is exactly one.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 60.0 {
        let minutes = elapsed.as_secs() / 60;
        let rest = secs - (minutes * 60) as f64;
        format!(
            "{minutes} {} {rest:.2} {}",
            unit(minutes, "minute"),
            unit(rest.trunc() as u64, "second")
        )
    } else {
        format!("{secs:.4} {}", unit(secs.trunc() as u64, "second"))
    }
}

fn unit(value: u64, singular: &str) -> String {
    if value == 1 {
        singular.to_string()
    } else {
        format!("{singular}s")
    }
}
