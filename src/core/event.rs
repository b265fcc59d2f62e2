//! Build events and the listener contracts
//!
//! Events are delivered synchronously, one at a time, to every registered
//! listener in registration order.

use std::io;

use crate::core::configuration::MessageLevel;
use crate::infra::streams::OutputStream;

/// Kind of lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    BuildStarted,
    BuildFinished,
    TargetStarted,
    TargetFinished,
    TaskStarted,
    TaskFinished,
    MessageLogged,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BuildStarted => "build_started",
            Self::BuildFinished => "build_finished",
            Self::TargetStarted => "target_started",
            Self::TargetFinished => "target_finished",
            Self::TaskStarted => "task_started",
            Self::TaskFinished => "task_finished",
            Self::MessageLogged => "message_logged",
        }
    }
}

/// One lifecycle event, borrowed from whoever fired it
#[derive(Debug, Clone, Copy)]
pub struct BuildEvent<'a> {
    pub kind: EventKind,
    pub project: Option<&'a str>,
    pub target: Option<&'a str>,
    pub task: Option<&'a str>,
    pub message: Option<&'a str>,
    /// Priority of a `MessageLogged` event
    pub level: MessageLevel,
    pub failure: Option<&'a anyhow::Error>,
}

impl<'a> BuildEvent<'a> {
    fn of(kind: EventKind) -> Self {
        Self {
            kind,
            project: None,
            target: None,
            task: None,
            message: None,
            level: MessageLevel::Info,
            failure: None,
        }
    }

    pub fn build_started() -> Self {
        Self::of(EventKind::BuildStarted)
    }

    pub fn build_finished(failure: Option<&'a anyhow::Error>) -> Self {
        Self {
            failure,
            ..Self::of(EventKind::BuildFinished)
        }
    }

    pub fn target_started(target: &'a str) -> Self {
        Self {
            target: Some(target),
            ..Self::of(EventKind::TargetStarted)
        }
    }

    pub fn target_finished(target: &'a str, failure: Option<&'a anyhow::Error>) -> Self {
        Self {
            target: Some(target),
            failure,
            ..Self::of(EventKind::TargetFinished)
        }
    }

    pub fn task_started(target: &'a str, task: &'a str) -> Self {
        Self {
            target: Some(target),
            task: Some(task),
            ..Self::of(EventKind::TaskStarted)
        }
    }

    pub fn task_finished(
        target: &'a str,
        task: &'a str,
        failure: Option<&'a anyhow::Error>,
    ) -> Self {
        Self {
            target: Some(target),
            task: Some(task),
            failure,
            ..Self::of(EventKind::TaskFinished)
        }
    }

    pub fn message(level: MessageLevel, message: &'a str) -> Self {
        Self {
            level,
            message: Some(message),
            ..Self::of(EventKind::MessageLogged)
        }
    }

    #[must_use]
    pub fn in_project(mut self, project: Option<&'a str>) -> Self {
        self.project = project;
        self
    }

    #[must_use]
    pub fn in_target(mut self, target: Option<&'a str>) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn in_task(mut self, task: Option<&'a str>) -> Self {
        self.task = task;
        self
    }
}

/// Passive consumer of build events
///
/// Handlers default to doing nothing. A handler error propagates to
/// whoever fired the event.
pub trait BuildListener {
    fn build_started(&mut self, _event: &BuildEvent<'_>) -> io::Result<()> {
        Ok(())
    }

    fn build_finished(&mut self, _event: &BuildEvent<'_>) -> io::Result<()> {
        Ok(())
    }

    fn target_started(&mut self, _event: &BuildEvent<'_>) -> io::Result<()> {
        Ok(())
    }

    fn target_finished(&mut self, _event: &BuildEvent<'_>) -> io::Result<()> {
        Ok(())
    }

    fn task_started(&mut self, _event: &BuildEvent<'_>) -> io::Result<()> {
        Ok(())
    }

    fn task_finished(&mut self, _event: &BuildEvent<'_>) -> io::Result<()> {
        Ok(())
    }

    fn message_logged(&mut self, _event: &BuildEvent<'_>) -> io::Result<()> {
        Ok(())
    }
}

/// Route an event to the matching handler
pub fn deliver(listener: &mut dyn BuildListener, event: &BuildEvent<'_>) -> io::Result<()> {
    match event.kind {
        EventKind::BuildStarted => listener.build_started(event),
        EventKind::BuildFinished => listener.build_finished(event),
        EventKind::TargetStarted => listener.target_started(event),
        EventKind::TargetFinished => listener.target_finished(event),
        EventKind::TaskStarted => listener.task_started(event),
        EventKind::TaskFinished => listener.task_finished(event),
        EventKind::MessageLogged => listener.message_logged(event),
    }
}

/// Listener bound to explicit output streams and a verbosity threshold
pub trait BuildLogger: BuildListener {
    fn set_message_output_level(&mut self, level: MessageLevel);
    fn set_output_stream(&mut self, stream: OutputStream);
    fn set_error_stream(&mut self, stream: OutputStream);
    fn set_emacs_mode(&mut self, emacs: bool);
}

/// Adapter registering a wired logger as an ordinary listener
struct WiredLogger(Box<dyn BuildLogger>);

impl BuildListener for WiredLogger {
    fn build_started(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        self.0.build_started(event)
    }

    fn build_finished(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        self.0.build_finished(event)
    }

    fn target_started(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        self.0.target_started(event)
    }

    fn target_finished(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        self.0.target_finished(event)
    }

    fn task_started(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        self.0.task_started(event)
    }

    fn task_finished(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        self.0.task_finished(event)
    }

    fn message_logged(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        self.0.message_logged(event)
    }
}

/// Ordered set of registered listeners
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<Box<dyn BuildListener>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Box<dyn BuildListener>) {
        self.listeners.push(listener);
    }

    pub fn add_logger(&mut self, logger: Box<dyn BuildLogger>) {
        self.listeners.push(Box::new(WiredLogger(logger)));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener in registration order
    ///
    /// A listener that fails does not stop delivery to the rest; the
    /// first error is returned once all listeners have seen the event.
    pub fn fire(&mut self, event: &BuildEvent<'_>) -> io::Result<()> {
        let mut first_error = None;
        for listener in &mut self.listeners {
            if let Err(e) = deliver(listener.as_mut(), event) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
