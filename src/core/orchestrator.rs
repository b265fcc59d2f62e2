//! Lifecycle orchestration
//!
//! Drives one run from a parsed [`BuildConfiguration`] to a [`RunOutcome`]:
//!
//! ```text
//! Configured -> FileResolved -> ComponentsBound -> Running -> Finished
//! ```
//!
//! Every path ends in `Finished`. Once `Running` is entered exactly one
//! `BuildFinished` event fires, and the output streams are closed exactly
//! once after the outcome is known.

use std::path::{Path, PathBuf};

use crate::config::defaults::{
    DEFAULT_INPUT_HANDLER, DEFAULT_LOGGER, FAILURE_EXIT_CODE, PROP_BUILD_FILE,
    PROP_BUILD_FILE_DIR, PROP_INVOKED_TARGETS, PROP_VERSION, SILENT_LOGGER,
};
use crate::core::components::ComponentRegistry;
use crate::core::configuration::{BuildConfiguration, MessageLevel};
use crate::core::context::{EngineContext, Properties};
use crate::core::event::BuildEvent;
use crate::core::failure;
use crate::core::locator;
use crate::core::project::{print_project_help, ProjectConfigurator};
use crate::core::version::CURRENT_VERSION;
use crate::error::{BuildFailure, ConfigError};
use crate::infra::properties;
use crate::infra::streams::{OutputStream, Streams};

/// Result of one run
#[derive(Debug)]
pub enum RunOutcome {
    Success,
    /// Bad usage or setup; nothing was built
    Configuration(ConfigError),
    /// Build-domain failure, already rendered by the logger
    BuildFailed(anyhow::Error),
    /// Failure carrying its own non-zero exit status
    ExitStatus(i32, anyhow::Error),
    /// Anything else
    Unexpected(anyhow::Error),
}

/// What the process exits with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    ConfigurationFailure,
    RuntimeFailure,
    ExplicitStatus(i32),
}

impl ExitOutcome {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::ConfigurationFailure | Self::RuntimeFailure => FAILURE_EXIT_CODE,
            Self::ExplicitStatus(code) => code,
        }
    }
}

impl RunOutcome {
    /// Classify a failure raised while running
    ///
    /// A build failure anywhere in the chain makes this a build-domain
    /// failure; the first explicit status found wins, and status 0 counts
    /// as success.
    pub fn from_error(error: anyhow::Error) -> Self {
        let status = error
            .chain()
            .filter_map(|e| e.downcast_ref::<BuildFailure>())
            .find_map(BuildFailure::status);
        match status {
            Some(0) => return Self::Success,
            Some(code) => return Self::ExitStatus(code, error),
            None => {}
        }

        if error.chain().any(|e| e.is::<BuildFailure>()) {
            return Self::BuildFailed(error);
        }
        match error.downcast::<ConfigError>() {
            Ok(config) => Self::Configuration(config),
            Err(other) => Self::Unexpected(other),
        }
    }

    pub fn exit(&self) -> ExitOutcome {
        match self {
            Self::Success => ExitOutcome::Success,
            Self::Configuration(_) => ExitOutcome::ConfigurationFailure,
            Self::BuildFailed(_) | Self::Unexpected(_) => ExitOutcome::RuntimeFailure,
            Self::ExitStatus(code, _) => ExitOutcome::ExplicitStatus(*code),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Runs builds against a registry and a project configurator
pub struct Orchestrator {
    registry: ComponentRegistry,
    configurator: Box<dyn ProjectConfigurator>,
    working_dir: PathBuf,
    console_out: OutputStream,
    console_err: OutputStream,
}

impl Orchestrator {
    pub fn new(registry: ComponentRegistry, configurator: Box<dyn ProjectConfigurator>) -> Self {
        Self {
            registry,
            configurator,
            working_dir: PathBuf::from("."),
            console_out: OutputStream::stdout(),
            console_err: OutputStream::stderr(),
        }
    }

    /// Directory relative paths are resolved against
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Streams used when no log file is requested
    #[must_use]
    pub fn with_console(mut self, out: OutputStream, err: OutputStream) -> Self {
        self.console_out = out;
        self.console_err = err;
        self
    }

    /// Run the build described by `config`
    pub fn run(&self, config: &BuildConfiguration) -> RunOutcome {
        let mut streams = match &config.log_file {
            Some(path) => match Streams::log_file(&self.working_dir.join(path)) {
                Ok(streams) => streams,
                Err(e) => return self.finish(RunOutcome::Configuration(e), None),
            },
            None => Streams::new(self.console_out.clone(), self.console_err.clone()),
        };

        let outcome = self.run_with(config, &streams);
        self.finish(outcome, Some(&mut streams))
    }

    fn run_with(&self, config: &BuildConfiguration, streams: &Streams) -> RunOutcome {
        tracing::debug!(state = "configured", "starting run");
        let user_properties = self.user_properties(config, streams.err());

        let build_file = match locator::locate(config, &self.working_dir) {
            Ok(path) => absolute(&path),
            Err(e) => return RunOutcome::Configuration(e),
        };
        tracing::debug!(state = "file_resolved", file = %build_file.display());

        let mut ctx =
            EngineContext::new(user_properties).with_policy(config.keep_going, config.strict);
        set_mandatory_properties(&mut ctx, &build_file, &config.targets);
        if let Err(e) = self.bind_components(config, streams, &mut ctx) {
            return RunOutcome::Configuration(e);
        }
        tracing::debug!(state = "components_bound", listeners = ctx.listener_count());

        if config.project_help {
            return self.project_help(config, &build_file, &mut ctx, streams);
        }

        tracing::debug!(state = "running");
        let result = self.execute(config, &build_file, &mut ctx);
        let finished = ctx.fire(BuildEvent::build_finished(result.as_ref().err()));

        if let Err(secondary) = finished {
            report_secondary_failure(streams.err(), &secondary, result.as_ref().err());
            return match result {
                Err(original) => RunOutcome::from_error(original),
                Ok(()) => RunOutcome::Unexpected(
                    anyhow::Error::new(secondary).context("Failed to log the end of the build"),
                ),
            };
        }

        match result {
            Ok(()) => RunOutcome::Success,
            Err(e) => RunOutcome::from_error(e),
        }
    }

    /// `-D` definitions merged with `-propertyfile` contents
    fn user_properties(&self, config: &BuildConfiguration, err: &OutputStream) -> Properties {
        let mut props: Properties = config
            .user_properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for file in &config.property_files {
            let path = self.working_dir.join(file);
            match properties::load(&path) {
                Ok(loaded) => {
                    for (name, value) in loaded {
                        if config.property_file_override || !props.contains_key(&name) {
                            props.insert(name, value);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), "property file not loaded");
                    let warning = format!("Could not load property file {}: {e}", file.display());
                    if let Err(e) = err.line(&warning) {
                        tracing::warn!(error = %e, "could not report property file warning");
                    }
                }
            }
        }
        props
    }

    /// Resolve the logger, listeners and input handler into `ctx`
    fn bind_components(
        &self,
        config: &BuildConfiguration,
        streams: &Streams,
        ctx: &mut EngineContext,
    ) -> Result<(), ConfigError> {
        let logger_id = config.logger.as_deref().unwrap_or(if config.silent {
            SILENT_LOGGER
        } else {
            DEFAULT_LOGGER
        });
        let (level, emacs) = if config.silent {
            (config.level.min(MessageLevel::Warn), true)
        } else {
            (config.level, config.emacs)
        };

        let mut logger = self.registry.logger(logger_id, ctx)?;
        logger.set_message_output_level(level);
        logger.set_output_stream(streams.out().clone());
        logger.set_error_stream(streams.err().clone());
        logger.set_emacs_mode(emacs);
        ctx.add_logger(logger);

        for id in &config.listeners {
            let listener = self.registry.listener(id, ctx)?;
            ctx.add_listener(listener);
        }

        let handler_id = config.input_handler.as_deref().unwrap_or(DEFAULT_INPUT_HANDLER);
        let handler = self.registry.input_handler(handler_id, ctx)?;
        ctx.set_input_handler(handler);
        Ok(())
    }

    /// Body of `Running`; `BuildFinished` is fired by the caller
    fn execute(
        &self,
        config: &BuildConfiguration,
        build_file: &Path,
        ctx: &mut EngineContext,
    ) -> anyhow::Result<()> {
        ctx.fire(BuildEvent::build_started())?;
        let mut project = self.configurator.configure(build_file, ctx)?;

        let targets = if config.targets.is_empty() {
            project.default_target().map(str::to_string).into_iter().collect()
        } else {
            config.targets.clone()
        };
        tracing::info!(targets = ?targets, "executing targets");
        project.execute_targets(&targets, ctx)
    }

    fn project_help(
        &self,
        config: &BuildConfiguration,
        build_file: &Path,
        ctx: &mut EngineContext,
        streams: &Streams,
    ) -> RunOutcome {
        let printed = self
            .configurator
            .configure(build_file, ctx)
            .and_then(|project| {
                print_project_help(project.as_ref(), config.show_long_targets, streams.out())
                    .map_err(anyhow::Error::from)
            });
        match printed {
            Ok(()) => RunOutcome::Success,
            Err(e) => {
                if let Err(write) = streams.err().line(&failure::render(&e, false)) {
                    tracing::warn!(error = %write, "could not report project help failure");
                }
                RunOutcome::from_error(e)
            }
        }
    }

    /// Top-level reporting, then the single stream close
    fn finish(&self, outcome: RunOutcome, streams: Option<&mut Streams>) -> RunOutcome {
        let err = streams
            .as_ref()
            .map_or(&self.console_err, |s| s.err())
            .clone();
        let redirected = streams.as_ref().is_some_and(|s| s.log_path().is_some());

        let printed = match &outcome {
            RunOutcome::Configuration(e) => err.line(&e.to_string()),
            RunOutcome::Unexpected(e) => err.line(failure::render(e, true).trim_end()),
            RunOutcome::BuildFailed(e) if redirected => self
                .console_err
                .line(&format!("Build failed: {}", failure::render(e, false).trim_end())),
            RunOutcome::BuildFailed(_) | RunOutcome::ExitStatus(..) | RunOutcome::Success => Ok(()),
        };
        if let Err(e) = printed {
            tracing::warn!(error = %e, "could not report the run outcome");
        }

        if let Some(streams) = streams {
            if let Err(e) = streams.close() {
                tracing::warn!(error = %e, "could not close output streams");
            }
        }
        tracing::debug!(state = "finished", exit = outcome.exit().code());
        outcome
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("registry", &self.registry)
            .field("working_dir", &self.working_dir)
            .finish_non_exhaustive()
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}

fn set_mandatory_properties(ctx: &mut EngineContext, build_file: &Path, targets: &[String]) {
    ctx.set_user_property(PROP_BUILD_FILE, build_file.display().to_string());
    if let Some(dir) = build_file.parent() {
        ctx.set_user_property(PROP_BUILD_FILE_DIR, dir.display().to_string());
    }
    ctx.set_user_property(PROP_VERSION, CURRENT_VERSION);
    ctx.set_user_property(PROP_INVOKED_TARGETS, targets.join(","));
}

fn report_secondary_failure(
    err: &OutputStream,
    secondary: &std::io::Error,
    original: Option<&anyhow::Error>,
) {
    let mut text = format!(
        "Caught an exception while logging the end of the build.  Exception was:\n{secondary}"
    );
    if let Some(original) = original {
        text.push_str("\nThere has been an error prior to that:\n");
        text.push_str(failure::render(original, true).trim_end());
    }
    if err.line(&text).is_err() {
        tracing::error!(%secondary, "could not report logging failure");
    }
}
