//! Command-line interface module
//!
//! Interprets the argument vector, runs the immediate-exit actions and
//! hands builds to the [`Orchestrator`]. Business logic belongs in
//! [`crate::core`].

pub mod args;
pub mod commands;
pub mod output;

use std::path::PathBuf;

use crate::config::defaults::FAILURE_EXIT_CODE;
use crate::core::components::ComponentRegistry;
use crate::core::configuration::BuildConfiguration;
use crate::core::global_config::GlobalConfig;
use crate::core::orchestrator::Orchestrator;
use crate::engine::TomlConfigurator;
use crate::error::ConfigError;
use crate::infra::dirs::KilnDirs;
use args::Invocation;
use output::print_error;

/// Run kiln with `args` (program name excluded) and return the exit code
pub fn run(args: Vec<String>) -> i32 {
    let invocation = match args::parse(args) {
        Ok(invocation) => invocation,
        Err(e) => return configuration_failure(&e),
    };
    tracing::debug!(?invocation, "parsed command line");

    let result = match invocation {
        Invocation::Help => commands::help::execute(),
        Invocation::Version => commands::version::execute(),
        Invocation::Init(path) => match working_dir() {
            Ok(cwd) => commands::init::execute(&cwd, path.as_deref()),
            Err(e) => return configuration_failure(&e),
        },
        Invocation::Diagnostics => {
            let cwd = working_dir().ok();
            commands::diagnostics::execute(&ComponentRegistry::with_builtins(), cwd.as_deref())
        }
        Invocation::Build(config) => return build(&config),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            print_error(&format!("{e:#}"));
            FAILURE_EXIT_CODE
        }
    }
}

/// Run a build with the bundled engine
fn build(config: &BuildConfiguration) -> i32 {
    let config = match GlobalConfig::load(&KilnDirs::new()) {
        Ok(global) => global.apply(config),
        Err(e) => return configuration_failure(&e),
    };
    let cwd = match working_dir() {
        Ok(cwd) => cwd,
        Err(e) => return configuration_failure(&e),
    };

    let orchestrator = Orchestrator::new(
        ComponentRegistry::with_builtins(),
        Box::new(TomlConfigurator),
    )
    .with_working_dir(cwd);
    orchestrator.run(&config).exit().code()
}

fn working_dir() -> Result<PathBuf, ConfigError> {
    std::env::current_dir().map_err(|e| ConfigError::WorkingDirectory {
        error: e.to_string(),
    })
}

/// Report an error raised before the build lifecycle starts
fn configuration_failure(error: &ConfigError) -> i32 {
    print_error(error);
    if matches!(error, ConfigError::UnknownArgument { .. }) {
        println!("{}", commands::help::USAGE);
    }
    FAILURE_EXIT_CODE
}
