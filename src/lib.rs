//! kiln - build-lifecycle controller
//!
//! Turns a command line into a configured build run: interprets arguments,
//! locates the build file, binds the logger, listeners and input handler,
//! drives the build through its lifecycle and maps the outcome to an exit
//! code. Parsing build files and running targets is delegated to a
//! [`ProjectConfigurator`](core::project::ProjectConfigurator); the bundled
//! one lives in [`engine`].
//!
//! # Architecture
//!
//! - [`cli`] - Argument interpretation, immediate-exit actions, exit codes
//! - [`core`] - Lifecycle orchestration, events, loggers and components
//! - [`engine`] - Bundled `build.toml` configurator and target executor
//! - [`infra`] - Infrastructure layer (directories, files, output streams)
//! - [`config`] - Constants and defaults
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod infra;
