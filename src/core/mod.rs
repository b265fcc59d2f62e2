//! Core lifecycle logic
//!
//! Everything between a parsed command line and an exit code. Filesystem
//! access goes through [`crate::infra`].
//!
//! # Submodules
//!
//! - [`configuration`] - Build configuration produced by argument parsing
//! - [`locator`] - Build file discovery
//! - [`components`] - Registry resolving logger, listener and input handler ids
//! - [`event`] - Build events and the listener contract
//! - [`logger`] - The build event logger and its banner styles
//! - [`listeners`] - JSON and tracing listeners
//! - [`failure`] - Rendering of failures and their causes
//! - [`input`] - Input handlers
//! - [`context`] - Properties, listeners and policy shared with the engine
//! - [`project`] - Execution-engine collaborator contracts and project help
//! - [`orchestrator`] - The lifecycle state machine and exit mapping
//! - [`global_config`] - User-wide defaults
//! - [`diagnostics`] - `-diagnostics` report
//! - [`init`] - Skeleton build file
//! - [`version`] - Version reporting and constraints

pub mod components;
pub mod configuration;
pub mod context;
pub mod diagnostics;
pub mod event;
pub mod failure;
pub mod global_config;
pub mod init;
pub mod input;
pub mod listeners;
pub mod locator;
pub mod logger;
pub mod orchestrator;
pub mod project;
pub mod version;
