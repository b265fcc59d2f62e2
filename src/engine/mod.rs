//! Bundled execution engine
//!
//! The default [`ProjectConfigurator`](crate::core::project::ProjectConfigurator):
//! reads `build.toml`, resolves target dependencies and runs the bundled
//! task types one after another.

pub mod buildfile;
pub mod expand;
pub mod graph;
pub mod project;
pub mod tasks;

pub use project::{TomlConfigurator, TomlProject};
