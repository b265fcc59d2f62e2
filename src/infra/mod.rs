//! Infrastructure layer
//!
//! Handles I/O: directories, files, properties files and the output
//! streams of a run.

pub mod dirs;
pub mod filesystem;
pub mod properties;
pub mod streams;
