//! Immediate-exit actions
//!
//! Each action is implemented in its own submodule and runs without
//! touching the build lifecycle.

pub mod diagnostics;
pub mod help;
pub mod init;
pub mod version;
