//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for a build and runs the kiln binary in
/// it. Each project gets its own empty config directory so a user-wide
/// `config.toml` never leaks into a test.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
    config_dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
            config_dir: TempDir::new().expect("Failed to create config directory"),
        }
    }

    /// Create a test project holding `build.toml`
    #[allow(dead_code)]
    pub fn with_build_file(content: &str) -> Self {
        let project = Self::new();
        project.create_file("build.toml", content);
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Path to the isolated kiln config directory
    #[allow(dead_code)]
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.path().to_path_buf()
    }

    /// Create a file in the test project
    #[allow(dead_code)]
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    #[allow(dead_code)]
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    #[allow(dead_code)]
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    #[allow(dead_code)]
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Run kiln in the project directory
    pub fn run(&self, args: &[&str]) -> Output {
        self.run_in(&self.path(), args)
    }

    /// Run kiln in a directory below (or outside) the project
    pub fn run_in(&self, dir: &std::path::Path, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_kiln"))
            .current_dir(dir)
            .args(args)
            .env("KILN_CONFIG_DIR", self.config_dir.path())
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute kiln")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[allow(dead_code)]
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Sample build file for testing
///
/// `compile` depends on `init`; `broken` fails with status 1, `stop`
/// with an explicit status 3 and `done` with status 0.
#[allow(dead_code)]
pub const SAMPLE_BUILD_FILE: &str = r#"
[project]
name = "sample"
default = "compile"
description = "Sample project"

[properties]
greeting = "hello"

[[target]]
name = "init"
[[target.task]]
type = "echo"
message = "${greeting} from init"

[[target]]
name = "compile"
description = "Compile everything"
depends = ["init"]
[[target.task]]
type = "echo"
message = "compiling as ${user}"

[[target]]
name = "broken"
description = "Always fails"
[[target.task]]
type = "fail"
message = "broken on purpose"

[[target]]
name = "stop"
[[target.task]]
type = "fail"
message = "stopping"
status = 3

[[target]]
name = "done"
[[target.task]]
type = "fail"
message = "nothing left"
status = 0
"#;
