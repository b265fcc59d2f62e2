//! Integration tests for running builds
//!
//! Covers the run lifecycle end to end through the binary:
//! - Default target, dependency order and property expansion
//! - Failure rendering and exit codes (1, explicit status, status 0)
//! - Log-file redirection with the single console echo
//! - Build file discovery (`-buildfile`, `-find`, `.dist` fallback)
//! - Property files, listeners and global config defaults

mod common;

use common::{stderr, stdout, TestProject, SAMPLE_BUILD_FILE};

// ============================================
// Successful builds
// ============================================

#[test]
fn test_default_target_runs_with_dependencies() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["-Duser=alice"]);

    assert!(output.status.success(), "build should succeed: {}", stderr(&output));
    let out = stdout(&output);
    let init = out.find("init:").expect("init banner");
    let compile = out.find("compile:").expect("compile banner");
    assert!(init < compile, "dependency must run first:\n{out}");
    assert!(out.contains("[echo] hello from init"));
    assert!(out.contains("[echo] compiling as alice"));
    assert!(out.contains("BUILD SUCCESSFUL"));
    assert!(out.contains("Total time: "));
}

#[test]
fn test_emacs_mode_drops_task_prefix() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["-emacs", "init"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("hello from init"));
    assert!(!out.contains("[echo]"));
}

#[test]
fn test_quiet_hides_echo_output() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["-quiet", "init"]);

    assert!(output.status.success());
    assert!(!stdout(&output).contains("hello from init"));
}

#[test]
fn test_unknown_reference_is_kept() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&[]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("compiling as ${user}"));
}

// ============================================
// Failures and exit codes
// ============================================

#[test]
fn test_failing_target_exits_one() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["broken"]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("BUILD FAILED"), "stderr: {err}");
    assert_eq!(err.matches("broken on purpose").count(), 1, "printed once: {err}");
}

#[test]
fn test_explicit_status_is_propagated() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["stop"]);

    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_explicit_zero_status_is_success() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["done"]);

    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_keep_going_runs_remaining_targets() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let stopped = project.run(&["broken", "init"]);
    assert_eq!(stopped.status.code(), Some(1));
    assert!(!stdout(&stopped).contains("hello from init"));

    let kept_going = project.run(&["-k", "broken", "init"]);
    assert_eq!(kept_going.status.code(), Some(1));
    assert!(stdout(&kept_going).contains("hello from init"));
}

#[test]
fn test_unknown_target_fails() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["nonexistent"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Target \"nonexistent\" does not exist"));
}

#[test]
fn test_unknown_task_type_warns_unless_strict() {
    let project = TestProject::with_build_file(
        "[project]\ndefault = \"a\"\n[[target]]\nname = \"a\"\n[[target.task]]\ntype = \"javac\"\n",
    );

    let lenient = project.run(&[]);
    assert!(lenient.status.success(), "stderr: {}", stderr(&lenient));

    let strict = project.run(&["-strict"]);
    assert_eq!(strict.status.code(), Some(1));
    assert!(stderr(&strict).contains("Unknown task type 'javac'"));
}

#[test]
fn test_invalid_build_file_is_reported_with_line() {
    let project = TestProject::with_build_file("[project]\nname = \n");

    let output = project.run(&[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("build.toml:2: Invalid build file"));
}

// ============================================
// Log file
// ============================================

#[test]
fn test_logfile_receives_build_output() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["-logfile", "build.log", "init"]);

    assert!(output.status.success());
    assert!(stdout(&output).is_empty(), "stdout: {}", stdout(&output));
    let log = project.read_file("build.log");
    assert!(log.contains("hello from init"));
    assert!(log.contains("BUILD SUCCESSFUL"));
}

#[test]
fn test_logfile_failure_is_echoed_once_to_console() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["-logfile", "build.log", "broken"]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Build failed: "), "stderr: {err}");
    assert_eq!(err.matches("broken on purpose").count(), 1);
    assert!(project.read_file("build.log").contains("BUILD FAILED"));
}

#[test]
fn test_unwritable_logfile_is_configuration_error() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);
    project.create_dir("logs");

    let output = project.run(&["-logfile", "logs"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Cannot write on the specified log file"));
}

// ============================================
// Build file discovery
// ============================================

#[test]
fn test_missing_build_file() {
    let project = TestProject::new();

    let output = project.run(&[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("does not exist"));
}

#[test]
fn test_buildfile_flag_selects_file() {
    let project = TestProject::new();
    project.create_file("ci/other.toml", SAMPLE_BUILD_FILE);

    let output = project.run(&["-f", "ci/other.toml", "init"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

#[test]
fn test_buildfile_flag_without_value() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["init", "-buildfile"]);

    assert_eq!(output.status.code(), Some(1));
    let expected = "You must specify a buildfile when using the -buildfile argument";
    assert!(stderr(&output).contains(expected));
    assert!(!stdout(&output).contains("init:"));
}

#[test]
fn test_find_searches_upward() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);
    project.create_dir("a/b/c");

    let output = project.run_in(&project.path().join("a/b/c"), &["init", "-find"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("hello from init"));
}

#[test]
fn test_dist_fallback() {
    let project = TestProject::new();
    project.create_file("build.toml.dist", SAMPLE_BUILD_FILE);

    let output = project.run(&["init"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

#[test]
fn test_directory_as_build_file() {
    let project = TestProject::new();
    project.create_dir("build.toml");

    let output = project.run(&[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("is a dir"));
}

// ============================================
// Properties, components and global config
// ============================================

#[test]
fn test_property_file_does_not_override_defines() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);
    project.create_file("user.properties", "user=from-file\n");

    let defined = project.run(&["-propertyfile", "user.properties", "-Duser=cli"]);
    assert!(stdout(&defined).contains("compiling as cli"));

    let overridden = project.run(&[
        "-propertyfile",
        "user.properties",
        "-propertyfileoverride",
        "-Duser=cli",
    ]);
    assert!(stdout(&overridden).contains("compiling as from-file"));
}

#[test]
fn test_missing_property_file_warns_and_continues() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["-propertyfile", "absent.properties", "init"]);

    assert!(output.status.success());
    assert!(stderr(&output).contains("Could not load property file absent.properties"));
}

#[test]
fn test_json_listener_writes_events() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["-listener", "json", "-Dkiln.json.file=events.json", "init"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let events = project.read_file("events.json");
    let first: serde_json::Value =
        serde_json::from_str(events.lines().next().expect("at least one event")).unwrap();
    assert_eq!(first["event"], "build_started");
    assert!(events.contains("build_finished"));
}

#[test]
fn test_unknown_logger_is_configuration_error() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["-logger", "fancy"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Unable to instantiate specified logger 'fancy'"));
    assert!(!stdout(&output).contains("BUILD"));
}

#[test]
fn test_console_logger_rejected_as_listener() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["-listener", "default"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("listener 'default'"));
}

#[test]
fn test_global_config_supplies_defaults() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);
    std::fs::write(
        project.config_path().join("config.toml"),
        "[defaults]\nemacs = true\n",
    )
    .unwrap();

    let output = project.run(&["init"]);

    assert!(output.status.success());
    assert!(!stdout(&output).contains("[echo]"));
}

#[test]
fn test_silent_overrides_global_default_logger() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);
    std::fs::write(
        project.config_path().join("config.toml"),
        "[defaults]\nlogger = \"nobanner\"\n",
    )
    .unwrap();

    let output = project.run(&["-silent", "init"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!stdout(&output).contains("BUILD SUCCESSFUL"), "stdout: {}", stdout(&output));
}

#[test]
fn test_malformed_global_config_fails() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);
    std::fs::write(project.config_path().join("config.toml"), "[defaults\n").unwrap();

    let output = project.run(&["init"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to load global config"));
}
