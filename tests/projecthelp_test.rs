//! Integration tests for `-projecthelp` and its aliases

mod common;

use common::{stderr, stdout, TestProject, SAMPLE_BUILD_FILE};

#[test]
fn test_projecthelp_lists_targets() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["-projecthelp"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.starts_with("Sample project\n"));
    let main = out.find("Main targets:").expect("main section");
    let other = out.find("Other targets:").expect("other section");
    assert!(main < other);
    assert!(out[main..other].contains("compile"));
    assert!(out[main..other].contains("Compile everything"));
    assert!(out[other..].contains(" init"));
    assert!(out.contains("Default target: compile"));
    assert!(!out.contains("BUILD SUCCESSFUL"));
    assert!(!out.contains("hello from init"));
}

#[test]
fn test_projecthelp_aliases() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);
    for flag in ["-targets", "-list", "-l", "-p"] {
        let output = project.run(&[flag]);
        assert!(output.status.success(), "{flag}");
        assert!(stdout(&output).contains("Main targets:"), "{flag}");
    }
}

#[test]
fn test_longtargets_show_dependencies() {
    let project = TestProject::with_build_file(SAMPLE_BUILD_FILE);

    let output = project.run(&["-p", "-longtargets"]);

    assert!(stdout(&output).contains("depends on: init"));
}

#[test]
fn test_projecthelp_with_invalid_build_file() {
    let project = TestProject::with_build_file("[[target]]\n");

    let output = project.run(&["-p"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid build file"));
}
