//! Diagnostics report logic
//!
//! Collects what `-diagnostics` prints: version and build metadata, the
//! host, kiln's directories and environment, registered components, and a
//! few environment checks with suggestions.

use std::fmt::Write as _;
use std::path::Path;

use crate::config::defaults::DEFAULT_BUILD_FILE;
use crate::core::components::{Capability, ComponentRegistry};
use crate::core::global_config::GlobalConfig;
use crate::core::version::BuildInfo;
use crate::infra::dirs::{KilnDirs, ENV_CONFIG_DIR, ENV_HOME};
use crate::infra::filesystem;

/// Environment variables reported verbatim
pub const REPORTED_ENV_VARS: &[&str] = &[ENV_CONFIG_DIR, ENV_HOME, "RUST_LOG"];

/// Result of a single environment check
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the thing being checked
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Detail shown next to a passing check
    pub detail: Option<String>,
    /// Error message if check failed
    pub error: Option<String>,
    /// Suggestion for fixing the issue
    pub suggestion: Option<String>,
    /// Whether a failure makes kiln unusable
    pub required: bool,
}

impl CheckResult {
    /// Create a passing check result
    pub fn pass(name: &str, detail: Option<String>, required: bool) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail,
            error: None,
            suggestion: None,
            required,
        }
    }

    /// Create a failing check result
    pub fn fail(name: &str, error: &str, suggestion: Option<&str>, required: bool) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail: None,
            error: Some(error.to_string()),
            suggestion: suggestion.map(String::from),
            required,
        }
    }
}

/// A titled list of `key: value` lines
#[derive(Debug, Clone, Default)]
pub struct Section {
    pub title: String,
    pub entries: Vec<(String, String)>,
}

impl Section {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            entries: Vec::new(),
        }
    }

    fn entry(&mut self, key: &str, value: impl Into<String>) {
        self.entries.push((key.to_string(), value.into()));
    }
}

/// Full diagnostics report
#[derive(Debug, Default)]
pub struct DiagnosticsReport {
    pub version_line: String,
    pub sections: Vec<Section>,
    pub checks: Vec<CheckResult>,
}

impl DiagnosticsReport {
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }

    pub fn failed_required(&self) -> Vec<&CheckResult> {
        self.checks
            .iter()
            .filter(|c| c.required && !c.passed)
            .collect()
    }

    /// Plain-text rendering
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "------- kiln diagnostics report -------");
        let _ = writeln!(out, "{}", self.version_line);

        for section in &self.sections {
            write_heading(&mut out, &section.title);
            for (key, value) in &section.entries {
                let _ = writeln!(out, "{key}: {value}");
            }
        }

        write_heading(&mut out, "Checks");
        for check in &self.checks {
            let optional = if check.required { "" } else { " [optional]" };
            if check.passed {
                let detail = check
                    .detail
                    .as_ref()
                    .map(|d| format!(" ({d})"))
                    .unwrap_or_default();
                let _ = writeln!(out, "[ok]   {}{detail}{optional}", check.name);
            } else {
                let _ = writeln!(out, "[fail] {}{optional}", check.name);
                if let Some(error) = &check.error {
                    let _ = writeln!(out, "       Error: {error}");
                }
                if let Some(suggestion) = &check.suggestion {
                    let _ = writeln!(out, "       Suggestion: {suggestion}");
                }
            }
        }
        out
    }
}

fn write_heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n-------------------------------------------");
    let _ = writeln!(out, " {title}");
    let _ = writeln!(out, "-------------------------------------------");
}

/// Check the global configuration file
pub fn check_global_config(dirs: &KilnDirs) -> CheckResult {
    let path = dirs.global_config_path();
    if !path.exists() {
        return CheckResult::pass("global config", Some("not present, using defaults".into()), true);
    }
    match GlobalConfig::load_from_path(&path) {
        Ok(_) => CheckResult::pass("global config", Some(path.display().to_string()), true),
        Err(e) => CheckResult::fail(
            "global config",
            &e.to_string(),
            Some("Fix or remove the file"),
            true,
        ),
    }
}

/// Check that the temp directory accepts files
pub fn check_temp_dir() -> CheckResult {
    let temp = std::env::temp_dir();
    if filesystem::is_writable_dir(&temp) {
        CheckResult::pass("temp dir writable", Some(temp.display().to_string()), true)
    } else {
        CheckResult::fail(
            "temp dir writable",
            &format!("cannot write to {}", temp.display()),
            Some("Set TMPDIR to a writable directory"),
            true,
        )
    }
}

/// Check that `kiln` resolves on PATH
pub fn check_on_path() -> CheckResult {
    match which::which("kiln") {
        Ok(path) => CheckResult::pass("kiln on PATH", Some(path.display().to_string()), false),
        Err(_) => CheckResult::fail(
            "kiln on PATH",
            "kiln not found in PATH",
            Some("Add the directory holding the kiln binary to PATH"),
            false,
        ),
    }
}

/// Check for a build file in `dir`
pub fn check_build_file(dir: &Path) -> CheckResult {
    let path = dir.join(DEFAULT_BUILD_FILE);
    if path.is_file() {
        CheckResult::pass("build file", Some(path.display().to_string()), false)
    } else {
        CheckResult::fail(
            "build file",
            &format!("no {DEFAULT_BUILD_FILE} in {}", dir.display()),
            Some("Run 'kiln -init' to create one"),
            false,
        )
    }
}

/// Collect the full report
pub fn run_diagnostics(
    dirs: &KilnDirs,
    registry: &ComponentRegistry,
    working_dir: Option<&Path>,
) -> DiagnosticsReport {
    let info = BuildInfo::current();
    let unknown = || "unknown".to_string();

    let mut build = Section::new("Build information");
    build.entry("version", info.version);
    build.entry("git sha", info.git_sha.map_or_else(unknown, String::from));
    build.entry("built", info.build_timestamp.map_or_else(unknown, String::from));
    build.entry("target", info.target_triple.map_or_else(unknown, String::from));
    build.entry("rustc", info.rustc.map_or_else(unknown, String::from));

    let mut system = Section::new("System");
    system.entry("os", std::env::consts::OS);
    system.entry("arch", std::env::consts::ARCH);
    system.entry("cpus", num_cpus::get().to_string());
    system.entry(
        "working dir",
        working_dir.map_or_else(unknown, |d| d.display().to_string()),
    );

    let mut locations = Section::new("Locations");
    locations.entry(
        "home",
        KilnDirs::home_dir().map_or_else(unknown, |d| d.display().to_string()),
    );
    locations.entry("config dir", dirs.config_dir().display().to_string());
    locations.entry("global config", dirs.global_config_path().display().to_string());

    let mut env = Section::new("Environment");
    for var in REPORTED_ENV_VARS {
        env.entry(var, std::env::var(var).unwrap_or_else(|_| "(unset)".to_string()));
    }

    let mut components = Section::new("Components");
    for (label, capability) in [
        ("loggers", Capability::Logger),
        ("listeners", Capability::Listener),
        ("input handlers", Capability::InputHandler),
    ] {
        components.entry(label, registry.identifiers(capability).join(", "));
    }

    let mut checks = vec![check_global_config(dirs), check_temp_dir(), check_on_path()];
    if let Some(dir) = working_dir {
        checks.push(check_build_file(dir));
    }

    DiagnosticsReport {
        version_line: info.version_line(),
        sections: vec![build, system, locations, env, components],
        checks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_check_result_pass() {
        let result = CheckResult::pass("test", Some("detail".to_string()), true);
        assert!(result.passed);
        assert_eq!(result.detail.as_deref(), Some("detail"));
    }

    #[test]
    fn test_check_result_fail() {
        let result = CheckResult::fail("test", "error", Some("suggestion"), false);
        assert!(!result.passed);
        assert_eq!(result.error.as_deref(), Some("error"));
        assert_eq!(result.suggestion.as_deref(), Some("suggestion"));
    }

    #[test]
    fn test_missing_global_config_passes() {
        let dir = TempDir::new().unwrap();
        let dirs = KilnDirs::with_config_dir(dir.path());
        assert!(check_global_config(&dirs).passed);
    }

    #[test]
    fn test_malformed_global_config_fails() {
        let dir = TempDir::new().unwrap();
        let dirs = KilnDirs::with_config_dir(dir.path());
        std::fs::write(dirs.global_config_path(), "[defaults\n").unwrap();
        let check = check_global_config(&dirs);
        assert!(!check.passed);
        assert!(check.required);
    }

    #[test]
    fn test_build_file_check() {
        let dir = TempDir::new().unwrap();
        assert!(!check_build_file(dir.path()).passed);
        std::fs::write(dir.path().join(DEFAULT_BUILD_FILE), "").unwrap();
        assert!(check_build_file(dir.path()).passed);
    }

    #[test]
    fn test_report_lists_components_and_sections() {
        let dir = TempDir::new().unwrap();
        let dirs = KilnDirs::with_config_dir(dir.path());
        let report = run_diagnostics(&dirs, &ComponentRegistry::with_builtins(), Some(dir.path()));
        let text = report.render();

        assert!(text.starts_with("------- kiln diagnostics report -------\nkiln version"));
        for heading in ["Build information", "System", "Locations", "Environment", "Components"] {
            assert!(text.contains(heading), "missing {heading}");
        }
        assert!(text.contains("loggers: default, json, nobanner, silent, timestamped"));
        assert!(text.contains("KILN_CONFIG_DIR: "));
        assert!(report.all_required_passed());
    }
}
