//! Build file (build.toml) model
//!
//! ```toml
//! [project]
//! name = "demo"
//! default = "build"
//!
//! [properties]
//! out = "target"
//!
//! [[target]]
//! name = "build"
//! depends = ["prepare"]
//!
//! [[target.task]]
//! type = "echo"
//! message = "building into ${out}"
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{BuildFailure, Location};
use crate::infra::filesystem;

/// A parsed build file
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BuildFile {
    /// Project section
    #[serde(default)]
    pub project: ProjectSection,

    /// Project properties; user properties take precedence
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// Targets, in file order
    #[serde(default, rename = "target")]
    pub targets: Vec<TargetDef>,
}

/// `[project]`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    pub name: Option<String>,

    /// Target run when none is requested
    pub default: Option<String>,

    pub description: Option<String>,

    /// Semver constraint the running kiln must satisfy
    pub requires: Option<String>,
}

/// `[[target]]`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TargetDef {
    pub name: toml::Spanned<String>,

    pub description: Option<String>,

    #[serde(default)]
    pub depends: Vec<String>,

    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskDef>,
}

/// `[[target.task]]`; parameters are decoded per task type at run time
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaskDef {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(flatten)]
    pub params: toml::Table,
}

impl BuildFile {
    /// Read and parse a build file
    pub fn load(path: &Path) -> Result<Self, BuildFailure> {
        let content = filesystem::read_file(path)
            .map_err(|e| BuildFailure::new("Unable to read the build file").caused_by(e))?;
        Self::parse(&content, path)
    }

    /// Parse build-file text; `path` is only used for locations
    pub fn parse(content: &str, path: &Path) -> Result<Self, BuildFailure> {
        toml::from_str(content).map_err(|e| {
            let line = e.span().map(|span| line_of(content, span.start));
            BuildFailure::new(format!("Invalid build file: {}", e.message()))
                .at(Location::new(path, line))
        })
    }
}

/// 1-based line holding byte `offset`
pub fn line_of(content: &str, offset: usize) -> usize {
    let end = offset.min(content.len());
    content.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[project]
name = "demo"
default = "build"
requires = ">=0.1"

[properties]
out = "target"

[[target]]
name = "prepare"

[[target]]
name = "build"
description = "Build everything"
depends = ["prepare"]

[[target.task]]
type = "echo"
message = "into ${out}"
"#;

    #[test]
    fn test_parse_sample() {
        let file = BuildFile::parse(SAMPLE, Path::new("build.toml")).unwrap();
        assert_eq!(file.project.name.as_deref(), Some("demo"));
        assert_eq!(file.project.default.as_deref(), Some("build"));
        assert_eq!(file.properties["out"], "target");
        assert_eq!(file.targets.len(), 2);

        let build = &file.targets[1];
        assert_eq!(build.name.get_ref(), "build");
        assert_eq!(build.depends, vec!["prepare"]);
        assert_eq!(build.tasks[0].kind, "echo");
        assert_eq!(build.tasks[0].params["message"].as_str(), Some("into ${out}"));
    }

    #[test]
    fn test_target_name_span_gives_line() {
        let file = BuildFile::parse(SAMPLE, Path::new("build.toml")).unwrap();
        let span = file.targets[1].name.span();
        assert_eq!(line_of(SAMPLE, span.start), 14);
    }

    #[test]
    fn test_empty_file_is_valid() {
        let file = BuildFile::parse("", Path::new("build.toml")).unwrap();
        assert!(file.targets.is_empty());
        assert_eq!(file.project, ProjectSection::default());
    }

    #[test]
    fn test_syntax_error_is_located() {
        let err = BuildFile::parse("[project]\nname = \n", Path::new("build.toml")).unwrap_err();
        assert_eq!(err.location().and_then(|l| l.line), Some(2));
        assert!(err.to_string().starts_with("build.toml:2: Invalid build file"));
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        assert!(BuildFile::parse("[bogus]\n", Path::new("build.toml")).is_err());
    }
}
