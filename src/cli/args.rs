//! Argument interpretation
//!
//! Turns the raw argument vector into an [`Invocation`]. Parsing runs in
//! three phases and the order matters:
//!
//! 1. Immediate-exit flags (`-help`, `-version`, `-init`, `-diagnostics`)
//!    short-circuit everything else.
//! 2. Standalone toggles are applied and removed from the vector, so they
//!    can never be read as the value of a later flag.
//! 3. The remaining slots are scanned left to right for valued flags,
//!    `-D` definitions and target names.

use std::path::PathBuf;

use crate::config::defaults::DEFAULT_BUILD_FILE;
use crate::core::configuration::{BuildConfiguration, MessageLevel};
use crate::error::ConfigError;

/// What the command line asks kiln to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Print usage and exit
    Help,
    /// Print the version and exit
    Version,
    /// Write a skeleton build file (default location when `None`)
    Init(Option<PathBuf>),
    /// Print the diagnostics report and exit
    Diagnostics,
    /// Run a build
    Build(BuildConfiguration),
}

/// Parse a raw argument vector (without the program name)
pub fn parse<I, S>(args: I) -> Result<Invocation, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();

    if let Some(invocation) = immediate_action(&args) {
        return Ok(invocation);
    }

    let mut config = BuildConfiguration::default();
    let slots = apply_toggles(args, &mut config);
    scan_slots(Slots::new(slots), &mut config)?;

    Ok(Invocation::Build(config))
}

/// Phase 1: the first immediate-exit flag wins
fn immediate_action(args: &[String]) -> Option<Invocation> {
    for (i, arg) in args.iter().enumerate() {
        match arg.as_str() {
            "-help" | "-h" => return Some(Invocation::Help),
            "-version" | "-v" => return Some(Invocation::Version),
            "-diagnostics" => return Some(Invocation::Diagnostics),
            "-init" | "-i" => {
                let path = args
                    .get(i + 1)
                    .filter(|next| !looks_like_flag(next))
                    .map(PathBuf::from);
                return Some(Invocation::Init(path));
            }
            _ => {}
        }
    }
    None
}

/// Phase 2: apply standalone toggles and blank out their slots
fn apply_toggles(args: Vec<String>, config: &mut BuildConfiguration) -> Vec<Option<String>> {
    args.into_iter()
        .map(|arg| {
            match arg.as_str() {
                "-quiet" | "-q" => config.level = MessageLevel::Warn,
                "-verbose" => config.level = MessageLevel::Verbose,
                "-debug" => config.level = MessageLevel::Debug,
                "-emacs" | "-e" => config.emacs = true,
                "-silent" | "-S" => config.silent = true,
                "-propertyfileoverride" => config.property_file_override = true,
                _ => return Some(arg),
            }
            None
        })
        .collect()
}

/// Argument slots left after phase 2; removed slots are skipped
struct Slots {
    slots: Vec<Option<String>>,
    pos: usize,
}

impl Slots {
    fn new(slots: Vec<Option<String>>) -> Self {
        Self { slots, pos: 0 }
    }

    fn peek(&self) -> Option<&str> {
        self.slots[self.pos..].iter().flatten().next().map(String::as_str)
    }

    fn take_value(&mut self, flag: &str, what: &'static str) -> Result<String, ConfigError> {
        self.next().ok_or_else(|| ConfigError::MissingValue {
            flag: flag.to_string(),
            what,
        })
    }

    /// Take the next token unless it is absent or another flag
    fn take_optional(&mut self) -> Option<String> {
        match self.peek() {
            Some(next) if !looks_like_flag(next) => self.next(),
            _ => None,
        }
    }
}

impl Iterator for Slots {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.pos < self.slots.len() {
            let slot = self.slots[self.pos].take();
            self.pos += 1;
            if slot.is_some() {
                return slot;
            }
        }
        None
    }
}

/// Phase 3: valued flags, definitions and targets
fn scan_slots(mut slots: Slots, config: &mut BuildConfiguration) -> Result<(), ConfigError> {
    while let Some(arg) = slots.next() {
        match arg.as_str() {
            "-logfile" => {
                config.log_file = Some(PathBuf::from(slots.take_value(&arg, "log file")?));
            }
            "-buildfile" | "-file" | "-f" => {
                config.build_file = Some(PathBuf::from(slots.take_value(&arg, "buildfile")?));
            }
            "-listener" => {
                let id = slots.take_value(&arg, "listener identifier")?;
                config.listeners.push(id);
            }
            "-logger" => {
                let id = slots.take_value(&arg, "logger identifier")?;
                if config.logger.is_some() {
                    return Err(ConfigError::DuplicateOption { option: "logger" });
                }
                config.logger = Some(id);
            }
            "-inputhandler" => {
                let id = slots.take_value(&arg, "input handler identifier")?;
                if config.input_handler.is_some() {
                    return Err(ConfigError::DuplicateOption {
                        option: "input handler",
                    });
                }
                config.input_handler = Some(id);
            }
            "-propertyfile" => {
                let path = slots.take_value(&arg, "property file")?;
                config.property_files.push(PathBuf::from(path));
            }
            "-find" => {
                let name = slots
                    .take_optional()
                    .unwrap_or_else(|| DEFAULT_BUILD_FILE.to_string());
                config.search_for = Some(name);
            }
            "-projecthelp" | "-targets" | "-list" | "-l" | "-p" => config.project_help = true,
            "-keep-going" | "-k" => config.keep_going = true,
            "-longtargets" => config.show_long_targets = true,
            "-strict" => config.strict = true,
            "-no-strict" => config.strict = false,
            _ if arg.starts_with("-D") => define_property(&arg[2..], &mut slots, config)?,
            _ if looks_like_flag(&arg) => {
                return Err(ConfigError::UnknownArgument { arg });
            }
            _ => config.targets.push(arg),
        }
    }
    Ok(())
}

/// Handle `-Dname=value`, `-Dname value`, `-D name=value` and `-D name value`
fn define_property(
    rest: &str,
    slots: &mut Slots,
    config: &mut BuildConfiguration,
) -> Result<(), ConfigError> {
    let spec = if rest.is_empty() {
        slots.take_optional().ok_or(ConfigError::MissingPropertyName)?
    } else {
        rest.to_string()
    };

    let (name, value) = match spec.find('=') {
        Some(eq) if eq > 0 => (spec[..eq].to_string(), spec[eq + 1..].to_string()),
        _ => {
            let value = match slots.peek() {
                Some(next) if !next.starts_with("-D") => slots.next(),
                _ => None,
            }
            .ok_or_else(|| ConfigError::MissingPropertyValue { name: spec.clone() })?;
            (spec, value)
        }
    };

    config.user_properties.insert(name, value);
    Ok(())
}

fn looks_like_flag(token: &str) -> bool {
    token.starts_with('-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn build(args: &[&str]) -> BuildConfiguration {
        match parse(args.iter().copied()) {
            Ok(Invocation::Build(config)) => config,
            other => panic!("expected build configuration, got {other:?}"),
        }
    }

    fn error(args: &[&str]) -> ConfigError {
        parse(args.iter().copied()).expect_err("expected configuration error")
    }

    // ============================================
    // Unit Tests
    // ============================================

    #[test]
    fn test_empty_args_mean_default_target() {
        let config = build(&[]);
        assert!(config.targets.is_empty());
        assert_eq!(config.level, MessageLevel::Info);
    }

    #[test]
    fn test_immediate_flags_short_circuit() {
        assert!(parse(["-buildfile"]).is_err());
        assert_eq!(parse(["-buildfile", "-help"]).ok(), Some(Invocation::Help));
        assert_eq!(parse(["compile", "-version"]).ok(), Some(Invocation::Version));
        assert_eq!(parse(["-diagnostics", "-bogus"]).ok(), Some(Invocation::Diagnostics));
    }

    #[test]
    fn test_init_optional_path() {
        assert_eq!(parse(["-init"]).ok(), Some(Invocation::Init(None)));
        assert_eq!(
            parse(["-init", "sub/build.toml"]).ok(),
            Some(Invocation::Init(Some(PathBuf::from("sub/build.toml"))))
        );
        assert_eq!(parse(["-i", "-quiet"]).ok(), Some(Invocation::Init(None)));
    }

    #[test]
    fn test_toggles_are_not_read_as_values() {
        let config = build(&["-logfile", "-quiet", "out.txt", "compile"]);
        assert_eq!(config.log_file, Some(PathBuf::from("out.txt")));
        assert_eq!(config.level, MessageLevel::Warn);
        assert_eq!(config.targets, vec!["compile"]);
    }

    #[test]
    fn test_last_verbosity_toggle_wins() {
        assert_eq!(build(&["-quiet", "-debug"]).level, MessageLevel::Debug);
        assert_eq!(build(&["-verbose", "-q"]).level, MessageLevel::Warn);
    }

    #[test]
    fn test_boolean_toggles() {
        let config = build(&["-e", "-S", "-propertyfileoverride", "-k", "-longtargets"]);
        assert!(config.emacs);
        assert!(config.silent);
        assert!(config.property_file_override);
        assert!(config.keep_going);
        assert!(config.show_long_targets);
    }

    #[test]
    fn test_strict_last_wins() {
        assert!(build(&["-no-strict", "-strict"]).strict);
        assert!(!build(&["-strict", "-no-strict"]).strict);
        assert!(!build(&[]).strict);
    }

    #[test]
    fn test_buildfile_aliases() {
        for flag in ["-buildfile", "-file", "-f"] {
            let config = build(&[flag, "other.toml"]);
            assert_eq!(config.build_file, Some(PathBuf::from("other.toml")));
        }
    }

    #[test]
    fn test_missing_buildfile_value() {
        let err = error(&["compile", "-buildfile"]);
        assert!(matches!(err, ConfigError::MissingValue { ref flag, .. } if flag == "-buildfile"));
    }

    #[test]
    fn test_every_valued_flag_requires_value() {
        for flag in ["-logfile", "-listener", "-logger", "-inputhandler", "-propertyfile"] {
            assert!(
                matches!(error(&[flag]), ConfigError::MissingValue { .. }),
                "{flag} should require a value"
            );
        }
    }

    #[test]
    fn test_listeners_keep_order() {
        let config = build(&["-listener", "tracing", "-listener", "json"]);
        assert_eq!(config.listeners, vec!["tracing", "json"]);
    }

    #[test]
    fn test_second_inputhandler_is_rejected() {
        let err = error(&["-inputhandler", "default", "-inputhandler", "properties"]);
        assert!(matches!(err, ConfigError::DuplicateOption { option: "input handler" }));
    }

    #[test]
    fn test_second_logger_is_rejected() {
        let err = error(&["-logger", "default", "-logger", "json"]);
        assert!(matches!(err, ConfigError::DuplicateOption { option: "logger" }));
    }

    #[test]
    fn test_unknown_flag_is_named() {
        let err = error(&["compile", "-bogus"]);
        assert!(err.to_string().contains("-bogus"));
    }

    #[test]
    fn test_define_forms() {
        let config = build(&[
            "-Done=1", "-Dtwo", "2", "-D", "three=3", "-D", "four", "4", "-Dfive=a=b",
        ]);
        let props = &config.user_properties;
        assert_eq!(props["one"], "1");
        assert_eq!(props["two"], "2");
        assert_eq!(props["three"], "3");
        assert_eq!(props["four"], "4");
        assert_eq!(props["five"], "a=b");
        assert!(config.targets.is_empty());
    }

    #[test]
    fn test_define_empty_value() {
        let config = build(&["-Dname="]);
        assert_eq!(config.user_properties["name"], "");
    }

    #[test]
    fn test_later_define_wins() {
        let config = build(&["-Dx=1", "-Dx=2"]);
        assert_eq!(config.user_properties["x"], "2");
    }

    #[test]
    fn test_define_missing_parts() {
        assert!(matches!(error(&["-Dname"]), ConfigError::MissingPropertyValue { .. }));
        assert!(matches!(error(&["-D"]), ConfigError::MissingPropertyName));
        assert!(matches!(error(&["-D", "-k"]), ConfigError::MissingPropertyName));
        assert!(matches!(error(&["-D", "name"]), ConfigError::MissingPropertyValue { .. }));
        assert!(matches!(
            error(&["-Dfoo", "-Dbar=1"]),
            ConfigError::MissingPropertyValue { name } if name == "foo"
        ));
    }

    #[test]
    fn test_split_definition_value_may_start_with_dash() {
        let config = build(&["-Doffset", "-1", "-Dbar=1"]);
        assert_eq!(config.user_properties["offset"], "-1");
        assert_eq!(config.user_properties["bar"], "1");
    }

    #[test]
    fn test_find_optional_name() {
        assert_eq!(build(&["-find"]).search_for.as_deref(), Some(DEFAULT_BUILD_FILE));
        assert_eq!(build(&["-find", "-k"]).search_for.as_deref(), Some(DEFAULT_BUILD_FILE));
        assert_eq!(
            build(&["-find", "ci.toml", "test"]).search_for.as_deref(),
            Some("ci.toml")
        );
    }

    #[test]
    fn test_projecthelp_aliases() {
        for flag in ["-projecthelp", "-targets", "-list", "-l", "-p"] {
            assert!(build(&[flag]).project_help, "{flag}");
        }
    }

    #[test]
    fn test_property_files_in_order() {
        let config = build(&["-propertyfile", "a.properties", "-propertyfile", "b.properties"]);
        assert_eq!(
            config.property_files,
            vec![PathBuf::from("a.properties"), PathBuf::from("b.properties")]
        );
    }

    // ============================================
    // Property-Based Tests
    // ============================================

    fn target_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_.]{0,12}"
    }

    fn toggle() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just("-quiet"),
            Just("-q"),
            Just("-emacs"),
            Just("-e"),
            Just("-verbose"),
            Just("-debug"),
            Just("-silent"),
            Just("-S"),
            Just("-propertyfileoverride"),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Toggles removed in phase 2 never surface as target names
        #[test]
        fn prop_toggles_never_become_targets(
            targets in proptest::collection::vec(target_name(), 0..6),
            toggles in proptest::collection::vec(toggle(), 0..6),
            seed in any::<u64>(),
        ) {
            let mut args: Vec<String> = targets.clone();
            for (i, t) in toggles.iter().enumerate() {
                let at = ((seed as usize).wrapping_add(i * 7)) % (args.len() + 1);
                args.insert(at, (*t).to_string());
            }

            let parsed = parse(args).expect("toggles and targets always parse");
            let Invocation::Build(config) = parsed else {
                panic!("expected build invocation");
            };
            prop_assert_eq!(config.targets, targets);
        }

        /// The last definition of a name wins
        #[test]
        fn prop_last_define_wins(name in "[a-z]{1,8}", values in proptest::collection::vec("[a-z0-9]{0,6}", 1..5)) {
            let args: Vec<String> = values.iter().map(|v| format!("-D{name}={v}")).collect();
            let Ok(Invocation::Build(config)) = parse(args) else {
                panic!("expected build invocation");
            };
            prop_assert_eq!(config.user_properties.get(&name), values.last());
        }
    }
}
