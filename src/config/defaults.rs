//! Default configuration values

/// Build file assumed when neither `-buildfile` nor `-find` is given
pub const DEFAULT_BUILD_FILE: &str = "build.toml";

/// Suffix of the fallback sibling tried when the build file is absent
pub const DIST_SUFFIX: &str = ".dist";

/// Identifier of the logger used when `-logger` is absent
pub const DEFAULT_LOGGER: &str = "default";

/// Identifier of the logger forced by `-silent`
pub const SILENT_LOGGER: &str = "silent";

/// Identifier of the input handler used when `-inputhandler` is absent
pub const DEFAULT_INPUT_HANDLER: &str = "default";

/// Width of the right-justified `[task]` column in logger output
pub const LEFT_COLUMN_SIZE: usize = 12;

/// Absolute path of the build file
pub const PROP_BUILD_FILE: &str = "kiln.file";

/// Directory holding the build file
pub const PROP_BUILD_FILE_DIR: &str = "kiln.file.dir";

/// Running kiln version
pub const PROP_VERSION: &str = "kiln.version";

/// Comma-separated list of the targets named on the command line
pub const PROP_INVOKED_TARGETS: &str = "kiln.invoked.targets";

/// File the `json` listener writes to
pub const PROP_JSON_FILE: &str = "kiln.json.file";

/// Default for [`PROP_JSON_FILE`]
pub const DEFAULT_JSON_FILE: &str = "kiln-log.json";

/// Properties file consulted by the `properties` input handler
pub const PROP_INPUT_PROPERTIES: &str = "kiln.input.properties";

/// Process exit code for configuration errors and build failures
pub const FAILURE_EXIT_CODE: i32 = 1;
