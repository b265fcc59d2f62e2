//! `kiln -help`

/// Usage text printed by `-help`
pub const USAGE: &str = "\
kiln [options] [target [target2 [target3] ...]]
Options:
  -help, -h                  print this message and exit
  -projecthelp, -p           print project help information and exit
    -targets, -list, -l
  -longtargets               with -projecthelp, also show target dependencies
  -version, -v               print the version information and exit
  -diagnostics               print information that might be helpful to
                             diagnose or report problems and exit
  -init, -i [file]           write a skeleton build file (default build.toml)
  -quiet, -q                 be extra quiet
  -silent, -S                print nothing but task outputs and build failures
  -verbose                   be extra verbose
  -debug                     print debugging information
  -emacs, -e                 produce logging information without adornments
  -logfile <file>            use given file for log
  -logger <id>               the component to perform logging
  -listener <id>             add a component as a project listener
  -buildfile <file>          use given build file
    -file <file>
    -f <file>
  -D<property>=<value>       use value for given property
  -keep-going, -k            execute all targets that do not depend
                             on failed target(s)
  -propertyfile <name>       load all properties from file with -D
                             properties taking precedence
  -propertyfileoverride      let property files override -D properties
  -inputhandler <id>         the component which will handle input requests
  -find [file]               search for build file towards the root of the
                             filesystem and use it
  -strict                    fail on unknown task types
  -no-strict                 warn on unknown task types (default)

Components: loggers default, nobanner, timestamped, silent, json;
listeners json, tracing; input handlers default, properties, noninteractive.";

/// Print usage to stdout
pub fn execute() -> anyhow::Result<()> {
    println!("{USAGE}");
    Ok(())
}
