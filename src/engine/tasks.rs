//! Bundled task types
//!
//! Each `[[target.task]]` table is decoded by its `type`. Unknown types are
//! kept so the executor can warn about them, or fail in strict mode.

use serde::Deserialize;

use crate::core::configuration::MessageLevel;
use crate::core::context::EngineContext;
use crate::core::event::BuildEvent;
use crate::core::input::InputRequest;
use crate::engine::buildfile::TaskDef;
use crate::engine::expand::expand;
use crate::error::{BuildFailure, Location};

/// `echo`: log a message
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Echo {
    pub message: String,
    #[serde(default)]
    pub level: MessageLevel,
}

/// `property`: define a property unless it already exists
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SetProperty {
    pub name: String,
    pub value: String,
}

/// `fail`: stop the build
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Fail {
    pub message: String,
    /// Process exit status requested by the failure
    pub status: Option<i32>,
}

/// `input`: ask the input handler and store the answer
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Input {
    pub message: String,
    #[serde(default)]
    pub valid: Vec<String>,
    pub default: Option<String>,
    pub property: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Echo(Echo),
    Property(SetProperty),
    Fail(Fail),
    Input(Input),
    /// Type this engine does not know
    Unknown(String),
}

/// Where a task runs, for events and failure locations
#[derive(Debug, Clone, Copy)]
pub struct TaskSite<'a> {
    pub target: &'a str,
    pub location: &'a Location,
}

impl Task {
    /// Decode a task table
    pub fn from_def(def: &TaskDef) -> Result<Self, toml::de::Error> {
        let params = toml::Value::Table(def.params.clone());
        Ok(match def.kind.as_str() {
            "echo" => Self::Echo(params.try_into()?),
            "property" => Self::Property(params.try_into()?),
            "fail" => Self::Fail(params.try_into()?),
            "input" => Self::Input(params.try_into()?),
            other => Self::Unknown(other.to_string()),
        })
    }

    /// Task type, used as the task name in events
    pub fn kind(&self) -> &str {
        match self {
            Self::Echo(_) => "echo",
            Self::Property(_) => "property",
            Self::Fail(_) => "fail",
            Self::Input(_) => "input",
            Self::Unknown(kind) => kind,
        }
    }

    pub fn execute(&self, ctx: &mut EngineContext, site: TaskSite<'_>) -> anyhow::Result<()> {
        match self {
            Self::Echo(echo) => {
                let message = expand_in(ctx, &echo.message, site)?;
                log(ctx, site, self.kind(), echo.level, &message)?;
            }
            Self::Property(prop) => {
                let value = expand_in(ctx, &prop.value, site)?;
                if !ctx.set_new_property(&prop.name, value) {
                    let note = format!("Override ignored for property \"{}\"", prop.name);
                    log(ctx, site, self.kind(), MessageLevel::Verbose, &note)?;
                }
            }
            Self::Fail(fail) => {
                let message = expand_in(ctx, &fail.message, site)?;
                let failure = match fail.status {
                    Some(status) => BuildFailure::with_status(message, status),
                    None => BuildFailure::new(message),
                };
                return Err(failure.at(site.location.clone()).into());
            }
            Self::Input(input) => {
                if ctx.property(&input.property).is_some() {
                    let note = format!(
                        "skipping input as property {} has already been set.",
                        input.property
                    );
                    log(ctx, site, self.kind(), MessageLevel::Verbose, &note)?;
                    return Ok(());
                }
                let prompt = expand_in(ctx, &input.message, site)?;
                let request = InputRequest::new(prompt)
                    .with_valid_args(input.valid.clone())
                    .with_default(input.default.clone());
                let answer = ctx
                    .request_input(&request)
                    .map_err(|e| e.at(site.location.clone()))?;
                ctx.set_new_property(&input.property, answer);
            }
            Self::Unknown(kind) => {
                let message = format!("Unknown task type '{kind}'");
                if ctx.strict() {
                    return Err(BuildFailure::new(message).at(site.location.clone()).into());
                }
                log(ctx, site, kind, MessageLevel::Warn, &format!("{message} ignored"))?;
            }
        }
        Ok(())
    }
}

fn expand_in(ctx: &EngineContext, text: &str, site: TaskSite<'_>) -> Result<String, BuildFailure> {
    expand(text, |name| ctx.property(name))
        .map_err(|e| BuildFailure::new(e).at(site.location.clone()))
}

fn log(
    ctx: &mut EngineContext,
    site: TaskSite<'_>,
    task: &str,
    level: MessageLevel,
    message: &str,
) -> std::io::Result<()> {
    let event = BuildEvent::message(level, message)
        .in_target(Some(site.target))
        .in_task(Some(task));
    ctx.fire(event)
}
