//! TOML project configuration and target execution

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::configuration::MessageLevel;
use crate::core::context::EngineContext;
use crate::core::event::BuildEvent;
use crate::core::project::{Project, ProjectConfigurator, TargetSummary};
use crate::core::version::check_kiln_version;
use crate::engine::buildfile::{line_of, BuildFile};
use crate::engine::expand::expand;
use crate::engine::graph::TargetGraph;
use crate::engine::tasks::{Task, TaskSite};
use crate::error::{BuildFailure, Location};
use crate::infra::filesystem;

/// Builds [`TomlProject`]s from `build.toml` files
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlConfigurator;

impl ProjectConfigurator for TomlConfigurator {
    fn configure(
        &self,
        build_file: &Path,
        ctx: &mut EngineContext,
    ) -> anyhow::Result<Box<dyn Project>> {
        tracing::debug!(file = %build_file.display(), "configuring project");
        let content = filesystem::read_file(build_file)
            .map_err(|e| BuildFailure::new("Unable to read the build file").caused_by(e))?;
        let project = TomlProject::from_source(&content, build_file, ctx)?;
        Ok(Box::new(project))
    }
}

#[derive(Debug, Clone)]
struct Target {
    name: String,
    description: Option<String>,
    depends: Vec<String>,
    tasks: Vec<Task>,
    location: Location,
}

/// A project read from a build file
#[derive(Debug)]
pub struct TomlProject {
    name: Option<String>,
    description: Option<String>,
    default_target: Option<String>,
    targets: Vec<Target>,
    graph: TargetGraph,
    file: PathBuf,
}

impl TomlProject {
    /// Parse `content`, check `requires` and define the project properties
    pub fn from_source(
        content: &str,
        file: &Path,
        ctx: &mut EngineContext,
    ) -> Result<Self, BuildFailure> {
        let parsed = BuildFile::parse(content, file)?;
        let at_file = || Location::new(file, None);

        if let Some(requires) = &parsed.project.requires {
            check_kiln_version(requires, &file.display().to_string())
                .map_err(|e| BuildFailure::new(e.to_string()).at(at_file()))?;
        }

        ctx.set_project_name(parsed.project.name.clone());
        for (name, value) in &parsed.properties {
            let value = expand(value, |k| ctx.property(k))
                .map_err(|e| BuildFailure::new(e).at(at_file()))?;
            ctx.set_new_property(name, value);
        }

        let mut graph = TargetGraph::new(parsed.project.name.clone().unwrap_or_default());
        let mut targets = Vec::with_capacity(parsed.targets.len());
        for def in parsed.targets {
            let location = Location::new(file, Some(line_of(content, def.name.span().start)));
            let name = def.name.into_inner();
            if graph.contains(&name) {
                return Err(BuildFailure::new(format!("Duplicate target '{name}'")).at(location));
            }

            let tasks = def
                .tasks
                .iter()
                .map(Task::from_def)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| {
                    BuildFailure::new(format!("Invalid task in target '{name}': {}", e.message()))
                        .at(location.clone())
                })?;

            graph.add_target(&name, def.depends.clone());
            targets.push(Target {
                name,
                description: def.description,
                depends: def.depends,
                tasks,
                location,
            });
        }

        Ok(Self {
            name: parsed.project.name,
            description: parsed.project.description,
            default_target: parsed.project.default,
            targets,
            graph,
            file: file.to_path_buf(),
        })
    }

    fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }

    fn run_target(&self, target: &Target, ctx: &mut EngineContext) -> anyhow::Result<()> {
        ctx.fire(BuildEvent::target_started(&target.name))?;
        let result = self.run_tasks(target, ctx);
        ctx.fire(BuildEvent::target_finished(&target.name, result.as_ref().err()))?;
        result
    }

    fn run_tasks(&self, target: &Target, ctx: &mut EngineContext) -> anyhow::Result<()> {
        let site = TaskSite {
            target: &target.name,
            location: &target.location,
        };
        for task in &target.tasks {
            ctx.fire(BuildEvent::task_started(&target.name, task.kind()))?;
            let result = task.execute(ctx, site);
            let failure = result.as_ref().err();
            ctx.fire(BuildEvent::task_finished(&target.name, task.kind(), failure))?;
            result?;
        }
        Ok(())
    }

    /// Run `order`, skipping targets that already ran
    fn run_order(
        &self,
        order: &[String],
        executed: &mut HashSet<String>,
        ctx: &mut EngineContext,
    ) -> Result<(), (String, anyhow::Error)> {
        for name in order {
            if !executed.insert(name.clone()) {
                continue;
            }
            let Some(target) = self.target(name) else {
                continue;
            };
            self.run_target(target, ctx).map_err(|e| (name.clone(), e))?;
        }
        Ok(())
    }
}

impl Project for TomlProject {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn default_target(&self) -> Option<&str> {
        self.default_target.as_deref()
    }

    fn targets(&self) -> Vec<TargetSummary> {
        self.targets
            .iter()
            .map(|t| TargetSummary {
                name: t.name.clone(),
                description: t.description.clone(),
                depends: t.depends.clone(),
            })
            .collect()
    }

    fn execute_targets(
        &mut self,
        targets: &[String],
        ctx: &mut EngineContext,
    ) -> anyhow::Result<()> {
        let requested = if targets.is_empty() {
            let default = self.default_target.clone().ok_or_else(|| {
                BuildFailure::new("No target specified and no default target defined")
                    .at(Location::new(&self.file, None))
            })?;
            vec![default]
        } else {
            targets.to_vec()
        };

        let keep_going = ctx.keep_going();
        let mut executed = HashSet::new();
        let mut failed: HashSet<String> = HashSet::new();
        let mut first_failure: Option<anyhow::Error> = None;

        for name in &requested {
            let order = match self.graph.execution_order(name) {
                Ok(order) => order,
                Err(e) if keep_going => {
                    first_failure.get_or_insert(e.into());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if let Some(blocker) = order.iter().find(|t| failed.contains(*t)) {
                let note =
                    format!("Cannot execute '{name}' - '{blocker}' failed or was not executed.");
                ctx.log(MessageLevel::Error, &note)?;
                continue;
            }

            match self.run_order(&order, &mut executed, ctx) {
                Ok(()) => {}
                Err((target, e)) if keep_going => {
                    tracing::debug!(target_name = %target, "target failed, keep going");
                    failed.insert(target);
                    first_failure.get_or_insert(e);
                }
                Err((_, e)) => return Err(e),
            }
        }

        match first_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
