//! Target dependency resolution
//!
//! Computes the order targets run in and detects dependency cycles.

use std::collections::{HashMap, HashSet};

use crate::error::BuildFailure;

/// Dependency graph of a project's targets
#[derive(Debug, Default)]
pub struct TargetGraph {
    /// Adjacency list: target -> dependencies, in declaration order
    edges: HashMap<String, Vec<String>>,
    project: String,
}

impl TargetGraph {
    /// Create an empty graph for `project` (used in error messages)
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            edges: HashMap::new(),
            project: project.into(),
        }
    }

    /// Add a target to the graph
    pub fn add_target(&mut self, name: &str, dependencies: Vec<String>) {
        self.edges.insert(name.to_string(), dependencies);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    /// Targets needed to run `root`, dependencies first, `root` last
    pub fn execution_order(&self, root: &str) -> Result<Vec<String>, BuildFailure> {
        let mut visited = HashSet::new();
        let mut result = Vec::new();
        let mut path = Vec::new();
        self.visit(root, None, &mut visited, &mut result, &mut path)?;
        Ok(result)
    }

    /// Every target `root` runs, including itself
    pub fn closure(&self, root: &str) -> Result<HashSet<String>, BuildFailure> {
        Ok(self.execution_order(root)?.into_iter().collect())
    }

    fn visit(
        &self,
        node: &str,
        required_by: Option<&str>,
        visited: &mut HashSet<String>,
        result: &mut Vec<String>,
        path: &mut Vec<String>,
    ) -> Result<(), BuildFailure> {
        if let Some(start) = path.iter().position(|p| p == node) {
            let mut cycle = path[start..].to_vec();
            cycle.push(node.to_string());
            return Err(BuildFailure::new(format!(
                "Circular dependency: {}",
                cycle.join(" <- ")
            )));
        }

        if visited.contains(node) {
            return Ok(());
        }

        let Some(deps) = self.edges.get(node) else {
            let mut message = format!(
                "Target \"{node}\" does not exist in the project \"{}\".",
                self.project
            );
            if let Some(parent) = required_by {
                message.push_str(&format!(" It is used from target \"{parent}\"."));
            }
            return Err(BuildFailure::new(message));
        };

        path.push(node.to_string());
        for dep in deps {
            self.visit(dep, Some(node), visited, result, path)?;
        }
        path.pop();

        visited.insert(node.to_string());
        result.push(node.to_string());

        Ok(())
    }
}
