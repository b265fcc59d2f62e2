//! Engine context
//!
//! The explicit state of one run, handed by reference to component
//! factories and to the execution engine: properties, registered
//! listeners, the input handler and the execution policy flags.

use std::collections::BTreeMap;
use std::io;

use crate::core::configuration::MessageLevel;
use crate::core::event::{BuildEvent, BuildListener, BuildLogger, EventDispatcher};
use crate::core::input::{DefaultInputHandler, InputHandler, InputRequest};
use crate::error::BuildFailure;

/// Name → value property table
pub type Properties = BTreeMap<String, String>;

/// State shared between the orchestrator, components and the engine
pub struct EngineContext {
    user_properties: Properties,
    project_properties: Properties,
    dispatcher: EventDispatcher,
    input_handler: Box<dyn InputHandler>,
    project_name: Option<String>,
    keep_going: bool,
    strict: bool,
}

impl EngineContext {
    pub fn new(user_properties: Properties) -> Self {
        Self {
            user_properties,
            project_properties: Properties::new(),
            dispatcher: EventDispatcher::new(),
            input_handler: Box::new(DefaultInputHandler::stdin()),
            project_name: None,
            keep_going: false,
            strict: false,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, keep_going: bool, strict: bool) -> Self {
        self.keep_going = keep_going;
        self.strict = strict;
        self
    }

    pub fn keep_going(&self) -> bool {
        self.keep_going
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref()
    }

    pub fn set_project_name(&mut self, name: Option<String>) {
        self.project_name = name;
    }

    /// Look a property up; user properties shadow project properties
    pub fn property(&self, name: &str) -> Option<&str> {
        self.user_properties
            .get(name)
            .or_else(|| self.project_properties.get(name))
            .map(String::as_str)
    }

    /// Set a user property, overwriting any previous value
    pub fn set_user_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.user_properties.insert(name.into(), value.into());
    }

    /// Set a project property unless a property of that name exists
    ///
    /// Returns whether the value was stored.
    pub fn set_new_property(&mut self, name: &str, value: impl Into<String>) -> bool {
        if self.property(name).is_some() {
            return false;
        }
        self.project_properties.insert(name.to_string(), value.into());
        true
    }

    /// All visible properties
    pub fn properties(&self) -> Properties {
        let mut all = self.project_properties.clone();
        all.extend(self.user_properties.clone());
        all
    }

    pub fn add_listener(&mut self, listener: Box<dyn BuildListener>) {
        self.dispatcher.add_listener(listener);
    }

    pub fn add_logger(&mut self, logger: Box<dyn BuildLogger>) {
        self.dispatcher.add_logger(logger);
    }

    pub fn listener_count(&self) -> usize {
        self.dispatcher.len()
    }

    pub fn set_input_handler(&mut self, handler: Box<dyn InputHandler>) {
        self.input_handler = handler;
    }

    /// Deliver an event to every listener, tagged with the project name
    pub fn fire(&mut self, event: BuildEvent<'_>) -> io::Result<()> {
        let event = event.in_project(self.project_name.as_deref());
        self.dispatcher.fire(&event)
    }

    /// Log a message outside any target or task
    pub fn log(&mut self, level: MessageLevel, message: &str) -> io::Result<()> {
        self.fire(BuildEvent::message(level, message))
    }

    /// Ask the input handler
    pub fn request_input(&mut self, request: &InputRequest) -> Result<String, BuildFailure> {
        self.input_handler.handle_input(request)
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("user_properties", &self.user_properties)
            .field("project_properties", &self.project_properties)
            .field("dispatcher", &self.dispatcher)
            .field("project_name", &self.project_name)
            .field("keep_going", &self.keep_going)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_properties_shadow_project_properties() {
        let mut ctx = EngineContext::new(Properties::from([("x".to_string(), "user".to_string())]));
        assert!(!ctx.set_new_property("x", "project"));
        assert!(ctx.set_new_property("y", "project"));
        assert!(!ctx.set_new_property("y", "again"));
        assert_eq!(ctx.property("x"), Some("user"));
        assert_eq!(ctx.property("y"), Some("project"));
        assert_eq!(ctx.properties().len(), 2);
    }

    #[test]
    fn test_policy_flags() {
        let ctx = EngineContext::new(Properties::new()).with_policy(true, false);
        assert!(ctx.keep_going());
        assert!(!ctx.strict());
    }
}
