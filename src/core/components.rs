//! Component resolution
//!
//! Loggers, listeners and input handlers are named on the command line by
//! identifier. The registry maps identifiers to factories and checks that
//! the resolved component has the capability the call site needs. Every
//! failure is a configuration error naming the identifier.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{anyhow, Context};

use crate::config::defaults::{DEFAULT_JSON_FILE, PROP_INPUT_PROPERTIES, PROP_JSON_FILE};
use crate::core::context::EngineContext;
use crate::core::event::{BuildListener, BuildLogger};
use crate::core::input::{
    DefaultInputHandler, InputHandler, NonInteractiveInputHandler, PropertyFileInputHandler,
};
use crate::core::listeners::{JsonLogger, TracingListener};
use crate::core::logger::{BannerStyle, EventLogger};
use crate::error::ConfigError;

pub type LoggerFactory = Box<dyn Fn(&EngineContext) -> anyhow::Result<Box<dyn BuildLogger>>>;
pub type ListenerFactory = Box<dyn Fn(&EngineContext) -> anyhow::Result<Box<dyn BuildListener>>>;
pub type InputHandlerFactory =
    Box<dyn Fn(&EngineContext) -> anyhow::Result<Box<dyn InputHandler>>>;

/// Capability a call site requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Logger,
    Listener,
    InputHandler,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logger => "logger",
            Self::Listener => "listener",
            Self::InputHandler => "input handler",
        }
    }
}

#[derive(Default)]
struct Entry {
    logger: Option<LoggerFactory>,
    /// Logger only works once output streams are wired
    needs_streams: bool,
    listener: Option<ListenerFactory>,
    input_handler: Option<InputHandlerFactory>,
}

impl Entry {
    fn provides(&self, capability: Capability) -> bool {
        match capability {
            Capability::Logger => self.logger.is_some(),
            Capability::Listener => self.listener.is_some(),
            Capability::InputHandler => self.input_handler.is_some(),
        }
    }
}

/// Identifier → factory registry
#[derive(Default)]
pub struct ComponentRegistry {
    entries: BTreeMap<String, Entry>,
}

impl ComponentRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every bundled component
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        for (id, style) in [
            ("default", BannerStyle::Standard),
            ("nobanner", BannerStyle::NoBanner),
            ("timestamped", BannerStyle::Timestamped),
            ("silent", BannerStyle::Silent),
        ] {
            registry.register_logger(id, true, move |_| Ok(Box::new(EventLogger::new(style))));
        }

        registry.register_logger("json", false, |_| Ok(Box::new(JsonLogger::new())));
        registry.register_listener("json", |ctx| {
            let path = PathBuf::from(ctx.property(PROP_JSON_FILE).unwrap_or(DEFAULT_JSON_FILE));
            let logger = JsonLogger::to_file(&path)
                .with_context(|| format!("cannot open {}", path.display()))?;
            Ok(Box::new(logger))
        });
        registry.register_listener("tracing", |_| Ok(Box::new(TracingListener)));

        registry.register_input_handler("default", |_| Ok(Box::new(DefaultInputHandler::stdin())));
        registry.register_input_handler("properties", |ctx| {
            let path = ctx
                .property(PROP_INPUT_PROPERTIES)
                .ok_or_else(|| anyhow!("property {PROP_INPUT_PROPERTIES} must be set"))?;
            Ok(Box::new(PropertyFileInputHandler::new(path)))
        });
        registry.register_input_handler("noninteractive", |_| {
            Ok(Box::new(NonInteractiveInputHandler))
        });

        registry
    }

    /// Register a logger; `needs_streams` loggers are refused as listeners
    pub fn register_logger<F>(&mut self, id: &str, needs_streams: bool, factory: F)
    where
        F: Fn(&EngineContext) -> anyhow::Result<Box<dyn BuildLogger>> + 'static,
    {
        let entry = self.entries.entry(id.to_string()).or_default();
        entry.logger = Some(Box::new(factory));
        entry.needs_streams = needs_streams;
    }

    pub fn register_listener<F>(&mut self, id: &str, factory: F)
    where
        F: Fn(&EngineContext) -> anyhow::Result<Box<dyn BuildListener>> + 'static,
    {
        self.entries.entry(id.to_string()).or_default().listener = Some(Box::new(factory));
    }

    pub fn register_input_handler<F>(&mut self, id: &str, factory: F)
    where
        F: Fn(&EngineContext) -> anyhow::Result<Box<dyn InputHandler>> + 'static,
    {
        self.entries.entry(id.to_string()).or_default().input_handler = Some(Box::new(factory));
    }

    /// Identifiers providing `capability`, sorted
    pub fn identifiers(&self, capability: Capability) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.provides(capability))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Resolve the run's logger
    pub fn logger(
        &self,
        id: &str,
        ctx: &EngineContext,
    ) -> Result<Box<dyn BuildLogger>, ConfigError> {
        let entry = self.entry(id, Capability::Logger)?;
        let factory = entry
            .logger
            .as_ref()
            .ok_or_else(|| lacks(id, Capability::Logger))?;
        tracing::debug!(id, "resolving logger");
        factory(ctx).map_err(|e| failed(id, Capability::Logger, &e))
    }

    /// Resolve a listener; stream-wired loggers are rejected
    pub fn listener(
        &self,
        id: &str,
        ctx: &EngineContext,
    ) -> Result<Box<dyn BuildListener>, ConfigError> {
        let entry = self.entry(id, Capability::Listener)?;
        if entry.logger.is_some() && entry.needs_streams {
            return Err(ConfigError::Component {
                id: id.to_string(),
                kind: Capability::Listener.as_str(),
                reason: "it is a logger that requires output streams, not a plain listener"
                    .to_string(),
            });
        }
        let factory = entry
            .listener
            .as_ref()
            .ok_or_else(|| lacks(id, Capability::Listener))?;
        tracing::debug!(id, "resolving listener");
        factory(ctx).map_err(|e| failed(id, Capability::Listener, &e))
    }

    /// Resolve the run's input handler
    pub fn input_handler(
        &self,
        id: &str,
        ctx: &EngineContext,
    ) -> Result<Box<dyn InputHandler>, ConfigError> {
        let entry = self.entry(id, Capability::InputHandler)?;
        let factory = entry
            .input_handler
            .as_ref()
            .ok_or_else(|| lacks(id, Capability::InputHandler))?;
        tracing::debug!(id, "resolving input handler");
        factory(ctx).map_err(|e| failed(id, Capability::InputHandler, &e))
    }

    fn entry(&self, id: &str, capability: Capability) -> Result<&Entry, ConfigError> {
        self.entries.get(id).ok_or_else(|| ConfigError::Component {
            id: id.to_string(),
            kind: capability.as_str(),
            reason: "no such component is registered".to_string(),
        })
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("ids", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn lacks(id: &str, capability: Capability) -> ConfigError {
    ConfigError::Component {
        id: id.to_string(),
        kind: capability.as_str(),
        reason: format!("it does not provide the {} capability", capability.as_str()),
    }
}

fn failed(id: &str, capability: Capability, error: &anyhow::Error) -> ConfigError {
    ConfigError::Component {
        id: id.to_string(),
        kind: capability.as_str(),
        reason: format!("{error:#}"),
    }
}
