use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use log::debug;
use once_cell::sync::OnceCell;

use crate::error::ConfigurationError;

use super::handler::AuthorizationHandler;

pub type HandlerFactory = Box<dyn Fn() -> Result<Arc<dyn AuthorizationHandler>> + Send + Sync>;

enum HandlerEntry {
    Concrete(HandlerFactory),
    /// A name guards may refer to, but that has nothing to build. Resolves to
    /// the default handler.
    Abstract,
}

/// Resolves the authorization handler a guard should use.
///
/// Guards name a handler by key. Keys map to factories registered at startup;
/// guards without a key get the default handler.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: HashMap<String, HandlerEntry>,
    default: OnceCell<Arc<dyn AuthorizationHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory building a fresh handler for every resolution.
    ///
    /// # Arguments
    /// * `name` - The key guards use in their `handler` option
    /// * `factory` - Builds the handler; its error is reported as
    ///   [`ConfigurationError::CreateHandler`]
    pub fn register<F>(&mut self, name: impl ToString, factory: F)
    where
        F: Fn() -> Result<Arc<dyn AuthorizationHandler>> + Send + Sync + 'static,
    {
        self.entries
            .insert(name.to_string(), HandlerEntry::Concrete(Box::new(factory)));
    }

    /// Registers a shared handler instance under `name`.
    pub fn register_shared(&mut self, name: impl ToString, handler: Arc<dyn AuthorizationHandler>) {
        self.register(name, move || Ok(handler.clone()));
    }

    pub fn register_abstract(&mut self, name: impl ToString) {
        self.entries.insert(name.to_string(), HandlerEntry::Abstract);
    }

    /// Sets the default handler. It can only be set once.
    pub fn set_default(&self, handler: Arc<dyn AuthorizationHandler>) -> Result<()> {
        self.default
            .set(handler)
            .map_err(|_| ConfigurationError::DefaultHandlerAlreadySet)?;
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the handler named by `explicit`, or the default handler.
    ///
    /// # Errors
    /// A [`ConfigurationError`] if the named handler is unknown or cannot be
    /// built, or if the default is needed but was never set.
    pub fn resolve(&self, explicit: Option<&str>) -> Result<Arc<dyn AuthorizationHandler>> {
        if let Some(name) = explicit {
            match self.entries.get(name) {
                Some(HandlerEntry::Concrete(factory)) => {
                    debug!("Create authorization handler '{name}'");
                    return factory().map_err(|e| {
                        ConfigurationError::CreateHandler {
                            name: name.to_string(),
                            reason: format!("{e:#}"),
                        }
                        .into()
                    });
                }
                Some(HandlerEntry::Abstract) => {
                    debug!("Authorization handler '{name}' is abstract, use default");
                }
                None => return Err(ConfigurationError::UnknownHandler(name.to_string()).into()),
            }
        }

        match self.default.get() {
            Some(handler) => Ok(handler.clone()),
            None => Err(ConfigurationError::NoDefaultHandler.into()),
        }
    }
}
