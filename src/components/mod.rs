use std::{collections::HashMap, sync::Arc};

use serenity::all::{ComponentInteraction, Context, Permissions};

use crate::error::RegistryError;

pub mod ticket;

/// Static metadata for a message component such as a button
#[derive(Clone, Debug)]
pub struct ComponentDescriptor {
    /// Stable id; instances may append `:<payload>` to it
    pub custom_id: &'static str,
    pub required_permissions: Permissions,
}

#[serenity::async_trait]
pub trait ComponentHandler: Send + Sync {
    fn descriptor(&self) -> &ComponentDescriptor;
    async fn run(&self, ctx: &Context, cmp: &ComponentInteraction) -> anyhow::Result<()>;
}

/// Splits `prefix:payload` custom ids; ids without a payload return `None` for it.
pub fn split_custom_id(custom_id: &str) -> (&str, Option<&str>) {
    match custom_id.split_once(':') {
        Some((prefix, payload)) => (prefix, Some(payload)),
        None => (custom_id, None),
    }
}

#[derive(Default, Clone)]
pub struct ComponentRegistry {
    handlers: HashMap<&'static str, Arc<dyn ComponentHandler>>,
}

impl ComponentRegistry {
    pub fn register(&mut self, handler: Arc<dyn ComponentHandler>) -> Result<(), RegistryError> {
        let id = handler.descriptor().custom_id;
        if self.handlers.contains_key(id) {
            return Err(RegistryError::DuplicateComponent(id.to_string()));
        }
        self.handlers.insert(id, handler);
        Ok(())
    }

    pub fn get(&self, custom_id: &str) -> Option<Arc<dyn ComponentHandler>> {
        let (prefix, _) = split_custom_id(custom_id);
        self.handlers.get(prefix).cloned()
    }
}
