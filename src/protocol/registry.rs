//! Message registry
//!
//! Indexes one direction's definitions by name and by key. Requests and
//! responses each get their own registry; the two key spaces are
//! independent even where the numeric values coincide.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::error::{DcpError, Result};

use super::message::{CommandKey, MessageDefinition, RequestField, ResponseElement};

/// Registry of request definitions
pub type RequestRegistry = MessageRegistry<RequestField>;

/// Registry of response definitions
pub type ResponseRegistry = MessageRegistry<ResponseElement>;

/// A name or a raw key to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Name(&'a str),
    Key(CommandKey),
}

impl<'a> From<&'a str> for Lookup<'a> {
    fn from(name: &'a str) -> Self {
        Lookup::Name(name)
    }
}

impl<'a> From<&'a String> for Lookup<'a> {
    fn from(name: &'a String) -> Self {
        Lookup::Name(name)
    }
}

impl From<CommandKey> for Lookup<'_> {
    fn from(key: CommandKey) -> Self {
        Lookup::Key(key)
    }
}

/// Read-only index of message definitions
#[derive(Debug, Clone)]
pub struct MessageRegistry<F> {
    by_name: HashMap<String, Arc<MessageDefinition<F>>>,
    by_key: HashMap<CommandKey, Arc<MessageDefinition<F>>>,
}

impl<F> MessageRegistry<F> {
    /// Build a registry, rejecting empty names and duplicate names or keys
    pub fn new(definitions: impl IntoIterator<Item = MessageDefinition<F>>) -> Result<Self> {
        let mut by_name: HashMap<String, Arc<MessageDefinition<F>>> = HashMap::new();
        let mut by_key: HashMap<CommandKey, Arc<MessageDefinition<F>>> = HashMap::new();

        for definition in definitions {
            if definition.name.trim().is_empty() {
                return Err(DcpError::Configuration(format!(
                    "definition with key {} has an empty name",
                    definition.key
                )));
            }
            if by_name.contains_key(&definition.name) {
                return Err(DcpError::Configuration(format!(
                    "duplicate command name {}",
                    definition.name
                )));
            }
            if let Some(existing) = by_key.get(&definition.key) {
                return Err(DcpError::Configuration(format!(
                    "key {} of {} is already used by {}",
                    definition.key, definition.name, existing.name
                )));
            }

            let definition = Arc::new(definition);
            by_key.insert(definition.key, Arc::clone(&definition));
            by_name.insert(definition.name.clone(), definition);
        }

        Ok(Self { by_name, by_key })
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Arc<MessageDefinition<F>>> {
        self.by_name.get(name)
    }

    pub fn get_by_key(&self, key: &CommandKey) -> Option<&Arc<MessageDefinition<F>>> {
        self.by_key.get(key)
    }

    /// Resolve a name or key, failing with a configuration error naming it
    pub fn resolve<'a>(&self, lookup: impl Into<Lookup<'a>>) -> Result<&Arc<MessageDefinition<F>>> {
        match lookup.into() {
            Lookup::Name(name) => self
                .get_by_name(name)
                .ok_or_else(|| DcpError::Configuration(format!("unknown command {}", name))),
            Lookup::Key(key) => self
                .get_by_key(&key)
                .ok_or_else(|| DcpError::Configuration(format!("unknown command key {}", key))),
        }
    }

    /// Sorted command names
    pub fn list_names(&self) -> BTreeSet<&str> {
        self.by_name.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<MessageDefinition<F>>> {
        self.by_name.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::message::RequestDefinition;

    fn def(name: &str, key: [u8; 3]) -> RequestDefinition {
        RequestDefinition::new(name, CommandKey::new(key), vec![RequestField::uuid("uuid")])
    }

    #[test]
    fn test_resolve_by_name_and_key() {
        let registry = MessageRegistry::new(vec![def("A", [1, 1, 0]), def("B", [1, 3, 0])]).unwrap();

        assert_eq!(registry.resolve("B").unwrap().key, CommandKey::new([1, 3, 0]));
        assert_eq!(registry.resolve(CommandKey::new([1, 1, 0])).unwrap().name, "A");
        assert_eq!(registry.list_names().into_iter().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_unknown_is_configuration_error() {
        let registry = MessageRegistry::new(vec![def("A", [1, 1, 0])]).unwrap();
        let err = registry.resolve("Nope").unwrap_err();
        assert!(matches!(err, DcpError::Configuration(ref msg) if msg.contains("Nope")));
        assert!(registry.resolve(CommandKey::new([9, 9, 9])).is_err());
    }

    #[test]
    fn test_rejects_duplicates_and_empty_names() {
        assert!(MessageRegistry::new(vec![def("A", [1, 1, 0]), def("A", [1, 2, 0])]).is_err());
        assert!(MessageRegistry::new(vec![def("A", [1, 1, 0]), def("B", [1, 1, 0])]).is_err());
        assert!(MessageRegistry::new(vec![def(" ", [1, 1, 0])]).is_err());
    }
}
