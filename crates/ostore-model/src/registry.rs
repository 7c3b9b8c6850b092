//! Explicit member factories for collection restore.
//!
//! The original design instantiated collection members reflectively from a
//! class-name string; here the caller registers a factory per node name
//! and unknown tags fail with a typed error instead of a loading failure.

use std::collections::BTreeMap;

use ostore_xml::XmlElement;

use crate::error::{Result, StoreError};

/// Builds one member from its serialized element.
pub type MemberFactory<T> = fn(&XmlElement) -> Result<T>;

/// Maps XML node names to member factories.
///
/// Used by collection `from_xml_with` restore when members of several
/// concrete tags map into one member type (usually an enum).
#[derive(Debug, Clone)]
pub struct MemberRegistry<T> {
    factories: BTreeMap<String, MemberFactory<T>>,
}

impl<T> MemberRegistry<T> {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, node_name: impl Into<String>, factory: MemberFactory<T>) {
        self.factories.insert(node_name.into(), factory);
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, node_name: impl Into<String>, factory: MemberFactory<T>) -> Self {
        self.register(node_name, factory);
        self
    }

    pub fn is_registered(&self, node_name: &str) -> bool {
        self.factories.contains_key(node_name)
    }

    /// Build a member from `element`, failing with
    /// [`StoreError::UnknownMemberType`] for unregistered tags.
    pub fn build(&self, element: &XmlElement) -> Result<T> {
        match self.factories.get(element.name()) {
            Some(factory) => factory(element),
            None => Err(StoreError::UnknownMemberType {
                node: element.name().to_string(),
            }),
        }
    }
}

impl<T> Default for MemberRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
