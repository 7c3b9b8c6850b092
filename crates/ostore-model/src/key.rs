//! Composite identifiers.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use ostore_xml::XmlElement;

use crate::error::{Result, StoreError};

/// One named part of a composite key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct KeyPart {
    name: String,
    value: String,
    assigned: bool,
}

/// An ordered, named composite identifier.
///
/// A key is assigned only when every part is assigned. Equality and hashing
/// use the (name, value) pairs and deliberately exclude the assignment
/// flags, so a freshly constructed object can be matched against its
/// persisted counterpart once the backing store fills in real values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Key {
    parts: Vec<KeyPart>,
}

impl Key {
    /// Create an unassigned key with the given part names.
    pub fn new<I, S>(part_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: part_names
                .into_iter()
                .map(|name| KeyPart {
                    name: name.into(),
                    value: String::new(),
                    assigned: false,
                })
                .collect(),
        }
    }

    /// Create a key with values for every part.
    ///
    /// Fails with [`StoreError::InvalidKeyArity`] when the name and value
    /// slices differ in length.
    pub fn with_values<N, V>(part_names: &[N], values: &[V], assigned: bool) -> Result<Self>
    where
        N: AsRef<str>,
        V: AsRef<str>,
    {
        if part_names.len() != values.len() {
            return Err(StoreError::InvalidKeyArity {
                names: part_names.len(),
                values: values.len(),
            });
        }
        Ok(Self {
            parts: part_names
                .iter()
                .zip(values)
                .map(|(name, value)| KeyPart {
                    name: name.as_ref().to_string(),
                    value: value.as_ref().to_string(),
                    assigned,
                })
                .collect(),
        })
    }

    /// Value of the named part.
    pub fn part(&self, name: &str) -> Result<&str> {
        self.find(name)
            .map(|part| part.value.as_str())
            .ok_or_else(|| StoreError::UnknownKeyPart {
                part: name.to_string(),
            })
    }

    /// Set the named part's value and mark it assigned.
    pub fn set_part(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let part = self
            .parts
            .iter_mut()
            .find(|part| part.name == name)
            .ok_or_else(|| StoreError::UnknownKeyPart {
                part: name.to_string(),
            })?;
        part.value = value.into();
        part.assigned = true;
        Ok(())
    }

    /// True when every part has an assigned value. An empty key is never
    /// assigned.
    pub fn is_assigned(&self) -> bool {
        !self.parts.is_empty() && self.parts.iter().all(|part| part.assigned)
    }

    /// True for the named part only.
    pub fn is_part_assigned(&self, name: &str) -> Result<bool> {
        self.find(name)
            .map(|part| part.assigned)
            .ok_or_else(|| StoreError::UnknownKeyPart {
                part: name.to_string(),
            })
    }

    /// Drop every assignment flag, keeping part names. Used when a copy of
    /// a persisted object becomes a new, unpersisted one.
    pub fn clear_assignment(&mut self) {
        for part in &mut self.parts {
            part.value.clear();
            part.assigned = false;
        }
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|part| part.name.as_str())
    }

    pub fn parts(&self) -> impl Iterator<Item = (&str, &str, bool)> {
        self.parts
            .iter()
            .map(|part| (part.name.as_str(), part.value.as_str(), part.assigned))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Write every assigned part as an attribute on the owning component's
    /// element.
    pub fn write_attributes(&self, element: &mut XmlElement) {
        for part in &self.parts {
            if part.assigned {
                element.set_attribute(part.name.clone(), part.value.clone());
            }
        }
    }

    /// Read part values back from a component element's attributes. Parts
    /// without a matching attribute stay unassigned.
    pub fn read_attributes(&mut self, element: &XmlElement) {
        for part in &mut self.parts {
            if let Some(value) = element.attribute(&part.name) {
                part.value = value.to_string();
                part.assigned = true;
            }
        }
    }

    /// Standalone `<Key>` element, used where a key travels on its own.
    pub fn to_xml(&self) -> XmlElement {
        let mut element = XmlElement::new("Key");
        for part in &self.parts {
            element.add_child(
                XmlElement::new("Part")
                    .with_attribute("name", part.name.clone())
                    .with_attribute("assigned", if part.assigned { "yes" } else { "no" })
                    .with_text(part.value.clone()),
            );
        }
        element
    }

    pub fn from_xml(element: &XmlElement) -> Result<Self> {
        element.expect_name("Key")?;
        let mut parts = Vec::new();
        for child in element.children_named("Part") {
            let name = child.require_attribute("name")?.to_string();
            let assigned = child.attribute("assigned") == Some("yes");
            parts.push(KeyPart {
                name,
                value: child.text().unwrap_or("").to_string(),
                assigned,
            });
        }
        Ok(Self { parts })
    }

    fn find(&self, name: &str) -> Option<&KeyPart> {
        self.parts.iter().find(|part| part.name == name)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.parts.len() == other.parts.len()
            && self
                .parts
                .iter()
                .zip(&other.parts)
                .all(|(a, b)| a.name == b.name && a.value == b.value)
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for part in &self.parts {
            part.name.hash(state);
            part.value.hash(state);
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in &self.parts {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", part.name, part.value)?;
            first = false;
        }
        Ok(())
    }
}
