//! Closed enumerations used by relationship filters and records.
//!
//! All of these parse case-insensitively; serialized labels are the
//! lowercase canonical form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Reserved name of the only relationship in the folder category.
pub const FOLDER_CONTENT_NAME: &str = "FolderContent";

/// Category a relationship configuration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipCategory {
    ActiveAssembly,
    NewCopy,
    Promotable,
    Translation,
    Folder,
    Widget,
}

impl RelationshipCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipCategory::ActiveAssembly => "activeassembly",
            RelationshipCategory::NewCopy => "newcopy",
            RelationshipCategory::Promotable => "promotable",
            RelationshipCategory::Translation => "translation",
            RelationshipCategory::Folder => "folder",
            RelationshipCategory::Widget => "widget",
        }
    }
}

impl fmt::Display for RelationshipCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "activeassembly" => Ok(RelationshipCategory::ActiveAssembly),
            "newcopy" => Ok(RelationshipCategory::NewCopy),
            "promotable" => Ok(RelationshipCategory::Promotable),
            "translation" => Ok(RelationshipCategory::Translation),
            "folder" => Ok(RelationshipCategory::Folder),
            "widget" => Ok(RelationshipCategory::Widget),
            other => Err(format!("unknown relationship category: {other}")),
        }
    }
}

/// The two relationship-type buckets: shipped system configurations and
/// user-defined ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    System,
    User,
}

impl RelationshipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::System => "system",
            RelationshipKind::User => "user",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(RelationshipKind::System),
            "user" => Ok(RelationshipKind::User),
            other => Err(format!("unknown relationship kind: {other}")),
        }
    }
}

/// What kind of object an endpoint refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    Item,
    Folder,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Item => "item",
            ObjectType::Folder => "folder",
        }
    }

    /// Numeric code used by the backing store.
    pub fn code(&self) -> u8 {
        match self {
            ObjectType::Item => 1,
            ObjectType::Folder => 2,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "item" | "1" => Ok(ObjectType::Item),
            "folder" | "2" => Ok(ObjectType::Folder),
            other => Err(format!("unknown object type: {other}")),
        }
    }
}
