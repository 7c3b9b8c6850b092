//! Item locators: the endpoint addresses relationships connect.

use std::fmt;

use serde::{Deserialize, Serialize};

use ostore_model::Key;
use ostore_xml::XmlElement;

use crate::error::{FilterError, Result};

/// Key part name for the content identifier.
pub const CONTENT_ID_PART: &str = "CONTENTID";
/// Key part name for the revision.
pub const REVISION_PART: &str = "REVISIONID";

/// Address of one item endpoint: content id plus an optional revision.
/// A revisionless locator addresses the item independent of revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemLocator {
    content_id: u64,
    revision: Option<u32>,
}

impl ItemLocator {
    pub fn new(content_id: u64) -> Self {
        Self {
            content_id,
            revision: None,
        }
    }

    pub fn with_revision(content_id: u64, revision: u32) -> Self {
        Self {
            content_id,
            revision: Some(revision),
        }
    }

    pub fn content_id(&self) -> u64 {
        self.content_id
    }

    pub fn revision(&self) -> Option<u32> {
        self.revision
    }

    /// True when both locators address the same item, ignoring revision.
    pub fn same_item(&self, other: &ItemLocator) -> bool {
        self.content_id == other.content_id
    }

    /// Composite-key form, for callers that join against component keys.
    pub fn to_key(&self) -> Key {
        let mut key = Key::new([CONTENT_ID_PART, REVISION_PART]);
        // Both parts were just created; set_part cannot fail.
        let _ = key.set_part(CONTENT_ID_PART, self.content_id.to_string());
        if let Some(revision) = self.revision {
            let _ = key.set_part(REVISION_PART, revision.to_string());
        }
        key
    }

    pub fn from_key(key: &Key) -> Result<Self> {
        let raw_id = key
            .part(CONTENT_ID_PART)
            .map_err(|_| FilterError::InvalidArgument {
                field: "key".to_string(),
                message: format!("missing {CONTENT_ID_PART} part"),
            })?;
        let content_id = raw_id.parse().map_err(|_| FilterError::InvalidArgument {
            field: CONTENT_ID_PART.to_string(),
            message: format!("not a number: {raw_id}"),
        })?;
        let revision = match key.part(REVISION_PART) {
            Ok(raw) if !raw.is_empty() => {
                Some(raw.parse().map_err(|_| FilterError::InvalidArgument {
                    field: REVISION_PART.to_string(),
                    message: format!("not a number: {raw}"),
                })?)
            }
            _ => None,
        };
        Ok(Self {
            content_id,
            revision,
        })
    }

    pub fn to_xml(&self) -> XmlElement {
        let mut element =
            XmlElement::new("Locator").with_attribute("contentId", self.content_id.to_string());
        if let Some(revision) = self.revision {
            element.set_attribute("revision", revision.to_string());
        }
        element
    }

    pub fn from_xml(element: &XmlElement) -> Result<Self> {
        element.expect_name("Locator")?;
        let content_id = element.parse_attribute("contentId")?;
        let revision = match element.attribute("revision") {
            Some(_) => Some(element.parse_attribute("revision")?),
            None => None,
        };
        Ok(Self {
            content_id,
            revision,
        })
    }
}

impl fmt::Display for ItemLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.revision {
            Some(revision) => write!(f, "{}/{revision}", self.content_id),
            None => write!(f, "{}", self.content_id),
        }
    }
}
