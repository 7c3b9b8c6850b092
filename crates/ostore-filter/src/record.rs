//! The relationship record shape a filter is evaluated against.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{ObjectType, RelationshipCategory, RelationshipKind};
use crate::locator::ItemLocator;

/// One stored relationship row, as the relationship processor sees it.
///
/// The revision-status and community booleans are resolved by the store
/// when the record is loaded; the filter itself stays database-free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub id: u64,
    pub name: String,
    pub category: RelationshipCategory,
    pub kind: RelationshipKind,
    pub owner: ItemLocator,
    pub dependent: ItemLocator,
    pub owner_content_type_id: u64,
    pub dependent_content_type_id: u64,
    pub owner_object_type: ObjectType,
    pub dependent_object_type: ObjectType,
    pub properties: BTreeMap<String, String>,
    /// Owner revision is the item's edit revision, or its current revision
    /// if not checked out.
    pub owner_is_edit_or_current_revision: bool,
    /// Owner revision is the item's tip (head) revision.
    pub owner_is_tip_revision: bool,
    /// Owner revision is the item's last public revision.
    pub owner_is_public_revision: bool,
    /// False when community filtering should hide this record from the
    /// caller.
    pub visible_to_community: bool,
}

impl RelationshipRecord {
    /// A record with the given endpoints and defaults everywhere else.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        category: RelationshipCategory,
        kind: RelationshipKind,
        owner: ItemLocator,
        dependent: ItemLocator,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            kind,
            owner,
            dependent,
            owner_content_type_id: 0,
            dependent_content_type_id: 0,
            owner_object_type: ObjectType::Item,
            dependent_object_type: ObjectType::Item,
            properties: BTreeMap::new(),
            owner_is_edit_or_current_revision: true,
            owner_is_tip_revision: true,
            owner_is_public_revision: false,
            visible_to_community: true,
        }
    }
}
