//! The declarative relationship filter combinator.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use ostore_xml::{XmlElement, XmlError};

use crate::enums::{FOLDER_CONTENT_NAME, ObjectType, RelationshipCategory, RelationshipKind};
use crate::error::{FilterError, Result};
use crate::locator::ItemLocator;
use crate::record::RelationshipRecord;

/// Root element name of the serialized filter.
pub const NODE_NAME: &str = "RelationshipFilter";

/// A set of optional criteria over relationship records.
///
/// The category, name and type criteria form one OR group: a record passes
/// the group if it matches any of the ones actually set (an entirely unset
/// group passes everything). Every other set criterion must match
/// individually; the whole filter is the AND of the group and those.
///
/// Mutually exclusive pairs are enforced at the setter, check-then-set:
/// owner vs dependent content type id, owner vs dependent object type, and
/// the dependent-side pair of both against the edit-or-current and tip
/// revision limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipFilter {
    relationship_id: Option<u64>,
    names: BTreeSet<String>,
    category: Option<RelationshipCategory>,
    kind: Option<RelationshipKind>,
    owner: Option<ItemLocator>,
    dependents: Vec<ItemLocator>,
    owner_content_type_id: Option<u64>,
    dependent_content_type_id: Option<u64>,
    owner_object_type: Option<ObjectType>,
    dependent_object_type: Option<ObjectType>,
    properties: BTreeMap<String, String>,
    limit_to_owner_revision: bool,
    limit_to_edit_or_current_owner_revision: bool,
    limit_to_tip_revision: bool,
    limit_to_public_revision: bool,
    community_filtering: bool,
}

impl Default for RelationshipFilter {
    fn default() -> Self {
        Self {
            relationship_id: None,
            names: BTreeSet::new(),
            category: None,
            kind: None,
            owner: None,
            dependents: Vec::new(),
            owner_content_type_id: None,
            dependent_content_type_id: None,
            owner_object_type: None,
            dependent_object_type: None,
            properties: BTreeMap::new(),
            limit_to_owner_revision: false,
            limit_to_edit_or_current_owner_revision: false,
            limit_to_tip_revision: false,
            limit_to_public_revision: false,
            // Filtering by the caller's community is on unless switched
            // off explicitly.
            community_filtering: true,
        }
    }
}

impl RelationshipFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to an empty filter with all defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // --- identity ---------------------------------------------------

    pub fn set_relationship_id(&mut self, id: u64) {
        self.relationship_id = Some(id);
    }

    pub fn relationship_id(&self) -> Option<u64> {
        self.relationship_id
    }

    // --- name / category / type group -------------------------------

    /// Add a relationship name. Names are user-definable text, but may not
    /// contain whitespace downstream, so all whitespace is stripped before
    /// storing.
    pub fn add_name(&mut self, name: &str) -> Result<()> {
        let stripped: String = name.chars().filter(|c| !c.is_whitespace()).collect();
        if stripped.is_empty() {
            return Err(FilterError::InvalidArgument {
                field: "name".to_string(),
                message: "empty after stripping whitespace".to_string(),
            });
        }
        if stripped.len() != name.len() {
            tracing::debug!(original = name, stored = %stripped, "stripped whitespace from relationship name");
        }
        self.names.insert(stripped);
        Ok(())
    }

    pub fn add_names<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> Result<()> {
        for name in names {
            self.add_name(name)?;
        }
        Ok(())
    }

    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    /// Set the category criterion. The folder category carries exactly one
    /// relationship name, so selecting it also sets the name filter to the
    /// reserved folder-content name.
    pub fn set_category(&mut self, category: RelationshipCategory) {
        self.category = Some(category);
        if category == RelationshipCategory::Folder {
            self.names.clear();
            self.names.insert(FOLDER_CONTENT_NAME.to_string());
        }
    }

    pub fn category(&self) -> Option<RelationshipCategory> {
        self.category
    }

    pub fn set_kind(&mut self, kind: RelationshipKind) {
        self.kind = Some(kind);
    }

    pub fn kind(&self) -> Option<RelationshipKind> {
        self.kind
    }

    // --- endpoints ---------------------------------------------------

    pub fn set_owner(&mut self, owner: ItemLocator) {
        self.owner = Some(owner);
    }

    pub fn owner(&self) -> Option<ItemLocator> {
        self.owner
    }

    /// Replace the dependent criterion with a single locator.
    pub fn set_dependent(&mut self, dependent: ItemLocator) {
        self.dependents = vec![dependent];
    }

    pub fn add_dependent(&mut self, dependent: ItemLocator) {
        self.dependents.push(dependent);
    }

    pub fn add_dependents(&mut self, dependents: impl IntoIterator<Item = ItemLocator>) {
        self.dependents.extend(dependents);
    }

    pub fn dependents(&self) -> &[ItemLocator] {
        &self.dependents
    }

    // --- content-type / object-type criteria ------------------------

    pub fn set_owner_content_type_id(&mut self, id: u64) -> Result<()> {
        if self.dependent_content_type_id.is_some() {
            return Err(conflict("ownerContentTypeId", "dependentContentTypeId"));
        }
        self.owner_content_type_id = Some(id);
        Ok(())
    }

    pub fn owner_content_type_id(&self) -> Option<u64> {
        self.owner_content_type_id
    }

    pub fn set_dependent_content_type_id(&mut self, id: u64) -> Result<()> {
        if self.owner_content_type_id.is_some() {
            return Err(conflict("dependentContentTypeId", "ownerContentTypeId"));
        }
        if self.limit_to_edit_or_current_owner_revision {
            return Err(conflict(
                "dependentContentTypeId",
                "limitToEditOrCurrentOwnerRevision",
            ));
        }
        if self.limit_to_tip_revision {
            return Err(conflict("dependentContentTypeId", "limitToTipRevision"));
        }
        self.dependent_content_type_id = Some(id);
        Ok(())
    }

    pub fn dependent_content_type_id(&self) -> Option<u64> {
        self.dependent_content_type_id
    }

    pub fn set_owner_object_type(&mut self, object_type: ObjectType) -> Result<()> {
        if self.dependent_object_type.is_some() {
            return Err(conflict("ownerObjectType", "dependentObjectType"));
        }
        self.owner_object_type = Some(object_type);
        Ok(())
    }

    pub fn owner_object_type(&self) -> Option<ObjectType> {
        self.owner_object_type
    }

    pub fn set_dependent_object_type(&mut self, object_type: ObjectType) -> Result<()> {
        if self.owner_object_type.is_some() {
            return Err(conflict("dependentObjectType", "ownerObjectType"));
        }
        if self.limit_to_edit_or_current_owner_revision {
            return Err(conflict(
                "dependentObjectType",
                "limitToEditOrCurrentOwnerRevision",
            ));
        }
        if self.limit_to_tip_revision {
            return Err(conflict("dependentObjectType", "limitToTipRevision"));
        }
        self.dependent_object_type = Some(object_type);
        Ok(())
    }

    pub fn dependent_object_type(&self) -> Option<ObjectType> {
        self.dependent_object_type
    }

    // --- properties --------------------------------------------------

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    // --- revision scoping --------------------------------------------

    /// Match only the owner revision recorded on the relationship itself.
    pub fn limit_to_owner_revision(&mut self, limit: bool) {
        self.limit_to_owner_revision = limit;
        if limit {
            self.clear_revision_limits(RevisionLimit::OwnerRevision);
        }
    }

    pub fn is_limited_to_owner_revision(&self) -> bool {
        self.limit_to_owner_revision
    }

    /// Match only relationships whose owner revision is the edit revision,
    /// or the current revision when not checked out. Conflicts with
    /// dependent-side content-type and object-type criteria.
    pub fn limit_to_edit_or_current_owner_revision(&mut self, limit: bool) -> Result<()> {
        if limit {
            if self.dependent_content_type_id.is_some() {
                return Err(conflict(
                    "limitToEditOrCurrentOwnerRevision",
                    "dependentContentTypeId",
                ));
            }
            if self.dependent_object_type.is_some() {
                return Err(conflict(
                    "limitToEditOrCurrentOwnerRevision",
                    "dependentObjectType",
                ));
            }
        }
        self.limit_to_edit_or_current_owner_revision = limit;
        if limit {
            self.clear_revision_limits(RevisionLimit::EditOrCurrent);
        }
        Ok(())
    }

    pub fn is_limited_to_edit_or_current_owner_revision(&self) -> bool {
        self.limit_to_edit_or_current_owner_revision
    }

    /// Match only relationships whose owner revision is the tip revision.
    /// Conflicts with dependent-side content-type and object-type criteria.
    pub fn limit_to_tip_revision(&mut self, limit: bool) -> Result<()> {
        if limit {
            if self.dependent_content_type_id.is_some() {
                return Err(conflict("limitToTipRevision", "dependentContentTypeId"));
            }
            if self.dependent_object_type.is_some() {
                return Err(conflict("limitToTipRevision", "dependentObjectType"));
            }
        }
        self.limit_to_tip_revision = limit;
        if limit {
            self.clear_revision_limits(RevisionLimit::Tip);
        }
        Ok(())
    }

    pub fn is_limited_to_tip_revision(&self) -> bool {
        self.limit_to_tip_revision
    }

    /// Match only relationships whose owner revision is the last public
    /// revision.
    pub fn limit_to_public_revision(&mut self, limit: bool) {
        self.limit_to_public_revision = limit;
        if limit {
            self.clear_revision_limits(RevisionLimit::Public);
        }
    }

    pub fn is_limited_to_public_revision(&self) -> bool {
        self.limit_to_public_revision
    }

    /// The revision limits are alternative scoping strategies; enabling
    /// one switches the others off.
    fn clear_revision_limits(&mut self, keep: RevisionLimit) {
        let before = (
            self.limit_to_owner_revision,
            self.limit_to_edit_or_current_owner_revision,
            self.limit_to_tip_revision,
            self.limit_to_public_revision,
        );
        if keep != RevisionLimit::OwnerRevision {
            self.limit_to_owner_revision = false;
        }
        if keep != RevisionLimit::EditOrCurrent {
            self.limit_to_edit_or_current_owner_revision = false;
        }
        if keep != RevisionLimit::Tip {
            self.limit_to_tip_revision = false;
        }
        if keep != RevisionLimit::Public {
            self.limit_to_public_revision = false;
        }
        let after = (
            self.limit_to_owner_revision,
            self.limit_to_edit_or_current_owner_revision,
            self.limit_to_tip_revision,
            self.limit_to_public_revision,
        );
        if before != after {
            tracing::debug!(?keep, "revision limit superseded earlier revision limits");
        }
    }

    // --- community filtering -----------------------------------------

    pub fn set_community_filtering(&mut self, enabled: bool) {
        self.community_filtering = enabled;
    }

    pub fn is_community_filtering(&self) -> bool {
        self.community_filtering
    }

    // --- derived predicates ------------------------------------------

    /// True only when the property map is the single non-default
    /// criterion. Recomputed from current field values on every call; the
    /// execution layer uses it to pick a cheaper property-only lookup.
    pub fn is_pure_properties_filter(&self) -> bool {
        !self.properties.is_empty()
            && self.relationship_id.is_none()
            && self.names.is_empty()
            && self.category.is_none()
            && self.kind.is_none()
            && self.owner.is_none()
            && self.dependents.is_empty()
            && self.owner_content_type_id.is_none()
            && self.dependent_content_type_id.is_none()
            && self.owner_object_type.is_none()
            && self.dependent_object_type.is_none()
            && !self.limit_to_owner_revision
            && !self.limit_to_edit_or_current_owner_revision
            && !self.limit_to_tip_revision
            && !self.limit_to_public_revision
            && self.community_filtering
    }

    /// Evaluate this filter against one relationship record.
    pub fn accepts(&self, record: &RelationshipRecord) -> bool {
        self.group_accepts(record) && self.rest_accepts(record)
    }

    /// The category/name/type OR group. Unset criteria do not participate;
    /// a fully unset group passes unconditionally.
    fn group_accepts(&self, record: &RelationshipRecord) -> bool {
        let mut any_set = false;
        if let Some(category) = self.category {
            any_set = true;
            if record.category == category {
                return true;
            }
        }
        if !self.names.is_empty() {
            any_set = true;
            if self
                .names
                .iter()
                .any(|name| name.eq_ignore_ascii_case(&record.name))
            {
                return true;
            }
        }
        if let Some(kind) = self.kind {
            any_set = true;
            if record.kind == kind {
                return true;
            }
        }
        !any_set
    }

    /// Every criterion outside the OR group, AND'ed.
    fn rest_accepts(&self, record: &RelationshipRecord) -> bool {
        if let Some(id) = self.relationship_id {
            if record.id != id {
                return false;
            }
        }
        if let Some(owner) = self.owner {
            if !owner.same_item(&record.owner) {
                return false;
            }
            if self.limit_to_owner_revision {
                if let Some(revision) = owner.revision() {
                    if record.owner.revision() != Some(revision) {
                        return false;
                    }
                }
            }
        }
        if !self.dependents.is_empty()
            && !self
                .dependents
                .iter()
                .any(|dependent| dependent.same_item(&record.dependent))
        {
            return false;
        }
        if let Some(id) = self.owner_content_type_id {
            if record.owner_content_type_id != id {
                return false;
            }
        }
        if let Some(id) = self.dependent_content_type_id {
            if record.dependent_content_type_id != id {
                return false;
            }
        }
        if let Some(object_type) = self.owner_object_type {
            if record.owner_object_type != object_type {
                return false;
            }
        }
        if let Some(object_type) = self.dependent_object_type {
            if record.dependent_object_type != object_type {
                return false;
            }
        }
        if !self
            .properties
            .iter()
            .all(|(name, value)| record.properties.get(name) == Some(value))
        {
            return false;
        }
        if self.limit_to_edit_or_current_owner_revision
            && !record.owner_is_edit_or_current_revision
        {
            return false;
        }
        if self.limit_to_tip_revision && !record.owner_is_tip_revision {
            return false;
        }
        if self.limit_to_public_revision && !record.owner_is_public_revision {
            return false;
        }
        if self.community_filtering && !record.visible_to_community {
            return false;
        }
        true
    }

    // --- XML codec ---------------------------------------------------

    pub fn to_xml(&self) -> XmlElement {
        let mut element = XmlElement::new(NODE_NAME);
        if let Some(id) = self.relationship_id {
            element.set_attribute("relationshipId", id.to_string());
        }
        if let Some(category) = self.category {
            element.set_attribute("category", category.as_str());
        }
        if let Some(kind) = self.kind {
            element.set_attribute("type", kind.as_str());
        }
        if let Some(id) = self.owner_content_type_id {
            element.set_attribute("ownerContentTypeId", id.to_string());
        }
        if let Some(id) = self.dependent_content_type_id {
            element.set_attribute("dependentContentTypeId", id.to_string());
        }
        if let Some(object_type) = self.owner_object_type {
            element.set_attribute("ownerObjectType", object_type.as_str());
        }
        if let Some(object_type) = self.dependent_object_type {
            element.set_attribute("dependentObjectType", object_type.as_str());
        }
        element.set_attribute("limitToOwnerRevision", flag(self.limit_to_owner_revision));
        element.set_attribute(
            "limitToEditOrCurrentOwnerRevision",
            flag(self.limit_to_edit_or_current_owner_revision),
        );
        element.set_attribute("limitToTipRevision", flag(self.limit_to_tip_revision));
        element.set_attribute("limitToPublicRevision", flag(self.limit_to_public_revision));
        element.set_attribute("communityFiltering", flag(self.community_filtering));

        if !self.names.is_empty() {
            let mut names = XmlElement::new("Names");
            for name in &self.names {
                names.add_child(XmlElement::new("Name").with_text(name.clone()));
            }
            element.add_child(names);
        }
        if let Some(owner) = self.owner {
            element.add_child(XmlElement::new("Owner").with_child(owner.to_xml()));
        }
        if !self.dependents.is_empty() {
            let mut dependents = XmlElement::new("Dependents");
            for dependent in &self.dependents {
                dependents.add_child(dependent.to_xml());
            }
            element.add_child(dependents);
        }
        if !self.properties.is_empty() {
            let mut properties = XmlElement::new("Properties");
            for (name, value) in &self.properties {
                properties.add_child(
                    XmlElement::new("Property")
                        .with_attribute("name", name.clone())
                        .with_text(value.clone()),
                );
            }
            element.add_child(properties);
        }
        element
    }

    /// Restore a filter, running every value through the same validation
    /// the setters apply; conflicting criteria in the document are
    /// rejected.
    pub fn from_xml(element: &XmlElement) -> Result<Self> {
        element.expect_name(NODE_NAME)?;
        let mut filter = Self::new();

        if element.attribute("relationshipId").is_some() {
            filter.set_relationship_id(element.parse_attribute("relationshipId")?);
        }
        if let Some(raw) = element.attribute("type") {
            filter.set_kind(parse_enum(element, "type", raw)?);
        }
        if let Some(raw) = element.attribute("category") {
            filter.set_category(parse_enum(element, "category", raw)?);
        }
        if let Some(names) = element.first_child("Names") {
            for name in names.children_named("Name") {
                filter.add_name(name.text().unwrap_or(""))?;
            }
        }
        if let Some(owner) = element.first_child("Owner") {
            filter.set_owner(ItemLocator::from_xml(owner.require_child("Locator")?)?);
        }
        if let Some(dependents) = element.first_child("Dependents") {
            for dependent in dependents.children_named("Locator") {
                filter.add_dependent(ItemLocator::from_xml(dependent)?);
            }
        }
        if element.attribute("ownerContentTypeId").is_some() {
            filter.set_owner_content_type_id(element.parse_attribute("ownerContentTypeId")?)?;
        }
        if element.attribute("dependentContentTypeId").is_some() {
            filter
                .set_dependent_content_type_id(element.parse_attribute("dependentContentTypeId")?)?;
        }
        if let Some(raw) = element.attribute("ownerObjectType") {
            filter.set_owner_object_type(parse_enum(element, "ownerObjectType", raw)?)?;
        }
        if let Some(raw) = element.attribute("dependentObjectType") {
            filter.set_dependent_object_type(parse_enum(element, "dependentObjectType", raw)?)?;
        }
        if let Some(properties) = element.first_child("Properties") {
            for property in properties.children_named("Property") {
                let name = property.require_attribute("name")?.to_string();
                filter.set_property(name, property.text().unwrap_or("").to_string());
            }
        }
        if parse_flag(element, "limitToOwnerRevision")? {
            filter.limit_to_owner_revision(true);
        }
        if parse_flag(element, "limitToEditOrCurrentOwnerRevision")? {
            filter.limit_to_edit_or_current_owner_revision(true)?;
        }
        if parse_flag(element, "limitToTipRevision")? {
            filter.limit_to_tip_revision(true)?;
        }
        if parse_flag(element, "limitToPublicRevision")? {
            filter.limit_to_public_revision(true);
        }
        if let Some(raw) = element.attribute("communityFiltering") {
            filter.set_community_filtering(raw == "yes");
        }
        Ok(filter)
    }
}

/// Which revision limit a setter is keeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RevisionLimit {
    OwnerRevision,
    EditOrCurrent,
    Tip,
    Public,
}

fn conflict(field: &str, conflicts_with: &str) -> FilterError {
    FilterError::ConflictingCriteria {
        field: field.to_string(),
        conflicts_with: conflicts_with.to_string(),
    }
}

fn flag(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn parse_flag(element: &XmlElement, name: &str) -> Result<bool> {
    match element.attribute(name) {
        None | Some("no") => Ok(false),
        Some("yes") => Ok(true),
        Some(other) => Err(FilterError::Xml(XmlError::InvalidValue {
            element: element.name().to_string(),
            field: name.to_string(),
            value: other.to_string(),
        })),
    }
}

fn parse_enum<T: std::str::FromStr>(element: &XmlElement, field: &str, raw: &str) -> Result<T> {
    raw.parse().map_err(|_| {
        FilterError::Xml(XmlError::InvalidValue {
            element: element.name().to_string(),
            field: field.to_string(),
            value: raw.to_string(),
        })
    })
}
