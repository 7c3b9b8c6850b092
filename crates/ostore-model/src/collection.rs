//! Ordered component collections with delete ledgers.

use ostore_xml::{XmlElement, XmlError};

use crate::component::{Component, KeyGenerator};
use crate::error::{Result, StoreError};
use crate::key::Key;
use crate::registry::MemberRegistry;
use crate::state::ComponentState;

/// Name of the child element holding serialized delete-ledger members.
pub const DELETE_LEDGER_NODE: &str = "DeleteLedger";

/// Name of the state attribute on collection roots.
pub const STATE_ATTRIBUTE: &str = "state";

/// Shared machinery of [`ComponentList`] and
/// [`ComponentSet`](crate::set::ComponentSet): the live members, the
/// delete ledger and the rules connecting them.
///
/// An item is in at most one of the live collection and the ledger.
/// Removing a never-persisted (`New`) item discards it outright; removing
/// a persisted one marks it for deletion and moves it to the ledger.
#[derive(Debug, Clone)]
pub(crate) struct CollectionCore<T: Component> {
    node_name: String,
    member_type: String,
    members: Vec<T>,
    deleted: Vec<T>,
    marked_for_delete: bool,
}

impl<T: Component> CollectionCore<T> {
    pub(crate) fn new(node_name: String, member_type: String) -> Self {
        Self {
            node_name,
            member_type,
            members: Vec::new(),
            deleted: Vec::new(),
            marked_for_delete: false,
        }
    }

    pub(crate) fn node_name(&self) -> &str {
        &self.node_name
    }

    pub(crate) fn member_type(&self) -> &str {
        &self.member_type
    }

    pub(crate) fn members(&self) -> &[T] {
        &self.members
    }

    pub(crate) fn members_mut(&mut self) -> &mut Vec<T> {
        &mut self.members
    }

    pub(crate) fn deleted(&self) -> &[T] {
        &self.deleted
    }

    /// Fail unless the item's component-type string matches the configured
    /// member type. Applied on every mutating call.
    pub(crate) fn check_member(&self, item: &T) -> Result<()> {
        if item.component_type() == self.member_type {
            Ok(())
        } else {
            Err(StoreError::TypeMismatch {
                expected: self.member_type.clone(),
                found: item.component_type().to_string(),
            })
        }
    }

    pub(crate) fn state(&self) -> ComponentState {
        if self.marked_for_delete {
            return ComponentState::MarkedForDelete;
        }
        let any_changed = self.members.iter().any(|member| {
            matches!(
                member.state(),
                ComponentState::Modified | ComponentState::MarkedForDelete
            )
        });
        if !self.deleted.is_empty() || any_changed {
            return ComponentState::Modified;
        }
        let news = self
            .members
            .iter()
            .filter(|member| member.state() == ComponentState::New)
            .count();
        if news == 0 {
            ComponentState::Unmodified
        } else if news == self.members.len() {
            ComponentState::New
        } else {
            // Mixed new and unmodified members still require inserts, so
            // the collection (and its owner) must report a pending change.
            ComponentState::Modified
        }
    }

    /// Drop a structurally-equal entry from the delete ledger. An item
    /// re-added after removal is live again, not pending deletion; without
    /// this, a remove-and-re-add would leave the item in both places and
    /// the next delta would drop the row.
    pub(crate) fn resurrect(&mut self, item: &T) {
        if let Some(index) = self.deleted.iter().position(|member| member == item) {
            self.deleted.remove(index);
        }
    }

    /// Remove the member at `index`, applying the ledger rule.
    pub(crate) fn remove_at(&mut self, index: usize) -> bool {
        if index >= self.members.len() {
            return false;
        }
        let mut member = self.members.remove(index);
        if member.state() == ComponentState::New {
            // Never persisted; nothing to delete server-side.
            return true;
        }
        member.mark_for_deletion();
        self.deleted.push(member);
        true
    }

    /// Remove the first structurally-equal member. Absent items are a
    /// no-op, never an error.
    pub(crate) fn remove_equal(&mut self, item: &T) -> bool {
        match self.members.iter().position(|member| member == item) {
            Some(index) => self.remove_at(index),
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        let drained: Vec<T> = self.members.drain(..).collect();
        for mut member in drained {
            if member.state() == ComponentState::New {
                continue;
            }
            member.mark_for_deletion();
            self.deleted.push(member);
        }
    }

    pub(crate) fn mark_for_deletion(&mut self) {
        self.marked_for_delete = true;
        for member in &mut self.members {
            member.mark_for_deletion();
        }
    }

    pub(crate) fn set_persisted(&mut self) -> Result<()> {
        if self.marked_for_delete {
            return Err(StoreError::InvalidPersistTransition {
                component_type: self.node_name.clone(),
            });
        }
        self.deleted.clear();
        let mut index = 0;
        while index < self.members.len() {
            if self.members[index].state() == ComponentState::MarkedForDelete {
                // A second reference marked this live member since it was
                // emitted; treat it like an add followed by a remove.
                tracing::warn!(
                    collection = %self.node_name,
                    "dropping live member marked for deletion during persist"
                );
                self.members.remove(index);
            } else {
                self.members[index].set_persisted()?;
                index += 1;
            }
        }
        Ok(())
    }

    pub(crate) fn reset_to_new(&mut self) {
        self.deleted.clear();
        self.marked_for_delete = false;
        for member in &mut self.members {
            member.reset_to_new();
        }
    }

    pub(crate) fn to_xml(&self) -> XmlElement {
        let mut element = XmlElement::new(self.node_name.clone())
            .with_attribute(STATE_ATTRIBUTE, self.state().as_str());
        for member in &self.members {
            element.add_child(member.to_xml());
        }
        if !self.deleted.is_empty() {
            let mut ledger = XmlElement::new(DELETE_LEDGER_NODE);
            for member in &self.deleted {
                ledger.add_child(member.to_xml());
            }
            element.add_child(ledger);
        }
        element
    }

    pub(crate) fn from_xml(
        element: &XmlElement,
        node_name: String,
        member_type: String,
        build: &dyn Fn(&XmlElement) -> Result<T>,
    ) -> Result<Self> {
        if element.name() != node_name {
            return Err(StoreError::Xml(XmlError::UnexpectedElement {
                expected: node_name,
                found: element.name().to_string(),
            }));
        }
        let raw_state = element.require_attribute(STATE_ATTRIBUTE)?;
        let restored_state: ComponentState =
            raw_state.parse().map_err(|_| XmlError::InvalidValue {
                element: element.name().to_string(),
                field: STATE_ATTRIBUTE.to_string(),
                value: raw_state.to_string(),
            })?;

        let mut core = Self::new(node_name, member_type);
        for child in element.children() {
            if child.name() == DELETE_LEDGER_NODE {
                for entry in child.children() {
                    let mut member = build(entry)?;
                    member.mark_for_deletion();
                    core.deleted.push(member);
                }
            } else {
                core.members.push(build(child)?);
            }
        }
        if restored_state == ComponentState::MarkedForDelete {
            core.mark_for_deletion();
        }
        Ok(core)
    }

    /// Emit deletes: every ledger member plus any live member already
    /// marked for deletion (including all of them when the collection
    /// itself is marked).
    pub(crate) fn delta_deletes(
        &mut self,
        out: &mut XmlElement,
        generator: &mut dyn KeyGenerator,
        parent_key: Option<&Key>,
    ) -> Result<()> {
        for member in &mut self.deleted {
            member.to_delta_xml(out, generator, parent_key)?;
        }
        for member in &mut self.members {
            if member.state() == ComponentState::MarkedForDelete {
                member.to_delta_xml(out, generator, parent_key)?;
            }
        }
        Ok(())
    }

    /// Emit live inserts and updates, in iteration order. Members marked
    /// for deletion were already covered by [`delta_deletes`](Self::delta_deletes).
    pub(crate) fn delta_upserts(
        &mut self,
        out: &mut XmlElement,
        generator: &mut dyn KeyGenerator,
        parent_key: Option<&Key>,
    ) -> Result<()> {
        for member in &mut self.members {
            if matches!(
                member.state(),
                ComponentState::New | ComponentState::Modified
            ) {
                member.to_delta_xml(out, generator, parent_key)?;
            }
        }
        Ok(())
    }

    /// Order-independent multiset comparison of the delete ledgers.
    pub(crate) fn ledgers_equal(&self, other: &Self) -> bool {
        multiset_equal(&self.deleted, &other.deleted)
    }
}

pub(crate) fn multiset_equal<T: PartialEq>(left: &[T], right: &[T]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut used = vec![false; right.len()];
    for item in left {
        let matched = right
            .iter()
            .enumerate()
            .position(|(i, candidate)| !used[i] && candidate == item);
        match matched {
            Some(i) => used[i] = true,
            None => return false,
        }
    }
    true
}

/// Ordered, index-addressable collection of components with a delete
/// ledger. Insertion order is preserved and serialized.
#[derive(Debug, Clone)]
pub struct ComponentList<T: Component> {
    core: CollectionCore<T>,
}

impl<T: Component> ComponentList<T> {
    /// Empty list with the default node name (`<member>List`) and member
    /// type.
    pub fn new() -> Self {
        Self {
            core: CollectionCore::new(Self::default_node_name(), T::node_name().to_string()),
        }
    }

    /// Empty list with an explicit node name and member-type string.
    pub fn with_names(node_name: impl Into<String>, member_type: impl Into<String>) -> Self {
        Self {
            core: CollectionCore::new(node_name.into(), member_type.into()),
        }
    }

    pub fn default_node_name() -> String {
        format!("{}List", T::node_name())
    }

    pub fn node_name(&self) -> &str {
        self.core.node_name()
    }

    pub fn member_type(&self) -> &str {
        self.core.member_type()
    }

    /// Append an item, resurrecting a structurally-equal delete-ledger
    /// entry if one exists. Fails with [`StoreError::TypeMismatch`] when
    /// the item's component type does not match the configured member type.
    pub fn add(&mut self, item: T) -> Result<()> {
        self.core.check_member(&item)?;
        self.core.resurrect(&item);
        self.core.members_mut().push(item);
        Ok(())
    }

    /// Insert an item at `index`, with the same ledger-resurrection rule
    /// as [`add`](Self::add).
    pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
        self.core.check_member(&item)?;
        if index > self.core.members().len() {
            return Err(StoreError::InvalidArgument {
                field: "index".to_string(),
                message: format!(
                    "index {index} out of range for list of {}",
                    self.core.members().len()
                ),
            });
        }
        self.core.resurrect(&item);
        self.core.members_mut().insert(index, item);
        Ok(())
    }

    /// Move the member at `from` to position `to` without touching any
    /// member's state; persisted ordering lives in member fields.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.core.members().len();
        if from >= len || to >= len {
            return Err(StoreError::InvalidArgument {
                field: "index".to_string(),
                message: format!("move {from} -> {to} out of range for list of {len}"),
            });
        }
        let member = self.core.members_mut().remove(from);
        self.core.members_mut().insert(to, member);
        Ok(())
    }

    /// Remove the first member structurally equal to `item`; returns
    /// whether one was removed. Persisted members move to the delete
    /// ledger, never-persisted ones are discarded.
    pub fn remove(&mut self, item: &T) -> bool {
        self.core.remove_equal(item)
    }

    /// Remove by position, with the same ledger semantics as
    /// [`remove`](Self::remove).
    pub fn remove_at(&mut self, index: usize) -> bool {
        self.core.remove_at(index)
    }

    /// Remove every member: persisted ones move to the ledger, new ones
    /// are discarded.
    pub fn clear(&mut self) {
        self.core.clear();
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.core.members().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.core.members_mut().get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.core.members().iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.core.members_mut().iter_mut()
    }

    pub fn len(&self) -> usize {
        self.core.members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.members().is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.core.members().iter().any(|member| member == item)
    }

    /// Members currently awaiting deletion.
    pub fn delete_ledger(&self) -> &[T] {
        self.core.deleted()
    }

    /// Derived collection state, per the ledger and member roll-up rules.
    pub fn state(&self) -> ComponentState {
        self.core.state()
    }

    pub fn mark_for_deletion(&mut self) {
        self.core.mark_for_deletion();
    }

    pub fn set_persisted(&mut self) -> Result<()> {
        self.core.set_persisted()
    }

    /// Deep copy that starts unpersisted: clean ledger, every member
    /// `New` with unassigned keys.
    #[must_use]
    pub fn copy_as_new(&self) -> Self {
        let mut copy = self.clone();
        copy.reset_to_new();
        copy
    }

    pub fn reset_to_new(&mut self) {
        self.core.reset_to_new();
    }

    /// Serialize live members in order, then the delete ledger, under a
    /// state-labelled collection root.
    pub fn to_xml(&self) -> XmlElement {
        self.core.to_xml()
    }

    /// Restore a list whose members all carry the member element name.
    pub fn from_xml(element: &XmlElement) -> Result<Self> {
        Self::from_xml_named(element, Self::default_node_name(), T::node_name())
    }

    /// Restore a list serialized under an explicit node name and member
    /// type, as created by [`with_names`](Self::with_names).
    pub fn from_xml_named(
        element: &XmlElement,
        node_name: impl Into<String>,
        member_type: impl Into<String>,
    ) -> Result<Self> {
        let core = CollectionCore::from_xml(
            element,
            node_name.into(),
            member_type.into(),
            &|child| {
                if child.name() == T::node_name() {
                    T::from_xml(child)
                } else {
                    Err(StoreError::UnknownMemberType {
                        node: child.name().to_string(),
                    })
                }
            },
        )?;
        Ok(Self { core })
    }

    /// Restore a list whose members are built through an explicit
    /// node-name registry.
    pub fn from_xml_with(element: &XmlElement, registry: &MemberRegistry<T>) -> Result<Self> {
        let core = CollectionCore::from_xml(
            element,
            Self::default_node_name(),
            T::node_name().to_string(),
            &|child| registry.build(child),
        )?;
        Ok(Self { core })
    }

    /// Equality including the delete ledger (order-independent), where
    /// `==` ignores it.
    pub fn eq_full(&self, other: &Self) -> bool {
        self == other && self.core.ledgers_equal(&other.core)
    }

    pub fn delta_deletes(
        &mut self,
        out: &mut XmlElement,
        generator: &mut dyn KeyGenerator,
        parent_key: Option<&Key>,
    ) -> Result<()> {
        self.core.delta_deletes(out, generator, parent_key)
    }

    pub fn delta_upserts(
        &mut self,
        out: &mut XmlElement,
        generator: &mut dyn KeyGenerator,
        parent_key: Option<&Key>,
    ) -> Result<()> {
        self.core.delta_upserts(out, generator, parent_key)
    }
}

impl<T: Component> Default for ComponentList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Compares live members in order; the delete ledger and the
/// marked-for-delete flag are bookkeeping, not data.
impl<T: Component> PartialEq for ComponentList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.core.members() == other.core.members()
    }
}

impl<'a, T: Component> IntoIterator for &'a ComponentList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Component> std::ops::Index<usize> for ComponentList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.core.members()[index]
    }
}
