//! De-duplicated, unordered component collections.

use ostore_xml::XmlElement;

use crate::collection::{CollectionCore, multiset_equal};
use crate::component::{Component, KeyGenerator};
use crate::error::{Result, StoreError};
use crate::key::Key;
use crate::registry::MemberRegistry;
use crate::state::ComponentState;

/// Unordered collection enforcing uniqueness by business equality, with
/// the same delete-ledger semantics as
/// [`ComponentList`](crate::collection::ComponentList). Iteration order is
/// incidental and not part of the contract.
#[derive(Debug, Clone)]
pub struct ComponentSet<T: Component> {
    core: CollectionCore<T>,
}

impl<T: Component> ComponentSet<T> {
    pub fn new() -> Self {
        Self {
            core: CollectionCore::new(Self::default_node_name(), T::node_name().to_string()),
        }
    }

    pub fn with_names(node_name: impl Into<String>, member_type: impl Into<String>) -> Self {
        Self {
            core: CollectionCore::new(node_name.into(), member_type.into()),
        }
    }

    pub fn default_node_name() -> String {
        format!("{}Set", T::node_name())
    }

    pub fn node_name(&self) -> &str {
        self.core.node_name()
    }

    pub fn member_type(&self) -> &str {
        self.core.member_type()
    }

    /// Insert unless an equal member is already present; returns whether
    /// the set changed. A structurally-equal delete-ledger entry is
    /// resurrected rather than kept alongside the live copy. Fails with
    /// [`StoreError::TypeMismatch`] on a member-type violation.
    pub fn add(&mut self, item: T) -> Result<bool> {
        self.core.check_member(&item)?;
        self.core.resurrect(&item);
        if self.contains(&item) {
            return Ok(false);
        }
        self.core.members_mut().push(item);
        Ok(true)
    }

    /// Remove the member structurally equal to `item`; persisted members
    /// move to the delete ledger. Returns whether one was removed.
    pub fn remove(&mut self, item: &T) -> bool {
        self.core.remove_equal(item)
    }

    pub fn clear(&mut self) {
        self.core.clear();
    }

    pub fn contains(&self, item: &T) -> bool {
        self.core.members().iter().any(|member| member == item)
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

    pub fn delete_ledger(&self) -> &[T] {
        self.core.deleted()
    }

    pub fn state(&self) -> ComponentState {
        self.core.state()
    }

    pub fn mark_for_deletion(&mut self) {
        self.core.mark_for_deletion();
    }

    pub fn set_persisted(&mut self) -> Result<()> {
        self.core.set_persisted()
    }

    #[must_use]
    pub fn copy_as_new(&self) -> Self {
        let mut copy = self.clone();
        copy.reset_to_new();
        copy
    }

    pub fn reset_to_new(&mut self) {
        self.core.reset_to_new();
    }

    pub fn to_xml(&self) -> XmlElement {
        self.core.to_xml()
    }

    pub fn from_xml(element: &XmlElement) -> Result<Self> {
        Self::from_xml_named(element, Self::default_node_name(), T::node_name())
    }

    /// Restore a set serialized under an explicit node name and member
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
        Self::ensure_unique(&core)?;
        Ok(Self { core })
    }

    pub fn from_xml_with(element: &XmlElement, registry: &MemberRegistry<T>) -> Result<Self> {
        let core = CollectionCore::from_xml(
            element,
            Self::default_node_name(),
            T::node_name().to_string(),
            &|child| registry.build(child),
        )?;
        Self::ensure_unique(&core)?;
        Ok(Self { core })
    }

    /// A serialized set carrying two equal members cannot have come from
    /// this codec; reject it rather than restore a set that violates its
    /// uniqueness invariant.
    fn ensure_unique(core: &CollectionCore<T>) -> Result<()> {
        let members = core.members();
        for (index, member) in members.iter().enumerate() {
            if members[..index].iter().any(|earlier| earlier == member) {
                return Err(StoreError::InvalidArgument {
                    field: core.node_name().to_string(),
                    message: "duplicate member in serialized set".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Equality including the delete ledger, where `==` ignores it.
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

impl<T: Component> Default for ComponentSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Set equality: same members regardless of insertion order; the delete
/// ledger and marked-for-delete flag are excluded.
impl<T: Component> PartialEq for ComponentSet<T> {
    fn eq(&self, other: &Self) -> bool {
        multiset_equal(self.core.members(), other.core.members())
    }
}

impl<'a, T: Component> IntoIterator for &'a ComponentSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
