//! The per-object state machine and the component contract.

use ostore_xml::XmlElement;

use crate::delta;
use crate::error::{Result, StoreError};
use crate::key::Key;
use crate::state::ComponentState;

/// Assigns identifiers to rows being inserted, typically backed by a
/// database sequence. Invoked only for components in state `New` during
/// delta emission.
pub trait KeyGenerator {
    fn next_identifier(&mut self, component_type: &str) -> Result<u64>;
}

/// In-memory generator handing out consecutive identifiers. Suitable for
/// tests and hosts without a database; passed explicitly, never global.
#[derive(Debug, Clone)]
pub struct SequentialKeyGenerator {
    next: u64,
}

impl SequentialKeyGenerator {
    pub fn new(start: u64) -> Self {
        Self { next: start }
    }
}

impl Default for SequentialKeyGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl KeyGenerator for SequentialKeyGenerator {
    fn next_identifier(&mut self, _component_type: &str) -> Result<u64> {
        let id = self.next;
        self.next += 1;
        Ok(id)
    }
}

/// The state machine every concrete entity embeds (composition, not
/// inheritance): one key, one lifecycle state, the component-type string.
///
/// Equality compares the key only; lifecycle state is bookkeeping, not
/// identity.
#[derive(Debug, Clone)]
pub struct StateTracker {
    component_type: String,
    key: Key,
    state: ComponentState,
}

impl StateTracker {
    /// Tracker for a freshly constructed, never-persisted object.
    pub fn new(component_type: impl Into<String>, key: Key) -> Self {
        Self {
            component_type: component_type.into(),
            key,
            state: ComponentState::New,
        }
    }

    /// Tracker for an object reconstructed from its serialized form; the
    /// restored object represents current truth and starts `Unmodified`.
    pub fn restored(component_type: impl Into<String>, key: Key) -> Self {
        Self {
            component_type: component_type.into(),
            key,
            state: ComponentState::Unmodified,
        }
    }

    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn key_mut(&mut self) -> &mut Key {
        &mut self.key
    }

    /// Own state, without child roll-up.
    pub fn state(&self) -> ComponentState {
        self.state
    }

    /// Record that a persisted field changed. Only the
    /// `Unmodified -> Modified` transition exists; every other state is
    /// left alone.
    pub fn mark_dirty(&mut self) {
        if self.state == ComponentState::Unmodified {
            self.state = ComponentState::Modified;
        }
    }

    /// Set-if-changed helper for entity setters: assigns `value` to
    /// `field` and marks the tracker dirty only when the value actually
    /// differs. Returns whether a change occurred.
    pub fn touch<V: PartialEq>(&mut self, field: &mut V, value: V) -> bool {
        if *field == value {
            return false;
        }
        *field = value;
        self.mark_dirty();
        true
    }

    pub fn mark_for_deletion(&mut self) {
        self.state = ComponentState::MarkedForDelete;
    }

    /// Reset to `Unmodified` after a successful write-back.
    ///
    /// Calling this on a tracker still marked for deletion is a sequencing
    /// violation: the caller must emit and apply the delete first.
    pub fn set_persisted(&mut self) -> Result<()> {
        if self.state == ComponentState::MarkedForDelete {
            return Err(StoreError::InvalidPersistTransition {
                component_type: self.component_type.clone(),
            });
        }
        self.state = ComponentState::Unmodified;
        Ok(())
    }

    /// Turn this tracker into the tracker of a new, unpersisted copy.
    pub fn mark_new(&mut self) {
        self.state = ComponentState::New;
        self.key.clear_assignment();
    }

    /// Fill every still-unassigned key part from the generator. Called
    /// during delta emission for components being inserted.
    pub fn assign_key(&mut self, generator: &mut dyn KeyGenerator) -> Result<()> {
        let unassigned: Vec<String> = self
            .key
            .parts()
            .filter(|(_, _, assigned)| !assigned)
            .map(|(name, _, _)| name.to_string())
            .collect();
        for name in unassigned {
            let id = generator.next_identifier(&self.component_type)?;
            self.key.set_part(&name, id.to_string())?;
        }
        Ok(())
    }
}

impl PartialEq for StateTracker {
    fn eq(&self, other: &Self) -> bool {
        self.component_type == other.component_type && self.key == other.key
    }
}

impl Eq for StateTracker {}

/// The contract every versioned component implements.
///
/// Concrete entities embed a [`StateTracker`] and expose their owned
/// collections through the `child_state` / `mark_for_deletion` /
/// `set_persisted` / `to_delta_xml` hooks; leaves get working defaults.
pub trait Component: Clone + PartialEq + Sized {
    /// Tag name of this component's XML element.
    fn node_name() -> &'static str;

    fn tracker(&self) -> &StateTracker;

    fn tracker_mut(&mut self) -> &mut StateTracker;

    /// Component-type string carried by this instance. Usually the node
    /// name; registry-built members may report a subtype tag.
    fn component_type(&self) -> &str {
        self.tracker().component_type()
    }

    fn key(&self) -> &Key {
        self.tracker().key()
    }

    /// Combined state of owned children and collections; leaves have none.
    fn child_state(&self) -> ComponentState {
        ComponentState::Unmodified
    }

    /// Effective state: own state lifted by the child roll-up rule.
    fn state(&self) -> ComponentState {
        self.tracker().state().combined_with_child(self.child_state())
    }

    /// Recursively mark this component and everything it owns for
    /// deletion. Composites must forward to their collections.
    fn mark_for_deletion(&mut self) {
        self.tracker_mut().mark_for_deletion();
    }

    /// Reset to `Unmodified` after a successful write-back. Composites
    /// must forward to their collections, which also clear their delete
    /// ledgers — and must check the collection states for
    /// `MarkedForDelete` before resetting their own tracker, so a failed
    /// persist leaves the component untouched.
    fn set_persisted(&mut self) -> Result<()> {
        self.tracker_mut().set_persisted()
    }

    /// Full serialization: key attributes, persisted fields, owned
    /// children. Pure; two calls on unchanged state yield identical trees.
    fn to_xml(&self) -> XmlElement;

    /// Full restore. Validates the root tag and required attributes; the
    /// returned object is `Unmodified`.
    fn from_xml(element: &XmlElement) -> Result<Self>;

    /// Append this component's pending changes under `out`. Emits nothing
    /// when `Unmodified`; assigns a fresh key when `New`. Composites
    /// override this to honor the ordering contract (all collection
    /// deletes, own element, live children).
    fn to_delta_xml(
        &mut self,
        out: &mut XmlElement,
        generator: &mut dyn KeyGenerator,
        parent_key: Option<&Key>,
    ) -> Result<()> {
        delta::emit_leaf(self, out, generator, parent_key)
    }

    /// Deep copy that starts life unpersisted: state `New`, keys
    /// unassigned, collection ledgers clean. Plain `clone()` is the exact
    /// copy that preserves ledgers and state.
    fn copy_as_new(&self) -> Self {
        let mut copy = self.clone();
        copy.reset_to_new();
        copy
    }

    /// Turn this instance into a new, unpersisted one in place.
    /// Composites must forward to their collections.
    fn reset_to_new(&mut self) {
        self.tracker_mut().mark_new();
    }
}
