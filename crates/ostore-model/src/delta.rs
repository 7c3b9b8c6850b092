//! Delta emission: serializing only the changes needed to bring the
//! backing store in sync.
//!
//! Ordering contract, honored by composites and by the collection
//! helpers: deletions across all owned collections first, then the
//! component's own insert/update element, then each collection's live
//! insertions and updates in declaration order. A component marked for
//! deletion emits its own delete element first and the deletes of its
//! children nested inside it.

use ostore_xml::XmlElement;

use crate::component::{Component, KeyGenerator};
use crate::error::Result;
use crate::key::Key;
use crate::state::{ComponentState, DeltaAction};

/// Name of the attribute carrying the delta action on emitted elements.
pub const ACTION_ATTRIBUTE: &str = "action";

/// Copy parent key parts into a child key.
///
/// Every part of `parent` that has a same-named, still-unassigned part in
/// `key` is copied by value; the child never holds a live reference to the
/// parent's key.
pub fn apply_parent_key(key: &mut Key, parent: Option<&Key>) {
    let Some(parent) = parent else { return };
    for (name, value, assigned) in parent.parts() {
        if !assigned {
            continue;
        }
        if let Ok(false) = key.is_part_assigned(name) {
            // set_part cannot fail here: the part was just found.
            let _ = key.set_part(name, value);
        }
    }
}

/// Tag `element` with `action` and append it under `out`.
pub fn push_with_action(out: &mut XmlElement, mut element: XmlElement, action: DeltaAction) {
    element.set_attribute(ACTION_ATTRIBUTE, action.as_str());
    out.add_child(element);
}

/// Default delta emission for leaf components (no owned collections).
pub fn emit_leaf<T: Component>(
    component: &mut T,
    out: &mut XmlElement,
    generator: &mut dyn KeyGenerator,
    parent_key: Option<&Key>,
) -> Result<()> {
    apply_parent_key(component.tracker_mut().key_mut(), parent_key);
    let state = component.state();
    let Some(action) = state.delta_action() else {
        tracing::debug!(
            component_type = component.component_type(),
            "skipping unmodified component in delta"
        );
        return Ok(());
    };
    if state == ComponentState::New {
        component.tracker_mut().assign_key(generator)?;
    }
    push_with_action(out, component.to_xml(), action);
    Ok(())
}

/// Scratch buffer for building a delta document.
///
/// Emission is not transactional at the XML level: helpers leave already
/// appended fragments in place when a later step fails. Callers needing
/// all-or-nothing behavior build into a `DeltaDocument` and only attach
/// the result to their real document on success.
#[derive(Debug, Clone)]
pub struct DeltaDocument {
    root: XmlElement,
}

impl DeltaDocument {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root: XmlElement::new(root_name),
        }
    }

    /// Emit `component`'s pending changes into this document.
    pub fn emit<T: Component>(
        &mut self,
        component: &mut T,
        generator: &mut dyn KeyGenerator,
    ) -> Result<()> {
        component.to_delta_xml(&mut self.root, generator, None)
    }

    /// True when nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.root.children().is_empty()
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Consume the buffer, attaching its root under `target`.
    pub fn attach_to(self, target: &mut XmlElement) {
        target.add_child(self.root);
    }

    pub fn into_root(self) -> XmlElement {
        self.root
    }
}
