//! Component lifecycle states and the delta actions derived from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a component or collection relative to the backing
/// store.
///
/// `MarkedForDelete` is terminal: a component only leaves it by being
/// dropped from its parent or by reconstruction from XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentState {
    /// Created in memory, never persisted.
    New,
    /// Matches the backing store as of the last persist.
    Unmodified,
    /// Persisted before, changed since.
    Modified,
    /// Pending deletion from the backing store.
    MarkedForDelete,
}

impl ComponentState {
    /// Serialized label, used on collection roots for round-tripping.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentState::New => "new",
            ComponentState::Unmodified => "unmodified",
            ComponentState::Modified => "modified",
            ComponentState::MarkedForDelete => "markedfordelete",
        }
    }

    /// Anything other than `Unmodified` is dirty.
    pub fn is_dirty(&self) -> bool {
        *self != ComponentState::Unmodified
    }

    /// The delta action a component in this state emits, if any.
    pub fn delta_action(&self) -> Option<DeltaAction> {
        match self {
            ComponentState::New => Some(DeltaAction::Insert),
            ComponentState::Modified => Some(DeltaAction::Update),
            ComponentState::MarkedForDelete => Some(DeltaAction::Delete),
            ComponentState::Unmodified => None,
        }
    }

    /// Effective state of a parent given its own state and the combined
    /// state of its children.
    ///
    /// A parent is never weaker than its children: any dirty child lifts an
    /// `Unmodified` parent to `Modified`. A `New` parent stays `New` (the
    /// whole subtree is inserted together) and a parent marked for deletion
    /// stays marked regardless of child churn.
    pub fn combined_with_child(self, child: ComponentState) -> ComponentState {
        match self {
            ComponentState::MarkedForDelete => ComponentState::MarkedForDelete,
            ComponentState::New => ComponentState::New,
            _ if child.is_dirty() => ComponentState::Modified,
            own => own,
        }
    }

    /// Fold two sibling child states into one for roll-up purposes, by
    /// severity: `Unmodified < New < Modified < MarkedForDelete`.
    pub fn merged(self, other: ComponentState) -> ComponentState {
        fn severity(state: ComponentState) -> u8 {
            match state {
                ComponentState::Unmodified => 0,
                ComponentState::New => 1,
                ComponentState::Modified => 2,
                ComponentState::MarkedForDelete => 3,
            }
        }
        if severity(other) > severity(self) { other } else { self }
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentState {
    type Err = String;

    /// Parse a serialized state label (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(ComponentState::New),
            "unmodified" => Ok(ComponentState::Unmodified),
            "modified" => Ok(ComponentState::Modified),
            "markedfordelete" => Ok(ComponentState::MarkedForDelete),
            other => Err(format!("unknown component state: {other}")),
        }
    }
}

/// Action a delta element carries, derived from component state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeltaAction {
    Insert,
    Update,
    Delete,
}

impl DeltaAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeltaAction::Insert => "insert",
            DeltaAction::Update => "update",
            DeltaAction::Delete => "delete",
        }
    }
}

impl fmt::Display for DeltaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeltaAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "insert" => Ok(DeltaAction::Insert),
            "update" => Ok(DeltaAction::Update),
            "delete" => Ok(DeltaAction::Delete),
            other => Err(format!("unknown delta action: {other}")),
        }
    }
}
