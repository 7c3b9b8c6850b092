//! Change-tracking substrate for the object store.
//!
//! Every persisted entity embeds a [`StateTracker`] and implements
//! [`Component`]: it knows whether it is new, modified, unmodified or
//! marked for deletion relative to the backing store, serializes to and
//! from an XML element tree, and can emit a delta document describing only
//! the changes needed to bring the store in sync. Collections come in an
//! ordered ([`ComponentList`]) and a de-duplicated ([`ComponentSet`])
//! variant, both carrying a delete ledger of removed-but-not-yet-deleted
//! members.

pub mod collection;
pub mod component;
pub mod delta;
pub mod error;
pub mod key;
pub mod registry;
pub mod set;
pub mod state;

pub use collection::ComponentList;
pub use component::{Component, KeyGenerator, SequentialKeyGenerator, StateTracker};
pub use delta::DeltaDocument;
pub use error::{Result, StoreError};
pub use key::Key;
pub use registry::{MemberFactory, MemberRegistry};
pub use set::ComponentSet;
pub use state::{ComponentState, DeltaAction};
