//! Relationship query filters for the object store.
//!
//! A [`RelationshipFilter`] collects optional criteria (category, names,
//! type, endpoints, content types, properties, revision scoping) and can
//! be evaluated in memory against [`RelationshipRecord`]s or handed to a
//! [`RelationshipProcessor`] implementation for execution against a
//! backing store. Filters round-trip through the XML element model in
//! `ostore-xml`.

pub mod enums;
pub mod error;
pub mod filter;
pub mod locator;
pub mod processor;
pub mod record;

pub use enums::{FOLDER_CONTENT_NAME, ObjectType, RelationshipCategory, RelationshipKind};
pub use error::{FilterError, Result};
pub use filter::RelationshipFilter;
pub use locator::ItemLocator;
pub use processor::RelationshipProcessor;
pub use record::RelationshipRecord;
