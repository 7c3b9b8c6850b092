//! Owned XML element tree used by the object-store serialization contract.
//!
//! Components serialize themselves into [`XmlElement`] values and restore
//! from them; delta emission appends fragments under a caller-supplied
//! element. The tree is backed by `quick-xml` on both the read and the
//! write side.

pub mod element;
pub mod error;
mod reader;
mod writer;

pub use element::XmlElement;
pub use error::{Result, XmlError};
