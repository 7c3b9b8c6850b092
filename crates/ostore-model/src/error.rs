use thiserror::Error;

use ostore_xml::XmlError;

/// Errors raised by the change-tracking core.
///
/// Validation failures are raised at the mutating call and never leave a
/// component partially mutated; XML restore failures abort the whole
/// restore for the offending element.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid argument for {field}: {message}")]
    InvalidArgument { field: String, message: String },

    #[error("key has no part named '{part}'")]
    UnknownKeyPart { part: String },

    #[error("key arity mismatch: {names} part names, {values} values")]
    InvalidKeyArity { names: usize, values: usize },

    #[error("collection of '{expected}' cannot accept a member of type '{found}'")]
    TypeMismatch { expected: String, found: String },

    #[error("no member factory registered for element <{node}>")]
    UnknownMemberType { node: String },

    #[error(
        "cannot persist '{component_type}' while it is marked for deletion; \
         emit its delete first"
    )]
    InvalidPersistTransition { component_type: String },

    #[error("identifier generation failed for '{component_type}': {message}")]
    IdentifierGenerationFailed {
        component_type: String,
        message: String,
    },

    #[error(transparent)]
    Xml(#[from] XmlError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
