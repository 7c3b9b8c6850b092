use thiserror::Error;

use ostore_xml::XmlError;

/// Errors raised while building or restoring a relationship filter.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid argument for {field}: {message}")]
    InvalidArgument { field: String, message: String },

    #[error("filter criterion '{field}' conflicts with already-set '{conflicts_with}'")]
    ConflictingCriteria {
        field: String,
        conflicts_with: String,
    },

    #[error(transparent)]
    Xml(#[from] XmlError),
}

pub type Result<T> = std::result::Result<T, FilterError>;
