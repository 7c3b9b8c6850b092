use thiserror::Error;

/// Errors raised while reading, validating or writing XML documents.
///
/// The `UnexpectedElement`/`MissingAttribute`/`MissingChild`/`InvalidValue`
/// variants form the malformed-document family: each carries the offending
/// tag or attribute name so callers can build a precise message.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("failed to parse document: {0}")]
    Parse(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("invalid escape sequence: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),

    #[error("document has no root element")]
    EmptyDocument,

    #[error("unexpected content after closing </{root}>")]
    TrailingContent { root: String },

    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedClose { expected: String, found: String },

    #[error("expected element <{expected}>, found <{found}>")]
    UnexpectedElement { expected: String, found: String },

    #[error("element <{element}> is missing required attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    #[error("element <{element}> is missing required child <{child}>")]
    MissingChild { element: String, child: String },

    #[error("element <{element}> has an invalid {field} value: '{value}'")]
    InvalidValue {
        element: String,
        field: String,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, XmlError>;
