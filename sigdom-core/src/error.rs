//! Error types.
//!
//! The binder is a thin synchronous layer over the host document, so most
//! of these variants mirror the exceptions a browser raises (an invalid
//! tag name, a hierarchy violation) and are returned to the caller
//! unmodified. The signal graph itself has no error channel: a derivation
//! that panics unwinds through the write that triggered it.

use thiserror::Error;

/// Errors raised while building or binding elements.
#[derive(Debug, Error)]
pub enum Error {
    /// The tag name is not a valid element name.
    #[error("invalid tag name `{0}`")]
    InvalidTag(String),

    /// The attribute name is not a valid attribute name.
    #[error("invalid attribute name `{0}`")]
    InvalidAttribute(String),

    /// The namespace URI cannot be used to create elements.
    #[error("invalid namespace `{0}`")]
    InvalidNamespace(String),

    /// The operation requires an element but got another kind of node.
    #[error("`{0}` requires an element node")]
    NotAnElement(&'static str),

    /// Inserting the node would break the tree (cycle or leaf parent).
    #[error("hierarchy request error: {0}")]
    Hierarchy(&'static str),

    /// An `on*` key was given something that is neither a handler nor a string.
    #[error("`{0}` expects an event handler or an inline handler string")]
    InvalidListener(String),

    /// A configuration entry had a value of the wrong shape.
    #[error("`{key}` expects {expected}")]
    UnexpectedValue {
        key: String,
        expected: &'static str,
    },

    /// Props or configuration were not valid JSON for their target shape.
    #[error("invalid props: {0}")]
    InvalidProps(String),

    /// JSON decoding failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// An exception raised by the browser, carried as its message.
    #[error("host error: {0}")]
    Host(String),
}

impl Error {
    pub(crate) fn unexpected(key: &str, expected: &'static str) -> Self {
        Self::UnexpectedValue {
            key: key.to_owned(),
            expected,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
