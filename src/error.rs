//! Error types for STS XML parsing.

use thiserror::Error;

/// Raised when an STS document cannot be parsed or is missing a required element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidXmlError {
    #[error("\"{root_name}\" XML is not parsable. Message: {message}")]
    Unparsable { root_name: String, message: String },

    #[error("Invalid XML provided for \"{root_name}\" - erroring tag <{tag}>. Message: element not found")]
    MissingChild { root_name: String, tag: String },
}

impl InvalidXmlError {
    pub(crate) fn unparsable(root_name: &str, cause: impl std::fmt::Display) -> Self {
        Self::Unparsable {
            root_name: root_name.to_string(),
            message: cause.to_string(),
        }
    }

    pub(crate) fn missing_child(root_name: &str, tag: &str) -> Self {
        Self::MissingChild {
            root_name: root_name.to_string(),
            tag: tag.to_string(),
        }
    }

    /// Label of the document that failed.
    pub fn root_name(&self) -> &str {
        match self {
            Self::Unparsable { root_name, .. } | Self::MissingChild { root_name, .. } => root_name,
        }
    }
}
