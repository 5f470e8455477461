//! Namespace configuration for STS lookups.

use serde::{Deserialize, Serialize};

/// Prefix conventionally used for the STS document namespace.
pub const STS_NAMESPACE_PREFIX: &str = "sts";

/// STS document namespace URI.
pub const STS_NAMESPACE_URI: &str = "https://sts.amazonaws.com/doc/2011-06-15/";

/// Prefix-to-URI binding applied to every qualified lookup.
///
/// Documents are not required to declare the prefix themselves; matching is
/// done on the resolved namespace URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceBinding {
    /// Short prefix, used when rendering qualified names
    pub prefix: String,

    /// Namespace URI that child elements must resolve to
    pub uri: String,
}

impl NamespaceBinding {
    /// Create a binding for an arbitrary namespace.
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// The STS document namespace.
    pub fn sts() -> Self {
        Self::new(STS_NAMESPACE_PREFIX, STS_NAMESPACE_URI)
    }

    /// Render `name` as `prefix:name`.
    pub fn qualify(&self, name: &str) -> String {
        format!("{}:{}", self.prefix, name)
    }

    /// Whether an element with the given resolved namespace belongs to this binding.
    pub fn matches(&self, namespace: Option<&str>) -> bool {
        namespace == Some(self.uri.as_str())
    }
}

impl Default for NamespaceBinding {
    fn default() -> Self {
        Self::sts()
    }
}
