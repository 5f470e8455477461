//! Namespace-aware element wrapper.

use crate::config::NamespaceBinding;
use crate::error::InvalidXmlError;
use crate::parser::{parse_bytes, Document, Node, NodeId};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A parsed element bound to one XML namespace.
///
/// Child lookups only match elements whose resolved namespace equals the
/// bound URI, so callers query by local name alone. Every wrapper derived
/// from one parse shares the same immutable tree and root name.
#[derive(Clone)]
pub struct NamespacedElement {
    root_name: Arc<str>,
    namespace: Arc<NamespaceBinding>,
    document: Arc<Document>,
    node: NodeId,
}

impl NamespacedElement {
    /// Parse `data` with the STS namespace binding.
    ///
    /// `root_name` labels the document in error messages only.
    pub fn fromstring(
        root_name: impl Into<String>,
        data: impl AsRef<[u8]>,
    ) -> Result<Self, InvalidXmlError> {
        Self::fromstring_with_namespace(NamespaceBinding::sts(), root_name, data)
    }

    /// Parse `data` with an explicit namespace binding.
    pub fn fromstring_with_namespace(
        namespace: NamespaceBinding,
        root_name: impl Into<String>,
        data: impl AsRef<[u8]>,
    ) -> Result<Self, InvalidXmlError> {
        let root_name: String = root_name.into();

        let document = parse_bytes(data.as_ref()).map_err(|e| {
            debug!(root_name = %root_name, error = %e, "XML parse failed");
            InvalidXmlError::unparsable(&root_name, e)
        })?;

        debug!(
            root_name = %root_name,
            root_tag = %document.node(document.root()).local_name,
            elements = document.len(),
            "Parsed XML document"
        );

        let node = document.root();
        Ok(Self {
            root_name: Arc::from(root_name),
            namespace: Arc::new(namespace),
            document: Arc::new(document),
            node,
        })
    }

    /// First direct child named `name` in the bound namespace.
    pub fn find(&self, name: &str) -> Option<NamespacedElement> {
        self.matching_children(name).next().map(|id| self.wrap(id))
    }

    /// All direct children named `name` in the bound namespace, in document order.
    pub fn findall(&self, name: &str) -> Vec<NamespacedElement> {
        self.matching_children(name).map(|id| self.wrap(id)).collect()
    }

    /// Text of the first direct child named `name`.
    ///
    /// With `strict`, a missing child is an error and a present child yields
    /// its text, which is `None` when the child has no character data.
    /// Without `strict`, a missing child yields `None` and a present child
    /// always yields text, empty if it has none.
    pub fn get_child_text(&self, name: &str, strict: bool) -> Result<Option<&str>, InvalidXmlError> {
        let child = self.matching_children(name).next().map(|id| self.document.node(id));

        match child {
            Some(node) if strict => Ok(node.text.as_deref()),
            Some(node) => Ok(Some(node.text.as_deref().unwrap_or(""))),
            None if strict => {
                debug!(
                    root_name = %self.root_name,
                    tag = %self.namespace.qualify(name),
                    "Required child element missing"
                );
                Err(InvalidXmlError::missing_child(&self.root_name, name))
            }
            None => Ok(None),
        }
    }

    /// This element's own text, verbatim apart from line-ending normalization.
    pub fn text(&self) -> Option<&str> {
        self.current().text.as_deref()
    }

    /// Text following this element's end tag.
    pub fn tail(&self) -> Option<&str> {
        self.current().tail.as_deref()
    }

    /// Local name of this element.
    pub fn tag(&self) -> &str {
        &self.current().local_name
    }

    /// Resolved namespace URI of this element.
    pub fn namespace_uri(&self) -> Option<&str> {
        self.current().namespace.as_deref()
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn namespace(&self) -> &NamespaceBinding {
        &self.namespace
    }

    fn current(&self) -> &Node {
        self.document.node(self.node)
    }

    fn matching_children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.current().children.iter().copied().filter(move |&id| {
            let child = self.document.node(id);
            child.local_name == name && self.namespace.matches(child.namespace.as_deref())
        })
    }

    fn wrap(&self, node: NodeId) -> NamespacedElement {
        NamespacedElement {
            root_name: Arc::clone(&self.root_name),
            namespace: Arc::clone(&self.namespace),
            document: Arc::clone(&self.document),
            node,
        }
    }
}

impl fmt::Debug for NamespacedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespacedElement")
            .field("root_name", &self.root_name)
            .field("tag", &self.tag())
            .field("namespace", &self.namespace_uri())
            .finish()
    }
}

/// Two wrappers are equal when they point at the same node of the same parse.
impl PartialEq for NamespacedElement {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.document, &other.document)
            && self.node == other.node
            && self.root_name == other.root_name
    }
}

impl Eq for NamespacedElement {}
