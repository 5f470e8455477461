//! XML tree construction.
//!
//! Builds an owned, immutable element tree on top of quick-xml's
//! namespace-aware reader. Character data follows the text/tail model:
//! `text` is what precedes an element's first child, `tail` is what follows
//! its end tag.

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::borrow::Cow;
use thiserror::Error;

/// Index of a node inside a [`Document`].
pub type NodeId = usize;

/// Low-level parse failures. Surfaced to callers through
/// [`InvalidXmlError`](crate::error::InvalidXmlError).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("no element found")]
    NoRootElement,

    #[error("junk after document element")]
    TrailingContent,

    #[error("unclosed element <{0}>")]
    UnclosedElement(String),

    #[error("unbound prefix on element <{0}>")]
    UnboundPrefix(String),

    #[error("XML declaration not at start of document")]
    MisplacedDeclaration,

    #[error("DOCTYPE after document element")]
    MisplacedDoctype,

    #[error("not well-formed name: {0}")]
    InvalidName(String),

    #[error("'<' not allowed in value of attribute {0}")]
    LtInAttributeValue(String),

    #[error("not well-formed character U+{0:04X}")]
    InvalidCharacter(u32),

    #[error("{0}")]
    Syntax(String),
}

impl From<quick_xml::Error> for ParseError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Syntax(e.to_string())
    }
}

/// A single element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Resolved namespace URI, if the element is in one
    pub namespace: Option<String>,
    /// Tag name without prefix
    pub local_name: String,
    /// Character data before the first child element
    pub text: Option<String>,
    /// Character data after the end tag
    pub tail: Option<String>,
    /// Child elements in document order
    pub children: Vec<NodeId>,
}

/// A parsed document. The root element is always node 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// The document element.
    pub fn root(&self) -> NodeId {
        0
    }

    /// Look up a node by id. Ids handed out by this document are always valid.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Total number of elements. Never zero.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Parse raw bytes into a [`Document`].
pub fn parse_bytes(data: &[u8]) -> Result<Document, ParseError> {
    let xml = std::str::from_utf8(data).map_err(|e| ParseError::InvalidUtf8(e.to_string()))?;
    parse_document(xml)
}

/// Parse an XML string into a [`Document`].
pub fn parse_document(xml: &str) -> Result<Document, ParseError> {
    let mut reader = NsReader::from_str(xml);
    let mut builder = TreeBuilder::default();

    loop {
        match reader.read_resolved_event()? {
            (ns, Event::Start(ref e)) => {
                let namespace = resolve_namespace(ns, e)?;
                let id = builder.open(namespace, e)?;
                builder.stack.push(id);
            }

            (ns, Event::Empty(ref e)) => {
                // Self-closing tags never become the current element
                let namespace = resolve_namespace(ns, e)?;
                builder.open(namespace, e)?;
                if builder.stack.is_empty() {
                    builder.root_closed = true;
                }
            }

            (_, Event::End(_)) => {
                builder.stack.pop();
                if builder.stack.is_empty() {
                    builder.root_closed = true;
                }
            }

            (_, Event::Text(ref e)) => {
                // Line endings are normalized before unescaping so `&#13;` survives
                let raw = normalize_line_endings(decode_str(e)?);
                let text = unescape(&raw).map_err(|err| ParseError::Syntax(err.to_string()))?;
                check_chars(&text)?;
                builder.append_text(&text)?;
            }

            (_, Event::CData(ref e)) => {
                let text = normalize_line_endings(decode_str(e)?);
                check_chars(&text)?;
                builder.append_text(&text)?;
            }

            (_, Event::Decl(_)) if builder.started => return Err(ParseError::MisplacedDeclaration),

            (_, Event::DocType(_)) if !builder.nodes.is_empty() => {
                return Err(ParseError::MisplacedDoctype)
            }

            (_, Event::Eof) => break,

            // Comments, processing instructions, leading declaration and DOCTYPE
            _ => {}
        }
        builder.started = true;
    }

    builder.finish()
}

#[derive(Default)]
struct TreeBuilder {
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
    root_closed: bool,
    started: bool,
}

impl TreeBuilder {
    fn open(&mut self, namespace: Option<String>, e: &BytesStart) -> Result<NodeId, ParseError> {
        if self.root_closed {
            return Err(ParseError::TrailingContent);
        }

        let local_name = decode(e.local_name().as_ref())?;
        check_name(&decode(e.name().as_ref())?)?;
        check_name(&local_name)?;

        // Attribute values are not kept, but must still be well-formed
        for attr in e.attributes() {
            let attr = attr.map_err(|err| ParseError::Syntax(err.to_string()))?;
            let key = decode(attr.key.as_ref())?;
            check_name(&key)?;
            if attr.value.contains(&b'<') {
                return Err(ParseError::LtInAttributeValue(key));
            }
            check_chars(decode_str(&attr.value)?)?;
        }

        let id = self.nodes.len();
        self.nodes.push(Node {
            namespace,
            local_name,
            text: None,
            tail: None,
            children: Vec::new(),
        });
        if let Some(&parent) = self.stack.last() {
            self.nodes[parent].children.push(id);
        }
        Ok(id)
    }

    fn append_text(&mut self, text: &str) -> Result<(), ParseError> {
        if text.is_empty() {
            return Ok(());
        }

        let Some(&current) = self.stack.last() else {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(if self.root_closed {
                ParseError::TrailingContent
            } else {
                ParseError::Syntax("text outside of document element".to_string())
            });
        };

        let last_child = self.nodes[current].children.last().copied();
        let target = match last_child {
            Some(last_child) => &mut self.nodes[last_child].tail,
            None => &mut self.nodes[current].text,
        };
        target.get_or_insert_with(String::new).push_str(text);
        Ok(())
    }

    fn finish(self) -> Result<Document, ParseError> {
        if let Some(&open) = self.stack.last() {
            return Err(ParseError::UnclosedElement(self.nodes[open].local_name.clone()));
        }
        if self.nodes.is_empty() {
            return Err(ParseError::NoRootElement);
        }
        Ok(Document { nodes: self.nodes })
    }
}

fn resolve_namespace(ns: ResolveResult, e: &BytesStart) -> Result<Option<String>, ParseError> {
    match ns {
        ResolveResult::Bound(uri) => decode(uri.as_ref()).map(Some),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(_) => Err(ParseError::UnboundPrefix(decode(e.name().as_ref())?)),
    }
}

fn decode(bytes: &[u8]) -> Result<String, ParseError> {
    decode_str(bytes).map(str::to_string)
}

fn decode_str(bytes: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidUtf8(e.to_string()))
}

/// `\r\n` and lone `\r` become `\n` (XML 1.0 section 2.11).
fn normalize_line_endings(raw: &str) -> Cow<'_, str> {
    if raw.contains('\r') {
        Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(raw)
    }
}

fn check_chars(text: &str) -> Result<(), ParseError> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(ParseError::InvalidCharacter(c as u32)),
        None => Ok(()),
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn check_name(name: &str) -> Result<(), ParseError> {
    match name.chars().next() {
        Some(c) if is_name_start_char(c) => Ok(()),
        _ => Err(ParseError::InvalidName(name.to_string())),
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}
