//! Namespace-aware XML parsing for Security Token Service responses.
//!
//! Wraps a parsed XML element and binds the STS document namespace so that
//! response fields can be looked up by local name alone.
//!
//! # Features
//!
//! - Namespace-qualified child lookup (`find`, `findall`)
//! - Strict and lenient child text extraction (`get_child_text`)
//! - Verbatim element text with the text/tail model
//! - A single error type, [`InvalidXmlError`], for unparsable input and
//!   missing required elements
//!
//! # Example
//!
//! ```
//! use sts_xml::NamespacedElement;
//!
//! let body = r#"<AssumeRoleWithClientGrantsResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
//!   <AssumeRoleWithClientGrantsResult>
//!     <Credentials>
//!       <AccessKeyId>Y4RJU1RNFGK48LGO9I2S</AccessKeyId>
//!     </Credentials>
//!   </AssumeRoleWithClientGrantsResult>
//! </AssumeRoleWithClientGrantsResponse>"#;
//!
//! let root = NamespacedElement::fromstring("AssumeRoleWithClientGrantsResponse", body)?;
//! let credentials = root
//!     .find("AssumeRoleWithClientGrantsResult")
//!     .and_then(|result| result.find("Credentials"))
//!     .expect("credentials present");
//! assert_eq!(
//!     credentials.get_child_text("AccessKeyId", true)?,
//!     Some("Y4RJU1RNFGK48LGO9I2S")
//! );
//! # Ok::<(), sts_xml::InvalidXmlError>(())
//! ```

pub mod config;
pub mod element;
pub mod error;
mod parser;

pub use config::{NamespaceBinding, STS_NAMESPACE_PREFIX, STS_NAMESPACE_URI};
pub use element::NamespacedElement;
pub use error::InvalidXmlError;
