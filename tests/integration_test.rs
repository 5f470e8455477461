//! Integration tests for the sts-xml crate.
//!
//! These tests exercise the public API end-to-end against realistic STS
//! response bodies.

use sts_xml::{InvalidXmlError, NamespaceBinding, NamespacedElement, STS_NAMESPACE_URI};

// ============================================================================
// Fixtures
// ============================================================================

const CLIENT_GRANTS_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<AssumeRoleWithClientGrantsResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <AssumeRoleWithClientGrantsResult>
    <AssumedRoleUser>
      <Arn></Arn>
      <AssumeRoleId></AssumeRoleId>
    </AssumedRoleUser>
    <Credentials>
      <AccessKeyId>Y4RJU1RNFGK48LGO9I2S</AccessKeyId>
      <SecretAccessKey>sYLRKS1Z7hSjluf6gEbb9066hnx315wHTiACPAjg</SecretAccessKey>
      <Expiration>2019-08-08T20:26:12Z</Expiration>
      <SessionToken>eyJhbGciOiJIUzUxMiIsInR5cCI6IkpXVCJ9</SessionToken>
    </Credentials>
    <SubjectFromToken>user@example.com</SubjectFromToken>
  </AssumeRoleWithClientGrantsResult>
  <ResponseMetadata>
    <RequestId>15B9E42EA6E3B8C4</RequestId>
  </ResponseMetadata>
</AssumeRoleWithClientGrantsResponse>"#;

const PREFIXED_RESPONSE: &str = r#"<sts:AssumeRoleResponse xmlns:sts="https://sts.amazonaws.com/doc/2011-06-15/">
  <sts:AssumeRoleResult>
    <sts:Credentials>
      <sts:AccessKeyId>AKIA</sts:AccessKeyId>
    </sts:Credentials>
  </sts:AssumeRoleResult>
</sts:AssumeRoleResponse>"#;

fn credentials(root: &NamespacedElement) -> NamespacedElement {
    root.find("AssumeRoleWithClientGrantsResult")
        .and_then(|result| result.find("Credentials"))
        .expect("credentials element")
}

// ============================================================================
// Response parsing
// ============================================================================

#[test]
fn test_extract_credentials() {
    let root =
        NamespacedElement::fromstring("AssumeRoleWithClientGrantsResponse", CLIENT_GRANTS_RESPONSE)
            .unwrap();
    assert_eq!(root.root_name(), "AssumeRoleWithClientGrantsResponse");
    assert_eq!(root.tag(), "AssumeRoleWithClientGrantsResponse");

    let creds = credentials(&root);
    assert_eq!(creds.root_name(), "AssumeRoleWithClientGrantsResponse");
    assert_eq!(
        creds.get_child_text("AccessKeyId", true).unwrap(),
        Some("Y4RJU1RNFGK48LGO9I2S")
    );
    assert_eq!(
        creds.get_child_text("SecretAccessKey", true).unwrap(),
        Some("sYLRKS1Z7hSjluf6gEbb9066hnx315wHTiACPAjg")
    );
    assert_eq!(
        creds.get_child_text("Expiration", true).unwrap(),
        Some("2019-08-08T20:26:12Z")
    );
    assert_eq!(
        creds.find("SessionToken").and_then(|t| t.text().map(str::to_string)),
        Some("eyJhbGciOiJIUzUxMiIsInR5cCI6IkpXVCJ9".to_string())
    );
}

#[test]
fn test_prefixed_document_matches_by_uri() {
    let root = NamespacedElement::fromstring("AssumeRoleResponse", PREFIXED_RESPONSE).unwrap();
    let key = root
        .find("AssumeRoleResult")
        .and_then(|r| r.find("Credentials"))
        .and_then(|c| c.get_child_text("AccessKeyId", true).ok().flatten().map(str::to_string));
    assert_eq!(key.as_deref(), Some("AKIA"));
}

#[test]
fn test_optional_fields() {
    let root =
        NamespacedElement::fromstring("AssumeRoleWithClientGrantsResponse", CLIENT_GRANTS_RESPONSE)
            .unwrap();
    let result = root.find("AssumeRoleWithClientGrantsResult").unwrap();

    assert_eq!(
        result.get_child_text("SubjectFromToken", false).unwrap(),
        Some("user@example.com")
    );
    assert_eq!(result.get_child_text("PackedPolicySize", false).unwrap(), None);

    let user = result.find("AssumedRoleUser").unwrap();
    assert_eq!(user.get_child_text("Arn", false).unwrap(), Some(""));
    assert_eq!(user.get_child_text("Arn", true).unwrap(), None);
}

#[test]
fn test_missing_required_field() {
    let root =
        NamespacedElement::fromstring("AssumeRoleWithClientGrantsResponse", CLIENT_GRANTS_RESPONSE)
            .unwrap();
    let creds = credentials(&root);

    let err = creds.get_child_text("SessionExpiration", true).unwrap_err();
    assert_eq!(err.root_name(), "AssumeRoleWithClientGrantsResponse");
    let message = err.to_string();
    assert!(message.contains("AssumeRoleWithClientGrantsResponse"));
    assert!(message.contains("SessionExpiration"));
}

#[test]
fn test_findall_and_whitespace_text() {
    let root =
        NamespacedElement::fromstring("AssumeRoleWithClientGrantsResponse", CLIENT_GRANTS_RESPONSE)
            .unwrap();
    let creds = credentials(&root);
    // Formatting whitespace is preserved as text
    assert_eq!(creds.text(), Some("\n      "));
    assert!(creds.findall("AccessKeyId").len() == 1);
    assert!(root.findall("Credentials").is_empty());
}

// ============================================================================
// Error surface
// ============================================================================

#[test]
fn test_unparsable_bodies() {
    let cases: [&[u8]; 5] = [
        b"",
        b"<AssumeRoleWithClientGrantsResponse>",
        b"<Error><Code>AccessDenied</Error>",
        b"<html><body>502 Bad Gateway</body></html> trailing",
        b"\xff\xfe<\x00",
    ];

    for body in cases {
        let err = NamespacedElement::fromstring("ClientGrants", body).unwrap_err();
        assert!(matches!(err, InvalidXmlError::Unparsable { .. }));
        assert!(
            err.to_string().starts_with("\"ClientGrants\" XML is not parsable. Message: "),
            "{err}"
        );
    }
}

// ============================================================================
// Namespace binding
// ============================================================================

#[test]
fn test_binding_from_config() {
    let binding: NamespaceBinding = serde_yaml::from_str("prefix: sts\nuri: urn:minio:sts\n").unwrap();
    let body = r#"<Response xmlns="urn:minio:sts"><Value>ok</Value></Response>"#;

    let root = NamespacedElement::fromstring_with_namespace(binding, "Response", body).unwrap();
    assert_eq!(root.get_child_text("Value", true).unwrap(), Some("ok"));

    // The same body does not match under the default STS binding
    let sts = NamespacedElement::fromstring("Response", body).unwrap();
    assert_eq!(sts.namespace().uri, STS_NAMESPACE_URI);
    assert!(sts.find("Value").is_none());
}

#[test]
fn test_wrappers_shared_across_threads() {
    let root =
        NamespacedElement::fromstring("AssumeRoleWithClientGrantsResponse", CLIENT_GRANTS_RESPONSE)
            .unwrap();
    let creds = credentials(&root);
    drop(root);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let creds = creds.clone();
            std::thread::spawn(move || {
                creds
                    .get_child_text("AccessKeyId", true)
                    .unwrap()
                    .map(str::to_string)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some("Y4RJU1RNFGK48LGO9I2S"));
    }
}
