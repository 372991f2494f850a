//! XML name and qualified-name validation
//!
//! Namespace handling is flat per DOM Level 2: names are validated and
//! split at creation time, never resolved against in-scope declarations.

use crate::{DomError, DomResult};

/// Reserved namespace bound to the "xml" prefix
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
/// Reserved namespace bound to the "xmlns" prefix
pub const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-' || c == '.'
}

/// Validate an XML Name
pub fn validate_name(name: &str) -> DomResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => is_name_start(first) && chars.all(is_name_char),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DomError::InvalidCharacter {
            name: name.to_string(),
        })
    }
}

/// Split and validate a qualified name against its namespace URI.
/// Returns (prefix, local part).
pub fn split_qualified(
    namespace_uri: Option<&str>,
    qualified: &str,
) -> DomResult<(Option<String>, String)> {
    validate_name(qualified)?;

    let mut parts = qualified.split(':');
    let (prefix, local) = match (parts.next(), parts.next(), parts.next()) {
        (Some(name), None, _) => (None, name),
        (Some(""), _, _) | (_, Some(""), _) => {
            return Err(DomError::Namespace {
                reason: "qualified name has an empty prefix or local part",
            });
        }
        (Some(prefix), Some(local), None) => (Some(prefix), local),
        _ => {
            return Err(DomError::Namespace {
                reason: "qualified name contains more than one colon",
            });
        }
    };

    if let Some(prefix) = prefix {
        match (prefix, namespace_uri) {
            (_, None) => {
                return Err(DomError::Namespace {
                    reason: "prefixed name requires a namespace URI",
                });
            }
            ("xml", Some(ns)) if ns != XML_NS => {
                return Err(DomError::Namespace {
                    reason: "prefix \"xml\" must be bound to the XML namespace",
                });
            }
            ("xmlns", Some(ns)) if ns != XMLNS_NS => {
                return Err(DomError::Namespace {
                    reason: "prefix \"xmlns\" must be bound to the xmlns namespace",
                });
            }
            _ => {}
        }
    }

    if qualified == "xmlns" && namespace_uri != Some(XMLNS_NS) {
        return Err(DomError::Namespace {
            reason: "the name \"xmlns\" must be bound to the xmlns namespace",
        });
    }

    Ok((prefix.map(str::to_string), local.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        assert!(validate_name("div").is_ok());
        assert!(validate_name("_under").is_ok());
        assert!(validate_name("a-b.c").is_ok());
    }

    #[test]
    fn rejects_illegal_names() {
        assert!(matches!(
            validate_name(""),
            Err(DomError::InvalidCharacter { .. })
        ));
        assert!(validate_name("1div").is_err());
        assert!(validate_name("a b").is_err());
        assert!(validate_name("a<b").is_err());
    }

    #[test]
    fn splits_prefixed_names() {
        let (prefix, local) = split_qualified(Some("urn:x"), "x:title").unwrap();
        assert_eq!(prefix.as_deref(), Some("x"));
        assert_eq!(local, "title");
    }

    #[test]
    fn unprefixed_name_needs_no_namespace() {
        let (prefix, local) = split_qualified(None, "title").unwrap();
        assert!(prefix.is_none());
        assert_eq!(local, "title");
    }

    #[test]
    fn rejects_malformed_qualified_names() {
        assert!(matches!(
            split_qualified(Some("urn:x"), "a:b:c"),
            Err(DomError::Namespace { .. })
        ));
        assert!(split_qualified(Some("urn:x"), ":b").is_err());
        assert!(split_qualified(Some("urn:x"), "a:").is_err());
        assert!(split_qualified(None, "a:b").is_err());
    }

    #[test]
    fn enforces_reserved_prefixes() {
        assert!(split_qualified(Some(XML_NS), "xml:lang").is_ok());
        assert!(split_qualified(Some("urn:x"), "xml:lang").is_err());
        assert!(split_qualified(Some(XMLNS_NS), "xmlns:x").is_ok());
        assert!(split_qualified(Some("urn:x"), "xmlns:x").is_err());
        assert!(split_qualified(Some(XMLNS_NS), "xmlns").is_ok());
        assert!(split_qualified(Some("urn:x"), "xmlns").is_err());
    }
}
