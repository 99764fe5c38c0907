// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client identity parsing.
//!
//! The ledger gateway authenticates the client certificate and forwards an
//! identity string of the form:
//!
//! ```text
//! x509::<subject DN>::<issuer DN>
//! ```
//!
//! The subject DN may use the slash form (`/C=US/O=Org1/OU=client/CN=User1`)
//! or the comma form (`CN=User1,OU=client,O=Org1,C=US`). The owner of an
//! asset is the subject's common name.

use std::fmt;

/// Only scheme accepted in an identity token.
pub const X509_SCHEME: &str = "x509";

/// Number of `::`-delimited segments in a well-formed token.
const TOKEN_SEGMENTS: usize = 3;

/// Attribute name of the common name within a DN.
const COMMON_NAME: &str = "CN";

/// Identity parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("caller identity is missing")]
    Missing,

    #[error("expected {expected} '::'-delimited segments, found {found}")]
    SegmentCount { expected: usize, found: usize },

    #[error("unsupported identity scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("malformed distinguished name attribute '{0}'")]
    MalformedAttribute(String),

    #[error("subject has no common name")]
    MissingCommonName,
}

/// A parsed distinguished name, attributes kept in the order they appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinguishedName {
    attributes: Vec<(String, String)>,
}

impl DistinguishedName {
    /// Parse either the slash form or the comma form of a DN.
    ///
    /// Values may carry RFC 4514 escapes (`\,`, `\+`, `\\`, `\2C`, ...).
    /// In the comma form an unescaped `+` separates the attributes of a
    /// multi-valued RDN.
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        let trimmed = raw.trim();
        let parts = if let Some(rest) = trimmed.strip_prefix('/') {
            split_unescaped(rest, &['/'])
        } else {
            split_unescaped(trimmed, &[',', '+'])
        };

        let mut attributes = Vec::with_capacity(parts.len());
        for part in parts {
            let part = part.trim_start();
            if part.trim_end().is_empty() {
                continue;
            }
            let malformed = || IdentityError::MalformedAttribute(part.trim_end().to_string());
            let (name, value) = part.split_once('=').ok_or_else(malformed)?;
            let name = name.trim();
            if name.is_empty() || name.contains('\\') {
                return Err(malformed());
            }
            let value = unescape_value(trim_value(value)).ok_or_else(malformed)?;
            attributes.push((name.to_string(), value));
        }

        Ok(Self { attributes })
    }

    /// First value of the named attribute (case-insensitive name match).
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Subject common name, if present and non-empty.
    pub fn common_name(&self) -> Option<&str> {
        self.attribute(COMMON_NAME).filter(|cn| !cn.is_empty())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self
            .attributes
            .iter()
            .map(|(name, value)| format!("{name}={}", escape_value(value)))
            .collect();
        write!(f, "{}", joined.join(","))
    }
}

/// A structured client identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub scheme: String,
    pub subject: DistinguishedName,
    pub issuer: DistinguishedName,
}

impl ClientIdentity {
    /// Parse an `x509::<subject>::<issuer>` token.
    pub fn parse(token: &str) -> Result<Self, IdentityError> {
        let segments: Vec<&str> = token.split("::").collect();
        if segments.len() != TOKEN_SEGMENTS {
            return Err(IdentityError::SegmentCount {
                expected: TOKEN_SEGMENTS,
                found: segments.len(),
            });
        }

        let scheme = segments[0].trim();
        if scheme != X509_SCHEME {
            return Err(IdentityError::UnsupportedScheme(scheme.to_string()));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            subject: DistinguishedName::parse(segments[1])?,
            issuer: DistinguishedName::parse(segments[2])?,
        })
    }

    /// The owner identifier for this client.
    pub fn owner_id(&self) -> Result<&str, IdentityError> {
        self.subject
            .common_name()
            .ok_or(IdentityError::MissingCommonName)
    }
}

/// Resolve the caller's owner identifier from an identity token.
pub fn resolve_caller_id(token: &str) -> Result<String, IdentityError> {
    let identity = ClientIdentity::parse(token)?;
    identity.owner_id().map(str::to_string)
}

/// Split on any separator not preceded by a backslash escape.
fn split_unescaped<'a>(input: &'a str, separators: &[char]) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if separators.contains(&c) {
            parts.push(&input[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Trim surrounding whitespace, keeping a trailing space that is escaped.
fn trim_value(value: &str) -> &str {
    let value = value.trim_start();
    let trimmed = value.trim_end();
    let backslashes = trimmed.bytes().rev().take_while(|b| *b == b'\\').count();
    if backslashes % 2 == 1 {
        if let Some(kept) = value[trimmed.len()..].chars().next() {
            return &value[..trimmed.len() + kept.len_utf8()];
        }
    }
    trimmed
}

/// Resolve backslash escapes. `None` on a dangling escape, a bad hex pair,
/// or hex pairs that do not form UTF-8.
fn unescape_value(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let next = *bytes.get(i + 1)?;
        if next.is_ascii_hexdigit() {
            let pair = value.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(pair, 16).ok()?);
            i += 3;
        } else {
            out.push(next);
            i += 2;
        }
    }
    String::from_utf8(out).ok()
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '/') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
