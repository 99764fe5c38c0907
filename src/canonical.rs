// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Canonical Encoding
//!
//! Every organization that endorses a ledger write must produce the same
//! bytes for the same logical record, otherwise the state hashes computed by
//! independent replicas diverge. This module turns any serializable record
//! into a canonical JSON form:
//!
//! - object keys are sorted ascending (UTF-8 byte order) at every depth,
//!   including objects nested inside arrays
//! - output is whitespace-minimal
//! - non-integer numbers are rejected, numeric-looking fields travel as strings
//!
//! ```rust,ignore
//! let bytes = canonical::encode(&asset)?;
//! let digest = canonical::state_digest(&bytes);
//! ```

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Errors raised while producing a canonical encoding.
#[derive(Debug, thiserror::Error)]
pub enum CanonicalError {
    /// The record could not be represented as JSON (e.g. non-string map keys).
    #[error("record is not encodable: {0}")]
    Unencodable(#[from] serde_json::Error),

    /// A floating-point number was found at the given JSON path.
    #[error("floating-point value at {path} is not allowed in ledger records")]
    FloatNotAllowed { path: String },
}

pub type CanonicalResult<T> = Result<T, CanonicalError>;

/// Encode a record to canonical JSON bytes.
pub fn encode<T: Serialize + ?Sized>(record: &T) -> CanonicalResult<Vec<u8>> {
    let value = serde_json::to_value(record)?;
    let canonical = canonicalize_at(value, "$")?;
    Ok(serde_json::to_vec(&canonical)?)
}

/// Encode a record to canonical JSON text.
pub fn encode_to_string<T: Serialize + ?Sized>(record: &T) -> CanonicalResult<String> {
    let value = serde_json::to_value(record)?;
    let canonical = canonicalize_at(value, "$")?;
    Ok(serde_json::to_string(&canonical)?)
}

/// Rebuild a JSON value with every object's keys in ascending order.
///
/// Entries are re-inserted in sorted order so the result is canonical whether
/// `serde_json::Map` is backed by a `BTreeMap` or by an insertion-ordered map.
fn canonicalize_at(value: Value, path: &str) -> CanonicalResult<Value> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let mut sorted = Map::new();
            for (key, child) in entries {
                let child_path = format!("{path}.{key}");
                sorted.insert(key, canonicalize_at(child, &child_path)?);
            }
            Ok(Value::Object(sorted))
        }
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| canonicalize_at(item, &format!("{path}[{i}]")))
            .collect::<CanonicalResult<Vec<_>>>()
            .map(Value::Array),
        Value::Number(n) if n.is_f64() => Err(CanonicalError::FloatNotAllowed {
            path: path.to_string(),
        }),
        other => Ok(other),
    }
}

/// Lowercase hex SHA-256 of canonical bytes.
///
/// Replicas compare this digest to confirm they stored identical values.
pub fn state_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn key_order_does_not_change_bytes() {
        let mut first = Map::new();
        first.insert("ownedBy".into(), json!("User1"));
        first.insert("documentNo".into(), json!("671"));
        first.insert("documentLink".into(), json!("https://www.google.com"));

        let mut second = Map::new();
        second.insert("documentLink".into(), json!("https://www.google.com"));
        second.insert("documentNo".into(), json!("671"));
        second.insert("ownedBy".into(), json!("User1"));

        let a = encode(&Value::Object(first)).unwrap();
        let b = encode(&Value::Object(second)).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            String::from_utf8(a).unwrap(),
            r#"{"documentLink":"https://www.google.com","documentNo":"671","ownedBy":"User1"}"#
        );
    }

    #[test]
    fn struct_field_order_is_irrelevant() {
        #[derive(Serialize)]
        struct Zyx {
            z: &'static str,
            y: &'static str,
            x: &'static str,
        }
        #[derive(Serialize)]
        struct Xyz {
            x: &'static str,
            y: &'static str,
            z: &'static str,
        }

        let a = encode(&Zyx { z: "3", y: "2", x: "1" }).unwrap();
        let b = encode(&Xyz { x: "1", y: "2", z: "3" }).unwrap();
        assert_eq!(a, b);
        assert_eq!(state_digest(&a), state_digest(&b));
    }

    #[test]
    fn nested_objects_inside_arrays_are_sorted() {
        let value = json!({
            "b": [{"d": "1", "c": {"f": "2", "e": "3"}}],
            "a": "0"
        });
        let text = encode_to_string(&value).unwrap();
        assert_eq!(text, r#"{"a":"0","b":[{"c":{"e":"3","f":"2"},"d":"1"}]}"#);
    }

    #[test]
    fn array_order_is_preserved() {
        let text = encode_to_string(&json!(["b", "a", "c"])).unwrap();
        assert_eq!(text, r#"["b","a","c"]"#);
    }

    #[test]
    fn floats_are_rejected_with_path() {
        let err = encode(&json!({"outer": {"size": 1.5}})).unwrap_err();
        match err {
            CanonicalError::FloatNotAllowed { path } => assert_eq!(path, "$.outer.size"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn integers_are_accepted() {
        let text = encode_to_string(&json!({"count": 3})).unwrap();
        assert_eq!(text, r#"{"count":3}"#);
    }

    #[test]
    fn non_string_map_keys_are_unencodable() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "blob");
        let err = encode(&map).unwrap_err();
        assert!(matches!(err, CanonicalError::Unencodable(_)));
    }

    #[test]
    fn digest_is_hex_sha256() {
        let digest = state_digest(b"");
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
