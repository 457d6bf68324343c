//! # Canonical Bytes and Outcome Digests
//!
//! Audit idempotency compares screening outcomes by digest. Two outcomes
//! are "the same answer" exactly when their canonical byte sequences match,
//! so every digest in the workspace flows through [`CanonicalBytes::new`].
//!
//! Canonical form: compact JSON, object keys sorted lexicographically at
//! every depth, independent of how `serde_json` orders maps in a given
//! build. Scores are finite by construction, so float formatting is
//! deterministic.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::ValidationError;

/// Bytes produced exclusively by canonical serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    pub fn new(obj: &impl Serialize) -> Result<Self, ValidationError> {
        let value =
            serde_json::to_value(obj).map_err(|e| ValidationError::Serialization(e.to_string()))?;
        let mut out = Vec::new();
        write_canonical(&value, &mut out)?;
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) -> Result<(), ValidationError> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push(b'{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_scalar(&Value::String(key.clone()), out)?;
                out.push(b':');
                write_canonical(&map[key], out)?;
            }
            out.push(b'}');
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out)?;
            }
            out.push(b']');
        }
        scalar => write_scalar(scalar, out)?,
    }
    Ok(())
}

fn write_scalar(value: &Value, out: &mut Vec<u8>) -> Result<(), ValidationError> {
    serde_json::to_writer(out, value).map_err(|e| ValidationError::Serialization(e.to_string()))
}

/// SHA-256 digest of a screening outcome, rendered as `sha256:<hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeDigest(String);

impl OutcomeDigest {
    pub fn of(bytes: &CanonicalBytes) -> Self {
        let hash = Sha256::digest(bytes.as_bytes());
        let hex: String = hash.iter().map(|b| format!("{b:02x}")).collect();
        Self(format!("sha256:{hex}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OutcomeDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
