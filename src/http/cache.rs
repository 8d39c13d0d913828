//! HTTP cache validator module
//!
//! Provides content fingerprints (used as `ETag` values) and the comparisons
//! behind `If-None-Match` and `If-Modified-Since`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::date::{parse_http_date, LastModified};

/// Digest used to fingerprint resource content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintAlgorithm {
    #[default]
    Sha256,
    /// Collision-prone; only kept to reproduce the tags older demos emit
    Md5,
}

/// How request validators are compared with the current resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Plain string equality for both validators
    #[default]
    Exact,
    /// Date comparison for `If-Modified-Since`, entity-tag lists, `*` and
    /// weak comparison for `If-None-Match`
    Rfc,
}

/// Fingerprint content as a quoted strong entity tag
///
/// The digest is base64 encoded (standard alphabet, padded).
///
/// # Returns
/// Quoted `ETag` string, e.g. `"LPJNul+wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ="`
pub fn fingerprint(content: &[u8], algorithm: FingerprintAlgorithm) -> String {
    let digest = match algorithm {
        FingerprintAlgorithm::Sha256 => STANDARD.encode(Sha256::digest(content)),
        FingerprintAlgorithm::Md5 => STANDARD.encode(Md5::digest(content)),
    };
    format!("\"{digest}\"")
}

/// Check whether the client's `If-None-Match` matches the current `ETag`
///
/// Returns true if matched (should return 304), false otherwise.
pub fn etag_matches(if_none_match: &str, etag: &str, mode: ValidationMode) -> bool {
    match mode {
        ValidationMode::Exact => if_none_match == etag,
        ValidationMode::Rfc => if_none_match.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || strip_weak(candidate) == strip_weak(etag)
        }),
    }
}

/// Check whether the resource is unchanged since the client's
/// `If-Modified-Since`
///
/// In exact mode the header must repeat the `Last-Modified` value verbatim.
/// In RFC mode any parseable date at or after the modification time counts,
/// unparseable dates never do.
pub fn not_modified_since(
    if_modified_since: &str,
    last_modified: &LastModified,
    mode: ValidationMode,
) -> bool {
    match mode {
        ValidationMode::Exact => if_modified_since == last_modified.header(),
        ValidationMode::Rfc => {
            parse_http_date(if_modified_since).is_some_and(|since| last_modified.time() <= since)
        }
    }
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}
