//! Addressable identities for library content
//!
//! Types from library artifacts have no workspace file. They are addressed
//! by a `jdt://` URI built from the artifact id and the top-level type name,
//! so the same type always yields the same URI and a consumer can tell from
//! the scheme that the target is read-only.

use crate::error::{HierarchyError, HierarchyResult};
use crate::types::{ContentId, ViewFormat, percent_decode, percent_encode};

pub const SYNTHETIC_SCHEME_PREFIX: &str = "jdt://";

const CONTENTS_PREFIX: &str = "jdt://contents/";
const DEFAULT_PACKAGE: &str = "(default package)";
const CLASS_SUFFIX: &str = ".class";

/// Encode one path segment, including any `/`
fn segment(raw: &str) -> String {
    percent_encode(raw).replace('/', "%2F")
}

/// `jdt://contents/<artifact>/<package>/<Type>.class?format=<format>`
pub fn synthetic_uri(artifact: &str, type_name: &str, format: ViewFormat) -> String {
    let (package, simple) = match type_name.rsplit_once('.') {
        Some((package, simple)) => (package, simple),
        None => (DEFAULT_PACKAGE, type_name),
    };
    format!(
        "{CONTENTS_PREFIX}{}/{}/{}{CLASS_SUFFIX}?format={}",
        segment(artifact),
        segment(package),
        segment(simple),
        format.as_str()
    )
}

/// Inverse of [`synthetic_uri`]
pub fn parse_synthetic_uri(uri: &str) -> HierarchyResult<ContentId> {
    let invalid = |reason: &str| HierarchyError::InvalidUri {
        uri: uri.to_string(),
        reason: reason.to_string(),
    };

    let rest = uri
        .strip_prefix(CONTENTS_PREFIX)
        .ok_or_else(|| invalid("expected jdt://contents/"))?;
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
    let format = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("format="))
        .unwrap_or(ViewFormat::Source.as_str())
        .parse::<ViewFormat>()
        .map_err(invalid)?;

    let segments: Vec<&str> = path.split('/').collect();
    let [artifact, package, file] = segments.as_slice() else {
        return Err(invalid("expected <artifact>/<package>/<Type>.class"));
    };
    let decode = |raw: &str| percent_decode(raw).ok_or_else(|| invalid("malformed percent escape"));
    let artifact = decode(artifact)?;
    let package = decode(package)?;
    let simple = decode(
        file.strip_suffix(CLASS_SUFFIX)
            .ok_or_else(|| invalid("expected a .class file"))?,
    )?;
    if artifact.is_empty() || simple.is_empty() {
        return Err(invalid("empty artifact or type"));
    }

    let type_name = if package == DEFAULT_PACKAGE {
        simple
    } else {
        format!("{package}.{simple}")
    };
    Ok(ContentId::synthetic(&artifact, &type_name, format))
}
