//! Content identities for workspace files and synthetic library views

use crate::error::{HierarchyError, HierarchyResult};
use crate::hierarchy::identity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// How a synthetic view was produced from its library artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewFormat {
    /// Attached source shipped with the artifact
    Source,
    /// Signature-only stub
    Stub,
    /// Decompiled or disassembled class file
    Decompiled,
}

impl ViewFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewFormat::Source => "source",
            ViewFormat::Stub => "stub",
            ViewFormat::Decompiled => "decompiled",
        }
    }
}

impl FromStr for ViewFormat {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" => Ok(ViewFormat::Source),
            "stub" => Ok(ViewFormat::Stub),
            "decompiled" => Ok(ViewFormat::Decompiled),
            _ => Err("Unknown view format"),
        }
    }
}

/// Identity of a piece of content a range can point into.
///
/// The two variants are deliberately distinct types of content: only
/// [`ContentId::Workspace`] is editable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentId {
    /// An editable file, by absolute path
    Workspace { path: PathBuf },
    /// A read-only view of a type inside a library artifact
    Synthetic {
        artifact: Arc<str>,
        type_name: String,
        format: ViewFormat,
    },
}

impl ContentId {
    pub fn workspace(path: impl Into<PathBuf>) -> Self {
        ContentId::Workspace { path: path.into() }
    }

    pub fn synthetic(artifact: &str, type_name: &str, format: ViewFormat) -> Self {
        ContentId::Synthetic {
            artifact: artifact.into(),
            type_name: type_name.to_string(),
            format,
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, ContentId::Workspace { .. })
    }

    pub fn workspace_path(&self) -> Option<&Path> {
        match self {
            ContentId::Workspace { path } => Some(path),
            ContentId::Synthetic { .. } => None,
        }
    }

    /// Render as a URI. Workspace files use `file://`, synthetic views use
    /// the `jdt://` scheme.
    pub fn uri(&self) -> String {
        match self {
            ContentId::Workspace { path } => file_uri(path),
            ContentId::Synthetic {
                artifact,
                type_name,
                format,
            } => identity::synthetic_uri(artifact, type_name, *format),
        }
    }

    /// Inverse of [`ContentId::uri`]
    pub fn parse(uri: &str) -> HierarchyResult<Self> {
        if let Some(rest) = uri.strip_prefix("file://") {
            let decoded = percent_decode(rest).ok_or_else(|| HierarchyError::InvalidUri {
                uri: uri.to_string(),
                reason: "malformed percent escape".to_string(),
            })?;
            return Ok(ContentId::Workspace {
                path: PathBuf::from(decoded),
            });
        }
        if uri.starts_with(identity::SYNTHETIC_SCHEME_PREFIX) {
            return identity::parse_synthetic_uri(uri);
        }
        Err(HierarchyError::InvalidUri {
            uri: uri.to_string(),
            reason: "unsupported scheme".to_string(),
        })
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}

fn file_uri(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut uri = String::from("file://");
    if !raw.starts_with('/') {
        uri.push('/');
    }
    uri.push_str(&percent_encode(&raw));
    uri
}

/// Percent-encode everything outside the unreserved set, keeping `/`
pub(crate) fn percent_encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

pub(crate) fn percent_decode(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = raw.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_uri_round_trip() {
        let id = ContentId::workspace("/work/hello/src/org/sample/Call Hierarchy.java");
        let uri = id.uri();
        assert_eq!(
            uri,
            "file:///work/hello/src/org/sample/Call%20Hierarchy.java"
        );
        assert!(id.is_editable());
        assert_eq!(ContentId::parse(&uri).unwrap(), id);
    }

    #[test]
    fn test_synthetic_is_not_editable() {
        let id = ContentId::synthetic(
            "commons-lang3-3.5.jar",
            "org.apache.commons.lang3.text.WordUtils",
            ViewFormat::Source,
        );
        assert!(!id.is_editable());
        assert!(id.workspace_path().is_none());
        assert!(id.uri().starts_with("jdt://"));
    }

    #[test]
    fn test_unknown_scheme_is_rejected() {
        let err = ContentId::parse("http://example.com/Foo.java").unwrap_err();
        assert!(matches!(err, HierarchyError::InvalidUri { .. }));
    }

    #[test]
    fn test_view_format_from_str() {
        assert_eq!("stub".parse::<ViewFormat>().unwrap(), ViewFormat::Stub);
        assert!("bytecode".parse::<ViewFormat>().is_err());
    }
}
