//! Wire types for call hierarchy results
//!
//! The shapes follow the Language Server Protocol: camelCase fields,
//! numeric symbol kinds and tags, `tags` omitted when empty.

use crate::symbol::DeclKey;
use crate::types::Range;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Symbol kind of a hierarchy node, using LSP `SymbolKind` codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HierarchyKind {
    Class = 5,
    Method = 6,
    Field = 8,
    Constructor = 9,
    Enum = 10,
    Interface = 11,
    EnumMember = 22,
}

impl HierarchyKind {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            5 => Some(Self::Class),
            6 => Some(Self::Method),
            8 => Some(Self::Field),
            9 => Some(Self::Constructor),
            10 => Some(Self::Enum),
            11 => Some(Self::Interface),
            22 => Some(Self::EnumMember),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Method => "method",
            Self::Field => "field",
            Self::Constructor => "constructor",
            Self::Enum => "enum",
            Self::Interface => "interface",
            Self::EnumMember => "enum member",
        }
    }
}

impl Serialize for HierarchyKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for HierarchyKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Self::from_code(code)
            .ok_or_else(|| de::Error::custom(format!("unsupported symbol kind {code}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolTag {
    Deprecated,
}

impl Serialize for SymbolTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SymbolTag::Deprecated => serializer.serialize_u8(1),
        }
    }
}

impl<'de> Deserialize<'de> for SymbolTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(SymbolTag::Deprecated),
            code => Err(de::Error::custom(format!("unsupported symbol tag {code}"))),
        }
    }
}

/// One declaration as a traversal point of the hierarchy.
///
/// `data` carries the declaration key; passing the node back verbatim is
/// enough to continue the traversal in a later request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    pub name: String,
    pub kind: HierarchyKind,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<SymbolTag>,
    pub uri: String,
    pub range: Range,
    pub selection_range: Range,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DeclKey>,
}

impl HierarchyNode {
    pub fn is_deprecated(&self) -> bool {
        self.tags.contains(&SymbolTag::Deprecated)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingCall {
    pub from: HierarchyNode,
    /// Call sites inside `from`, in discovery order
    pub from_ranges: Vec<Range>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingCall {
    pub to: HierarchyNode,
    /// Call sites inside the queried declaration, in discovery order
    pub from_ranges: Vec<Range>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::MemberKey;
    use serde_json::json;

    fn node(tags: Vec<SymbolTag>) -> HierarchyNode {
        HierarchyNode {
            name: "bar()".to_string(),
            kind: HierarchyKind::Method,
            detail: "void".to_string(),
            tags,
            uri: "file:///w/src/org/sample/CallHierarchy.java".to_string(),
            range: Range::new(25, 4, 27, 5),
            selection_range: Range::new(25, 16, 25, 19),
            data: Some(DeclKey {
                type_path: "org.sample.CallHierarchy.Base".to_string(),
                member: MemberKey::Method {
                    name: "bar".to_string(),
                    params: Vec::new(),
                },
            }),
        }
    }

    #[test]
    fn test_lsp_shape() {
        let value = serde_json::to_value(node(Vec::new())).unwrap();
        assert_eq!(value["kind"], json!(6));
        assert_eq!(value["selectionRange"]["start"], json!({"line": 25, "character": 16}));
        assert!(value.get("tags").is_none());

        let deprecated = serde_json::to_value(node(vec![SymbolTag::Deprecated])).unwrap();
        assert_eq!(deprecated["tags"], json!([1]));
    }

    #[test]
    fn test_node_survives_the_wire() {
        let original = node(vec![SymbolTag::Deprecated]);
        let text = serde_json::to_string(&original).unwrap();
        let back: HierarchyNode = serde_json::from_str(&text).unwrap();
        assert_eq!(back, original);
        assert!(back.is_deprecated());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let mut value = serde_json::to_value(node(Vec::new())).unwrap();
        value["kind"] = json!(99);
        assert!(serde_json::from_value::<HierarchyNode>(value).is_err());
    }
}
