//! Re-resolvable declaration keys carried inside hierarchy items

use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything needed to find a declaration again in a later snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclKey {
    /// Dotted path of the declaring type (or of the type itself)
    pub type_path: String,
    pub member: MemberKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MemberKey {
    Type,
    Method {
        name: String,
        params: Vec<String>,
    },
    Constructor {
        params: Vec<String>,
    },
    Field {
        name: String,
    },
    Initializer {
        ordinal: u32,
        #[serde(rename = "static")]
        is_static: bool,
    },
}

impl fmt::Display for DeclKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            MemberKey::Type => write!(f, "{}", self.type_path),
            MemberKey::Method { name, params } => {
                write!(f, "{}#{}({})", self.type_path, name, params.join(","))
            }
            MemberKey::Constructor { params } => {
                write!(f, "{}#<init>({})", self.type_path, params.join(","))
            }
            MemberKey::Field { name } => write!(f, "{}#{}", self.type_path, name),
            MemberKey::Initializer { ordinal, is_static } => {
                let prefix = if *is_static { "static " } else { "" };
                write!(f, "{}#{}{{{}}}", self.type_path, prefix, ordinal)
            }
        }
    }
}
