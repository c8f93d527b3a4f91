//! Declarations extracted from Java compilation units

mod key;

pub use key::{DeclKey, MemberKey};

use crate::types::Range;
use bitflags::bitflags;
use std::ops;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
    Method,
    Constructor,
    Field,
    EnumConstant,
    /// Instance or static initializer block
    Initializer,
}

impl DeclKind {
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            DeclKind::Class
                | DeclKind::Interface
                | DeclKind::Enum
                | DeclKind::Record
                | DeclKind::Annotation
        )
    }

    pub fn is_field_like(&self) -> bool {
        matches!(self, DeclKind::Field | DeclKind::EnumConstant)
    }

    /// Kinds whose parameter list is part of their identity
    pub fn has_parameters(&self) -> bool {
        matches!(self, DeclKind::Method | DeclKind::Constructor)
    }
}

bitflags! {
    /// Java modifiers plus the deprecation marker
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u16 {
        const PUBLIC     = 1 << 0;
        const PROTECTED  = 1 << 1;
        const PRIVATE    = 1 << 2;
        const STATIC     = 1 << 3;
        const ABSTRACT   = 1 << 4;
        const FINAL      = 1 << 5;
        const DEFAULT    = 1 << 6;
        const NATIVE     = 1 << 7;
        const DEPRECATED = 1 << 8;
    }
}

impl Modifiers {
    /// Map a modifier keyword to its flag
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "public" => Some(Self::PUBLIC),
            "protected" => Some(Self::PROTECTED),
            "private" => Some(Self::PRIVATE),
            "static" => Some(Self::STATIC),
            "abstract" => Some(Self::ABSTRACT),
            "final" => Some(Self::FINAL),
            "default" => Some(Self::DEFAULT),
            "native" => Some(Self::NATIVE),
            _ => None,
        }
    }
}

/// A parameter or value type as written in source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeText {
    /// Source text with whitespace collapsed, generics kept
    pub display: String,
    /// Base name without type arguments, annotations or array brackets
    pub erased: String,
    /// Array dimensions, including the varargs dimension
    pub dims: u32,
}

impl TypeText {
    /// Erased form including array brackets, used in identities
    pub fn erased_signature(&self) -> String {
        let mut out = self.erased.clone();
        for _ in 0..self.dims {
            out.push_str("[]");
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: DeclKind,
    pub name: String,
    /// Dotted path of the type this declaration is (for types) or belongs to
    pub type_path: String,
    /// Index of the enclosing type declaration in the same unit
    pub parent: Option<u32>,
    pub params: Vec<TypeText>,
    pub varargs: bool,
    /// Return type for methods, declared type for fields
    pub value_type: Option<TypeText>,
    pub modifiers: Modifiers,
    /// Type parameters declared by this type or method
    pub type_params: Vec<String>,
    /// Declared superclass of a class
    pub superclass: Option<TypeText>,
    /// Implemented (or, for interfaces, extended) interfaces
    pub interfaces: Vec<TypeText>,
    /// Position of an initializer among the initializers of its type
    pub ordinal: u32,
    pub range: Range,
    /// Name token, or the opening token for initializers
    pub selection: Range,
    /// Byte range of the node identifying this declaration
    pub node: ops::Range<usize>,
    /// Byte ranges of the executable parts (body, initializer value, arguments)
    pub bodies: Vec<ops::Range<usize>>,
    /// Byte offset where a type's body starts
    pub body_start: Option<usize>,
}

impl Declaration {
    pub fn is_deprecated(&self) -> bool {
        self.modifiers.contains(Modifiers::DEPRECATED)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    /// Identity of this declaration that survives re-parsing
    pub fn key(&self) -> DeclKey {
        let member = match self.kind {
            kind if kind.is_type() => MemberKey::Type,
            DeclKind::Method => MemberKey::Method {
                name: self.name.clone(),
                params: self.params.iter().map(TypeText::erased_signature).collect(),
            },
            DeclKind::Constructor => MemberKey::Constructor {
                params: self.params.iter().map(TypeText::erased_signature).collect(),
            },
            DeclKind::Initializer => MemberKey::Initializer {
                ordinal: self.ordinal,
                is_static: self.is_static(),
            },
            _ => MemberKey::Field {
                name: self.name.clone(),
            },
        };
        DeclKey {
            type_path: self.type_path.clone(),
            member,
        }
    }

    /// Declared supertypes, superclass first
    pub fn supertypes(&self) -> impl Iterator<Item = &TypeText> {
        self.superclass.iter().chain(self.interfaces.iter())
    }

    /// Arity excluding the varargs slot
    pub fn fixed_arity(&self) -> usize {
        if self.varargs {
            self.params.len().saturating_sub(1)
        } else {
            self.params.len()
        }
    }
}
