//! Static types used during overload resolution
//!
//! The model is shallow: it knows primitives, arrays, class types by
//! qualified name and an `Unknown` type that is compatible with anything.

use crate::symbol::TypeText;
use crate::types::DeclId;
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "boolean" => Some(Self::Boolean),
            "byte" => Some(Self::Byte),
            "short" => Some(Self::Short),
            "char" => Some(Self::Char),
            "int" => Some(Self::Int),
            "long" => Some(Self::Long),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            _ => None,
        }
    }

    /// Qualified name of the wrapper class
    pub fn boxed(&self) -> &'static str {
        match self {
            Self::Boolean => "java.lang.Boolean",
            Self::Byte => "java.lang.Byte",
            Self::Short => "java.lang.Short",
            Self::Char => "java.lang.Character",
            Self::Int => "java.lang.Integer",
            Self::Long => "java.lang.Long",
            Self::Float => "java.lang.Float",
            Self::Double => "java.lang.Double",
        }
    }

    pub fn unboxed(class_name: &str) -> Option<Self> {
        match class_name {
            "java.lang.Boolean" => Some(Self::Boolean),
            "java.lang.Byte" => Some(Self::Byte),
            "java.lang.Short" => Some(Self::Short),
            "java.lang.Character" => Some(Self::Char),
            "java.lang.Integer" => Some(Self::Int),
            "java.lang.Long" => Some(Self::Long),
            "java.lang.Float" => Some(Self::Float),
            "java.lang.Double" => Some(Self::Double),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Boolean)
    }

    /// Identity or widening primitive conversion
    pub fn widens_to(&self, target: Primitive) -> bool {
        use Primitive::*;
        if *self == target {
            return true;
        }
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short | Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => matches!(target, Double),
            Double | Boolean => false,
        }
    }

    /// Binary numeric promotion
    pub fn promote(left: Primitive, right: Primitive) -> Primitive {
        use Primitive::*;
        if left == Double || right == Double {
            Double
        } else if left == Float || right == Float {
            Float
        } else if left == Long || right == Long {
            Long
        } else {
            Int
        }
    }
}

/// The static type of an expression or declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JType {
    Primitive(Primitive),
    Void,
    Null,
    /// A class, interface, enum or record type. `decl` is absent when the
    /// name is known but no declaration for it is loaded.
    Class {
        name: String,
        decl: Option<DeclId>,
    },
    Array(Box<JType>),
    /// A type variable; erased to its bound, which is not tracked
    TypeVar(String),
    Unknown,
}

pub const OBJECT: &str = "java.lang.Object";
pub const STRING: &str = "java.lang.String";

impl JType {
    pub fn class(name: impl Into<String>, decl: Option<DeclId>) -> Self {
        JType::Class {
            name: name.into(),
            decl,
        }
    }

    pub fn string() -> Self {
        JType::class(STRING, None)
    }

    pub fn array_of(element: JType, dims: u32) -> Self {
        (0..dims).fold(element, |ty, _| JType::Array(Box::new(ty)))
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            JType::Class { .. } | JType::Array(_) | JType::TypeVar(_) | JType::Null
        )
    }

    /// Types that carry no information and accept any argument
    pub fn is_unknown(&self) -> bool {
        matches!(self, JType::Unknown | JType::TypeVar(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, JType::Class { name, .. } if name == STRING)
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            JType::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn decl(&self) -> Option<DeclId> {
        match self {
            JType::Class { decl, .. } => *decl,
            _ => None,
        }
    }

    /// The primitive this type is or unboxes to
    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            JType::Primitive(p) => Some(*p),
            JType::Class { name, .. } => Primitive::unboxed(name),
            _ => None,
        }
    }

    pub fn element(&self) -> Option<&JType> {
        match self {
            JType::Array(element) => Some(element),
            _ => None,
        }
    }
}

/// Supertypes of well-known `java.lang` classes that are usually not loaded
pub fn builtin_supertypes(name: &str) -> Option<&'static [&'static str]> {
    const NUMBER: &[&str] = &[
        "java.lang.Number",
        "java.lang.Comparable",
        "java.io.Serializable",
        OBJECT,
    ];
    match name {
        STRING => Some(&[
            "java.lang.CharSequence",
            "java.lang.Comparable",
            "java.io.Serializable",
            OBJECT,
        ]),
        "java.lang.Integer" | "java.lang.Long" | "java.lang.Short" | "java.lang.Byte"
        | "java.lang.Float" | "java.lang.Double" => Some(NUMBER),
        "java.lang.Boolean" | "java.lang.Character" => Some(&[
            "java.lang.Comparable",
            "java.io.Serializable",
            OBJECT,
        ]),
        "java.lang.Number" => Some(&["java.io.Serializable", OBJECT]),
        "java.lang.CharSequence" => Some(&[OBJECT]),
        _ => None,
    }
}

/// Simple names that resolve to `java.lang` without an import
pub fn is_java_lang(simple: &str) -> bool {
    matches!(
        simple,
        "Object"
            | "String"
            | "CharSequence"
            | "StringBuilder"
            | "StringBuffer"
            | "Number"
            | "Integer"
            | "Long"
            | "Short"
            | "Byte"
            | "Float"
            | "Double"
            | "Boolean"
            | "Character"
            | "Math"
            | "System"
            | "Thread"
            | "Runnable"
            | "Class"
            | "Enum"
            | "Iterable"
            | "Comparable"
            | "Exception"
            | "RuntimeException"
            | "Error"
            | "Throwable"
            | "Override"
            | "Deprecated"
            | "Void"
    )
}

/// Parse a type node into its display and erased forms.
///
/// `extra_dims` covers C-style array brackets on the declarator
/// (`String args[]`).
pub fn type_text(node: &Node, source: &str, extra_dims: u32) -> TypeText {
    let raw = &source[node.byte_range()];
    let display = collapse_whitespace(raw);
    let (erased, dims) = erase(&display);
    let mut text = TypeText {
        display,
        erased,
        dims: dims + extra_dims,
    };
    for _ in 0..extra_dims {
        text.display.push_str("[]");
    }
    text
}

/// Collapse runs of whitespace to a single space
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip annotations, type arguments and array brackets from a type
pub fn erase(display: &str) -> (String, u32) {
    let mut out = String::with_capacity(display.len());
    let mut depth = 0usize;
    let mut chars = display.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            '@' if depth == 0 => {
                // Skip the annotation name and any argument list
                while chars
                    .peek()
                    .is_some_and(|c| c.is_alphanumeric() || *c == '_' || *c == '.')
                {
                    chars.next();
                }
                if chars.peek() == Some(&'(') {
                    let mut parens = 0usize;
                    for c in chars.by_ref() {
                        match c {
                            '(' => parens += 1,
                            ')' => {
                                parens -= 1;
                                if parens == 0 {
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
            c if depth == 0 && !c.is_whitespace() => out.push(c),
            _ => {}
        }
    }

    let mut dims = 0;
    while let Some(stripped) = out.strip_suffix("[]") {
        out.truncate(stripped.len());
        dims += 1;
    }
    if let Some(stripped) = out.strip_suffix("...") {
        out.truncate(stripped.len());
        dims += 1;
    }
    (out, dims)
}

/// Last dotted segment of a name
pub fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widening() {
        assert!(Primitive::Int.widens_to(Primitive::Long));
        assert!(Primitive::Char.widens_to(Primitive::Int));
        assert!(!Primitive::Char.widens_to(Primitive::Short));
        assert!(!Primitive::Long.widens_to(Primitive::Int));
        assert!(!Primitive::Boolean.widens_to(Primitive::Int));
    }

    #[test]
    fn test_promotion() {
        assert_eq!(
            Primitive::promote(Primitive::Byte, Primitive::Short),
            Primitive::Int
        );
        assert_eq!(
            Primitive::promote(Primitive::Int, Primitive::Float),
            Primitive::Float
        );
    }

    #[test]
    fn test_erase() {
        assert_eq!(erase("String"), ("String".to_string(), 0));
        assert_eq!(erase("Map<String, List<Integer>>"), ("Map".to_string(), 0));
        assert_eq!(erase("Map.Entry<K, V>[]"), ("Map.Entry".to_string(), 1));
        assert_eq!(erase("@NonNull String"), ("String".to_string(), 0));
        assert_eq!(erase("char[][]"), ("char".to_string(), 2));
    }

    #[test]
    fn test_boxing_round_trip() {
        for p in [Primitive::Int, Primitive::Char, Primitive::Boolean] {
            assert_eq!(Primitive::unboxed(p.boxed()), Some(p));
        }
        assert_eq!(JType::class("java.lang.Long", None).as_primitive(), Some(Primitive::Long));
    }

    #[test]
    fn test_array_of() {
        let ty = JType::array_of(JType::Primitive(Primitive::Char), 2);
        assert_eq!(
            ty.element().and_then(JType::element),
            Some(&JType::Primitive(Primitive::Char))
        );
    }
}
