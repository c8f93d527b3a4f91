//! Parsed compilation units and their reference-candidate index

use crate::parsing::Import;
use crate::symbol::{DeclKey, Declaration};
use crate::types::{ContentId, Position};
use std::collections::HashMap;
use std::ops;
use tree_sitter::{Node, Tree};

/// Name-index key for `this(...)` and `super(...)` invocations
pub const CONSTRUCTOR_CALL_KEY: &str = "<init>";

/// Syntactic shape of a reference candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteKind {
    /// `recv.name(args)` or `name(args)`
    Invocation,
    /// `new Type(args)`, with or without an anonymous body
    Creation,
    /// `this(args)` or `super(args)` inside a constructor
    ExplicitConstructor,
    /// `Type::name` or `expr::name`
    MethodReference,
    /// `Type::new`
    CreationReference,
    /// `expr.name` in value position
    FieldAccess,
    /// Bare identifier in value position
    Identifier,
}

impl SiteKind {
    pub const ALL: [SiteKind; 7] = [
        SiteKind::Invocation,
        SiteKind::Creation,
        SiteKind::ExplicitConstructor,
        SiteKind::MethodReference,
        SiteKind::CreationReference,
        SiteKind::FieldAccess,
        SiteKind::Identifier,
    ];

    /// Tree-sitter node kind the site was recorded from
    pub fn node_kind(&self) -> &'static str {
        match self {
            SiteKind::Invocation => "method_invocation",
            SiteKind::Creation => "object_creation_expression",
            SiteKind::ExplicitConstructor => "explicit_constructor_invocation",
            SiteKind::MethodReference | SiteKind::CreationReference => "method_reference",
            SiteKind::FieldAccess => "field_access",
            SiteKind::Identifier => "identifier",
        }
    }

    /// Sites that invoke something, as opposed to reading a field
    pub fn is_call(&self) -> bool {
        !matches!(self, SiteKind::FieldAccess | SiteKind::Identifier)
    }
}

/// One reference candidate: a node that may bind to a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRef {
    pub kind: SiteKind,
    pub bytes: ops::Range<usize>,
}

/// Simple name -> candidate sites in textual order
#[derive(Debug, Default, Clone)]
pub struct NameIndex {
    sites: HashMap<String, Vec<SiteRef>>,
}

impl NameIndex {
    pub fn insert(&mut self, name: &str, site: SiteRef) {
        self.sites.entry(name.to_string()).or_default().push(site);
    }

    pub fn get(&self, name: &str) -> &[SiteRef] {
        self.sites.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Candidates under any of `names` whose kind passes `filter`, in textual order
    pub fn candidates(&self, names: &[String], filter: impl Fn(SiteKind) -> bool) -> Vec<SiteRef> {
        let mut out: Vec<SiteRef> = names
            .iter()
            .flat_map(|name| self.get(name).iter())
            .filter(|site| filter(site.kind))
            .cloned()
            .collect();
        out.sort_by_key(|site| site.bytes.start);
        out.dedup();
        out
    }

    pub fn len(&self) -> usize {
        self.sites.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// A parsed Java file or synthetic view with its declarations
pub struct CompilationUnit {
    pub content: ContentId,
    pub source: String,
    pub tree: Tree,
    pub package: String,
    pub imports: Vec<Import>,
    /// Declarations in pre-order
    pub declarations: Vec<Declaration>,
    pub names: NameIndex,
    /// Dotted type path -> index of the type declaration
    pub(crate) type_index: HashMap<String, u32>,
    /// Type declaration index -> member indices in declaration order
    pub(crate) members: HashMap<u32, Vec<u32>>,
    line_starts: Vec<usize>,
}

impl std::fmt::Debug for CompilationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilationUnit")
            .field("content", &self.content)
            .field("package", &self.package)
            .field("declarations", &self.declarations.len())
            .field("sites", &self.names.len())
            .finish()
    }
}

impl CompilationUnit {
    pub(crate) fn new(
        content: ContentId,
        source: String,
        tree: Tree,
        package: String,
        imports: Vec<Import>,
        declarations: Vec<Declaration>,
        names: NameIndex,
    ) -> Self {
        let mut type_index = HashMap::new();
        let mut members: HashMap<u32, Vec<u32>> = HashMap::new();
        for (index, decl) in declarations.iter().enumerate() {
            let index = index as u32;
            if decl.kind.is_type() {
                type_index.insert(decl.type_path.clone(), index);
                members.entry(index).or_default();
            }
            if let Some(parent) = decl.parent {
                members.entry(parent).or_default().push(index);
            }
        }

        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self {
            content,
            source,
            tree,
            package,
            imports,
            declarations,
            names,
            type_index,
            members,
            line_starts,
        }
    }

    pub fn declaration(&self, index: u32) -> Option<&Declaration> {
        self.declarations.get(index as usize)
    }

    /// Index of the type declared with this dotted path
    pub fn type_decl(&self, type_path: &str) -> Option<u32> {
        self.type_index.get(type_path).copied()
    }

    /// Members of a type in declaration order
    pub fn members_of(&self, type_index: u32) -> impl Iterator<Item = (u32, &Declaration)> {
        self.members
            .get(&type_index)
            .into_iter()
            .flatten()
            .filter_map(|&index| self.declaration(index).map(|decl| (index, decl)))
    }

    /// Top-level type declarations
    pub fn top_level_types(&self) -> impl Iterator<Item = (u32, &Declaration)> {
        self.declarations
            .iter()
            .enumerate()
            .filter(|(_, decl)| decl.kind.is_type() && decl.parent.is_none())
            .map(|(index, decl)| (index as u32, decl))
    }

    /// Declaration whose identity matches `key`
    pub fn find_key(&self, key: &DeclKey) -> Option<u32> {
        self.declarations
            .iter()
            .position(|decl| decl.type_path == key.type_path && &decl.key() == key)
            .map(|index| index as u32)
    }

    /// Member whose executable code contains `offset`
    pub fn enclosing_member(&self, offset: usize) -> Option<u32> {
        self.declarations
            .iter()
            .position(|decl| decl.bodies.iter().any(|body| body.contains(&offset)))
            .map(|index| index as u32)
    }

    /// Innermost type declaration whose node contains `offset`
    pub fn enclosing_type(&self, offset: usize) -> Option<u32> {
        self.declarations
            .iter()
            .enumerate()
            .filter(|(_, decl)| decl.kind.is_type() && decl.node.contains(&offset))
            .map(|(index, _)| index as u32)
            .last()
    }

    /// Text of a node
    pub fn text(&self, node: &Node) -> &str {
        &self.source[node.byte_range()]
    }

    /// Byte offset of a position, with the column clamped to its line
    pub fn offset_of(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());
        Some((start + position.character as usize).min(end))
    }

    /// The node of `kind` spanning exactly `bytes`
    pub fn node_for(&self, bytes: &ops::Range<usize>, kind: &str) -> Option<Node<'_>> {
        let mut node = self
            .tree
            .root_node()
            .descendant_for_byte_range(bytes.start, bytes.end)?;
        loop {
            if node.kind() == kind && node.byte_range() == *bytes {
                return Some(node);
            }
            if node.start_byte() < bytes.start || node.end_byte() > bytes.end {
                return None;
            }
            node = node.parent()?;
        }
    }

    /// Smallest node spanning `bytes`
    pub fn node_covering(&self, bytes: &ops::Range<usize>) -> Option<Node<'_>> {
        self.tree
            .root_node()
            .descendant_for_byte_range(bytes.start, bytes.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_index_candidates_are_textual() {
        let mut index = NameIndex::default();
        index.insert(
            "Base",
            SiteRef {
                kind: SiteKind::Creation,
                bytes: 40..50,
            },
        );
        index.insert(
            CONSTRUCTOR_CALL_KEY,
            SiteRef {
                kind: SiteKind::ExplicitConstructor,
                bytes: 10..17,
            },
        );
        index.insert(
            "Base",
            SiteRef {
                kind: SiteKind::Identifier,
                bytes: 60..64,
            },
        );

        let names = vec!["Base".to_string(), CONSTRUCTOR_CALL_KEY.to_string()];
        let calls = index.candidates(&names, |kind| kind.is_call());
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].bytes, 10..17);
        assert_eq!(calls[1].bytes, 40..50);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_site_kind_node_kinds() {
        assert_eq!(SiteKind::Invocation.node_kind(), "method_invocation");
        assert_eq!(SiteKind::CreationReference.node_kind(), "method_reference");
        assert!(!SiteKind::FieldAccess.is_call());
    }
}
