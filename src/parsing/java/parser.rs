//! Java parser implementation
//!
//! Extracts declarations and reference candidates from Java source with
//! tree-sitter. Types nested in other types become declarations; anonymous
//! and local classes do not, so their code belongs to the enclosing member.

use super::types::type_text;
use crate::error::{ParseError, ParseResult};
use crate::parsing::unit::{CONSTRUCTOR_CALL_KEY, CompilationUnit, NameIndex, SiteKind, SiteRef};
use crate::parsing::{Import, ParserContext};
use crate::symbol::{DeclKind, Declaration, Modifiers, TypeText};
use crate::types::{ContentId, Range};
use tree_sitter::{Node, Parser};

pub struct JavaParser {
    parser: Parser,
}

impl std::fmt::Debug for JavaParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaParser").finish_non_exhaustive()
    }
}

impl JavaParser {
    pub fn new() -> ParseResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| ParseError::ParserInit {
                language: "Java".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { parser })
    }

    /// Parse one compilation unit
    pub fn parse(&mut self, content: ContentId, source: String) -> ParseResult<CompilationUnit> {
        let tree = self
            .parser
            .parse(&source, None)
            .ok_or_else(|| ParseError::NoTree {
                content: content.to_string(),
            })?;

        let (package, imports, declarations, names) = {
            let root = tree.root_node();
            let mut extractor = Extractor::new(&source);
            extractor.extract_unit(root);
            let names = index_names(root, &source);
            (
                extractor.context.package().to_string(),
                extractor.imports,
                extractor.decls,
                names,
            )
        };

        tracing::trace!(
            "parsed {content}: {} declarations, {} reference candidates",
            declarations.len(),
            names.len()
        );

        Ok(CompilationUnit::new(
            content,
            source,
            tree,
            package,
            imports,
            declarations,
            names,
        ))
    }
}

struct Extractor<'a> {
    source: &'a str,
    context: ParserContext,
    imports: Vec<Import>,
    decls: Vec<Declaration>,
}

impl<'a> Extractor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            context: ParserContext::default(),
            imports: Vec::new(),
            decls: Vec::new(),
        }
    }

    fn text(&self, node: Node) -> &'a str {
        &self.source[node.byte_range()]
    }

    fn extract_unit(&mut self, root: Node) {
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_declaration" => {
                    if let Some(name) = first_named_of(child, &["scoped_identifier", "identifier"])
                    {
                        self.context = ParserContext::new(self.text(name));
                    }
                }
                "import_declaration" => self.extract_import(child),
                kind => {
                    if let Some(decl_kind) = type_kind(kind) {
                        self.extract_type(child, decl_kind);
                    }
                }
            }
        }
    }

    fn extract_import(&mut self, node: Node) {
        let Some(name) = first_named_of(node, &["scoped_identifier", "identifier"]) else {
            return;
        };
        let mut cursor = node.walk();
        let mut is_static = false;
        let mut is_glob = false;
        for child in node.children(&mut cursor) {
            match child.kind() {
                "static" => is_static = true,
                "asterisk" => is_glob = true,
                _ => {}
            }
        }
        self.imports.push(Import {
            path: self.text(name).to_string(),
            is_glob,
            is_static,
        });
    }

    fn in_interface(&self) -> bool {
        self.context
            .current_type()
            .and_then(|index| self.decls.get(index as usize))
            .is_some_and(|decl| matches!(decl.kind, DeclKind::Interface | DeclKind::Annotation))
    }

    /// Declaration skeleton for a node inside the current type
    fn declaration(&self, kind: DeclKind, name: &str, node: Node, selection: Node) -> Declaration {
        Declaration {
            kind,
            name: name.to_string(),
            type_path: self
                .context
                .current_type_path()
                .unwrap_or_default()
                .to_string(),
            parent: self.context.current_type(),
            params: Vec::new(),
            varargs: false,
            value_type: None,
            modifiers: self.modifiers(node),
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            ordinal: 0,
            range: Range::of_node(&node),
            selection: Range::of_node(&selection),
            node: node.byte_range(),
            bodies: Vec::new(),
            body_start: None,
        }
    }

    fn push(&mut self, decl: Declaration) -> u32 {
        self.decls.push(decl);
        (self.decls.len() - 1) as u32
    }

    fn extract_type(&mut self, node: Node, kind: DeclKind) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.text(name_node);
        let path = self.context.qualify(name);
        let nested = self.context.in_type();
        let member_of_interface = self.in_interface();

        let mut decl = self.declaration(kind, name, node, name_node);
        decl.type_path = path.clone();
        decl.type_params = self.type_params(node);
        if nested && (kind != DeclKind::Class || member_of_interface) {
            decl.modifiers |= Modifiers::STATIC;
        }
        if member_of_interface {
            decl.modifiers |= Modifiers::PUBLIC;
        }
        if let Some(superclass) = node
            .child_by_field_name("superclass")
            .and_then(|sc| sc.named_child(0))
        {
            decl.superclass = Some(type_text(&superclass, self.source, 0));
        }
        decl.interfaces = self.interfaces(node);
        let body = node.child_by_field_name("body");
        decl.body_start = body.map(|b| b.start_byte());

        let index = self.push(decl);
        self.context.enter_type(index, path);

        let mut record_params = None;
        if kind == DeclKind::Record {
            record_params = Some(self.record_components(node));
        }

        if let Some(body) = body {
            match kind {
                DeclKind::Enum => {
                    let mut cursor = body.walk();
                    for child in body.named_children(&mut cursor) {
                        match child.kind() {
                            "enum_constant" => self.extract_enum_constant(child, name),
                            "enum_body_declarations" => self.extract_members(child, None),
                            _ => {}
                        }
                    }
                }
                _ => self.extract_members(body, record_params.as_deref()),
            }
        }

        self.context.exit_type();
    }

    fn extract_members(&mut self, body: Node, record_params: Option<&[TypeText]>) {
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            match child.kind() {
                "method_declaration" | "annotation_type_element_declaration" => {
                    self.extract_method(child)
                }
                "constructor_declaration" => self.extract_constructor(child, None),
                "compact_constructor_declaration" => {
                    self.extract_constructor(child, Some(record_params.unwrap_or_default()))
                }
                "field_declaration" | "constant_declaration" => self.extract_fields(child),
                "static_initializer" | "block" => self.extract_initializer(child),
                kind => {
                    if let Some(decl_kind) = type_kind(kind) {
                        self.extract_type(child, decl_kind);
                    }
                }
            }
        }
    }

    fn extract_method(&mut self, node: Node) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let mut decl = self.declaration(DeclKind::Method, self.text(name_node), node, name_node);
        let (params, varargs) = self.parameters(node.child_by_field_name("parameters"));
        decl.params = params;
        decl.varargs = varargs;
        decl.type_params = self.type_params(node);
        decl.value_type = node.child_by_field_name("type").map(|ty| {
            type_text(
                &ty,
                self.source,
                dims_count(node.child_by_field_name("dimensions"), self.source),
            )
        });

        let body = node.child_by_field_name("body");
        if let Some(body) = body {
            decl.bodies.push(body.byte_range());
        }
        if self.in_interface() {
            if !decl.modifiers.contains(Modifiers::PRIVATE) {
                decl.modifiers |= Modifiers::PUBLIC;
            }
            if body.is_none() && !decl.modifiers.contains(Modifiers::STATIC) {
                decl.modifiers |= Modifiers::ABSTRACT;
            }
        }
        self.push(decl);
    }

    fn extract_constructor(&mut self, node: Node, record_params: Option<&[TypeText]>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let mut decl =
            self.declaration(DeclKind::Constructor, self.text(name_node), node, name_node);
        match record_params {
            Some(params) => decl.params = params.to_vec(),
            None => {
                let (params, varargs) = self.parameters(node.child_by_field_name("parameters"));
                decl.params = params;
                decl.varargs = varargs;
            }
        }
        decl.type_params = self.type_params(node);
        if let Some(body) = node.child_by_field_name("body") {
            decl.bodies.push(body.byte_range());
        }
        self.push(decl);
    }

    fn extract_fields(&mut self, node: Node) {
        let Some(ty) = node.child_by_field_name("type") else {
            return;
        };
        let in_interface = self.in_interface();
        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();
        let last = declarators.len().saturating_sub(1);

        for (i, declarator) in declarators.iter().enumerate() {
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            let mut decl = self.declaration(DeclKind::Field, self.text(name_node), node, name_node);
            let dims = dims_count(declarator.child_by_field_name("dimensions"), self.source);
            decl.value_type = Some(type_text(&ty, self.source, dims));

            // With several declarators each one owns its own slice of the statement
            if declarators.len() > 1 {
                let start = if i == 0 {
                    node.start_position()
                } else {
                    declarator.start_position()
                };
                let end = if i == last {
                    node.end_position()
                } else {
                    declarator.end_position()
                };
                decl.range = Range {
                    start: start.into(),
                    end: end.into(),
                };
                decl.node = if i == 0 {
                    node.start_byte()..declarator.end_byte()
                } else {
                    declarator.byte_range()
                };
            }
            if let Some(value) = declarator.child_by_field_name("value") {
                decl.bodies.push(value.byte_range());
            }
            if in_interface {
                decl.modifiers |= Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL;
            }
            self.push(decl);
        }
    }

    fn extract_enum_constant(&mut self, node: Node, enum_name: &str) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let mut decl =
            self.declaration(DeclKind::EnumConstant, self.text(name_node), node, name_node);
        decl.modifiers |= Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL;
        decl.value_type = Some(TypeText {
            display: enum_name.to_string(),
            erased: enum_name.to_string(),
            dims: 0,
        });
        for field in ["arguments", "body"] {
            if let Some(part) = node.child_by_field_name(field) {
                decl.bodies.push(part.byte_range());
            }
        }
        self.push(decl);
    }

    fn extract_initializer(&mut self, node: Node) {
        // `static { ... }` selects the keyword, a bare block its opening brace
        let Some(opening) = node.child(0) else {
            return;
        };
        let mut decl = self.declaration(DeclKind::Initializer, "", node, opening);
        decl.ordinal = self.context.next_initializer_ordinal();
        if node.kind() == "static_initializer" {
            decl.modifiers |= Modifiers::STATIC;
            if let Some(block) = first_named_of(node, &["block"]) {
                decl.bodies.push(block.byte_range());
            }
        } else {
            decl.bodies.push(node.byte_range());
        }
        self.push(decl);
    }

    /// Record components become private final fields
    fn record_components(&mut self, node: Node) -> Vec<TypeText> {
        let Some(parameters) = node.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut types = Vec::new();
        let mut cursor = parameters.walk();
        for param in parameters.named_children(&mut cursor) {
            if param.kind() != "formal_parameter" {
                continue;
            }
            let (Some(ty), Some(name_node)) = (
                param.child_by_field_name("type"),
                param.child_by_field_name("name"),
            ) else {
                continue;
            };
            let text = type_text(&ty, self.source, 0);
            let mut decl = self.declaration(DeclKind::Field, self.text(name_node), param, name_node);
            decl.modifiers |= Modifiers::PRIVATE | Modifiers::FINAL;
            decl.value_type = Some(text.clone());
            self.push(decl);
            types.push(text);
        }
        types
    }

    fn parameters(&self, node: Option<Node>) -> (Vec<TypeText>, bool) {
        let Some(node) = node else {
            return (Vec::new(), false);
        };
        let mut params = Vec::new();
        let mut varargs = false;
        let mut cursor = node.walk();
        for param in node.named_children(&mut cursor) {
            match param.kind() {
                "formal_parameter" => {
                    if let Some(ty) = param.child_by_field_name("type") {
                        let dims = dims_count(param.child_by_field_name("dimensions"), self.source);
                        params.push(type_text(&ty, self.source, dims));
                    }
                }
                "spread_parameter" => {
                    let mut inner = param.walk();
                    let ty = param.named_children(&mut inner).find(|child| {
                        !matches!(
                            child.kind(),
                            "modifiers" | "variable_declarator" | "marker_annotation" | "annotation"
                        )
                    });
                    if let Some(ty) = ty {
                        let mut text = type_text(&ty, self.source, 0);
                        text.dims += 1;
                        text.display.push_str("...");
                        params.push(text);
                        varargs = true;
                    }
                }
                _ => {}
            }
        }
        (params, varargs)
    }

    fn type_params(&self, node: Node) -> Vec<String> {
        let Some(list) = node.child_by_field_name("type_parameters") else {
            return Vec::new();
        };
        let mut cursor = list.walk();
        list.named_children(&mut cursor)
            .filter(|child| child.kind() == "type_parameter")
            .filter_map(|param| first_named_of(param, &["type_identifier", "identifier"]))
            .map(|name| self.text(name).to_string())
            .collect()
    }

    fn interfaces(&self, node: Node) -> Vec<TypeText> {
        let mut out = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if !matches!(child.kind(), "super_interfaces" | "extends_interfaces") {
                continue;
            }
            if let Some(list) = first_named_of(child, &["type_list"]) {
                let mut inner = list.walk();
                for ty in list.named_children(&mut inner) {
                    out.push(type_text(&ty, self.source, 0));
                }
            }
        }
        out
    }

    fn modifiers(&self, node: Node) -> Modifiers {
        let mut flags = Modifiers::empty();
        if let Some(modifiers) = first_named_of(node, &["modifiers"]) {
            let mut cursor = modifiers.walk();
            for child in modifiers.children(&mut cursor) {
                match child.kind() {
                    "marker_annotation" | "annotation" => {
                        let name = child
                            .child_by_field_name("name")
                            .map(|name| self.text(name));
                        if matches!(name, Some("Deprecated" | "java.lang.Deprecated")) {
                            flags |= Modifiers::DEPRECATED;
                        }
                    }
                    keyword => {
                        if let Some(flag) = Modifiers::from_keyword(keyword) {
                            flags |= flag;
                        }
                    }
                }
            }
        }
        if self.has_deprecated_javadoc(node) {
            flags |= Modifiers::DEPRECATED;
        }
        flags
    }

    fn has_deprecated_javadoc(&self, node: Node) -> bool {
        node.prev_named_sibling().is_some_and(|prev| {
            let text = self.text(prev);
            prev.kind() == "block_comment" && text.starts_with("/**") && text.contains("@deprecated")
        })
    }
}

pub(crate) fn type_kind(node_kind: &str) -> Option<DeclKind> {
    match node_kind {
        "class_declaration" => Some(DeclKind::Class),
        "interface_declaration" => Some(DeclKind::Interface),
        "enum_declaration" => Some(DeclKind::Enum),
        "record_declaration" => Some(DeclKind::Record),
        "annotation_type_declaration" => Some(DeclKind::Annotation),
        _ => None,
    }
}

pub(crate) fn first_named_of<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .find(|child| kinds.contains(&child.kind()))
}

fn dims_count(node: Option<Node>, source: &str) -> u32 {
    node.map(|dims| source[dims.byte_range()].matches('[').count() as u32)
        .unwrap_or(0)
}

/// True when `child` is the node stored under `field` of `parent`
pub(crate) fn is_field(parent: Node, field: &str, child: Node) -> bool {
    parent
        .child_by_field_name(field)
        .is_some_and(|node| node.id() == child.id())
}

/// Identifiers that read or write a variable, as opposed to naming one
fn is_value_identifier(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        "variable_declarator" | "enhanced_for_statement" => is_field(parent, "value", node),
        "field_access" | "method_invocation" => is_field(parent, "object", node),
        "lambda_expression" => is_field(parent, "body", node),
        "instanceof_expression" => is_field(parent, "left", node),
        "assignment_expression"
        | "binary_expression"
        | "unary_expression"
        | "update_expression"
        | "argument_list"
        | "parenthesized_expression"
        | "return_statement"
        | "array_access"
        | "ternary_expression"
        | "cast_expression"
        | "array_initializer"
        | "throw_statement"
        | "yield_statement"
        | "assert_statement"
        | "dimensions_expr"
        | "expression_statement"
        | "synchronized_statement"
        | "switch_label" => true,
        _ => false,
    }
}

/// Build the name index of reference candidates in textual order
fn index_names(root: Node, source: &str) -> NameIndex {
    let mut index = NameIndex::default();
    let text = |node: Node| &source[node.byte_range()];
    let mut cursor = root.walk();

    loop {
        let node = cursor.node();
        let site = |kind| SiteRef {
            kind,
            bytes: node.byte_range(),
        };
        match node.kind() {
            "method_invocation" => {
                if let Some(name) = node.child_by_field_name("name") {
                    index.insert(text(name), site(SiteKind::Invocation));
                }
            }
            "object_creation_expression" => {
                if let Some(ty) = node.child_by_field_name("type") {
                    let (erased, _) = super::types::erase(text(ty));
                    index.insert(super::types::simple_name(&erased), site(SiteKind::Creation));
                }
            }
            "explicit_constructor_invocation" => {
                index.insert(CONSTRUCTOR_CALL_KEY, site(SiteKind::ExplicitConstructor));
            }
            "method_reference" => {
                let creates = node
                    .child(node.child_count().saturating_sub(1))
                    .is_some_and(|last| last.kind() == "new");
                if creates {
                    if let Some(ty) = node.named_child(0) {
                        let (erased, _) = super::types::erase(text(ty));
                        index.insert(
                            super::types::simple_name(&erased),
                            site(SiteKind::CreationReference),
                        );
                    }
                } else if let Some(name) = node
                    .named_child(node.named_child_count().saturating_sub(1))
                    .filter(|last| last.kind() == "identifier")
                {
                    index.insert(text(name), site(SiteKind::MethodReference));
                }
            }
            "field_access" => {
                if let Some(field) = node
                    .child_by_field_name("field")
                    .filter(|field| field.kind() == "identifier")
                {
                    index.insert(text(field), site(SiteKind::FieldAccess));
                }
            }
            "identifier" if is_value_identifier(node) => {
                index.insert(text(node), site(SiteKind::Identifier));
            }
            _ => {}
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return index;
            }
        }
    }
}
