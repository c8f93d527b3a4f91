//! Local variable lookup
//!
//! Locals are not recorded at parse time. They are found on demand by
//! walking from a use site up through the enclosing blocks, looking at
//! declarations that textually precede the use.

use super::parser::is_field;
use tree_sitter::Node;

/// How a local variable declares its type
#[derive(Debug, Clone, Copy)]
pub enum LocalType<'t> {
    /// An explicit type node plus extra declarator dimensions
    Declared(Node<'t>, u32),
    /// `var x = value`; the type is that of the value
    Inferred(Node<'t>),
    /// Implicitly typed lambda parameter
    Untyped,
}

/// Find the local variable or parameter `name` visible at `use_site`.
///
/// The walk stops at the body of a member or top-level type: beyond it
/// names refer to fields. Anonymous and local class bodies are crossed.
pub fn find_local<'t>(use_site: Node<'t>, name: &str, source: &str) -> Option<LocalType<'t>> {
    let text = |node: Node| &source[node.byte_range()];
    let mut child = use_site;

    while let Some(parent) = child.parent() {
        match parent.kind() {
            "block" | "constructor_body" | "switch_block_statement_group" => {
                let mut cursor = parent.walk();
                for stmt in parent.named_children(&mut cursor) {
                    if stmt.start_byte() >= child.start_byte() {
                        break;
                    }
                    if stmt.kind() == "local_variable_declaration" {
                        if let Some(found) = from_declaration(stmt, name, source) {
                            return Some(found);
                        }
                    }
                }
            }
            "method_declaration" | "constructor_declaration" => {
                if let Some(params) = parent.child_by_field_name("parameters") {
                    if let Some(found) = from_parameters(params, name, source) {
                        return Some(found);
                    }
                }
            }
            "lambda_expression" => {
                if let Some(params) = parent.child_by_field_name("parameters") {
                    match params.kind() {
                        "identifier" if text(params) == name => return Some(LocalType::Untyped),
                        "inferred_parameters" => {
                            let mut cursor = params.walk();
                            if params
                                .named_children(&mut cursor)
                                .any(|param| text(param) == name)
                            {
                                return Some(LocalType::Untyped);
                            }
                        }
                        "formal_parameters" => {
                            if let Some(found) = from_parameters(params, name, source) {
                                return Some(found);
                            }
                        }
                        _ => {}
                    }
                }
            }
            "enhanced_for_statement" => {
                if is_field(parent, "body", child) {
                    let named = parent
                        .child_by_field_name("name")
                        .is_some_and(|n| text(n) == name);
                    if let (true, Some(ty)) = (named, parent.child_by_field_name("type")) {
                        let dims = dims(parent.child_by_field_name("dimensions"), source);
                        return Some(declared(ty, dims, source, None));
                    }
                }
            }
            "for_statement" => {
                let mut cursor = parent.walk();
                let inits: Vec<Node> = parent.children_by_field_name("init", &mut cursor).collect();
                for init in inits {
                    if init.kind() == "local_variable_declaration" && init.id() != child.id() {
                        if let Some(found) = from_declaration(init, name, source) {
                            return Some(found);
                        }
                    }
                }
            }
            "catch_clause" => {
                let mut cursor = parent.walk();
                let param = parent
                    .named_children(&mut cursor)
                    .find(|c| c.kind() == "catch_formal_parameter");
                if let Some(param) = param {
                    if param
                        .child_by_field_name("name")
                        .is_some_and(|n| text(n) == name)
                    {
                        let mut inner = param.walk();
                        let ty = param
                            .named_children(&mut inner)
                            .find(|c| c.kind() == "catch_type")
                            .and_then(|catch_type| catch_type.named_child(0));
                        return Some(match ty {
                            Some(ty) => LocalType::Declared(ty, 0),
                            None => LocalType::Untyped,
                        });
                    }
                }
            }
            "try_with_resources_statement" => {
                if let Some(resources) = parent.child_by_field_name("resources") {
                    let mut cursor = resources.walk();
                    for resource in resources.named_children(&mut cursor) {
                        if resources.id() == child.id() && resource.end_byte() > use_site.start_byte()
                        {
                            break;
                        }
                        let named = resource
                            .child_by_field_name("name")
                            .is_some_and(|n| text(n) == name);
                        if let (true, Some(ty)) = (named, resource.child_by_field_name("type")) {
                            return Some(declared(
                                ty,
                                0,
                                source,
                                resource.child_by_field_name("value"),
                            ));
                        }
                    }
                }
            }
            "class_body" | "interface_body" | "enum_body" | "annotation_type_body" => {
                // Anonymous and local classes capture the enclosing locals
                let captures = parent.parent().is_some_and(|owner| {
                    owner.kind() == "object_creation_expression"
                        || owner.parent().is_some_and(|p| {
                            matches!(p.kind(), "block" | "constructor_body" | "switch_block_statement_group")
                        })
                });
                if !captures {
                    return None;
                }
            }
            _ => {}
        }
        child = parent;
    }
    None
}

fn from_declaration<'t>(decl: Node<'t>, name: &str, source: &str) -> Option<LocalType<'t>> {
    let ty = decl.child_by_field_name("type")?;
    let mut cursor = decl.walk();
    let declarator = decl
        .children_by_field_name("declarator", &mut cursor)
        .find(|d| {
            d.child_by_field_name("name")
                .is_some_and(|n| &source[n.byte_range()] == name)
        })?;
    let dims = dims(declarator.child_by_field_name("dimensions"), source);
    Some(declared(
        ty,
        dims,
        source,
        declarator.child_by_field_name("value"),
    ))
}

fn from_parameters<'t>(params: Node<'t>, name: &str, source: &str) -> Option<LocalType<'t>> {
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "formal_parameter" => {
                let named = param
                    .child_by_field_name("name")
                    .is_some_and(|n| &source[n.byte_range()] == name);
                if named {
                    let ty = param.child_by_field_name("type")?;
                    let dims = dims(param.child_by_field_name("dimensions"), source);
                    return Some(LocalType::Declared(ty, dims));
                }
            }
            "spread_parameter" => {
                let mut inner = param.walk();
                let children: Vec<Node> = param.named_children(&mut inner).collect();
                let named = children
                    .iter()
                    .find(|c| c.kind() == "variable_declarator")
                    .and_then(|d| d.child_by_field_name("name"))
                    .is_some_and(|n| &source[n.byte_range()] == name);
                if named {
                    let ty = children.into_iter().find(|c| {
                        !matches!(
                            c.kind(),
                            "modifiers" | "variable_declarator" | "marker_annotation" | "annotation"
                        )
                    })?;
                    return Some(LocalType::Declared(ty, 1));
                }
            }
            _ => {}
        }
    }
    None
}

fn declared<'t>(ty: Node<'t>, dims: u32, source: &str, value: Option<Node<'t>>) -> LocalType<'t> {
    if &source[ty.byte_range()] == "var" {
        match value {
            Some(value) => LocalType::Inferred(value),
            None => LocalType::Untyped,
        }
    } else {
        LocalType::Declared(ty, dims)
    }
}

fn dims(node: Option<Node>, source: &str) -> u32 {
    node.map(|d| source[d.byte_range()].matches('[').count() as u32)
        .unwrap_or(0)
}
