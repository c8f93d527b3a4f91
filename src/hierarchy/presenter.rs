//! Declaration to hierarchy node projection

use super::node::{HierarchyKind, HierarchyNode, SymbolTag};
use crate::parsing::CompilationUnit;
use crate::symbol::{DeclKind, Declaration};

/// Placeholder name of initializer blocks
pub const INITIALIZER_NAME: &str = "{...}";

pub fn present(unit: &CompilationUnit, decl: &Declaration) -> HierarchyNode {
    let tags = if decl.is_deprecated() {
        vec![SymbolTag::Deprecated]
    } else {
        Vec::new()
    };
    HierarchyNode {
        name: display_name(decl),
        kind: kind_of(decl.kind),
        detail: detail(decl),
        tags,
        uri: unit.content.uri(),
        range: decl.range,
        selection_range: decl.selection,
        data: Some(decl.key()),
    }
}

/// `name(T1, T2)` for invocables, the bare name otherwise
pub fn display_name(decl: &Declaration) -> String {
    match decl.kind {
        DeclKind::Initializer => INITIALIZER_NAME.to_string(),
        kind if kind.has_parameters() => {
            let params: Vec<&str> = decl.params.iter().map(|p| p.display.as_str()).collect();
            format!("{}({})", decl.name, params.join(", "))
        }
        _ => decl.name.clone(),
    }
}

pub fn kind_of(kind: DeclKind) -> HierarchyKind {
    match kind {
        DeclKind::Class | DeclKind::Record => HierarchyKind::Class,
        DeclKind::Interface | DeclKind::Annotation => HierarchyKind::Interface,
        DeclKind::Enum => HierarchyKind::Enum,
        DeclKind::Method => HierarchyKind::Method,
        DeclKind::Constructor | DeclKind::Initializer => HierarchyKind::Constructor,
        DeclKind::Field => HierarchyKind::Field,
        DeclKind::EnumConstant => HierarchyKind::EnumMember,
    }
}

/// Return type of a method; empty for every other kind
pub fn detail(decl: &Declaration) -> String {
    match (decl.kind, &decl.value_type) {
        (DeclKind::Method, Some(ty)) => ty.display.clone(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::JavaParser;
    use crate::types::ContentId;

    const SOURCE: &str = "package org.sample;\n\
        public class Shapes {\n\
            protected Object protectedField = null;\n\
            public Shapes(int size, String... labels) {}\n\
            @Deprecated public static void main(String[] args) {}\n\
            public java.util.List<String> names() { return null; }\n\
            { init(); }\n\
            enum Color { RED }\n\
            interface Visitor {}\n\
        }\n";

    fn nodes() -> Vec<HierarchyNode> {
        let unit = JavaParser::new()
            .unwrap()
            .parse(ContentId::workspace("/w/org/sample/Shapes.java"), SOURCE.to_string())
            .unwrap();
        unit.declarations.iter().map(|d| present(&unit, d)).collect()
    }

    fn find<'a>(nodes: &'a [HierarchyNode], name: &str) -> &'a HierarchyNode {
        nodes.iter().find(|n| n.name == name).unwrap()
    }

    #[test]
    fn test_names_kinds_and_details() {
        let nodes = nodes();

        let class = find(&nodes, "Shapes");
        assert_eq!(class.kind, HierarchyKind::Class);
        assert_eq!(class.detail, "");

        let field = find(&nodes, "protectedField");
        assert_eq!(field.kind, HierarchyKind::Field);
        assert_eq!(field.detail, "");

        let ctor = find(&nodes, "Shapes(int, String...)");
        assert_eq!(ctor.kind, HierarchyKind::Constructor);
        assert_eq!(ctor.detail, "");

        let main = find(&nodes, "main(String[])");
        assert_eq!(main.kind, HierarchyKind::Method);
        assert_eq!(main.detail, "void");
        assert!(main.is_deprecated());

        assert_eq!(find(&nodes, "names()").detail, "java.util.List<String>");
        assert_eq!(find(&nodes, INITIALIZER_NAME).kind, HierarchyKind::Constructor);
        assert_eq!(find(&nodes, "Color").kind, HierarchyKind::Enum);
        assert_eq!(find(&nodes, "RED").kind, HierarchyKind::EnumMember);
        assert_eq!(find(&nodes, "Visitor").kind, HierarchyKind::Interface);
    }

    #[test]
    fn test_selection_inside_range() {
        for node in nodes() {
            assert!(node.range.encloses(&node.selection_range), "{}", node.name);
            assert!(node.uri.starts_with("file://"));
            assert!(node.data.is_some());
        }
        let nodes = nodes();
        assert!(!find(&nodes, "Shapes(int, String...)").is_deprecated());
    }
}
