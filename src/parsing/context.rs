//! Parser context for tracking enclosing types during AST traversal
//!
//! The Java parser walks nested type declarations recursively. This context
//! keeps the stack of enclosing types so every declaration gets its dotted
//! type path, its parent index and, for initializer blocks, its ordinal.

#[derive(Debug, Clone)]
struct TypeFrame {
    /// Index of the type declaration in the unit
    index: u32,
    /// Dotted path of the type
    path: String,
    /// Initializer blocks seen so far in this type
    initializers: u32,
}

/// Parser context for tracking current scope during parsing
#[derive(Debug, Clone)]
pub struct ParserContext {
    package: String,
    type_stack: Vec<TypeFrame>,
}

impl Default for ParserContext {
    fn default() -> Self {
        Self::new("")
    }
}

impl ParserContext {
    /// Create a new parser context at package scope
    pub fn new(package: &str) -> Self {
        Self {
            package: package.to_string(),
            type_stack: Vec::new(),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Dotted path a type named `name` gets when declared here
    pub fn qualify(&self, name: &str) -> String {
        match self.type_stack.last() {
            Some(frame) => format!("{}.{name}", frame.path),
            None if self.package.is_empty() => name.to_string(),
            None => format!("{}.{name}", self.package),
        }
    }

    /// Enter the body of the type declared at `index`
    pub fn enter_type(&mut self, index: u32, path: String) {
        self.type_stack.push(TypeFrame {
            index,
            path,
            initializers: 0,
        });
    }

    /// Exit the current type body
    pub fn exit_type(&mut self) {
        self.type_stack.pop();
    }

    /// Index of the innermost enclosing type
    pub fn current_type(&self) -> Option<u32> {
        self.type_stack.last().map(|frame| frame.index)
    }

    /// Dotted path of the innermost enclosing type
    pub fn current_type_path(&self) -> Option<&str> {
        self.type_stack.last().map(|frame| frame.path.as_str())
    }

    /// Claim the next initializer ordinal of the innermost type
    pub fn next_initializer_ordinal(&mut self) -> u32 {
        match self.type_stack.last_mut() {
            Some(frame) => {
                let ordinal = frame.initializers;
                frame.initializers += 1;
                ordinal
            }
            None => 0,
        }
    }

    /// Whether the parser is inside a type body
    pub fn in_type(&self) -> bool {
        !self.type_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context() {
        let ctx = ParserContext::default();
        assert!(!ctx.in_type());
        assert_eq!(ctx.current_type(), None);
        assert_eq!(ctx.qualify("Foo"), "Foo");
    }

    #[test]
    fn test_nested_types() {
        let mut ctx = ParserContext::new("org.sample");
        let outer = ctx.qualify("CallHierarchy");
        assert_eq!(outer, "org.sample.CallHierarchy");

        ctx.enter_type(0, outer);
        assert!(ctx.in_type());
        assert_eq!(ctx.qualify("Base"), "org.sample.CallHierarchy.Base");

        ctx.enter_type(3, ctx.qualify("Base"));
        assert_eq!(ctx.current_type(), Some(3));

        ctx.exit_type();
        assert_eq!(ctx.current_type_path(), Some("org.sample.CallHierarchy"));

        ctx.exit_type();
        assert!(!ctx.in_type());
    }

    #[test]
    fn test_initializer_ordinals_are_per_type() {
        let mut ctx = ParserContext::new("p");
        ctx.enter_type(0, "p.A".to_string());
        assert_eq!(ctx.next_initializer_ordinal(), 0);
        assert_eq!(ctx.next_initializer_ordinal(), 1);

        ctx.enter_type(1, "p.A.B".to_string());
        assert_eq!(ctx.next_initializer_ordinal(), 0);
        ctx.exit_type();

        assert_eq!(ctx.next_initializer_ordinal(), 2);
    }
}
