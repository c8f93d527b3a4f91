pub mod context;
pub mod import;
pub mod java;
pub mod resolution;
pub mod unit;

pub use context::ParserContext;
pub use import::Import;
pub use java::{Binder, JavaParser, UnitRef};
pub use resolution::SymbolModel;
pub use unit::{CONSTRUCTOR_CALL_KEY, CompilationUnit, NameIndex, SiteKind, SiteRef};
