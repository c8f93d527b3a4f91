//! Resolution seam between the binder and whatever owns the compilation units
//!
//! The binder never walks workspace state directly. It asks a
//! [`SymbolModel`] for units and for type declarations by qualified name,
//! which keeps binding a pure function of (model, unit, node).

use crate::parsing::CompilationUnit;
use crate::types::{DeclId, UnitId};
use std::sync::Arc;

pub trait SymbolModel: Send + Sync {
    /// The compilation unit behind `id`, materializing library views as needed
    fn unit(&self, id: UnitId) -> Option<Arc<CompilationUnit>>;

    /// Type declaration by dotted path (`org.sample.Outer.Inner`)
    fn find_type(&self, type_path: &str) -> Option<DeclId>;
}
