//! Java parsing, scoping and call-site binding

pub mod parser;
pub mod resolution;
pub mod scope;
pub mod types;

pub use parser::JavaParser;
pub use resolution::{Binder, Candidate, Phase, UnitRef};
pub use scope::{LocalType, find_local};
pub use types::{JType, Primitive};
