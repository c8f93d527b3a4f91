//! Position to declaration mapping

use crate::parsing::CompilationUnit;
use crate::types::Position;

/// The innermost call-hierarchy-eligible declaration at `position`.
///
/// Members are eligible anywhere inside their range. Types are eligible
/// only in their header (modifiers, name, supertypes), so a position between
/// two members finds nothing.
pub fn declaration_at(unit: &CompilationUnit, position: Position) -> Option<u32> {
    let offset = unit.offset_of(position)?;
    unit.declarations
        .iter()
        .enumerate()
        .filter(|(_, decl)| {
            if !decl.node.contains(&offset) {
                return false;
            }
            if decl.kind.is_type() {
                decl.body_start.is_none_or(|start| offset < start)
            } else {
                true
            }
        })
        .map(|(index, _)| index as u32)
        .last()
}
