//! Java call-site binding
//!
//! Binds invocations, object creations, explicit constructor calls, method
//! references and field references to declarations. Binding is a pure
//! function of the [`SymbolModel`], the unit and the node; per-binder caches
//! only memoize supertype resolution.
//!
//! Overload selection follows the three applicability phases of the Java
//! language (strict, loose, variable arity) and picks the single most
//! specific candidate. Anything ambiguous or untypeable stays unbound.

use super::parser::{first_named_of, type_kind};
use super::scope::{LocalType, find_local};
use super::types::{JType, OBJECT, Primitive, builtin_supertypes, erase, is_java_lang, simple_name};
use crate::parsing::{CompilationUnit, SymbolModel};
use crate::symbol::{DeclKind, Declaration, TypeText};
use crate::types::{DeclId, UnitId};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use tree_sitter::Node;

/// Maximum nesting of expression typing before giving up
const MAX_TYPING_DEPTH: u32 = 48;

/// A unit paired with its id in the model
#[derive(Clone, Copy)]
pub struct UnitRef<'u> {
    pub id: UnitId,
    pub unit: &'u CompilationUnit,
}

impl<'u> UnitRef<'u> {
    pub fn new(id: UnitId, unit: &'u CompilationUnit) -> Self {
        Self { id, unit }
    }

    fn decl_id(&self, index: u32) -> DeclId {
        DeclId::new(self.id, index)
    }

    fn text(&self, node: Node) -> &'u str {
        &self.unit.source[node.byte_range()]
    }
}

/// Applicability phases of overload resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Subtyping and primitive widening only
    Strict,
    /// Plus boxing and unboxing
    Loose,
    /// Plus variable arity expansion
    Varargs,
}

/// A method or constructor considered for an invocation
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: DeclId,
    pub params: Vec<JType>,
    pub varargs: bool,
}

impl Candidate {
    /// Parameter types expanded to `arity` slots for the varargs phase
    fn expanded(&self, arity: usize, phase: Phase) -> Vec<JType> {
        if phase != Phase::Varargs || !self.varargs {
            return self.params.clone();
        }
        let fixed = self.params.len().saturating_sub(1);
        let element = self
            .params
            .last()
            .and_then(JType::element)
            .cloned()
            .unwrap_or(JType::Unknown);
        let mut out: Vec<JType> = self.params[..fixed].to_vec();
        while out.len() < arity.max(fixed + 1) {
            out.push(element.clone());
        }
        out
    }
}

pub struct Binder<'m> {
    model: &'m dyn SymbolModel,
    depth: Cell<u32>,
    supertypes: RefCell<HashMap<DeclId, Vec<JType>>>,
}

impl<'m> Binder<'m> {
    pub fn new(model: &'m dyn SymbolModel) -> Self {
        Self {
            model,
            depth: Cell::new(0),
            supertypes: RefCell::new(HashMap::new()),
        }
    }

    /// Bind a reference site to the declaration it refers to
    pub fn bind_site(&self, at: UnitRef, node: Node) -> Option<DeclId> {
        match node.kind() {
            "method_invocation" => self.bind_invocation(at, node),
            "object_creation_expression" => self.bind_creation(at, node),
            "explicit_constructor_invocation" => self.bind_explicit_constructor(at, node),
            "method_reference" => self.bind_method_reference(at, node),
            "field_access" => self.bind_field_access(at, node),
            "identifier" => self.bind_identifier(at, node),
            _ => None,
        }
    }

    fn guarded<T>(&self, f: impl FnOnce() -> Option<T>) -> Option<T> {
        let depth = self.depth.get();
        if depth >= MAX_TYPING_DEPTH {
            return None;
        }
        self.depth.set(depth + 1);
        let out = f();
        self.depth.set(depth);
        out
    }

    fn with_decl<T>(&self, id: DeclId, f: impl FnOnce(UnitRef, &Declaration) -> T) -> Option<T> {
        let unit = self.model.unit(id.unit)?;
        let decl = unit.declaration(id.index)?;
        Some(f(UnitRef::new(id.unit, &unit), decl))
    }

    // ------------------------------------------------------------------
    // Type names
    // ------------------------------------------------------------------

    /// Resolve a possibly qualified type name without type arguments or dims
    pub fn resolve_type_name(
        &self,
        at: UnitRef,
        scope: Option<u32>,
        member_type_params: &[String],
        name: &str,
    ) -> JType {
        if let Some(primitive) = Primitive::from_keyword(name) {
            return JType::Primitive(primitive);
        }
        match name {
            "void" => return JType::Void,
            "var" | "" => return JType::Unknown,
            _ => {}
        }

        let Some((first, rest)) = name.split_once('.') else {
            return self.resolve_simple_type(at, scope, member_type_params, name);
        };
        if let Some(id) = self.model.find_type(name) {
            return JType::class(name, Some(id));
        }
        if let JType::Class {
            name: base,
            decl: Some(_),
        } = self.resolve_simple_type(at, scope, member_type_params, first)
        {
            let path = format!("{base}.{rest}");
            if let Some(id) = self.model.find_type(&path) {
                return JType::class(path, Some(id));
            }
        }
        JType::class(name, None)
    }

    fn resolve_simple_type(
        &self,
        at: UnitRef,
        scope: Option<u32>,
        member_type_params: &[String],
        name: &str,
    ) -> JType {
        if member_type_params.iter().any(|param| param == name) {
            return JType::TypeVar(name.to_string());
        }

        // Enclosing types and their member types, innermost first
        let mut current = scope;
        while let Some(index) = current {
            let Some(decl) = at.unit.declaration(index) else {
                break;
            };
            if decl.type_params.iter().any(|param| param == name) {
                return JType::TypeVar(name.to_string());
            }
            if decl.name == name {
                return JType::class(decl.type_path.clone(), Some(at.decl_id(index)));
            }
            if let Some(found) = self.guarded(|| self.member_type(at.decl_id(index), name)) {
                return found;
            }
            current = decl.parent;
        }

        for (index, decl) in at.unit.top_level_types() {
            if decl.name == name {
                return JType::class(decl.type_path.clone(), Some(at.decl_id(index)));
            }
        }

        let imports = &at.unit.imports;
        if let Some(import) = imports
            .iter()
            .find(|i| !i.is_glob && !i.is_static && i.simple_name() == name)
        {
            return self.class_named(&import.path);
        }

        let same_package = if at.unit.package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", at.unit.package)
        };
        if let Some(id) = self.model.find_type(&same_package) {
            return JType::class(same_package, Some(id));
        }

        for import in imports.iter().filter(|i| i.is_glob && !i.is_static) {
            let path = format!("{}.{name}", import.path);
            if let Some(id) = self.model.find_type(&path) {
                return JType::class(path, Some(id));
            }
        }

        let lang = format!("java.lang.{name}");
        if let Some(id) = self.model.find_type(&lang) {
            return JType::class(lang, Some(id));
        }
        if is_java_lang(name) {
            return JType::class(lang, None);
        }
        JType::class(name, None)
    }

    fn class_named(&self, path: &str) -> JType {
        JType::class(path, self.model.find_type(path))
    }

    /// Member type `name` declared in `type_id` or inherited by it
    fn member_type(&self, type_id: DeclId, name: &str) -> Option<JType> {
        for ty in self.hierarchy(type_id) {
            let Some(path) = self.with_decl(ty, |_, decl| format!("{}.{name}", decl.type_path)) else {
                continue;
            };
            if let Some(id) = self.model.find_type(&path) {
                return Some(JType::class(path, Some(id)));
            }
        }
        None
    }

    fn resolve_type_text(
        &self,
        at: UnitRef,
        scope: Option<u32>,
        member_type_params: &[String],
        text: &TypeText,
    ) -> JType {
        let base = self.resolve_type_name(at, scope, member_type_params, &text.erased);
        JType::array_of(base, text.dims)
    }

    /// Resolve a type node in the scope it appears in
    fn resolve_type_node(&self, at: UnitRef, node: Node) -> JType {
        let (erased, dims) = erase(at.text(node));
        let (scope, type_params) = self.scope_at(at, node);
        JType::array_of(
            self.resolve_type_name(at, scope, &type_params, &erased),
            dims,
        )
    }

    /// Enclosing type and member type parameters at a node
    fn scope_at(&self, at: UnitRef, node: Node) -> (Option<u32>, Vec<String>) {
        let offset = node.start_byte();
        let scope = at.unit.enclosing_type(offset);
        let type_params = at
            .unit
            .declarations
            .iter()
            .filter(|decl| !decl.kind.is_type() && decl.node.contains(&offset))
            .last()
            .map(|decl| decl.type_params.clone())
            .unwrap_or_default();
        (scope, type_params)
    }

    // ------------------------------------------------------------------
    // Type hierarchy
    // ------------------------------------------------------------------

    fn direct_supertypes(&self, type_id: DeclId) -> Vec<JType> {
        if let Some(cached) = self.supertypes.borrow().get(&type_id) {
            return cached.clone();
        }
        let resolved = self
            .guarded(|| {
                self.with_decl(type_id, |at, decl| {
                    let mut out: Vec<JType> = decl
                        .supertypes()
                        .map(|text| self.resolve_type_text(at, decl.parent, &decl.type_params, text))
                        .collect();
                    let implicit_object = decl.superclass.is_none()
                        && matches!(decl.kind, DeclKind::Class | DeclKind::Enum | DeclKind::Record)
                        && decl.type_path != OBJECT;
                    if implicit_object {
                        out.push(self.class_named(OBJECT));
                    }
                    out
                })
            })
            .unwrap_or_default();
        self.supertypes
            .borrow_mut()
            .insert(type_id, resolved.clone());
        resolved
    }

    /// `type_id` followed by its resolvable supertypes, breadth first
    fn hierarchy(&self, type_id: DeclId) -> Vec<DeclId> {
        let mut out = vec![type_id];
        let mut seen: HashSet<DeclId> = HashSet::from([type_id]);
        let mut queue = VecDeque::from([type_id]);
        while let Some(current) = queue.pop_front() {
            for sup in self.direct_supertypes(current) {
                if let Some(id) = sup.decl() {
                    if seen.insert(id) {
                        out.push(id);
                        queue.push_back(id);
                    }
                }
            }
        }
        out
    }

    fn superclass_of(&self, type_id: DeclId) -> Option<DeclId> {
        let has_superclass = self.with_decl(type_id, |_, decl| decl.superclass.is_some())?;
        if has_superclass {
            self.direct_supertypes(type_id).first().and_then(JType::decl)
        } else {
            self.model.find_type(OBJECT)
        }
    }

    /// Reference subtyping with leniency for types whose hierarchy is unknown
    fn is_subtype(&self, from: &JType, to: &JType) -> bool {
        if from.is_unknown() || to.is_unknown() {
            return true;
        }
        match (from, to) {
            (_, JType::Class { name, .. }) if name == OBJECT => from.is_reference(),
            (JType::Null, _) => to.is_reference(),
            (JType::Array(a), JType::Array(b)) => match (a.as_ref(), b.as_ref()) {
                (JType::Primitive(x), JType::Primitive(y)) => x == y,
                (JType::Primitive(_), other) | (other, JType::Primitive(_)) => other.is_unknown(),
                (x, y) => self.is_subtype(x, y),
            },
            (JType::Array(_), JType::Class { name, .. }) => {
                matches!(name.as_str(), "java.lang.Cloneable" | "java.io.Serializable")
            }
            (
                JType::Class {
                    name: from_name,
                    decl: from_decl,
                },
                JType::Class {
                    name: to_name,
                    decl: to_decl,
                },
            ) => {
                if from_name == to_name || (from_decl.is_some() && from_decl == to_decl) {
                    return true;
                }
                if (from_decl.is_none() || to_decl.is_none())
                    && simple_name(from_name) == simple_name(to_name)
                    && (!from_name.contains('.') || !to_name.contains('.'))
                {
                    return true;
                }
                self.class_extends(from_name, *from_decl, to_name, *to_decl)
            }
            _ => false,
        }
    }

    fn class_extends(
        &self,
        from_name: &str,
        from_decl: Option<DeclId>,
        to_name: &str,
        to_decl: Option<DeclId>,
    ) -> bool {
        let Some(start) = from_decl else {
            // Nothing loaded for this type: trust the builtin table or accept
            return match builtin_supertypes(from_name) {
                Some(builtins) => builtins.contains(&to_name),
                None => from_name != OBJECT,
            };
        };

        let mut seen: HashSet<DeclId> = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for sup in self.direct_supertypes(current) {
                let JType::Class { name, decl } = &sup else {
                    continue;
                };
                if name == to_name || (decl.is_some() && *decl == to_decl) {
                    return true;
                }
                match decl {
                    Some(id) => {
                        if seen.insert(*id) {
                            queue.push_back(*id);
                        }
                    }
                    None => match builtin_supertypes(name) {
                        Some(builtins) if builtins.contains(&to_name) => return true,
                        Some(_) => {}
                        None if name != OBJECT => return true,
                        None => {}
                    },
                }
            }
        }
        false
    }

    fn is_assignable(&self, from: &JType, to: &JType, phase: Phase) -> bool {
        if from.is_unknown() || to.is_unknown() {
            return true;
        }
        match (from, to) {
            (JType::Void, _) | (_, JType::Void) => false,
            (JType::Primitive(a), JType::Primitive(b)) => a.widens_to(*b),
            (JType::Primitive(a), _) => {
                phase != Phase::Strict && self.is_subtype(&self.class_named(a.boxed()), to)
            }
            (_, JType::Primitive(b)) => {
                phase != Phase::Strict && from.as_primitive().is_some_and(|a| a.widens_to(*b))
            }
            _ => self.is_subtype(from, to),
        }
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    fn candidate(&self, id: DeclId) -> Option<Candidate> {
        self.with_decl(id, |at, decl| {
            let mut type_params = decl.type_params.clone();
            type_params.extend(self.enclosing_type_params(at, decl.parent));
            Candidate {
                id,
                params: decl
                    .params
                    .iter()
                    .map(|text| self.resolve_type_text(at, decl.parent, &type_params, text))
                    .collect(),
                varargs: decl.varargs,
            }
        })
    }

    fn enclosing_type_params(&self, at: UnitRef, mut current: Option<u32>) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(index) = current {
            let Some(decl) = at.unit.declaration(index) else {
                break;
            };
            out.extend(decl.type_params.iter().cloned());
            current = decl.parent;
        }
        out
    }

    /// Methods named `name` visible on `type_id`; overridden ones are hidden
    fn methods_named(&self, type_id: DeclId, name: &str) -> Vec<Candidate> {
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        let mut out = Vec::new();
        for ty in self.hierarchy(type_id) {
            let Some(unit) = self.model.unit(ty.unit) else {
                continue;
            };
            for (index, decl) in unit.members_of(ty.index) {
                if decl.kind != DeclKind::Method || decl.name != name {
                    continue;
                }
                let signature = decl.params.iter().map(TypeText::erased_signature).collect();
                if seen.insert(signature) {
                    if let Some(candidate) = self.candidate(DeclId::new(ty.unit, index)) {
                        out.push(candidate);
                    }
                }
            }
        }
        out
    }

    fn constructors_of(&self, type_id: DeclId) -> Vec<Candidate> {
        let Some(unit) = self.model.unit(type_id.unit) else {
            return Vec::new();
        };
        unit.members_of(type_id.index)
            .filter(|(_, decl)| decl.kind == DeclKind::Constructor)
            .filter_map(|(index, _)| self.candidate(DeclId::new(type_id.unit, index)))
            .collect()
    }

    fn field_named(&self, type_id: DeclId, name: &str) -> Option<DeclId> {
        for ty in self.hierarchy(type_id) {
            let Some(unit) = self.model.unit(ty.unit) else {
                continue;
            };
            let found = unit
                .members_of(ty.index)
                .find(|(_, decl)| decl.kind.is_field_like() && decl.name == name);
            if let Some((index, _)) = found {
                return Some(DeclId::new(ty.unit, index));
            }
        }
        None
    }

    /// A field visible by simple name at `node`
    fn field_in_scope(&self, at: UnitRef, node: Node, name: &str) -> Option<DeclId> {
        let mut current = at.unit.enclosing_type(node.start_byte());
        while let Some(index) = current {
            if let Some(field) = self.field_named(at.decl_id(index), name) {
                return Some(field);
            }
            current = at.unit.declaration(index)?.parent;
        }
        self.static_imports(at, name)
            .into_iter()
            .find_map(|ty| self.field_named(ty, name))
    }

    /// Types whose static members named `name` are imported
    fn static_imports(&self, at: UnitRef, name: &str) -> Vec<DeclId> {
        at.unit
            .imports
            .iter()
            .filter(|import| import.is_static)
            .filter_map(|import| {
                if import.is_glob {
                    self.model.find_type(&import.path)
                } else if import.simple_name() == name {
                    self.model.find_type(import.qualifier())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Value type of a field or return type of a method
    fn value_type_of(&self, id: DeclId) -> JType {
        self.with_decl(id, |at, decl| {
            let Some(text) = &decl.value_type else {
                return JType::Unknown;
            };
            let mut type_params = decl.type_params.clone();
            type_params.extend(self.enclosing_type_params(at, decl.parent));
            self.resolve_type_text(at, decl.parent, &type_params, text)
        })
        .unwrap_or(JType::Unknown)
    }

    // ------------------------------------------------------------------
    // Overload selection
    // ------------------------------------------------------------------

    /// Pick the overload an invocation with `args` binds to
    pub fn select_overload(&self, candidates: &[Candidate], args: &[JType]) -> Option<DeclId> {
        for phase in [Phase::Strict, Phase::Loose, Phase::Varargs] {
            let applicable: Vec<&Candidate> = candidates
                .iter()
                .filter(|candidate| self.is_applicable(candidate, args, phase))
                .collect();
            match applicable.len() {
                0 => continue,
                1 => return Some(applicable[0].id),
                _ => return self.most_specific(&applicable, args.len(), phase),
            }
        }
        None
    }

    fn is_applicable(&self, candidate: &Candidate, args: &[JType], phase: Phase) -> bool {
        if phase == Phase::Varargs {
            if !candidate.varargs || args.len() + 1 < candidate.params.len() {
                return false;
            }
        } else if candidate.params.len() != args.len() {
            return false;
        }
        let params = candidate.expanded(args.len(), phase);
        args.iter()
            .zip(params.iter())
            .all(|(arg, param)| self.is_assignable(arg, param, phase))
    }

    fn most_specific(&self, applicable: &[&Candidate], arity: usize, phase: Phase) -> Option<DeclId> {
        let expanded: Vec<Vec<JType>> = applicable
            .iter()
            .map(|candidate| candidate.expanded(arity, phase))
            .collect();
        let more_specific = |a: &[JType], b: &[JType]| {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(x, y)| self.is_assignable(x, y, Phase::Strict))
        };

        let winners: Vec<usize> = (0..applicable.len())
            .filter(|&i| {
                (0..applicable.len()).all(|j| i == j || more_specific(&expanded[i], &expanded[j]))
            })
            .collect();
        match winners.as_slice() {
            [winner] => Some(applicable[*winner].id),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Sites
    // ------------------------------------------------------------------

    fn argument_types(&self, at: UnitRef, args: Option<Node>) -> Vec<JType> {
        let Some(args) = args else {
            return Vec::new();
        };
        let mut cursor = args.walk();
        args.named_children(&mut cursor)
            .filter(|arg| !arg.kind().ends_with("comment"))
            .map(|arg| self.type_of(at, arg))
            .collect()
    }

    fn bind_invocation(&self, at: UnitRef, node: Node) -> Option<DeclId> {
        let name = at.text(node.child_by_field_name("name")?);
        let args = self.argument_types(at, node.child_by_field_name("arguments"));

        if let Some(object) = node.child_by_field_name("object") {
            let receiver = self.receiver(at, object)?;
            return self.select_overload(&self.methods_named(receiver, name), &args);
        }

        // Anonymous and local classes are not declarations; their own
        // methods and supertypes come before the enclosing named type
        for class in local_classes_around(at, node) {
            let candidates = self.local_class_methods(at, class, name)?;
            if !candidates.is_empty() {
                return self.select_overload(&candidates, &args);
            }
        }

        // The innermost enclosing type with a method of that name decides
        let mut current = at.unit.enclosing_type(node.start_byte());
        while let Some(index) = current {
            let candidates = self.methods_named(at.decl_id(index), name);
            if !candidates.is_empty() {
                return self.select_overload(&candidates, &args);
            }
            current = at.unit.declaration(index)?.parent;
        }

        for ty in self.static_imports(at, name) {
            let candidates = self.methods_named(ty, name);
            if !candidates.is_empty() {
                return self.select_overload(&candidates, &args);
            }
        }
        None
    }

    /// Methods named `name` inherited by an anonymous or local class.
    ///
    /// `None` when the class declares such a method itself or one of its
    /// supertypes cannot be resolved.
    fn local_class_methods(
        &self,
        at: UnitRef,
        class: Node,
        name: &str,
    ) -> Option<Vec<Candidate>> {
        let mut supertypes = Vec::new();
        let body = local_class_body(class)?;
        if class.kind() == "object_creation_expression" {
            supertypes.extend(class.child_by_field_name("type"));
        } else {
            supertypes.extend(
                class
                    .child_by_field_name("superclass")
                    .and_then(|sc| sc.named_child(0)),
            );
            let mut cursor = class.walk();
            for child in class.children(&mut cursor) {
                if !matches!(child.kind(), "super_interfaces" | "extends_interfaces") {
                    continue;
                }
                if let Some(list) = first_named_of(child, &["type_list"]) {
                    let mut inner = list.walk();
                    supertypes.extend(list.named_children(&mut inner));
                }
            }
        }

        if declares_member(at, body, name, false) {
            return None;
        }

        let mut out = Vec::new();
        for ty in supertypes {
            let id = self.resolve_type_node(at, ty).decl()?;
            out.extend(self.methods_named(id, name));
        }
        Some(out)
    }

    fn bind_constructor(&self, type_id: DeclId, args: &[JType]) -> Option<DeclId> {
        let constructors = self.constructors_of(type_id);
        if constructors.is_empty() {
            // Implicit default constructor
            return Some(type_id);
        }
        self.select_overload(&constructors, args)
    }

    fn bind_creation(&self, at: UnitRef, node: Node) -> Option<DeclId> {
        let ty = node.child_by_field_name("type")?;
        let type_id = self.resolve_type_node(at, ty).decl()?;
        let args = self.argument_types(at, node.child_by_field_name("arguments"));
        self.bind_constructor(type_id, &args)
    }

    fn bind_explicit_constructor(&self, at: UnitRef, node: Node) -> Option<DeclId> {
        let enclosing = at.decl_id(at.unit.enclosing_type(node.start_byte())?);
        let target = match node.child_by_field_name("constructor")?.kind() {
            "this" => enclosing,
            "super" => self.superclass_of(enclosing)?,
            _ => return None,
        };
        let args = self.argument_types(at, node.child_by_field_name("arguments"));
        self.bind_constructor(target, &args)
    }

    fn bind_method_reference(&self, at: UnitRef, node: Node) -> Option<DeclId> {
        let target = node.named_child(0)?;
        let creates = node
            .child(node.child_count().saturating_sub(1))
            .is_some_and(|last| last.kind() == "new");
        let type_id = match target.kind() {
            "type_identifier" | "scoped_type_identifier" | "generic_type" => {
                self.resolve_type_node(at, target).decl()
            }
            _ => self.receiver(at, target),
        }?;

        if creates {
            let constructors = self.constructors_of(type_id);
            return match constructors.as_slice() {
                [] => Some(type_id),
                [only] => Some(only.id),
                _ => None,
            };
        }

        let name_node = node.named_child(node.named_child_count().saturating_sub(1))?;
        if name_node.kind() != "identifier" {
            return None;
        }
        match self.methods_named(type_id, at.text(name_node)).as_slice() {
            [only] => Some(only.id),
            _ => None,
        }
    }

    fn bind_field_access(&self, at: UnitRef, node: Node) -> Option<DeclId> {
        let field = node.child_by_field_name("field")?;
        if field.kind() != "identifier" {
            return None;
        }
        let receiver = self.receiver(at, node.child_by_field_name("object")?)?;
        self.field_named(receiver, at.text(field))
    }

    fn bind_identifier(&self, at: UnitRef, node: Node) -> Option<DeclId> {
        let name = at.text(node);
        if find_local(node, name, &at.unit.source).is_some() {
            return None;
        }
        let shadowed = local_classes_around(at, node)
            .into_iter()
            .filter_map(local_class_body)
            .any(|body| declares_member(at, body, name, true));
        if shadowed {
            return None;
        }
        self.field_in_scope(at, node, name)
    }

    /// Declaration of the static type of a receiver expression.
    ///
    /// Names that are neither locals nor fields are tried as type names, so
    /// `Thread.currentThread()` and `Outer.Inner.make()` bind statically.
    fn receiver(&self, at: UnitRef, object: Node) -> Option<DeclId> {
        match object.kind() {
            "this" if local_classes_around(at, object).is_empty() => {
                at.unit.enclosing_type(object.start_byte()).map(|i| at.decl_id(i))
            }
            "this" => None,
            "super" if local_classes_around(at, object).is_empty() => {
                let enclosing = at.decl_id(at.unit.enclosing_type(object.start_byte())?);
                self.superclass_of(enclosing)
            }
            "identifier" => {
                let name = at.text(object);
                if let Some(local) = find_local(object, name, &at.unit.source) {
                    return self.local_type(at, local).decl();
                }
                if let Some(field) = self.field_in_scope(at, object, name) {
                    return self.value_type_of(field).decl();
                }
                self.resolve_type_node(at, object).decl()
            }
            "field_access" => match self.type_of(at, object) {
                JType::Unknown => self.resolve_type_node(at, object).decl(),
                ty => ty.decl(),
            },
            _ => self.type_of(at, object).decl(),
        }
    }

    // ------------------------------------------------------------------
    // Expression typing
    // ------------------------------------------------------------------

    fn local_type(&self, at: UnitRef, local: LocalType) -> JType {
        match local {
            LocalType::Declared(ty, dims) => JType::array_of(self.resolve_type_node(at, ty), dims),
            LocalType::Inferred(value) => self.type_of(at, value),
            LocalType::Untyped => JType::Unknown,
        }
    }

    /// Static type of an expression, `Unknown` when it cannot be determined
    pub fn type_of(&self, at: UnitRef, node: Node) -> JType {
        self.guarded(|| Some(self.type_of_inner(at, node)))
            .unwrap_or(JType::Unknown)
    }

    fn type_of_inner(&self, at: UnitRef, node: Node) -> JType {
        let text = at.text(node);
        match node.kind() {
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal" => {
                if text.ends_with(['l', 'L']) {
                    JType::Primitive(Primitive::Long)
                } else {
                    JType::Primitive(Primitive::Int)
                }
            }
            "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                if text.ends_with(['f', 'F']) && !text.starts_with("0x") {
                    JType::Primitive(Primitive::Float)
                } else {
                    JType::Primitive(Primitive::Double)
                }
            }
            "true" | "false" => JType::Primitive(Primitive::Boolean),
            "character_literal" => JType::Primitive(Primitive::Char),
            "string_literal" | "text_block" => JType::string(),
            "null_literal" => JType::Null,
            "class_literal" => self.class_named("java.lang.Class"),
            "this" => at
                .unit
                .enclosing_type(node.start_byte())
                .and_then(|index| {
                    let decl = at.unit.declaration(index)?;
                    Some(JType::class(decl.type_path.clone(), Some(at.decl_id(index))))
                })
                .unwrap_or(JType::Unknown),
            "identifier" => match find_local(node, text, &at.unit.source) {
                Some(local) => self.local_type(at, local),
                None => self
                    .field_in_scope(at, node, text)
                    .map(|field| self.value_type_of(field))
                    .unwrap_or(JType::Unknown),
            },
            "field_access" => {
                let Some(field) = node.child_by_field_name("field") else {
                    return JType::Unknown;
                };
                let Some(object) = node.child_by_field_name("object") else {
                    return JType::Unknown;
                };
                if at.text(field) == "length" && self.type_of(at, object).element().is_some() {
                    return JType::Primitive(Primitive::Int);
                }
                self.receiver(at, object)
                    .and_then(|ty| self.field_named(ty, at.text(field)))
                    .map(|id| self.value_type_of(id))
                    .unwrap_or(JType::Unknown)
            }
            "method_invocation" => self
                .bind_invocation(at, node)
                .map(|id| self.value_type_of(id))
                .unwrap_or(JType::Unknown),
            "object_creation_expression" | "cast_expression" => node
                .child_by_field_name("type")
                .map(|ty| self.resolve_type_node(at, ty))
                .unwrap_or(JType::Unknown),
            "array_creation_expression" => {
                let Some(ty) = node.child_by_field_name("type") else {
                    return JType::Unknown;
                };
                let mut dims = 0;
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    match child.kind() {
                        "dimensions_expr" => dims += 1,
                        "dimensions" => dims += at.text(child).matches('[').count() as u32,
                        _ => {}
                    }
                }
                JType::array_of(self.resolve_type_node(at, ty), dims)
            }
            "parenthesized_expression" => node
                .named_child(0)
                .map(|inner| self.type_of(at, inner))
                .unwrap_or(JType::Unknown),
            "assignment_expression" => node
                .child_by_field_name("left")
                .map(|left| self.type_of(at, left))
                .unwrap_or(JType::Unknown),
            "ternary_expression" => {
                let consequence = node
                    .child_by_field_name("consequence")
                    .map(|n| self.type_of(at, n))
                    .unwrap_or(JType::Unknown);
                match consequence {
                    JType::Null | JType::Unknown => node
                        .child_by_field_name("alternative")
                        .map(|n| self.type_of(at, n))
                        .unwrap_or(JType::Unknown),
                    ty => ty,
                }
            }
            "array_access" => node
                .child_by_field_name("array")
                .and_then(|array| self.type_of(at, array).element().cloned())
                .unwrap_or(JType::Unknown),
            "binary_expression" => self.binary_type(at, node),
            "unary_expression" => {
                let operator = node.child_by_field_name("operator").map(|op| op.kind());
                let operand = node
                    .child_by_field_name("operand")
                    .map(|n| self.type_of(at, n))
                    .unwrap_or(JType::Unknown);
                match (operator, operand.as_primitive()) {
                    (Some("!"), _) => JType::Primitive(Primitive::Boolean),
                    (_, Some(p)) if p.is_numeric() => {
                        JType::Primitive(Primitive::promote(p, Primitive::Int))
                    }
                    _ => JType::Unknown,
                }
            }
            "update_expression" => node
                .named_child(0)
                .map(|operand| self.type_of(at, operand))
                .unwrap_or(JType::Unknown),
            "instanceof_expression" => JType::Primitive(Primitive::Boolean),
            _ => JType::Unknown,
        }
    }

    fn binary_type(&self, at: UnitRef, node: Node) -> JType {
        let Some(operator) = node.child_by_field_name("operator").map(|op| op.kind()) else {
            return JType::Unknown;
        };
        let side = |field| {
            node.child_by_field_name(field)
                .map(|n| self.type_of(at, n))
                .unwrap_or(JType::Unknown)
        };
        match operator {
            "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" => {
                JType::Primitive(Primitive::Boolean)
            }
            _ => {
                let (left, right) = (side("left"), side("right"));
                if operator == "+" && (left.is_string() || right.is_string()) {
                    return JType::string();
                }
                match (left.as_primitive(), right.as_primitive()) {
                    (Some(Primitive::Boolean), Some(Primitive::Boolean))
                        if matches!(operator, "&" | "|" | "^") =>
                    {
                        JType::Primitive(Primitive::Boolean)
                    }
                    (Some(l), Some(_)) if matches!(operator, "<<" | ">>" | ">>>") => {
                        JType::Primitive(Primitive::promote(l, Primitive::Int))
                    }
                    (Some(l), Some(r)) if l.is_numeric() && r.is_numeric() => {
                        JType::Primitive(Primitive::promote(l, r))
                    }
                    _ => JType::Unknown,
                }
            }
        }
    }
}

/// Anonymous and local classes around `node`, innermost first, up to the
/// enclosing named type
fn local_classes_around<'t>(at: UnitRef, node: Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if ancestor.kind() == "class_body" {
            if let Some(creation) = ancestor
                .parent()
                .filter(|p| p.kind() == "object_creation_expression")
            {
                out.push(creation);
            }
        } else if type_kind(ancestor.kind()).is_some() {
            let range = ancestor.byte_range();
            if at.unit.declarations.iter().any(|decl| decl.node == range) {
                break;
            }
            out.push(ancestor);
        }
        current = ancestor.parent();
    }
    out
}

fn local_class_body(class: Node) -> Option<Node> {
    if class.kind() == "object_creation_expression" {
        first_named_of(class, &["class_body"])
    } else {
        class.child_by_field_name("body")
    }
}

/// Whether a class body declares a method (or, with `field`, a field) named `name`
fn declares_member(at: UnitRef, body: Node, name: &str, field: bool) -> bool {
    let mut cursor = body.walk();
    body.named_children(&mut cursor).any(|member| match member.kind() {
        "method_declaration" if !field => member
            .child_by_field_name("name")
            .is_some_and(|n| at.text(n) == name),
        "field_declaration" if field => {
            let mut inner = member.walk();
            member
                .children_by_field_name("declarator", &mut inner)
                .filter_map(|d| d.child_by_field_name("name"))
                .any(|n| at.text(n) == name)
        }
        _ => false,
    })
}
