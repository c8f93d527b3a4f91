//! Immutable workspace snapshots
//!
//! A snapshot is what every request reads. It owns the parsed workspace
//! units and shares the library artifacts and the view cache with the
//! host that produced it.

use super::library::{LibraryArtifact, Materializer, ViewCache};
use crate::error::{HierarchyError, HierarchyResult, MaterializeError};
use crate::parsing::{CompilationUnit, SymbolModel};
use crate::symbol::Declaration;
use crate::types::{ContentId, DeclId, FileId, UnitId};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How reference scans spread work over threads
#[derive(Clone, Default)]
pub struct ScanOptions {
    pub parallel: bool,
    pub pool: Option<Arc<rayon::ThreadPool>>,
}

impl std::fmt::Debug for ScanOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanOptions")
            .field("parallel", &self.parallel)
            .field("threads", &self.pool.as_ref().map(|p| p.current_num_threads()))
            .finish()
    }
}

/// A declaration together with the unit that holds it
#[derive(Clone)]
pub struct DeclRef {
    pub id: DeclId,
    pub unit: Arc<CompilationUnit>,
}

impl DeclRef {
    pub fn decl(&self) -> &Declaration {
        &self.unit.declarations[self.id.index as usize]
    }
}

impl std::fmt::Debug for DeclRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeclRef")
            .field("id", &self.id)
            .field("key", &self.decl().key().to_string())
            .finish()
    }
}

pub struct Snapshot {
    generation: u64,
    /// Workspace units in ascending relative-path order
    units: Vec<Arc<CompilationUnit>>,
    unit_by_path: HashMap<PathBuf, FileId>,
    /// Workspace type paths; the first unit in path order wins
    types: HashMap<String, DeclId>,
    libraries: Vec<Arc<LibraryArtifact>>,
    materializer: Arc<dyn Materializer>,
    views: Arc<ViewCache>,
    scan: ScanOptions,
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("generation", &self.generation)
            .field("units", &self.units.len())
            .field("libraries", &self.libraries.len())
            .field("scan", &self.scan)
            .finish()
    }
}

impl Snapshot {
    pub(crate) fn new(
        generation: u64,
        units: Vec<Arc<CompilationUnit>>,
        libraries: Vec<Arc<LibraryArtifact>>,
        materializer: Arc<dyn Materializer>,
        views: Arc<ViewCache>,
        scan: ScanOptions,
    ) -> Self {
        let mut unit_by_path = HashMap::new();
        let mut types = HashMap::new();
        for (i, unit) in units.iter().enumerate() {
            let file = FileId(i as u32);
            if let Some(path) = unit.content.workspace_path() {
                unit_by_path.insert(path.to_path_buf(), file);
            }
            let mut declared: Vec<(&String, &u32)> = unit.type_index.iter().collect();
            declared.sort();
            for (path, index) in declared {
                types
                    .entry(path.clone())
                    .or_insert_with(|| DeclId::new(UnitId::Workspace(file), *index));
            }
        }

        Self {
            generation,
            units,
            unit_by_path,
            types,
            libraries,
            materializer,
            views,
            scan,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn libraries(&self) -> &[Arc<LibraryArtifact>] {
        &self.libraries
    }

    pub fn workspace_unit(&self, file: FileId) -> Option<&Arc<CompilationUnit>> {
        self.units.get(file.value() as usize)
    }

    /// The unit behind a workspace file path
    pub fn unit_at_path(&self, path: &Path) -> Option<(UnitId, Arc<CompilationUnit>)> {
        let file = *self.unit_by_path.get(path)?;
        let unit = self.workspace_unit(file)?.clone();
        Some((UnitId::Workspace(file), unit))
    }

    /// Materialized view of one library type
    pub fn library_unit(
        &self,
        artifact: u32,
        type_ordinal: u32,
    ) -> Result<Arc<CompilationUnit>, MaterializeError> {
        let library = self.libraries.get(artifact as usize).ok_or_else(|| {
            MaterializeError::UnknownArtifact {
                artifact: artifact.to_string(),
            }
        })?;
        let type_name = library
            .types()
            .get(type_ordinal as usize)
            .ok_or_else(|| MaterializeError::UnknownType {
                artifact: library.id().to_string(),
                type_name: type_ordinal.to_string(),
            })?;
        self.views
            .get_or_materialize(library, type_name, self.materializer.as_ref())
    }

    /// Resolve a content identity to the unit that renders it
    pub fn unit_for_content(
        &self,
        content: &ContentId,
    ) -> HierarchyResult<(UnitId, Arc<CompilationUnit>)> {
        match content {
            ContentId::Workspace { path } => {
                self.unit_at_path(path)
                    .ok_or_else(|| HierarchyError::UnknownContent { uri: content.uri() })
            }
            ContentId::Synthetic {
                artifact,
                type_name,
                ..
            } => {
                let unknown = || HierarchyError::UnknownContent { uri: content.uri() };
                let index = self
                    .libraries
                    .iter()
                    .position(|library| library.id() == artifact.as_ref())
                    .ok_or_else(unknown)?;
                let ordinal = self.libraries[index]
                    .ordinal_of(type_name)
                    .ok_or_else(unknown)?;
                let unit = self.library_unit(index as u32, ordinal)?;
                let id = UnitId::Library {
                    artifact: index as u32,
                    type_ordinal: ordinal,
                };
                Ok((id, unit))
            }
        }
    }

    pub fn decl(&self, id: DeclId) -> Option<DeclRef> {
        let unit = self.unit(id.unit)?;
        unit.declaration(id.index)?;
        Some(DeclRef { id, unit })
    }

    /// Run `f` over every workspace unit in path order.
    ///
    /// Runs on the scan pool when parallel scanning is enabled; results are
    /// returned in path order either way.
    pub fn scan_workspace<T, F>(&self, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(UnitId, &CompilationUnit) -> T + Sync + Send,
    {
        let id = |i: usize| UnitId::Workspace(FileId(i as u32));
        if !self.scan.parallel {
            return self
                .units
                .iter()
                .enumerate()
                .map(|(i, unit)| f(id(i), unit.as_ref()))
                .collect();
        }
        let run = || {
            self.units
                .par_iter()
                .enumerate()
                .map(|(i, unit)| f(id(i), unit.as_ref()))
                .collect::<Vec<T>>()
        };
        match &self.scan.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    /// Library units in artifact order, then type order
    pub fn library_units(
        &self,
    ) -> impl Iterator<Item = (UnitId, Result<Arc<CompilationUnit>, MaterializeError>)> + '_ {
        self.libraries
            .iter()
            .enumerate()
            .flat_map(move |(artifact, library)| {
                (0..library.types().len()).map(move |ordinal| {
                    let id = UnitId::Library {
                        artifact: artifact as u32,
                        type_ordinal: ordinal as u32,
                    };
                    (id, self.library_unit(artifact as u32, ordinal as u32))
                })
            })
    }

    fn find_library_type(&self, type_path: &str) -> Option<DeclId> {
        // Longest dotted prefix that names a top-level type of an artifact
        let mut prefix = type_path;
        loop {
            for (index, library) in self.libraries.iter().enumerate() {
                let Some(ordinal) = library.ordinal_of(prefix) else {
                    continue;
                };
                let Ok(unit) = self.library_unit(index as u32, ordinal) else {
                    continue;
                };
                let Some(decl) = unit.type_decl(type_path) else {
                    continue;
                };
                return Some(DeclId::new(
                    UnitId::Library {
                        artifact: index as u32,
                        type_ordinal: ordinal,
                    },
                    decl,
                ));
            }
            prefix = &prefix[..prefix.rfind('.')?];
        }
    }
}

impl SymbolModel for Snapshot {
    fn unit(&self, id: UnitId) -> Option<Arc<CompilationUnit>> {
        match id {
            UnitId::Workspace(file) => self.workspace_unit(file).cloned(),
            UnitId::Library {
                artifact,
                type_ordinal,
            } => self.library_unit(artifact, type_ordinal).ok(),
        }
    }

    fn find_type(&self, type_path: &str) -> Option<DeclId> {
        self.types
            .get(type_path)
            .copied()
            .or_else(|| self.find_library_type(type_path))
    }
}
