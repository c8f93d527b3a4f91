//! Library artifacts and materialized views of their types
//!
//! A library artifact has no editable source. Its types are turned into
//! synthetic views by a [`Materializer`] and the parsed views are cached
//! per `(artifact, revision, type)` for the lifetime of the host, so
//! identities and URIs stay stable across snapshots. A snapshot holding a
//! replaced artifact only ever fills entries of its own revision.

use super::walker::FileWalker;
use crate::error::{MaterializeError, WorkspaceError, WorkspaceResult};
use crate::parsing::{CompilationUnit, JavaParser};
use crate::types::{ContentId, ViewFormat};
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// A dependency archive: its top-level types and any attached sources
#[derive(Debug, Clone)]
pub struct LibraryArtifact {
    id: Arc<str>,
    /// Bumped by the host each time an artifact with this id is declared
    revision: u64,
    /// Fully-qualified top-level type names, sorted
    types: Vec<String>,
    sources: HashMap<String, String>,
}

impl LibraryArtifact {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.into(),
            revision: 0,
            types: Vec::new(),
            sources: HashMap::new(),
        }
    }

    /// Register a type, optionally with its attached source
    pub fn add_type(&mut self, type_name: &str, source: Option<String>) {
        if let Err(at) = self.types.binary_search_by(|t| t.as_str().cmp(type_name)) {
            self.types.insert(at, type_name.to_string());
        }
        if let Some(source) = source {
            self.sources.insert(type_name.to_string(), source);
        }
    }

    pub fn with_source(mut self, type_name: &str, source: impl Into<String>) -> Self {
        self.add_type(type_name, Some(source.into()));
        self
    }

    /// Load an artifact from a directory of attached `.java` sources.
    ///
    /// Type names come from the relative path: `org/x/Foo.java` is `org.x.Foo`.
    pub fn from_source_dir(id: &str, dir: &Path) -> WorkspaceResult<Self> {
        if !dir.is_dir() {
            return Err(WorkspaceError::MissingRoot {
                path: dir.to_path_buf(),
            });
        }
        let mut artifact = Self::new(id);
        for path in FileWalker::new().walk(dir) {
            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };
            let type_name = relative
                .with_extension("")
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(".");
            let source = std::fs::read_to_string(&path).map_err(|source| {
                WorkspaceError::FileRead {
                    path: path.clone(),
                    source,
                }
            })?;
            artifact.add_type(&type_name, Some(source));
        }
        debug!(
            artifact = id,
            types = artifact.types.len(),
            "loaded library sources"
        );
        Ok(artifact)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.ordinal_of(type_name).is_some()
    }

    /// Position of a type in the sorted type list
    pub fn ordinal_of(&self, type_name: &str) -> Option<u32> {
        self.types
            .binary_search_by(|t| t.as_str().cmp(type_name))
            .ok()
            .map(|at| at as u32)
    }

    pub fn source_of(&self, type_name: &str) -> Option<&str> {
        self.sources.get(type_name).map(String::as_str)
    }
}

/// Source-like text produced for a library type
#[derive(Debug, Clone)]
pub struct SyntheticView {
    pub format: ViewFormat,
    pub source: String,
}

/// The decompilation or stub service for library content
pub trait Materializer: Send + Sync {
    fn materialize(
        &self,
        artifact: &LibraryArtifact,
        type_name: &str,
    ) -> Result<SyntheticView, MaterializeError>;
}

/// Serves the sources attached to an artifact and nothing else
#[derive(Debug, Default, Clone, Copy)]
pub struct AttachedSourceMaterializer;

impl Materializer for AttachedSourceMaterializer {
    fn materialize(
        &self,
        artifact: &LibraryArtifact,
        type_name: &str,
    ) -> Result<SyntheticView, MaterializeError> {
        if !artifact.contains(type_name) {
            return Err(MaterializeError::UnknownType {
                artifact: artifact.id().to_string(),
                type_name: type_name.to_string(),
            });
        }
        let source = artifact
            .source_of(type_name)
            .ok_or_else(|| MaterializeError::NoSource {
                artifact: artifact.id().to_string(),
                type_name: type_name.to_string(),
            })?;
        Ok(SyntheticView {
            format: ViewFormat::Source,
            source: source.to_string(),
        })
    }
}

type ViewKey = (Arc<str>, u64, String);

/// Parsed synthetic views shared by every snapshot of one host
#[derive(Default)]
pub struct ViewCache {
    views: DashMap<ViewKey, Result<Arc<CompilationUnit>, MaterializeError>>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parsed view of `type_name`, materializing it on first use.
    ///
    /// Failures are cached too, so a type without source is reported once.
    pub fn get_or_materialize(
        &self,
        artifact: &LibraryArtifact,
        type_name: &str,
        materializer: &dyn Materializer,
    ) -> Result<Arc<CompilationUnit>, MaterializeError> {
        let key: ViewKey = (artifact.id.clone(), artifact.revision, type_name.to_string());
        if let Some(entry) = self.views.get(&key) {
            return entry.value().clone();
        }

        let built = Self::build(artifact, type_name, materializer);
        match &built {
            Ok(_) => debug!(artifact = artifact.id(), type_name, "materialized view"),
            Err(e) => warn!(artifact = artifact.id(), type_name, "{e}"),
        }
        // A concurrent request may have won the race; keep its result
        self.views.entry(key).or_insert(built).value().clone()
    }

    fn build(
        artifact: &LibraryArtifact,
        type_name: &str,
        materializer: &dyn Materializer,
    ) -> Result<Arc<CompilationUnit>, MaterializeError> {
        let view = materializer.materialize(artifact, type_name)?;
        let parse_error = |reason: String| MaterializeError::Parse {
            type_name: type_name.to_string(),
            reason,
        };
        let content = ContentId::synthetic(artifact.id(), type_name, view.format);
        let mut parser = JavaParser::new().map_err(|e| parse_error(e.to_string()))?;
        let unit = parser
            .parse(content, view.source)
            .map_err(|e| parse_error(e.to_string()))?;
        Ok(Arc::new(unit))
    }

    /// Drop the views of older revisions of an artifact
    pub fn purge_artifact(&self, artifact: &str, current: u64) {
        self.views
            .retain(|(id, revision, _), _| id.as_ref() != artifact || *revision == current);
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
