//! Mutable workspace host
//!
//! The host owns workspace sources and library artifacts and hands out
//! immutable [`Snapshot`]s. Edits mark the host dirty; the next call to
//! [`WorkspaceHost::snapshot`] re-parses and publishes a new snapshot.

use super::library::{AttachedSourceMaterializer, LibraryArtifact, Materializer, ViewCache};
use super::snapshot::{ScanOptions, Snapshot};
use super::walker::FileWalker;
use crate::Settings;
use crate::error::{HierarchyError, HierarchyResult, ParseError, WorkspaceError, WorkspaceResult};
use crate::parsing::JavaParser;
use crate::types::ContentId;
use parking_lot::RwLock;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{info, warn};

pub struct WorkspaceHost {
    root: PathBuf,
    /// Workspace-relative path -> source text
    files: BTreeMap<PathBuf, String>,
    libraries: Vec<Arc<LibraryArtifact>>,
    materializer: Arc<dyn Materializer>,
    views: Arc<ViewCache>,
    scan: ScanOptions,
    current: RwLock<Option<Arc<Snapshot>>>,
    dirty: AtomicBool,
    generation: AtomicU64,
    library_revision: u64,
    loaded: bool,
    load_error: Option<String>,
}

impl std::fmt::Debug for WorkspaceHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceHost")
            .field("root", &self.root)
            .field("files", &self.files.len())
            .field("libraries", &self.libraries.len())
            .field("views", &self.views.len())
            .field("load_error", &self.load_error)
            .finish()
    }
}

impl WorkspaceHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: BTreeMap::new(),
            libraries: Vec::new(),
            materializer: Arc::new(AttachedSourceMaterializer),
            views: Arc::new(ViewCache::new()),
            scan: ScanOptions::default(),
            current: RwLock::new(None),
            dirty: AtomicBool::new(true),
            generation: AtomicU64::new(0),
            library_revision: 0,
            loaded: false,
            load_error: None,
        }
    }

    /// Build a host from settings: source roots, libraries and scan options.
    ///
    /// Load failures do not fail construction. They are kept and reported
    /// by [`WorkspaceHost::snapshot`] as an unavailable index.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut host = Self::new(settings.resolved_root());
        host.set_parallel_scan(
            settings.hierarchy.parallel_scan,
            settings.hierarchy.parallel_threads,
        );

        for source_root in &settings.source_roots {
            if let Err(e) = host.load_source_root(source_root) {
                warn!("{e}");
            }
        }
        for library in &settings.libraries {
            let dir = host.resolve(&library.sources);
            match LibraryArtifact::from_source_dir(&library.id, &dir) {
                Ok(artifact) => host.add_library(artifact),
                Err(e) => {
                    warn!(artifact = %library.id, "{e}");
                    host.load_error = Some(e.to_string());
                }
            }
        }
        host
    }

    pub fn with_materializer(mut self, materializer: Arc<dyn Materializer>) -> Self {
        self.materializer = materializer;
        self.views = Arc::new(ViewCache::new());
        self.mark_dirty();
        self
    }

    /// Configure parallel reference scanning on a dedicated thread pool
    pub fn set_parallel_scan(&mut self, parallel: bool, threads: usize) {
        let pool = if parallel && threads > 0 {
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => Some(Arc::new(pool)),
                Err(e) => {
                    warn!("falling back to the global thread pool: {e}");
                    None
                }
            }
        } else {
            None
        };
        self.scan = ScanOptions { parallel, pool };
        self.mark_dirty();
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a workspace-relative one
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Add or replace a workspace file
    pub fn set_file(&mut self, path: impl AsRef<Path>, source: impl Into<String>) {
        let relative = self.relative(path.as_ref());
        self.files.insert(relative, source.into());
        self.loaded = true;
        self.mark_dirty();
    }

    /// Remove a workspace file; returns whether it existed
    pub fn remove_file(&mut self, path: impl AsRef<Path>) -> bool {
        let relative = self.relative(path.as_ref());
        let removed = self.files.remove(&relative).is_some();
        if removed {
            self.mark_dirty();
        }
        removed
    }

    /// Declare a library artifact, replacing one with the same id
    pub fn add_library(&mut self, mut artifact: LibraryArtifact) {
        self.library_revision += 1;
        artifact.set_revision(self.library_revision);
        self.views.purge_artifact(artifact.id(), self.library_revision);
        let artifact = Arc::new(artifact);
        match self
            .libraries
            .iter_mut()
            .find(|existing| existing.id() == artifact.id())
        {
            Some(existing) => *existing = artifact,
            None => self.libraries.push(artifact),
        }
        self.loaded = true;
        self.mark_dirty();
    }

    /// Read every `.java` file below `dir` into the workspace
    pub fn load_source_root(&mut self, dir: impl AsRef<Path>) -> WorkspaceResult<usize> {
        let dir = self.resolve(dir.as_ref());
        if !dir.is_dir() {
            let err = WorkspaceError::MissingRoot { path: dir };
            self.load_error = Some(err.to_string());
            return Err(err);
        }

        let mut count = 0;
        for path in FileWalker::new().walk(&dir) {
            match std::fs::read_to_string(&path) {
                Ok(source) => {
                    self.set_file(&path, source);
                    count += 1;
                }
                Err(source) => {
                    let err = WorkspaceError::FileRead { path, source };
                    self.load_error = Some(err.to_string());
                    return Err(err);
                }
            }
        }
        self.loaded = true;
        info!(root = %dir.display(), files = count, "loaded source root");
        Ok(count)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Parse every workspace file and publish a fresh snapshot
    pub fn rebuild(&self) -> WorkspaceResult<Arc<Snapshot>> {
        let entries: Vec<(&PathBuf, &String)> = self.files.iter().collect();
        let parse = |parser: &mut Result<JavaParser, ParseError>, (path, source): &(&PathBuf, &String)| {
            let parser = parser.as_mut().map_err(|e| e.clone())?;
            let content = ContentId::workspace(self.resolve(path));
            parser.parse(content, source.to_string()).map(Arc::new)
        };
        let units = match &self.scan.pool {
            Some(pool) => pool.install(|| {
                entries
                    .par_iter()
                    .map_init(JavaParser::new, parse)
                    .collect::<Result<Vec<_>, ParseError>>()
            }),
            None => entries
                .par_iter()
                .map_init(JavaParser::new, parse)
                .collect::<Result<Vec<_>, ParseError>>(),
        }?;

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let snapshot = Arc::new(Snapshot::new(
            generation,
            units,
            self.libraries.clone(),
            self.materializer.clone(),
            self.views.clone(),
            self.scan.clone(),
        ));
        info!(
            generation,
            units = snapshot.unit_count(),
            libraries = self.libraries.len(),
            "workspace rebuilt"
        );

        *self.current.write() = Some(snapshot.clone());
        self.dirty.store(false, Ordering::Release);
        Ok(snapshot)
    }

    /// The current snapshot, rebuilding first if the workspace changed
    pub fn snapshot(&self) -> HierarchyResult<Arc<Snapshot>> {
        if let Some(reason) = &self.load_error {
            return Err(HierarchyError::IndexUnavailable {
                reason: reason.clone(),
            });
        }
        if !self.loaded {
            return Err(HierarchyError::IndexUnavailable {
                reason: "workspace has not been loaded".to_string(),
            });
        }

        if !self.dirty.load(Ordering::Acquire) {
            if let Some(snapshot) = self.current.read().as_ref() {
                return Ok(snapshot.clone());
            }
        }
        self.rebuild()
            .map_err(|e| HierarchyError::IndexUnavailable {
                reason: e.to_string(),
            })
    }
}
