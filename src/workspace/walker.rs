//! File system walker for discovering Java sources
//!
//! This module provides directory traversal with support for:
//! - .gitignore rules
//! - `.callhierignore` files for custom patterns
//! - Hidden file handling

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Extension of the files the walker yields
pub const JAVA_EXTENSION: &str = "java";

/// Walks directories to find Java compilation units
#[derive(Debug, Default)]
pub struct FileWalker;

impl FileWalker {
    pub fn new() -> Self {
        Self
    }

    /// Walk a directory and return the Java files below it, sorted by path
    pub fn walk(&self, root: &Path) -> Vec<PathBuf> {
        let mut builder = WalkBuilder::new(root);

        builder
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .max_depth(None)
            .require_git(false);

        builder.add_custom_ignore_filename(".callhierignore");

        let mut files: Vec<PathBuf> = builder
            .build()
            .filter_map(Result::ok) // Skip files we can't access
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .filter_map(|entry| {
                let path = entry.path();

                // Skip hidden files (files starting with .)
                if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                    if name.starts_with('.') {
                        return None;
                    }
                }

                match path.extension().and_then(|ext| ext.to_str()) {
                    Some(JAVA_EXTENSION) => Some(path.to_path_buf()),
                    _ => None,
                }
            })
            .collect();

        files.sort();
        files
    }

    /// Count files that would be loaded
    pub fn count_files(&self, root: &Path) -> usize {
        self.walk(root).len()
    }
}
