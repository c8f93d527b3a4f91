//! Import statement representation
//!
//! This module defines the Import struct the Java parser uses to represent
//! import declarations extracted from compilation units.

/// Represents an import declaration in a compilation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// The imported path without the trailing `.*`
    /// (e.g., "org.apache.commons.lang3.text.WordUtils")
    pub path: String,
    /// Whether this is an on-demand import (e.g., "import java.util.*")
    pub is_glob: bool,
    /// Whether this is a static import (e.g., "import static p.T.max")
    pub is_static: bool,
}

impl Import {
    /// Last segment of the path: the simple name of a single-type import
    pub fn simple_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Everything before the last segment
    pub fn qualifier(&self) -> &str {
        match self.path.rfind('.') {
            Some(dot) => &self.path[..dot],
            None => "",
        }
    }
}
