//! Content lookup for spec fragments.
//!
//! The loader never touches the filesystem directly; it asks a
//! [`ContentResolver`] for the raw text behind an identifier.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Maps an include identifier to raw spec text.
pub trait ContentResolver {
    /// Raw text for `identifier`, or `None` when it cannot be found.
    fn resolve(&self, identifier: &str) -> Option<String>;

    /// Key used for include-cycle detection. Identifiers that name the same
    /// content should map to the same key.
    fn canonical_id(&self, identifier: &str) -> String {
        identifier.trim().to_string()
    }
}

impl<F> ContentResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, identifier: &str) -> Option<String> {
        self(identifier)
    }
}

/// In-memory identifier -> text table
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    files: HashMap<String, String>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, identifier: K, content: V) {
        self.files.insert(identifier.into(), content.into());
    }

    pub fn with<K: Into<String>, V: Into<String>>(mut self, identifier: K, content: V) -> Self {
        self.insert(identifier, content);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapResolver {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut resolver = Self::new();
        for (identifier, content) in iter {
            resolver.insert(identifier, content);
        }
        resolver
    }
}

impl ContentResolver for MapResolver {
    fn resolve(&self, identifier: &str) -> Option<String> {
        self.files.get(identifier.trim()).cloned()
    }
}

/// Identifiers are paths relative to a base directory
#[derive(Debug, Clone)]
pub struct FsResolver {
    base_dir: PathBuf,
}

impl FsResolver {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self { base_dir: base_dir.as_ref().to_path_buf() }
    }

    fn full_path(&self, identifier: &str) -> PathBuf {
        self.base_dir.join(identifier.trim())
    }
}

impl ContentResolver for FsResolver {
    fn resolve(&self, identifier: &str) -> Option<String> {
        let path = self.full_path(identifier);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!("Cannot read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Lexically normalized relative path (`./a/../b.vspec` -> `b.vspec`)
    fn canonical_id(&self, identifier: &str) -> String {
        let mut parts: Vec<String> = Vec::new();
        for component in Path::new(identifier.trim()).components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if matches!(parts.last(), Some(last) if last != "..") {
                        parts.pop();
                    } else {
                        parts.push("..".to_string());
                    }
                }
                other => parts.push(other.as_os_str().to_string_lossy().into_owned()),
            }
        }
        parts.join("/")
    }
}
