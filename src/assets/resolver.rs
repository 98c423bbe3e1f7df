use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

/// Resolves a scene image reference to encoded bytes.
///
/// Implementations must be safe to call concurrently; the asset cache fetches all scenes in
/// parallel.
pub trait AssetResolver: Send + Sync {
    /// Fetch the encoded bytes behind `reference`.
    fn fetch(&self, reference: &str) -> anyhow::Result<Vec<u8>>;
}

/// Resolves plain paths and `file://` URIs against a root directory.
#[derive(Clone, Debug)]
pub struct FsResolver {
    root: PathBuf,
}

impl FsResolver {
    /// Resolve relative references against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem path that `reference` points to.
    pub fn path_for(&self, reference: &str) -> anyhow::Result<PathBuf> {
        let raw = match reference.strip_prefix("file://") {
            Some(rest) => rest,
            None if reference.contains("://") => {
                anyhow::bail!("unsupported URI scheme in '{reference}'")
            }
            None => reference,
        };
        anyhow::ensure!(!raw.trim().is_empty(), "empty asset reference");
        let p = Path::new(raw);
        Ok(if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        })
    }
}

impl AssetResolver for FsResolver {
    fn fetch(&self, reference: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.path_for(reference)?;
        std::fs::read(&path).with_context(|| format!("read '{}'", path.display()))
    }
}

/// In-memory resolver keyed by reference, for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct MemoryResolver {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `reference`.
    pub fn insert(&mut self, reference: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.entries.insert(reference.into(), bytes);
        self
    }

    /// Builder-style [`MemoryResolver::insert`].
    pub fn with(mut self, reference: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(reference, bytes);
        self
    }
}

impl AssetResolver for MemoryResolver {
    fn fetch(&self, reference: &str) -> anyhow::Result<Vec<u8>> {
        self.entries
            .get(reference)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no asset registered under '{reference}'"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolver.rs"]
mod tests;
