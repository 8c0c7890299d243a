use super::PptxError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Destination for media and chart parts referenced by slides.
pub trait AssetSink {
    fn store(&mut self, name: &str, data: &[u8]) -> Result<(), PptxError>;
}

/// Writes every asset as a file inside `root`.
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, PptxError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSink for DirectorySink {
    fn store(&mut self, name: &str, data: &[u8]) -> Result<(), PptxError> {
        std::fs::write(self.root.join(name), data)?;
        Ok(())
    }
}

/// Keeps assets in memory, keyed by their exported name.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub assets: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }
}

impl AssetSink for MemorySink {
    fn store(&mut self, name: &str, data: &[u8]) -> Result<(), PptxError> {
        self.assets.insert(name.to_string(), data.to_vec());
        Ok(())
    }
}
