use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where a fetcher stores images, relative to the front-end's `public/` directory.
pub const DECK_IMAGES: &str = "arcmage/cards";
pub const REBIRTH_IMAGES: &str = "arcmage/rebirth/cards";

/// Output locations under a project root.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding static assets served by the front-end
    pub fn public_dir(&self) -> PathBuf {
        self.root.join("public")
    }

    /// Deck manifests, one `<deckGuid>.json` per deck
    pub fn decks_dir(&self) -> PathBuf {
        self.root.join("src/data/decks")
    }

    pub fn deck_manifest(&self, deck_guid: &str) -> PathBuf {
        self.decks_dir().join(format!("{}.json", deck_guid))
    }

    pub fn rebirth_manifest(&self) -> PathBuf {
        self.root.join("src/data/rebirth.json")
    }
}

/// True when `path` is a file with at least one byte in it.
pub fn is_present(path: &Path) -> bool {
    fs::metadata(path)
        .map(|metadata| metadata.is_file() && metadata.len() > 0)
        .unwrap_or(false)
}

/// Write `bytes` to `path`, creating missing parent directories.
pub fn write_creating_dirs(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)
}

/// Serialize a manifest as 2-space indented UTF-8 JSON with a trailing newline,
/// replacing whatever is at `path`.
pub fn write_manifest<T: Serialize>(path: &Path, manifest: &T) -> crate::error::Result<()> {
    let mut json_data = serde_json::to_string_pretty(manifest)?;
    json_data.push('\n');
    write_creating_dirs(path, json_data.as_bytes())?;
    Ok(())
}
