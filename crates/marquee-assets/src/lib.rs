//! Static file access and asset compilers for marquee.
//!
//! - [`StaticFiles`] serves files from the site's `www/` directory with a
//!   MIME type inferred from the file extension.
//! - [`ExternalCompiler`] runs the LESS and JST compilers as child processes.

mod compiler;

use std::io;
use std::path::{Component, Path, PathBuf};

pub use compiler::{CompileError, ExternalCompiler};

/// Error returned by [`StaticFiles`].
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// No regular file exists at the requested path.
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// The file exists but could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// A file read from the static root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Exact file contents.
    pub bytes: Vec<u8>,
    /// MIME type inferred from the extension.
    pub content_type: String,
}

/// Read-only view of a static file directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the file at `path` (relative, `/`-separated).
    ///
    /// Paths that escape the root (`..`), name a directory, or do not exist
    /// are all reported as [`AssetError::NotFound`].
    pub fn get(&self, path: &str) -> Result<Asset, AssetError> {
        let bytes = self.read(path)?;
        Ok(Asset {
            bytes,
            content_type: mime_for(path),
        })
    }

    /// Read the file at `path` as raw bytes.
    pub fn read(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let full_path = self
            .resolve(path)
            .ok_or_else(|| AssetError::NotFound(path.to_owned()))?;

        if !full_path.is_file() {
            return Err(AssetError::NotFound(path.to_owned()));
        }

        std::fs::read(&full_path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => AssetError::NotFound(path.to_owned()),
            _ => AssetError::Io {
                path: path.to_owned(),
                source,
            },
        })
    }

    /// Map a request path onto the root, rejecting anything but plain names.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        let mut depth = 0usize;

        for component in relative.components() {
            match component {
                Component::Normal(name) => {
                    resolved.push(name);
                    depth += 1;
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        (depth > 0).then_some(resolved)
    }
}

/// Return the MIME type string for the given file path.
pub fn mime_for(path: &str) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_owned()
}
