//! Static file serving through a pluggable file system.

use std::io;
use std::path::PathBuf;

/// Capability interface for the file-backing of a static mount.
///
/// [`Router::serve_static`](crate::Router::serve_static) and
/// [`Response::static_file`](crate::Response::static_file) go through this
/// trait, so tests can substitute an in-memory implementation.
pub trait FileSystem: Send + Sync {
    /// Returns the contents of the file at `path`, relative to whatever
    /// root the implementation serves.
    fn open(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// A [`FileSystem`] rooted at a directory on disk.
pub struct Dir {
    root: PathBuf,
}

impl Dir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileSystem for Dir {
    fn open(&self, path: &str) -> io::Result<Vec<u8>> {
        let relative = path.trim_start_matches('/');
        // Requests are attacker-controlled; keep lookups inside the root.
        if relative.split('/').any(|segment| segment == "..") {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "path escapes the served directory",
            ));
        }
        std::fs::read(self.root.join(relative))
    }
}

/// Guesses a content type from the file extension. Unknown extensions are
/// served as opaque bytes.
pub(crate) fn content_type_for(path: &str) -> &'static str {
    let extension = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
    match extension {
        "css" => "text/css",
        "gif" => "image/gif",
        "htm" | "html" => "text/html",
        "ico" => "image/x-icon",
        "jpeg" | "jpg" => "image/jpeg",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "wasm" => "application/wasm",
        "woff2" => "font/woff2",
        "xml" => "text/xml",
        _ => "application/octet-stream",
    }
}
