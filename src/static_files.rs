use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

/// Files served read-only from a base directory under `/assets/`.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }

    /// Map a URL path below the base directory. Anything that is not a
    /// plain relative path (`..`, absolute, prefixes) is rejected.
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        let mut pushed = false;
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => {
                    pb.push(s);
                    pushed = true;
                }
                Component::CurDir => {}
                _ => return None,
            }
        }
        pushed.then_some(pb)
    }

    fn content_type(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "html" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "json" => "application/json",
            "png" => "image/png",
            "svg" => "image/svg+xml",
            "ico" => "image/x-icon",
            "txt" => "text/plain",
            _ => "application/octet-stream",
        }
    }

    /// Read the file for `url_path`, returning its bytes and MIME type.
    pub fn load(&self, url_path: &str) -> io::Result<(Vec<u8>, &'static str)> {
        let path = self
            .map_path(url_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        let bytes = fs::read(&path)?;
        debug!(path = %path.display(), size = bytes.len(), "Static file served");
        Ok((bytes, Self::content_type(&path)))
    }
}
