//! Media file storage
//!
//! Attachments are addressed by their storage-relative name (for example
//! `alice/attachments/photo.jpg`). [`FileSystemStorage`] keeps them below a
//! media root directory and serves them under a URL prefix.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Storage backend for media files
pub trait Storage: Send + Sync {
    /// Whether a file with this storage name exists
    fn exists(&self, name: &str) -> bool;

    /// Read the whole file
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Write the whole file, creating parent directories as needed
    fn save(&self, name: &str, content: &[u8]) -> io::Result<()>;

    /// Public URL of the file
    fn url(&self, name: &str) -> String;
}

/// Local filesystem storage rooted at a media directory
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    root: PathBuf,
    base_url: String,
}

impl FileSystemStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a storage name; names escaping the root are rejected
    fn path(&self, name: &str) -> io::Result<PathBuf> {
        let relative = Path::new(name);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe || name.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage name: {}", name),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl Storage for FileSystemStorage {
    fn exists(&self, name: &str) -> bool {
        self.path(name).map(|p| p.is_file()).unwrap_or(false)
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.path(name)?)
    }

    fn save(&self, name: &str, content: &[u8]) -> io::Result<()> {
        let path = self.path(name)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }

    fn url(&self, name: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            name.trim_start_matches('/')
        )
    }
}

/// Insert `suffix` between the file stem and its extension
///
/// `a/photo.jpg` with `-medium` becomes `a/photo-medium.jpg`; names without an
/// extension get the suffix appended.
pub fn suffixed_path(name: &str, suffix: &str) -> String {
    let basename_start = name.rfind('/').map(|i| i + 1).unwrap_or(0);
    match name[basename_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let split = basename_start + dot;
            format!("{}{}{}", &name[..split], suffix, &name[split..])
        }
        _ => format!("{}{}", name, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixed_path() {
        assert_eq!(suffixed_path("a/photo.jpg", "-medium"), "a/photo-medium.jpg");
        assert_eq!(suffixed_path("a/archive.tar.gz", "-m"), "a/archive.tar-m.gz");
        assert_eq!(suffixed_path("a.b/photo", "-m"), "a.b/photo-m");
        assert_eq!(suffixed_path(".hidden", "-m"), ".hidden-m");
    }

    #[test]
    fn test_save_read_exists() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSystemStorage::new(dir.path(), "/media/");

        assert!(!storage.exists("bob/attachments/a.jpg"));
        storage.save("bob/attachments/a.jpg", b"jpeg").unwrap();

        assert!(storage.exists("bob/attachments/a.jpg"));
        assert_eq!(storage.read("bob/attachments/a.jpg").unwrap(), b"jpeg");
    }

    #[test]
    fn test_rejects_escaping_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSystemStorage::new(dir.path(), "/media/");

        assert!(!storage.exists("../etc/passwd"));
        assert!(storage.read("/etc/passwd").is_err());
        assert!(storage.save("a/../../x", b"x").is_err());
    }

    #[test]
    fn test_url_joins_base() {
        let storage = FileSystemStorage::new("/srv/media", "https://cdn.example.org/media/");
        assert_eq!(
            storage.url("bob/attachments/a.jpg"),
            "https://cdn.example.org/media/bob/attachments/a.jpg"
        );
    }
}
