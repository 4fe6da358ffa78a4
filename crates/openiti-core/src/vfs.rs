use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Abstract interface for file system operations.
pub trait FileSystem: Send + Sync {
    /// Read the entire contents of a file into a string.
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

    /// Replace the contents of a file.
    fn write(&self, path: &Path, content: &str) -> std::io::Result<()>;

    fn is_file(&self, path: &Path) -> bool;

    /// List all files under the root whose file name satisfies `accept`.
    /// Directories named in `exclude` are pruned; results are sorted.
    fn list_files(
        &self,
        root: &Path,
        exclude: &[String],
        accept: &dyn Fn(&str) -> bool,
    ) -> Vec<PathBuf>;
}

/// Standard implementation of FileSystem using std::fs and walkdir.
pub struct PhysicalFileSystem;

impl FileSystem for PhysicalFileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_files(
        &self,
        root: &Path,
        exclude: &[String],
        accept: &dyn Fn(&str) -> bool,
    ) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !exclude.iter().any(|x| e.file_name() == x.as_str())
            })
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    if accept(name) {
                        files.push(entry.path().to_path_buf());
                    }
                }
            }
        }

        files
    }
}
