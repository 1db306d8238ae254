//! JWalk-based tree walker.

use std::io;
use std::path::{Path, PathBuf};

use jwalk::{DirEntryIter, Parallelism, WalkDir};

use chownshift_core::{FileRecord, ShiftConfig, ShiftError};

/// Enumerates the entries a pass has to process.
///
/// In recursive mode the walk is a sorted pre-order traversal rooted at the
/// target: the root first, then every descendant. Symlinks are reported as
/// themselves and never followed. Without recursion the target alone is
/// produced.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    recursive: bool,
}

impl TreeWalker {
    /// Create a new walker.
    pub fn new(root: impl Into<PathBuf>, recursive: bool) -> Self {
        Self {
            root: root.into(),
            recursive,
        }
    }

    /// Create a walker for the target of a shift config.
    pub fn from_config(config: &ShiftConfig) -> Self {
        Self::new(&config.target, config.recursive)
    }

    /// Root path of the walk.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily enumerate the entries.
    ///
    /// The sequence ends after the first error.
    pub fn entries(&self) -> Entries {
        Entries {
            root: self.root.clone(),
            recursive: self.recursive,
            started: false,
            children: None,
            failed: false,
        }
    }
}

/// Lazy sequence of records produced by [`TreeWalker::entries`].
pub struct Entries {
    root: PathBuf,
    recursive: bool,
    started: bool,
    children: Option<DirEntryIter<((), ())>>,
    failed: bool,
}

impl Entries {
    fn start(&mut self) -> Result<FileRecord, ShiftError> {
        let record = FileRecord::lstat(&self.root)?;

        if self.recursive && record.is_dir() {
            tracing::debug!(root = %self.root.display(), "walking directory tree");
            let walker = WalkDir::new(&self.root)
                .parallelism(Parallelism::Serial)
                .skip_hidden(false)
                .follow_links(false)
                .sort(true);
            self.children = Some(walker.into_iter());
        }

        Ok(record)
    }

    fn next_child(&mut self) -> Option<Result<FileRecord, ShiftError>> {
        let mut entry = loop {
            let entry = match self.children.as_mut()?.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    return Some(Err(ShiftError::walk(path, io_cause(&err))));
                }
            };
            // The root was already produced by `start`; only its read error matters.
            if entry.depth() > 0 || entry.read_children_error.is_some() {
                break entry;
            }
        };

        // jwalk reports an unreadable directory on the entry itself.
        if let Some(err) = entry.read_children_error.take() {
            return Some(Err(ShiftError::walk(entry.path(), io_cause(&err))));
        }

        let path = entry.path();
        // follow_links is off, so this is an lstat.
        let record = match entry.metadata() {
            Ok(metadata) => Ok(FileRecord::from_metadata(path, &metadata)),
            Err(err) => Err(ShiftError::stat(path, io_cause(&err))),
        };
        Some(record)
    }
}

fn io_cause(err: &jwalk::Error) -> io::Error {
    let kind = err.io_error().map(io::Error::kind).unwrap_or(io::ErrorKind::Other);
    io::Error::new(kind, err.to_string())
}

impl Iterator for Entries {
    type Item = Result<FileRecord, ShiftError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let item = if !self.started {
            self.started = true;
            Some(self.start())
        } else {
            self.next_child()
        };

        if matches!(item, Some(Err(_))) {
            self.failed = true;
            self.children = None;
        }
        item
    }
}

impl std::fmt::Debug for Entries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entries")
            .field("root", &self.root)
            .field("recursive", &self.recursive)
            .field("started", &self.started)
            .field("failed", &self.failed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        // Create directory structure
        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir2")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();

        // Create files
        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world world world").unwrap();
        fs::write(root.join("dir1/subdir/file3.txt"), "test").unwrap();
        fs::write(root.join("dir2/.hidden"), "another file here").unwrap();

        temp
    }

    fn relative_paths(temp: &TempDir, walker: &TreeWalker) -> Vec<String> {
        walker
            .entries()
            .map(|r| r.unwrap())
            .map(|r| {
                r.path
                    .strip_prefix(temp.path())
                    .unwrap()
                    .to_string_lossy()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_recursive_walk_is_preorder() {
        let temp = create_test_tree();
        let walker = TreeWalker::new(temp.path(), true);

        let paths = relative_paths(&temp, &walker);
        assert_eq!(
            paths,
            vec![
                "",
                "dir1",
                "dir1/file2.txt",
                "dir1/subdir",
                "dir1/subdir/file3.txt",
                "dir2",
                "dir2/.hidden",
                "file1.txt",
            ]
        );
    }

    #[test]
    fn test_non_recursive_yields_only_target() {
        let temp = create_test_tree();
        let walker = TreeWalker::new(temp.path(), false);

        let records: Vec<_> = walker.entries().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, temp.path());
        assert!(records[0].is_dir());
    }

    #[test]
    fn test_recursive_on_file_yields_file() {
        let temp = create_test_tree();
        let file = temp.path().join("file1.txt");
        let walker = TreeWalker::new(&file, true);

        let records: Vec<_> = walker.entries().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, file);
    }

    #[test]
    fn test_symlinks_are_not_followed() {
        let temp = create_test_tree();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(temp.path().join("dir1"), &link).unwrap();

        let walker = TreeWalker::new(temp.path(), true);
        let records: Vec<_> = walker.entries().collect::<Result<_, _>>().unwrap();

        let link_record = records.iter().find(|r| r.path == link).unwrap();
        assert!(link_record.is_symlink());
        assert!(!records.iter().any(|r| r.path.starts_with(&link) && r.path != link));
    }

    #[test]
    fn test_symlink_root_is_not_descended() {
        let temp = create_test_tree();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(temp.path().join("dir1"), &link).unwrap();

        let walker = TreeWalker::new(&link, true);
        let records: Vec<_> = walker.entries().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_symlink());
    }

    #[test]
    fn test_missing_root_fails_once() {
        let temp = TempDir::new().unwrap();
        let walker = TreeWalker::new(temp.path().join("missing"), true);

        let mut entries = walker.entries();
        assert!(matches!(entries.next(), Some(Err(ShiftError::Stat { .. }))));
        assert!(entries.next().is_none());
    }
}
