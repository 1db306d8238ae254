//! Per-entry metadata captured during a walk.

use std::fmt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use serde::{Deserialize, Serialize};

use crate::error::ShiftError;

/// Inode information for hardlink detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InodeInfo {
    /// Inode number.
    pub inode: u64,
    /// Device ID.
    pub device: u64,
}

impl InodeInfo {
    /// Create new inode info.
    pub fn new(inode: u64, device: u64) -> Self {
        Self { inode, device }
    }
}

/// Numeric owner and group of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ownership {
    /// User ID.
    pub uid: u32,
    /// Group ID.
    pub gid: u32,
}

impl Ownership {
    /// Create a new ownership pair.
    pub fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.uid, self.gid)
    }
}

/// Type of file system entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Other file types (sockets, devices, fifos).
    Other,
}

impl EntryKind {
    fn from_metadata(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// Transient metadata for one entry visited during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path as reached by the walk.
    pub path: PathBuf,
    /// Inode identity.
    pub inode: InodeInfo,
    /// Number of hard links to the inode.
    pub link_count: u64,
    /// Owner before any change.
    pub owner: Ownership,
    /// Raw `st_mode`, including the file type bits.
    pub mode: u32,
    /// Type of the entry.
    pub kind: EntryKind,
}

impl FileRecord {
    /// Build a record from metadata obtained without following symlinks.
    #[cfg(unix)]
    pub fn from_metadata(path: impl Into<PathBuf>, metadata: &Metadata) -> Self {
        Self {
            path: path.into(),
            inode: InodeInfo::new(metadata.ino(), metadata.dev()),
            link_count: metadata.nlink(),
            owner: Ownership::new(metadata.uid(), metadata.gid()),
            mode: metadata.mode(),
            kind: EntryKind::from_metadata(metadata),
        }
    }

    /// Stat `path` without dereferencing it.
    #[cfg(unix)]
    pub fn lstat(path: &Path) -> Result<Self, ShiftError> {
        let metadata = std::fs::symlink_metadata(path).map_err(|e| ShiftError::stat(path, e))?;
        Ok(Self::from_metadata(path, &metadata))
    }

    /// Permission bits only (`0o7777`), which is what chmod accepts.
    pub fn permission_bits(&self) -> u32 {
        self.mode & 0o7777
    }

    /// Check if this is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_ownership_display() {
        assert_eq!(Ownership::new(1000, 100).to_string(), "1000,100");
    }

    #[test]
    fn test_lstat_regular_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("file.txt");
        fs::write(&path, "hello").unwrap();

        let record = FileRecord::lstat(&path).unwrap();
        let metadata = fs::symlink_metadata(&path).unwrap();

        assert_eq!(record.kind, EntryKind::File);
        assert_eq!(record.link_count, 1);
        assert_eq!(record.owner, Ownership::new(metadata.uid(), metadata.gid()));
        assert_eq!(record.inode.inode, metadata.ino());
    }

    #[test]
    fn test_lstat_does_not_follow_symlink() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("dir");
        let link = temp.path().join("link");
        fs::create_dir(&target).unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let record = FileRecord::lstat(&link).unwrap();
        assert!(record.is_symlink());
        assert!(!record.is_dir());
    }

    #[test]
    fn test_lstat_missing_path() {
        let temp = TempDir::new().unwrap();
        let err = FileRecord::lstat(&temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, ShiftError::Stat { .. }));
    }

    #[test]
    fn test_permission_bits_strip_file_type() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("file.txt");
        fs::write(&path, "x").unwrap();

        let record = FileRecord::lstat(&path).unwrap();
        assert_eq!(record.permission_bits() & !0o7777, 0);
        assert_ne!(record.mode & 0o170000, 0);
    }
}
