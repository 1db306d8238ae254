//! Operating system calls used by the apply pass.

use std::io;
use std::path::Path;

use nix::sys::stat::{FchmodatFlags, Mode, fchmodat};

use chownshift_core::Ownership;

/// Extended attribute that stores Linux file capabilities.
pub const CAPABILITY_XATTR: &str = "security.capability";

/// The metadata-changing calls a shift needs.
///
/// None of these may dereference a symlink where it matters: `lchown`
/// acts on the link itself, and callers never ask for `chmod` or the
/// capability attribute on a symlink.
pub trait OwnershipBackend {
    /// Change owner and group without following symlinks.
    fn lchown(&self, path: &Path, owner: Ownership) -> io::Result<()>;

    /// Set the permission bits (`0o7777`) of `path`.
    fn chmod(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Read an extended attribute. `Ok(None)` when it is absent.
    fn get_xattr(&self, path: &Path, name: &str) -> io::Result<Option<Vec<u8>>>;

    /// Write an extended attribute.
    fn set_xattr(&self, path: &Path, name: &str, value: &[u8]) -> io::Result<()>;
}

impl<B: OwnershipBackend + ?Sized> OwnershipBackend for &B {
    fn lchown(&self, path: &Path, owner: Ownership) -> io::Result<()> {
        (**self).lchown(path, owner)
    }

    fn chmod(&self, path: &Path, mode: u32) -> io::Result<()> {
        (**self).chmod(path, mode)
    }

    fn get_xattr(&self, path: &Path, name: &str) -> io::Result<Option<Vec<u8>>> {
        (**self).get_xattr(path, name)
    }

    fn set_xattr(&self, path: &Path, name: &str, value: &[u8]) -> io::Result<()> {
        (**self).set_xattr(path, name, value)
    }
}

/// Backend that talks to the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBackend;

impl OwnershipBackend for SystemBackend {
    fn lchown(&self, path: &Path, owner: Ownership) -> io::Result<()> {
        std::os::unix::fs::lchown(path, Some(owner.uid), Some(owner.gid))
    }

    fn chmod(&self, path: &Path, mode: u32) -> io::Result<()> {
        // AT_SYMLINK_NOFOLLOW is not supported for fchmodat on Linux.
        let mode = Mode::from_bits_truncate(mode as nix::libc::mode_t);
        fchmodat(None, path, mode, FchmodatFlags::FollowSymlink).map_err(io::Error::from)
    }

    fn get_xattr(&self, path: &Path, name: &str) -> io::Result<Option<Vec<u8>>> {
        xattr::get(path, name)
    }

    fn set_xattr(&self, path: &Path, name: &str, value: &[u8]) -> io::Result<()> {
        xattr::set(path, name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::{MetadataExt, PermissionsExt};
    use tempfile::TempDir;

    #[test]
    fn test_lchown_to_current_owner() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("file");
        fs::write(&path, "x").unwrap();
        let meta = fs::metadata(&path).unwrap();

        SystemBackend
            .lchown(&path, Ownership::new(meta.uid(), meta.gid()))
            .unwrap();
    }

    #[test]
    fn test_chmod_sets_special_bits() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("file");
        fs::write(&path, "x").unwrap();

        SystemBackend.chmod(&path, 0o4750).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o7777, 0o4750);
    }

    #[test]
    fn test_chmod_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = SystemBackend
            .chmod(&temp.path().join("missing"), 0o644)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
