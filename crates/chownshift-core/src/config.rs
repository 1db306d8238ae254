//! Shift configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for one ownership shift run.
///
/// Built once from user input and never mutated afterwards; every pass of
/// the transaction reads it by reference.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ShiftConfig {
    /// Signed amount added to both the UID and the GID of every entry.
    pub offset: i64,

    /// File or directory to shift.
    pub target: PathBuf,

    /// Descend into directories.
    #[builder(default = "false")]
    #[serde(default)]
    pub recursive: bool,

    /// Restore the mode bits that chown clears (setuid, setgid).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub preserve_permissions: bool,

    /// Restore the `security.capability` extended attribute after chown.
    #[builder(default = "false")]
    #[serde(default)]
    pub preserve_capabilities: bool,

    /// Only run the simulate pass.
    #[builder(default = "false")]
    #[serde(default)]
    pub dry_run: bool,

    /// Report every simulated or applied change.
    #[builder(default = "false")]
    #[serde(default)]
    pub verbose: bool,
}

fn default_true() -> bool {
    true
}

impl ShiftConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.offset.is_none() {
            return Err("Offset is required".to_string());
        }
        if let Some(ref target) = self.target {
            if target.as_os_str().is_empty() {
                return Err("Target path cannot be empty".to_string());
            }
        } else {
            return Err("Target path is required".to_string());
        }
        Ok(())
    }
}

impl ShiftConfig {
    /// Create a new shift config builder.
    pub fn builder() -> ShiftConfigBuilder {
        ShiftConfigBuilder::default()
    }

    /// Create a config that shifts a single entry, preserving permissions.
    pub fn new(offset: i64, target: impl Into<PathBuf>) -> Self {
        Self {
            offset,
            target: target.into(),
            recursive: false,
            preserve_permissions: true,
            preserve_capabilities: false,
            dry_run: false,
            verbose: false,
        }
    }

    /// Whether change lines should be reported. A dry run always is.
    pub fn is_verbose(&self) -> bool {
        self.verbose || self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ShiftConfig::builder()
            .offset(-1000i64)
            .target("/srv/rootfs")
            .recursive(true)
            .build()
            .unwrap();

        assert_eq!(config.offset, -1000);
        assert_eq!(config.target, PathBuf::from("/srv/rootfs"));
        assert!(config.recursive);
        assert!(config.preserve_permissions);
        assert!(!config.preserve_capabilities);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_config_builder_requires_target() {
        let err = ShiftConfig::builder().offset(5i64).build().unwrap_err();
        assert!(err.to_string().contains("Target path is required"));

        let err = ShiftConfig::builder()
            .offset(5i64)
            .target("")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_config_builder_requires_offset() {
        let err = ShiftConfig::builder().target("/tmp").build().unwrap_err();
        assert!(err.to_string().contains("Offset is required"));
    }

    #[test]
    fn test_dry_run_implies_verbose() {
        let mut config = ShiftConfig::new(10, "/tmp/file");
        assert!(!config.is_verbose());

        config.dry_run = true;
        assert!(config.is_verbose());
    }
}
