//! Unified path management for Trellis local state.
//!
//! All locally persisted engine state lives under one per-user
//! configuration directory, resolved per platform via the `dirs` crate.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform configuration directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for Trellis.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/trellis/           # Config directory (platform equivalent)
/// └── session.toml             # Persisted session slot
/// ```
pub struct TrellisPaths {
    /// Optional root override, used by tests to stay inside a temp dir.
    root: Option<PathBuf>,
}

impl TrellisPaths {
    /// Creates a path resolver. Pass `None` to use the platform
    /// configuration directory.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Returns the Trellis configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join("trellis"))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path of the fixed persisted-session slot.
    pub fn session_slot_path(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("session.toml"))
    }
}
