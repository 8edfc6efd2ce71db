//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides utilities for file system operations,
//! such as creating run directories, copying templates and replacing files whole.
//!
//! 此模块提供文件系统操作的实用功能，
//! 如创建运行目录、复制模板以及整体替换文件。

use anyhow::{Context, Result};
use fs_extra::dir::{copy, CopyOptions};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Creates `path` and all missing parents. An existing directory is not an error.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

/// Copies the source directory itself into `to`, so `from/x` lands at `to/<from name>/x`.
///
/// # Arguments
/// * `from` - Source directory path
/// * `to` - Destination parent directory path
pub fn copy_dir_into(from: &Path, to: &Path) -> Result<()> {
    let options = CopyOptions::new();
    copy(from, to, &options).with_context(|| {
        format!(
            "Failed to copy directory {} into {}",
            from.display(),
            to.display()
        )
    })?;
    Ok(())
}

fn staging_file(path: &Path, content: &str) -> io::Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut staged = NamedTempFile::new_in(parent)?;
    staged.write_all(content.as_bytes())?;
    staged.as_file().sync_all()?;
    Ok(staged)
}

/// Writes `content` to a new file at `path`, failing with
/// [`io::ErrorKind::AlreadyExists`] if something is already there.
///
/// The content is staged next to the target and moved into place, so the
/// file is either absent or complete.
pub fn write_new_file(path: &Path, content: &str) -> io::Result<()> {
    staging_file(path, content)?
        .persist_noclobber(path)
        .map(|_| ())
        .map_err(|e| e.error)
}

/// Replaces the file at `path` with `content` in a single rename.
pub fn replace_file(path: &Path, content: &str) -> io::Result<()> {
    staging_file(path, content)?
        .persist(path)
        .map(|_| ())
        .map_err(|e| e.error)
}

/// Gets the absolute path from a potentially relative path.
///
/// # Arguments
/// * `path` - Path to canonicalize
///
/// # Returns
/// Canonicalized absolute path, or an error if the path doesn't exist
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}
