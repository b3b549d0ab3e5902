//! Size-based file rotation for the logger

use std::fs;
use std::path::{Path, PathBuf};

use jiff::Zoned;

use crate::logger::config::RotationConfig;
use crate::logger::error::LoggerError;

/// Timestamp embedded in rotated file names; sorts chronologically as text
const ROTATED_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

/// Renames the active log file away once it grows past `max_size` and
/// prunes rotated files beyond `max_files`
#[derive(Debug, Clone)]
pub struct RotationManager {
    config: RotationConfig,
}

impl RotationManager {
    pub fn new(config: RotationConfig) -> Self {
        Self { config }
    }

    pub fn should_rotate(&self, current_file_size: u64) -> bool {
        current_file_size >= self.config.max_size
    }

    /// Move `current_path` aside and prune old rotations
    ///
    /// The caller reopens `current_path` afterwards.
    pub fn rotate(&self, current_path: &Path) -> Result<PathBuf, LoggerError> {
        let rotated_path = rotated_path_for(current_path, &Zoned::now());

        if current_path.exists() {
            fs::rename(current_path, &rotated_path).map_err(|e| {
                LoggerError::rotation(format!(
                    "Failed to rename {} to {}: {}",
                    current_path.display(),
                    rotated_path.display(),
                    e
                ))
            })?;
        }

        self.prune(current_path)?;

        Ok(rotated_path)
    }

    /// Delete the oldest rotated files so at most `max_files` remain
    pub fn prune(&self, base_path: &Path) -> Result<(), LoggerError> {
        let mut rotated = rotated_files(base_path)?;
        if rotated.len() <= self.config.max_files {
            return Ok(());
        }

        rotated.sort();
        let excess = rotated.len() - self.config.max_files;
        for path in rotated.into_iter().take(excess) {
            fs::remove_file(&path)?;
        }

        Ok(())
    }
}

/// `logs/app.log` rotated at 2026-10-15 08:30:00 becomes
/// `logs/app.20261015_083000.log`; a numeric suffix is added on collision.
fn rotated_path_for(base_path: &Path, now: &Zoned) -> PathBuf {
    let stem = base_path.file_stem().unwrap_or_default().to_string_lossy();
    let ext = base_path.extension().map(|e| e.to_string_lossy());
    let timestamp = now.strftime(ROTATED_TIMESTAMP).to_string();

    let name_for = |suffix: Option<u32>| {
        let stamp = match suffix {
            Some(n) => format!("{}_{:03}", timestamp, n),
            None => timestamp.clone(),
        };
        match &ext {
            Some(ext) => format!("{}.{}.{}", stem, stamp, ext),
            None => format!("{}.{}", stem, stamp),
        }
    };

    let mut candidate = base_path.with_file_name(name_for(None));
    let mut suffix = 1;
    while candidate.exists() {
        candidate = base_path.with_file_name(name_for(Some(suffix)));
        suffix += 1;
    }
    candidate
}

/// Files in the log directory that look like rotations of `base_path`
fn rotated_files(base_path: &Path) -> Result<Vec<PathBuf>, LoggerError> {
    let parent = match base_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let base_name = base_path.file_name().unwrap_or_default().to_string_lossy();
    let prefix = format!(
        "{}.",
        base_path.file_stem().unwrap_or_default().to_string_lossy()
    );
    let suffix = base_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let files = fs::read_dir(parent)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            name != base_name
                && name.starts_with(&prefix)
                && name.ends_with(&suffix)
                && name[prefix.len()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_digit())
        })
        .collect();

    Ok(files)
}
