//! Utility modules shared by the pipeline and its I/O collaborators

pub mod arrow;
pub mod logging;

use std::path::Path;

use crate::error::Result;

/// Validates that a directory exists and is a directory
///
/// # Arguments
/// * `dir` - The directory path to check
///
/// # Returns
/// `Ok(())` if the directory exists, otherwise an error
///
/// # Errors
/// Returns an error if the directory does not exist or is not a directory
pub fn validate_directory(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory does not exist: {}", dir.display()),
        )
        .into());
    }
    Ok(())
}
