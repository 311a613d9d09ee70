//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::path::Path;

use crate::preprocess::{self, PreprocessOptions};

use super::{CliError, CliResult, ExitCode};

/// Batch-preprocess a directory of JPEG images.
///
/// Resolves both directories to absolute paths (mirroring how the tensors
/// are later referenced from input lists), builds the preprocessing options,
/// and runs the conversion.
pub fn preprocess(
    img_folder: &Path,
    dest: &Path,
    size: u32,
    bgr: bool,
    save_uint8: bool,
) -> CliResult<ExitCode> {
    if size == 0 {
        return Err(CliError::failure("size must be at least 1 pixel"));
    }

    let src = img_folder
        .canonicalize()
        .map_err(|e| CliError::failure(format!("cannot resolve '{}': {}", img_folder.display(), e)))?;

    let opts = PreprocessOptions {
        size,
        bgr,
        save_uint8,
        ..PreprocessOptions::default()
    };

    let written = preprocess::convert_images(&src, dest, &opts)
        .map_err(|e| CliError::failure(format!("preprocessing failed: {}", e)))?;

    println!("Wrote {} raw tensor(s) to {}", written, dest.display());
    Ok(ExitCode::SUCCESS)
}
