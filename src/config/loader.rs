// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{RawRunFile, RunFile};
use crate::errors::Result;

/// Read and deserialize a run file without validating it.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawRunFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let raw: RawRunFile = toml::from_str(&contents)?;
    Ok(raw)
}

/// Read, deserialize and validate a run file.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<RunFile> {
    let raw = load_from_path(path)?;
    RunFile::try_from(raw)
}
