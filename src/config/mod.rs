// src/config/mod.rs

//! Run file loading and validation.
//!
//! - [`model`] mirrors the TOML layout (`RawRunFile`) and holds the
//!   validated `RunFile`.
//! - [`loader`] reads files from disk.
//! - [`validate`] turns a raw file into a `RunFile`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{RawRunFile, RunFile};
