// src/config/validate.rs

use crate::config::model::{RawRunFile, RunFile};
use crate::errors::{FanrunError, Result};

impl TryFrom<RawRunFile> for RunFile {
    type Error = FanrunError;

    fn try_from(raw: RawRunFile) -> std::result::Result<Self, Self::Error> {
        validate_executable(&raw)?;
        let arguments = resolve_arguments(&raw)?;
        Ok(RunFile::new_unchecked(
            raw.executable,
            arguments,
            raw.show_window,
            raw.formatter,
        ))
    }
}

fn validate_executable(raw: &RawRunFile) -> Result<()> {
    if raw.executable.trim().is_empty() {
        return Err(FanrunError::ConfigError(
            "`executable` must be set to a non-empty path".to_string(),
        ));
    }
    Ok(())
}

/// Expand `argument` + `count` or take `arguments` as-is.
fn resolve_arguments(raw: &RawRunFile) -> Result<Vec<String>> {
    match (&raw.arguments, &raw.argument) {
        (Some(_), Some(_)) => Err(FanrunError::ConfigError(
            "set either `arguments` or `argument`, not both".to_string(),
        )),
        (Some(list), None) => {
            if raw.count.is_some() {
                return Err(FanrunError::ConfigError(
                    "`count` only applies to `argument`".to_string(),
                ));
            }
            if list.is_empty() {
                return Err(FanrunError::ConfigError(
                    "`arguments` must contain at least one entry".to_string(),
                ));
            }
            Ok(list.clone())
        }
        (None, Some(template)) => {
            let count = raw.count.unwrap_or(1);
            if count == 0 {
                return Err(FanrunError::ConfigError(
                    "`count` must be >= 1 (got 0)".to_string(),
                ));
            }
            Ok(vec![template.clone(); count])
        }
        (None, None) => Err(FanrunError::ConfigError(
            "one of `arguments` or `argument` is required".to_string(),
        )),
    }
}
