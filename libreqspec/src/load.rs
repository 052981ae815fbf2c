//! Loading request files from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::spec::Spec;
use crate::validate::{validate, Issue, ValidationError};

/// Every request file name ends with this.
pub const REQUEST_FILE_SUFFIX: &str = ".req.yaml";

/// Loader settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Treat unknown fields as errors instead of warnings.
    pub strict: bool,
}

/// A spec that passed validation, plus any non-blocking findings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
    pub spec: Spec,
    pub warnings: Vec<Issue>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid request file {path:?}: expected .req.yaml extension")]
    Extension { path: PathBuf },

    #[error("read request file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("load request file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: crate::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Read, parse, and validate a request file.
pub fn load_file(path: impl AsRef<Path>, opts: &LoadOptions) -> Result<LoadResult, LoadError> {
    let path = path.as_ref();
    let has_suffix = path
        .to_str()
        .is_some_and(|p| p.ends_with(REQUEST_FILE_SUFFIX));
    if !has_suffix {
        return Err(LoadError::Extension {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = crate::parse_bytes(&bytes);
    finish(path, parsed, opts)
}

/// Parse and validate in-memory text. `path` only labels diagnostics.
pub fn load_str(
    path: impl AsRef<Path>,
    text: &str,
    opts: &LoadOptions,
) -> Result<LoadResult, LoadError> {
    let path = path.as_ref();
    finish(path, crate::parse(text), opts)
}

fn finish(
    path: &Path,
    parsed: crate::Result<(Spec, crate::Map)>,
    opts: &LoadOptions,
) -> Result<LoadResult, LoadError> {
    let (spec, raw) = parsed.map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let (errors, warnings): (Vec<Issue>, Vec<Issue>) = validate(&spec, &raw, opts.strict)
        .into_iter()
        .partition(Issue::is_error);

    tracing::debug!(
        path = %path.display(),
        errors = errors.len(),
        warnings = warnings.len(),
        "loaded request file"
    );

    if !errors.is_empty() {
        return Err(ValidationError {
            path: path.display().to_string(),
            issues: errors,
        }
        .into());
    }

    Ok(LoadResult { spec, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Severity;
    use tempfile::TempDir;

    const PING: &str = "\
version: 1
kind: http
name: ping
request:
  method: GET
  url: https://example.com/ping
";

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ping.req.yaml");
        fs::write(&path, PING).unwrap();

        let loaded = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(loaded.spec.name, "ping");
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_extension_checked_before_reading() {
        let err = load_file("does/not/exist.yaml", &LoadOptions::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid request file \"does/not/exist.yaml\": expected .req.yaml extension"
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.req.yaml");
        let err = load_file(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
        assert!(err.to_string().starts_with("read request file"));
    }

    #[test]
    fn test_parse_failure_names_file() {
        let err = load_str("bad.req.yaml", "a:\n   b: 1\n", &LoadOptions::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "load request file \"bad.req.yaml\": parse request document: \
             line 2: indentation must use multiples of 2 spaces"
        );
    }

    #[test]
    fn test_warnings_returned_when_lenient() {
        let text = format!("{}extra: 1\n", PING);
        let loaded = load_str("x.req.yaml", &text, &LoadOptions { strict: false }).unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.warnings[0].severity, Severity::Warning);
        assert_eq!(loaded.warnings[0].field, "extra");
    }

    #[test]
    fn test_strict_blocks_unknown_fields() {
        let text = format!("{}extra: 1\n", PING);
        let err = load_str("x.req.yaml", &text, &LoadOptions { strict: true }).unwrap_err();
        let err = match err {
            LoadError::Validation(err) => err,
            other => panic!("expected validation error, got {:?}", other),
        };
        assert_eq!(err.path, "x.req.yaml");
        assert_eq!(err.issues.len(), 1);
        assert_eq!(
            err.to_string(),
            "validation error in x.req.yaml\n- extra: unknown field (hint: remove field or run without --strict)"
        );
    }

    #[test]
    fn test_validation_error_carries_only_errors() {
        let text = "version: 1\nkind: http\nname: x\nodd: 1\nrequest:\n  url: u\n";
        let err = load_str("x.req.yaml", text, &LoadOptions::default()).unwrap_err();
        let LoadError::Validation(err) = err else {
            panic!("expected validation error");
        };
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].field, "request.method");
    }
}
