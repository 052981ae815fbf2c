//! Variable resolution for interpolation.
//!
//! Layers, lowest precedence first:
//!
//! 1. generated values (`timestamp_iso`, `uuid`)
//! 2. `.env`
//! 3. `env/<name>.env`
//! 4. `.wirepad/env/<name>.env`
//! 5. `key=value` pairs given on the command line
//!
//! Missing files are skipped. A present file that cannot be parsed fails
//! the whole resolution.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use thiserror::Error;

use crate::interpolate::Vars;

pub const DEFAULT_PRIVATE_ENV_DIR: &str = ".wirepad/env";
pub const DEFAULT_SHARED_ENV_DIR: &str = "env";
pub const DEFAULT_DOTENV_PATH: &str = ".env";

/// Errors from reading env files or command-line pairs.
#[derive(Debug, Error)]
pub enum VarsError {
    /// The env file exists but could not be read.
    #[error("read env file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A content line has no `=`.
    #[error("parse env file {path:?} line {line}: expected KEY=VALUE")]
    MissingEquals { path: PathBuf, line: usize },

    /// A content line has nothing before `=`.
    #[error("parse env file {path:?} line {line}: empty key")]
    EmptyKey { path: PathBuf, line: usize },

    /// A command-line assignment is not `key=value`.
    #[error("invalid variable {0:?}: expected key=value")]
    InvalidAssignment(String),
}

pub type Result<T> = std::result::Result<T, VarsError>;

/// Where to look for variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Environment name selecting `<name>.env` files; `None` skips them.
    pub env_name: Option<String>,
    /// Command-line pairs, applied last in order.
    pub cli: Vec<(String, String)>,
    pub private_env_dir: PathBuf,
    pub shared_env_dir: PathBuf,
    pub dotenv_path: PathBuf,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            env_name: None,
            cli: Vec::new(),
            private_env_dir: PathBuf::from(DEFAULT_PRIVATE_ENV_DIR),
            shared_env_dir: PathBuf::from(DEFAULT_SHARED_ENV_DIR),
            dotenv_path: PathBuf::from(DEFAULT_DOTENV_PATH),
        }
    }
}

impl ResolveOptions {
    /// Resolve relative to `root` instead of the working directory.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            private_env_dir: root.join(DEFAULT_PRIVATE_ENV_DIR),
            shared_env_dir: root.join(DEFAULT_SHARED_ENV_DIR),
            dotenv_path: root.join(DEFAULT_DOTENV_PATH),
            ..Self::default()
        }
    }
}

/// Merge every variable layer into one map.
pub fn resolve_variables(opts: &ResolveOptions) -> Result<Vars> {
    let mut resolved = generated_vars();

    merge_file(&mut resolved, &opts.dotenv_path)?;

    if let Some(name) = opts.env_name.as_deref().filter(|n| !n.is_empty()) {
        let file = format!("{}.env", name);
        merge_file(&mut resolved, &opts.shared_env_dir.join(&file))?;
        merge_file(&mut resolved, &opts.private_env_dir.join(&file))?;
    }

    for (key, value) in &opts.cli {
        resolved.insert(key.clone(), value.clone());
    }

    tracing::debug!(
        env = opts.env_name.as_deref().unwrap_or(""),
        count = resolved.len(),
        cli = opts.cli.len(),
        "resolved variables"
    );
    Ok(resolved)
}

/// Values every run gets without configuration.
pub fn generated_vars() -> Vars {
    let mut vars = Vars::new();
    vars.insert(
        "timestamp_iso".to_string(),
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    );
    vars.insert("uuid".to_string(), uuid::Uuid::new_v4().to_string());
    vars
}

fn merge_file(dst: &mut Vars, path: &Path) -> Result<()> {
    if let Some(values) = parse_env_file(path)? {
        tracing::trace!(path = %path.display(), count = values.len(), "merged env file");
        dst.extend(values);
    }
    Ok(())
}

/// Read a `KEY=VALUE` file. Returns `None` when the file does not exist.
pub fn parse_env_file(path: &Path) -> Result<Option<Vec<(String, String)>>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(VarsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_env_text(path, &text).map(Some)
}

fn parse_env_text(path: &Path, text: &str) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let (key, value) = line.split_once('=').ok_or_else(|| VarsError::MissingEquals {
            path: path.to_path_buf(),
            line: i + 1,
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(VarsError::EmptyKey {
                path: path.to_path_buf(),
                line: i + 1,
            });
        }

        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        out.push((key.to_string(), value.to_string()));
    }

    Ok(out)
}

/// Split a command-line `key=value` assignment.
pub fn parse_assignment(arg: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(VarsError::InvalidAssignment(arg.to_string())),
    }
}
