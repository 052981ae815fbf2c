//! Phase 5: `{{name}}` interpolation
//!
//! [`interpolate_string`] substitutes tokens in one string. The
//! [`Interpolate`] trait walks a typed structure and rewrites every string
//! leaf in place; non-string leaves are never touched.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use thiserror::Error;

use crate::spec::{Body, Request, Spec, WsMessage};
use crate::value::{Map, Value};

/// Variable name to substitution text.
pub type Vars = HashMap<String, String>;

/// One or more tokens in a string named variables that were not supplied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unresolved variable(s): {}", .names.join(", "))]
pub struct UnresolvedVariableError {
    /// Distinct names in order of first appearance.
    pub names: Vec<String>,
}

type Result<T> = std::result::Result<T, UnresolvedVariableError>;

static TOKEN: OnceLock<Regex> = OnceLock::new();

fn token_pattern() -> &'static Regex {
    TOKEN.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").expect("token pattern is valid")
    })
}

/// Replace every `{{name}}` token in `input`.
///
/// Fails without returning partial text if any token is unresolved.
pub fn interpolate_string(input: &str, vars: &Vars) -> Result<String> {
    let mut unresolved: Vec<String> = Vec::new();

    let output = token_pattern().replace_all(input, |caps: &Captures<'_>| {
        let name = &caps[1];
        match vars.get(name) {
            Some(value) => value.clone(),
            None => {
                if !unresolved.iter().any(|n| n == name) {
                    unresolved.push(name.to_string());
                }
                caps[0].to_string()
            }
        }
    });

    if unresolved.is_empty() {
        Ok(output.into_owned())
    } else {
        Err(UnresolvedVariableError { names: unresolved })
    }
}

/// Interpolate every string reachable from `target`.
///
/// The first failing string aborts the walk; strings visited before it
/// keep their replacements.
pub fn interpolate_in_place<T: Interpolate + ?Sized>(target: &mut T, vars: &Vars) -> Result<()> {
    target.interpolate(vars)
}

/// Types whose string leaves can be interpolated in place.
pub trait Interpolate {
    fn interpolate(&mut self, vars: &Vars) -> Result<()>;
}

impl Interpolate for String {
    fn interpolate(&mut self, vars: &Vars) -> Result<()> {
        if self.contains("{{") {
            *self = interpolate_string(self, vars)?;
        }
        Ok(())
    }
}

impl<T: Interpolate> Interpolate for Option<T> {
    fn interpolate(&mut self, vars: &Vars) -> Result<()> {
        match self {
            Some(inner) => inner.interpolate(vars),
            None => Ok(()),
        }
    }
}

impl<T: Interpolate + ?Sized> Interpolate for Box<T> {
    fn interpolate(&mut self, vars: &Vars) -> Result<()> {
        (**self).interpolate(vars)
    }
}

impl<T: Interpolate> Interpolate for Vec<T> {
    fn interpolate(&mut self, vars: &Vars) -> Result<()> {
        self.iter_mut().try_for_each(|item| item.interpolate(vars))
    }
}

impl<T: Interpolate> Interpolate for [T] {
    fn interpolate(&mut self, vars: &Vars) -> Result<()> {
        self.iter_mut().try_for_each(|item| item.interpolate(vars))
    }
}

impl<K, V: Interpolate, S> Interpolate for HashMap<K, V, S> {
    fn interpolate(&mut self, vars: &Vars) -> Result<()> {
        self.values_mut().try_for_each(|v| v.interpolate(vars))
    }
}

impl<K, V: Interpolate> Interpolate for BTreeMap<K, V> {
    fn interpolate(&mut self, vars: &Vars) -> Result<()> {
        self.values_mut().try_for_each(|v| v.interpolate(vars))
    }
}

/// Only values are rewritten; keys stay as written.
impl Interpolate for Map {
    fn interpolate(&mut self, vars: &Vars) -> Result<()> {
        self.values_mut().try_for_each(|v| v.interpolate(vars))
    }
}

impl Interpolate for Value {
    fn interpolate(&mut self, vars: &Vars) -> Result<()> {
        match self {
            Value::String(s) => s.interpolate(vars),
            Value::List(items) => items.interpolate(vars),
            Value::Map(map) => map.interpolate(vars),
            Value::Null | Value::Bool(_) | Value::Int(_) => Ok(()),
        }
    }
}

impl Interpolate for Spec {
    fn interpolate(&mut self, vars: &Vars) -> Result<()> {
        self.kind.interpolate(vars)?;
        self.name.interpolate(vars)?;
        self.description.interpolate(vars)?;
        self.tags.interpolate(vars)?;
        self.request.interpolate(vars)?;
        self.expect.interpolate(vars)?;
        self.hooks.interpolate(vars)
    }
}

impl Interpolate for Request {
    fn interpolate(&mut self, vars: &Vars) -> Result<()> {
        self.method.interpolate(vars)?;
        self.url.interpolate(vars)?;
        self.query.interpolate(vars)?;
        self.headers.interpolate(vars)?;
        self.body.interpolate(vars)?;
        self.messages.interpolate(vars)
    }
}

impl Interpolate for Body {
    fn interpolate(&mut self, vars: &Vars) -> Result<()> {
        self.mode.interpolate(vars)?;
        self.json.interpolate(vars)?;
        self.raw.interpolate(vars)?;
        self.path.interpolate(vars)?;
        self.content_type.interpolate(vars)?;
        self.form.interpolate(vars)?;
        self.multipart.interpolate(vars)
    }
}

impl Interpolate for WsMessage {
    fn interpolate(&mut self, vars: &Vars) -> Result<()> {
        self.message_type.interpolate(vars)?;
        self.json.interpolate(vars)?;
        self.text.interpolate(vars)?;
        self.path.interpolate(vars)
    }
}
