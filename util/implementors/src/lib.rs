//! Implementor tables of the documentation site.
//!
//! For each trait, the documentation site loads `implementors/<trait>.js`,
//! a script listing, per crate, the HTML of every implementation of the
//! trait found in that crate. The script hands the table to
//! `window.register_implementors` when the viewer has loaded, and parks it
//! in `window.pending_implementors` otherwise.

use nimbus_primitives::TypeInfo;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

const PREFIX: &str = "(function() {var implementors = ";
const SUFFIX: &str = ";if (window.register_implementors) {window.register_implementors(implementors);} else {window.pending_implementors = implementors;}})()";

#[derive(Error, Debug)]
pub enum ImplementorsError {
    #[error("not an implementors script")]
    NotAScript,
    #[error("invalid table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("crate {krate}: {reason}")]
    Malformed { krate: String, reason: &'static str },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// One implementation: its HTML description and an optional second slot
/// that the viewer ignores.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImplementorEntry {
    pub html: String,
    pub extra: Option<String>,
}

impl ImplementorEntry {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            extra: None,
        }
    }

    fn to_value(&self) -> Value {
        let mut slots = vec![Value::String(self.html.clone())];
        if let Some(extra) = &self.extra {
            slots.push(Value::String(extra.clone()));
        }
        Value::Array(slots)
    }

    fn from_value(krate: &str, value: &Value) -> Result<Self, ImplementorsError> {
        let malformed = |reason| ImplementorsError::Malformed {
            krate: krate.to_string(),
            reason,
        };

        let slots = value.as_array().ok_or_else(|| malformed("entry is not a list"))?;
        let html = match slots.first() {
            Some(Value::String(html)) => html.clone(),
            _ => return Err(malformed("entry does not start with a string")),
        };
        let extra = match slots.get(1) {
            None => None,
            Some(Value::String(extra)) => Some(extra.clone()),
            Some(_) => return Err(malformed("second slot is not a string")),
        };
        if slots.len() > 2 {
            return Err(malformed("entry has more than two slots"));
        }

        Ok(Self { html, extra })
    }
}

/// Implementations of one trait, grouped by crate. Crates are kept in name
/// order; entries keep insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImplementorsTable {
    crates: BTreeMap<String, Vec<ImplementorEntry>>,
}

impl ImplementorsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, krate: impl Into<String>, entry: ImplementorEntry) {
        self.crates.entry(krate.into()).or_default().push(entry);
    }

    /// Add the `TypeInfo` implementation of `T` under its crate.
    pub fn push_type_info<T: TypeInfo>(&mut self) {
        let krate = T::type_info().crate_name();
        self.push(krate, describe_type_info::<T>());
    }

    pub fn entries(&self, krate: &str) -> &[ImplementorEntry] {
        self.crates.get(krate).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn crates(&self) -> impl Iterator<Item = &str> {
        self.crates.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.crates.is_empty()
    }

    /// The script registering this table.
    pub fn render(&self) -> String {
        let lines: Vec<String> = self
            .crates
            .iter()
            .map(|(krate, entries)| {
                let entries = Value::Array(entries.iter().map(ImplementorEntry::to_value).collect());
                format!("{}:{}", Value::String(krate.clone()), entries)
            })
            .collect();

        format!("{}{{\n{}\n}}{}", PREFIX, lines.join(",\n"), SUFFIX)
    }

    pub fn parse(script: &str) -> Result<Self, ImplementorsError> {
        let body = script
            .trim()
            .strip_prefix(PREFIX)
            .and_then(|rest| rest.strip_suffix(SUFFIX))
            .ok_or(ImplementorsError::NotAScript)?;

        let value: Value = serde_json::from_str(body)?;
        let object = value.as_object().ok_or(ImplementorsError::NotAScript)?;

        let mut table = Self::new();
        for (krate, entries) in object {
            let entries = entries.as_array().ok_or_else(|| ImplementorsError::Malformed {
                krate: krate.clone(),
                reason: "implementations are not a list",
            })?;

            for entry in entries {
                table.push(krate.clone(), ImplementorEntry::from_value(krate, entry)?);
            }
        }

        Ok(table)
    }

    /// Write the script to `<dir>/implementors/<trait path>.js`, creating
    /// directories as needed. `trait_path` looks like
    /// `scale_info/trait.TypeInfo`.
    pub fn write_to(&self, dir: &Path, trait_path: &str) -> Result<PathBuf, ImplementorsError> {
        let path = dir.join("implementors").join(format!("{}.js", trait_path));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, self.render())?;
        debug!(target: "implementors", path = %path.display(), crates = self.crates.len(), "Wrote table.");

        Ok(path)
    }

    pub fn read_from(dir: &Path, trait_path: &str) -> Result<Self, ImplementorsError> {
        let path = dir.join("implementors").join(format!("{}.js", trait_path));
        Self::parse(&fs::read_to_string(path)?)
    }
}

/// `impl TypeInfo for <link to T>`, as rustdoc would list it.
pub fn describe_type_info<T: TypeInfo>() -> ImplementorEntry {
    let info = T::type_info();
    let kind = if info.is_enum() { "enum" } else { "struct" };
    let (impl_generics, type_generics) = if info.generic {
        ("&lt;T&gt;", "&lt;T&gt;")
    } else {
        ("", "")
    };

    ImplementorEntry::new(format!(
        "impl{} TypeInfo for <a class=\"{kind}\" href=\"{dir}/{kind}.{name}.html\" title=\"{kind} {path}::{name}\">{name}</a>{}",
        impl_generics,
        type_generics,
        kind = kind,
        dir = info.path.replace("::", "/"),
        name = info.name,
        path = info.path,
    ))
}
