//! Field-level validation errors.
//!
//! Server responses name fields by their server-side path (`FirstName`,
//! `Age.Value`). Paths are normalized to local field identifiers before any
//! message is surfaced. Form values are also checked locally before a
//! create or update is submitted.

use roster_types::EmployeeForm;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Longest accepted first or last name, in characters.
pub const MAX_NAME_LEN: usize = 255;
/// Youngest accepted age.
pub const MIN_AGE: u32 = 18;
/// Oldest accepted age.
pub const MAX_AGE: u32 = 100;

/// Maps a server field path to the local field identifier: a trailing
/// `.Value` is stripped and the first character lower-cased.
pub fn normalize_field_path(path: &str) -> String {
    let path = path.strip_suffix(".Value").unwrap_or(path);
    let mut chars = path.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Messages keyed by local field identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a server `errors` map, normalizing every path.
    /// Messages of paths that normalize to the same field are merged.
    pub fn from_server(errors: HashMap<String, Vec<String>>) -> Self {
        let mut out = Self::new();
        // Sort so merged message order doesn't depend on hash order.
        let mut entries: Vec<_> = errors.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (path, messages) in entries {
            let field = normalize_field_path(&path);
            out.fields.entry(field).or_default().extend(messages);
        }
        out
    }

    /// Adds a message for a field.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }

    /// All messages for a field.
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// The message shown inline next to a field.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    /// Fields with at least one message, in identifier order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Checks form values against the field rules.
pub fn validate_form(form: &EmployeeForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_name(&mut errors, "firstName", "First Name", &form.first_name);
    check_name(&mut errors, "lastName", "Last Name", &form.last_name);

    if form.age < MIN_AGE {
        errors.insert("age", format!("Age must be at least {MIN_AGE}"));
    } else if form.age > MAX_AGE {
        errors.insert("age", format!("Age must be at most {MAX_AGE}"));
    }

    if form.sex.is_none() {
        errors.insert("sex", "Sex is required");
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_name(errors: &mut ValidationErrors, field: &str, label: &str, value: &str) {
    let len = value.chars().count();
    if len == 0 {
        errors.insert(field, format!("{label} is required"));
    } else if len > MAX_NAME_LEN {
        errors.insert(field, format!("{label} must be at most {MAX_NAME_LEN} characters"));
    }
}
