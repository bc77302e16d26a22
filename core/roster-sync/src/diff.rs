//! Field-level diff between an original record and edited form values.
//!
//! Every field is compared explicitly. Adding a field to [`EmployeeForm`]
//! means adding it here too; nothing is picked up by reflection.

use roster_types::{EmployeeForm, ListItemPatch, SexId};
use serde::Serialize;
use std::fmt;

/// An editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Age,
    Sex,
}

impl Field {
    /// Local field identifier, as used for validation messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Age => "age",
            Field::Sex => "sex",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields whose edited value differs from the original.
///
/// Serializes as the `PATCH /employees/{id}` body: absent fields are
/// omitted and the relation is sent as `sexId`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDiff {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex_id: Option<SexId>,
}

impl FieldDiff {
    /// An empty diff means there is nothing to submit.
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    pub fn len(&self) -> usize {
        self.changed_fields().len()
    }

    /// Changed fields in form order.
    pub fn changed_fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        if self.first_name.is_some() {
            fields.push(Field::FirstName);
        }
        if self.last_name.is_some() {
            fields.push(Field::LastName);
        }
        if self.age.is_some() {
            fields.push(Field::Age);
        }
        if self.sex_id.is_some() {
            fields.push(Field::Sex);
        }
        fields
    }

    /// The row patch this diff implies. The relation label comes from
    /// `sex_label`; returns `None` if the relation changed and no label is known.
    pub fn to_list_patch(&self, sex_label: impl Fn(&SexId) -> Option<String>) -> Option<ListItemPatch> {
        let sex = match &self.sex_id {
            Some(id) => Some(sex_label(id)?),
            None => None,
        };
        Some(ListItemPatch {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age: self.age,
            sex,
        })
    }
}

/// Computes the minimal diff from `original` to `edited`.
///
/// Strings and numbers compare by value; the relation compares by id. An
/// unset relation in `edited` counts as not present and is never reported.
pub fn diff(original: &EmployeeForm, edited: &EmployeeForm) -> FieldDiff {
    FieldDiff {
        first_name: changed(&original.first_name, &edited.first_name),
        last_name: changed(&original.last_name, &edited.last_name),
        age: (original.age != edited.age).then_some(edited.age),
        sex_id: match &edited.sex {
            Some(id) if original.sex.as_ref() != Some(id) => Some(id.clone()),
            _ => None,
        },
    }
}

fn changed(original: &str, edited: &str) -> Option<String> {
    (original != edited).then(|| edited.to_string())
}
