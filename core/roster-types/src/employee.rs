//! Employee records as the remote resource serves them.

use crate::ids::{EmployeeId, SexId};
use serde::{Deserialize, Serialize};

/// One row of a paginated employee listing.
///
/// `sex` is the server-resolved display label, not the relation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub sex: String,
}

impl ListItem {
    /// First and last name joined by a space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A `sex` reference entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sex {
    pub id: SexId,
    pub name: String,
}

/// The full form of an employee, loaded when an edit begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRecord {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub sex: Sex,
}

impl DetailRecord {
    /// Reduces the record to editable form values.
    pub fn to_form(&self) -> EmployeeForm {
        EmployeeForm {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age: self.age,
            sex: Some(self.sex.id.clone()),
        }
    }

    /// The listing row this record renders as.
    pub fn to_list_item(&self) -> ListItem {
        ListItem {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age: self.age,
            sex: self.sex.name.clone(),
        }
    }
}

/// Edited values of an employee form.
///
/// `sex` is `None` until a value has been chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeForm {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub sex: Option<SexId>,
}

impl Default for EmployeeForm {
    fn default() -> Self {
        Self {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            age: 18,
            sex: None,
        }
    }
}

/// Shallow field patch for a [`ListItem`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItemPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<String>,
}

impl ListItemPatch {
    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.age.is_none() && self.sex.is_none()
    }

    /// Writes every present field into `item`.
    pub fn apply(&self, item: &mut ListItem) {
        if let Some(first_name) = &self.first_name {
            item.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &self.last_name {
            item.last_name.clone_from(last_name);
        }
        if let Some(age) = self.age {
            item.age = age;
        }
        if let Some(sex) = &self.sex {
            item.sex.clone_from(sex);
        }
    }
}
