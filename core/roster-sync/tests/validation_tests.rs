use roster_sync::validation::{MAX_AGE, MAX_NAME_LEN, MIN_AGE};
use roster_sync::{normalize_field_path, validate_form, MutationKind, SyncError, ValidationErrors};
use roster_types::{EmployeeForm, SexId};
use std::collections::HashMap;

fn valid_form() -> EmployeeForm {
    EmployeeForm {
        sex: Some(SexId::from(1)),
        ..Default::default()
    }
}

// ── Path normalization ───────────────────────────────────────────

#[test]
fn normalize_lowercases_first_char() {
    assert_eq!(normalize_field_path("FirstName"), "firstName");
    assert_eq!(normalize_field_path("lastName"), "lastName");
}

#[test]
fn normalize_strips_value_suffix() {
    assert_eq!(normalize_field_path("Age.Value"), "age");
    assert_eq!(normalize_field_path("SexId.Value"), "sexId");
}

#[test]
fn normalize_empty_path() {
    assert_eq!(normalize_field_path(""), "");
}

// ── ValidationErrors ─────────────────────────────────────────────

#[test]
fn from_server_normalizes_and_merges() {
    let mut raw = HashMap::new();
    raw.insert("Age.Value".to_string(), vec!["too young".to_string()]);
    raw.insert("Age".to_string(), vec!["required".to_string()]);
    raw.insert("FirstName".to_string(), vec!["required".to_string()]);

    let errors = ValidationErrors::from_server(raw);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors.get("age"), ["required".to_string(), "too young".to_string()]);
    assert_eq!(errors.first("firstName"), Some("required"));
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["age", "firstName"]);
}

#[test]
fn missing_field_has_no_messages() {
    let errors = ValidationErrors::new();
    assert!(errors.get("age").is_empty());
    assert!(errors.first("age").is_none());
    assert!(errors.is_empty());
}

#[test]
fn display_joins_messages() {
    let mut errors = ValidationErrors::new();
    errors.insert("age", "too young");
    errors.insert("firstName", "required");
    assert_eq!(errors.to_string(), "age: too young; firstName: required");
}

// ── Form rules ───────────────────────────────────────────────────

#[test]
fn default_form_needs_a_sex() {
    let errors = validate_form(&EmployeeForm::default()).unwrap_err();
    assert_eq!(errors.first("sex"), Some("Sex is required"));
    assert_eq!(errors.len(), 1);
}

#[test]
fn valid_form_passes() {
    assert!(validate_form(&valid_form()).is_ok());
}

#[test]
fn names_are_required() {
    let form = EmployeeForm {
        first_name: String::new(),
        last_name: String::new(),
        ..valid_form()
    };
    let errors = validate_form(&form).unwrap_err();
    assert_eq!(errors.first("firstName"), Some("First Name is required"));
    assert_eq!(errors.first("lastName"), Some("Last Name is required"));
}

#[test]
fn names_have_a_length_limit() {
    let form = EmployeeForm {
        first_name: "a".repeat(MAX_NAME_LEN),
        last_name: "b".repeat(MAX_NAME_LEN + 1),
        ..valid_form()
    };
    let errors = validate_form(&form).unwrap_err();
    assert!(errors.get("firstName").is_empty());
    assert_eq!(errors.first("lastName"), Some("Last Name must be at most 255 characters"));
}

#[test]
fn age_bounds_are_inclusive() {
    for age in [MIN_AGE, MAX_AGE] {
        assert!(validate_form(&EmployeeForm { age, ..valid_form() }).is_ok());
    }

    let young = validate_form(&EmployeeForm { age: MIN_AGE - 1, ..valid_form() }).unwrap_err();
    assert_eq!(young.first("age"), Some("Age must be at least 18"));

    let old = validate_form(&EmployeeForm { age: MAX_AGE + 1, ..valid_form() }).unwrap_err();
    assert_eq!(old.first("age"), Some("Age must be at most 100"));
}

// ── SyncError ────────────────────────────────────────────────────

#[test]
fn validation_errors_are_not_banners() {
    let mut fields = ValidationErrors::new();
    fields.insert("age", "too young");
    let err = SyncError::Validation(fields.clone());

    assert_eq!(err.field_errors(), Some(&fields));
    assert!(err.banner_message().is_none());
}

#[test]
fn other_errors_are_banners() {
    let err = SyncError::Unknown("boom".into());
    assert_eq!(err.banner_message().as_deref(), Some("boom"));
    assert!(err.field_errors().is_none());
    assert!(SyncError::Cancelled.banner_message().is_none());
}

#[test]
fn error_classification() {
    assert!(SyncError::Transport("timeout".into()).is_transient());
    assert!(SyncError::StillSaving(MutationKind::Update).is_transient());
    assert!(!SyncError::Unknown("x".into()).is_transient());

    assert!(SyncError::NotFound("employee 3".into()).requires_refresh());
    assert!(!SyncError::Transport("timeout".into()).requires_refresh());
}

#[test]
fn still_saving_names_the_kind() {
    let err = SyncError::StillSaving(MutationKind::Delete);
    assert_eq!(err.to_string(), "still saving: another delete is in progress");
}
