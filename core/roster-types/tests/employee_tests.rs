use pretty_assertions::assert_eq;
use roster_types::{DetailRecord, EmployeeForm, EmployeeId, ListItem, ListItemPatch, Sex, SexId};

fn detail() -> DetailRecord {
    DetailRecord {
        id: EmployeeId::from(1),
        first_name: "John".into(),
        last_name: "Smith".into(),
        age: 30,
        sex: Sex {
            id: SexId::from(1),
            name: "Male".into(),
        },
    }
}

fn row() -> ListItem {
    ListItem {
        id: EmployeeId::from(1),
        first_name: "John".into(),
        last_name: "Smith".into(),
        age: 30,
        sex: "Male".into(),
    }
}

// ── Wire format ──────────────────────────────────────────────────

#[test]
fn list_item_uses_camel_case() {
    let json = serde_json::to_value(row()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "id": 1,
            "firstName": "John",
            "lastName": "Smith",
            "age": 30,
            "sex": "Male"
        })
    );
}

#[test]
fn detail_record_parses_nested_relation() {
    let record: DetailRecord = serde_json::from_value(serde_json::json!({
        "id": 1,
        "firstName": "John",
        "lastName": "Smith",
        "age": 30,
        "sex": {"id": 1, "name": "Male"}
    }))
    .unwrap();
    assert_eq!(record, detail());
}

// ── Conversions ──────────────────────────────────────────────────

#[test]
fn detail_to_form_keeps_relation_id() {
    let form = detail().to_form();
    assert_eq!(form.first_name, "John");
    assert_eq!(form.age, 30);
    assert_eq!(form.sex, Some(SexId::from(1)));
}

#[test]
fn detail_to_list_item_uses_label() {
    assert_eq!(detail().to_list_item(), row());
}

#[test]
fn form_default_values() {
    let form = EmployeeForm::default();
    assert_eq!(form.first_name, "John");
    assert_eq!(form.last_name, "Doe");
    assert_eq!(form.age, 18);
    assert!(form.sex.is_none());
}

#[test]
fn full_name_joins_parts() {
    assert_eq!(row().full_name(), "John Smith");
}

// ── ListItemPatch ────────────────────────────────────────────────

#[test]
fn empty_patch_is_noop() {
    let patch = ListItemPatch::default();
    assert!(patch.is_empty());

    let mut item = row();
    patch.apply(&mut item);
    assert_eq!(item, row());
}

#[test]
fn patch_only_touches_present_fields() {
    let patch = ListItemPatch {
        age: Some(41),
        sex: Some("Female".into()),
        ..Default::default()
    };
    assert!(!patch.is_empty());

    let mut item = row();
    patch.apply(&mut item);
    assert_eq!(item.first_name, "John");
    assert_eq!(item.last_name, "Smith");
    assert_eq!(item.age, 41);
    assert_eq!(item.sex, "Female");
}
