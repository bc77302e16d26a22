use roster_types::{EmployeeId, SexId};
use std::collections::HashSet;
use std::str::FromStr;

// ── EmployeeId ────────────────────────────────────────────────────

#[test]
fn employee_id_numeric_display() {
    let id = EmployeeId::from_number(42);
    assert_eq!(id.to_string(), "42");
    assert_eq!(id.as_number(), Some(42));
}

#[test]
fn employee_id_parse_integer_is_numeric() {
    assert_eq!(EmployeeId::parse("17"), EmployeeId::from_number(17));
}

#[test]
fn employee_id_parse_text_is_opaque() {
    let id = EmployeeId::parse("emp-7f3a");
    assert_eq!(id.to_string(), "emp-7f3a");
    assert_eq!(id.as_number(), None);
}

#[test]
fn employee_id_from_str() {
    let id = EmployeeId::from_str("9").unwrap();
    assert_eq!(id, EmployeeId::from(9));
}

#[test]
fn employee_id_deserializes_number_and_string() {
    let n: EmployeeId = serde_json::from_str("5").unwrap();
    let s: EmployeeId = serde_json::from_str("\"a1\"").unwrap();
    assert_eq!(n, EmployeeId::from_number(5));
    assert_eq!(s, EmployeeId::from("a1"));
}

#[test]
fn employee_id_keeps_wire_form() {
    // A quoted number stays a string on the way back out.
    let id: EmployeeId = serde_json::from_str("\"12\"").unwrap();
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"12\"");

    let id: EmployeeId = serde_json::from_str("12").unwrap();
    assert_eq!(serde_json::to_string(&id).unwrap(), "12");
}

#[test]
fn employee_id_hash_and_eq() {
    let mut set = HashSet::new();
    set.insert(EmployeeId::from(1));
    set.insert(EmployeeId::from(1));
    set.insert(EmployeeId::from(2));
    assert_eq!(set.len(), 2);
}

#[test]
fn employee_id_ordering_is_stable() {
    let mut ids = vec![EmployeeId::from(3), EmployeeId::from(1), EmployeeId::from(2)];
    ids.sort();
    assert_eq!(ids, vec![EmployeeId::from(1), EmployeeId::from(2), EmployeeId::from(3)]);
}

// ── SexId ─────────────────────────────────────────────────────────

#[test]
fn sex_id_roundtrip_through_json() {
    let id = SexId::from(2);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "2");
    let back: SexId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn sex_id_parse() {
    assert_eq!(SexId::parse("1"), SexId::from_number(1));
    assert_eq!(SexId::from_str("female").unwrap().to_string(), "female");
}
