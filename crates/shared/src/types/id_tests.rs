use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_new_ids_are_v7_and_ordered() {
    let first = ApprovalId::new();
    let second = ApprovalId::new();
    assert_eq!(first.into_inner().get_version_num(), 7);
    assert!(first <= second);
}

#[test]
fn test_uuid_conversions_round_trip_through_the_wrapper() {
    let uuid = Uuid::new_v4();
    let id = LeaveRequestId::from_uuid(uuid);
    assert_eq!(LeaveRequestId::from(uuid), id);
    assert_eq!(Uuid::from(id), uuid);
}

#[test]
fn test_display_and_parse_use_the_hyphenated_uuid() {
    let uuid = Uuid::new_v4();
    let id = EmployeeId::from_uuid(uuid);
    assert_eq!(id.to_string(), uuid.to_string());
    assert_eq!(BalanceId::from_str(&uuid.to_string()).unwrap().into_inner(), uuid);
    assert!(EmployeeId::from_str("not-an-id").is_err());
}

#[test]
fn test_ids_serialize_as_bare_strings() {
    let uuid = Uuid::new_v4();
    let json = serde_json::to_string(&CompOffGrantId::from_uuid(uuid)).unwrap();
    assert_eq!(json, format!("\"{uuid}\""));
    let back: CompOffGrantId = serde_json::from_str(&json).unwrap();
    assert_eq!(back.into_inner(), uuid);
}
