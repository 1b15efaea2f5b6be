use super::*;
use rstest::rstest;

#[rstest]
#[case(AppError::Validation(vec![]), 400, "VALIDATION_FAILED")]
#[case(AppError::Unauthorized(String::new()), 403, "UNAUTHORIZED")]
#[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
#[case(AppError::Conflict(String::new()), 409, "CONFLICT")]
#[case(AppError::BusinessRule(String::new()), 422, "BUSINESS_RULE_VIOLATION")]
#[case(AppError::Database(String::new()), 500, "DATABASE_ERROR")]
#[case(AppError::ExternalService(String::new()), 500, "EXTERNAL_SERVICE_ERROR")]
#[case(AppError::Internal(String::new()), 500, "INTERNAL_ERROR")]
fn test_classification(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
    assert_eq!(err.status_code(), status);
    assert_eq!(err.error_code(), code);
}

#[test]
fn test_validation_display_joins_all_issues() {
    let err = AppError::Validation(vec![
        "start date after end date".to_string(),
        "insufficient balance".to_string(),
    ]);
    assert_eq!(
        err.to_string(),
        "Validation failed: start date after end date; insufficient balance"
    );
}

#[test]
fn test_only_conflicts_are_retryable() {
    assert!(AppError::Conflict("balance changed".into()).is_retryable());
    assert!(!AppError::NotFound("request".into()).is_retryable());
    assert!(!AppError::Database("down".into()).is_retryable());
}

#[test]
fn test_body_carries_validation_details() {
    let body = AppError::Validation(vec!["overlaps 2024-06-12".to_string()]).body();
    assert_eq!(body.status, 400);
    assert_eq!(body.details, vec!["overlaps 2024-06-12".to_string()]);

    let json = serde_json::to_value(AppError::Conflict("row moved".into()).body()).unwrap();
    assert_eq!(json["code"], "CONFLICT");
    assert!(json.get("details").is_none());
}
