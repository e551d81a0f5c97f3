//! Tests for domain error construction and trace capture.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::validation("bad"), ErrorCode::Validation)]
#[case(Error::unauthenticated("who"), ErrorCode::Unauthenticated)]
#[case(Error::forbidden("no"), ErrorCode::Forbidden)]
#[case(Error::not_found("gone"), ErrorCode::NotFound)]
#[case(Error::conflict("dup"), ErrorCode::Conflict)]
#[case(Error::unexpected("boom"), ErrorCode::Unexpected)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
#[case(ErrorCode::Validation, "ValidationError")]
#[case(ErrorCode::Unauthenticated, "UnauthenticatedError")]
#[case(ErrorCode::Forbidden, "ForbiddenError")]
#[case(ErrorCode::NotFound, "NotFoundError")]
#[case(ErrorCode::Conflict, "ConflictError")]
#[case(ErrorCode::Unexpected, "UnexpectedError")]
fn codes_serialise_to_wire_names(#[case] code: ErrorCode, #[case] wire: &str) {
    assert_eq!(serde_json::to_value(code).expect("serialise"), json!(wire));
    assert_eq!(code.as_str(), wire);
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::unexpected("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::forbidden("nope") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn resource_not_found_carries_only_the_identifier() {
    let error = Error::resource_not_found("category/42");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.details(), Some(&json!({ "resource": "category/42" })));
}

#[rstest]
fn display_includes_kind_and_message() {
    let error = Error::conflict("name taken");
    assert_eq!(error.to_string(), "ConflictError: name taken");
}
