//! Tests for the error normaliser.

use std::io;
use std::sync::{Arc, Mutex};

use super::*;
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn unexpected() -> Error {
    Error::unexpected("pool exhausted on replica 3")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "replica": 3 }))
}

async fn render(normalizer: ErrorNormalizer, error: Error) -> (StatusCode, Option<String>, Value) {
    let response = normalizer.respond(&error);
    let status = response.status();
    let trace = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body()).await.expect("body");
    (status, trace, serde_json::from_slice(&bytes).expect("json"))
}

#[rstest]
#[case(ErrorCode::Validation, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::Unauthenticated, StatusCode::UNAUTHORIZED)]
#[case(ErrorCode::Forbidden, StatusCode::FORBIDDEN)]
#[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
#[case(ErrorCode::Conflict, StatusCode::CONFLICT)]
#[case(ErrorCode::Unexpected, StatusCode::INTERNAL_SERVER_ERROR)]
fn every_kind_has_one_status(#[case] code: ErrorCode, #[case] status: StatusCode) {
    assert_eq!(status_for(code), status);
    assert_eq!(Error::new(code, "x").status_code(), status);
}

#[rstest]
#[actix_web::test]
async fn redacted_unexpected_errors_hide_internals(unexpected: Error) {
    let (status, trace, body) = render(ErrorNormalizer::default(), unexpected).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(trace.as_deref(), Some(TRACE_ID));
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "UnexpectedError",
            "message": GENERIC_UNEXPECTED_MESSAGE
        })
    );
}

#[rstest]
#[actix_web::test]
async fn verbose_unexpected_errors_keep_the_message(unexpected: Error) {
    let normalizer = ErrorNormalizer::new(ErrorExposure::Verbose);
    let (_, _, body) = render(normalizer, unexpected).await;
    assert_eq!(body["message"], json!("pool exhausted on replica 3"));
    assert_eq!(body["details"], json!({ "replica": 3 }));
}

#[rstest]
#[case(Error::unauthenticated("authentication required"))]
#[case(Error::forbidden("insufficient permissions"))]
#[actix_web::test]
async fn guard_failures_never_carry_details(#[case] error: Error) {
    let error = error.with_details(json!({ "reason": "expired" }));
    let (_, _, body) = render(ErrorNormalizer::new(ErrorExposure::Verbose), error).await;
    assert!(body.get("details").is_none());
}

#[rstest]
#[actix_web::test]
async fn not_found_details_are_limited_to_the_resource() {
    let error = Error::resource_not_found("category 7")
        .with_details(json!({ "resource": "category 7", "query": "select *" }));
    let (status, _, body) = render(ErrorNormalizer::default(), error).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["details"], json!({ "resource": "category 7" }));
}

#[rstest]
#[actix_web::test]
async fn conflict_details_pass_through() {
    let error = Error::conflict("name 'Rye' already exists").with_details(json!({ "field": "name" }));
    let (status, _, body) = render(ErrorNormalizer::default(), error).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("ConflictError"));
    assert_eq!(body["details"], json!({ "field": "name" }));
}

#[rstest]
#[actix_web::test]
async fn errors_outside_a_request_have_no_trace_header() {
    let (_, trace, _) = render(ErrorNormalizer::default(), Error::not_found("nope")).await;
    assert_eq!(trace, None);
}

#[rstest]
#[actix_web::test]
async fn response_error_uses_the_redacted_policy(unexpected: Error) {
    let response = ResponseError::error_response(&unexpected);
    let bytes = to_bytes(response.into_body()).await.expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["message"], json!(GENERIC_UNEXPECTED_MESSAGE));
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        let bytes = self.0.lock().expect("log buffer").clone();
        String::from_utf8(bytes).expect("utf-8 log output")
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[rstest]
fn redacted_unexpected_errors_keep_full_detail_in_the_log(unexpected: Error) {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let response = tracing::subscriber::with_default(subscriber, || {
        ErrorNormalizer::default().respond(&unexpected)
    });
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let output = logs.contents();
    assert!(output.contains("pool exhausted on replica 3"), "{output}");
    assert!(output.contains("details=Some(Object"), "{output}");
    assert!(output.contains(TRACE_ID), "{output}");
}
