//! Mounts pipeline endpoints on an actix-web app.
//!
//! Endpoints sharing a path become one `web::resource` with a route per
//! method. Anything that matches no declared method and path, whether an
//! unknown path or a known path with the wrong method, is answered with a
//! `NotFoundError` envelope before any guard runs.
//!
//! Bodies are handed to the pipeline as a raw payload stream so its own
//! size limit applies and an oversized body still gets an envelope.

use std::sync::Arc;

use actix_web::web;
use actix_web::{HttpRequest, HttpResponse};
use tracing::debug;

use crate::domain::Error;

use super::error::ErrorNormalizer;
use super::pipeline::{Endpoint, Pipeline};

/// Error returned for requests with no matching endpoint.
pub fn undeclared_route(req: &HttpRequest) -> Error {
    Error::resource_not_found(format!("{} {}", req.method(), req.path()))
}

async fn not_found(req: HttpRequest, normalizer: ErrorNormalizer) -> HttpResponse {
    debug!(method = %req.method(), path = req.path(), "no endpoint declared");
    normalizer.respond(&undeclared_route(&req))
}

/// Declared endpoints plus the pipeline that runs them.
#[derive(Clone)]
pub struct Router {
    pipeline: Pipeline,
    endpoints: Vec<Arc<Endpoint>>,
}

impl Router {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            endpoints: Vec::new(),
        }
    }

    /// Declare one endpoint.
    #[must_use]
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(Arc::new(endpoint));
        self
    }

    /// Declare several endpoints.
    #[must_use]
    pub fn endpoints(mut self, endpoints: impl IntoIterator<Item = Endpoint>) -> Self {
        self.endpoints.extend(endpoints.into_iter().map(Arc::new));
        self
    }

    /// Declared endpoints in declaration order.
    pub fn declared(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter().map(AsRef::as_ref)
    }

    fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::new();
        for endpoint in &self.endpoints {
            if !paths.contains(&endpoint.path()) {
                paths.push(endpoint.path());
            }
        }
        paths
    }

    fn resource(&self, path: &str) -> actix_web::Resource {
        let mut resource = web::resource(path.to_owned());
        for endpoint in self.endpoints.iter().filter(|e| e.path() == path) {
            let pipeline = self.pipeline.clone();
            let endpoint = Arc::clone(endpoint);
            let method = endpoint.method().clone();
            resource = resource.route(web::method(method).to(
                move |req: HttpRequest, payload: web::Payload| {
                    let pipeline = pipeline.clone();
                    let endpoint = Arc::clone(&endpoint);
                    async move { pipeline.dispatch_payload(&endpoint, &req, payload).await }
                },
            ));
        }
        let normalizer = *self.pipeline.normalizer();
        resource.default_service(web::to(move |req: HttpRequest| not_found(req, normalizer)))
    }

    /// Register every endpoint and the fallback on `cfg`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        for path in self.paths() {
            cfg.service(self.resource(path));
        }
        let normalizer = *self.pipeline.normalizer();
        cfg.default_service(web::to(move |req: HttpRequest| not_found(req, normalizer)));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use actix_web::http::StatusCode;
    use actix_web::App;
    use actix_web::test as actix_test;
    use mockable::DefaultClock;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::Role;
    use crate::domain::ports::MockSessionStore;
    use crate::domain::validation::{Rule, RuleSet, StringRule};
    use crate::inbound::http::error::ErrorExposure;
    use crate::inbound::http::guards::AuthenticationGuard;
    use crate::inbound::http::pipeline::{Reply, ValidatedRequest, handler_fn};

    fn router(store: MockSessionStore, hits: Arc<AtomicUsize>) -> Router {
        let guard = AuthenticationGuard::new(Arc::new(store), Arc::new(DefaultClock));
        let pipeline = Pipeline::new(
            guard,
            ErrorNormalizer::new(ErrorExposure::Redacted),
            "storefront_session",
        );
        let counting = move |_request: ValidatedRequest| {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Reply::ok(json!("pong"))
            }
        };
        Router::new(pipeline)
            .endpoint(Endpoint::get("/ping", handler_fn(counting.clone())))
            .endpoint(Endpoint::post("/ping", handler_fn(counting)).min_role(Role::Admin))
    }

    async fn send(router: Router, req: actix_test::TestRequest) -> (StatusCode, Value) {
        let app = actix_test::init_service(App::new().configure(|cfg| router.configure(cfg))).await;
        let response = actix_test::call_service(&app, req.to_request()).await;
        (response.status(), actix_test::read_body_json(response).await)
    }

    #[rstest]
    #[actix_web::test]
    async fn declared_routes_reach_their_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (status, body) = send(
            router(MockSessionStore::new(), hits.clone()),
            actix_test::TestRequest::get().uri("/ping"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "data": "pong" }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[case::unknown_path(actix_test::TestRequest::get().uri("/nowhere"), "GET /nowhere")]
    #[case::unknown_method(actix_test::TestRequest::delete().uri("/ping"), "DELETE /ping")]
    #[actix_web::test]
    async fn undeclared_routes_skip_every_stage(
        #[case] req: actix_test::TestRequest,
        #[case] resource: &str,
    ) {
        let mut store = MockSessionStore::new();
        store.expect_resolve().never();
        let hits = Arc::new(AtomicUsize::new(0));

        let (status, body) = send(router(store, hits.clone()), req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("NotFoundError"));
        assert_eq!(body["details"], json!({ "resource": resource }));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    #[case::anonymous_to_guarded("/ping", StatusCode::UNAUTHORIZED, "UnauthenticatedError")]
    #[case::public_with_body_rules("/notes", StatusCode::BAD_REQUEST, "ValidationError")]
    #[actix_web::test]
    async fn oversized_bodies_still_get_an_envelope(
        #[case] path: &str,
        #[case] status: StatusCode,
        #[case] kind: &str,
    ) {
        let hits = Arc::new(AtomicUsize::new(0));
        let notes = Endpoint::post(
            "/notes",
            handler_fn(|_request: ValidatedRequest| async { Reply::ok(json!("kept")) }),
        )
        .body(RuleSet::new().field("text", Rule::required(StringRule::new())));
        let router = router(MockSessionStore::new(), hits.clone()).endpoint(notes);
        let oversized = format!(r#"{{"text": "{}"}}"#, "a".repeat(300 * 1024));
        let req = actix_test::TestRequest::post()
            .uri(path)
            .insert_header((actix_web::http::header::CONTENT_TYPE, "application/json"))
            .set_payload(oversized);

        let (actual, body) = send(router, req).await;
        assert_eq!(actual, status);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!(kind));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    fn endpoints_keep_declaration_order() {
        let router = router(MockSessionStore::new(), Arc::new(AtomicUsize::new(0)));
        let declared: Vec<String> = router
            .declared()
            .map(|endpoint| format!("{} {}", endpoint.method(), endpoint.path()))
            .collect();
        assert_eq!(declared, ["GET /ping", "POST /ping"]);
    }
}
