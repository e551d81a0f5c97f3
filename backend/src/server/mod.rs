//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_cors::Cors;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{Method, header};
use actix_web::{App, HttpServer, web};

use storefront::Trace;
#[cfg(debug_assertions)]
use storefront::doc::ApiDoc;
use storefront::domain::TRACE_ID_HEADER;
use storefront::inbound::http::health::{HealthState, live, ready};
use storefront::inbound::http::router::Router;
use storefront::inbound::http::storefront_router;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

const CORS_MAX_AGE_SECS: usize = 3600;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    router: Router,
    cors_origin: String,
}

fn cors(origin: &str) -> Cors {
    Cors::default()
        .allowed_origin(origin)
        .allowed_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([TRACE_ID_HEADER])
        .supports_credentials()
        .max_age(CORS_MAX_AGE_SECS)
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        router,
        cors_origin,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .wrap(cors(&cors_origin))
        .wrap(Trace)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.configure(|cfg| router.configure(cfg))
}

/// Construct the HTTP server and mark it ready once bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        cors_origin,
        http,
    } = config;
    let router = storefront_router(&http);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            router: router.clone(),
            cors_origin: cors_origin.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
