//! OpenAPI document for the storefront API.
//!
//! Registers every pipeline endpoint, the health probes, the envelope and
//! catalogue schemas, and the two ways a session token may be presented.
//! Served by Swagger UI in debug builds and printed by `openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::config::DEFAULT_COOKIE_NAME;
use crate::domain::{Category, CategoryDraft, ErrorCode, Product, ProductDraft, Role, SortOrder};
use crate::inbound::http::auth::{IdentityView, LoginRequest, LoginResponse};
use crate::inbound::http::envelope::{ErrorEnvelope, SuccessEnvelope};

/// Adds the cookie and bearer schemes accepted by the authentication guard.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                DEFAULT_COOKIE_NAME,
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Session token returned by POST /api/v1/auth/login."))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Storefront API",
        description = "Bakery catalogue and session endpoints behind a validating, role-guarded pipeline."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = []), ("BearerToken" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::catalogue::list_categories,
        crate::inbound::http::catalogue::get_category,
        crate::inbound::http::catalogue::create_category,
        crate::inbound::http::catalogue::update_category,
        crate::inbound::http::catalogue::delete_category,
        crate::inbound::http::catalogue::list_products,
        crate::inbound::http::catalogue::get_product,
        crate::inbound::http::catalogue::create_product,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        SuccessEnvelope,
        ErrorEnvelope,
        ErrorCode,
        Role,
        SortOrder,
        Category,
        CategoryDraft,
        Product,
        ProductDraft,
        LoginRequest,
        LoginResponse,
        IdentityView,
    )),
    tags(
        (name = "auth", description = "Session lifecycle"),
        (name = "catalogue", description = "Categories and products"),
        (name = "health", description = "Orchestrator probes")
    )
)]
pub struct ApiDoc;
