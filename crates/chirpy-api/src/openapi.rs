//! OpenAPI document
//!
//! Served as JSON at `/api-docs/openapi.json` and browsable at `/swagger-ui/`.
//!
//! Author: hephaex@gmail.com

use crate::handlers::{admin, auth, chirps, health, polka, users};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(title = "Chirpy API", description = "Short message service"),
    paths(
        health::healthz,
        users::create_user,
        users::update_user,
        auth::login_handler,
        auth::refresh_handler,
        auth::revoke_handler,
        chirps::create_chirp,
        chirps::list_chirps,
        chirps::get_chirp,
        chirps::delete_chirp,
        polka::polka_webhook,
        admin::metrics,
        admin::reset,
    ),
    components(schemas(
        crate::error::ApiError,
        users::CredentialsRequest,
        users::UserResponse,
        auth::LoginRequest,
        auth::LoginResponse,
        auth::TokenResponse,
        chirps::CreateChirpRequest,
        chirps::ChirpResponse,
        polka::WebhookRequest,
        polka::WebhookData,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness"),
        (name = "users", description = "Accounts"),
        (name = "auth", description = "Login, token refresh and revocation"),
        (name = "chirps", description = "Short messages"),
        (name = "webhooks", description = "Payment partner events"),
        (name = "admin", description = "Operator endpoints"),
    )
)]
pub struct ApiDoc;

/// Registers the bearer and partner API key schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            // `Authorization: ApiKey <key>`
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/login",
            "/api/refresh",
            "/api/revoke",
            "/api/chirps/{chirp_id}",
            "/api/polka/webhooks",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.security_schemes.contains_key("api_key"));
    }
}
