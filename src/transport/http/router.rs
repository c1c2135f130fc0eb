use crate::app::{Profile, Resumen};
use crate::auth::{Identity, Role, Session};
use crate::storage::OrderDirection;
use crate::transport::http::error::redact_internal_errors;
use crate::transport::http::handlers::{auth, health, records, reports};
use crate::transport::http::types::{ApiResponse, AppState, SignInRequest, SignUpRequest};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        auth::signup_handler,
        auth::signin_handler,
        auth::signout_handler,
        auth::me_handler,
        reports::resumen_handler,
        records::list_records_handler,
        records::get_record_handler,
        records::create_record_handler,
        records::update_record_handler,
        records::delete_record_handler
    ),
    components(schemas(
        ApiResponse,
        SignUpRequest,
        SignInRequest,
        Session,
        Identity,
        Profile,
        Role,
        Resumen,
        OrderDirection
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn create_router(app_state: AppState) -> Router {
    let production = app_state.production;

    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/signin", post(auth::signin_handler))
        .route("/auth/signout", post(auth::signout_handler))
        .route("/auth/me", get(auth::me_handler))
        .route("/api/reportes/resumen", get(reports::resumen_handler))
        .route(
            "/api/:entity",
            get(records::list_records_handler).post(records::create_record_handler),
        )
        .route(
            "/api/:entity/:id",
            get(records::get_record_handler)
                .put(records::update_record_handler)
                .delete(records::delete_record_handler),
        )
        .layer(middleware::map_response_with_state(production, redact_internal_errors))
        .with_state(app_state)
}
