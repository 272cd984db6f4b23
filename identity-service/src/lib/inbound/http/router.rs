use std::sync::Arc;
use std::time::Duration;

use auth::TokenService;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_role::change_role;
use super::handlers::health::health;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::me::me;
use super::handlers::register::register;
use super::handlers::resend_verification::resend_verification;
use super::handlers::verify_email::verify_email;
use super::middleware::require_admin;
use super::middleware::resolve_identity;
use crate::user::ports::AccountPort;
use crate::user::ports::AuthenticationPort;
use crate::user::ports::UserRepository as UserRepositoryPort;

/// Shared handler state. Services are held behind their port traits so the
/// router composes identically over the Postgres stack and the in-memory
/// test stack.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthenticationPort>,
    pub account_service: Arc<dyn AccountPort>,
    pub token_service: Arc<TokenService>,
    pub user_repository: Arc<dyn UserRepositoryPort>,
    pub cookie_secure: bool,
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/verify", get(verify_email))
        .route("/api/auth/resend-verification", post(resend_verification))
        .route("/api/auth/me", get(me))
        .route("/api/auth/health", get(health));

    let admin_routes = Router::new()
        .route("/api/admin/users/role", put(change_role))
        .route_layer(middleware::from_fn(require_admin));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_identity,
        ))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
