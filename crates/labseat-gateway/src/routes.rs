//! Route table and the tower-http middleware stack.

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use labseat_control::ControlPlane;

use crate::handlers::{dns, health, proxy, seats, users};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// - `GET /health` - Health check
///
/// ## DNS
/// - `GET /dns-records` - List records
/// - `POST /dns-record` - Create A record
/// - `DELETE /dns-record` - Delete record by ID
/// - `DELETE /dns-record/by-name` - Delete first record matching name and type
///
/// ## Proxy
/// - `GET /proxy-configs` - List configured server names
/// - `POST /proxy-config` - Write config and reload
/// - `DELETE /proxy-config` - Delete config and reload
///
/// ## Seats
/// - `POST /seat` - Provision seat
/// - `DELETE /seat` - Tear down seat
/// - `GET /wait-ip` - Wait for a seat VM address
///
/// ## Users
/// - `POST /users` - Create user
/// - `GET /users` - List users
/// - `GET /users/:user_id` - Get user
pub fn create_router<C>(state: GatewayState<C>) -> Router
where
    C: ControlPlane + 'static,
{
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();
    let state = Arc::new(state);

    Router::new()
        .route("/health", get(health::health))
        // DNS
        .route("/dns-records", get(dns::list_records::<C>))
        .route(
            "/dns-record",
            post(dns::create_record::<C>).delete(dns::delete_record::<C>),
        )
        .route(
            "/dns-record/by-name",
            delete(dns::delete_record_by_name::<C>),
        )
        // Proxy
        .route("/proxy-configs", get(proxy::list_configs::<C>))
        .route(
            "/proxy-config",
            post(proxy::write_config::<C>).delete(proxy::delete_config::<C>),
        )
        // Seats
        .route(
            "/seat",
            post(seats::create_seat::<C>).delete(seats::delete_seat::<C>),
        )
        .route("/wait-ip", get(seats::wait_ip::<C>))
        // Users
        .route(
            "/users",
            post(users::create_user::<C>).get(users::list_users::<C>),
        )
        .route("/users/:user_id", get(users::get_user::<C>))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// `*` anywhere in the list allows every origin; unparsable origins are skipped.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
