use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{AppConfig, Environment};
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin};
use crate::records::{Appointment, Incident};
use crate::state::AppState;

/// Full HTTP surface with middleware applied
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Bearer token required
        .merge(protected_routes(state.clone()))
        // Bearer token + admin role
        .merge(elevated_routes(state.clone()))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config));
    }

    router.with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.environment == Environment::Development {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(public::auth::login))
        .route("/auth/signup-client", post(public::auth::signup_client))
        .route("/auth/signup-musician", post(public::auth::signup_musician))
        .route("/auth/signup-admin", post(public::auth::signup_admin))
        .route("/resources", get(public::resources::list))
        .route("/resources/:id", get(public::resources::show))
        .route("/resources/:id/reviews", get(public::resources::reviews))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::records;

    Router::new()
        .route("/auth/signout", post(protected::auth::signout))
        .route("/auth/protected", get(protected::auth::whoami))
        .route(
            "/appointments",
            get(records::list::<Appointment>).post(records::create::<Appointment>),
        )
        .route(
            "/appointments/:id",
            get(records::show::<Appointment>)
                .put(records::update::<Appointment>)
                .delete(records::delete::<Appointment>),
        )
        .route(
            "/incidencias",
            get(records::list::<Incident>).post(records::create::<Incident>),
        )
        .route(
            "/incidencias/:id",
            get(records::show::<Incident>)
                .put(records::update::<Incident>)
                .delete(records::delete::<Incident>),
        )
        .route(
            "/resources/:id",
            put(protected::resources::update).delete(protected::resources::delete),
        )
        .route("/resources/:id/reviews", post(protected::resources::review))
        .route(
            "/users/me",
            put(protected::users::update_me).delete(protected::users::delete_me),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn elevated_routes(state: AppState) -> Router<AppState> {
    use elevated::records;

    Router::new()
        .route("/admin/appointments", get(records::list::<Appointment>))
        .route("/admin/appointments/:id", axum::routing::delete(records::delete::<Appointment>))
        .route("/admin/incidencias", get(records::list::<Incident>))
        .route("/admin/incidencias/:id", axum::routing::delete(records::delete::<Incident>))
        // The last layer runs first: authenticate, then check the role
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "MelodyStudio API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/auth/login, /auth/signup-{client,musician,admin} (public); /auth/signout, /auth/protected",
                "appointments": "/appointments[/:id]",
                "incidents": "/incidencias[/:id]",
                "resources": "/resources[/:id[/reviews]] (list and show are public)",
                "users": "/users/me",
                "admin": "/admin/{appointments,incidencias}[/:id] (admin role)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "Data store unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
