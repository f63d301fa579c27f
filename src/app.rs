use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post, put, MethodRouter},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::{AppConfig, SecurityConfig};
use crate::database::models::{Contact, Project};
use crate::handlers::{self, collection::Collection};
use crate::state::AppState;

/// Complete HTTP surface with its global layers.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        // Public
        .route("/", methods(get(handlers::system::root)))
        .route("/health", methods(get(handlers::system::health)))
        .merge(auth_routes())
        .merge(profile_routes())
        .merge(collection_routes::<Project>("/api/projects"))
        .merge(collection_routes::<Contact>("/api/contacts"))
        .fallback(handlers::system::not_found)
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/api/auth/login", methods(post(auth::login)))
        .route("/api/auth/logout", methods(post(auth::logout)))
        .route("/api/auth/me", methods(get(auth::me)))
}

fn profile_routes() -> Router<AppState> {
    use handlers::profile;

    Router::new().route("/api/profile", methods(get(profile::get).put(profile::put)))
}

/// List/create, reorder and per-id routes for one ordered collection.
fn collection_routes<T: Collection>(base: &str) -> Router<AppState> {
    use handlers::collection::{create, delete, get as show, list, reorder, update};

    Router::new()
        .route(base, methods(get(list::<T>).post(create::<T>)))
        // Registered as its own path so "reorder" is never parsed as an id
        .route(&format!("{}/reorder", base), methods(put(reorder::<T>)))
        .route(
            &format!("{}/:id", base),
            methods(get(show::<T>).put(update::<T>).delete(delete::<T>)),
        )
}

/// Unsupported methods on a known path answer with the JSON error body.
fn methods(router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    router.fallback(handlers::system::method_not_allowed)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
