//! # gatehouse-api: HTTP Adapter
//!
//! A thin axum layer over the validation pipeline and the error
//! normalizer. Handlers resolve nothing themselves: request bodies go
//! through [`ValidationPipeline`](gatehouse_plugins::ValidationPipeline)
//! and every error body comes from
//! [`ErrorNormalizer`](gatehouse_core::ErrorNormalizer).
//!
//! ## API Surface
//!
//! | Route                          | Module               |
//! |--------------------------------|----------------------|
//! | `/health/liveness`, `/readiness` | [`app`]            |
//! | `POST /v1/validate/{resource}` | [`routes::validate`] |
//! | `/v1/users/*`                  | [`routes::users`]    |

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::validate::router())
        .merge(routes::users::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. The registry is loaded before the router exists, so a
/// serving process is ready.
async fn readiness() -> &'static str {
    "ready"
}
