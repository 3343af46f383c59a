//! API router.
//!
//! Returns a composable `Router` with all endpoints nested under
//! `/api/`. The chat widget and the staff dashboard are browser
//! clients, so a permissive CORS layer wraps the whole router.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router.
pub fn api_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/chat/start", post(endpoints::chat::start))
        .route("/chat/send", post(endpoints::chat::send))
        .route("/chat/suggestions", get(endpoints::chat::suggestions))
        .route(
            "/chat/sessions/:id",
            get(endpoints::chat::session_detail).delete(endpoints::chat::end_session),
        )
        .route("/schedule/slots", get(endpoints::schedule::slots))
        .route("/schedule/confirm", post(endpoints::schedule::confirm))
        .with_state(ctx);

    Router::new().nest("/api", api).layer(CorsLayer::permissive())
}
