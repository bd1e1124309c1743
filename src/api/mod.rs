//! REST API layer: route handlers, DTOs, OpenAPI and router composition.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;
use crate::persistence::ReservoirStore;
use crate::ws::handler::ws_handler;

/// Builds the complete router: REST endpoints, the viewer socket at
/// `/ws/reservoirs` and, with the `swagger-ui` feature, the API docs.
pub fn build_router<S: ReservoirStore>() -> Router<AppState<S>> {
    let router = Router::new()
        .merge(handlers::routes())
        .route("/ws/reservoirs", get(ws_handler::<S>));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
}
