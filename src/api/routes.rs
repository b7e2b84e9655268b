//! API route configuration.

use crate::api::handlers::{
    create_split_handler, delete_split_handler, get_split_handler, list_splits_handler,
    split_stats_handler, update_split_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Management API routes, nested under `/api` by the application router.
///
/// # Endpoints
///
/// - `GET    /splits`                  - List active splits (paginated)
/// - `POST   /splits`                  - Create a split
/// - `GET    /splits/{id|slug}`        - Fetch a split
/// - `PUT    /splits/{id|slug}`        - Partially update a split
/// - `DELETE /splits/{id|slug}`        - Deactivate a split
/// - `GET    /splits/{id|slug}/stats`  - Click distribution per destination
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/splits",
            get(list_splits_handler).post(create_split_handler),
        )
        .route(
            "/splits/{split}",
            get(get_split_handler)
                .put(update_split_handler)
                .delete(delete_split_handler),
        )
        .route("/splits/{split}/stats", get(split_stats_handler))
}
