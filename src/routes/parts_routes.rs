use axum::{extract::State, routing::get, Json, Router};

use crate::controllers::UnitController;
use crate::dto::{ApiResponse, ItemsResponse};
use crate::state::AppState;

pub fn create_parts_router() -> Router<AppState> {
    Router::new().route("/categories", get(list_all_categories))
}

async fn list_all_categories(
    State(state): State<AppState>,
) -> Json<ApiResponse<ItemsResponse<String>>> {
    Json(UnitController::new(&state).all_categories().await)
}
