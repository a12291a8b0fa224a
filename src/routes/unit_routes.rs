use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::controllers::UnitController;
use crate::dto::unit_dto::{
    CreateUnitFromVinRequest, CreateUnitRequest, PartsQuery, UnitListQuery, UpdateUnitRequest,
};
use crate::dto::{ApiResponse, ItemsResponse};
use crate::models::{EnrichedUnit, Part};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_unit_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_units).post(create_unit))
        .route("/vin", post(create_unit_from_vin))
        .route("/vin/:vin", get(list_units_by_vin))
        .route(
            "/:unit_id",
            get(get_unit).put(update_unit).delete(delete_unit),
        )
        .route("/:unit_id/vehicle/resolve", post(reresolve_vehicle))
        .route("/:unit_id/parts", get(list_parts))
        .route("/:unit_id/categories", get(list_categories))
}

async fn create_unit_from_vin(
    State(state): State<AppState>,
    Json(request): Json<CreateUnitFromVinRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EnrichedUnit>>), AppError> {
    let response = UnitController::new(&state).create_from_vin(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn create_unit(
    State(state): State<AppState>,
    Json(request): Json<CreateUnitRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EnrichedUnit>>), AppError> {
    let response = UnitController::new(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_units(
    State(state): State<AppState>,
    Query(query): Query<UnitListQuery>,
) -> Result<Json<ApiResponse<ItemsResponse<EnrichedUnit>>>, AppError> {
    let response = UnitController::new(&state).list(query).await?;
    Ok(Json(response))
}

async fn list_units_by_vin(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> Result<Json<ApiResponse<ItemsResponse<EnrichedUnit>>>, AppError> {
    let response = UnitController::new(&state).list_by_vin(&vin).await?;
    Ok(Json(response))
}

async fn get_unit(
    State(state): State<AppState>,
    Path(unit_id): Path<String>,
) -> Result<Json<ApiResponse<EnrichedUnit>>, AppError> {
    let response = UnitController::new(&state).get(&unit_id).await?;
    Ok(Json(response))
}

async fn update_unit(
    State(state): State<AppState>,
    Path(unit_id): Path<String>,
    Json(request): Json<UpdateUnitRequest>,
) -> Result<Json<ApiResponse<EnrichedUnit>>, AppError> {
    let response = UnitController::new(&state).update(&unit_id, request).await?;
    Ok(Json(response))
}

async fn delete_unit(
    State(state): State<AppState>,
    Path(unit_id): Path<String>,
) -> Result<StatusCode, AppError> {
    UnitController::new(&state).delete(&unit_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reresolve_vehicle(
    State(state): State<AppState>,
    Path(unit_id): Path<String>,
) -> Result<Json<ApiResponse<EnrichedUnit>>, AppError> {
    let response = UnitController::new(&state).reresolve(&unit_id).await?;
    Ok(Json(response))
}

async fn list_parts(
    State(state): State<AppState>,
    Path(unit_id): Path<String>,
    Query(query): Query<PartsQuery>,
) -> Result<Json<ApiResponse<ItemsResponse<Part>>>, AppError> {
    let response = UnitController::new(&state)
        .parts(&unit_id, query.category.as_deref())
        .await?;
    Ok(Json(response))
}

async fn list_categories(
    State(state): State<AppState>,
    Path(unit_id): Path<String>,
) -> Result<Json<ApiResponse<ItemsResponse<String>>>, AppError> {
    let response = UnitController::new(&state).categories(&unit_id).await?;
    Ok(Json(response))
}
