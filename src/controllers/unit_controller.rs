use std::sync::Arc;
use validator::Validate;

use crate::dto::unit_dto::{
    CreateUnitFromVinRequest, CreateUnitRequest, UnitListQuery, UpdateUnitRequest,
};
use crate::dto::{ApiResponse, ItemsResponse};
use crate::models::{EnrichedUnit, Part};
use crate::services::{PartsLookupService, UnitChanges, UnitService};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct UnitController {
    units: Arc<UnitService>,
    parts: Arc<PartsLookupService>,
}

impl UnitController {
    pub fn new(state: &AppState) -> Self {
        Self {
            units: state.units.clone(),
            parts: state.parts.clone(),
        }
    }

    pub async fn create_from_vin(
        &self,
        request: CreateUnitFromVinRequest,
    ) -> Result<ApiResponse<EnrichedUnit>, AppError> {
        let request = request.trimmed();
        request.validate()?;

        let unit = self
            .units
            .create_unit_from_vin(&request.customer_id, &request.vin)
            .await?;

        Ok(ApiResponse::success_with_message(
            unit,
            "Unit created from VIN".to_string(),
        ))
    }

    pub async fn create(
        &self,
        request: CreateUnitRequest,
    ) -> Result<ApiResponse<EnrichedUnit>, AppError> {
        let request = request.trimmed();
        request.validate()?;

        let unit = self
            .units
            .create_unit(
                &request.customer_id,
                &request.vin,
                request.attributes,
                request.vehicle,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            unit,
            "Unit created".to_string(),
        ))
    }

    pub async fn get(&self, unit_id: &str) -> Result<ApiResponse<EnrichedUnit>, AppError> {
        Ok(ApiResponse::success(self.units.get_unit(unit_id).await?))
    }

    pub async fn list(
        &self,
        query: UnitListQuery,
    ) -> Result<ApiResponse<ItemsResponse<EnrichedUnit>>, AppError> {
        let customer_id = query
            .customer_id
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("customerId query parameter is required".to_string()))?;

        log::info!("📋 Listando unidades del cliente {}", customer_id);
        let units = match query.vin.filter(|v| !v.trim().is_empty()) {
            Some(vin) => {
                self.units
                    .get_units_by_customer_and_vin(&customer_id, &vin)
                    .await?
            }
            None => self.units.get_units_by_customer(&customer_id).await?,
        };

        Ok(ApiResponse::success(units.into()))
    }

    pub async fn list_by_vin(
        &self,
        vin: &str,
    ) -> Result<ApiResponse<ItemsResponse<EnrichedUnit>>, AppError> {
        let units = self.units.get_units_by_vin(vin).await?;
        Ok(ApiResponse::success(units.into()))
    }

    pub async fn update(
        &self,
        unit_id: &str,
        request: UpdateUnitRequest,
    ) -> Result<ApiResponse<EnrichedUnit>, AppError> {
        let request = request.trimmed();
        request.validate()?;

        let changes = UnitChanges {
            customer_id: request.customer_id,
            vin: request.vin,
            attributes: request.attributes,
        };
        let unit = self.units.update_unit(unit_id, changes).await?;

        Ok(ApiResponse::success_with_message(
            unit,
            "Unit updated".to_string(),
        ))
    }

    pub async fn delete(&self, unit_id: &str) -> Result<(), AppError> {
        self.units.delete_unit(unit_id).await
    }

    pub async fn reresolve(&self, unit_id: &str) -> Result<ApiResponse<EnrichedUnit>, AppError> {
        let unit = self.units.reresolve_vehicle(unit_id).await?;
        Ok(ApiResponse::success_with_message(
            unit,
            "Vehicle catalog references re-resolved".to_string(),
        ))
    }

    pub async fn parts(
        &self,
        unit_id: &str,
        category: Option<&str>,
    ) -> Result<ApiResponse<ItemsResponse<Part>>, AppError> {
        let vehicle = self.units.vehicle_for_unit(unit_id).await?;
        let (base_vehicle_id, engine_base_id) = vehicle
            .map(|v| (v.base_vehicle_id, v.engine_base_id))
            .unwrap_or((None, None));

        let parts = self
            .parts
            .find_parts_for_vehicle(base_vehicle_id, engine_base_id, category)
            .await;
        log::info!("🔧 {} piezas para la unidad {}", parts.len(), unit_id);
        Ok(ApiResponse::success(parts.into()))
    }

    pub async fn categories(
        &self,
        unit_id: &str,
    ) -> Result<ApiResponse<ItemsResponse<String>>, AppError> {
        let vehicle = self.units.vehicle_for_unit(unit_id).await?;
        let (base_vehicle_id, engine_base_id) = vehicle
            .map(|v| (v.base_vehicle_id, v.engine_base_id))
            .unwrap_or((None, None));

        let categories = self
            .parts
            .find_categories_for_vehicle(base_vehicle_id, engine_base_id)
            .await;
        Ok(ApiResponse::success(categories.into()))
    }

    pub async fn all_categories(&self) -> ApiResponse<ItemsResponse<String>> {
        ApiResponse::success(self.parts.find_all_categories().await.into())
    }
}
