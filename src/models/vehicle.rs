//! Modelo de Vehicle
//!
//! Registro canónico de especificación de un vehículo, decodificado del API
//! de VIN y guardado una sola vez por VIN (ítems `VIN#`). Varias unidades
//! pueden apuntar al mismo registro.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vehicle - un registro por VIN, inmutable salvo re-resolución
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Vehicle {
    pub vin: String,

    // Identificación
    pub year: Option<i32>,
    pub make: Option<String>,
    pub make_id: Option<i32>,
    pub manufacturer: Option<String>,
    pub manufacturer_id: Option<i32>,
    pub model: Option<String>,
    pub model_id: Option<i32>,
    pub base_vehicle_id: Option<i32>,
    pub engine_base_id: Option<i32>,
    pub series: Option<String>,
    pub trim: Option<String>,
    pub trim2: Option<String>,
    pub submodel: Option<String>,

    // Clasificación
    pub unit_type: Option<String>,
    pub vehicle_type: Option<String>,
    pub body_class: Option<String>,
    pub body_type: Option<String>,
    pub body_cab_type: Option<String>,
    pub bed_type: Option<String>,
    pub bus_type: Option<String>,
    pub bus_length: Option<String>,
    pub bus_floor_config_type: Option<String>,
    pub motorcycle_chassis_type: Option<String>,
    pub motorcycle_suspension_type: Option<String>,
    pub trailer_body_type: Option<String>,
    pub trailer_length: Option<String>,
    pub trailer_type: Option<String>,
    pub custom_motorcycle_type: Option<String>,
    pub non_land_use: Option<String>,
    pub other_bus_info: Option<String>,
    pub other_motorcycle_info: Option<String>,
    pub other_trailer_info: Option<String>,

    // Motor
    pub fuel_type: Option<String>,
    pub fuel_type_secondary: Option<String>,
    pub engine_type: Option<String>,
    pub engine_manufacturer: Option<String>,
    pub engine_model: Option<String>,
    pub engine_cylinders: Option<i32>,
    #[serde(rename = "engineHP")]
    pub engine_hp: Option<i32>,
    #[serde(rename = "engineHPMax")]
    pub engine_hp_max: Option<i32>,
    #[serde(rename = "engineKW")]
    pub engine_kw: Option<i32>,
    pub displacement_liters: Option<f64>,
    #[serde(rename = "displacementCC")]
    pub displacement_cc: Option<f64>,
    #[serde(rename = "displacementCI")]
    pub displacement_ci: Option<f64>,
    pub engine_configuration: Option<String>,
    pub engine_cycles: Option<String>,
    pub valve_train_design: Option<String>,
    pub fuel_injection_type: Option<String>,
    pub other_engine_info: Option<String>,
    pub turbo: Option<String>,
    pub cooling_type: Option<String>,
    #[serde(rename = "topSpeedMPH")]
    pub top_speed_mph: Option<String>,

    // Transmisión y tren motriz
    pub transmission_type: Option<String>,
    pub transmission_style: Option<String>,
    pub transmission_speeds: Option<String>,
    pub drive_type: Option<String>,
    pub brake_system_type: Option<String>,
    pub brake_system_desc: Option<String>,
    pub combined_braking_system: Option<String>,
    pub dynamic_brake_support: Option<String>,
    pub axles: Option<i32>,
    pub axle_configuration: Option<String>,

    // Dimensiones y peso
    pub doors: Option<i32>,
    pub windows: Option<i32>,
    pub seats: Option<i32>,
    pub seat_rows: Option<i32>,
    #[serde(rename = "curbWeightLB")]
    pub curb_weight_lb: Option<i32>,
    pub gvwr: Option<String>,
    pub gvwr_to: Option<String>,
    pub gcwr: Option<i32>,
    pub gcwr_to: Option<i32>,
    #[serde(rename = "bedLengthIN")]
    pub bed_length_in: Option<i32>,
    #[serde(rename = "wheelbaseIN")]
    pub wheelbase_in: Option<i32>,
    pub wheelbase_short: Option<i32>,
    pub wheelbase_long: Option<i32>,
    pub wheelbase_type: Option<String>,
    pub track_width: Option<i32>,
    pub wheel_size_front: Option<i32>,
    pub wheel_size_rear: Option<i32>,

    // Sistemas de seguridad
    pub abs: Option<String>,
    pub esc: Option<String>,
    pub traction_control: Option<String>,
    pub forward_collision_warning: Option<String>,
    pub blind_spot_mon: Option<String>,
    pub blind_spot_intervention: Option<String>,
    pub lane_departure_warning: Option<String>,
    pub lane_keep_system: Option<String>,
    pub lane_centering_assistance: Option<String>,
    pub park_assist: Option<String>,
    pub rear_cross_traffic_alert: Option<String>,
    pub rear_automatic_emergency_braking: Option<String>,
    pub rear_visibility_system: Option<String>,
    pub pedestrian_automatic_emergency_braking: Option<String>,
    pub seat_belts: Option<String>,
    pub seat_belts_all: Option<String>,
    pub pretensioner: Option<String>,
    pub air_bags_front: Option<String>,
    pub air_bags_knee: Option<String>,
    pub air_bags_side: Option<String>,
    pub air_bags_curtain: Option<String>,
    pub air_bags_seat_cushion: Option<String>,
    pub airbag_loc_front: Option<String>,
    pub airbag_loc_knee: Option<String>,
    pub airbag_loc_side: Option<String>,
    pub airbag_loc_curtain: Option<String>,
    pub airbag_loc_seat_cushion: Option<String>,
    pub active_safety_note: Option<String>,
    pub active_safety_sys_note: Option<String>,
    pub other_restraint_system_info: Option<String>,
    pub cib: Option<String>,
    pub edr: Option<String>,

    // Electrificación / batería
    pub battery_type: Option<String>,
    pub battery_info: Option<String>,
    pub ev_drive_unit: Option<String>,
    pub electrification_level: Option<String>,
    #[serde(rename = "batteryKWh")]
    pub battery_kwh: Option<f64>,
    #[serde(rename = "batteryKWhTo")]
    pub battery_kwh_to: Option<f64>,
    pub battery_v: Option<i32>,
    pub battery_v_to: Option<i32>,
    pub battery_a: Option<i32>,
    pub battery_a_to: Option<i32>,
    pub battery_cells: Option<i32>,
    pub battery_modules: Option<i32>,
    pub battery_packs: Option<i32>,
    pub charger_level: Option<String>,
    #[serde(rename = "chargerPowerKW")]
    pub charger_power_kw: Option<i32>,

    // Funciones adaptativas
    pub adaptive_cruise_control: Option<String>,
    pub adaptive_driving_beam: Option<String>,
    pub adaptive_headlights: Option<String>,
    pub keyless_ignition: Option<String>,
    pub wheelie_mitigation: Option<String>,
    pub automatic_pedestrian_alerting_sound: Option<String>,
    pub auto_reverse_system: Option<String>,
    pub cib_status: Option<String>,
    pub daytime_running_light: Option<String>,
    pub lower_beam_headlamp_light_source: Option<String>,
    pub semiautomatic_headlamp_beam_switching: Option<String>,

    // Planta de fabricación
    pub plant_city: Option<String>,
    pub plant_state: Option<String>,
    pub plant_country: Option<String>,
    pub plant_company_name: Option<String>,
    pub destination_market: Option<String>,

    // Automatización SAE
    pub sae_automation_level: Option<String>,
    pub sae_automation_level_to: Option<String>,
    pub crac: Option<String>,

    // Otros campos NHTSA
    pub steering_location: Option<String>,
    pub base_price: Option<String>,
    pub cash_for_clunkers: Option<String>,
    pub ncsb_body_type: Option<String>,
    pub ncsa_make: Option<String>,
    pub ncsa_model: Option<String>,
    pub ncsb_mapping_exception: Option<String>,
    pub ncsb_map_exc_approved_by: Option<String>,
    pub ncsb_map_exc_approved_on: Option<String>,
    pub ncsb_note: Option<String>,
    pub vehicle_descriptor: Option<String>,
    pub suggested_vin: Option<String>,
    pub possible_values: Option<String>,
    pub note: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Vehicle {
    /// Vehicle vacío para un VIN (todos los campos de especificación a null)
    pub fn for_vin(vin: impl Into<String>) -> Self {
        Self {
            vin: vin.into(),
            ..Default::default()
        }
    }

    /// Nuevo valor con los IDs de catálogo resueltos. `None` queda guardado
    /// como "sin resolver" y no se reintenta en lectura.
    pub fn with_catalog_ids(self, base_vehicle_id: Option<i32>, engine_base_id: Option<i32>) -> Self {
        Self {
            base_vehicle_id,
            engine_base_id,
            ..self
        }
    }

    pub fn with_updated_at(self, updated_at: DateTime<Utc>) -> Self {
        Self {
            updated_at: Some(updated_at),
            ..self
        }
    }
}
