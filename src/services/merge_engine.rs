//! Combinación unidad + vehículo en lectura
//!
//! Los campos propios de la unidad siempre ganan sobre los del vehículo.

use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};

use crate::models::{EnrichedUnit, Unit, Vehicle, UNIT_FIELD_NAMES};

fn to_fields<T: serde::Serialize>(value: &T) -> Map<String, Value> {
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => fields,
        _ => Map::new(),
    }
}

/// Combina una unidad con su vehículo. Sin vehículo, todos los campos
/// derivados del vehículo quedan a null.
pub fn merge(unit: &Unit, vehicle: Option<&Vehicle>) -> EnrichedUnit {
    let mut fields = match vehicle {
        Some(vehicle) => to_fields(vehicle),
        None => to_fields(&Vehicle::default()),
    };

    for name in UNIT_FIELD_NAMES {
        fields.remove(name);
    }

    fields.extend(to_fields(unit));
    EnrichedUnit::from_fields(fields)
}

/// VINs distintos de una lista de unidades, ordenados
pub fn distinct_vins(units: &[Unit]) -> Vec<String> {
    units
        .iter()
        .map(|u| u.vin.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Combina cada unidad con su vehículo del mapa (por VIN), conservando el orden
pub fn merge_all(units: &[Unit], vehicles: &HashMap<String, Vehicle>) -> Vec<EnrichedUnit> {
    units
        .iter()
        .map(|unit| merge(unit, vehicles.get(&unit.vin)))
        .collect()
}
