//! Normalización de respuestas de VIN
//!
//! Convierte los pares (variable, valor) del API de VIN en un `Vehicle`
//! canónico. Cada campo tiene un nombre de variable por dialecto; la
//! conversión numérica es tolerante (un valor no parseable queda a null).

use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value};
use tracing::{debug, error};

use crate::models::{DecodeDialect, Vehicle, VinDecodeResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Int,
    Float,
}

/// Origen del valor dentro de la respuesta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Valor de la variable
    Value(&'static str),
    /// Value-id de la variable (los IDs de marca/modelo en el dialecto etiquetado)
    ValueIdOf(&'static str),
}

/// Una fila de la tabla de mapeo
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Nombre serializado del campo en `Vehicle`
    pub field: &'static str,
    pub kind: FieldKind,
    pub labeled: Source,
    pub compact: Source,
}

impl FieldSpec {
    pub fn source(&self, dialect: DecodeDialect) -> Source {
        match dialect {
            DecodeDialect::Labeled => self.labeled,
            DecodeDialect::Compact => self.compact,
        }
    }
}

const fn spec(field: &'static str, kind: FieldKind, labeled: &'static str, compact: &'static str) -> FieldSpec {
    FieldSpec {
        field,
        kind,
        labeled: Source::Value(labeled),
        compact: Source::Value(compact),
    }
}

const fn text(field: &'static str, labeled: &'static str, compact: &'static str) -> FieldSpec {
    spec(field, FieldKind::Text, labeled, compact)
}

const fn int(field: &'static str, labeled: &'static str, compact: &'static str) -> FieldSpec {
    spec(field, FieldKind::Int, labeled, compact)
}

const fn float(field: &'static str, labeled: &'static str, compact: &'static str) -> FieldSpec {
    spec(field, FieldKind::Float, labeled, compact)
}

const fn id_of(field: &'static str, labeled_variable: &'static str, compact: &'static str) -> FieldSpec {
    FieldSpec {
        field,
        kind: FieldKind::Int,
        labeled: Source::ValueIdOf(labeled_variable),
        compact: Source::Value(compact),
    }
}

/// Tabla de mapeo: campo canónico ← variable por dialecto
pub const FIELD_TABLE: &[FieldSpec] = &[
    // Identificación
    int("year", "Model Year", "ModelYear"),
    text("make", "Make", "Make"),
    id_of("makeId", "Make", "MakeID"),
    text("manufacturer", "Manufacturer Name", "Manufacturer"),
    id_of("manufacturerId", "Manufacturer Name", "ManufacturerId"),
    text("model", "Model", "Model"),
    id_of("modelId", "Model", "ModelID"),
    text("series", "Series", "Series"),
    text("trim", "Trim", "Trim"),
    text("trim2", "Trim2", "Trim2"),
    // Clasificación
    text("unitType", "Vehicle Type", "VehicleType"),
    text("vehicleType", "Vehicle Type", "VehicleType"),
    text("bodyClass", "Body Class", "BodyClass"),
    text("bodyType", "Cab Type", "BodyCabType"),
    text("bodyCabType", "Cab Type", "BodyCabType"),
    text("bedType", "Bed Type", "BedType"),
    text("busType", "Bus Type", "BusType"),
    text("busLength", "Bus Length (feet)", "BusLength"),
    text("busFloorConfigType", "Bus Floor Configuration Type", "BusFloorConfigType"),
    text("motorcycleChassisType", "Motorcycle Chassis Type", "MotorcycleChassisType"),
    text("motorcycleSuspensionType", "Motorcycle Suspension Type", "MotorcycleSuspensionType"),
    text("trailerBodyType", "Trailer Body Type", "TrailerBodyType"),
    text("trailerLength", "Trailer Length (feet)", "TrailerLength"),
    text("trailerType", "Trailer Type Connection", "TrailerType"),
    text("customMotorcycleType", "Custom Motorcycle Type", "CustomMotorcycleType"),
    text("nonLandUse", "Non-Land Use", "NonLandUse"),
    text("otherBusInfo", "Other Bus Info", "OtherBusInfo"),
    text("otherMotorcycleInfo", "Other Motorcycle Info", "OtherMotorcycleInfo"),
    text("otherTrailerInfo", "Other Trailer Info", "OtherTrailerInfo"),
    // Motor
    text("fuelType", "Fuel Type - Primary", "FuelTypePrimary"),
    text("fuelTypeSecondary", "Fuel Type - Secondary", "FuelTypeSecondary"),
    text("engineType", "Fuel Type - Primary", "FuelTypePrimary"),
    text("engineManufacturer", "Engine Manufacturer", "EngineManufacturer"),
    text("engineModel", "Engine Model", "EngineModel"),
    int("engineCylinders", "Engine Number of Cylinders", "EngineCylinders"),
    int("engineHP", "Engine Brake (hp) From", "EngineHP"),
    int("engineHPMax", "Engine Brake (hp) To", "EngineHP_to"),
    int("engineKW", "Engine Power (kW)", "EngineKW"),
    float("displacementLiters", "Displacement (L)", "DisplacementL"),
    float("displacementCC", "Displacement (CC)", "DisplacementCC"),
    float("displacementCI", "Displacement (CI)", "DisplacementCI"),
    text("engineConfiguration", "Engine Configuration", "EngineConfiguration"),
    text("engineCycles", "Engine Stroke Cycles", "EngineCycles"),
    text("valveTrainDesign", "Valve Train Design", "ValveTrainDesign"),
    text("fuelInjectionType", "Fuel Delivery / Fuel Injection Type", "FuelInjectionType"),
    text("otherEngineInfo", "Other Engine Info", "OtherEngineInfo"),
    text("turbo", "Turbo", "Turbo"),
    text("coolingType", "Cooling Type", "CoolingType"),
    text("topSpeedMPH", "Top Speed (MPH)", "TopSpeedMPH"),
    // Transmisión y tren motriz
    text("transmissionType", "Transmission Style", "TransmissionStyle"),
    text("transmissionStyle", "Transmission Style", "TransmissionStyle"),
    text("transmissionSpeeds", "Transmission Speeds", "TransmissionSpeeds"),
    text("driveType", "Drive Type", "DriveType"),
    text("brakeSystemType", "Brake System Type", "BrakeSystemType"),
    text("brakeSystemDesc", "Brake System Description", "BrakeSystemDesc"),
    text("combinedBrakingSystem", "Combined Braking System (CBS)", "CombinedBrakingSystem"),
    text("dynamicBrakeSupport", "Dynamic Brake Support (DBS)", "DynamicBrakeSupport"),
    int("axles", "Axles", "Axles"),
    text("axleConfiguration", "Axle Configuration", "AxleConfiguration"),
    // Dimensiones y peso
    int("doors", "Doors", "Doors"),
    int("windows", "Windows", "Windows"),
    int("seats", "Number of Seats", "Seats"),
    int("seatRows", "Number of Seat Rows", "SeatRows"),
    int("curbWeightLB", "Curb Weight (pounds)", "CurbWeightLB"),
    text("gvwr", "Gross Vehicle Weight Rating From", "GVWR"),
    text("gvwrTo", "Gross Vehicle Weight Rating To", "GVWR_to"),
    int("gcwr", "Gross Combination Weight Rating From", "GCWR"),
    int("gcwrTo", "Gross Combination Weight Rating To", "GCWR_to"),
    int("bedLengthIN", "Bed Length (inches)", "BedLengthIN"),
    int("wheelbaseIN", "Wheel Base (inches) From", "WheelBaseShort"),
    int("wheelbaseShort", "Wheel Base (inches) From", "WheelBaseShort"),
    int("wheelbaseLong", "Wheel Base (inches) To", "WheelBaseLong"),
    text("wheelbaseType", "Wheel Base Type", "WheelBaseType"),
    int("trackWidth", "Track Width (inches)", "TrackWidth"),
    int("wheelSizeFront", "Wheel Size Front (inches)", "WheelSizeFront"),
    int("wheelSizeRear", "Wheel Size Rear (inches)", "WheelSizeRear"),
    // Sistemas de seguridad
    text("abs", "Anti-lock Braking System (ABS)", "ABS"),
    text("esc", "Electronic Stability Control (ESC)", "ESC"),
    text("tractionControl", "Traction Control", "TractionControl"),
    text("forwardCollisionWarning", "Forward Collision Warning (FCW)", "ForwardCollisionWarning"),
    text("blindSpotMon", "Blind Spot Warning (BSW)", "BlindSpotMon"),
    text("blindSpotIntervention", "Blind Spot Intervention (BSI)", "BlindSpotIntervention"),
    text("laneDepartureWarning", "Lane Departure Warning (LDW)", "LaneDepartureWarning"),
    text("laneKeepSystem", "Lane Keeping Assistance (LKA)", "LaneKeepSystem"),
    text("laneCenteringAssistance", "Lane Centering Assistance", "LaneCenteringAssistance"),
    text("parkAssist", "Parking Assist", "ParkAssist"),
    text("rearCrossTrafficAlert", "Rear Cross Traffic Alert", "RearCrossTrafficAlert"),
    text("rearAutomaticEmergencyBraking", "Rear Automatic Emergency Braking", "RearAutomaticEmergencyBraking"),
    text("rearVisibilitySystem", "Backup Camera", "RearVisibilitySystem"),
    text(
        "pedestrianAutomaticEmergencyBraking",
        "Pedestrian Automatic Emergency Braking (PAEB)",
        "PedestrianAutomaticEmergencyBraking",
    ),
    text("seatBelts", "Seat Belt Type", "SeatBeltsAll"),
    text("seatBeltsAll", "Seat Belt Type", "SeatBeltsAll"),
    text("pretensioner", "Pretensioner", "Pretensioner"),
    text("airBagsFront", "Front Air Bag Locations", "AirBagLocFront"),
    text("airBagsKnee", "Knee Air Bag Locations", "AirBagLocKnee"),
    text("airBagsSide", "Side Air Bag Locations", "AirBagLocSide"),
    text("airBagsCurtain", "Curtain Air Bag Locations", "AirBagLocCurtain"),
    text("airBagsSeatCushion", "Seat Cushion Air Bag Locations", "AirBagLocSeatCushion"),
    text("airbagLocFront", "Front Air Bag Locations", "AirBagLocFront"),
    text("airbagLocKnee", "Knee Air Bag Locations", "AirBagLocKnee"),
    text("airbagLocSide", "Side Air Bag Locations", "AirBagLocSide"),
    text("airbagLocCurtain", "Curtain Air Bag Locations", "AirBagLocCurtain"),
    text("airbagLocSeatCushion", "Seat Cushion Air Bag Locations", "AirBagLocSeatCushion"),
    text("activeSafetyNote", "Active Safety System Note", "ActiveSafetySysNote"),
    text("activeSafetySysNote", "Active Safety System Note", "ActiveSafetySysNote"),
    text("otherRestraintSystemInfo", "Other Restraint System Info", "OtherRestraintSystemInfo"),
    text("cib", "Crash Imminent Braking (CIB)", "CIB"),
    text("edr", "Event Data Recorder (EDR)", "EDR"),
    // Electrificación / batería
    text("batteryType", "Battery Type", "BatteryType"),
    text("batteryInfo", "Other Battery Info", "BatteryInfo"),
    text("evDriveUnit", "EV Drive Unit", "EVDriveUnit"),
    text("electrificationLevel", "Electrification Level", "ElectrificationLevel"),
    float("batteryKWh", "Battery Energy (kWh) From", "BatteryKWh"),
    float("batteryKWhTo", "Battery Energy (kWh) To", "BatteryKWh_to"),
    int("batteryV", "Battery Voltage (Volts) From", "BatteryV"),
    int("batteryVTo", "Battery Voltage (Volts) To", "BatteryV_to"),
    int("batteryA", "Battery Current (Amps) From", "BatteryA"),
    int("batteryATo", "Battery Current (Amps) To", "BatteryA_to"),
    int("batteryCells", "Number of Battery Cells per Module", "BatteryCells"),
    int("batteryModules", "Number of Battery Modules per Pack", "BatteryModules"),
    int("batteryPacks", "Number of Battery Packs per Vehicle", "BatteryPacks"),
    text("chargerLevel", "Charger Level", "ChargerLevel"),
    int("chargerPowerKW", "Charger Power (kW)", "ChargerPowerKW"),
    // Funciones adaptativas
    text("adaptiveCruiseControl", "Adaptive Cruise Control (ACC)", "AdaptiveCruiseControl"),
    text("adaptiveDrivingBeam", "Adaptive Driving Beam (ADB)", "AdaptiveDrivingBeam"),
    text("adaptiveHeadlights", "Adaptive Headlights", "AdaptiveHeadlights"),
    text("keylessIgnition", "Keyless Ignition", "KeylessIgnition"),
    text("wheelieMitigation", "Wheelie Mitigation", "WheelieMitigation"),
    text(
        "automaticPedestrianAlertingSound",
        "Automatic Pedestrian Alerting Sound (for Hybrid and EV only)",
        "AutomaticPedestrianAlertingSound",
    ),
    text("autoReverseSystem", "Auto-Reverse System for Windows and Sunroofs", "AutoReverseSystem"),
    text("daytimeRunningLight", "Daytime Running Light (DRL)", "DaytimeRunningLight"),
    text("lowerBeamHeadlampLightSource", "Headlamp Light Source", "LowerBeamHeadlampLightSource"),
    text(
        "semiautomaticHeadlampBeamSwitching",
        "Semiautomatic Headlamp Beam Switching",
        "SemiautomaticHeadlampBeamSwitching",
    ),
    // Planta de fabricación
    text("plantCity", "Plant City", "PlantCity"),
    text("plantState", "Plant State", "PlantState"),
    text("plantCountry", "Plant Country", "PlantCountry"),
    text("plantCompanyName", "Plant Company Name", "PlantCompanyName"),
    text("destinationMarket", "Destination Market", "DestinationMarket"),
    // Automatización SAE
    text("saeAutomationLevel", "SAE Automation Level From", "SAEAutomationLevel"),
    text("saeAutomationLevelTo", "SAE Automation Level To", "SAEAutomationLevel_to"),
    // Otros
    text("steeringLocation", "Steering Location", "SteeringLocation"),
    text("basePrice", "Base Price ($)", "BasePrice"),
    text("cashForClunkers", "Cash for Clunkers", "CashForClunkers"),
    text("ncsbBodyType", "NCSA Body Type", "NCSABodyType"),
    text("ncsaMake", "NCSA Make", "NCSAMake"),
    text("ncsaModel", "NCSA Model", "NCSAModel"),
    text("ncsbMappingException", "NCSA Mapping Exception", "NCSAMappingException"),
    text("ncsbMapExcApprovedBy", "NCSA Mapping Exception Approved By", "NCSAMapExcApprovedBy"),
    text("ncsbMapExcApprovedOn", "NCSA Mapping Exception Approved On", "NCSAMapExcApprovedOn"),
    text("ncsbNote", "NCSA Note", "NCSANote"),
    text("vehicleDescriptor", "Vehicle Descriptor", "VehicleDescriptor"),
    text("suggestedVin", "Suggested VIN", "SuggestedVIN"),
    text("possibleValues", "Possible Values", "PossibleValues"),
    text("note", "Note", "Note"),
];

/// Texto no vacío tras recortar espacios
fn clean(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Entero tolerante: texto no parseable ⇒ None
pub fn parse_int(raw: &str) -> Option<i32> {
    clean(raw)?.parse::<i32>().ok()
}

/// Decimal tolerante: texto no parseable o no finito ⇒ None
pub fn parse_float(raw: &str) -> Option<f64> {
    clean(raw)?.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn lookup<'a>(response: &'a VinDecodeResponse, source: Source) -> Option<&'a str> {
    match source {
        Source::Value(variable) => response.value_of(variable),
        Source::ValueIdOf(variable) => response
            .results
            .iter()
            .filter(|r| r.variable.as_deref() == Some(variable))
            .find_map(|r| r.value_id.as_deref()),
    }
}

fn to_json(kind: FieldKind, raw: &str) -> Option<Value> {
    match kind {
        FieldKind::Text => clean(raw).map(|s| Value::String(s.to_string())),
        FieldKind::Int => parse_int(raw).map(Value::from),
        FieldKind::Float => parse_float(raw).and_then(Number::from_f64).map(Value::Number),
    }
}

/// Normaliza una respuesta de VIN en un `Vehicle`, con marcas de tiempo actuales
pub fn normalize(response: &VinDecodeResponse, vin: &str, dialect: DecodeDialect) -> Option<Vehicle> {
    normalize_at(response, vin, dialect, Utc::now())
}

/// Igual que `normalize` con el instante de mapeo explícito.
/// Devuelve `None` si la respuesta no trae resultados.
pub fn normalize_at(
    response: &VinDecodeResponse,
    vin: &str,
    dialect: DecodeDialect,
    now: DateTime<Utc>,
) -> Option<Vehicle> {
    if response.results.is_empty() {
        debug!("📭 VIN {} decode returned no results", vin);
        return None;
    }

    let mut fields = Map::new();
    fields.insert("vin".to_string(), Value::String(vin.to_string()));

    for spec in FIELD_TABLE {
        if let Some(value) = lookup(response, spec.source(dialect)).and_then(|raw| to_json(spec.kind, raw)) {
            fields.insert(spec.field.to_string(), value);
        }
    }

    let stamp = Value::String(now.to_rfc3339());
    fields.insert("createdAt".to_string(), stamp.clone());
    fields.insert("updatedAt".to_string(), stamp);

    match serde_json::from_value::<Vehicle>(Value::Object(fields)) {
        Ok(vehicle) => Some(vehicle),
        Err(e) => {
            error!("❌ Could not build vehicle for VIN {}: {}", vin, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VinDecodeResult;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn response(pairs: &[(&str, &str)]) -> VinDecodeResponse {
        VinDecodeResponse::from_results(
            pairs
                .iter()
                .map(|(variable, value)| VinDecodeResult::new(variable, value))
                .collect(),
        )
    }

    #[test]
    fn test_every_table_field_exists_on_vehicle() {
        let json = serde_json::to_value(Vehicle::default()).unwrap();
        let object = json.as_object().unwrap();
        for spec in FIELD_TABLE {
            assert!(object.contains_key(spec.field), "unknown field {}", spec.field);
        }
    }

    #[test]
    fn test_labeled_accord() {
        let raw = response(&[
            ("Model Year", "2003"),
            ("Make", "HONDA"),
            ("Model", "Accord"),
            ("Displacement (L)", "3.0"),
            ("Engine Number of Cylinders", "6"),
            ("Engine Configuration", "V-Shaped"),
            ("Vehicle Type", "PASSENGER CAR"),
        ]);
        let vehicle = normalize_at(&raw, "1HGCM82633A004352", DecodeDialect::Labeled, at()).unwrap();

        assert_eq!(vehicle.vin, "1HGCM82633A004352");
        assert_eq!(vehicle.year, Some(2003));
        assert_eq!(vehicle.make.as_deref(), Some("HONDA"));
        assert_eq!(vehicle.model.as_deref(), Some("Accord"));
        assert_eq!(vehicle.displacement_liters, Some(3.0));
        assert_eq!(vehicle.engine_cylinders, Some(6));
        assert_eq!(vehicle.engine_configuration.as_deref(), Some("V-Shaped"));
        assert_eq!(vehicle.unit_type.as_deref(), Some("PASSENGER CAR"));
        assert_eq!(vehicle.vehicle_type.as_deref(), Some("PASSENGER CAR"));
        assert_eq!(vehicle.base_vehicle_id, None);
        assert_eq!(vehicle.created_at, Some(at()));
        assert_eq!(vehicle.updated_at, Some(at()));
    }

    #[test]
    fn test_no_results_is_none() {
        assert!(normalize(&response(&[]), "VIN", DecodeDialect::Labeled).is_none());
    }

    #[test]
    fn test_lenient_numbers_and_empty_text() {
        let raw = response(&[
            ("Model Year", "not-a-year"),
            ("Displacement (L)", "abc"),
            ("Doors", " 4 "),
            ("Trim", ""),
            ("Make", "FORD"),
        ]);
        let vehicle = normalize_at(&raw, "VIN", DecodeDialect::Labeled, at()).unwrap();
        assert_eq!(vehicle.year, None);
        assert_eq!(vehicle.displacement_liters, None);
        assert_eq!(vehicle.doors, Some(4));
        assert_eq!(vehicle.trim, None);
        assert_eq!(vehicle.make.as_deref(), Some("FORD"));
    }

    #[test]
    fn test_dialect_selects_variable_names() {
        // Los nombres del otro dialecto se ignoran
        let raw = response(&[("ModelYear", "2020"), ("Make", "RAM")]);
        let vehicle = normalize_at(&raw, "VIN", DecodeDialect::Labeled, at()).unwrap();
        assert_eq!(vehicle.year, None);
        assert_eq!(vehicle.make.as_deref(), Some("RAM"));
    }

    #[test]
    fn test_dialects_produce_identical_vehicles() {
        let sample = |spec: &FieldSpec| match spec.kind {
            FieldKind::Text => format!("value of {}", spec.field),
            FieldKind::Int => "42".to_string(),
            FieldKind::Float => "6.7".to_string(),
        };

        let mut labeled: Vec<VinDecodeResult> = Vec::new();
        let mut compact: Vec<VinDecodeResult> = Vec::new();
        for spec in FIELD_TABLE {
            let value = sample(spec);
            match spec.labeled {
                Source::Value(name) => labeled.push(VinDecodeResult::new(name, &value)),
                Source::ValueIdOf(name) => {
                    let mut carrier = VinDecodeResult::new(name, "");
                    carrier.value = None;
                    carrier.value_id = Some(value.clone());
                    labeled.push(carrier);
                }
            }
            if let Source::Value(name) = spec.compact {
                compact.push(VinDecodeResult::new(name, &value));
            }
        }

        let from_labeled = normalize_at(
            &VinDecodeResponse::from_results(labeled),
            "1FT8W3BT0NEC12345",
            DecodeDialect::Labeled,
            at(),
        )
        .unwrap();
        let from_compact = normalize_at(
            &VinDecodeResponse::from_results(compact),
            "1FT8W3BT0NEC12345",
            DecodeDialect::Compact,
            at(),
        )
        .unwrap();

        assert_eq!(from_labeled, from_compact);
        assert_eq!(from_labeled.make_id, Some(42));
        assert_eq!(from_labeled.displacement_liters, Some(6.7));
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_int("2003"), Some(2003));
        assert_eq!(parse_int("2.5"), None);
        assert_eq!(parse_int("   "), None);
        assert_eq!(parse_float("6.70"), Some(6.7));
        assert_eq!(parse_float("NaN"), None);
        assert_eq!(parse_float("inf"), None);
    }
}
