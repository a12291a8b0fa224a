mod common;

use common::{test_app, ACCORD_VIN};
use unit_service::services::UnitChanges;
use unit_service::utils::errors::AppError;

#[tokio::test]
async fn test_create_from_vin_end_to_end() {
    let app = test_app();

    let unit = app
        .state
        .units
        .create_unit_from_vin("cust-1", ACCORD_VIN)
        .await
        .unwrap();

    assert!(unit.unit_id().unwrap().starts_with("unt_"));
    assert_eq!(unit.customer_id(), Some("cust-1"));
    assert_eq!(unit.vin(), Some(ACCORD_VIN));
    assert_eq!(unit.year(), Some(2003));
    assert_eq!(unit.make(), Some("HONDA"));
    assert_eq!(unit.model(), Some("Accord"));
    assert_eq!(unit.base_vehicle_id(), Some(5911));
    assert_eq!(unit.engine_base_id(), Some(1023));

    assert_eq!(app.store.count_with_prefix("VIN#"), 1);
    assert_eq!(app.store.count_with_prefix("UNT#"), 1);
    assert_eq!(app.store.put_calls(), 2);
}

#[tokio::test]
async fn test_second_customer_same_vin_gets_new_unit() {
    let app = test_app();
    let units = &app.state.units;

    let first = units.create_unit_from_vin("cust-1", ACCORD_VIN).await.unwrap();
    let second = units.create_unit_from_vin("cust-2", ACCORD_VIN).await.unwrap();

    assert_ne!(first.unit_id(), second.unit_id());
    assert_eq!(second.customer_id(), Some("cust-2"));
    assert_eq!(second.make(), Some("HONDA"));
    assert_eq!(app.store.count_with_prefix("VIN#"), 1);
    assert_eq!(app.store.count_with_prefix("UNT#"), 2);
    assert_eq!(app.decoder.calls(), 1);

    let sharing = units.get_units_by_vin(ACCORD_VIN).await.unwrap();
    assert_eq!(sharing.len(), 2);
}

#[tokio::test]
async fn test_duplicate_pair_is_rejected() {
    let app = test_app();
    let units = &app.state.units;

    units.create_unit_from_vin("cust-1", ACCORD_VIN).await.unwrap();
    let err = units
        .create_unit_from_vin("cust-1", ACCORD_VIN)
        .await
        .unwrap_err();

    match err {
        AppError::DuplicateVin { customer_id, vin } => {
            assert_eq!(customer_id, "cust-1");
            assert_eq!(vin, ACCORD_VIN);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_batch_read_enriches_each_unit() {
    let app = test_app();
    let units = &app.state.units;

    units.create_unit_from_vin("cust-1", ACCORD_VIN).await.unwrap();
    units.create_unit("cust-1", "NOSPEC00001", None, None).await.unwrap();
    units.create_unit("cust-1", "NOSPEC00002", None, None).await.unwrap();

    let listed = units.get_units_by_customer("cust-1").await.unwrap();
    assert_eq!(listed.len(), 3);

    let with_vehicle: Vec<_> = listed.iter().filter(|u| u.make().is_some()).collect();
    assert_eq!(with_vehicle.len(), 1);
    assert_eq!(with_vehicle[0].vin(), Some(ACCORD_VIN));
}

#[tokio::test]
async fn test_update_then_delete_keeps_vehicle() {
    let app = test_app();
    let units = &app.state.units;

    let unit = units.create_unit_from_vin("cust-1", ACCORD_VIN).await.unwrap();
    let id = unit.unit_id().unwrap().to_string();

    let moved = units
        .update_unit(
            &id,
            UnitChanges {
                customer_id: Some("cust-9".to_string()),
                ..UnitChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.customer_id(), Some("cust-9"));
    assert_eq!(moved.make(), Some("HONDA"));
    assert!(units.get_units_by_customer("cust-1").await.unwrap().is_empty());

    units.delete_unit(&id).await.unwrap();
    assert!(matches!(
        units.get_unit(&id).await.unwrap_err(),
        AppError::UnitNotFound(_)
    ));
    assert_eq!(app.store.count_with_prefix("VIN#"), 1);
}
