//! End-to-end: snapshot file -> store -> analytics -> JSON

mod common;

use agrodash_core::analytics::AnalyticsEngine;
use agrodash_core::models::{ReportSections, Scope};
use agrodash_core::{
    export_report_to_json, CoreError, DataEvent, DataStore, EngineConfig, EntityStore,
    SnapshotParser,
};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn engine() -> AnalyticsEngine<DataStore> {
    AnalyticsEngine::new(Arc::new(common::district_store()), EngineConfig::default())
}

#[tokio::test]
async fn test_snapshot_file_round_trip_through_engine() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("district.json");
    std::fs::write(
        &path,
        serde_json::to_string(&common::district_snapshot()).unwrap(),
    )
    .unwrap();

    let store = DataStore::with_defaults();
    let mut events = store.event_bus().subscribe();
    let report = SnapshotParser::new().load_into(&path, &store).await;

    assert!(report.snapshot_loaded);
    assert_eq!(report.records_loaded, 17);
    assert!(store.degraded_state().is_healthy());
    assert_eq!(
        events.recv().await.unwrap(),
        DataEvent::SnapshotLoaded { records: 17 }
    );

    let engine = AnalyticsEngine::new(Arc::new(store), EngineConfig::default());
    let global = engine.compute_global_analytics().await;
    assert!(global.is_complete());
}

#[tokio::test]
async fn test_global_report_json_shape() {
    let report = engine().compute_global_analytics().await;

    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(
        value["metrics"],
        json!({
            "totalOfficers": 2,
            "totalFarmers": 3,
            "totalFarms": 4,
            "totalCrops": 4,
            "totalLivestock": 2,
            "totalAllied": 1
        })
    );
    assert_eq!(
        value["analytics"]["cropTypes"],
        json!([
            {"type": "Maize", "value": 2},
            {"type": "Rice", "value": 1},
            {"type": "Yam", "value": 1}
        ])
    );
    assert_eq!(
        value["analytics"]["monthlyCrops"],
        json!([
            {"month": 1, "value": 2},
            {"month": 3, "value": 1},
            {"month": 6, "value": 1}
        ])
    );
    assert_eq!(
        value["analytics"]["officerPerformance"][0],
        json!({
            "id": "o1",
            "name": "Adebayo Ojo",
            "username": "adebayo",
            "email": "adebayo@agro.example",
            "farmers": 2,
            "farms": 3,
            "crops": 3,
            "livestock": 1,
            "allied": 0
        })
    );
}

#[tokio::test]
async fn test_officer_report_json_shape() {
    let report = engine().compute_officer_analytics("o1").await.unwrap();

    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["officer"]["username"], "adebayo");
    assert_eq!(value["farmers"].as_array().unwrap().len(), 2);
    assert_eq!(value["agroAllieds"], json!([]));
    assert_eq!(
        value["metrics"],
        json!({
            "totalFarmers": 2,
            "totalFarms": 3,
            "totalCrops": 3,
            "totalLivestock": 1,
            "totalAllied": 0
        })
    );
    assert_eq!(
        value["analytics"]["farmsPerFarmer"],
        json!([
            {"farmerId": "f2", "farmer": "Amaka Obi", "farms": 1},
            {"farmerId": "f1", "farmer": "Musa Bello", "farms": 2}
        ])
    );
    assert_eq!(value["analytics"]["alliedTypes"], json!([]));
}

#[tokio::test]
async fn test_unknown_officer_is_not_found() {
    let err = engine()
        .compute_officer_analytics("nonexistent-id")
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::NotFound { .. }));
    assert_eq!(err.to_string(), "Officer not found: nonexistent-id");
}

#[tokio::test]
async fn test_officer_performance_sums_to_global_metrics() {
    let engine = engine();

    let report = engine.compute_global_analytics().await;
    let rows = report.analytics.officer_performance.ready().unwrap();
    let metrics = report.metrics.ready().unwrap();

    assert_eq!(
        Some(rows.iter().map(|r| r.farms).sum::<u64>()),
        metrics.total_farms
    );
    assert_eq!(
        Some(rows.iter().map(|r| r.crops).sum::<u64>()),
        metrics.total_crops
    );
    assert_eq!(
        Some(rows.iter().map(|r| r.allied).sum::<u64>()),
        metrics.total_allied
    );
}

#[tokio::test]
async fn test_farm_details_for_each_farm_match_scoped_counts() {
    let engine = engine();
    let farms = engine
        .store()
        .find::<agrodash_core::models::Farm>(&Scope::Global)
        .await
        .unwrap();

    for farm in farms {
        let report = engine.compute_farm_details(farm.id.as_str()).await.unwrap();
        let metrics = report.metrics.ready().unwrap();
        assert_eq!(
            metrics.total_crops,
            Some(report.crops.ready().unwrap().len() as u64)
        );
        assert!(report.farmer.ready().unwrap().is_some());
    }
}

#[tokio::test]
async fn test_export_report_to_json_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("exports/farmer-f1.json");

    let report = engine().compute_farmer_details("f1").await.unwrap();
    export_report_to_json(&report, &path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["farmer"]["name"], "Musa Bello");
    assert_eq!(value["metrics"]["totalFarms"], 2);
}
