//! Shared fixture: a small two-officer district

use agrodash_core::models::Snapshot;
use agrodash_core::DataStore;
use serde_json::json;

pub fn district_snapshot() -> Snapshot {
    let value = json!({
        "admins": [
            {"_id": "a1", "name": "State Admin", "email": "admin@agro.example", "createdAt": "2025-01-01T08:00:00Z"}
        ],
        "officers": [
            {"_id": "o1", "adminId": "a1", "username": "adebayo", "firstname": "Adebayo", "lastname": "Ojo",
             "email": "adebayo@agro.example", "lga": "Iseyin", "createdAt": "2025-01-02T08:00:00Z"},
            {"_id": "o2", "adminId": "a1", "username": "ngozi", "firstname": "Ngozi", "lastname": "Eze",
             "email": "ngozi@agro.example", "lga": "Saki West", "createdAt": "2025-01-02T09:00:00Z"}
        ],
        "farmers": [
            {"_id": "f1", "officerId": "o1", "name": "Musa Bello", "nationalId": "NIN-001", "age": 52,
             "createdAt": "2025-01-05T08:00:00Z"},
            {"_id": "f2", "officerId": "o1", "name": "Amaka Obi", "nationalId": "NIN-002",
             "createdAt": "2025-01-06T08:00:00Z"},
            {"_id": "f3", "officerId": "o2", "name": "Tunde Ade", "nationalId": "NIN-003",
             "createdAt": "2025-01-07T08:00:00Z"}
        ],
        "farms": [
            {"_id": "fm1", "officerId": "o1", "farmerId": "f1", "name": "North field", "location": "Iseyin",
             "size": 4.0, "soilType": "Loam", "createdAt": "2025-01-10T08:00:00Z"},
            {"_id": "fm2", "officerId": "o1", "farmerId": "f1", "name": "River field", "location": "Iseyin",
             "createdAt": "2025-01-11T08:00:00Z"},
            {"_id": "fm3", "officerId": "o1", "farmerId": "f2", "name": "Hill plot", "location": "Okeho",
             "createdAt": "2025-01-12T08:00:00Z"},
            {"_id": "fm4", "officerId": "o2", "farmerId": "f3", "name": "Saki farm", "location": "Saki",
             "createdAt": "2025-01-13T08:00:00Z"}
        ],
        "crops": [
            {"_id": "c1", "officerId": "o1", "farmerId": "f1", "farmId": "fm1", "cropType": "Maize",
             "variety": "SAMMAZ 15", "createdAt": "2025-01-15T08:00:00Z"},
            {"_id": "c2", "officerId": "o1", "farmerId": "f1", "farmId": "fm2", "cropType": "Maize",
             "createdAt": "2025-01-20T08:00:00Z"},
            {"_id": "c3", "officerId": "o1", "farmerId": "f2", "farmId": "fm3", "cropType": "Rice",
             "createdAt": "2025-03-02T08:00:00Z"},
            {"_id": "c4", "officerId": "o2", "farmerId": "f3", "farmId": "fm4", "cropType": "Yam",
             "createdAt": "2025-06-18T08:00:00Z"}
        ],
        "livestock": [
            {"_id": "l1", "officerId": "o1", "farmerId": "f1", "farmId": "fm1", "type": "Goat", "count": 14,
             "createdAt": "2025-02-03T08:00:00Z"},
            {"_id": "l2", "officerId": "o2", "farmerId": "f3", "farmId": "fm4", "type": "Poultry", "count": 300,
             "createdAt": "2025-02-04T08:00:00Z"}
        ],
        "agroAllieds": [
            {"_id": "g1", "officerId": "o2", "farmerId": "f3", "farmId": "fm4", "season": "Dry",
             "businessType": "Processing", "primaryProduct": "Garri", "productionCapacity": 50,
             "createdAt": "2025-04-01T08:00:00Z"}
        ]
    });
    serde_json::from_value(value).expect("fixture snapshot is valid")
}

pub fn district_store() -> DataStore {
    let store = DataStore::with_defaults();
    let report = store.load_snapshot(district_snapshot());
    assert!(!report.has_errors(), "fixture loads cleanly: {:?}", report.errors);
    store
}
