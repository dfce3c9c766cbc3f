//! Entity store: persistence contract + in-memory implementation
//!
//! [`EntityStore`] is the read contract the analytics engine consumes.
//! [`DataStore`] implements it over one DashMap per collection and adds the
//! write side (insert / partial update / delete) with explicit precondition
//! checks performed before anything is persisted.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analytics::{distribution, trends};
use crate::error::{CoreError, DegradedState, LoadError, LoadReport};
use crate::event::{DataEvent, EventBus};
use crate::models::{
    Admin, AgroAllied, AgroAlliedPatch, Categorized, Crop, CropPatch, EntityKind, Farm, FarmPatch,
    Farmer, FarmerPatch, Livestock, LivestockPatch, MonthCount, Officer, OfficerPatch, Record,
    Scope, Snapshot, TypeCount,
};

/// One collection, keyed by record id
/// Arc<R> for cheap cloning out of the map
pub type Collection<R> = DashMap<String, Arc<R>>;

/// All collections of the in-memory store
#[derive(Default)]
pub struct Collections {
    pub(crate) admins: Collection<Admin>,
    pub(crate) officers: Collection<Officer>,
    pub(crate) farmers: Collection<Farmer>,
    pub(crate) farms: Collection<Farm>,
    pub(crate) crops: Collection<Crop>,
    pub(crate) livestock: Collection<Livestock>,
    pub(crate) agro_allieds: Collection<AgroAllied>,
}

/// Read contract of the persistence collaborator
///
/// `count`, `find_by_ids`, `group_by` and `group_by_month` default to
/// in-memory aggregation over `find`; a database-backed store overrides
/// them with native aggregations.
pub trait EntityStore: Send + Sync {
    /// Records inside `scope`, in natural order (creation time, then id)
    fn find<R: Record>(
        &self,
        scope: &Scope,
    ) -> impl Future<Output = Result<Vec<Arc<R>>, CoreError>> + Send;

    /// Fails with `NotFound` when `id` does not resolve
    fn find_by_id<R: Record>(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Arc<R>, CoreError>> + Send;

    /// Records whose id is in `ids`; unknown ids are skipped
    fn find_by_ids<R: Record>(
        &self,
        ids: &[&str],
    ) -> impl Future<Output = Result<Vec<Arc<R>>, CoreError>> + Send {
        async move {
            let wanted: HashSet<&str> = ids.iter().copied().collect();
            let records = self.find::<R>(&Scope::Global).await?;
            Ok(records
                .into_iter()
                .filter(|record| wanted.contains(record.id()))
                .collect())
        }
    }

    fn count<R: Record>(&self, scope: &Scope) -> impl Future<Output = Result<u64, CoreError>> + Send {
        async move { Ok(self.find::<R>(scope).await?.len() as u64) }
    }

    /// Count per category value
    fn group_by<R: Categorized>(
        &self,
        scope: &Scope,
    ) -> impl Future<Output = Result<Vec<TypeCount>, CoreError>> + Send {
        async move {
            let records = self.find::<R>(scope).await?;
            Ok(distribution::type_distribution(&records))
        }
    }

    /// Count per creation month (UTC), sparse
    fn group_by_month<R: Record>(
        &self,
        scope: &Scope,
    ) -> impl Future<Output = Result<Vec<MonthCount>, CoreError>> + Send {
        async move {
            let records = self.find::<R>(scope).await?;
            Ok(trends::monthly_trend(&records))
        }
    }
}

/// Configuration for the data store
#[derive(Debug, Clone)]
pub struct DataStoreConfig {
    /// Reject inserts whose foreign keys do not resolve
    pub enforce_references: bool,

    /// Event bus channel capacity
    pub event_capacity: usize,
}

impl Default for DataStoreConfig {
    fn default() -> Self {
        Self {
            enforce_references: true,
            event_capacity: 256,
        }
    }
}

/// Precondition failure found before persisting a record
#[derive(Debug, Clone, PartialEq, Eq)]
enum Violation {
    /// Id already taken; the record can never be stored
    DuplicateId,
    /// Required field empty or unique field taken
    Schema(String),
    /// Foreign key does not resolve
    Reference(String),
}

impl Violation {
    fn message(&self, kind: EntityKind, id: &str) -> String {
        match self {
            Violation::DuplicateId => format!("{} id '{}' already exists", kind, id),
            Violation::Schema(message) | Violation::Reference(message) => message.clone(),
        }
    }
}

fn required(field: &str, value: &str, violations: &mut Vec<Violation>) {
    if value.trim().is_empty() {
        violations.push(Violation::Schema(format!("{} is required", field)));
    }
}

/// Central in-memory entity store
///
/// Thread-safe: DashMap per collection (per-entry locking), parking_lot
/// RwLock for the low-contention degraded state.
pub struct DataStore {
    config: DataStoreConfig,

    pub(crate) collections: Collections,

    /// Event bus for notifying subscribers
    event_bus: EventBus,

    /// Current degraded state
    degraded_state: RwLock<DegradedState>,
}

impl DataStore {
    /// Create a new, empty data store
    pub fn new(config: DataStoreConfig) -> Self {
        let event_bus = EventBus::new(config.event_capacity);
        Self {
            config,
            collections: Collections::default(),
            event_bus,
            degraded_state: RwLock::new(DegradedState::Healthy),
        }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(DataStoreConfig::default())
    }

    /// Get the event bus for subscribing to updates
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Get current degraded state
    pub fn degraded_state(&self) -> DegradedState {
        self.degraded_state.read().clone()
    }

    /// Total records across all collections
    pub fn record_count(&self) -> usize {
        let c = &self.collections;
        c.admins.len()
            + c.officers.len()
            + c.farmers.len()
            + c.farms.len()
            + c.crops.len()
            + c.livestock.len()
            + c.agro_allieds.len()
    }

    // ===================
    // Snapshot loading
    // ===================

    /// Load every collection of `snapshot`, parents before children
    ///
    /// Duplicate ids are rejected. Missing required fields and dangling
    /// references are kept and reported as warnings.
    pub fn load_snapshot(&self, snapshot: Snapshot) -> LoadReport {
        let mut report = LoadReport::new();
        let total = snapshot.record_count();

        info!(records = total, "Loading snapshot");

        for admin in snapshot.admins {
            let violations = self.check_admin(&admin);
            self.load_one(admin, violations, &mut report);
        }
        for officer in snapshot.officers {
            let violations = self.check_officer(&officer, false);
            self.load_one(officer, violations, &mut report);
        }
        for farmer in snapshot.farmers {
            let violations = self.check_farmer(&farmer, false);
            self.load_one(farmer, violations, &mut report);
        }
        for farm in snapshot.farms {
            let violations = self.check_farm(&farm);
            self.load_one(farm, violations, &mut report);
        }
        for crop in snapshot.crops {
            let violations = self.check_farm_child(&crop);
            self.load_one(crop, violations, &mut report);
        }
        for livestock in snapshot.livestock {
            let violations = self.check_farm_child(&livestock);
            self.load_one(livestock, violations, &mut report);
        }
        for allied in snapshot.agro_allieds {
            let mut violations = self.check_farm_child(&allied);
            required("season", &allied.season, &mut violations);
            required("primaryProduct", &allied.primary_product, &mut violations);
            self.load_one(allied, violations, &mut report);
        }

        report.snapshot_loaded = true;
        self.update_degraded_state(&report);
        self.event_bus.publish(DataEvent::SnapshotLoaded {
            records: report.records_loaded,
        });

        info!(
            loaded = report.records_loaded,
            rejected = report.records_rejected,
            warnings = report.warnings().count(),
            "Snapshot load complete"
        );

        report
    }

    fn load_one<R: Record>(&self, record: R, violations: Vec<Violation>, report: &mut LoadReport) {
        let source = R::KIND.collection_name();
        if violations.contains(&Violation::DuplicateId) {
            report.records_rejected += 1;
            report.add_error(LoadError::error(
                source,
                Violation::DuplicateId.message(R::KIND, record.id()),
            ));
            return;
        }
        for violation in &violations {
            report.add_warning(
                source,
                format!("{} {}: {}", R::KIND, record.id(), violation.message(R::KIND, record.id())),
            );
        }
        R::collection(&self.collections).insert(record.id().to_string(), Arc::new(record));
        report.records_loaded += 1;
    }

    /// Update degraded state based on load report
    fn update_degraded_state(&self, report: &LoadReport) {
        let mut state = self.degraded_state.write();

        let mut missing = Vec::new();
        if report.records_rejected > 0 {
            missing.push(format!("{} rejected records", report.records_rejected));
        }
        let warnings = report.warnings().count();
        if warnings > 0 {
            missing.push(format!("{} inconsistent records", warnings));
        }

        if missing.is_empty() {
            *state = DegradedState::Healthy;
        } else {
            *state = DegradedState::PartialData {
                reason: format!("Snapshot issues: {}", missing.join(", ")),
                missing,
            };
        }
    }

    // ===================
    // Precondition checks
    // ===================

    fn exists<R: Record>(&self, id: &str) -> bool {
        R::collection(&self.collections).contains_key(id)
    }

    fn check_id<R: Record>(&self, record: &R, violations: &mut Vec<Violation>) {
        required("id", record.id(), violations);
        if self.exists::<R>(record.id()) {
            violations.push(Violation::DuplicateId);
        }
    }

    fn check_reference<P: Record>(&self, field: &str, id: &str, violations: &mut Vec<Violation>) {
        if !self.exists::<P>(id) {
            violations.push(Violation::Reference(format!(
                "{} '{}' does not resolve to a {}",
                field,
                id,
                P::KIND
            )));
        }
    }

    fn check_admin(&self, admin: &Admin) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.check_id(admin, &mut violations);
        required("name", &admin.name, &mut violations);
        required("email", &admin.email, &mut violations);
        violations
    }

    fn check_officer(&self, officer: &Officer, updating: bool) -> Vec<Violation> {
        let mut violations = Vec::new();
        if !updating {
            self.check_id(officer, &mut violations);
            self.check_reference::<Admin>("adminId", &officer.admin_id, &mut violations);
        }
        required("username", &officer.username, &mut violations);
        required("firstname", &officer.firstname, &mut violations);
        required("lastname", &officer.lastname, &mut violations);
        required("email", &officer.email, &mut violations);
        let email_taken = self.collections.officers.iter().any(|entry| {
            entry.key() != officer.id.as_str() && entry.value().email == officer.email
        });
        if email_taken {
            violations.push(Violation::Schema(format!(
                "email '{}' already registered",
                officer.email
            )));
        }
        violations
    }

    fn check_farmer(&self, farmer: &Farmer, updating: bool) -> Vec<Violation> {
        let mut violations = Vec::new();
        if !updating {
            self.check_id(farmer, &mut violations);
            self.check_reference::<Officer>("officerId", &farmer.officer_id, &mut violations);
        }
        required("name", &farmer.name, &mut violations);
        required("nationalId", &farmer.national_id, &mut violations);
        let national_id_taken = self.collections.farmers.iter().any(|entry| {
            entry.key() != farmer.id.as_str() && entry.value().national_id == farmer.national_id
        });
        if national_id_taken {
            violations.push(Violation::Schema(format!(
                "nationalId '{}' already registered",
                farmer.national_id
            )));
        }
        violations
    }

    fn check_farm(&self, farm: &Farm) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.check_id(farm, &mut violations);
        required("name", &farm.name, &mut violations);
        required("location", &farm.location, &mut violations);
        self.check_reference::<Officer>("officerId", &farm.officer_id, &mut violations);
        self.check_reference::<Farmer>("farmerId", &farm.farmer_id, &mut violations);
        if let Some(farmer) = self.collections.farmers.get(farm.farmer_id.as_str()) {
            if farmer.officer_id != farm.officer_id {
                violations.push(Violation::Reference(format!(
                    "farmer '{}' belongs to officer '{}', not '{}'",
                    farm.farmer_id, farmer.officer_id, farm.officer_id
                )));
            }
        }
        violations
    }

    /// Checks shared by crops, livestock and agro-allied records
    fn check_farm_child<R: Categorized>(&self, record: &R) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.check_id(record, &mut violations);
        if record.category().is_none_or(|c| c.trim().is_empty()) {
            violations.push(Violation::Schema(format!(
                "{} is required",
                R::CATEGORY_FIELD
            )));
        }
        let owner = record.ownership();
        if let (Some(officer_id), Some(farmer_id), Some(farm_id)) =
            (owner.officer_id, owner.farmer_id, owner.farm_id)
        {
            self.check_reference::<Officer>("officerId", officer_id, &mut violations);
            self.check_reference::<Farmer>("farmerId", farmer_id, &mut violations);
            match self.collections.farms.get(farm_id.as_str()) {
                Some(farm) => {
                    if &farm.farmer_id != farmer_id || &farm.officer_id != officer_id {
                        violations.push(Violation::Reference(format!(
                            "farm '{}' is owned by farmer '{}' / officer '{}'",
                            farm_id, farm.farmer_id, farm.officer_id
                        )));
                    }
                }
                None => self.check_reference::<Farm>("farmId", farm_id, &mut violations),
            }
        }
        violations
    }

    // ===================
    // Write side
    // ===================

    fn commit<R: Record>(&self, record: R, violations: Vec<Violation>) -> Result<Arc<R>, CoreError> {
        let blocking = violations.iter().find(|v| match v {
            Violation::Reference(_) => self.config.enforce_references,
            _ => true,
        });
        if let Some(violation) = blocking {
            let message = violation.message(R::KIND, record.id());
            warn!(kind = %R::KIND, id = record.id(), %message, "Insert rejected");
            return Err(CoreError::constraint(R::KIND, message));
        }

        let id = record.id().to_string();
        let record = Arc::new(record);
        // The id check above is advisory; the entry lock decides the race
        match R::collection(&self.collections).entry(id.clone()) {
            Entry::Occupied(_) => {
                let message = Violation::DuplicateId.message(R::KIND, &id);
                warn!(kind = %R::KIND, %id, %message, "Insert rejected");
                return Err(CoreError::constraint(R::KIND, message));
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&record));
            }
        }
        debug!(kind = %R::KIND, %id, "Record created");
        self.event_bus.publish(DataEvent::RecordCreated { kind: R::KIND, id });
        Ok(record)
    }

    pub fn insert_admin(&self, admin: Admin) -> Result<Arc<Admin>, CoreError> {
        let violations = self.check_admin(&admin);
        self.commit(admin, violations)
    }

    pub fn insert_officer(&self, officer: Officer) -> Result<Arc<Officer>, CoreError> {
        let violations = self.check_officer(&officer, false);
        self.commit(officer, violations)
    }

    pub fn insert_farmer(&self, farmer: Farmer) -> Result<Arc<Farmer>, CoreError> {
        let violations = self.check_farmer(&farmer, false);
        self.commit(farmer, violations)
    }

    pub fn insert_farm(&self, farm: Farm) -> Result<Arc<Farm>, CoreError> {
        let violations = self.check_farm(&farm);
        self.commit(farm, violations)
    }

    pub fn insert_crop(&self, crop: Crop) -> Result<Arc<Crop>, CoreError> {
        let violations = self.check_farm_child(&crop);
        self.commit(crop, violations)
    }

    pub fn insert_livestock(&self, livestock: Livestock) -> Result<Arc<Livestock>, CoreError> {
        let violations = self.check_farm_child(&livestock);
        self.commit(livestock, violations)
    }

    pub fn insert_agro_allied(&self, allied: AgroAllied) -> Result<Arc<AgroAllied>, CoreError> {
        let mut violations = self.check_farm_child(&allied);
        required("season", &allied.season, &mut violations);
        required("primaryProduct", &allied.primary_product, &mut violations);
        self.commit(allied, violations)
    }

    /// Apply `patch` to a copy, validate it with `check`, then swap it in
    ///
    /// Concurrent updates of the same record are last-writer-wins.
    fn update_with<R: Record>(
        &self,
        id: &str,
        patch: impl FnOnce(&mut R),
        check: impl FnOnce(&Self, &R) -> Vec<Violation>,
    ) -> Result<Arc<R>, CoreError> {
        let current = R::collection(&self.collections)
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| CoreError::not_found(R::KIND, id))?;

        let mut updated = current.as_ref().clone();
        patch(&mut updated);

        if let Some(violation) = check(self, &updated).first() {
            return Err(CoreError::constraint(R::KIND, violation.message(R::KIND, id)));
        }

        let updated = Arc::new(updated);
        {
            // Swap only if the record is still there; a concurrent delete wins
            let mut entry = R::collection(&self.collections)
                .get_mut(id)
                .ok_or_else(|| CoreError::not_found(R::KIND, id))?;
            *entry.value_mut() = Arc::clone(&updated);
        }
        debug!(kind = %R::KIND, id, "Record updated");
        self.event_bus.publish(DataEvent::RecordUpdated {
            kind: R::KIND,
            id: id.to_string(),
        });
        Ok(updated)
    }

    pub fn update_officer(&self, id: &str, patch: &OfficerPatch) -> Result<Arc<Officer>, CoreError> {
        self.update_with(id, |o| patch.apply(o), |s, o| s.check_officer(o, true))
    }

    pub fn update_farmer(&self, id: &str, patch: &FarmerPatch) -> Result<Arc<Farmer>, CoreError> {
        self.update_with(id, |f| patch.apply(f), |s, f| s.check_farmer(f, true))
    }

    pub fn update_farm(&self, id: &str, patch: &FarmPatch) -> Result<Arc<Farm>, CoreError> {
        self.update_with(
            id,
            |f| patch.apply(f),
            |_, f| {
                let mut violations = Vec::new();
                required("name", &f.name, &mut violations);
                required("location", &f.location, &mut violations);
                violations
            },
        )
    }

    pub fn update_crop(&self, id: &str, patch: &CropPatch) -> Result<Arc<Crop>, CoreError> {
        self.update_with(id, |c| patch.apply(c), |_, _| Vec::new())
    }

    pub fn update_livestock(
        &self,
        id: &str,
        patch: &LivestockPatch,
    ) -> Result<Arc<Livestock>, CoreError> {
        self.update_with(id, |l| patch.apply(l), |_, _| Vec::new())
    }

    pub fn update_agro_allied(
        &self,
        id: &str,
        patch: &AgroAlliedPatch,
    ) -> Result<Arc<AgroAllied>, CoreError> {
        self.update_with(
            id,
            |a| patch.apply(a),
            |_, a| {
                let mut violations = Vec::new();
                required("season", &a.season, &mut violations);
                required("primaryProduct", &a.primary_product, &mut violations);
                violations
            },
        )
    }

    /// Delete by id; children are not cascaded
    pub fn delete<R: Record>(&self, id: &str) -> Result<Arc<R>, CoreError> {
        let (_, removed) = R::collection(&self.collections)
            .remove(id)
            .ok_or_else(|| CoreError::not_found(R::KIND, id))?;
        debug!(kind = %R::KIND, id, "Record deleted");
        self.event_bus.publish(DataEvent::RecordDeleted {
            kind: R::KIND,
            id: id.to_string(),
        });
        Ok(removed)
    }
}

/// Natural order: creation time, then id
fn sort_natural<R: Record>(records: &mut [Arc<R>]) {
    records.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(b.id()))
    });
}

impl EntityStore for DataStore {
    async fn find<R: Record>(&self, scope: &Scope) -> Result<Vec<Arc<R>>, CoreError> {
        let mut records: Vec<Arc<R>> = R::collection(&self.collections)
            .iter()
            .filter(|entry| entry.value().in_scope(scope))
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        sort_natural(&mut records);
        debug!(kind = %R::KIND, %scope, count = records.len(), "find");
        Ok(records)
    }

    async fn find_by_id<R: Record>(&self, id: &str) -> Result<Arc<R>, CoreError> {
        R::collection(&self.collections)
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| CoreError::not_found(R::KIND, id))
    }

    async fn find_by_ids<R: Record>(&self, ids: &[&str]) -> Result<Vec<Arc<R>>, CoreError> {
        let collection = R::collection(&self.collections);
        let mut seen = HashSet::new();
        let mut records: Vec<Arc<R>> = ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| collection.get(*id).map(|entry| Arc::clone(entry.value())))
            .collect();
        sort_natural(&mut records);
        Ok(records)
    }

    async fn count<R: Record>(&self, scope: &Scope) -> Result<u64, CoreError> {
        let count = R::collection(&self.collections)
            .iter()
            .filter(|entry| entry.value().in_scope(scope))
            .count();
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdminId, FarmId, FarmerId, OfficerId, RecordId};
    use chrono::{TimeZone, Utc};

    fn seeded() -> DataStore {
        let store = DataStore::with_defaults();
        let at = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        store
            .insert_admin(Admin {
                id: AdminId::from("a1"),
                name: "Root".to_string(),
                email: "root@example.com".to_string(),
                created_at: at,
            })
            .unwrap();
        store
            .insert_officer(Officer {
                id: OfficerId::from("o1"),
                admin_id: AdminId::from("a1"),
                username: "ade".to_string(),
                firstname: "Ade".to_string(),
                lastname: "Bello".to_string(),
                email: "ade@example.com".to_string(),
                phone: None,
                address: None,
                lga: None,
                created_at: at,
            })
            .unwrap();
        store
            .insert_farmer(Farmer {
                id: FarmerId::from("f1"),
                officer_id: OfficerId::from("o1"),
                name: "Kemi".to_string(),
                national_id: "NIN-1".to_string(),
                phone: None,
                address: None,
                house_hold: None,
                age: None,
                lga: None,
                email: None,
                created_at: at,
            })
            .unwrap();
        store
            .insert_farm(Farm {
                id: FarmId::from("fm1"),
                officer_id: OfficerId::from("o1"),
                farmer_id: FarmerId::from("f1"),
                name: "River plot".to_string(),
                location: "Iseyin".to_string(),
                size: Some(2.5),
                soil_type: None,
                created_at: at,
            })
            .unwrap();
        store
    }

    fn crop(id: &str, crop_type: Option<&str>) -> Crop {
        Crop {
            id: RecordId::from(id),
            officer_id: OfficerId::from("o1"),
            farmer_id: FarmerId::from("f1"),
            farm_id: FarmId::from("fm1"),
            crop_type: crop_type.map(str::to_string),
            variety: None,
            planting_date: None,
            harvest_date: None,
            area_planted: None,
            created_at: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_data_store_creation() {
        let store = DataStore::with_defaults();
        assert_eq!(store.record_count(), 0);
        assert!(store.degraded_state().is_healthy());
        assert_eq!(store.count::<Officer>(&Scope::Global).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_and_find_scoped() {
        let store = seeded();
        store.insert_crop(crop("c1", Some("Maize"))).unwrap();

        let crops = store
            .find::<Crop>(&Scope::Officer("o1".into()))
            .await
            .unwrap();
        assert_eq!(crops.len(), 1);
        assert!(store
            .find::<Crop>(&Scope::Officer("o2".into()))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let store = seeded();
        let err = store.find_by_id::<Officer>("missing").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::NotFound { kind: EntityKind::Officer, ref id } if id == "missing"
        ));
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let store = seeded();
        store.insert_crop(crop("c1", Some("Maize"))).unwrap();
        let err = store.insert_crop(crop("c1", Some("Rice"))).unwrap_err();
        assert!(matches!(err, CoreError::ConstraintViolation { .. }));
    }

    #[test]
    fn test_insert_rejects_missing_category() {
        let store = seeded();
        let err = store.insert_crop(crop("c2", None)).unwrap_err();
        assert!(err.to_string().contains("cropType is required"));
    }

    #[test]
    fn test_insert_rejects_dangling_farm() {
        let store = seeded();
        let mut orphan = crop("c3", Some("Yam"));
        orphan.farm_id = FarmId::from("nowhere");
        let err = store.insert_crop(orphan).unwrap_err();
        assert!(err.to_string().contains("farmId"));
    }

    #[test]
    fn test_lenient_references_allow_dangling_farm() {
        let store = DataStore::new(DataStoreConfig {
            enforce_references: false,
            ..Default::default()
        });
        let orphan = crop("c3", Some("Yam"));
        assert!(store.insert_crop(orphan).is_ok());
    }

    #[test]
    fn test_unique_national_id() {
        let store = seeded();
        let mut twin = Farmer::clone(&store.collections.farmers.get("f1").unwrap());
        twin.id = FarmerId::from("f2");
        let err = store.insert_farmer(twin).unwrap_err();
        assert!(err.to_string().contains("nationalId"));
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let store = seeded();
        let updated = store
            .update_officer(
                "o1",
                &OfficerPatch {
                    phone: Some("0803".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.phone.as_deref(), Some("0803"));
        assert_eq!(updated.email, "ade@example.com");
    }

    #[test]
    fn test_update_rejects_blank_required_field() {
        let store = seeded();
        let err = store
            .update_farm(
                "fm1",
                &FarmPatch {
                    name: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::ConstraintViolation { kind: EntityKind::Farm, .. }));
    }

    #[tokio::test]
    async fn test_mutations_publish_events() {
        let store = seeded();
        let mut rx = store.event_bus().subscribe();

        store.insert_crop(crop("c1", Some("Maize"))).unwrap();
        store.delete::<Crop>("c1").unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            DataEvent::RecordCreated {
                kind: EntityKind::Crop,
                id: "c1".to_string()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            DataEvent::RecordDeleted {
                kind: EntityKind::Crop,
                id: "c1".to_string()
            }
        );
    }

    #[test]
    fn test_concurrent_duplicate_inserts_admit_one() {
        use std::sync::Barrier;

        let store = Arc::new(seeded());
        for round in 0..200 {
            let id = format!("dup-{}", round);
            let barrier = Arc::new(Barrier::new(2));
            let handles: Vec<_> = ["Maize", "Rice"]
                .into_iter()
                .map(|crop_type| {
                    let store = Arc::clone(&store);
                    let barrier = Arc::clone(&barrier);
                    let record = crop(&id, Some(crop_type));
                    std::thread::spawn(move || {
                        barrier.wait();
                        store.insert_crop(record).is_ok()
                    })
                })
                .collect();

            let admitted = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|ok| *ok)
                .count();
            assert_eq!(admitted, 1, "round {}", round);
        }
        assert_eq!(store.collections.crops.len(), 200);
    }

    #[test]
    fn test_update_does_not_resurrect_deleted_record() {
        use std::sync::Barrier;

        let store = Arc::new(seeded());
        for round in 0..200 {
            let id = format!("c-{}", round);
            store.insert_crop(crop(&id, Some("Maize"))).unwrap();
            let barrier = Arc::new(Barrier::new(2));

            let deleter = {
                let (store, barrier, id) = (Arc::clone(&store), Arc::clone(&barrier), id.clone());
                std::thread::spawn(move || {
                    barrier.wait();
                    store.delete::<Crop>(&id).is_ok()
                })
            };
            let updater = {
                let (store, barrier, id) = (Arc::clone(&store), Arc::clone(&barrier), id.clone());
                std::thread::spawn(move || {
                    let patch = CropPatch {
                        variety: Some("Oba Super 2".to_string()),
                        ..Default::default()
                    };
                    barrier.wait();
                    match store.update_crop(&id, &patch) {
                        Ok(_) => true,
                        Err(e) => {
                            assert!(e.is_not_found(), "{}", e);
                            false
                        }
                    }
                })
            };

            assert!(deleter.join().unwrap());
            updater.join().unwrap();
            assert!(!store.collections.crops.contains_key(&id), "round {}", round);
        }
    }

    #[test]
    fn test_update_after_delete_is_not_found() {
        let store = seeded();
        store.insert_crop(crop("c1", Some("Maize"))).unwrap();
        store.delete::<Crop>("c1").unwrap();

        let err = store.update_crop("c1", &CropPatch::default()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let store = seeded();
        assert!(store.delete::<Farm>("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_snapshot_load_warns_on_dangling_reference() {
        let store = DataStore::with_defaults();
        let snapshot = Snapshot {
            crops: vec![crop("c1", Some("Maize")), crop("c1", Some("Rice"))],
            ..Default::default()
        };

        let report = store.load_snapshot(snapshot);

        assert!(report.snapshot_loaded);
        assert_eq!(report.records_loaded, 1);
        assert_eq!(report.records_rejected, 1);
        assert!(report.warnings().count() > 0);
        assert!(store.degraded_state().is_degraded());
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_unknown() {
        let store = seeded();
        let farmers = store
            .find_by_ids::<Farmer>(&["f1", "ghost", "f1"])
            .await
            .unwrap();
        assert_eq!(farmers.len(), 1);
    }
}
