//! Rollups built on in-memory hash joins
//!
//! Officer performance indexes every child collection by `officerId` once
//! and probes it per officer. Farms-per-farmer groups an officer's farms by
//! `farmerId` and inner-joins the groups against the farmer records.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

use crate::error::CoreError;
use crate::models::{
    AgroAllied, Crop, Farm, Farmer, FarmsPerFarmer, Livestock, Officer, OfficerId,
    OfficerIdentity, OfficerPerformance, Record, Scope,
};
use crate::store::EntityStore;

/// Inner equi-join of `left` and `right`
///
/// `right` is the build side and gets indexed; pass the smaller collection
/// there. Output follows `left` order, one pair per match.
pub fn hash_join<'a, L, R, K, FL, FR>(
    left: &'a [L],
    right: &'a [R],
    left_key: FL,
    right_key: FR,
) -> Vec<(&'a L, &'a R)>
where
    K: Hash + Eq,
    FL: Fn(&'a L) -> K,
    FR: Fn(&'a R) -> K,
{
    let mut index: HashMap<K, Vec<&'a R>> = HashMap::with_capacity(right.len());
    for item in right {
        index.entry(right_key(item)).or_default().push(item);
    }

    let mut joined = Vec::new();
    for item in left {
        if let Some(matches) = index.get(&left_key(item)) {
            joined.extend(matches.iter().map(|m| (item, *m)));
        }
    }
    joined
}

/// Number of items per key
pub fn count_by<'a, T, K, F>(items: &'a [T], key: F) -> HashMap<K, u64>
where
    K: Hash + Eq,
    F: Fn(&'a T) -> K,
{
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

fn by_officer<R: Record>(records: &[Arc<R>]) -> HashMap<&str, u64> {
    count_by(records, |record| {
        record
            .ownership()
            .officer_id
            .map(|id| id.as_str())
            .unwrap_or_default()
    })
}

/// Per-officer counts of farmers, farms, crops, livestock and allied
/// businesses; officers without records report zeros. Sorted by officer id.
pub fn officer_performance_rows(
    officers: &[Arc<Officer>],
    farmers: &[Arc<Farmer>],
    farms: &[Arc<Farm>],
    crops: &[Arc<Crop>],
    livestock: &[Arc<Livestock>],
    allied: &[Arc<AgroAllied>],
) -> Vec<OfficerPerformance> {
    let farmers = by_officer(farmers);
    let farms = by_officer(farms);
    let crops = by_officer(crops);
    let livestock = by_officer(livestock);
    let allied = by_officer(allied);

    let probe = |index: &HashMap<&str, u64>, id: &str| index.get(id).copied().unwrap_or(0);

    let mut rows: Vec<OfficerPerformance> = officers
        .iter()
        .map(|officer| {
            let id = officer.id.as_str();
            OfficerPerformance {
                officer: OfficerIdentity::from(officer.as_ref()),
                farmers: probe(&farmers, id),
                farms: probe(&farms, id),
                crops: probe(&crops, id),
                livestock: probe(&livestock, id),
                allied: probe(&allied, id),
            }
        })
        .collect();

    rows.sort_by(|a, b| a.officer.id.cmp(&b.officer.id));
    rows
}

/// Officer performance over the whole store
pub async fn officer_performance<S: EntityStore>(
    store: &S,
) -> Result<Vec<OfficerPerformance>, CoreError> {
    let scope = Scope::Global;
    let (officers, farmers, farms, crops, livestock, allied) = tokio::try_join!(
        store.find::<Officer>(&scope),
        store.find::<Farmer>(&scope),
        store.find::<Farm>(&scope),
        store.find::<Crop>(&scope),
        store.find::<Livestock>(&scope),
        store.find::<AgroAllied>(&scope),
    )?;

    debug!(officers = officers.len(), "Computing officer performance");

    Ok(officer_performance_rows(
        &officers, &farmers, &farms, &crops, &livestock, &allied,
    ))
}

/// Join per-farmer farm counts against farmer records
///
/// Groups whose farmer does not resolve are dropped. Ordered by farmer
/// name, then farmer id.
pub fn farms_per_farmer_rows(
    counts: &[(&str, u64)],
    farmers: &[Arc<Farmer>],
) -> Vec<FarmsPerFarmer> {
    let mut rows: Vec<FarmsPerFarmer> = hash_join(
        counts,
        farmers,
        |(farmer_id, _)| *farmer_id,
        |farmer| farmer.id.as_str(),
    )
    .into_iter()
    .filter(|((_, farms), _)| *farms > 0)
    .map(|((_, farms), farmer)| FarmsPerFarmer {
        farmer_id: farmer.id.clone(),
        farmer: farmer.name.clone(),
        farms: *farms,
    })
    .collect();

    rows.sort_by(|a, b| {
        a.farmer
            .cmp(&b.farmer)
            .then_with(|| a.farmer_id.cmp(&b.farmer_id))
    });
    rows
}

/// Farms per farmer inside one officer's scope
///
/// The farm grouping must finish before the farmer lookup: the lookup is
/// keyed by the farmer ids the grouping produced.
pub async fn farms_per_farmer<S: EntityStore>(
    store: &S,
    officer_id: &OfficerId,
) -> Result<Vec<FarmsPerFarmer>, CoreError> {
    let farms = store
        .find::<Farm>(&Scope::Officer(officer_id.clone()))
        .await?;

    let counts: Vec<(&str, u64)> = count_by(&farms, |farm| farm.farmer_id.as_str())
        .into_iter()
        .collect();
    let farmer_ids: Vec<&str> = counts.iter().map(|(id, _)| *id).collect();

    let farmers = store.find_by_ids::<Farmer>(&farmer_ids).await?;

    Ok(farms_per_farmer_rows(&counts, &farmers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdminId, FarmId, FarmerId};
    use chrono::{TimeZone, Utc};

    fn officer(id: &str) -> Arc<Officer> {
        Arc::new(Officer {
            id: OfficerId::from(id),
            admin_id: AdminId::from("a1"),
            username: format!("user-{}", id),
            firstname: "Tunde".to_string(),
            lastname: id.to_uppercase(),
            email: format!("{}@example.com", id),
            phone: None,
            address: None,
            lga: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        })
    }

    fn farmer(id: &str, officer_id: &str, name: &str) -> Arc<Farmer> {
        Arc::new(Farmer {
            id: FarmerId::from(id),
            officer_id: OfficerId::from(officer_id),
            name: name.to_string(),
            national_id: format!("NIN-{}", id),
            phone: None,
            address: None,
            house_hold: None,
            age: None,
            lga: None,
            email: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
        })
    }

    fn farm(id: &str, officer_id: &str, farmer_id: &str) -> Arc<Farm> {
        Arc::new(Farm {
            id: FarmId::from(id),
            officer_id: OfficerId::from(officer_id),
            farmer_id: FarmerId::from(farmer_id),
            name: format!("Plot {}", id),
            location: "Oyo".to_string(),
            size: None,
            soil_type: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 3, 0, 0, 0).unwrap(),
        })
    }

    #[test]
    fn test_hash_join_emits_every_match() {
        let left = vec![(1, "a"), (2, "b"), (3, "c")];
        let right = vec![(1, 'x'), (1, 'y'), (3, 'z')];

        let joined = hash_join(&left, &right, |l| l.0, |r| r.0);

        let pairs: Vec<(&str, char)> = joined.iter().map(|(l, r)| (l.1, r.1)).collect();
        assert_eq!(pairs, vec![("a", 'x'), ("a", 'y'), ("c", 'z')]);
    }

    #[test]
    fn test_officer_performance_includes_idle_officers() {
        let officers = vec![officer("o2"), officer("o1")];
        let farmers = vec![farmer("f1", "o1", "Kemi"), farmer("f2", "o1", "Bisi")];
        let farms = vec![farm("fm1", "o1", "f1")];

        let rows = officer_performance_rows(&officers, &farmers, &farms, &[], &[], &[]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].officer.id.as_str(), "o1");
        assert_eq!(rows[0].farmers, 2);
        assert_eq!(rows[0].farms, 1);
        assert_eq!(rows[1].officer.id.as_str(), "o2");
        assert_eq!(
            (rows[1].farmers, rows[1].farms, rows[1].crops, rows[1].livestock, rows[1].allied),
            (0, 0, 0, 0, 0)
        );
    }

    #[test]
    fn test_farms_per_farmer_drops_unresolved_farmers() {
        let farmers = vec![farmer("f1", "o1", "Zainab"), farmer("f2", "o1", "Ayo")];
        let counts = vec![("f1", 2), ("f2", 1), ("ghost", 4)];

        let rows = farms_per_farmer_rows(&counts, &farmers);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].farmer, "Ayo");
        assert_eq!(rows[0].farms, 1);
        assert_eq!(rows[1].farmer, "Zainab");
        assert_eq!(rows[1].farms, 2);
        assert!(rows.iter().all(|row| row.farmer_id.as_str() != "ghost"));
    }

    #[test]
    fn test_farms_per_farmer_ties_break_on_id() {
        let farmers = vec![farmer("f9", "o1", "Ayo"), farmer("f3", "o1", "Ayo")];
        let counts = vec![("f9", 1), ("f3", 1)];

        let rows = farms_per_farmer_rows(&counts, &farmers);

        assert_eq!(rows[0].farmer_id.as_str(), "f3");
        assert_eq!(rows[1].farmer_id.as_str(), "f9");
    }
}
