//! Raw totals per entity type
//!
//! Which totals a scope reports follows from the ownership chain: a farm
//! scope has no farms or farmers below it, only the global scope counts
//! officers.

use crate::error::CoreError;
use crate::models::{
    AgroAllied, Crop, EntityKind, Farm, Farmer, Livestock, Metrics, Officer, Record, Scope,
};
use crate::store::EntityStore;

/// Entity kinds counted for `scope`, in display order
pub fn counted_kinds(scope: &Scope) -> &'static [EntityKind] {
    const ALL: [EntityKind; 6] = [
        EntityKind::Officer,
        EntityKind::Farmer,
        EntityKind::Farm,
        EntityKind::Crop,
        EntityKind::Livestock,
        EntityKind::AgroAllied,
    ];
    match scope {
        Scope::Global => &ALL,
        Scope::Officer(_) => &ALL[1..],
        Scope::Farmer(_) => &ALL[2..],
        Scope::Farm(_) => &ALL[3..],
    }
}

async fn count_if_counted<R: Record, S: EntityStore>(
    store: &S,
    scope: &Scope,
) -> Result<Option<u64>, CoreError> {
    if !counted_kinds(scope).contains(&R::KIND) {
        return Ok(None);
    }
    store.count::<R>(scope).await.map(Some)
}

/// Count every kind reported for `scope`, concurrently
pub async fn count_metrics<S: EntityStore>(store: &S, scope: &Scope) -> Result<Metrics, CoreError> {
    let (officers, farmers, farms, crops, livestock, allied) = tokio::try_join!(
        count_if_counted::<Officer, S>(store, scope),
        count_if_counted::<Farmer, S>(store, scope),
        count_if_counted::<Farm, S>(store, scope),
        count_if_counted::<Crop, S>(store, scope),
        count_if_counted::<Livestock, S>(store, scope),
        count_if_counted::<AgroAllied, S>(store, scope),
    )?;

    Ok(Metrics {
        total_officers: officers,
        total_farmers: farmers,
        total_farms: farms,
        total_crops: crops,
        total_livestock: livestock,
        total_allied: allied,
    })
}
