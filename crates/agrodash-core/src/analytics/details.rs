//! Detail views: one root entity plus everything it owns

use std::sync::Arc;
use tracing::{debug, info};

use super::{count_metrics, farms_per_farmer, AnalyticsEngine};
use crate::error::CoreError;
use crate::models::{
    AgroAllied, Crop, Farm, FarmAnalytics, FarmReport, Farmer, FarmerAnalytics, FarmerReport,
    Livestock, Officer, OfficerAnalytics, OfficerIdentity, OfficerReport, Record, ReportSections,
    Scope,
};
use crate::store::EntityStore;

impl<S: EntityStore> AnalyticsEngine<S> {
    /// Referenced record, `None` when the reference dangles
    async fn referenced<R: Record>(&self, id: &str) -> Result<Option<R>, CoreError> {
        match self.store.find_by_id::<R>(id).await {
            Ok(record) => Ok(Some(Arc::unwrap_or_clone(record))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Officer with its farmers, farms, records, metrics and analytics
    ///
    /// Fails with `NotFound` when `officer_id` does not resolve.
    pub async fn compute_officer_analytics(
        &self,
        officer_id: &str,
    ) -> Result<OfficerReport, CoreError> {
        let officer = self.root::<Officer>(officer_id).await?;
        let scope = Scope::Officer(officer.id.clone());
        let store = self.store.as_ref();

        info!(%scope, "Computing officer analytics");

        let (
            farmers,
            farms,
            crops,
            livestock,
            agro_allieds,
            metrics,
            crop_types,
            livestock_types,
            allied_types,
            farms_per_farmer,
            monthly_crops,
            monthly_livestock,
        ) = tokio::join!(
            self.section("farmers", &scope, self.records::<Farmer>(&scope)),
            self.section("farms", &scope, self.records::<Farm>(&scope)),
            self.section("crops", &scope, self.records::<Crop>(&scope)),
            self.section("livestock", &scope, self.records::<Livestock>(&scope)),
            self.section("agroAllieds", &scope, self.records::<AgroAllied>(&scope)),
            self.section("metrics", &scope, count_metrics(store, &scope)),
            self.section("cropTypes", &scope, store.group_by::<Crop>(&scope)),
            self.section("livestockTypes", &scope, store.group_by::<Livestock>(&scope)),
            self.section("alliedTypes", &scope, store.group_by::<AgroAllied>(&scope)),
            self.section("farmsPerFarmer", &scope, farms_per_farmer(store, &officer.id)),
            self.section("monthlyCrops", &scope, self.monthly::<Crop>(&scope)),
            self.section("monthlyLivestock", &scope, self.monthly::<Livestock>(&scope)),
        );

        let report = OfficerReport {
            officer: Arc::unwrap_or_clone(officer),
            farmers,
            farms,
            crops,
            livestock,
            agro_allieds,
            metrics,
            analytics: OfficerAnalytics {
                crop_types,
                livestock_types,
                allied_types,
                farms_per_farmer,
                monthly_crops,
                monthly_livestock,
            },
        };

        debug!(%scope, failed_sections = report.failures().len(), "Officer analytics done");
        Ok(report)
    }

    /// Farmer with their farms, records, metrics and analytics
    pub async fn compute_farmer_details(&self, farmer_id: &str) -> Result<FarmerReport, CoreError> {
        let farmer = self.root::<Farmer>(farmer_id).await?;
        let scope = Scope::Farmer(farmer.id.clone());
        let store = self.store.as_ref();

        info!(%scope, "Computing farmer details");

        let (
            farms,
            crops,
            livestock,
            agro_allieds,
            metrics,
            crop_types,
            livestock_types,
            allied_types,
            monthly_crops,
            monthly_livestock,
        ) = tokio::join!(
            self.section("farms", &scope, self.records::<Farm>(&scope)),
            self.section("crops", &scope, self.records::<Crop>(&scope)),
            self.section("livestock", &scope, self.records::<Livestock>(&scope)),
            self.section("agroAllieds", &scope, self.records::<AgroAllied>(&scope)),
            self.section("metrics", &scope, count_metrics(store, &scope)),
            self.section("cropTypes", &scope, store.group_by::<Crop>(&scope)),
            self.section("livestockTypes", &scope, store.group_by::<Livestock>(&scope)),
            self.section("alliedTypes", &scope, store.group_by::<AgroAllied>(&scope)),
            self.section("monthlyCrops", &scope, self.monthly::<Crop>(&scope)),
            self.section("monthlyLivestock", &scope, self.monthly::<Livestock>(&scope)),
        );

        let report = FarmerReport {
            farmer: Arc::unwrap_or_clone(farmer),
            farms,
            crops,
            livestock,
            agro_allieds,
            metrics,
            analytics: FarmerAnalytics {
                crop_types,
                livestock_types,
                allied_types,
                monthly_crops,
                monthly_livestock,
            },
        };

        debug!(%scope, failed_sections = report.failures().len(), "Farmer details done");
        Ok(report)
    }

    /// Farm with its owner, officer, records, metrics and analytics
    ///
    /// A farmer or officer reference that no longer resolves is reported as
    /// `null` rather than failing the request.
    pub async fn compute_farm_details(&self, farm_id: &str) -> Result<FarmReport, CoreError> {
        let farm = self.root::<Farm>(farm_id).await?;
        let scope = Scope::Farm(farm.id.clone());
        let store = self.store.as_ref();

        info!(%scope, "Computing farm details");

        let (
            farmer,
            officer,
            crops,
            livestock,
            agro_allieds,
            metrics,
            crop_types,
            livestock_types,
            allied_types,
        ) = tokio::join!(
            self.section("farmer", &scope, self.referenced::<Farmer>(&farm.farmer_id)),
            self.section("officer", &scope, async {
                let officer = self.referenced::<Officer>(&farm.officer_id).await?;
                Ok::<_, CoreError>(officer.as_ref().map(OfficerIdentity::from))
            }),
            self.section("crops", &scope, self.records::<Crop>(&scope)),
            self.section("livestock", &scope, self.records::<Livestock>(&scope)),
            self.section("agroAllieds", &scope, self.records::<AgroAllied>(&scope)),
            self.section("metrics", &scope, count_metrics(store, &scope)),
            self.section("cropTypes", &scope, store.group_by::<Crop>(&scope)),
            self.section("livestockTypes", &scope, store.group_by::<Livestock>(&scope)),
            self.section("alliedTypes", &scope, store.group_by::<AgroAllied>(&scope)),
        );

        let report = FarmReport {
            farm: Arc::unwrap_or_clone(farm),
            farmer,
            officer,
            crops,
            livestock,
            agro_allieds,
            metrics,
            analytics: FarmAnalytics {
                crop_types,
                livestock_types,
                allied_types,
            },
        };

        debug!(%scope, failed_sections = report.failures().len(), "Farm details done");
        Ok(report)
    }
}
