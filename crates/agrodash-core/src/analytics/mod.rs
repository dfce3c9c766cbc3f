//! Analytics engine for field data
//!
//! Computes the global dashboard and the officer / farmer / farm detail
//! views from an [`EntityStore`]. Every call reads current state: nothing
//! is cached between calls.
//!
//! # Partial failures
//! The root lookup of a detail view is fail-fast: `NotFound`, an
//! unavailable store or a root timeout fail the whole request. Everything
//! after that is a set of independent sub-queries issued concurrently, each
//! bounded by `query_timeout`; one that errors or times out becomes a
//! failed [`Section`] and the rest of the report is still returned.

use std::future::Future;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::models::{
    AgroAllied, Crop, GlobalAnalytics, GlobalReport, Livestock, MonthCount, Record,
    ReportSections, Scope, Section,
};
use crate::store::EntityStore;

pub mod counts;
mod details;
pub mod distribution;
pub mod rollup;
pub mod trends;


pub use counts::{count_metrics, counted_kinds};
pub use distribution::type_distribution;
pub use rollup::{farms_per_farmer, hash_join, officer_performance};
pub use trends::{MonthlyLayout, densify, monthly_trend};

/// Analytics over an entity store
pub struct AnalyticsEngine<S> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S> Clone for AnalyticsEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: EntityStore> AnalyticsEngine<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one sub-query under the query budget
    ///
    /// Errors and timeouts are logged and turned into a failed section.
    async fn section<T>(
        &self,
        section: &'static str,
        scope: &Scope,
        query: impl Future<Output = Result<T, CoreError>>,
    ) -> Section<T> {
        let error = match timeout(self.config.query_timeout(), query).await {
            Ok(Ok(value)) => return Section::Ready(value),
            Ok(Err(e)) => e,
            Err(_) => CoreError::Timeout {
                operation: format!("{} ({})", section, scope),
                timeout_ms: self.config.query_timeout_ms,
            },
        };

        warn!(section, %scope, error = %error, "Section failed");
        Section::failed(section, scope.to_string(), error.to_string())
    }

    /// Root entity lookup under the root budget; any failure is terminal
    async fn root<R: Record>(&self, id: &str) -> Result<Arc<R>, CoreError> {
        match timeout(self.config.root_timeout(), self.store.find_by_id::<R>(id)).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::Timeout {
                operation: format!("{} lookup {}", R::KIND, id),
                timeout_ms: self.config.root_timeout_ms,
            }),
        }
    }

    /// Records in scope, cloned out of the store
    async fn records<R: Record>(&self, scope: &Scope) -> Result<Vec<R>, CoreError> {
        let records = self.store.find::<R>(scope).await?;
        Ok(records.into_iter().map(Arc::unwrap_or_clone).collect())
    }

    /// Monthly series shaped by the configured layout
    async fn monthly<R: Record>(&self, scope: &Scope) -> Result<Vec<MonthCount>, CoreError> {
        let sparse = self.store.group_by_month::<R>(scope).await?;
        Ok(self.config.monthly_layout.apply(sparse))
    }

    /// Dashboard across all officers
    ///
    /// Never fails as a whole: there is no root entity, so every problem is
    /// reported on the section it affected.
    pub async fn compute_global_analytics(&self) -> GlobalReport {
        let scope = Scope::Global;
        let store = self.store.as_ref();

        info!("Computing global analytics");

        let (
            metrics,
            officer_performance,
            crop_types,
            livestock_types,
            allied_types,
            monthly_crops,
            monthly_livestock,
            monthly_allied,
        ) = tokio::join!(
            self.section("metrics", &scope, count_metrics(store, &scope)),
            self.section("officerPerformance", &scope, officer_performance(store)),
            self.section("cropTypes", &scope, store.group_by::<Crop>(&scope)),
            self.section("livestockTypes", &scope, store.group_by::<Livestock>(&scope)),
            self.section("alliedTypes", &scope, store.group_by::<AgroAllied>(&scope)),
            self.section("monthlyCrops", &scope, self.monthly::<Crop>(&scope)),
            self.section("monthlyLivestock", &scope, self.monthly::<Livestock>(&scope)),
            self.section("monthlyAllied", &scope, self.monthly::<AgroAllied>(&scope)),
        );

        let report = GlobalReport {
            metrics,
            analytics: GlobalAnalytics {
                officer_performance,
                crop_types,
                livestock_types,
                allied_types,
                monthly_crops,
                monthly_livestock,
                monthly_allied,
            },
        };

        debug!(failed_sections = report.failures().len(), "Global analytics done");
        report
    }
}
