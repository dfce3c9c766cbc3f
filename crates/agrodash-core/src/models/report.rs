//! Report shapes produced by the analytics engine
//!
//! Every independently computed part of a report is a [`Section`]: either
//! its value or a [`SectionFailure`] naming what failed and in which scope.

use serde::{Deserialize, Serialize};

use super::entities::{AgroAllied, Crop, Farm, Farmer, Livestock, Officer};
use super::ids::{FarmerId, OfficerId};
use super::record::EntityKind;

/// Why one section of a report is missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFailure {
    /// Section name as serialized ("cropTypes", "metrics", ...)
    pub section: String,
    /// Scope label ("global", "officer:<id>", ...)
    pub scope: String,
    pub reason: String,
}

/// One independently computed part of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section<T> {
    Ready(T),
    Failed { failed: SectionFailure },
}

impl<T> Section<T> {
    pub fn failed(
        section: impl Into<String>,
        scope: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Section::Failed {
            failed: SectionFailure {
                section: section.into(),
                scope: scope.into(),
                reason: reason.into(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Section::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            Section::Failed { .. } => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            Section::Ready(value) => Some(value),
            Section::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&SectionFailure> {
        match self {
            Section::Ready(_) => None,
            Section::Failed { failed } => Some(failed),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Section<U> {
        match self {
            Section::Ready(value) => Section::Ready(f(value)),
            Section::Failed { failed } => Section::Failed { failed },
        }
    }
}

/// Count of records sharing one category value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    /// `None` groups records with no category
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub value: u64,
}

/// Count of records created in one calendar month (1-12, UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    pub month: u32,
    pub value: u64,
}

/// Officer identity fields shown next to rollups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerIdentity {
    pub id: OfficerId,
    pub name: String,
    pub username: String,
    pub email: String,
}

impl From<&Officer> for OfficerIdentity {
    fn from(officer: &Officer) -> Self {
        Self {
            id: officer.id.clone(),
            name: officer.display_name(),
            username: officer.username.clone(),
            email: officer.email.clone(),
        }
    }
}

/// Per-officer record counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerPerformance {
    #[serde(flatten)]
    pub officer: OfficerIdentity,
    pub farmers: u64,
    pub farms: u64,
    pub crops: u64,
    pub livestock: u64,
    pub allied: u64,
}

/// Number of farms owned by one farmer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmsPerFarmer {
    pub farmer_id: FarmerId,
    /// Farmer display name
    pub farmer: String,
    pub farms: u64,
}

/// Raw totals per entity type; absent fields are not part of the scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Metrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_officers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_farmers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_farms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_crops: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_livestock: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_allied: Option<u64>,
}

impl Metrics {
    pub fn get(&self, kind: EntityKind) -> Option<u64> {
        match kind {
            EntityKind::Officer => self.total_officers,
            EntityKind::Farmer => self.total_farmers,
            EntityKind::Farm => self.total_farms,
            EntityKind::Crop => self.total_crops,
            EntityKind::Livestock => self.total_livestock,
            EntityKind::AgroAllied => self.total_allied,
            EntityKind::Admin => None,
        }
    }

    pub fn set(&mut self, kind: EntityKind, count: u64) {
        let slot = match kind {
            EntityKind::Officer => &mut self.total_officers,
            EntityKind::Farmer => &mut self.total_farmers,
            EntityKind::Farm => &mut self.total_farms,
            EntityKind::Crop => &mut self.total_crops,
            EntityKind::Livestock => &mut self.total_livestock,
            EntityKind::AgroAllied => &mut self.total_allied,
            EntityKind::Admin => return,
        };
        *slot = Some(count);
    }

    /// Entity kinds present in this metrics block, in display order
    pub fn entries(&self) -> Vec<(EntityKind, u64)> {
        [
            EntityKind::Officer,
            EntityKind::Farmer,
            EntityKind::Farm,
            EntityKind::Crop,
            EntityKind::Livestock,
            EntityKind::AgroAllied,
        ]
        .into_iter()
        .filter_map(|kind| self.get(kind).map(|count| (kind, count)))
        .collect()
    }
}

/// Common accessors over a report's sections
pub trait ReportSections {
    fn failures(&self) -> Vec<&SectionFailure>;

    fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }
}

fn collect_failures<'a>(sections: &[Option<&'a SectionFailure>]) -> Vec<&'a SectionFailure> {
    sections.iter().flatten().copied().collect()
}

// ===================
// Global mode
// ===================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalAnalytics {
    pub officer_performance: Section<Vec<OfficerPerformance>>,
    pub crop_types: Section<Vec<TypeCount>>,
    pub livestock_types: Section<Vec<TypeCount>>,
    pub allied_types: Section<Vec<TypeCount>>,
    pub monthly_crops: Section<Vec<MonthCount>>,
    pub monthly_livestock: Section<Vec<MonthCount>>,
    pub monthly_allied: Section<Vec<MonthCount>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalReport {
    pub metrics: Section<Metrics>,
    pub analytics: GlobalAnalytics,
}

impl ReportSections for GlobalReport {
    fn failures(&self) -> Vec<&SectionFailure> {
        let a = &self.analytics;
        collect_failures(&[
            self.metrics.failure(),
            a.officer_performance.failure(),
            a.crop_types.failure(),
            a.livestock_types.failure(),
            a.allied_types.failure(),
            a.monthly_crops.failure(),
            a.monthly_livestock.failure(),
            a.monthly_allied.failure(),
        ])
    }
}

// ===================
// Officer scope
// ===================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerAnalytics {
    pub crop_types: Section<Vec<TypeCount>>,
    pub livestock_types: Section<Vec<TypeCount>>,
    pub allied_types: Section<Vec<TypeCount>>,
    pub farms_per_farmer: Section<Vec<FarmsPerFarmer>>,
    pub monthly_crops: Section<Vec<MonthCount>>,
    pub monthly_livestock: Section<Vec<MonthCount>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerReport {
    pub officer: Officer,
    pub farmers: Section<Vec<Farmer>>,
    pub farms: Section<Vec<Farm>>,
    pub crops: Section<Vec<Crop>>,
    pub livestock: Section<Vec<Livestock>>,
    pub agro_allieds: Section<Vec<AgroAllied>>,
    pub metrics: Section<Metrics>,
    pub analytics: OfficerAnalytics,
}

impl ReportSections for OfficerReport {
    fn failures(&self) -> Vec<&SectionFailure> {
        let a = &self.analytics;
        collect_failures(&[
            self.farmers.failure(),
            self.farms.failure(),
            self.crops.failure(),
            self.livestock.failure(),
            self.agro_allieds.failure(),
            self.metrics.failure(),
            a.crop_types.failure(),
            a.livestock_types.failure(),
            a.allied_types.failure(),
            a.farms_per_farmer.failure(),
            a.monthly_crops.failure(),
            a.monthly_livestock.failure(),
        ])
    }
}

// ===================
// Farmer scope
// ===================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerAnalytics {
    pub crop_types: Section<Vec<TypeCount>>,
    pub livestock_types: Section<Vec<TypeCount>>,
    pub allied_types: Section<Vec<TypeCount>>,
    pub monthly_crops: Section<Vec<MonthCount>>,
    pub monthly_livestock: Section<Vec<MonthCount>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerReport {
    pub farmer: Farmer,
    pub farms: Section<Vec<Farm>>,
    pub crops: Section<Vec<Crop>>,
    pub livestock: Section<Vec<Livestock>>,
    pub agro_allieds: Section<Vec<AgroAllied>>,
    pub metrics: Section<Metrics>,
    pub analytics: FarmerAnalytics,
}

impl ReportSections for FarmerReport {
    fn failures(&self) -> Vec<&SectionFailure> {
        let a = &self.analytics;
        collect_failures(&[
            self.farms.failure(),
            self.crops.failure(),
            self.livestock.failure(),
            self.agro_allieds.failure(),
            self.metrics.failure(),
            a.crop_types.failure(),
            a.livestock_types.failure(),
            a.allied_types.failure(),
            a.monthly_crops.failure(),
            a.monthly_livestock.failure(),
        ])
    }
}

// ===================
// Farm scope
// ===================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmAnalytics {
    pub crop_types: Section<Vec<TypeCount>>,
    pub livestock_types: Section<Vec<TypeCount>>,
    pub allied_types: Section<Vec<TypeCount>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmReport {
    pub farm: Farm,
    /// `None` when the farm references a farmer that no longer exists
    pub farmer: Section<Option<Farmer>>,
    pub officer: Section<Option<OfficerIdentity>>,
    pub crops: Section<Vec<Crop>>,
    pub livestock: Section<Vec<Livestock>>,
    pub agro_allieds: Section<Vec<AgroAllied>>,
    pub metrics: Section<Metrics>,
    pub analytics: FarmAnalytics,
}

impl ReportSections for FarmReport {
    fn failures(&self) -> Vec<&SectionFailure> {
        let a = &self.analytics;
        collect_failures(&[
            self.farmer.failure(),
            self.officer.failure(),
            self.crops.failure(),
            self.livestock.failure(),
            self.agro_allieds.failure(),
            self.metrics.failure(),
            a.crop_types.failure(),
            a.livestock_types.failure(),
            a.allied_types.failure(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_serializes_value_or_marker() {
        let ready: Section<Vec<MonthCount>> = Section::Ready(vec![MonthCount { month: 1, value: 2 }]);
        assert_eq!(
            serde_json::to_value(&ready).unwrap(),
            serde_json::json!([{"month": 1, "value": 2}])
        );

        let failed: Section<Vec<MonthCount>> =
            Section::failed("monthlyCrops", "officer:o1", "timed out");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"failed": {"section": "monthlyCrops", "scope": "officer:o1", "reason": "timed out"}})
        );
    }

    #[test]
    fn test_type_count_null_category() {
        let count = TypeCount {
            category: None,
            value: 4,
        };
        assert_eq!(
            serde_json::to_value(&count).unwrap(),
            serde_json::json!({"type": null, "value": 4})
        );
    }

    #[test]
    fn test_metrics_skip_absent_counts() {
        let mut metrics = Metrics::default();
        metrics.set(EntityKind::Crop, 3);
        metrics.set(EntityKind::Farm, 1);
        assert_eq!(
            serde_json::to_value(&metrics).unwrap(),
            serde_json::json!({"totalFarms": 1, "totalCrops": 3})
        );
        assert_eq!(
            metrics.entries(),
            vec![(EntityKind::Farm, 1), (EntityKind::Crop, 3)]
        );
    }

    #[test]
    fn test_officer_performance_flattens_identity() {
        let perf = OfficerPerformance {
            officer: OfficerIdentity {
                id: "o1".into(),
                name: "Ade Bello".to_string(),
                username: "ade".to_string(),
                email: "ade@example.com".to_string(),
            },
            farmers: 2,
            farms: 0,
            crops: 0,
            livestock: 0,
            allied: 0,
        };
        let value = serde_json::to_value(&perf).unwrap();
        assert_eq!(value["id"], "o1");
        assert_eq!(value["farmers"], 2);
        assert_eq!(value["allied"], 0);
    }
}
