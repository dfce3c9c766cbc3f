//! Data models for agrodash

pub mod entities;
pub mod ids;
pub mod record;
pub mod report;
pub mod snapshot;

pub use entities::{
    Admin, AgroAllied, AgroAlliedPatch, Crop, CropPatch, Farm, FarmPatch, Farmer, FarmerPatch,
    Livestock, LivestockPatch, Officer, OfficerPatch,
};
pub use ids::{AdminId, FarmId, FarmerId, OfficerId, RecordId};
pub use record::{Categorized, EntityKind, Ownership, Record, Scope};
pub use report::{
    FarmAnalytics, FarmReport, FarmerAnalytics, FarmerReport, FarmsPerFarmer, GlobalAnalytics,
    GlobalReport, Metrics, MonthCount, OfficerAnalytics, OfficerIdentity, OfficerPerformance,
    OfficerReport, ReportSections, Section, SectionFailure, TypeCount,
};
pub use snapshot::Snapshot;
