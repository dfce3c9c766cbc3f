//! agrodash-core - Core library for agrodash
//!
//! Provides entity models, the entity store, the snapshot loader and the
//! analytics engine behind the agricultural field-data dashboard.

pub mod analytics;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod models;
pub mod parsers;
pub mod store;

pub use analytics::{AnalyticsEngine, MonthlyLayout};
pub use config::{EngineConfig, Settings};
pub use error::{CoreError, DegradedState, LoadReport};
pub use event::{DataEvent, EventBus};
pub use export::{export_officer_performance_to_csv, export_report_to_json};
pub use parsers::SnapshotParser;
pub use store::{DataStore, DataStoreConfig, EntityStore};
