//! Parsers for agrodash data files

pub mod snapshot;

pub use snapshot::SnapshotParser;
