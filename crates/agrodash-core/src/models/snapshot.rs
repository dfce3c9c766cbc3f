//! Serialized form of the whole entity store

use serde::{Deserialize, Serialize};

use super::entities::{Admin, AgroAllied, Crop, Farm, Farmer, Livestock, Officer};

/// Every collection of the store, as exported by the persistence layer
///
/// Missing collections deserialize as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub admins: Vec<Admin>,
    #[serde(default)]
    pub officers: Vec<Officer>,
    #[serde(default)]
    pub farmers: Vec<Farmer>,
    #[serde(default)]
    pub farms: Vec<Farm>,
    #[serde(default)]
    pub crops: Vec<Crop>,
    #[serde(default, alias = "livestocks")]
    pub livestock: Vec<Livestock>,
    #[serde(default)]
    pub agro_allieds: Vec<AgroAllied>,
}

impl Snapshot {
    pub fn record_count(&self) -> usize {
        self.admins.len()
            + self.officers.len()
            + self.farmers.len()
            + self.farms.len()
            + self.crops.len()
            + self.livestock.len()
            + self.agro_allieds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}
