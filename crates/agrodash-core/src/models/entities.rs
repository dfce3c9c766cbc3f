//! Entity records tracked by the field-data backend
//!
//! Field names serialize in camelCase; `_id` is accepted as an alias of `id`
//! so exports from document stores load unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AdminId, FarmId, FarmerId, OfficerId, RecordId};

/// Administrator who provisions officers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(alias = "_id")]
    pub id: AdminId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Field agent registering farmers and their holdings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Officer {
    #[serde(alias = "_id")]
    pub id: OfficerId,
    pub admin_id: AdminId,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lga: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Officer {
    /// "firstname lastname", falling back to the username
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.firstname.trim(), self.lastname.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farmer {
    #[serde(alias = "_id")]
    pub id: FarmerId,
    pub officer_id: OfficerId,
    pub name: String,
    pub national_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_hold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lga: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    #[serde(alias = "_id")]
    pub id: FarmId,
    pub officer_id: OfficerId,
    pub farmer_id: FarmerId,
    pub name: String,
    pub location: String,
    /// Hectares
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub officer_id: OfficerId,
    pub farmer_id: FarmerId,
    pub farm_id: FarmId,
    /// Free-form category ("Maize", "Rice", ...)
    #[serde(default)]
    pub crop_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variety: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planting_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvest_date: Option<DateTime<Utc>>,
    /// Acres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_planted: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Livestock {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub officer_id: OfficerId,
    pub farmer_id: FarmerId,
    pub farm_id: FarmId,
    /// Free-form category ("Cattle", "Goat", ...)
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    /// Head count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_acquired: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Agro-allied business (processing, input supply, ...)
///
/// Older exports name the business type `type`; `businessType` wins when
/// both keys are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "AgroAlliedDocument")]
pub struct AgroAllied {
    pub id: RecordId,
    pub officer_id: OfficerId,
    pub farmer_id: FarmerId,
    pub farm_id: FarmId,
    pub season: String,
    pub business_type: Option<String>,
    pub primary_product: String,
    pub production_capacity: f64,
    pub created_at: DateTime<Utc>,
}

/// Stored shape of [`AgroAllied`], accepting both business type keys
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgroAlliedDocument {
    #[serde(alias = "_id")]
    id: RecordId,
    officer_id: OfficerId,
    farmer_id: FarmerId,
    farm_id: FarmId,
    #[serde(default)]
    season: String,
    #[serde(default)]
    business_type: Option<String>,
    #[serde(rename = "type", default)]
    legacy_type: Option<String>,
    #[serde(default)]
    primary_product: String,
    #[serde(default)]
    production_capacity: f64,
    created_at: DateTime<Utc>,
}

impl From<AgroAlliedDocument> for AgroAllied {
    fn from(doc: AgroAlliedDocument) -> Self {
        Self {
            id: doc.id,
            officer_id: doc.officer_id,
            farmer_id: doc.farmer_id,
            farm_id: doc.farm_id,
            season: doc.season,
            business_type: doc.business_type.or(doc.legacy_type),
            primary_product: doc.primary_product,
            production_capacity: doc.production_capacity,
            created_at: doc.created_at,
        }
    }
}

// ===================
// Partial updates
// ===================

/// Overwrite `target` with `value` when the patch carries one
fn set<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

/// Same as [`set`] for optional fields
fn set_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if let Some(v) = value {
        *target = Some(v.clone());
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerPatch {
    pub username: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub lga: Option<String>,
}

impl OfficerPatch {
    pub fn apply(&self, officer: &mut Officer) {
        set(&mut officer.username, &self.username);
        set(&mut officer.firstname, &self.firstname);
        set(&mut officer.lastname, &self.lastname);
        set(&mut officer.email, &self.email);
        set_opt(&mut officer.phone, &self.phone);
        set_opt(&mut officer.address, &self.address);
        set_opt(&mut officer.lga, &self.lga);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerPatch {
    pub name: Option<String>,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub house_hold: Option<u32>,
    pub age: Option<u32>,
    pub lga: Option<String>,
    pub email: Option<String>,
}

impl FarmerPatch {
    pub fn apply(&self, farmer: &mut Farmer) {
        set(&mut farmer.name, &self.name);
        set(&mut farmer.national_id, &self.national_id);
        set_opt(&mut farmer.phone, &self.phone);
        set_opt(&mut farmer.address, &self.address);
        set_opt(&mut farmer.house_hold, &self.house_hold);
        set_opt(&mut farmer.age, &self.age);
        set_opt(&mut farmer.lga, &self.lga);
        set_opt(&mut farmer.email, &self.email);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub size: Option<f64>,
    pub soil_type: Option<String>,
}

impl FarmPatch {
    pub fn apply(&self, farm: &mut Farm) {
        set(&mut farm.name, &self.name);
        set(&mut farm.location, &self.location);
        set_opt(&mut farm.size, &self.size);
        set_opt(&mut farm.soil_type, &self.soil_type);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropPatch {
    pub crop_type: Option<String>,
    pub variety: Option<String>,
    pub planting_date: Option<DateTime<Utc>>,
    pub harvest_date: Option<DateTime<Utc>>,
    pub area_planted: Option<f64>,
}

impl CropPatch {
    pub fn apply(&self, crop: &mut Crop) {
        set_opt(&mut crop.crop_type, &self.crop_type);
        set_opt(&mut crop.variety, &self.variety);
        set_opt(&mut crop.planting_date, &self.planting_date);
        set_opt(&mut crop.harvest_date, &self.harvest_date);
        set_opt(&mut crop.area_planted, &self.area_planted);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivestockPatch {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub breed: Option<String>,
    pub count: Option<u32>,
    pub date_acquired: Option<DateTime<Utc>>,
}

impl LivestockPatch {
    pub fn apply(&self, livestock: &mut Livestock) {
        set_opt(&mut livestock.kind, &self.kind);
        set_opt(&mut livestock.breed, &self.breed);
        set_opt(&mut livestock.count, &self.count);
        set_opt(&mut livestock.date_acquired, &self.date_acquired);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgroAlliedPatch {
    pub season: Option<String>,
    pub business_type: Option<String>,
    pub primary_product: Option<String>,
    pub production_capacity: Option<f64>,
}

impl AgroAlliedPatch {
    pub fn apply(&self, allied: &mut AgroAllied) {
        set(&mut allied.season, &self.season);
        set_opt(&mut allied.business_type, &self.business_type);
        set(&mut allied.primary_product, &self.primary_product);
        set(&mut allied.production_capacity, &self.production_capacity);
    }
}
