//! Record abstraction shared by every stored entity
//!
//! Analytics code is written once against [`Record`] / [`Categorized`] and
//! works for crops, livestock and agro-allied businesses alike.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::{Admin, AgroAllied, Crop, Farm, Farmer, Livestock, Officer};
use super::ids::{FarmId, FarmerId, OfficerId};
use crate::store::{Collection, Collections};

/// Entity type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Admin,
    Officer,
    Farmer,
    Farm,
    Crop,
    Livestock,
    AgroAllied,
}

impl EntityKind {
    /// Collection name as used in snapshots and log fields
    pub fn collection_name(&self) -> &'static str {
        match self {
            EntityKind::Admin => "admins",
            EntityKind::Officer => "officers",
            EntityKind::Farmer => "farmers",
            EntityKind::Farm => "farms",
            EntityKind::Crop => "crops",
            EntityKind::Livestock => "livestock",
            EntityKind::AgroAllied => "agroAllieds",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            EntityKind::Admin => "Admin",
            EntityKind::Officer => "Officer",
            EntityKind::Farmer => "Farmer",
            EntityKind::Farm => "Farm",
            EntityKind::Crop => "Crop",
            EntityKind::Livestock => "Livestock",
            EntityKind::AgroAllied => "AgroAllied",
        };
        f.write_str(name)
    }
}

/// Subset of data visible to a query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// All data
    Global,
    /// One officer's subtree
    Officer(OfficerId),
    /// One farmer's holdings
    Farmer(FarmerId),
    /// One farm's records
    Farm(FarmId),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Officer(id) => write!(f, "officer:{}", id),
            Scope::Farmer(id) => write!(f, "farmer:{}", id),
            Scope::Farm(id) => write!(f, "farm:{}", id),
        }
    }
}

/// Foreign keys carried by a record
#[derive(Debug, Clone, Copy, Default)]
pub struct Ownership<'a> {
    pub officer_id: Option<&'a OfficerId>,
    pub farmer_id: Option<&'a FarmerId>,
    pub farm_id: Option<&'a FarmId>,
}

/// A stored entity
pub trait Record: fmt::Debug + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    fn ownership(&self) -> Ownership<'_>;

    fn created_at(&self) -> DateTime<Utc>;

    /// Backing collection inside the in-memory store
    fn collection(collections: &Collections) -> &Collection<Self>;

    /// Whether the record falls inside `scope` (foreign-key equality)
    fn in_scope(&self, scope: &Scope) -> bool {
        let owner = self.ownership();
        match scope {
            Scope::Global => true,
            Scope::Officer(id) => owner.officer_id == Some(id),
            Scope::Farmer(id) => owner.farmer_id == Some(id),
            Scope::Farm(id) => owner.farm_id == Some(id),
        }
    }
}

/// A record grouped by a free-form category field
pub trait Categorized: Record {
    /// Field name as it appears in the serialized record
    const CATEGORY_FIELD: &'static str;

    fn category(&self) -> Option<&str>;
}

impl Record for Admin {
    const KIND: EntityKind = EntityKind::Admin;

    fn id(&self) -> &str {
        &self.id
    }

    fn ownership(&self) -> Ownership<'_> {
        Ownership::default()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn collection(collections: &Collections) -> &Collection<Self> {
        &collections.admins
    }
}

impl Record for Officer {
    const KIND: EntityKind = EntityKind::Officer;

    fn id(&self) -> &str {
        &self.id
    }

    fn ownership(&self) -> Ownership<'_> {
        Ownership::default()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn collection(collections: &Collections) -> &Collection<Self> {
        &collections.officers
    }
}

impl Record for Farmer {
    const KIND: EntityKind = EntityKind::Farmer;

    fn id(&self) -> &str {
        &self.id
    }

    fn ownership(&self) -> Ownership<'_> {
        Ownership {
            officer_id: Some(&self.officer_id),
            ..Default::default()
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn collection(collections: &Collections) -> &Collection<Self> {
        &collections.farmers
    }
}

impl Record for Farm {
    const KIND: EntityKind = EntityKind::Farm;

    fn id(&self) -> &str {
        &self.id
    }

    fn ownership(&self) -> Ownership<'_> {
        Ownership {
            officer_id: Some(&self.officer_id),
            farmer_id: Some(&self.farmer_id),
            farm_id: None,
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn collection(collections: &Collections) -> &Collection<Self> {
        &collections.farms
    }
}

/// Crop, Livestock and AgroAllied share the same ownership chain
macro_rules! farm_child_record {
    ($ty:ty, $kind:expr, $field:ident, $category_field:literal, $category:ident) => {
        impl Record for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn ownership(&self) -> Ownership<'_> {
                Ownership {
                    officer_id: Some(&self.officer_id),
                    farmer_id: Some(&self.farmer_id),
                    farm_id: Some(&self.farm_id),
                }
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }

            fn collection(collections: &Collections) -> &Collection<Self> {
                &collections.$field
            }
        }

        impl Categorized for $ty {
            const CATEGORY_FIELD: &'static str = $category_field;

            fn category(&self) -> Option<&str> {
                self.$category.as_deref()
            }
        }
    };
}

farm_child_record!(Crop, EntityKind::Crop, crops, "cropType", crop_type);
farm_child_record!(Livestock, EntityKind::Livestock, livestock, "type", kind);
farm_child_record!(
    AgroAllied,
    EntityKind::AgroAllied,
    agro_allieds,
    "businessType",
    business_type
);
