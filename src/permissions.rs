//! Role checks against the cached user profile.

use crate::models::UserProfile;
use std::fmt;
use std::str::FromStr;

pub const ADMIN_GROUP: &str = "Administrador";
pub const STANDARD_GROUP: &str = "Padrão";
pub const READER_GROUP: &str = "Leitor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ViewInventory,
    /// Create and edit equipment.
    ManageEquipment,
    DeleteEquipment,
    ManageUsers,
    ManageStocks,
    /// See the equipment of one stock location.
    AccessStock(u64),
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::ViewInventory => f.write_str("view-inventory"),
            Capability::ManageEquipment => f.write_str("manage-equipment"),
            Capability::DeleteEquipment => f.write_str("delete-equipment"),
            Capability::ManageUsers => f.write_str("manage-users"),
            Capability::ManageStocks => f.write_str("manage-stocks"),
            Capability::AccessStock(id) => write!(f, "access-stock:{}", id),
        }
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view-inventory" => Ok(Capability::ViewInventory),
            "manage-equipment" => Ok(Capability::ManageEquipment),
            "delete-equipment" => Ok(Capability::DeleteEquipment),
            "manage-users" => Ok(Capability::ManageUsers),
            "manage-stocks" => Ok(Capability::ManageStocks),
            other => {
                let id = other
                    .strip_prefix("access-stock:")
                    .ok_or_else(|| format!("unknown capability '{}'", other))?;
                id.parse::<u64>()
                    .map(Capability::AccessStock)
                    .map_err(|_| format!("invalid stock id '{}'", id))
            }
        }
    }
}

/// Whether `profile` grants `capability`. No profile grants nothing.
pub fn has_capability(profile: Option<&UserProfile>, capability: Capability) -> bool {
    let Some(profile) = profile else {
        return false;
    };

    if profile.is_superuser {
        return true;
    }

    match capability {
        Capability::ViewInventory => true,
        Capability::ManageEquipment => {
            profile.in_group(ADMIN_GROUP) || profile.in_group(STANDARD_GROUP)
        }
        Capability::DeleteEquipment | Capability::ManageUsers | Capability::ManageStocks => {
            profile.in_group(ADMIN_GROUP)
        }
        Capability::AccessStock(id) => profile.estoques.contains(&id),
    }
}
