use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Role {
    Admin = 1,
    SubAdmin = 2,
    Employee = 3,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::SubAdmin),
            3 => Some(Role::Employee),
            _ => None,
        }
    }

    /// Admin and sub-admin may run administrative reads and settings updates.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Admin | Role::SubAdmin)
    }
}
