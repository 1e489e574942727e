use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::model::role::Role;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SalaryBasis {
    #[default]
    Monthly,
    Annual,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub designation: Option<String>,
    pub role: Role,
    pub is_active: bool,
    /// Missing when HR has not set a salary yet.
    pub salary: Option<f64>,
    pub salary_type: SalaryBasis,
}
