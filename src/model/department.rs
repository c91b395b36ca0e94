use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::team::Team;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Department {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Engineering")]
    pub department_name: String,
}

/// Listing shape: a department with its teams.
#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentWithTeams {
    pub id: u64,
    pub department_name: String,
    pub teams: Vec<Team>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Engineering")]
    pub department_name: String,
}
