use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Team {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Development Team")]
    pub team_name: String,
    #[schema(example = 1)]
    pub department_id: u64,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateTeam {
    #[schema(example = "Development Team")]
    pub team_name: String,
    /// Optional in the payload so a missing value is reported as a validation error.
    #[schema(example = 1)]
    pub department_id: Option<u64>,
}
