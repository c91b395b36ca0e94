use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "team_id": 2,
        "is_admin": false
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[serde(skip)]
    pub password_hash: String,

    #[schema(example = 2)]
    pub team_id: u64,

    #[schema(example = false)]
    pub is_admin: bool,
}

/// Row to insert; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub team_id: u64,
    pub is_admin: bool,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct EmployeeChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub team_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct RegisterEmployee {
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = 2)]
    pub team_id: u64,
    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: String,
    #[schema(example = "secret1", format = "password")]
    pub password: String,
    #[schema(example = false)]
    pub is_admin: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "john.doe@company.com")]
    pub email: String,
    #[schema(example = "secret1")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Session {
    pub email: String,
    pub is_admin: bool,
    pub token: String,
}

/// Fields an employee may change on their own record.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SelfUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(format = "password")]
    pub password: Option<String>,
}

/// Fields an admin may change on any employee record.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdminUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub team_id: Option<u64>,
}
