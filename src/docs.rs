use crate::api::Ack;
use crate::model::department::{CreateDepartment, Department, DepartmentWithTeams};
use crate::model::employee::{AdminUpdate, Employee, LoginRequest, RegisterEmployee, SelfUpdate, Session};
use crate::model::leave_request::{CreateLeave, EditLeave, LeaveRequest, LeaveStatus};
use crate::model::team::{CreateTeam, Team};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management API",
        version = "1.0.0",
        description = r#"
## Employee Leave Management

Employees register, log in and request leave; admins run the organisation
(departments, teams, employees) and decide on requests.

### 🔹 Key Features
- **Identity**
  - Registration, login, self-service updates, admin-managed employees
- **Organisation**
  - Departments and the teams inside them
- **Leave Requests**
  - Submit, edit and cancel while pending; admins approve or reject
- **Reporting**
  - Upcoming approved leave per employee, team or department

### 🔐 Security
Every endpoint except register and login expects a **JWT Bearer** token.
Admin rights are checked on each request against the current employee record.

### 📦 Errors
Failures are JSON: `{"error": "<kind>", "message": "<text>"}`.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::update_self,
        crate::auth::handlers::admin_update,
        crate::auth::handlers::delete,
        crate::auth::handlers::grant_admin,
        crate::auth::handlers::revoke_admin,

        crate::api::department::list_departments,
        crate::api::department::create_department,
        crate::api::department::delete_department,
        crate::api::department::department_leaves,

        crate::api::team::list_teams,
        crate::api::team::create_team,
        crate::api::team::delete_team,
        crate::api::team::team_leaves,

        crate::api::employee::list_employees,
        crate::api::employee::employee_leaves,
        crate::api::employee::monthly_leaves,

        crate::api::leave_request::list_own,
        crate::api::leave_request::submit,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::edit_leave,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave
    ),
    components(
        schemas(
            Ack,
            RegisterEmployee,
            LoginRequest,
            Session,
            SelfUpdate,
            AdminUpdate,
            Employee,
            Department,
            DepartmentWithTeams,
            CreateDepartment,
            Team,
            CreateTeam,
            LeaveStatus,
            LeaveRequest,
            CreateLeave,
            EditLeave
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, login and employee administration"),
        (name = "Department", description = "Department management APIs"),
        (name = "Team", description = "Team management APIs"),
        (name = "Employee", description = "Employee listings and leave reports"),
        (name = "Leave", description = "Leave request APIs"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme the secured paths refer to.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
