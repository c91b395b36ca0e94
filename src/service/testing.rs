//! Seeded in-memory world shared by service and route tests.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use crate::auth::auth::AuthUser;
use crate::model::employee::NewEmployee;
use crate::store::{Store, memory::MemoryStore};

pub const SECRET: &str = "test-secret";

pub fn days_from_today(days: i64) -> NaiveDate {
    super::today() + Duration::days(days)
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub department_id: u64,
    pub team_id: u64,
    pub admin: AuthUser,
    pub employee: AuthUser,
}

impl Fixture {
    /// One department, one team, one admin and one regular employee.
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let department = store.insert_department("Engineering").await.unwrap();
        let team = store
            .insert_team("Platform Team", department.id)
            .await
            .unwrap();

        let admin = seed(&store, "Root", "Admin", "admin@x.com", team.id, true).await;
        let employee = seed(&store, "Eve", "Worker", "eve@x.com", team.id, false).await;

        Self {
            store,
            department_id: department.id,
            team_id: team.id,
            admin,
            employee,
        }
    }

    pub fn store(&self) -> &dyn Store {
        &*self.store
    }

    pub async fn add_team(&self, name: &str) -> u64 {
        self.store
            .insert_team(name, self.department_id)
            .await
            .unwrap()
            .id
    }

    pub async fn add_employee(&self, email: &str, team_id: u64) -> AuthUser {
        seed(&self.store, "New", "Hire", email, team_id, false).await
    }
}

async fn seed(
    store: &MemoryStore,
    first_name: &str,
    last_name: &str,
    email: &str,
    team_id: u64,
    is_admin: bool,
) -> AuthUser {
    let employee = store
        .insert_employee(NewEmployee {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            // never verifies; tests that log in register through the service
            password_hash: "unset".into(),
            team_id,
            is_admin,
        })
        .await
        .unwrap();

    AuthUser {
        employee_id: employee.id,
        email: employee.email,
        is_admin: employee.is_admin,
    }
}
