use sqlx::{MySql, Transaction};

use crate::model::employee::EmployeeChanges;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// Returns `None` when there is nothing to set. Column names come from code,
/// never from request payloads.
pub fn build_update_sql(
    table: &str,
    columns: Vec<(&'static str, SqlValue)>,
    id_column: &str,
    id_value: u64,
) -> Option<SqlUpdate> {
    if columns.is_empty() {
        return None;
    }

    let set_clause = columns
        .iter()
        .map(|(k, _)| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        table, set_clause, id_column
    );

    let mut values: Vec<SqlValue> = columns.into_iter().map(|(_, v)| v).collect();

    // WHERE id = ?
    values.push(SqlValue::U64(id_value));

    Some(SqlUpdate { sql, values })
}

/// Column list for an employee partial update.
pub fn employee_columns(changes: EmployeeChanges) -> Vec<(&'static str, SqlValue)> {
    let mut columns = Vec::new();

    if let Some(v) = changes.first_name {
        columns.push(("first_name", SqlValue::String(v)));
    }
    if let Some(v) = changes.last_name {
        columns.push(("last_name", SqlValue::String(v)));
    }
    if let Some(v) = changes.email {
        columns.push(("email", SqlValue::String(v)));
    }
    if let Some(v) = changes.password_hash {
        columns.push(("password_hash", SqlValue::String(v)));
    }
    if let Some(v) = changes.team_id {
        columns.push(("team_id", SqlValue::U64(v)));
    }

    columns
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(
    tx: &mut Transaction<'_, MySql>,
    update: SqlUpdate,
) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
        };
    }

    let result = query.execute(&mut **tx).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_to_set_builds_nothing() {
        assert!(build_update_sql("employee", Vec::new(), "id", 1).is_none());
    }

    #[test]
    fn builds_set_clause_in_field_order() {
        let changes = EmployeeChanges {
            first_name: Some("Ann".into()),
            team_id: Some(4),
            ..Default::default()
        };

        let update = build_update_sql("employee", employee_columns(changes), "id", 9).unwrap();

        assert_eq!(
            update.sql,
            "UPDATE employee SET first_name = ?, team_id = ? WHERE id = ?"
        );
        assert_eq!(
            update.values,
            vec![
                SqlValue::String("Ann".into()),
                SqlValue::U64(4),
                SqlValue::U64(9)
            ]
        );
    }
}
