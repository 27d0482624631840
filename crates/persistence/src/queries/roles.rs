// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::RoleData;
use crate::diesel_schema::roles;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = roles)]
pub(crate) struct RoleRow {
    pub role_id: i64,
    pub name: String,
    pub display_name: String,
    pub permissions: String,
}

impl RoleRow {
    /// Decodes the JSON permission array.
    pub(crate) fn into_data(self) -> Result<RoleData, PersistenceError> {
        let permissions: Vec<String> = serde_json::from_str(&self.permissions)?;
        Ok(RoleData {
            role_id: self.role_id,
            name: self.name,
            display_name: self.display_name,
            permissions,
        })
    }
}

/// Lists all roles ordered by id.
///
/// # Errors
///
/// Returns an error if the query fails or a permission array is malformed.
pub fn list_roles(conn: &mut SqliteConnection) -> Result<Vec<RoleData>, PersistenceError> {
    debug!("Listing roles");

    let rows: Vec<RoleRow> = roles::table
        .select(RoleRow::as_select())
        .order_by(roles::role_id.asc())
        .load(conn)?;

    rows.into_iter().map(RoleRow::into_data).collect()
}

/// Retrieves a role by its stored name (e.g. `branch_manager`).
///
/// # Errors
///
/// Returns an error if the query fails.
/// Returns `Ok(None)` if no role has that name.
pub fn get_role_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<RoleData>, PersistenceError> {
    debug!(name, "Looking up role");

    let result: Result<RoleRow, diesel::result::Error> = roles::table
        .filter(roles::name.eq(name))
        .select(RoleRow::as_select())
        .first(conn);

    match result {
        Ok(row) => row.into_data().map(Some),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
