// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::BranchData;
use crate::diesel_schema::branches;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = branches)]
struct BranchRow {
    branch_id: i64,
    name: String,
    code: String,
    season: String,
    is_active: i32,
    created_at: String,
}

impl From<BranchRow> for BranchData {
    fn from(row: BranchRow) -> Self {
        Self {
            branch_id: row.branch_id,
            name: row.name,
            code: row.code,
            season: row.season,
            is_active: row.is_active != 0,
            created_at: row.created_at,
        }
    }
}

/// Lists branches ordered by name.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `include_inactive` - Whether deactivated branches are included
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_branches(
    conn: &mut SqliteConnection,
    include_inactive: bool,
) -> Result<Vec<BranchData>, PersistenceError> {
    debug!(include_inactive, "Listing branches");

    let mut query = branches::table.into_boxed();
    if !include_inactive {
        query = query.filter(branches::is_active.eq(1));
    }

    let rows: Vec<BranchRow> = query
        .select(BranchRow::as_select())
        .order_by((branches::name.asc(), branches::branch_id.asc()))
        .load(conn)?;

    Ok(rows.into_iter().map(BranchData::from).collect())
}

/// Retrieves a branch by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the branch does not exist.
pub fn get_branch(
    conn: &mut SqliteConnection,
    branch_id: i64,
) -> Result<Option<BranchData>, PersistenceError> {
    debug!(branch_id, "Looking up branch");

    let result: Result<BranchRow, diesel::result::Error> = branches::table
        .filter(branches::branch_id.eq(branch_id))
        .select(BranchRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(BranchData::from(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Ids of all active branches, ascending.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_active_branch_ids(conn: &mut SqliteConnection) -> Result<Vec<i64>, PersistenceError> {
    Ok(branches::table
        .filter(branches::is_active.eq(1))
        .select(branches::branch_id)
        .order_by(branches::branch_id.asc())
        .load(conn)?)
}
