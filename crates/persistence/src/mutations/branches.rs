// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::branches;
use crate::error::PersistenceError;

/// Creates an active branch.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `name` - Display name
/// * `code` - Unique short code
/// * `season` - `summer`, `winter` or `all_year`
///
/// # Errors
///
/// Returns `UniqueViolation` if the code is taken.
pub fn create_branch(
    conn: &mut SqliteConnection,
    name: &str,
    code: &str,
    season: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(branches::table)
        .values((
            branches::name.eq(name),
            branches::code.eq(code),
            branches::season.eq(season),
            branches::is_active.eq(1),
        ))
        .execute(conn)?;

    let branch_id: i64 = conn.get_last_insert_rowid()?;
    info!(branch_id, code, "Created branch");
    Ok(branch_id)
}

/// Overwrites a branch's editable fields.
///
/// # Errors
///
/// Returns `NotFound` if the branch does not exist, or `UniqueViolation` if
/// the new code is taken.
pub fn update_branch(
    conn: &mut SqliteConnection,
    branch_id: i64,
    name: &str,
    code: &str,
    season: &str,
    is_active: bool,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(branches::table)
        .filter(branches::branch_id.eq(branch_id))
        .set((
            branches::name.eq(name),
            branches::code.eq(code),
            branches::season.eq(season),
            branches::is_active.eq(i32::from(is_active)),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Branch with ID {branch_id} not found"
        )));
    }

    info!(branch_id, is_active, "Updated branch");
    Ok(())
}
