// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::sessions;
use crate::error::PersistenceError;

/// Creates a session.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The unique session token
/// * `user_id` - The session owner
/// * `expires_at` - Expiry, ISO 8601
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    user_id: i64,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::user_id.eq(user_id),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    let session_id: i64 = conn.get_last_insert_rowid()?;
    debug!(session_id, user_id, expires_at, "Session created");
    Ok(session_id)
}

/// Touches a session's `last_activity_at`.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut SqliteConnection,
    session_id: i64,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set(
            sessions::last_activity_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>(
                "CURRENT_TIMESTAMP",
            )),
        )
        .execute(conn)?;

    Ok(())
}

/// Deletes a session by token. Unknown tokens are ignored.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<(), PersistenceError> {
    debug!("Deleting session by token");

    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;

    Ok(())
}

/// Deletes sessions whose expiry lies before `now`.
///
/// Both sides are ISO 8601 UTC strings in the same format, so the comparison
/// is lexical.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: &str,
) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.lt(now))
        .execute(conn)?;

    info!(rows_affected, "Purged expired sessions");
    Ok(rows_affected)
}

/// Deletes every session a user holds.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_sessions_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::user_id.eq(user_id))
        .execute(conn)?;

    info!(user_id, rows_affected, "Revoked sessions");
    Ok(rows_affected)
}
