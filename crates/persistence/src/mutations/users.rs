// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identity and profile mutations.
//!
//! A user is written in two steps: the identity (login e-mail and password
//! hash) first, then the profile that shares its id. Deleting the identity
//! cascades to the profile, its assignments and its sessions, and nulls out
//! `created_by` on the user's reports.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::UserProfileData;
use crate::diesel_schema::{identities, user_branches, users};
use crate::error::PersistenceError;

fn hash_password(password: &str) -> Result<String, PersistenceError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))
}

/// Creates an authentication identity.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `email` - The normalized e-mail address
/// * `password` - The plain-text password (will be hashed)
///
/// # Errors
///
/// Returns `UniqueViolation` if the e-mail is taken.
pub fn create_identity(
    conn: &mut SqliteConnection,
    email: &str,
    password: &str,
) -> Result<i64, PersistenceError> {
    let password_hash: String = hash_password(password)?;

    diesel::insert_into(identities::table)
        .values((
            identities::email.eq(email),
            identities::password_hash.eq(&password_hash),
        ))
        .execute(conn)?;

    let identity_id: i64 = conn.get_last_insert_rowid()?;
    info!(identity_id, "Created identity");
    Ok(identity_id)
}

/// Changes an identity's e-mail.
///
/// # Errors
///
/// Returns `UniqueViolation` if the e-mail is taken.
pub fn update_identity_email(
    conn: &mut SqliteConnection,
    identity_id: i64,
    email: &str,
) -> Result<(), PersistenceError> {
    diesel::update(identities::table)
        .filter(identities::identity_id.eq(identity_id))
        .set(identities::email.eq(email))
        .execute(conn)?;
    Ok(())
}

/// Replaces an identity's password.
///
/// # Errors
///
/// Returns an error if hashing or the update fails.
pub fn update_identity_password(
    conn: &mut SqliteConnection,
    identity_id: i64,
    new_password: &str,
) -> Result<(), PersistenceError> {
    let password_hash: String = hash_password(new_password)?;

    diesel::update(identities::table)
        .filter(identities::identity_id.eq(identity_id))
        .set(identities::password_hash.eq(&password_hash))
        .execute(conn)?;

    info!(identity_id, "Password updated");
    Ok(())
}

/// Records a successful login.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_last_login(
    conn: &mut SqliteConnection,
    identity_id: i64,
) -> Result<(), PersistenceError> {
    diesel::update(identities::table)
        .filter(identities::identity_id.eq(identity_id))
        .set(identities::last_login_at.eq(diesel::dsl::sql::<
            diesel::sql_types::Nullable<diesel::sql_types::Text>,
        >("CURRENT_TIMESTAMP")))
        .execute(conn)?;
    Ok(())
}

/// Deletes an identity and, by cascade, its profile and sessions.
///
/// # Returns
///
/// The number of identities removed (0 or 1).
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_identity(
    conn: &mut SqliteConnection,
    identity_id: i64,
) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(identities::table)
        .filter(identities::identity_id.eq(identity_id))
        .execute(conn)?;

    info!(identity_id, rows_affected, "Deleted identity");
    Ok(rows_affected)
}

fn replace_assignments(
    conn: &mut SqliteConnection,
    user_id: i64,
    branch_ids: &[i64],
) -> Result<(), diesel::result::Error> {
    diesel::delete(user_branches::table)
        .filter(user_branches::user_id.eq(user_id))
        .execute(conn)?;

    let rows: Vec<_> = branch_ids
        .iter()
        .map(|branch_id| {
            (
                user_branches::user_id.eq(user_id),
                user_branches::branch_id.eq(*branch_id),
            )
        })
        .collect();
    if !rows.is_empty() {
        diesel::insert_into(user_branches::table)
            .values(rows)
            .execute(conn)?;
    }
    Ok(())
}

/// Inserts the profile for an existing identity, plus branch assignments.
///
/// Runs in one transaction: either the profile and all assignments land, or
/// nothing does.
///
/// # Errors
///
/// Returns `ForeignKeyViolation` if the identity, role or a branch is missing.
pub fn insert_profile(
    conn: &mut SqliteConnection,
    user_id: i64,
    profile: &UserProfileData,
    assigned_branch_ids: &[i64],
) -> Result<(), PersistenceError> {
    conn.transaction::<(), diesel::result::Error, _>(|conn| {
        diesel::insert_into(users::table)
            .values((
                users::user_id.eq(user_id),
                users::full_name.eq(&profile.full_name),
                users::role_id.eq(profile.role_id),
                users::branch_id.eq(profile.branch_id),
                users::phone.eq(profile.phone.as_deref()),
                users::is_active.eq(i32::from(profile.is_active)),
            ))
            .execute(conn)?;
        replace_assignments(conn, user_id, assigned_branch_ids)
    })?;

    info!(user_id, role_id = profile.role_id, "Created user profile");
    Ok(())
}

/// Overwrites a profile and its branch assignments.
///
/// # Errors
///
/// Returns `NotFound` if the profile does not exist, or
/// `ForeignKeyViolation` if the role or a branch is missing.
pub fn update_profile(
    conn: &mut SqliteConnection,
    user_id: i64,
    profile: &UserProfileData,
    assigned_branch_ids: &[i64],
) -> Result<(), PersistenceError> {
    let rows_affected: usize = conn.transaction::<usize, diesel::result::Error, _>(|conn| {
        let rows: usize = diesel::update(users::table)
            .filter(users::user_id.eq(user_id))
            .set((
                users::full_name.eq(&profile.full_name),
                users::role_id.eq(profile.role_id),
                users::branch_id.eq(profile.branch_id),
                users::phone.eq(profile.phone.as_deref()),
                users::is_active.eq(i32::from(profile.is_active)),
                users::updated_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>(
                    "CURRENT_TIMESTAMP",
                )),
            ))
            .execute(conn)?;
        if rows > 0 {
            replace_assignments(conn, user_id, assigned_branch_ids)?;
        }
        Ok(rows)
    })?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "User with ID {user_id} not found"
        )));
    }

    debug!(user_id, "Updated user profile");
    Ok(())
}

/// Deletes a profile row.
///
/// # Returns
///
/// The number of profiles removed (0 when the identity delete already
/// cascaded).
///
/// # Errors
///
/// Returns `ForeignKeyViolation` if another row still references the profile.
pub fn delete_profile(conn: &mut SqliteConnection, user_id: i64) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(users::table)
        .filter(users::user_id.eq(user_id))
        .execute(conn)?;
    debug!(user_id, rows_affected, "Deleted user profile");
    Ok(rows_affected)
}
