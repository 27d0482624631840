// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identity, profile and assignment queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::{IdentityData, UserAccessData, UserData};
use crate::diesel_schema::{branches, identities, roles, user_branches, users};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = identities)]
struct IdentityRow {
    identity_id: i64,
    email: String,
    password_hash: String,
    created_at: String,
    last_login_at: Option<String>,
}

impl From<IdentityRow> for IdentityData {
    fn from(row: IdentityRow) -> Self {
        Self {
            identity_id: row.identity_id,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
struct UserRow {
    user_id: i64,
    full_name: String,
    role_id: i64,
    branch_id: Option<i64>,
    phone: Option<String>,
    is_active: i32,
    created_at: String,
    updated_at: String,
}

/// A profile row plus the joined identity, role and branch columns.
type JoinedUserRow = (
    UserRow,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn into_user_data(
    (row, email, last_login_at, role_name, role_display_name, branch_name): JoinedUserRow,
) -> UserData {
    UserData {
        user_id: row.user_id,
        email,
        full_name: row.full_name,
        role_id: row.role_id,
        role_name,
        role_display_name,
        branch_id: row.branch_id,
        branch_name,
        phone: row.phone,
        is_active: row.is_active != 0,
        created_at: row.created_at,
        updated_at: row.updated_at,
        last_login_at,
    }
}

/// Retrieves an identity by e-mail. The address is expected lower-cased.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no identity uses the address.
pub fn get_identity_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<IdentityData>, PersistenceError> {
    debug!("Looking up identity by e-mail");

    let result: Result<IdentityRow, diesel::result::Error> = identities::table
        .filter(identities::email.eq(email))
        .select(IdentityRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(IdentityData::from(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Retrieves an identity by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the identity does not exist.
pub fn get_identity_by_id(
    conn: &mut SqliteConnection,
    identity_id: i64,
) -> Result<Option<IdentityData>, PersistenceError> {
    let result: Result<IdentityRow, diesel::result::Error> = identities::table
        .filter(identities::identity_id.eq(identity_id))
        .select(IdentityRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(IdentityData::from(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Retrieves a user profile with its e-mail, role and home branch.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the profile does not exist.
pub fn get_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<UserData>, PersistenceError> {
    debug!(user_id, "Looking up user");

    let result: Result<JoinedUserRow, diesel::result::Error> = users::table
        .inner_join(identities::table)
        .left_join(roles::table)
        .left_join(branches::table)
        .filter(users::user_id.eq(user_id))
        .select((
            UserRow::as_select(),
            identities::email,
            identities::last_login_at,
            roles::name.nullable(),
            roles::display_name.nullable(),
            branches::name.nullable(),
        ))
        .first(conn);

    match result {
        Ok(row) => Ok(Some(into_user_data(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Lists every user ordered by full name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users(conn: &mut SqliteConnection) -> Result<Vec<UserData>, PersistenceError> {
    debug!("Listing users");

    let rows: Vec<JoinedUserRow> = users::table
        .inner_join(identities::table)
        .left_join(roles::table)
        .left_join(branches::table)
        .select((
            UserRow::as_select(),
            identities::email,
            identities::last_login_at,
            roles::name.nullable(),
            roles::display_name.nullable(),
            branches::name.nullable(),
        ))
        .order_by((users::full_name.asc(), users::user_id.asc()))
        .load(conn)?;

    Ok(rows.into_iter().map(into_user_data).collect())
}

/// Counts user profiles.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_users(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    use diesel::dsl::count;

    let total: i64 = users::table.select(count(users::user_id)).first(conn)?;
    debug!(total, "Counted users");
    Ok(total)
}

/// Loads what the access-scope resolver needs for one user.
///
/// # Errors
///
/// Returns an error if the query fails or the permission array is malformed.
/// Returns `Ok(None)` when the profile or its role is missing.
pub fn get_user_access(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<UserAccessData>, PersistenceError> {
    debug!(user_id, "Loading access data");

    let result: Result<(i64, String, String, Option<i64>, i32), diesel::result::Error> =
        users::table
            .inner_join(roles::table)
            .filter(users::user_id.eq(user_id))
            .select((
                users::user_id,
                roles::name,
                roles::permissions,
                users::branch_id,
                users::is_active,
            ))
            .first(conn);

    match result {
        Ok((user_id, role_name, permissions_json, home_branch_id, is_active)) => {
            let permissions: Vec<String> = serde_json::from_str(&permissions_json)?;
            Ok(Some(UserAccessData {
                user_id,
                role_name,
                permissions,
                home_branch_id,
                is_active: is_active != 0,
            }))
        }
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Branch ids explicitly assigned to a user, ascending.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_assigned_branch_ids(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<i64>, PersistenceError> {
    Ok(user_branches::table
        .filter(user_branches::user_id.eq(user_id))
        .select(user_branches::branch_id)
        .order_by(user_branches::branch_id.asc())
        .load(conn)?)
}

/// Checks a password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns an error if the hash cannot be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| PersistenceError::Other(format!("Failed to verify password: {e}")))
}
