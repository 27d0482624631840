// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Mutlukent back office.
//!
//! Roles, branches, users, sessions and daily Z-reports live in an embedded
//! `SQLite` database managed with Diesel. Report photos live on the
//! filesystem in a [`PhotoStore`].
//!
//! ## Schema
//!
//! Migrations in `migrations/` are embedded at compile time and applied on
//! every open. The initial migration seeds the seven roles with their
//! permission tags.
//!
//! ## Invariants enforced by the database
//!
//! - `total_sales = cash_sales + credit_card_sales + debit_card_sales`
//! - amounts are never negative
//! - e-mail addresses, branch codes and session tokens are unique
//! - deleting an identity removes its profile, assignments and sessions and
//!   clears `created_by` on its reports
//!
//! ## Testing
//!
//! Tests run against `Persistence::new_in_memory()`; every call gets its own
//! isolated database.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of unique names for in-memory databases.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod photo_store;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{
    BranchData, IdentityData, ReportData, ReportFields, ReportFilter, ReportTotalData, RoleData,
    SessionData, UserAccessData, UserData, UserProfileData,
};
pub use error::PersistenceError;
pub use photo_store::PhotoStore;

use backend::PersistenceBackend;

/// Database handle for the back office.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Opens a fresh, isolated in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:mutlukent_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Opens (or creates) a database file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Roles
    // ========================================================================

    /// Lists all seeded roles.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_roles(&mut self) -> Result<Vec<RoleData>, PersistenceError> {
        queries::roles::list_roles(&mut self.conn)
    }

    /// Retrieves a role by its stored name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_role_by_name(&mut self, name: &str) -> Result<Option<RoleData>, PersistenceError> {
        queries::roles::get_role_by_name(&mut self.conn, name)
    }

    // ========================================================================
    // Branches
    // ========================================================================

    /// Lists branches ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_branches(
        &mut self,
        include_inactive: bool,
    ) -> Result<Vec<BranchData>, PersistenceError> {
        queries::branches::list_branches(&mut self.conn, include_inactive)
    }

    /// Retrieves a branch by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_branch(&mut self, branch_id: i64) -> Result<Option<BranchData>, PersistenceError> {
        queries::branches::get_branch(&mut self.conn, branch_id)
    }

    /// Ids of all active branches.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_active_branch_ids(&mut self) -> Result<Vec<i64>, PersistenceError> {
        queries::branches::list_active_branch_ids(&mut self.conn)
    }

    /// Creates an active branch.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the code is taken.
    pub fn create_branch(
        &mut self,
        name: &str,
        code: &str,
        season: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::branches::create_branch(&mut self.conn, name, code, season)
    }

    /// Overwrites a branch's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `UniqueViolation`.
    pub fn update_branch(
        &mut self,
        branch_id: i64,
        name: &str,
        code: &str,
        season: &str,
        is_active: bool,
    ) -> Result<(), PersistenceError> {
        mutations::branches::update_branch(&mut self.conn, branch_id, name, code, season, is_active)
    }

    // ========================================================================
    // Identities & Users
    // ========================================================================

    /// Creates an authentication identity with a bcrypt-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the e-mail is taken.
    pub fn create_identity(&mut self, email: &str, password: &str) -> Result<i64, PersistenceError> {
        mutations::users::create_identity(&mut self.conn, email, password)
    }

    /// Retrieves an identity by (normalized) e-mail.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_identity_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<IdentityData>, PersistenceError> {
        queries::users::get_identity_by_email(&mut self.conn, email)
    }

    /// Retrieves an identity by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_identity_by_id(
        &mut self,
        identity_id: i64,
    ) -> Result<Option<IdentityData>, PersistenceError> {
        queries::users::get_identity_by_id(&mut self.conn, identity_id)
    }

    /// Changes an identity's e-mail.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the e-mail is taken.
    pub fn update_identity_email(
        &mut self,
        identity_id: i64,
        email: &str,
    ) -> Result<(), PersistenceError> {
        mutations::users::update_identity_email(&mut self.conn, identity_id, email)
    }

    /// Replaces an identity's password.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing or the update fails.
    pub fn update_identity_password(
        &mut self,
        identity_id: i64,
        new_password: &str,
    ) -> Result<(), PersistenceError> {
        mutations::users::update_identity_password(&mut self.conn, identity_id, new_password)
    }

    /// Records a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_last_login(&mut self, identity_id: i64) -> Result<(), PersistenceError> {
        mutations::users::update_last_login(&mut self.conn, identity_id)
    }

    /// Deletes an identity, cascading to its profile and sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_identity(&mut self, identity_id: i64) -> Result<usize, PersistenceError> {
        mutations::users::delete_identity(&mut self.conn, identity_id)
    }

    /// Checks a password against a stored bcrypt hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash cannot be parsed.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PersistenceError> {
        queries::verify_password(password, password_hash)
    }

    /// Inserts the profile for an identity, with coordinator assignments.
    ///
    /// # Errors
    ///
    /// Returns `ForeignKeyViolation` if the identity, role or a branch is
    /// missing.
    pub fn insert_profile(
        &mut self,
        user_id: i64,
        profile: &UserProfileData,
        assigned_branch_ids: &[i64],
    ) -> Result<(), PersistenceError> {
        mutations::users::insert_profile(&mut self.conn, user_id, profile, assigned_branch_ids)
    }

    /// Overwrites a profile and its assignments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `ForeignKeyViolation`.
    pub fn update_profile(
        &mut self,
        user_id: i64,
        profile: &UserProfileData,
        assigned_branch_ids: &[i64],
    ) -> Result<(), PersistenceError> {
        mutations::users::update_profile(&mut self.conn, user_id, profile, assigned_branch_ids)
    }

    /// Deletes a profile row.
    ///
    /// # Errors
    ///
    /// Returns `ForeignKeyViolation` if the profile is still referenced.
    pub fn delete_profile(&mut self, user_id: i64) -> Result<usize, PersistenceError> {
        mutations::users::delete_profile(&mut self.conn, user_id)
    }

    /// Retrieves a user profile with e-mail, role and home branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user(&mut self, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user(&mut self.conn, user_id)
    }

    /// Lists users ordered by full name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_users(&mut self) -> Result<Vec<UserData>, PersistenceError> {
        queries::users::list_users(&mut self.conn)
    }

    /// Counts user profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_users(&mut self) -> Result<i64, PersistenceError> {
        queries::users::count_users(&mut self.conn)
    }

    /// Loads the access-scope resolver inputs for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_access(
        &mut self,
        user_id: i64,
    ) -> Result<Option<UserAccessData>, PersistenceError> {
        queries::users::get_user_access(&mut self.conn, user_id)
    }

    /// Branch ids assigned to a user through the join table.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_assigned_branch_ids(&mut self, user_id: i64) -> Result<Vec<i64>, PersistenceError> {
        queries::users::list_assigned_branch_ids(&mut self.conn, user_id)
    }

    // ========================================================================
    // Session Management
    // ========================================================================

    /// Creates a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        user_id: i64,
        expires_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::sessions::create_session(&mut self.conn, session_token, user_id, expires_at)
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::sessions::get_session_by_token(&mut self.conn, session_token)
    }

    /// Touches a session's activity timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_session_activity(&mut self, session_id: i64) -> Result<(), PersistenceError> {
        mutations::sessions::update_session_activity(&mut self.conn, session_id)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::sessions::delete_session(&mut self.conn, session_token)
    }

    /// Deletes sessions that expired before `now` (ISO 8601).
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_expired_sessions(&mut self, now: &str) -> Result<usize, PersistenceError> {
        mutations::sessions::delete_expired_sessions(&mut self.conn, now)
    }

    /// Deletes every session of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_sessions_for_user(&mut self, user_id: i64) -> Result<usize, PersistenceError> {
        mutations::sessions::delete_sessions_for_user(&mut self.conn, user_id)
    }

    /// Counts the sessions a user holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_sessions_for_user(&mut self, user_id: i64) -> Result<i64, PersistenceError> {
        queries::sessions::count_sessions_for_user(&mut self.conn, user_id)
    }

    // ========================================================================
    // Daily Reports
    // ========================================================================

    /// Inserts a daily report.
    ///
    /// # Errors
    ///
    /// Returns `CheckViolation` or `ForeignKeyViolation` on inconsistent
    /// input.
    pub fn insert_report(
        &mut self,
        created_by: i64,
        fields: &ReportFields,
        photo_key: Option<&str>,
    ) -> Result<i64, PersistenceError> {
        mutations::reports::insert_report(&mut self.conn, created_by, fields, photo_key)
    }

    /// Overwrites a report's fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `CheckViolation`.
    pub fn update_report(
        &mut self,
        report_id: i64,
        fields: &ReportFields,
    ) -> Result<(), PersistenceError> {
        mutations::reports::update_report(&mut self.conn, report_id, fields)
    }

    /// Hard-deletes a report.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_report(&mut self, report_id: i64) -> Result<usize, PersistenceError> {
        mutations::reports::delete_report(&mut self.conn, report_id)
    }

    /// Sets (`Some(verifier)`) or clears (`None`) a report's verification.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the report does not exist.
    pub fn set_report_verification(
        &mut self,
        report_id: i64,
        verified_by: Option<i64>,
    ) -> Result<(), PersistenceError> {
        mutations::reports::set_report_verification(&mut self.conn, report_id, verified_by)
    }

    /// Retrieves a report with branch and creator names.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_report(&mut self, report_id: i64) -> Result<Option<ReportData>, PersistenceError> {
        queries::reports::get_report(&mut self.conn, report_id)
    }

    /// Loads a page of reports, newest first. `limit: None` loads all rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_reports(
        &mut self,
        filter: &ReportFilter,
        offset: i64,
        limit: Option<i64>,
    ) -> Result<Vec<ReportData>, PersistenceError> {
        queries::reports::list_reports(&mut self.conn, filter, offset, limit)
    }

    /// Counts reports matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_reports(&mut self, filter: &ReportFilter) -> Result<i64, PersistenceError> {
        queries::reports::count_reports(&mut self.conn, filter)
    }

    /// Loads per-report totals for dashboard aggregation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_report_totals(
        &mut self,
        filter: &ReportFilter,
    ) -> Result<Vec<ReportTotalData>, PersistenceError> {
        queries::reports::list_report_totals(&mut self.conn, filter)
    }
}
