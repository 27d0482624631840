// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and session services.

use mutlukent_domain::{AccessScope, RoleName, normalize_email};
use mutlukent_persistence::{
    IdentityData, Persistence, PersistenceError, RoleData, SessionData, UserData, UserProfileData,
};
use time::format_description::well_known::Iso8601;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::error::{ApiError, AuthError, SESSION_REQUIRED_MESSAGE, translate_persistence_error};
use crate::password_policy::PasswordPolicy;
use crate::permissions::resolve_scope;

/// Message for an unknown email or a wrong password.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "E-posta veya şifre hatalı.";

/// Message for a deactivated account.
pub const INACTIVE_ACCOUNT_MESSAGE: &str =
    "Hesabınız pasif durumdadır. Lütfen sistem yöneticisi ile iletişime geçiniz.";

/// A user whose session was validated, with the scope resolved for this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user: UserData,
    pub scope: AccessScope,
}

impl AuthenticatedUser {
    #[must_use]
    pub const fn user_id(&self) -> i64 {
        self.user.user_id
    }
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Session lifetime.
    const DEFAULT_SESSION_EXPIRATION: Duration = Duration::days(30);

    /// Verifies credentials and creates a session.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `email` - The login email, in any case
    /// * `password` - The plain-text password
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_user`, `expires_at`)
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are wrong, the profile is missing
    /// or inactive, or the session cannot be stored.
    pub fn login(
        persistence: &mut Persistence,
        email: &str,
        password: &str,
    ) -> Result<(String, AuthenticatedUser, String), AuthError> {
        let invalid = || AuthError::AuthenticationFailed {
            reason: String::from(INVALID_CREDENTIALS_MESSAGE),
        };

        let email: String = normalize_email(email).map_err(|_| invalid())?;
        let identity: IdentityData = persistence
            .get_identity_by_email(&email)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| {
                debug!(email = %email, "Login for unknown email");
                invalid()
            })?;

        let matches: bool = persistence
            .verify_password(password, &identity.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !matches {
            warn!(user_id = identity.identity_id, "Login with wrong password");
            return Err(invalid());
        }

        let user: UserData = persistence
            .get_user(identity.identity_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(invalid)?;
        if !user.is_active {
            warn!(user_id = user.user_id, "Login for inactive user");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from(INACTIVE_ACCOUNT_MESSAGE),
            });
        }

        let session_token: String = Self::generate_session_token();
        let expires_at: String =
            Self::format_timestamp(OffsetDateTime::now_utc() + Self::DEFAULT_SESSION_EXPIRATION)?;

        persistence
            .create_session(&session_token, user.user_id, &expires_at)
            .map_err(Self::map_persistence_error)?;
        persistence
            .update_last_login(user.user_id)
            .map_err(Self::map_persistence_error)?;

        let scope: AccessScope =
            resolve_scope(persistence, user.user_id).map_err(|e| AuthError::Internal {
                message: e.to_string(),
            })?;

        info!(user_id = user.user_id, "User logged in");
        Ok((session_token, AuthenticatedUser { user, scope }, expires_at))
    }

    /// Validates a session token and resolves the caller's scope.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationFailed` if the token is unknown or expired, or
    /// the user is missing or inactive, and `Internal` if storage fails.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let rejected = || AuthError::AuthenticationFailed {
            reason: String::from(SESSION_REQUIRED_MESSAGE),
        };

        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| {
                warn!("Unknown session token");
                rejected()
            })?;

        let expires_at: OffsetDateTime =
            OffsetDateTime::parse(&session.expires_at, &Iso8601::DEFAULT).map_err(|e| {
                warn!(session_id = session.session_id, error = %e, "Unparseable session expiry");
                rejected()
            })?;
        if OffsetDateTime::now_utc() > expires_at {
            warn!(session_id = session.session_id, "Session expired");
            return Err(rejected());
        }

        let user: UserData = persistence
            .get_user(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(rejected)?;
        if !user.is_active {
            warn!(user_id = user.user_id, "Session of inactive user");
            return Err(rejected());
        }

        persistence
            .update_session_activity(session.session_id)
            .map_err(Self::map_persistence_error)?;

        let scope: AccessScope =
            resolve_scope(persistence, user.user_id).map_err(|e| AuthError::Internal {
                message: e.to_string(),
            })?;

        Ok(AuthenticatedUser { user, scope })
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)?;
        info!("Session closed");
        Ok(())
    }

    /// Deletes every session whose expiry has passed.
    ///
    /// # Returns
    ///
    /// The number of sessions removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn purge_expired_sessions(persistence: &mut Persistence) -> Result<usize, ApiError> {
        let now: String = Self::format_timestamp(OffsetDateTime::now_utc())?;
        let removed: usize = persistence
            .delete_expired_sessions(&now)
            .map_err(translate_persistence_error)?;
        info!(removed, "Purged expired sessions");
        Ok(removed)
    }

    /// Creates the first admin when no user exists yet.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `email` - The admin login email
    /// * `password` - The admin password, subject to the password policy
    ///
    /// # Returns
    ///
    /// The new user id, or `None` if users already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or any write fails. A half-created
    /// identity is removed again.
    pub fn bootstrap_admin(
        persistence: &mut Persistence,
        email: &str,
        password: &str,
    ) -> Result<Option<i64>, ApiError> {
        let existing: i64 = persistence
            .count_users()
            .map_err(translate_persistence_error)?;
        if existing > 0 {
            debug!(existing, "Users present; skipping admin bootstrap");
            return Ok(None);
        }

        let email: String = normalize_email(email).map_err(crate::error::translate_domain_error)?;
        PasswordPolicy::default().validate(password, &email)?;

        let role: RoleData = persistence
            .get_role_by_name(RoleName::Admin.as_str())
            .map_err(translate_persistence_error)?
            .ok_or_else(|| ApiError::Internal {
                message: String::from("Admin role is not seeded"),
            })?;

        let user_id: i64 = persistence
            .create_identity(&email, password)
            .map_err(translate_persistence_error)?;
        let profile: UserProfileData = UserProfileData {
            full_name: String::from(RoleName::Admin.display_name()),
            role_id: role.role_id,
            branch_id: None,
            phone: None,
            is_active: true,
        };
        if let Err(e) = persistence.insert_profile(user_id, &profile, &[]) {
            if let Err(cleanup) = persistence.delete_identity(user_id) {
                warn!(user_id, error = %cleanup, "Failed to remove bootstrap identity");
            }
            return Err(translate_persistence_error(e));
        }

        info!(user_id, email = %email, "Bootstrapped first admin");
        Ok(Some(user_id))
    }

    /// Generates an opaque session token.
    fn generate_session_token() -> String {
        let timestamp: i128 = OffsetDateTime::now_utc().unix_timestamp_nanos();
        format!(
            "session_{timestamp}_{:016x}{:016x}",
            rand::random::<u64>(),
            rand::random::<u64>()
        )
    }

    fn format_timestamp(at: OffsetDateTime) -> Result<String, AuthError> {
        at.format(&Iso8601::DEFAULT)
            .map_err(|e| AuthError::Internal {
                message: format!("Failed to format timestamp: {e}"),
            })
    }

    /// Storage failures are internal errors, never authentication failures.
    pub(crate) fn map_persistence_error(err: PersistenceError) -> AuthError {
        AuthError::Internal {
            message: format!("Database error: {err}"),
        }
    }
}
