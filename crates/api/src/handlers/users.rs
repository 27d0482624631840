// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User administration.
//!
//! A user is two rows: an authentication identity (email and password hash)
//! and a profile sharing its id. Creates write the identity first and remove
//! it again if the profile cannot be written.

use std::collections::BTreeMap;

use mutlukent_domain::{Permission, RoleName, normalize_email, validate_full_name};
use mutlukent_persistence::{
    IdentityData, Persistence, PersistenceError, RoleData, UserData, UserProfileData,
};
use tracing::{info, warn};

use super::session::DEFAULT_ROLE_LABEL;
use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::password_policy::PasswordPolicy;
use crate::permissions::require;
use crate::request_response::{
    CreateUserRequest, DeleteUserResponse, ListRolesResponse, ListUsersResponse, RoleInfo,
    SaveUserResponse, UpdateUserRequest, UserInfo,
};

pub const MANAGE_USERS_DENIED_MESSAGE: &str = "Kullanıcı yönetimi yetkiniz yok.";
pub const ROLE_NOT_FOUND_MESSAGE: &str = "Seçilen rol bulunamadı.";
pub const DUPLICATE_EMAIL_MESSAGE: &str = "Bu e-posta adresi zaten kullanılıyor.";
pub const SELF_DELETE_MESSAGE: &str = "Kendi hesabınızı silemezsiniz.";

/// Shown when a user has no home branch.
pub const NO_BRANCH_LABEL: &str = "-";

fn require_manage_users(user: &AuthenticatedUser, action: &str) -> Result<(), ApiError> {
    require(
        &user.scope,
        Permission::ManageUsers,
        action,
        MANAGE_USERS_DENIED_MESSAGE,
    )?;
    Ok(())
}

fn role_not_found() -> ApiError {
    let mut field_errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
    field_errors.insert(
        String::from("role"),
        vec![String::from(ROLE_NOT_FOUND_MESSAGE)],
    );
    ApiError::ValidationFailed {
        message: String::from(ROLE_NOT_FOUND_MESSAGE),
        field_errors,
    }
}

fn user_not_found(user_id: i64) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: String::from("Kullanıcı"),
        message: format!("Kullanıcı bulunamadı: {user_id}"),
    }
}

fn clean_phone(phone: Option<&str>) -> Option<String> {
    phone
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

/// Keeps explicit branch assignments only for coordinators.
fn assignments_for(role_name: &str, requested: &[i64]) -> Vec<i64> {
    if role_name == RoleName::Coordinator.as_str() {
        let mut ids: Vec<i64> = requested.to_vec();
        ids.sort_unstable();
        ids.dedup();
        ids
    } else {
        Vec::new()
    }
}

fn ensure_email_free(
    persistence: &mut Persistence,
    email: &str,
    except_user_id: Option<i64>,
) -> Result<(), ApiError> {
    let existing: Option<IdentityData> = persistence
        .get_identity_by_email(email)
        .map_err(translate_persistence_error)?;
    match existing {
        Some(identity) if Some(identity.identity_id) != except_user_id => {
            Err(ApiError::field("email", DUPLICATE_EMAIL_MESSAGE))
        }
        _ => Ok(()),
    }
}

fn to_user_info(persistence: &mut Persistence, user: UserData) -> Result<UserInfo, ApiError> {
    let assigned_branch_ids: Vec<i64> = persistence
        .list_assigned_branch_ids(user.user_id)
        .map_err(translate_persistence_error)?;
    Ok(UserInfo {
        user_id: user.user_id,
        email: user.email,
        full_name: user.full_name,
        role: user.role_name,
        role_display_name: user
            .role_display_name
            .unwrap_or_else(|| String::from(DEFAULT_ROLE_LABEL)),
        branch_id: user.branch_id,
        branch_name: user
            .branch_name
            .unwrap_or_else(|| String::from(NO_BRANCH_LABEL)),
        assigned_branch_ids,
        phone: user.phone,
        is_active: user.is_active,
        created_at: user.created_at,
        last_login_at: user.last_login_at,
    })
}

fn write_new_profile(
    persistence: &mut Persistence,
    user_id: i64,
    full_name: String,
    request: &CreateUserRequest,
) -> Result<(), ApiError> {
    let role: RoleData = persistence
        .get_role_by_name(request.role.trim())
        .map_err(translate_persistence_error)?
        .ok_or_else(role_not_found)?;
    let profile: UserProfileData = UserProfileData {
        full_name,
        role_id: role.role_id,
        branch_id: request.branch_id,
        phone: clean_phone(request.phone.as_deref()),
        is_active: request.is_active,
    };
    persistence
        .insert_profile(
            user_id,
            &profile,
            &assignments_for(&role.name, &request.assigned_branch_ids),
        )
        .map_err(translate_persistence_error)
}

/// Lists users ordered by full name.
///
/// # Errors
///
/// Returns `Unauthorized` without `manage_users`.
pub fn list_users(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
) -> Result<ListUsersResponse, ApiError> {
    require_manage_users(user, "list_users")?;

    let users: Vec<UserData> = persistence
        .list_users()
        .map_err(translate_persistence_error)?;
    let users: Vec<UserInfo> = users
        .into_iter()
        .map(|u| to_user_info(persistence, u))
        .collect::<Result<Vec<UserInfo>, ApiError>>()?;

    Ok(ListUsersResponse { users })
}

/// Lists the seeded roles for the user form.
///
/// # Errors
///
/// Returns `Unauthorized` without `manage_users`.
pub fn list_roles(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
) -> Result<ListRolesResponse, ApiError> {
    require_manage_users(user, "list_roles")?;

    let roles: Vec<RoleData> = persistence
        .list_roles()
        .map_err(translate_persistence_error)?;
    Ok(ListRolesResponse {
        roles: roles
            .into_iter()
            .map(|role| RoleInfo {
                role_id: role.role_id,
                name: role.name,
                display_name: role.display_name,
                permissions: role.permissions,
            })
            .collect(),
    })
}

/// Creates a user: identity first, then profile.
///
/// If the role is unknown or the profile cannot be written, the identity is
/// deleted again so no orphan login remains.
///
/// # Errors
///
/// Returns an error if:
/// - The caller lacks `manage_users`
/// - The email, name or password is invalid, or the email is taken
/// - The role does not exist
/// - Any write fails
pub fn create_user(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    request: &CreateUserRequest,
) -> Result<SaveUserResponse, ApiError> {
    require_manage_users(user, "create_user")?;

    let email: String = normalize_email(&request.email).map_err(translate_domain_error)?;
    let full_name: String =
        validate_full_name(&request.full_name).map_err(translate_domain_error)?;
    PasswordPolicy::default().validate(&request.password, &email)?;
    ensure_email_free(persistence, &email, None)?;

    let user_id: i64 = persistence
        .create_identity(&email, &request.password)
        .map_err(|e| match e {
            PersistenceError::UniqueViolation(_) => {
                ApiError::field("email", DUPLICATE_EMAIL_MESSAGE)
            }
            other => translate_persistence_error(other),
        })?;

    let profile_result: Result<(), ApiError> =
        write_new_profile(persistence, user_id, full_name, request);

    if let Err(e) = profile_result {
        warn!(user_id, error = %e, "Profile write failed; removing identity");
        if let Err(cleanup) = persistence.delete_identity(user_id) {
            warn!(user_id, error = %cleanup, "Failed to remove orphaned identity");
        }
        return Err(e);
    }

    info!(
        user_id,
        created_by = user.user_id(),
        role = %request.role,
        "Created user"
    );
    Ok(SaveUserResponse {
        user_id,
        email,
        message: String::from("Kullanıcı oluşturuldu."),
    })
}

/// Updates a user's identity and profile.
///
/// The password changes only when a non-empty one is supplied. Deactivating
/// a user ends all of their sessions.
///
/// # Errors
///
/// Returns an error if:
/// - The caller lacks `manage_users`
/// - The user does not exist
/// - Any field is invalid, the email is taken, or the role does not exist
pub fn update_user(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    user_id: i64,
    request: &UpdateUserRequest,
) -> Result<SaveUserResponse, ApiError> {
    require_manage_users(user, "update_user")?;

    let existing: UserData = persistence
        .get_user(user_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| user_not_found(user_id))?;

    let email: String = normalize_email(&request.email).map_err(translate_domain_error)?;
    let full_name: String =
        validate_full_name(&request.full_name).map_err(translate_domain_error)?;
    let new_password: Option<&str> = request.password.as_deref().filter(|p| !p.is_empty());
    if let Some(password) = new_password {
        PasswordPolicy::default().validate(password, &email)?;
    }
    let role: RoleData = persistence
        .get_role_by_name(request.role.trim())
        .map_err(translate_persistence_error)?
        .ok_or_else(role_not_found)?;

    if email != existing.email {
        ensure_email_free(persistence, &email, Some(user_id))?;
        persistence
            .update_identity_email(user_id, &email)
            .map_err(translate_persistence_error)?;
    }
    if let Some(password) = new_password {
        persistence
            .update_identity_password(user_id, password)
            .map_err(translate_persistence_error)?;
        info!(user_id, "Password changed");
    }

    let profile: UserProfileData = UserProfileData {
        full_name,
        role_id: role.role_id,
        branch_id: request.branch_id,
        phone: clean_phone(request.phone.as_deref()),
        is_active: request.is_active,
    };
    persistence
        .update_profile(
            user_id,
            &profile,
            &assignments_for(&role.name, &request.assigned_branch_ids),
        )
        .map_err(translate_persistence_error)?;

    if !request.is_active {
        let revoked: usize = persistence
            .delete_sessions_for_user(user_id)
            .map_err(translate_persistence_error)?;
        info!(user_id, revoked, "Deactivated user; sessions revoked");
    }

    info!(user_id, updated_by = user.user_id(), "Updated user");
    Ok(SaveUserResponse {
        user_id,
        email,
        message: String::from("Kullanıcı güncellendi."),
    })
}

/// Deletes a user.
///
/// Removing the identity cascades to the profile and sessions. The follow-up
/// profile delete tolerates a foreign-key error from that cascade.
///
/// # Errors
///
/// Returns an error if the caller lacks `manage_users`, targets their own
/// account, or the user does not exist.
pub fn delete_user(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    user_id: i64,
) -> Result<DeleteUserResponse, ApiError> {
    require_manage_users(user, "delete_user")?;

    if user_id == user.user_id() {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("no_self_delete"),
            message: String::from(SELF_DELETE_MESSAGE),
        });
    }

    let removed: usize = persistence
        .delete_identity(user_id)
        .map_err(translate_persistence_error)?;
    if removed == 0 {
        return Err(user_not_found(user_id));
    }

    match persistence.delete_profile(user_id) {
        Ok(_) => {}
        Err(PersistenceError::ForeignKeyViolation(message)) => {
            warn!(user_id, %message, "Profile delete raced the cascade; ignoring");
        }
        Err(e) => return Err(translate_persistence_error(e)),
    }

    info!(user_id, deleted_by = user.user_id(), "Deleted user");
    Ok(DeleteUserResponse {
        user_id,
        message: String::from("Kullanıcı başarıyla silindi."),
    })
}
