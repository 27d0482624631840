// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Permission resolution against stored role and branch data.
//!
//! The resolver never fails for a missing user, a missing or unknown role, or
//! an inactive user; those resolve to a deny-all scope. Only storage failures
//! are errors.

use std::str::FromStr;

use mutlukent_domain::{AccessScope, AccessSubject, Permission, RoleName, resolve_access_scope};
use mutlukent_persistence::{Persistence, UserAccessData};
use tracing::{debug, warn};

use crate::error::{ApiError, AuthError, translate_persistence_error};

/// Resolves the access scope of a user from storage.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `user_id` - The user whose scope to resolve
///
/// # Errors
///
/// Returns `Internal` if a query fails.
pub fn resolve_scope(persistence: &mut Persistence, user_id: i64) -> Result<AccessScope, ApiError> {
    let access: Option<UserAccessData> = persistence
        .get_user_access(user_id)
        .map_err(translate_persistence_error)?;

    let Some(subject) = access.and_then(|data| to_subject(&data)) else {
        debug!(user_id, "No role data; resolving deny-all scope");
        return Ok(AccessScope::deny_all(user_id));
    };

    let active_branch_ids: Vec<i64> = persistence
        .list_active_branch_ids()
        .map_err(translate_persistence_error)?;
    let assigned_branch_ids: Vec<i64> = persistence
        .list_assigned_branch_ids(user_id)
        .map_err(translate_persistence_error)?;

    let scope: AccessScope = resolve_access_scope(
        user_id,
        Some(&subject),
        &active_branch_ids,
        &assigned_branch_ids,
    );
    debug!(
        user_id,
        role = ?scope.role,
        branches = scope.branch_ids.len(),
        "Resolved access scope"
    );
    Ok(scope)
}

fn to_subject(data: &UserAccessData) -> Option<AccessSubject> {
    let role: RoleName = match RoleName::from_str(&data.role_name) {
        Ok(role) => role,
        Err(e) => {
            warn!(user_id = data.user_id, error = %e, "Unknown role on user");
            return None;
        }
    };

    let permissions: Vec<Permission> = data
        .permissions
        .iter()
        .filter_map(|tag| match Permission::from_str(tag) {
            Ok(permission) => Some(permission),
            Err(e) => {
                warn!(role = %role, error = %e, "Ignoring unknown permission tag");
                None
            }
        })
        .collect();

    Some(AccessSubject {
        user_id: data.user_id,
        role,
        permissions,
        home_branch_id: data.home_branch_id,
        is_active: data.is_active,
    })
}

/// Checks that a scope carries a permission.
///
/// # Arguments
///
/// * `scope` - The caller's access scope
/// * `permission` - The required permission
/// * `action` - The attempted action, for logs
/// * `message` - The localized refusal message
///
/// # Errors
///
/// Returns `Unauthorized` if the permission is missing.
pub fn require(
    scope: &AccessScope,
    permission: Permission,
    action: &str,
    message: &str,
) -> Result<(), AuthError> {
    if scope.has(permission) {
        return Ok(());
    }
    warn!(
        user_id = scope.user_id,
        action,
        required = %permission,
        "Permission denied"
    );
    Err(AuthError::Unauthorized {
        action: action.to_string(),
        required_permission: permission.as_str().to_string(),
        message: message.to_string(),
    })
}
