// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use mutlukent_persistence::Persistence;

use crate::auth::{AuthenticatedUser, AuthenticationService};
use crate::capabilities::compute_global_capabilities;
use crate::error::ApiError;
use crate::request_response::{LoginRequest, LoginResponse, WhoAmIResponse};

/// Shown when a user's role cannot be resolved.
pub const DEFAULT_ROLE_LABEL: &str = "Kullanıcı";

/// Logs in with email and password.
///
/// # Errors
///
/// Returns `AuthenticationFailed` for bad credentials or an inactive account.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let (session_token, user, expires_at): (String, AuthenticatedUser, String) =
        AuthenticationService::login(persistence, &request.email, &request.password)?;

    Ok(LoginResponse {
        session_token,
        expires_at,
        user: whoami(&user),
    })
}

/// Logs out by deleting the session.
///
/// # Errors
///
/// Returns an error if the logout fails.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Describes the caller: profile, role, branches and capabilities.
#[must_use]
pub fn whoami(user: &AuthenticatedUser) -> WhoAmIResponse {
    WhoAmIResponse {
        user_id: user.user.user_id,
        email: user.user.email.clone(),
        full_name: user.user.full_name.clone(),
        role: user.scope.role.map(|role| role.as_str().to_string()),
        role_display_name: user
            .scope
            .role
            .map_or_else(|| String::from(DEFAULT_ROLE_LABEL), |role| {
                role.display_name().to_string()
            }),
        branch_id: user.user.branch_id,
        branch_ids: user.scope.branch_ids.clone(),
        permissions: user
            .scope
            .permissions
            .iter()
            .map(|p| p.as_str().to_string())
            .collect(),
        capabilities: compute_global_capabilities(&user.scope),
    }
}
