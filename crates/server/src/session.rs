// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bearer-token session extraction.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::{IntoResponse, Response},
};
use mutlukent_api::{
    ApiError, AuthError, AuthenticatedUser, AuthenticationService, SESSION_REQUIRED_MESSAGE,
};
use mutlukent_persistence::Persistence;
use tracing::{debug, warn};

use crate::{AppState, HttpError};

/// The bearer token a request presented.
///
/// Extraction only reads the header. The token is checked by
/// [`SessionToken::authenticate`] while the handler holds the store lock,
/// so the caller's scope and the work it permits see the same rows.
///
/// # Errors
///
/// Rejects with HTTP 401 when the header is missing or malformed.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

impl SessionToken {
    /// Validates the token and resolves the caller's access scope.
    ///
    /// # Errors
    ///
    /// HTTP 401 when the session is unknown, expired or belongs to an
    /// inactive user. HTTP 500 when storage fails.
    pub fn authenticate(
        &self,
        persistence: &mut Persistence,
    ) -> Result<AuthenticatedUser, HttpError> {
        match AuthenticationService::validate_session(persistence, &self.0) {
            Ok(user) => {
                debug!(user_id = user.user_id(), "Session validated");
                Ok(user)
            }
            Err(AuthError::Internal { message }) => {
                Err(HttpError::from(ApiError::Internal { message }))
            }
            Err(e) => Err(SessionError::InvalidSession(e.to_string()).into()),
        }
    }
}

impl FromRequestParts<AppState> for SessionToken {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header: &str = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::InvalidAuthorizationHeader
            })?;

        let token: &str = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                warn!("Authorization header is not a bearer token");
                SessionError::InvalidAuthorizationHeader
            })?;

        Ok(Self(token.to_string()))
    }
}

/// Session rejection reasons. All of them answer 401.
#[derive(Debug)]
pub enum SessionError {
    MissingAuthorizationHeader,
    InvalidAuthorizationHeader,
    /// The token was rejected; carries the reason for the log.
    InvalidSession(String),
}

impl From<SessionError> for HttpError {
    fn from(err: SessionError) -> Self {
        if let SessionError::InvalidSession(reason) = &err {
            debug!(%reason, "Rejecting request");
        }
        Self::from(ApiError::AuthenticationFailed {
            reason: String::from(SESSION_REQUIRED_MESSAGE),
        })
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        HttpError::from(self).into_response()
    }
}
