// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use std::collections::BTreeMap;

use mutlukent_domain::{DomainError, FORM_ERROR_MESSAGE, ReportValidationErrors};
use mutlukent_persistence::PersistenceError;

use crate::password_policy::PasswordPolicyError;

/// Message shown for every internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Beklenmeyen bir hata oluştu.";

/// Message shown when no valid session accompanies a request.
pub const SESSION_REQUIRED_MESSAGE: &str = "Oturum açmanız gerekiyor.";

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed, safe to show to the caller.
        reason: String,
    },
    /// The caller lacks a permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The permission tag required for this action.
        required_permission: String,
        /// The localized refusal message.
        message: String,
    },
    /// Storage failed while authenticating. Never shown to callers.
    Internal {
        /// A description of the failure, for the log.
        message: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_permission,
                ..
            } => {
                write!(
                    f,
                    "Unauthorized: '{action}' requires the {required_permission} permission"
                )
            }
            Self::Internal { message } => write!(f, "Authentication internal error: {message}"),
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent the
/// API contract. The server maps each variant to one HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No valid session, or bad credentials.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The caller lacks a permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The permission tag required for this action.
        required_permission: String,
        /// The localized refusal message.
        message: String,
    },
    /// A form failed validation.
    ValidationFailed {
        /// The form-level summary message.
        message: String,
        /// Messages keyed by field name.
        field_errors: BTreeMap<String, Vec<String>>,
    },
    /// A single request parameter was invalid.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A rule involving existing data was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error. Never shown to callers.
        message: String,
    },
}

impl ApiError {
    /// The message safe to return to a caller.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::AuthenticationFailed { reason } => reason.clone(),
            Self::Unauthorized { message, .. }
            | Self::ValidationFailed { message, .. }
            | Self::InvalidInput { message, .. }
            | Self::DomainRuleViolation { message, .. }
            | Self::ResourceNotFound { message, .. } => message.clone(),
            Self::Internal { .. } => String::from(INTERNAL_ERROR_MESSAGE),
        }
    }

    /// Wraps a single field message as a form validation failure.
    #[must_use]
    pub fn field(field: &str, message: &str) -> Self {
        let mut field_errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
        field_errors.insert(field.to_string(), vec![message.to_string()]);
        Self::ValidationFailed {
            message: String::from(FORM_ERROR_MESSAGE),
            field_errors,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_permission,
                ..
            } => {
                write!(
                    f,
                    "Unauthorized: '{action}' requires the {required_permission} permission"
                )
            }
            Self::ValidationFailed {
                message,
                field_errors,
            } => {
                let fields: Vec<&str> = field_errors.keys().map(String::as_str).collect();
                write!(f, "Validation failed ({}): {message}", fields.join(", "))
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_permission,
                message,
            } => Self::Unauthorized {
                action,
                required_permission,
                message,
            },
            AuthError::Internal { message } => Self::Internal { message },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::field("password", &err.to_string())
    }
}

impl From<ReportValidationErrors> for ApiError {
    fn from(err: ReportValidationErrors) -> Self {
        Self::ValidationFailed {
            message: String::from(FORM_ERROR_MESSAGE),
            field_errors: err.field_errors,
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidRole(role) => ApiError::field("role", &format!("Geçersiz rol: {role}")),
        DomainError::InvalidSeason(season) => {
            ApiError::field("season", &format!("Geçersiz sezon: {season}"))
        }
        DomainError::InvalidAmount { field, message } => ApiError::field(&field, &message),
        DomainError::AmountOverflow => ApiError::InvalidInput {
            field: String::from("amount"),
            message: String::from("Tutar desteklenen aralığın dışında."),
        },
        DomainError::DateParseError { date_string, .. } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Geçersiz tarih: {date_string}"),
        },
        DomainError::InvalidPhoto(message) => ApiError::field("photo", &message),
        DomainError::InvalidEmail(message) => ApiError::field("email", &message),
        DomainError::InvalidName(message) => ApiError::field("full_name", &message),
        DomainError::InvalidBranch(message) => ApiError::field("branch", &message),
        DomainError::InvalidPermission(_)
        | DomainError::DateArithmeticOverflow { .. }
        | DomainError::InvalidTimezone(_) => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Constraint violations become rule violations; everything else is internal.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Kayıt"),
            message,
        },
        PersistenceError::UniqueViolation(message) => ApiError::DomainRuleViolation {
            rule: String::from("unique"),
            message,
        },
        PersistenceError::ForeignKeyViolation(message) => ApiError::DomainRuleViolation {
            rule: String::from("foreign_key"),
            message,
        },
        PersistenceError::CheckViolation(message) => ApiError::DomainRuleViolation {
            rule: String::from("check"),
            message,
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
