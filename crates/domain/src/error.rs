// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Role name is not one of the known roles.
    InvalidRole(String),
    /// Permission tag is not recognised.
    InvalidPermission(String),
    /// Branch season tag is not recognised.
    InvalidSeason(String),
    /// Monetary amount could not be parsed or is out of range.
    InvalidAmount {
        /// The field holding the amount.
        field: String,
        /// A human-readable description of the problem.
        message: String,
    },
    /// Adding amounts overflowed the representable range.
    AmountOverflow,
    /// Failed to parse date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// The configured business time zone is unknown.
    InvalidTimezone(String),
    /// Uploaded photo violates size or format rules.
    InvalidPhoto(String),
    /// Email address is empty or malformed.
    InvalidEmail(String),
    /// Full name is empty or invalid.
    InvalidName(String),
    /// Branch fields are empty or invalid.
    InvalidBranch(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRole(role) => write!(f, "Invalid role: {role}"),
            Self::InvalidPermission(tag) => write!(f, "Invalid permission tag: {tag}"),
            Self::InvalidSeason(season) => write!(f, "Invalid season: {season}"),
            Self::InvalidAmount { field, message } => {
                write!(f, "Invalid amount for '{field}': {message}")
            }
            Self::AmountOverflow => write!(f, "Amount exceeds the supported range"),
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::InvalidTimezone(tz) => write!(f, "Unknown time zone: {tz}"),
            Self::InvalidPhoto(msg) => write!(f, "Invalid photo: {msg}"),
            Self::InvalidEmail(msg) => write!(f, "Invalid email: {msg}"),
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidBranch(msg) => write!(f, "Invalid branch: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}
