// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;

/// Normalizes and validates an email address.
///
/// The address is trimmed and lower-cased. It must contain exactly one `@`
/// with a non-empty local part and a domain containing a dot.
///
/// # Arguments
///
/// * `email` - The raw email address
///
/// # Returns
///
/// * `Ok(String)` with the normalized address
/// * `Err(DomainError)` if the address is malformed
///
/// # Errors
///
/// Returns `InvalidEmail` if the address is empty or malformed.
pub fn normalize_email(email: &str) -> Result<String, DomainError> {
    let normalized: String = email.trim().to_lowercase();

    if normalized.is_empty() {
        return Err(DomainError::InvalidEmail(String::from(
            "E-posta adresi gereklidir.",
        )));
    }

    // Rule: one '@', something on both sides, a dot in the domain
    let mut parts = normalized.split('@');
    let local: &str = parts.next().unwrap_or_default();
    let domain: &str = parts.next().unwrap_or_default();
    let well_formed: bool = parts.next().is_none()
        && !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !normalized.chars().any(char::is_whitespace);

    if !well_formed {
        return Err(DomainError::InvalidEmail(format!(
            "Geçersiz e-posta adresi: {normalized}"
        )));
    }

    Ok(normalized)
}

/// Validates a user's full name.
///
/// # Errors
///
/// Returns `InvalidName` if the trimmed name is empty or longer than 120
/// characters.
pub fn validate_full_name(full_name: &str) -> Result<String, DomainError> {
    let trimmed: &str = full_name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidName(String::from("Ad soyad gereklidir.")));
    }
    if trimmed.chars().count() > 120 {
        return Err(DomainError::InvalidName(String::from(
            "Ad soyad en fazla 120 karakter olabilir.",
        )));
    }
    Ok(trimmed.to_string())
}

/// Validates branch name and code.
///
/// Codes are trimmed and upper-cased.
///
/// # Returns
///
/// The trimmed name and normalized code.
///
/// # Errors
///
/// Returns `InvalidBranch` if either field is empty or the code contains
/// whitespace.
pub fn validate_branch_fields(name: &str, code: &str) -> Result<(String, String), DomainError> {
    let name: &str = name.trim();
    if name.is_empty() {
        return Err(DomainError::InvalidBranch(String::from(
            "Şube adı gereklidir.",
        )));
    }

    let code: String = code.trim().to_uppercase();
    if code.is_empty() {
        return Err(DomainError::InvalidBranch(String::from(
            "Şube kodu gereklidir.",
        )));
    }
    if code.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidBranch(String::from(
            "Şube kodu boşluk içeremez.",
        )));
    }

    Ok((name.to_string(), code))
}
