// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Password policy validation.
//!
//! Passwords are checked when a user is created and when an admin sets a
//! new one. Length is counted in characters, not bytes.

use thiserror::Error;

/// Password policy errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    /// Password is too short.
    #[error("Şifre en az {min_length} karakter olmalıdır.")]
    TooShort { min_length: usize },

    /// Password equals the account's email address.
    #[error("Şifre e-posta adresi ile aynı olamaz.")]
    MatchesEmail,
}

/// Password policy configuration.
pub struct PasswordPolicy {
    /// Minimum password length.
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 6 }
    }
}

impl PasswordPolicy {
    /// Validates a password against the policy.
    ///
    /// # Arguments
    ///
    /// * `password` - The password to validate
    /// * `email` - The account email (password must not match)
    ///
    /// # Errors
    ///
    /// Returns a `PasswordPolicyError` if the password does not meet policy requirements.
    pub fn validate(&self, password: &str, email: &str) -> Result<(), PasswordPolicyError> {
        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min_length: self.min_length,
            });
        }

        // Case-insensitive, emails are stored lower-case
        if password.trim().to_lowercase() == email.trim().to_lowercase() {
            return Err(PasswordPolicyError::MatchesEmail);
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        let policy: PasswordPolicy = PasswordPolicy::default();

        assert!(policy.validate("kasa42", "ayse@mutlukent.com").is_ok());
        assert!(policy.validate("çok-gizli-şifre", "ayse@mutlukent.com").is_ok());
    }

    #[test]
    fn test_password_too_short() {
        let policy: PasswordPolicy = PasswordPolicy::default();

        assert_eq!(
            policy.validate("kasa4", "ayse@mutlukent.com"),
            Err(PasswordPolicyError::TooShort { min_length: 6 })
        );
        assert_eq!(
            policy.validate("", "ayse@mutlukent.com"),
            Err(PasswordPolicyError::TooShort { min_length: 6 })
        );
    }

    #[test]
    fn test_length_counts_characters() {
        let policy: PasswordPolicy = PasswordPolicy::default();

        // Six characters, more than six bytes
        assert!(policy.validate("şşşşşş", "ayse@mutlukent.com").is_ok());
        assert_eq!(
            policy.validate("şşşşş", "ayse@mutlukent.com"),
            Err(PasswordPolicyError::TooShort { min_length: 6 })
        );
    }

    #[test]
    fn test_matches_email() {
        let policy: PasswordPolicy = PasswordPolicy::default();

        assert_eq!(
            policy.validate("ayse@mutlukent.com", "ayse@mutlukent.com"),
            Err(PasswordPolicyError::MatchesEmail)
        );
        assert_eq!(
            policy.validate("AYSE@Mutlukent.com", "ayse@mutlukent.com"),
            Err(PasswordPolicyError::MatchesEmail)
        );
    }

    #[test]
    fn test_custom_minimum() {
        let policy: PasswordPolicy = PasswordPolicy { min_length: 10 };

        assert_eq!(
            policy.validate("kasa42", "ayse@mutlukent.com"),
            Err(PasswordPolicyError::TooShort { min_length: 10 })
        );
    }
}
