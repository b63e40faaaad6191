// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Salted password hashes for user credentials.

use bcrypt::{hash, verify};

use crate::error::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A bcrypt hash. The raw password is never stored or compared directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The cost used outside of tests.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `raw_password` with the given bcrypt `cost`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WeakPassword`] for passwords shorter than
    /// [`MIN_PASSWORD_LENGTH`] characters, or [`Error::Hashing`] if bcrypt
    /// fails.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        if raw_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::WeakPassword(MIN_PASSWORD_LENGTH));
        }
        hash(raw_password, cost)
            .map(Self)
            .map_err(|e| Error::Hashing(e.to_string()))
    }

    /// Wrap a hash read back from the store.
    pub fn new_unchecked(raw_hash: &str) -> Self {
        Self(raw_hash.to_string())
    }

    /// Check `raw_password` against the stored hash. A malformed hash never
    /// verifies.
    pub fn verify(&self, raw_password: &str) -> bool {
        verify(raw_password, &self.0).unwrap_or(false)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
