//! Account entity representing an imported user.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Account status as stored in the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Blocked,
    Active,
}

impl AccountStatus {
    pub fn as_i16(&self) -> i16 {
        match self {
            AccountStatus::Blocked => 0,
            AccountStatus::Active => 1,
        }
    }

    pub fn from_i16(value: i16) -> Self {
        if value == 0 {
            AccountStatus::Blocked
        } else {
            AccountStatus::Active
        }
    }
}

/// A user account.
///
/// `init` keeps the e-mail address the account was created with.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub mail: String,
    pub init: String,
    pub status: AccountStatus,
    pub roles: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Returns true if the account holds the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Input data for creating a new account.
///
/// `password_hash` is an Argon2id PHC string; raw passwords never reach a
/// repository.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub mail: String,
    pub init: String,
    pub password_hash: String,
    pub status: AccountStatus,
    pub roles: BTreeSet<String>,
}
