//! User account import service.

use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use validator::ValidateEmail;

use crate::config::RegistrationMode;
use crate::domain::entities::{
    AUTHENTICATED_ROLE, Account, AccountStatus, NewAccount, Role,
};
use crate::domain::repositories::{AccountRepository, RoleRepository};
use crate::error::AppError;
use crate::utils::password::hash_password;
use crate::utils::sanitize::check_plain;

pub const MSG_REGISTRATION_DISABLED: &str = "Site account creation disabled";
pub const MSG_MISSING_FIELDS: &str = "Please provide all field values";
pub const MSG_INVALID_EMAIL: &str = "Invalid email format";
pub const MSG_EMAIL_TAKEN: &str = "Sorry the email you entered is in use.";
pub const MSG_USERNAME_TAKEN: &str = "Sorry the user name you entered is in use.";

/// Unique constraint guarding `accounts.mail`.
const MAIL_CONSTRAINT: &str = "accounts_mail_key";

/// Raw user import input as received from the client.
#[derive(Debug, Clone, Default)]
pub struct ImportUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Service importing user accounts from external systems.
///
/// Checks run in a fixed order and the first failure wins: registration
/// mode, required fields, e-mail syntax, e-mail uniqueness, user name
/// uniqueness. The store is never touched for requests failing the first
/// three checks.
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    roles: Arc<dyn RoleRepository>,
    registration: RegistrationMode,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        roles: Arc<dyn RoleRepository>,
        registration: RegistrationMode,
    ) -> Self {
        Self {
            accounts,
            roles,
            registration,
        }
    }

    /// Fails when the site does not let visitors create accounts.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::RegistrationDisabled`] in `admin_only` mode.
    pub fn ensure_registration_open(&self) -> Result<(), AppError> {
        if self.registration.allows_visitors() {
            Ok(())
        } else {
            Err(AppError::registration_disabled(
                MSG_REGISTRATION_DISABLED,
                json!({ "mode": self.registration.as_str() }),
            ))
        }
    }

    /// Imports one user account.
    ///
    /// Inputs are HTML-escaped before validation and storage. The account
    /// always receives the `authenticated` role; a requested role is added
    /// when it names a registered role other than `anonymous`, and silently
    /// ignored otherwise.
    ///
    /// # Errors
    ///
    /// - [`AppError::RegistrationDisabled`] if visitors may not register
    /// - [`AppError::Validation`] on missing fields or a malformed e-mail
    /// - [`AppError::Conflict`] if the e-mail or user name is taken
    /// - [`AppError::Internal`] on store or hashing failures
    pub async fn import_user(&self, input: ImportUser) -> Result<Account, AppError> {
        self.ensure_registration_open()?;

        let username = clean(input.username, true);
        let email = clean(input.email, true);
        let password = clean(input.password, false);

        let (Some(username), Some(email), Some(password)) = (username, email, password) else {
            return Err(AppError::bad_request(MSG_MISSING_FIELDS, json!({})));
        };

        if !email.validate_email() {
            return Err(AppError::bad_request(
                MSG_INVALID_EMAIL,
                json!({ "field": "email" }),
            ));
        }

        if self.accounts.exists_by_email(&email).await? {
            return Err(AppError::conflict(MSG_EMAIL_TAKEN, json!({ "field": "email" })));
        }

        if self.accounts.exists_by_username(&username).await? {
            return Err(AppError::conflict(
                MSG_USERNAME_TAKEN,
                json!({ "field": "username" }),
            ));
        }

        let roles = self
            .resolve_roles(input.role.as_deref().map(str::trim))
            .await?;
        let password_hash = hash_password(&password)?;

        let new_account = NewAccount {
            name: username,
            init: email.clone(),
            mail: email,
            password_hash,
            status: AccountStatus::Active,
            roles,
        };

        let account = self
            .accounts
            .create(new_account)
            .await
            .map_err(conflict_message)?;

        metrics::counter!("import_users_created_total").increment(1);
        tracing::info!(account_id = account.id, roles = ?account.roles, "User imported");

        Ok(account)
    }

    /// Lists the role registry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        self.roles.list().await
    }

    async fn resolve_roles(&self, requested: Option<&str>) -> Result<BTreeSet<String>, AppError> {
        let mut roles = BTreeSet::from([AUTHENTICATED_ROLE.to_string()]);

        if let Some(name) = requested.filter(|n| !n.is_empty())
            && let Some(role) = self.roles.find_by_name(name).await?
            && role.is_grantable()
        {
            roles.insert(role.name);
        }

        Ok(roles)
    }
}

/// Escapes a value and drops it when empty.
fn clean(value: Option<String>, trim: bool) -> Option<String> {
    value
        .map(|v| if trim { v.trim().to_string() } else { v })
        .filter(|v| !v.is_empty())
        .map(|v| check_plain(&v))
}

/// Rewrites a store-level unique violation into the message of the
/// equivalent pre-insert check.
fn conflict_message(error: AppError) -> AppError {
    match error {
        AppError::Conflict { details, .. } => {
            if details["constraint"].as_str() == Some(MAIL_CONSTRAINT) {
                AppError::conflict(MSG_EMAIL_TAKEN, json!({ "field": "email" }))
            } else {
                AppError::conflict(MSG_USERNAME_TAKEN, json!({ "field": "username" }))
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ANONYMOUS_ROLE;
    use crate::domain::repositories::{MockAccountRepository, MockRoleRepository};
    use chrono::Utc;

    fn input(username: &str, email: &str, password: &str, role: Option<&str>) -> ImportUser {
        ImportUser {
            username: Some(username.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            role: role.map(str::to_string),
        }
    }

    fn account_from(new_account: NewAccount) -> Account {
        Account {
            id: 1,
            name: new_account.name,
            mail: new_account.mail,
            init: new_account.init,
            status: new_account.status,
            roles: new_account.roles,
            created_at: Utc::now(),
        }
    }

    fn service(
        accounts: MockAccountRepository,
        roles: MockRoleRepository,
        mode: RegistrationMode,
    ) -> AccountService {
        AccountService::new(Arc::new(accounts), Arc::new(roles), mode)
    }

    #[tokio::test]
    async fn test_import_user_success_with_role() {
        let mut accounts = MockAccountRepository::new();
        let mut roles = MockRoleRepository::new();

        accounts
            .expect_exists_by_email()
            .withf(|mail| mail == "dave@example.com")
            .times(1)
            .returning(|_| Ok(false));
        accounts
            .expect_exists_by_username()
            .withf(|name| name == "dave")
            .times(1)
            .returning(|_| Ok(false));
        roles
            .expect_find_by_name()
            .withf(|name| name == "editor")
            .times(1)
            .returning(|name| Ok(Some(Role::new(4, name.to_string(), Utc::now()))));
        accounts
            .expect_create()
            .withf(|a| a.init == "dave@example.com" && a.password_hash.starts_with("$argon2id$"))
            .times(1)
            .returning(|a| Ok(account_from(a)));

        let account = service(accounts, roles, RegistrationMode::Visitors)
            .import_user(input("dave", "dave@example.com", "mypass", Some("editor")))
            .await
            .unwrap();

        assert_eq!(account.name, "dave");
        assert_eq!(account.status, AccountStatus::Active);
        assert_eq!(
            account.roles,
            BTreeSet::from(["authenticated".to_string(), "editor".to_string()])
        );
    }

    #[tokio::test]
    async fn test_import_user_unknown_role_is_ignored() {
        let mut accounts = MockAccountRepository::new();
        let mut roles = MockRoleRepository::new();

        accounts.expect_exists_by_email().returning(|_| Ok(false));
        accounts.expect_exists_by_username().returning(|_| Ok(false));
        roles.expect_find_by_name().times(1).returning(|_| Ok(None));
        accounts.expect_create().returning(|a| Ok(account_from(a)));

        let account = service(accounts, roles, RegistrationMode::Visitors)
            .import_user(input("dave", "dave@example.com", "mypass", Some("superuser")))
            .await
            .unwrap();

        assert_eq!(account.roles, BTreeSet::from(["authenticated".to_string()]));
    }

    #[tokio::test]
    async fn test_import_user_anonymous_role_is_never_granted() {
        let mut accounts = MockAccountRepository::new();
        let mut roles = MockRoleRepository::new();

        accounts.expect_exists_by_email().returning(|_| Ok(false));
        accounts.expect_exists_by_username().returning(|_| Ok(false));
        roles
            .expect_find_by_name()
            .returning(|name| Ok(Some(Role::new(1, name.to_string(), Utc::now()))));
        accounts.expect_create().returning(|a| Ok(account_from(a)));

        let account = service(accounts, roles, RegistrationMode::Visitors)
            .import_user(input("dave", "dave@example.com", "mypass", Some(ANONYMOUS_ROLE)))
            .await
            .unwrap();

        assert!(!account.has_role(ANONYMOUS_ROLE));
        assert!(account.has_role(AUTHENTICATED_ROLE));
    }

    #[tokio::test]
    async fn test_import_user_registration_disabled() {
        let accounts = MockAccountRepository::new();
        let roles = MockRoleRepository::new();

        let err = service(accounts, roles, RegistrationMode::AdminOnly)
            .import_user(input("dave", "dave@example.com", "mypass", None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::RegistrationDisabled { .. }));
        assert_eq!(err.message(), MSG_REGISTRATION_DISABLED);
    }

    #[tokio::test]
    async fn test_import_user_missing_fields() {
        let accounts = MockAccountRepository::new();
        let roles = MockRoleRepository::new();
        let svc = service(accounts, roles, RegistrationMode::Visitors);

        let err = svc
            .import_user(ImportUser {
                username: Some("dave".to_string()),
                email: Some("dave@example.com".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.message(), MSG_MISSING_FIELDS);

        let err = svc
            .import_user(input("   ", "dave@example.com", "mypass", None))
            .await
            .unwrap_err();
        assert_eq!(err.message(), MSG_MISSING_FIELDS);
    }

    #[tokio::test]
    async fn test_import_user_invalid_email_skips_store() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_exists_by_email().times(0);
        accounts.expect_exists_by_username().times(0);
        let roles = MockRoleRepository::new();

        let err = service(accounts, roles, RegistrationMode::VisitorsAdminApproval)
            .import_user(input("dave", "not-an-email", "mypass", None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.message(), MSG_INVALID_EMAIL);
    }

    #[tokio::test]
    async fn test_import_user_email_taken() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_exists_by_email().returning(|_| Ok(true));
        accounts.expect_exists_by_username().times(0);
        accounts.expect_create().times(0);

        let err = service(accounts, MockRoleRepository::new(), RegistrationMode::Visitors)
            .import_user(input("dave", "dave@example.com", "mypass", None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
        assert_eq!(err.message(), MSG_EMAIL_TAKEN);
    }

    #[tokio::test]
    async fn test_import_user_username_taken() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_exists_by_email().returning(|_| Ok(false));
        accounts.expect_exists_by_username().returning(|_| Ok(true));
        accounts.expect_create().times(0);

        let err = service(accounts, MockRoleRepository::new(), RegistrationMode::Visitors)
            .import_user(input("dave", "dave@example.com", "mypass", None))
            .await
            .unwrap_err();

        assert_eq!(err.message(), MSG_USERNAME_TAKEN);
    }

    #[tokio::test]
    async fn test_import_user_race_maps_constraint_to_message() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_exists_by_email().returning(|_| Ok(false));
        accounts.expect_exists_by_username().returning(|_| Ok(false));
        accounts.expect_create().returning(|_| {
            Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "accounts_mail_key" }),
            ))
        });

        let err = service(accounts, MockRoleRepository::new(), RegistrationMode::Visitors)
            .import_user(input("dave", "dave@example.com", "mypass", None))
            .await
            .unwrap_err();

        assert_eq!(err.message(), MSG_EMAIL_TAKEN);
    }

    #[tokio::test]
    async fn test_import_user_escapes_input() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_exists_by_email().returning(|_| Ok(false));
        accounts
            .expect_exists_by_username()
            .withf(|name| name == "dave &amp; co")
            .returning(|_| Ok(false));
        accounts.expect_create().returning(|a| Ok(account_from(a)));

        let account = service(accounts, MockRoleRepository::new(), RegistrationMode::Visitors)
            .import_user(input("dave & co", "dave@example.com", "mypass", None))
            .await
            .unwrap();

        assert_eq!(account.name, "dave &amp; co");
    }
}
