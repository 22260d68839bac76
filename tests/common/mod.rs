#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::HeaderValue;
use axum_test::{TestResponse, TestServer};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;
use uuid::Uuid;

use import_api::application::services::auth_service::hash_token;
use import_api::application::services::{
    AccountService, AuthService, CategoryService, OAuthService,
};
use import_api::config::RegistrationMode;
use import_api::domain::entities::{
    Account, AccountStatus, Category, CategoryPatch, Consumer, NewAccount, NewCategory,
    NewConsumer, NewSession, Role, Session,
};
use import_api::domain::repositories::{
    AccountRepository, CategoryRepository, ConsumerRepository, RoleRepository, SessionRepository,
};
use import_api::error::AppError;
use import_api::routes::build_router;
use import_api::state::AppState;
use import_api::utils::oauth_signature::{self, SignatureMethod};

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const SESSION_TOKEN: &str = "session-token";
pub const SESSION_ACCOUNT: &str = "operator";
pub const BLOCKED_SESSION_TOKEN: &str = "blocked-session-token";
pub const BLOCKED_ACCOUNT: &str = "suspended";
pub const CONSUMER_KEY: &str = "test-consumer-key";
pub const CONSUMER_SECRET: &str = "test-consumer-secret";
pub const FOREIGN_CONSUMER_KEY: &str = "foreign-consumer-key";
pub const OAUTH_CONTEXT: &str = "import_api";
pub const BASE_URL: &str = "http://api.test";

// ── In-memory repositories ──────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryAccountRepository {
    pub accounts: Mutex<Vec<Account>>,
}

impl InMemoryAccountRepository {
    /// Number of accounts created through the API, seeded session owners excluded.
    pub fn count(&self) -> usize {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.name != SESSION_ACCOUNT && a.name != BLOCKED_ACCOUNT)
            .count()
    }

    pub fn seed(&self, name: &str, status: AccountStatus) -> Account {
        let mut accounts = self.accounts.lock().unwrap();
        let account = Account {
            id: accounts.len() as i64 + 1,
            name: name.to_string(),
            mail: format!("{}@example.com", name),
            init: format!("{}@example.com", name),
            status,
            roles: ["authenticated".to_string()].into(),
            created_at: Utc::now(),
        };
        accounts.push(account.clone());
        account
    }

    pub fn find(&self, name: &str) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.name == name)
            .cloned()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn exists_by_email(&self, mail: &str) -> Result<bool, AppError> {
        Ok(self.accounts.lock().unwrap().iter().any(|a| a.mail == mail))
    }

    async fn exists_by_username(&self, name: &str) -> Result<bool, AppError> {
        Ok(self.accounts.lock().unwrap().iter().any(|a| a.name == name))
    }

    async fn create(&self, new_account: NewAccount) -> Result<Account, AppError> {
        let mut accounts = self.accounts.lock().unwrap();

        if accounts.iter().any(|a| a.mail == new_account.mail) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "accounts_mail_key" }),
            ));
        }
        if accounts.iter().any(|a| a.name == new_account.name) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "accounts_name_key" }),
            ));
        }

        let account = Account {
            id: accounts.len() as i64 + 1,
            name: new_account.name,
            mail: new_account.mail,
            init: new_account.init,
            status: new_account.status,
            roles: new_account.roles,
            created_at: Utc::now(),
        };
        accounts.push(account.clone());

        Ok(account)
    }

    async fn find_by_username(&self, name: &str) -> Result<Option<Account>, AppError> {
        Ok(self.find(name))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AppError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }
}

pub struct InMemoryRoleRepository {
    pub roles: Mutex<Vec<Role>>,
}

impl Default for InMemoryRoleRepository {
    fn default() -> Self {
        let roles = ["anonymous", "authenticated", "administrator", "editor"]
            .iter()
            .enumerate()
            .map(|(i, name)| Role::new(i as i64 + 1, name.to_string(), Utc::now()))
            .collect();

        Self {
            roles: Mutex::new(roles),
        }
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.name == name)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Role>, AppError> {
        Ok(self.roles.lock().unwrap().clone())
    }

    async fn create(&self, name: &str) -> Result<Role, AppError> {
        let mut roles = self.roles.lock().unwrap();
        let role = Role::new(roles.len() as i64 + 1, name.to_string(), Utc::now());
        roles.push(role.clone());
        Ok(role)
    }
}

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    pub categories: Mutex<Vec<Category>>,
}

impl InMemoryCategoryRepository {
    pub fn count(&self) -> usize {
        self.categories.lock().unwrap().len()
    }

    pub fn find(&self, uuid: Uuid) -> Option<Category> {
        self.categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.uuid == uuid)
            .cloned()
    }

    /// Inserts a category directly, bypassing the service.
    pub fn seed(&self, uuid: Uuid, title: &str, body: Option<&str>) -> Category {
        let mut categories = self.categories.lock().unwrap();
        let category = Category {
            id: categories.len() as i64 + 1,
            uuid,
            title: title.to_string(),
            body: body.map(str::to_string),
            summary: None,
            weight: 0,
            published: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        categories.push(category.clone());
        category
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, new_category: NewCategory) -> Result<Category, AppError> {
        let mut categories = self.categories.lock().unwrap();
        let category = Category {
            id: categories.len() as i64 + 1,
            uuid: new_category.uuid,
            title: new_category.title,
            body: new_category.body,
            summary: new_category.summary,
            weight: new_category.weight,
            published: new_category.published,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        categories.push(category.clone());
        Ok(category)
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Vec<Category>, AppError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.uuid == uuid)
            .cloned()
            .collect())
    }

    async fn update_fields(&self, id: i64, patch: CategoryPatch) -> Result<Category, AppError> {
        let mut categories = self.categories.lock().unwrap();
        let category = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::not_found("Category not found", json!({ "id": id })))?;

        if let Some(title) = patch.title {
            category.title = title;
        }
        if patch.body.is_some() {
            category.body = patch.body;
        }
        if patch.summary.is_some() {
            category.summary = patch.summary;
        }
        if let Some(weight) = patch.weight {
            category.weight = weight;
        }
        if let Some(published) = patch.published {
            category.published = published;
        }
        category.updated_at = Utc::now();

        Ok(category.clone())
    }
}

#[derive(Default)]
pub struct InMemoryConsumerRepository {
    pub consumers: Mutex<Vec<Consumer>>,
    pub nonces: Mutex<HashSet<(String, String)>>,
}

impl InMemoryConsumerRepository {
    pub fn add(&self, consumer_key: &str, secret: &str, context: &str) {
        let mut consumers = self.consumers.lock().unwrap();
        let next_id = consumers.len() as i64 + 1;
        consumers.push(Consumer {
            id: next_id,
            name: consumer_key.to_string(),
            consumer_key: consumer_key.to_string(),
            secret: secret.to_string(),
            context: context.to_string(),
            created_at: Utc::now(),
            revoked_at: None,
        });
    }
}

#[async_trait]
impl ConsumerRepository for InMemoryConsumerRepository {
    async fn find_by_key(&self, consumer_key: &str) -> Result<Option<Consumer>, AppError> {
        Ok(self
            .consumers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.consumer_key == consumer_key && !c.is_revoked())
            .cloned())
    }

    async fn record_nonce(
        &self,
        consumer_key: &str,
        nonce: &str,
        _timestamp: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        Ok(self
            .nonces
            .lock()
            .unwrap()
            .insert((consumer_key.to_string(), nonce.to_string())))
    }

    async fn create(&self, new_consumer: NewConsumer) -> Result<Consumer, AppError> {
        self.add(
            &new_consumer.consumer_key,
            &new_consumer.secret,
            &new_consumer.context,
        );
        self.find_by_key(&new_consumer.consumer_key)
            .await?
            .ok_or_else(|| AppError::internal("Consumer vanished", json!({})))
    }

    async fn list(&self) -> Result<Vec<Consumer>, AppError> {
        Ok(self.consumers.lock().unwrap().clone())
    }

    async fn revoke(&self, id: i64) -> Result<bool, AppError> {
        let mut consumers = self.consumers.lock().unwrap();
        match consumers.iter_mut().find(|c| c.id == id && !c.is_revoked()) {
            Some(consumer) => {
                consumer.revoked_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    pub sessions: Mutex<Vec<Session>>,
}

impl InMemorySessionRepository {
    pub fn find_by_token(&self, token: &str) -> Option<Session> {
        let digest = hash_token(SIGNING_SECRET, token);
        self.sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.token_hash == digest)
            .cloned()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_active(&self, token_hash: &str) -> Result<Option<Session>, AppError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.token_hash == token_hash && !s.is_revoked())
            .cloned())
    }

    async fn touch(&self, id: i64) -> Result<(), AppError> {
        if let Some(session) = self.sessions.lock().unwrap().iter_mut().find(|s| s.id == id) {
            session.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create(&self, new_session: NewSession) -> Result<Session, AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = Session {
            id: sessions.len() as i64 + 1,
            account_id: new_session.account_id,
            label: new_session.label,
            token_hash: new_session.token_hash,
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        sessions.push(session.clone());
        Ok(session)
    }

    async fn list(&self) -> Result<Vec<Session>, AppError> {
        Ok(self.sessions.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Session>, AppError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn revoke(&self, id: i64) -> Result<bool, AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.iter_mut().find(|s| s.id == id && !s.is_revoked()) {
            Some(session) => {
                session.revoked_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_for_account(&self, account_id: i64) -> Result<u64, AppError> {
        let mut closed = 0;
        for session in self.sessions.lock().unwrap().iter_mut() {
            if session.account_id == account_id && !session.is_revoked() {
                session.revoked_at = Some(Utc::now());
                closed += 1;
            }
        }
        Ok(closed)
    }
}

// ── Test application ────────────────────────────────────────────────────────

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub accounts: Arc<InMemoryAccountRepository>,
    pub categories: Arc<InMemoryCategoryRepository>,
    pub consumers: Arc<InMemoryConsumerRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
}

/// Builds the full router (authentication included) over in-memory stores.
///
/// Seeds one consumer in the import context and one in another context.
/// [`SESSION_TOKEN`] signs in as the active account [`SESSION_ACCOUNT`];
/// [`BLOCKED_SESSION_TOKEN`] belongs to the blocked account [`BLOCKED_ACCOUNT`].
pub fn create_test_app(mode: RegistrationMode) -> TestApp {
    let accounts = Arc::new(InMemoryAccountRepository::default());
    let roles = Arc::new(InMemoryRoleRepository::default());
    let categories = Arc::new(InMemoryCategoryRepository::default());
    let consumers = Arc::new(InMemoryConsumerRepository::default());
    let sessions = Arc::new(InMemorySessionRepository::default());

    consumers.add(CONSUMER_KEY, CONSUMER_SECRET, OAUTH_CONTEXT);
    consumers.add(FOREIGN_CONSUMER_KEY, CONSUMER_SECRET, "other_api");
    for (name, status, token) in [
        (SESSION_ACCOUNT, AccountStatus::Active, SESSION_TOKEN),
        (BLOCKED_ACCOUNT, AccountStatus::Blocked, BLOCKED_SESSION_TOKEN),
    ] {
        let owner = accounts.seed(name, status);
        sessions.sessions.lock().unwrap().push(Session {
            id: owner.id,
            account_id: owner.id,
            label: format!("{} laptop", name),
            token_hash: hash_token(SIGNING_SECRET, token),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        });
    }

    let state = AppState::new(
        Arc::new(AccountService::new(accounts.clone(), roles, mode)),
        Arc::new(CategoryService::new(categories.clone())),
        Arc::new(AuthService::new(
            sessions.clone(),
            accounts.clone(),
            SIGNING_SECRET.to_string(),
        )),
        Arc::new(OAuthService::new(
            consumers.clone(),
            OAUTH_CONTEXT.to_string(),
            300,
            Some(Url::parse(BASE_URL).unwrap()),
        )),
    );

    let server = TestServer::new(build_router(state.clone())).unwrap();

    TestApp {
        server,
        state,
        accounts,
        categories,
        consumers,
        sessions,
    }
}

pub fn bearer() -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", SESSION_TOKEN)).unwrap()
}

static NONCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Builds an `Authorization: OAuth ...` header signing `method` and `path`
/// together with any query or form parameters in `params`.
pub fn oauth_header(
    method: &str,
    path: &str,
    params: &[(&str, &str)],
    consumer_key: &str,
    consumer_secret: &str,
) -> HeaderValue {
    let nonce = format!("nonce-{}", NONCE_COUNTER.fetch_add(1, Ordering::SeqCst));
    oauth_header_with(
        method,
        path,
        params,
        consumer_key,
        consumer_secret,
        &nonce,
        Utc::now().timestamp(),
    )
}

pub fn oauth_header_with(
    method: &str,
    path: &str,
    params: &[(&str, &str)],
    consumer_key: &str,
    consumer_secret: &str,
    nonce: &str,
    timestamp: i64,
) -> HeaderValue {
    let mut oauth: Vec<(String, String)> = vec![
        ("oauth_consumer_key".to_string(), consumer_key.to_string()),
        ("oauth_nonce".to_string(), nonce.to_string()),
        ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
        ("oauth_timestamp".to_string(), timestamp.to_string()),
        ("oauth_version".to_string(), "1.0".to_string()),
    ];

    let mut signed = oauth.clone();
    signed.extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));

    let base = oauth_signature::base_string(method, &format!("{}{}", BASE_URL, path), &signed);
    let signature = oauth_signature::sign(SignatureMethod::HmacSha1, &base, consumer_secret, "");
    oauth.push(("oauth_signature".to_string(), signature));

    let header = oauth
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    HeaderValue::from_str(&format!("OAuth {}", header)).unwrap()
}

/// Signs a request as the seeded import consumer.
pub fn signed(method: &str, path: &str) -> HeaderValue {
    oauth_header(method, path, &[], CONSUMER_KEY, CONSUMER_SECRET)
}

/// Reads an envelope header; `204` answers carry their message only there.
pub fn api_header(response: &TestResponse, name: &str) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
