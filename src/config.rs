//! Service configuration read from the environment at startup.
//!
//! Unset or blank variables fall back to their defaults; a variable that is
//! set but cannot be parsed is an error.
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_URL`, or `DB_HOST` `DB_PORT` `DB_USER` `DB_PASSWORD` `DB_NAME` | required |
//! | `DB_MAX_CONNECTIONS` | `10` |
//! | `DB_CONNECT_TIMEOUT`, `DB_IDLE_TIMEOUT`, `DB_MAX_LIFETIME` (seconds) | `30`, `600`, `1800` |
//! | `TOKEN_SIGNING_SECRET` | required |
//! | `LISTEN` | `0.0.0.0:3000` |
//! | `RUST_LOG` | `info` |
//! | `LOG_FORMAT` (`text` or `json`) | `text` |
//! | `BEHIND_PROXY` | `false` |
//! | `USER_REGISTER` (`admin_only`/`0`, `visitors`/`1`, `visitors_admin_approval`/`2`) | `visitors` |
//! | `OAUTH_CONTEXT` | `import_api` |
//! | `OAUTH_TIMESTAMP_WINDOW` (seconds) | `300` |
//! | `PUBLIC_BASE_URL` | taken from the `Host` header |

use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Who may create accounts on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationMode {
    AdminOnly,
    #[default]
    Visitors,
    VisitorsAdminApproval,
}

impl RegistrationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationMode::AdminOnly => "admin_only",
            RegistrationMode::Visitors => "visitors",
            RegistrationMode::VisitorsAdminApproval => "visitors_admin_approval",
        }
    }

    /// Returns true unless only administrators may create accounts.
    pub fn allows_visitors(&self) -> bool {
        !matches!(self, RegistrationMode::AdminOnly)
    }
}

impl FromStr for RegistrationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "admin_only" => Ok(RegistrationMode::AdminOnly),
            "1" | "visitors" => Ok(RegistrationMode::Visitors),
            "2" | "visitors_admin_approval" => Ok(RegistrationMode::VisitorsAdminApproval),
            other => anyhow::bail!(
                "USER_REGISTER must be admin_only, visitors or visitors_admin_approval, got '{}'",
                other
            ),
        }
    }
}

impl fmt::Display for RegistrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("expected 'text' or 'json', got '{}'", other),
        }
    }
}

/// PostgreSQL connection and pool settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Url,
    pub max_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl DatabaseConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            url: database_url()?,
            max_connections: parsed("DB_MAX_CONNECTIONS", 10)?,
            connect_timeout: Duration::from_secs(parsed("DB_CONNECT_TIMEOUT", 30)?),
            idle_timeout: Duration::from_secs(parsed("DB_IDLE_TIMEOUT", 600)?),
            max_lifetime: Duration::from_secs(parsed("DB_MAX_LIFETIME", 1800)?),
        })
    }

    /// The connection URL with its password replaced by `***`.
    pub fn redacted_url(&self) -> String {
        let mut url = self.url.clone();
        if url.password().is_some() {
            let _ = url.set_password(Some("***"));
        }
        url.to_string()
    }
}

/// Settings for 2-legged OAuth verification.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Consumers registered for any other context are rejected.
    pub context: String,
    /// Accepted distance in seconds between `oauth_timestamp` and server time.
    pub timestamp_window: i64,
    /// Scheme and host for signature base strings when a proxy rewrites them.
    pub public_base_url: Option<Url>,
}

impl OAuthConfig {
    fn from_env() -> Result<Self> {
        let public_base_url = var("PUBLIC_BASE_URL")
            .map(|v| Url::parse(&v).with_context(|| format!("PUBLIC_BASE_URL is invalid: '{}'", v)))
            .transpose()?;

        Ok(Self {
            context: var("OAUTH_CONTEXT").unwrap_or_else(|| "import_api".to_string()),
            timestamp_window: parsed("OAUTH_TIMESTAMP_WINDOW", 300)?,
            public_base_url,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Rate limiting keys on `X-Forwarded-For`/`X-Real-IP` instead of the peer address.
    pub behind_proxy: bool,
    /// HMAC key for session token digests. Shared with the admin CLI.
    pub token_signing_secret: String,
    pub registration_mode: RegistrationMode,
    pub database: DatabaseConfig,
    pub oauth: OAuthConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            listen_addr: parsed("LISTEN", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            log_level: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            log_format: parsed("LOG_FORMAT", LogFormat::Text)?,
            behind_proxy: var("BEHIND_PROXY")
                .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1"),
            token_signing_secret: var("TOKEN_SIGNING_SECRET")
                .context("TOKEN_SIGNING_SECRET must be set")?,
            registration_mode: parsed("USER_REGISTER", RegistrationMode::default())?,
            database: DatabaseConfig::from_env().context("Invalid database configuration")?,
            oauth: OAuthConfig::from_env().context("Invalid OAuth configuration")?,
        })
    }

    /// Checks values that parse but make no sense for this service.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.database.url.scheme(), "postgres" | "postgresql") {
            anyhow::bail!(
                "DATABASE_URL must be a postgres:// URL, got '{}'",
                self.database.redacted_url()
            );
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        if self.database.connect_timeout.is_zero() {
            anyhow::bail!("DB_CONNECT_TIMEOUT must be greater than 0");
        }

        if self.oauth.context.trim().is_empty() {
            anyhow::bail!("OAUTH_CONTEXT must not be empty");
        }
        if !(1..=86_400).contains(&self.oauth.timestamp_window) {
            anyhow::bail!(
                "OAUTH_TIMESTAMP_WINDOW must be between 1 and 86400 seconds, got {}",
                self.oauth.timestamp_window
            );
        }
        if let Some(ref url) = self.oauth.public_base_url
            && (!matches!(url.scheme(), "http" | "https") || url.host_str().is_none())
        {
            anyhow::bail!("PUBLIC_BASE_URL must be an http(s) URL with a host, got '{}'", url);
        }

        Ok(())
    }

    /// Logs the effective configuration. Secrets are left out.
    pub fn print_summary(&self) {
        tracing::info!(
            listen = %self.listen_addr,
            database = %self.database.redacted_url(),
            pool_size = self.database.max_connections,
            log_format = ?self.log_format,
            behind_proxy = self.behind_proxy,
            registration = %self.registration_mode,
            oauth_context = %self.oauth.context,
            oauth_window_secs = self.oauth.timestamp_window,
            public_base_url = self
                .oauth
                .public_base_url
                .as_ref()
                .map(Url::as_str)
                .unwrap_or("from Host header"),
            "Configuration loaded"
        );
    }
}

/// Reads a variable, treating blank values as unset.
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parses a variable, or returns `default` when it is unset.
fn parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} is invalid ('{}'): {}", key, raw, e)),
        None => Ok(default),
    }
}

/// `DATABASE_URL`, or a URL assembled from the `DB_*` components with the
/// user name and password percent-encoded.
fn database_url() -> Result<Url> {
    if let Some(raw) = var("DATABASE_URL") {
        return Url::parse(&raw).context("DATABASE_URL is not a valid URL");
    }

    let required = |key: &str| {
        var(key).with_context(|| format!("{} must be set when DATABASE_URL is not provided", key))
    };

    let host = var("DB_HOST").unwrap_or_else(|| "localhost".to_string());
    let port: u16 = parsed("DB_PORT", 5432)?;
    let mut url = Url::parse(&format!("postgres://{}:{}/", host, port))
        .with_context(|| format!("DB_HOST is invalid: '{}'", host))?;

    url.set_path(&required("DB_NAME")?);
    url.set_username(&required("DB_USER")?)
        .map_err(|_| anyhow::anyhow!("DB_USER cannot be used in a URL"))?;
    url.set_password(Some(&required("DB_PASSWORD")?))
        .map_err(|_| anyhow::anyhow!("DB_PASSWORD cannot be used in a URL"))?;

    Ok(url)
}

/// Loads and validates configuration. Expects `.env` to be loaded already.
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
