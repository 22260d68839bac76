//! CLI administration tool for import-api.
//!
//! Provides commands for managing OAuth consumers, account sessions and roles,
//! viewing statistics, and performing database operations without requiring
//! HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Register an OAuth consumer for the import API
//! cargo run --bin admin -- consumer create --name "CRM sync"
//!
//! # Issue a session token for an account
//! cargo run --bin admin -- token create --account dave
//!
//! # Close every session of an account
//! cargo run --bin admin -- token revoke --account dave
//!
//! # Revoke a consumer
//! cargo run --bin admin -- consumer revoke "CRM sync"
//!
//! # Register an extra role
//! cargo run --bin admin -- role add moderator
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET` (required for `token create`): HMAC key shared
//!   with the server
//! - `OAUTH_CONTEXT` (optional): default context for new consumers

use import_api::application::services::auth_service::hash_token;
use import_api::domain::entities::{Account, AccountStatus, NewConsumer, NewSession};
use import_api::domain::repositories::{
    AccountRepository, ConsumerRepository, RoleRepository, SessionRepository,
};
use import_api::infrastructure::persistence::{
    PgAccountRepository, PgConsumerRepository, PgRoleRepository, PgSessionRepository,
};
use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing import-api.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage OAuth consumers
    Consumer {
        #[command(subcommand)]
        action: ConsumerAction,
    },

    /// Manage account session tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Manage the role registry
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// OAuth consumer subcommands.
#[derive(Subcommand)]
enum ConsumerAction {
    /// Register a new consumer with a random key and secret
    Create {
        /// Consumer name (e.g., "CRM sync")
        #[arg(short, long)]
        name: Option<String>,

        /// Context the consumer is valid in (default: OAUTH_CONTEXT or "import_api")
        #[arg(short, long)]
        context: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all consumers
    List,

    /// Revoke a consumer
    Revoke {
        /// Consumer name, key or ID to revoke
        name_or_id: String,
    },
}

/// Session token subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Issue a bearer token for an account
    Create {
        /// User name of the account the token signs in as
        #[arg(short, long)]
        account: Option<String>,

        /// Label shown in listings (e.g., "Migration job")
        #[arg(short, long)]
        label: Option<String>,

        /// Custom token value (optional, auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all sessions with their accounts
    List,

    /// Revoke one session by ID, or every session of an account
    Revoke {
        /// Session ID to revoke
        #[arg(required_unless_present = "account", conflicts_with = "account")]
        id: Option<i64>,

        /// Revoke all open sessions of this account instead
        #[arg(short, long)]
        account: Option<String>,
    },
}

/// Role registry subcommands.
#[derive(Subcommand)]
enum RoleAction {
    /// Register a role that imported accounts may request
    Add {
        /// Role name
        name: String,
    },

    /// List registered roles
    List,
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Consumer { action } => handle_consumer_action(action, &pool).await?,
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Role { action } => handle_role_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches consumer management commands.
async fn handle_consumer_action(action: ConsumerAction, pool: &PgPool) -> Result<()> {
    let repo = PgConsumerRepository::new(Arc::new(pool.clone()));

    match action {
        ConsumerAction::Create { name, context, yes } => {
            create_consumer(&repo, name, context, yes).await?
        }
        ConsumerAction::List => list_consumers(&repo).await?,
        ConsumerAction::Revoke { name_or_id } => revoke_consumer(&repo, name_or_id).await?,
    }

    Ok(())
}

/// Registers an OAuth consumer.
///
/// The key and secret are generated here and shown once. Clients sign
/// requests with them; the service looks the consumer up by key.
async fn create_consumer(
    repo: &PgConsumerRepository,
    name: Option<String>,
    context: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔑 Register OAuth Consumer".bright_blue().bold());
    println!();

    let consumer_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Consumer name")
            .with_initial_text("CRM sync")
            .interact_text()?,
    };

    let context = context
        .or_else(|| std::env::var("OAUTH_CONTEXT").ok())
        .unwrap_or_else(|| "import_api".to_string());

    let new_consumer = NewConsumer {
        name: consumer_name,
        consumer_key: generate_token(32),
        secret: generate_token(48),
        context,
    };

    println!("{}", "Consumer details:".bright_white().bold());
    println!("  Name:    {}", new_consumer.name.cyan());
    println!("  Context: {}", new_consumer.context.cyan());
    println!("  Key:     {}", new_consumer.consumer_key.bright_yellow().bold());
    println!("  Secret:  {}", new_consumer.secret.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Hand the secret to the client now and keep it private."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm && !confirm("Register this consumer?", true)? {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    let consumer = repo
        .create(new_consumer)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to register consumer: {}", e))?;

    println!();
    println!(
        "{} (ID {})",
        "✅ Consumer registered successfully!".green().bold(),
        consumer.id
    );
    println!();
    println!(
        "{}",
        "Sign requests with HMAC-SHA1, HMAC-SHA256 or PLAINTEXT and an empty token secret."
            .bright_white()
    );
    println!();

    Ok(())
}

/// Lists all consumers with status indicators.
async fn list_consumers(repo: &PgConsumerRepository) -> Result<()> {
    println!("{}", "📋 OAuth Consumers".bright_blue().bold());
    println!();

    let consumers = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list consumers: {}", e))?;

    if consumers.is_empty() {
        println!("{}", "  No consumers found".yellow());
        println!();
        println!(
            "  Create one with: {} admin consumer create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<3} {:<24} {:<34} {:<14} {:<10}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Key".bright_white().bold(),
        "Context".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(90).bright_black());

    for consumer in &consumers {
        let status = if consumer.is_revoked() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };

        println!(
            "  {:<3} {:<24} {:<34} {:<14} {}",
            consumer.id.to_string().bright_black(),
            consumer.name.cyan(),
            consumer.consumer_key,
            consumer.context,
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        consumers.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Revokes a consumer by name, key or ID with confirmation prompt.
async fn revoke_consumer(repo: &PgConsumerRepository, name_or_id: String) -> Result<()> {
    println!("{}", "🔒 Revoke OAuth Consumer".bright_blue().bold());
    println!();

    let consumers = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let id = name_or_id.parse::<i64>().ok();
    let consumer = consumers
        .into_iter()
        .find(|c| {
            Some(c.id) == id || c.name == name_or_id || c.consumer_key == name_or_id
        })
        .context("Consumer not found")?;

    if consumer.is_revoked() {
        println!("{}", "⚠️  This consumer is already revoked".yellow());
        return Ok(());
    }

    println!("  Consumer: {}", consumer.name.cyan());
    println!("  Key:      {}", consumer.consumer_key.bright_black());
    println!();

    if !confirm("Revoke this consumer?", false)? {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    repo.revoke(consumer.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke consumer: {}", e))?;

    println!();
    println!("{}", "✅ Consumer revoked successfully!".green().bold());
    println!();

    Ok(())
}

/// Dispatches session token commands.
async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let sessions = PgSessionRepository::new(pool.clone());
    let accounts = PgAccountRepository::new(pool);

    match action {
        TokenAction::Create {
            account,
            label,
            token,
            yes,
        } => create_token(&sessions, &accounts, account, label, token, yes).await?,
        TokenAction::List => list_tokens(&sessions, &accounts).await?,
        TokenAction::Revoke { id, account } => {
            revoke_tokens(&sessions, &accounts, id, account).await?
        }
    }

    Ok(())
}

/// Looks up an account by user name for the token commands.
async fn find_account(
    accounts: &PgAccountRepository,
    name: &str,
) -> Result<Account> {
    accounts
        .find_by_username(name)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("Account '{}' not found", name))
}

/// Issues a bearer token that authenticates as an account.
///
/// Only the HMAC-SHA256 of the token, keyed by `TOKEN_SIGNING_SECRET`, is
/// stored. The raw value is printed once.
async fn create_token(
    sessions: &PgSessionRepository,
    accounts: &PgAccountRepository,
    account: Option<String>,
    label: Option<String>,
    token: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    let signing_secret = std::env::var("TOKEN_SIGNING_SECRET")
        .context("TOKEN_SIGNING_SECRET must be set to create tokens")?;

    println!("{}", "🔑 Issue Session Token".bright_blue().bold());
    println!();

    let account_name = match account {
        Some(a) => a,
        None => Input::new().with_prompt("Account user name").interact_text()?,
    };
    let owner = find_account(accounts, &account_name).await?;

    if owner.status == AccountStatus::Blocked {
        println!(
            "{}",
            "⚠️  This account is blocked; the token will not authenticate until it is unblocked."
                .yellow()
        );
    }

    let label = match label {
        Some(l) => l,
        None => Input::new()
            .with_prompt("Label")
            .with_initial_text("Migration job")
            .interact_text()?,
    };

    let token_value = token.unwrap_or_else(|| generate_token(48));

    println!();
    println!("{}", "Session details:".bright_white().bold());
    println!("  Account: {} (ID {})", owner.name.cyan(), owner.id);
    println!("  Label:   {}", label.cyan());
    println!("  Token:   {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  Save this token now. It cannot be shown again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm && !confirm("Issue this token?", true)? {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    let session = sessions
        .create(NewSession {
            account_id: owner.id,
            label,
            token_hash: hash_token(&signing_secret, &token_value),
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to issue token: {}", e))?;

    println!();
    println!(
        "{} (session {})",
        "✅ Token issued!".green().bold(),
        session.id
    );
    println!();
    println!(
        "  curl -H \"Authorization: Bearer {}\" -H \"Content-Type: application/json\" \\\n       -d '{{\"title\":\"News\"}}' http://localhost:3000/api/v1/import-category",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

/// Lists every session with its owning account and last use.
async fn list_tokens(sessions: &PgSessionRepository, accounts: &PgAccountRepository) -> Result<()> {
    println!("{}", "📋 Sessions".bright_blue().bold());
    println!();

    let all = sessions
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list sessions: {}", e))?;

    if all.is_empty() {
        println!("{}", "  No sessions found".yellow());
        return Ok(());
    }

    let mut owners: HashMap<i64, String> = HashMap::new();
    for session in &all {
        if !owners.contains_key(&session.account_id) {
            let name = accounts
                .find_by_id(session.account_id)
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
                .map(|a| a.name)
                .unwrap_or_else(|| "?".to_string());
            owners.insert(session.account_id, name);
        }
    }

    println!(
        "  {:<4} {:<16} {:<24} {:<17} {:<10}",
        "ID".bright_white().bold(),
        "Account".bright_white().bold(),
        "Label".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(78).bright_black());

    for session in &all {
        let status = if session.is_revoked() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };
        let last_used = session
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<4} {:<16} {:<24} {:<17} {}",
            session.id.to_string().bright_black(),
            owners[&session.account_id].cyan(),
            session.label,
            last_used.bright_black(),
            status
        );
    }

    println!();
    println!("  Total: {}", all.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Revokes a single session or all open sessions of an account.
async fn revoke_tokens(
    sessions: &PgSessionRepository,
    accounts: &PgAccountRepository,
    id: Option<i64>,
    account: Option<String>,
) -> Result<()> {
    println!("{}", "🔒 Revoke Sessions".bright_blue().bold());
    println!();

    if let Some(name) = account {
        let owner = find_account(accounts, &name).await?;

        if !confirm(&format!("Revoke every session of '{}'?", owner.name), false)? {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }

        let closed = sessions
            .revoke_for_account(owner.id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to revoke sessions: {}", e))?;

        println!("{} {}", "✅ Sessions revoked:".green().bold(), closed);
        return Ok(());
    }

    let id = id.context("Pass a session ID or --account")?;
    let session = sessions
        .find_by_id(id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Session not found")?;

    if session.is_revoked() {
        println!("{}", "⚠️  This session is already revoked".yellow());
        return Ok(());
    }

    println!("  Session: {} ({})", session.id.to_string().bright_black(), session.label.cyan());
    println!();

    if !confirm("Revoke this session?", false)? {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    sessions
        .revoke(session.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke session: {}", e))?;

    println!("{}", "✅ Session revoked".green().bold());
    println!();

    Ok(())
}

/// Dispatches role registry commands.
async fn handle_role_action(action: RoleAction, pool: &PgPool) -> Result<()> {
    let repo = PgRoleRepository::new(Arc::new(pool.clone()));

    match action {
        RoleAction::Add { name } => {
            let role = repo
                .create(name.trim())
                .await
                .map_err(|e| anyhow::anyhow!("Failed to add role: {}", e))?;

            println!(
                "{} {} (ID {})",
                "✅ Role registered:".green().bold(),
                role.name.cyan(),
                role.id
            );
        }
        RoleAction::List => {
            println!("{}", "📋 Roles".bright_blue().bold());
            println!();

            let roles = repo
                .list()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list roles: {}", e))?;

            for role in &roles {
                let note = if role.is_grantable() {
                    "".normal()
                } else {
                    "(never granted)".bright_black()
                };
                println!(
                    "  {:<3} {} {}",
                    role.id.to_string().bright_black(),
                    role.name.cyan(),
                    note
                );
            }
            println!();
        }
    }

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of accounts and categories
/// - Number of active OAuth consumers and open sessions
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let accounts_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
        .fetch_one(pool)
        .await?;

    let categories_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;

    let consumers_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM oauth_consumers WHERE revoked_at IS NULL")
            .fetch_one(pool)
            .await?;

    let sessions_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE revoked_at IS NULL")
            .fetch_one(pool)
            .await?;

    println!(
        "  Accounts:         {}",
        accounts_count.to_string().bright_green().bold()
    );
    println!(
        "  Categories:       {}",
        categories_count.to_string().bright_green().bold()
    );
    println!(
        "  Active consumers: {}",
        consumers_count.to_string().bright_green().bold()
    );
    println!(
        "  Open sessions:    {}",
        sessions_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let nonces: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM oauth_nonces")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL:    {}", version.bright_white());
            println!("  Stored nonces: {}", nonces.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}

fn confirm(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Generates a cryptographically random alphanumeric token.
fn generate_token(len: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    let mut rng = rand::rng();

    (0..len)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
