//! CLI administration tool for post-board.
//!
//! # Usage
//!
//! ```bash
//! # Issue a bearer token for a user
//! cargo run --bin admin -- token issue --subject alice
//!
//! # Check a token
//! cargo run --bin admin -- token inspect <TOKEN>
//!
//! # Show the route table, or which route a request hits
//! cargo run --bin admin -- routes
//! cargo run --bin admin -- routes --resolve PUT /42
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (see `post_board::config`). `token` and `db` commands
//! need `JWT_SECRET`; `routes` needs nothing.

use post_board::api::routes::RouteTable;
use post_board::application::services::AuthService;
use post_board::config::{self, Config, MAX_TOKEN_TTL_SECONDS};

use anyhow::{Context, Result};
use axum::http::Method;
use chrono::Duration;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;

/// CLI tool for managing post-board.
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
    /// Issue and inspect bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Print the post route table
    Routes {
        /// Resolve a request instead, e.g. `--resolve GET /42`
        #[arg(long, num_args = 2, value_names = ["METHOD", "PATH"])]
        resolve: Option<Vec<String>>,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Token subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Issue a new bearer token
    Issue {
        /// Identity the token is issued to (post author name)
        #[arg(short, long)]
        subject: Option<String>,

        /// Lifetime in seconds (defaults to TOKEN_TTL_SECONDS)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=MAX_TOKEN_TTL_SECONDS))]
        ttl: Option<u64>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Verify a token and show who it identifies
    Inspect {
        /// Raw token (without the `Bearer ` prefix)
        token: String,
    },
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

    match cli.command {
        Commands::Token { action } => handle_token_action(action, &config::load_from_env()?)?,
        Commands::Routes { resolve } => handle_routes(resolve)?,
        Commands::Db { action } => handle_db_action(action, &config::load_from_env()?).await?,
    }

    Ok(())
}

/// Dispatches token commands.
fn handle_token_action(action: TokenAction, config: &Config) -> Result<()> {
    let auth = AuthService::new(&config.jwt_secret, config.jwt_leeway_seconds);

    match action {
        TokenAction::Issue { subject, ttl, yes } => {
            let ttl = ttl.unwrap_or(config.token_ttl_seconds);
            issue_token(&auth, subject, ttl, yes)
        }
        TokenAction::Inspect { token } => {
            inspect_token(&auth, &token);
            Ok(())
        }
    }
}

/// Issues a bearer token with interactive prompts.
fn issue_token(
    auth: &AuthService,
    subject: Option<String>,
    ttl: u64,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔑 Issue Bearer Token".bright_blue().bold());
    println!();

    let subject = match subject {
        Some(s) => s,
        None => Input::new().with_prompt("Subject").interact_text()?,
    };

    println!("  Subject:  {}", subject.cyan());
    println!("  Lifetime: {}s", ttl.to_string().bright_white());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Issue this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let lifetime = i64::try_from(ttl)
        .ok()
        .and_then(Duration::try_seconds)
        .with_context(|| format!("TTL of {ttl}s is out of range"))?;
    let token = auth
        .issue_token(&subject, lifetime)
        .map_err(|e| anyhow::anyhow!("Failed to issue token: {}", e))?;

    println!();
    println!("{}", "✅ Token issued".green().bold());
    println!();
    println!("  {}: Bearer {}", "Authorization".bright_cyan(), token.bright_yellow());
    println!();

    Ok(())
}

/// Verifies a token and prints the identity or failure kind.
fn inspect_token(auth: &AuthService, token: &str) {
    let token = token.strip_prefix("Bearer ").unwrap_or(token);

    match auth.authenticate(token) {
        Ok(identity) => {
            println!("{}", "✅ Token is valid".green().bold());
            println!("  Subject: {}", identity.subject.cyan());
            println!(
                "  Expires: {}",
                identity
                    .expires_at
                    .format("%Y-%m-%d %H:%M:%S UTC")
                    .to_string()
                    .bright_white()
            );
        }
        Err(err) => {
            println!("{} {}", "❌".red(), err.to_string().red().bold());
            println!("  Reason: {}", err.reason().yellow());
        }
    }
}

/// Prints the route table, or the route a request resolves to.
fn handle_routes(resolve: Option<Vec<String>>) -> Result<()> {
    let table = RouteTable::posts();

    if let Some(args) = resolve {
        let [method, path] = args.as_slice() else {
            anyhow::bail!("--resolve takes METHOD and PATH");
        };
        let method = Method::from_bytes(method.to_uppercase().as_bytes())
            .with_context(|| format!("Invalid HTTP method '{method}'"))?;

        match table.resolve(&method, path) {
            Some(matched) => {
                println!("{} {}", "→".green(), matched.entry.to_string().bright_white());
                for (name, value) in &matched.params {
                    println!("  {} = {}", name.cyan(), value.bright_yellow());
                }
            }
            None => println!("{}", format!("No route for {method} {path}").yellow()),
        }

        return Ok(());
    }

    println!("{}", "📋 Post Routes".bright_blue().bold());
    println!();
    println!(
        "  {:<8} {:<10} {:<8} {}",
        "Method".bright_white().bold(),
        "Path".bright_white().bold(),
        "Guard".bright_white().bold(),
        "Action".bright_white().bold()
    );
    println!("  {}", "─".repeat(40).bright_black());

    for entry in table.entries() {
        let guard = if entry.is_guarded() {
            entry
                .guards
                .iter()
                .map(|g| g.name())
                .collect::<Vec<_>>()
                .join(",")
                .yellow()
        } else {
            "-".bright_black()
        };

        println!(
            "  {:<8} {:<10} {:<8} {}",
            entry.method.to_string().cyan(),
            entry.path,
            guard,
            entry.action.name().green()
        );
    }
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, config: &Config) -> Result<()> {
    let database_url = config
        .database_url
        .as_deref()
        .context("No database configured (set DATABASE_URL or DB_HOST)")?;

    let pool = PgPool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(&pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(&pool)
                .await?;
            let posts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
                .fetch_one(&pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Posts:      {}", posts.to_string().bright_green().bold());
            println!();
        }
    }

    Ok(())
}
