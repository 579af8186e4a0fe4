//! linkhub — CLI front-end over the LinkHub client data layer.
//!
//! Drives the same API client and auth session the dashboard uses, so the
//! token cached by `linkhub login` survives across invocations.
//!
//! # Subcommands
//! - `login <email> <password>` / `register <name> <email> <password>`
//! - `logout` / `me`
//! - `list [--project <p>] [--search <s>] [--json]`
//! - `add <url> <title> [--project <p>]`
//! - `rm <id>` / `projects` / `status`

use std::sync::Arc;

use clap::{Parser, Subcommand};
use linkhub_client::{AuthSession, LinkHubApi};
use linkhub_core::{Link, NewLink};
use uuid::Uuid;

const DEFAULT_API: &str = "http://127.0.0.1:5000/api";
const DEFAULT_TOKEN_PATH: &str = "~/.linkhub/token";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "linkhub", version, about = "LinkHub bookmark manager CLI")]
struct Cli {
    /// LinkHub API root (overrides LINKHUB_API_URL env var)
    #[arg(long, env = "LINKHUB_API_URL", default_value = DEFAULT_API)]
    api: String,

    /// Where the bearer token is cached between sessions
    #[arg(long, env = "LINKHUB_TOKEN_PATH", default_value = DEFAULT_TOKEN_PATH)]
    token_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and cache the issued token
    Login { email: String, password: String },

    /// Create an account and cache the issued token
    Register {
        name: String,
        email: String,
        password: String,
    },

    /// Drop the cached token
    Logout,

    /// Show the signed-in user
    Me,

    /// List saved links
    List {
        /// Filter to one project label
        #[arg(long)]
        project: Option<String>,

        /// Case-insensitive title search
        #[arg(long)]
        search: Option<String>,

        /// Output the raw JSON array
        #[arg(long)]
        json: bool,
    },

    /// Save a new link
    Add {
        url: String,
        title: String,

        #[arg(long)]
        project: Option<String>,
    },

    /// Delete a link by id
    Rm { id: Uuid },

    /// List the project labels in use
    Projects,

    /// Show LinkHub server status
    Status,
}

// ============================================================================
// Output formatting
// ============================================================================

/// One link as a two-line terminal entry.
fn format_link(link: &Link) -> String {
    format!(
        "{}  [{}]  {}\n    {}  ({})",
        link.created_at.format("%Y-%m-%d"),
        link.project,
        link.title,
        link.url,
        link.id
    )
}

// ============================================================================
// Command handlers
// ============================================================================

async fn require_session(session: &mut AuthSession) -> anyhow::Result<()> {
    if !session.init().await? {
        eprintln!("linkhub: not logged in — run `linkhub login <email> <password>`");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let api = Arc::new(LinkHubApi::new(cli.api)?);
    let mut session = AuthSession::new(api.clone(), &cli.token_path);

    match cli.command {
        Commands::Login { email, password } => {
            session.login(&email, &password).await?;
            let name = session
                .user()
                .and_then(|u| u.name.clone())
                .unwrap_or_else(|| email.clone());
            println!("Signed in as {}", name);
        }
        Commands::Register { name, email, password } => {
            session.register(&name, &email, &password).await?;
            println!("Account created for {}", email);
        }
        Commands::Logout => {
            session.logout();
            println!("Signed out");
        }
        Commands::Me => {
            require_session(&mut session).await?;
            let user = session.user().expect("session initialized");
            println!("Name:  {}", user.name.as_deref().unwrap_or("?"));
            println!("Email: {}", user.email.as_deref().unwrap_or("?"));
        }
        Commands::List { project, search, json } => {
            require_session(&mut session).await?;
            let links = api
                .list_links(project.as_deref(), search.as_deref())
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&links)?);
            } else if links.is_empty() {
                eprintln!("No links found.");
            } else {
                for link in &links {
                    println!("{}\n", format_link(link));
                }
            }
        }
        Commands::Add { url, title, project } => {
            require_session(&mut session).await?;
            let link = api
                .create_link(&NewLink {
                    url,
                    title,
                    project,
                    description: None,
                    tags: vec![],
                })
                .await?;
            println!("Saved:\n{}", format_link(&link));
        }
        Commands::Rm { id } => {
            require_session(&mut session).await?;
            let confirmation = api.delete_link(id).await?;
            println!("{} ({})", confirmation.message, confirmation.id);
        }
        Commands::Projects => {
            require_session(&mut session).await?;
            for project in api.list_projects().await? {
                println!("{}", project);
            }
        }
        Commands::Status => {
            let body = api.health().await?;
            println!("LinkHub server: {}", body["status"].as_str().unwrap_or("unknown"));
            println!("Version:        {}", body["version"].as_str().unwrap_or("?"));
            println!("Database:       {}", body["database"].as_str().unwrap_or("?"));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("linkhub: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
