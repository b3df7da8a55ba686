//! Operator tooling for admin accounts: first-run provisioning, a health
//! listing of stored hashes, and password repair.

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use cms_backend::config::Config;
use cms_backend::models::admin::{AdminChanges, CreateAdminRequest};
use cms_backend::services::mailer::DisabledMailer;
use cms_backend::store::AdminStore;
use cms_backend::utils::{hash_password, is_bcrypt_hash, MIN_PASSWORD_LEN};
use cms_backend::{db, AppState};

#[derive(Parser)]
#[command(name = "admin-cli", about = "Manage CMS admin accounts")]
struct Cli {
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an admin. The first one becomes super administrator.
    Init {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List admins and whether their stored password is a bcrypt hash.
    List,
    /// Replace an admin's password.
    SetPassword {
        #[arg(long)]
        username: String,
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("invalid configuration")?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    let pool = db::establish_connection(&config.database_url)
        .await
        .context("failed to open database")?;
    let cost = config.bcrypt_cost;
    let state = AppState::new(config, pool, Arc::new(DisabledMailer))?;

    match cli.command {
        Command::Init {
            username,
            email,
            password,
        } => {
            let admin = state
                .auth
                .bootstrap_admin(CreateAdminRequest {
                    username,
                    email,
                    password,
                })
                .await?;
            println!("Admin account created: {}", admin.username);
            if admin.is_super_admin {
                println!("This account is the SUPER ADMINISTRATOR and can manage other accounts.");
            }
        }
        Command::List => {
            let admins = state.store.list_all().await?;
            if admins.is_empty() {
                println!("No admins found.");
            }
            for admin in admins {
                println!("{} (ID: {})", admin.username, admin.id);
                println!("   Email: {}", admin.email.as_deref().unwrap_or("-"));
                println!(
                    "   Password hash: {}",
                    if is_bcrypt_hash(&admin.password_hash) {
                        "ok"
                    } else {
                        "NOT A BCRYPT HASH"
                    }
                );
                println!("   Super admin: {}", if admin.is_super_admin { "yes" } else { "no" });
            }
        }
        Command::SetPassword { username, password } => {
            if password.chars().count() < MIN_PASSWORD_LEN {
                bail!("Password must be at least {} characters", MIN_PASSWORD_LEN);
            }
            let Some(admin) = state.store.find_by_username(&username, true).await? else {
                bail!("No admin named '{}'", username);
            };
            let hash = hash_password(password, cost).await?;
            state
                .store
                .update(&admin.id, AdminChanges::password(hash))
                .await?;
            println!("Password updated for {}", admin.username);
        }
    }

    Ok(())
}
