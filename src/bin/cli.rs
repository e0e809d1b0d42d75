use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use runnerbee::{
    db,
    repositories::user_repository::SqliteUserRepository,
    services::user_service::{CreateUserRequest, UpdatePasswordRequest, UserService},
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "runnerbee-cli")]
#[command(about = "CLI tool for managing RunnerBee users", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Address the weekly report is sent to
        #[arg(short, long)]
        email: String,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// List all users
    List {
        /// Maximum number of users to display
        #[arg(short, long, default_value_t = 100)]
        limit: i64,

        /// Offset for pagination
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: i64,
    },

    /// Delete a user and all of their runs
    Delete {
        #[arg(short, long)]
        username: String,
    },

    /// Set a new password for a user
    SetPassword {
        #[arg(short, long)]
        username: String,

        /// New password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
}

fn get_password(prompt: &str) -> anyhow::Result<String> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

fn confirm_password(prompt: &str) -> anyhow::Result<(String, String)> {
    let password = get_password(prompt)?;
    let confirm = get_password("Confirm password")?;
    Ok((password, confirm))
}

fn password_pair(password: Option<String>, prompt: &str) -> anyhow::Result<(String, String)> {
    match password {
        Some(pw) => Ok((pw.clone(), pw)),
        None => confirm_password(prompt),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let pool = db::create_pool().await.context("opening database")?;
    db::run_migrations(&pool).await.context("running migrations")?;

    let user_repository = Arc::new(SqliteUserRepository::new(pool));
    let user_service = UserService::new(user_repository);

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create {
                username,
                email,
                password,
            } => {
                let (password, password_confirm) = password_pair(password, "Password")?;

                let request = CreateUserRequest {
                    username,
                    email,
                    password,
                    password_confirm: Some(password_confirm),
                };

                let user = user_service
                    .create_user(request)
                    .await
                    .context("failed to create user")?;

                println!("User created");
                println!("  ID: {}", user.id);
                println!("  Username: {}", user.username);
                println!("  Email: {}", user.email);
            }

            UserCommands::List { limit, offset } => {
                let users = user_service
                    .list_users(Some(limit), Some(offset))
                    .await
                    .context("failed to list users")?;

                if users.is_empty() {
                    println!("No users found.");
                } else {
                    println!(
                        "{:<5} {:<24} {:<40} {:<20}",
                        "ID", "Username", "Email", "Created"
                    );
                    println!("{}", "-".repeat(90));
                    for user in users {
                        println!(
                            "{:<5} {:<24} {:<40} {:<20}",
                            user.id,
                            user.username,
                            user.email,
                            user.created_at.as_deref().unwrap_or("N/A")
                        );
                    }
                }
            }

            UserCommands::Delete { username } => {
                let Some(user) = user_service.find_user_by_username(&username).await? else {
                    bail!("user '{}' not found", username);
                };

                user_service
                    .delete_user(user.id)
                    .await
                    .context("failed to delete user")?;

                println!("User '{}' deleted", username);
            }

            UserCommands::SetPassword { username, password } => {
                let Some(user) = user_service.find_user_by_username(&username).await? else {
                    bail!("user '{}' not found", username);
                };

                let (new_password, password_confirm) = password_pair(password, "New password")?;

                let request = UpdatePasswordRequest {
                    user_id: user.id,
                    new_password,
                    new_password_confirm: Some(password_confirm),
                };

                user_service
                    .update_password(request)
                    .await
                    .context("failed to update password")?;

                println!("Password updated for '{}'", username);
            }
        },
    }

    Ok(())
}
