//! Developer CLI for PairKit.
//!
//! Simulates the app's session lifecycle against a file-backed store:
//! log in as a member or admin, inspect the derived auth state, and check
//! what the route guard would do for a given path.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::{eyre, WrapErr};
use pairkit_core::{
    AuthSession, GuardAction, KeyValueStore, Navigator, PendingSetup, Role, RouteGuard,
    SessionUpdate,
};
use tracing_subscriber::EnvFilter;

mod store;

use store::JsonFileStore;

#[derive(Parser)]
#[command(name = "pairkit", about = "Session and route-guard tooling for Pair")]
struct Cli {
    /// Path of the JSON session store. Defaults to the platform data dir.
    #[arg(long, env = "PAIRKIT_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Establishes or extends a session with the given fields.
    Login {
        /// Role: user, admin, superadmin, or owner.
        #[arg(long)]
        role: Option<String>,
        /// Household identifier.
        #[arg(long)]
        couple_id: Option<String>,
        /// Member gender: male or female.
        #[arg(long)]
        gender: Option<String>,
        /// Individual profile identifier.
        #[arg(long)]
        user_id: Option<String>,
        /// Member display name.
        #[arg(long)]
        user_name: Option<String>,
        /// Admin account identifier.
        #[arg(long)]
        admin_uid: Option<String>,
        /// Admin email address.
        #[arg(long)]
        admin_email: Option<String>,
        /// Admin display name.
        #[arg(long)]
        admin_name: Option<String>,
        /// Marks the admin as super-admin.
        #[arg(long)]
        super_admin: bool,
        /// Applies the 30-day expiry window instead of 24 hours.
        #[arg(long)]
        remember: bool,
    },
    /// Clears the session and navigates to the login screen.
    Logout,
    /// Prints the derived auth state.
    Status {
        /// Prints the state as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Prints the guard decision for a path such as /user/home.
    Route {
        /// The path to evaluate.
        path: String,
    },
    /// Extends the current session's expiry window.
    TouchExpiry {
        /// Applies the 30-day window.
        #[arg(long)]
        remember: bool,
    },
    /// Suspends route protection for an external flow.
    Suspend {
        /// The flow: password-reset or pin-setup.
        flow: String,
    },
    /// Resumes route protection after an external flow completed.
    Resume,
}

/// Prints every replace-navigation the session or guard issues.
struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn replace(&self, path: &str) {
        println!("navigate (replace) -> {path}");
    }
}

fn default_store_path() -> eyre::Result<PathBuf> {
    let base = dirs::data_dir().ok_or_else(|| eyre!("no platform data directory"))?;
    Ok(base.join("pairkit").join("session.json"))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let path = cli.store.map_or_else(default_store_path, Ok)?;
    let kv: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(path));
    let session = AuthSession::new(kv, Arc::new(PrintNavigator));
    session.initialize().await;

    run(&session, cli.command).await
}

async fn run(session: &AuthSession, command: Command) -> eyre::Result<()> {
    match command {
        Command::Login {
            role,
            couple_id,
            gender,
            user_id,
            user_name,
            admin_uid,
            admin_email,
            admin_name,
            super_admin,
            remember,
        } => {
            let update = SessionUpdate {
                role: role
                    .map(|role| role.parse::<Role>().map_err(|_| eyre!("unknown role: {role}")))
                    .transpose()?,
                couple_id,
                user_gender: gender
                    .map(|gender| {
                        gender
                            .parse::<pairkit_core::Gender>()
                            .map_err(|_| eyre!("unknown gender: {gender}"))
                    })
                    .transpose()?,
                user_id,
                user_name,
                admin_uid,
                admin_email,
                admin_name,
                is_super_admin: super_admin.then_some(true),
                ..SessionUpdate::default()
            };
            session
                .login(update, remember)
                .await
                .wrap_err("login write failed")?;
            println!("logged in");
        }
        Command::Logout => {
            session.logout().await.wrap_err("logout clear failed")?;
            println!("logged out");
        }
        Command::Status { json } => {
            let state = session.state();
            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                println!("authenticated: {}", state.is_authenticated);
                println!(
                    "role:          {}",
                    state.role.map_or_else(|| "-".to_string(), |r| r.to_string())
                );
                println!(
                    "pending setup: {}",
                    state
                        .pending_setup
                        .map_or_else(|| "-".to_string(), |p| p.to_string())
                );
                println!("profile flow:  {}", state.in_profile_selection());
            }
        }
        Command::Route { path } => {
            let guard = RouteGuard::new(session.subscribe(), Arc::new(PrintNavigator));
            match guard.evaluate(&path) {
                GuardAction::Stay => println!("allow {path}"),
                GuardAction::Redirect(target) => println!("redirect {path} -> {target}"),
            }
        }
        Command::TouchExpiry { remember } => {
            session
                .set_session_expiry(remember)
                .await
                .wrap_err("expiry write failed")?;
            println!("session extended");
        }
        Command::Suspend { flow } => {
            let flow: PendingSetup = flow
                .parse()
                .map_err(|_| eyre!("unknown flow: {flow}"))?;
            session.set_pending_setup(Some(flow)).await?;
            println!("route protection suspended for {flow}");
        }
        Command::Resume => {
            session.set_pending_setup(None).await?;
            println!("route protection resumed");
        }
    }
    Ok(())
}
