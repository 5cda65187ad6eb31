use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use poolyfi_admin::config::{ClientConfig, ConfigError};
use poolyfi_admin::error::{ApiError, ErrorCode};
use poolyfi_admin::nav::LogNavigator;
use poolyfi_admin::net::client::ApiClient;
use poolyfi_admin::net::types::{Credentials, LeaderboardParams, PerformanceFilter};
use poolyfi_admin::net::{api, company, dashboard};
use poolyfi_admin::state::auth::{AuthProvider, Session};
use poolyfi_admin::state::session::SessionStore;
use poolyfi_admin::state::storage::{SharedStorage, StorageError};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("[{code}] {0}", code = .0.error_code())]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "poolyfi", about = "Poolyfi admin API CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in as an admin and store the session token.
    Login {
        #[arg(long, env = "POOLYFI_EMAIL")]
        email: String,
        #[arg(long, env = "POOLYFI_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session locally, and remotely when the server is reachable.
    /// A failed remote call is reported but does not fail the command.
    Logout,
    /// Show whether a session is stored, with the cached profile.
    Status,
    Profile,
    /// Change the admin password. Ends the session on success.
    ResetPassword {
        #[arg(long, env = "POOLYFI_OLD_PASSWORD", hide_env_values = true)]
        old_password: String,
        #[arg(long, env = "POOLYFI_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    /// List employees of a company.
    Employees { company_id: i64 },
    Company(CompanyCommand),
    Industries,
    CompanySizes,
    /// Dashboard totals; platform-wide unless `--company` is given.
    Dashboard {
        #[arg(long)]
        company: Option<i64>,
    },
    CompaniesMeta,
    Performance {
        #[arg(long, default_value = "weekly")]
        filter: PerformanceFilter,
    },
    Leaderboard(LeaderboardArgs),
    Notifications {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        page: Option<u32>,
    },
}

#[derive(Args, Debug)]
struct CompanyCommand {
    #[command(subcommand)]
    command: CompanySubcommand,
}

#[derive(Subcommand, Debug)]
enum CompanySubcommand {
    List,
    Get { id: i64 },
    Delete { id: i64 },
    Activate { id: i64 },
    Deactivate { id: i64 },
}

#[derive(Args, Debug)]
struct LeaderboardArgs {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    industry: Option<i64>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    limit: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Load .env before the subscriber so RUST_LOG can come from it.
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, "failed to load .env");
        }
    }

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let storage = SharedStorage::open(&config.storage_path)?;
    let session = Session::new(SessionStore::new(storage.context()), Arc::new(LogNavigator));
    let client = ApiClient::new(config, session)?;
    let auth = AuthProvider::new(client);

    run(&auth, cli.command).await
}

async fn run(auth: &AuthProvider, command: Command) -> Result<(), CliError> {
    let client = auth.client();
    match command {
        Command::Login { email, password } => {
            auth.login(&Credentials::new(email, password)).await?;
            print_json(&json!({ "authenticated": true, "profile": auth.session().store().user_profile() }))
        }
        Command::Logout => print_json(&logout_report(auth.logout().await)),
        Command::Status => {
            let store = auth.session().store();
            print_json(&json!({ "authenticated": auth.is_authenticated(), "profile": store.user_profile() }))
        }
        Command::Profile => print_json(&api::user_profile(client).await?),
        Command::ResetPassword { old_password, new_password } => {
            let message = api::reset_password(client, &old_password, &new_password).await?;
            print_json(&json!({ "message": message }))
        }
        Command::Employees { company_id } => print_json(&api::company_employees(client, company_id).await?),
        Command::Company(cmd) => run_company(auth, cmd).await,
        Command::Industries => print_json(&company::industries(client).await?),
        Command::CompanySizes => print_json(&company::sizes(client).await?),
        Command::Dashboard { company: Some(id) } => print_json(&dashboard::sub_admin_meta(client, id).await?),
        Command::Dashboard { company: None } => print_json(&dashboard::superadmin_meta(client).await?),
        Command::CompaniesMeta => print_json(&dashboard::companies_meta(client).await?),
        Command::Performance { filter } => print_json(&dashboard::company_performance(client, filter).await?),
        Command::Leaderboard(args) => {
            let params =
                LeaderboardParams { page: args.page, industry_id: args.industry, search: args.search, limit: args.limit };
            print_json(&dashboard::leaderboard(client, &params).await?)
        }
        Command::Notifications { limit, page } => print_json(&dashboard::notifications(client, limit, page).await?),
    }
}

async fn run_company(auth: &AuthProvider, cmd: CompanyCommand) -> Result<(), CliError> {
    let client = auth.client();
    match cmd.command {
        CompanySubcommand::List => print_json(&company::list(client).await?),
        CompanySubcommand::Get { id } => print_json(&company::get(client, id).await?),
        CompanySubcommand::Delete { id } => print_json(&json!({ "message": company::delete(client, id).await? })),
        CompanySubcommand::Activate { id } => {
            print_json(&json!({ "message": company::set_status(client, id, true).await? }))
        }
        CompanySubcommand::Deactivate { id } => {
            print_json(&json!({ "message": company::set_status(client, id, false).await? }))
        }
    }
}

/// The local session is gone whatever `logout` returned, so a remote failure
/// is reported alongside the result rather than as a command failure.
fn logout_report(result: Result<(), ApiError>) -> Value {
    match result {
        Ok(()) => json!({ "authenticated": false }),
        Err(e) => json!({
            "authenticated": false,
            "remote_error": { "code": e.error_code(), "message": e.to_string() },
        }),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
