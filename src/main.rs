use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};

use jobboard::config::{ClientConfig, ConfigError};
use jobboard::forms;
use jobboard::net::api::{ApiError, HttpIdentityClient};
use jobboard::net::types::{RegistrationInput, UserKind};
use jobboard::routes;
use jobboard::state::auth::{AuthState, SessionManager};
use jobboard::state::token::{FileTokenStore, TokenStore};
use jobboard::util::auth::GateDecision;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("client setup failed: {0}")]
    Setup(#[from] ApiError),
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("not signed in")]
    NotSignedIn,
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "jobboard", about = "Job board session client")]
struct Cli {
    /// Identity service base URL; overrides `JOBBOARD_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Token file path; overrides `JOBBOARD_TOKEN_FILE`.
    #[arg(long)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the credential.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "JOBBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in as it.
    Register(RegisterArgs),
    /// Print the current session.
    Whoami,
    /// Forget the stored credential.
    Logout,
    /// Decide whether the current session may open `path`.
    Gate { path: String },
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long, default_value = "job_seeker")]
    user_type: UserKind,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "JOBBOARD_PASSWORD", hide_env_values = true)]
    password: String,
    /// Defaults to `--password`.
    #[arg(long)]
    confirm_password: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    company_name: Option<String>,
    #[arg(long)]
    company_description: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.override_api_url("--api-url", api_url)?;
    }
    if let Some(token_file) = cli.token_file {
        config.token_file = token_file;
    }

    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.token_file));
    let identity = Arc::new(HttpIdentityClient::from_config(&config, tokens.clone())?);
    tracing::debug!(api_url = %config.api_url, token_file = %config.token_file.display(), "starting session");
    let session = SessionManager::start(identity, tokens).await;

    match cli.command {
        Command::Login { email, password } => run_login(&session, &email, &password).await,
        Command::Register(args) => run_register(&session, args).await,
        Command::Whoami => run_whoami(&session),
        Command::Logout => {
            session.logout();
            print_json(&json!({ "authenticated": false }))
        }
        Command::Gate { path } => run_gate(&session, &path),
    }
}

async fn run_login(session: &SessionManager, email: &str, password: &str) -> Result<(), CliError> {
    let (email, password) = forms::validate_login(email, password).map_err(CliError::InvalidInput)?;
    let user = session
        .login(&email, &password)
        .await
        .map_err(|e| CliError::Rejected(e.user_message()))?;
    print_json(&json!({
        "user": user,
        "redirect": routes::landing_path(&user.role),
    }))
}

async fn run_register(session: &SessionManager, args: RegisterArgs) -> Result<(), CliError> {
    let confirm = args.confirm_password.unwrap_or_else(|| args.password.clone());
    let input = RegistrationInput {
        user_type: args.user_type,
        name: Some(args.name),
        email: args.email,
        password: args.password,
        phone: args.phone,
        company_name: args.company_name,
        company_description: args.company_description,
    };
    let input = forms::validate_registration(&input, &confirm).map_err(CliError::InvalidInput)?;
    let user = session
        .register(&input)
        .await
        .map_err(|e| CliError::Rejected(e.user_message()))?;
    print_json(&json!({
        "user": user,
        "redirect": routes::landing_path(&user.role),
    }))
}

fn run_whoami(session: &SessionManager) -> Result<(), CliError> {
    let state = session.snapshot();
    if !state.is_authenticated() {
        return Err(CliError::NotSignedIn);
    }
    print_json(&session_json(&state))
}

fn run_gate(session: &SessionManager, path: &str) -> Result<(), CliError> {
    let state = session.snapshot();
    let decision = routes::gate_path(&state, path);
    let (outcome, redirect) = match decision {
        None => ("pending", None),
        Some(GateDecision::Render) => ("render", None),
        Some(other) => ("redirect", other.redirect_path()),
    };
    print_json(&json!({
        "path": path,
        "decision": outcome,
        "redirect": redirect,
        "session": session_json(&state),
    }))
}

fn session_json(state: &AuthState) -> Value {
    json!({
        "user": state.user,
        "loading": state.loading,
        "isAuthenticated": state.is_authenticated(),
        "isJobSeeker": state.is_job_seeker(),
        "isEmployer": state.is_employer(),
    })
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
