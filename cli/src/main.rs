use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use trainerhub::api::{ProfileUpdate, RegisterRequest};
use trainerhub::config::{ConfigError, ConfigOverrides};
use trainerhub::session::FileStorage;
use trainerhub::{AuthError, AuthService, ClientConfig, Destination, HttpApi, SessionStore, UserRecord};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("http client setup failed: {0}")]
    Setup(#[from] trainerhub::api::ApiError),
    #[error("{}", .0.user_message())]
    Auth(#[from] AuthError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "trainerhub", about = "Gym and personal-training account CLI")]
struct Cli {
    #[arg(long, env = "TRAINERHUB_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "TRAINERHUB_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TRAINERHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log into it.
    Register(RegisterArgs),
    /// Forget the stored session.
    Logout,
    /// Print the route the app would open for the stored session.
    Route,
    /// Print the stored user record.
    Whoami,
    Profile(ProfileCommand),
    /// Change the account password.
    Password(PasswordArgs),
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "TRAINERHUB_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long)]
    phone: Option<String>,
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    /// Fetch the profile from the server.
    Show,
    /// Edit profile fields; omitted fields stay unchanged.
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

#[derive(Args, Debug)]
struct PasswordArgs {
    #[arg(long)]
    current: String,
    #[arg(long)]
    new: String,
    /// Defaults to `--new`.
    #[arg(long)]
    confirm: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let service = build_service(&cli)?;

    match cli.command {
        Command::Login { email, password } => {
            let outcome = service.login(&email, &password).await?;
            println!("{}", outcome.destination);
            Ok(())
        }
        Command::Register(args) => {
            let request =
                RegisterRequest { name: args.name, email: args.email, password: args.password, phone: args.phone };
            let outcome = service.register(request).await?;
            println!("{}", outcome.destination);
            Ok(())
        }
        Command::Logout => {
            let destination = service.logout().await?;
            println!("{destination}");
            Ok(())
        }
        Command::Route => {
            println!("{}", service.resolve_destination().await);
            Ok(())
        }
        Command::Whoami => {
            let session = service.current_session().await?;
            let value = serde_json::json!({
                "role": role_label(&session.user),
                "user": serde_json::to_value(&session.user)?,
            });
            print_json(&value)
        }
        Command::Profile(profile) => run_profile(&service, profile).await,
        Command::Password(args) => {
            let confirm = args.confirm.as_deref().unwrap_or(&args.new);
            let message = service.change_password(&args.current, &args.new, confirm).await?;
            println!("{}", message.as_deref().unwrap_or("password changed"));
            Ok(())
        }
    }
}

async fn run_profile(service: &AuthService<FileStorage>, profile: ProfileCommand) -> Result<(), CliError> {
    match profile.command {
        ProfileSubcommand::Show => {
            let user = service.profile().await?;
            print_user(&user)
        }
        ProfileSubcommand::Update { name, email, phone } => {
            let user = service.update_profile(ProfileUpdate { name, email, phone }).await?;
            print_user(&user)
        }
    }
}

fn build_service(cli: &Cli) -> Result<AuthService<FileStorage>, CliError> {
    let config = resolve_config(cli)?;
    tracing::debug!(api_url = %config.api_url, session_file = %config.session_file.display(), "client configured");

    let api = HttpApi::from_config(&config)?;
    let store = SessionStore::new(FileStorage::new(config.session_file));
    Ok(AuthService::new(Arc::new(api), store))
}

/// Command-line values win; the environment only fills what they leave unset.
fn resolve_config(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    ClientConfig::from_env_with(ConfigOverrides { api_url: cli.api_url.clone(), session_file: cli.session_file.clone() })
}

fn print_user(user: &UserRecord) -> Result<(), CliError> {
    let value = serde_json::to_value(user)?;
    print_json(&value)
}

fn role_label(user: &UserRecord) -> &'static str {
    match trainerhub::gate::destination_for(user) {
        Destination::AdminHome => "admin",
        Destination::PersonalHome => "personal",
        Destination::ClientHome | Destination::Login => "client",
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;
