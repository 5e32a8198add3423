//! `puntualcheck` command-line shell.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use puntualcheck_auth::{FileStorage, RestoreOutcome, SessionStore, Shell};
use puntualcheck_console::config::{ConsoleConfig, DEFAULT_API_URL};
use puntualcheck_console::{Console, Content, DirectoryAuthenticator, HistoryNavigator, HttpTransport, menu};
use puntualcheck_observability::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "puntualcheck", about = "PuntualCheck attendance console")]
struct Cli {
    #[arg(long, env = "PUNTUALCHECK_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[arg(long, env = "PUNTUALCHECK_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[arg(long, env = "PUNTUALCHECK_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PUNTUALCHECK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the persisted session.
    Logout,
    /// Show the current identity.
    Whoami,
    /// Navigate to a path and show what the guard decides.
    Open { path: String },
    /// Show the navigation menu for the current identity.
    Menu,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ConsoleConfig::new(&cli.api_url, cli.session_file, cli.log_format)?;
    puntualcheck_observability::init(config.log_format);

    tracing::info!(api_url = %config.api_url, session_file = %config.session_file.display(), "starting console");

    let transport = HttpTransport::new(config.api_url.clone()).context("failed to build HTTP client")?;
    let storage = Arc::new(FileStorage::new(config.session_file.clone()));
    let session = SessionStore::arc(storage, Arc::new(DirectoryAuthenticator::new(transport)));

    if session.restore() == RestoreOutcome::Discarded {
        eprintln!("La sesión guardada no era válida y fue descartada.");
    }

    let console = Console::new(session.clone(), Arc::new(HistoryNavigator::new()));

    match cli.command {
        Command::Login { email, password } => match console.login(&email, &password).await {
            Ok(identity) => println!("Bienvenido, {} ({})", identity.display_name, identity.role),
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        },
        Command::Logout => {
            console.logout();
            println!("Sesión cerrada.");
        }
        Command::Whoami => match session.current_identity() {
            Some(identity) => {
                println!("[{}] {}", identity.initial(), identity.display_name);
                println!("correo: {}", identity.email);
                println!("rol:    {}", identity.role);
                println!("id:     {}", identity.id);
            }
            None => println!("Sin sesión."),
        },
        Command::Open { path } => {
            let screen = console.open(&path)?;
            println!("{} -> {} ({})", path, screen.location, screen.view.name);
            match (screen.shell, &screen.content) {
                (Shell::Bare, _) => println!("vista sin menú"),
                (Shell::Authenticated, Content::View) => println!("vista renderizada"),
                (Shell::Authenticated, Content::Denied) => println!("acceso denegado"),
            }
            for entry in &screen.menu {
                let marker = if entry.is_selected(&screen.location) { '*' } else { ' ' };
                println!(" {marker} {:<16} {}", entry.label, entry.path);
            }
        }
        Command::Menu => {
            let entries = menu::visible(&session);
            if entries.is_empty() {
                println!("Sin sesión.");
            }
            for entry in entries {
                println!("  {:<16} {}", entry.label, entry.path);
            }
        }
    }

    Ok(())
}
