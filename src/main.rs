use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::io::{self, Write};
use std::process;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use stockctl::cli::{Args, Command};
use stockctl::config::Config;
use stockctl::guard::{GuardState, SessionGuard};
use stockctl::logging::init_logging;
use stockctl::permissions::{has_capability, Capability};
use stockctl::session::{FilesystemTokenStore, TokenStore};
use stockctl::ui::output::{display_renewal, display_status};
use stockctl::ui::TerminalPresenter;
use stockctl::{ActivityKind, ApiClient};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    init_logging(&config.log_level, config.verbose);

    let Some(command) = args.command.clone() else {
        print_usage();
        process::exit(1);
    };

    if let Err(e) = run(command, &config).await {
        eprintln!("{} {:#}", "Error:".red(), e);
        process::exit(1);
    }
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let store: Arc<dyn TokenStore> = Arc::new(FilesystemTokenStore::new(&config.token_file));
    let client = ApiClient::new(
        config.api_base_url.clone(),
        Arc::clone(&store),
        config.request_timeout,
    )?;

    if config.verbose {
        eprintln!(
            "{}",
            format!("[stockctl] API: {} ({} mode)", client.base_url(), config.mode).dimmed()
        );
        eprintln!(
            "{}",
            format!("[stockctl] Tokens: {}", config.token_file.display()).dimmed()
        );
    }

    match command {
        Command::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password()?,
            };
            let profile = client.login(&username, &password).await?;
            println!(
                "{} {}",
                "Logged in as".green(),
                profile.display_name().green().bold()
            );
        }
        Command::Logout => {
            let guard = build_guard(config, &store, client, Arc::new(TerminalPresenter::new()))?;
            guard.logout();
        }
        Command::Status => {
            display_status(store.has_session(), store.user_profile().as_ref());
        }
        Command::Renew => {
            let guard = build_guard(config, &store, client, Arc::new(TerminalPresenter::new()))?;
            display_renewal(guard.renew_session().await);
        }
        Command::Watch => watch(config, &store, client).await?,
        Command::Can { capability } => {
            let capability: Capability = capability.parse().map_err(anyhow::Error::msg)?;
            let allowed = has_capability(store.user_profile().as_ref(), capability);
            if allowed {
                println!("{} {}", "allowed:".green(), capability);
            } else {
                println!("{} {}", "denied:".red(), capability);
                process::exit(2);
            }
        }
    }

    Ok(())
}

fn build_guard(
    config: &Config,
    store: &Arc<dyn TokenStore>,
    client: ApiClient,
    presenter: Arc<TerminalPresenter>,
) -> Result<SessionGuard> {
    let guard = SessionGuard::builder()
        .config(config.guard.clone())
        .store(Arc::clone(store))
        .renewal(Arc::new(client))
        .presenter(presenter.clone())
        .login_boundary(presenter)
        .build()?;
    Ok(guard)
}

async fn watch(config: &Config, store: &Arc<dyn TokenStore>, client: ApiClient) -> Result<()> {
    let presenter = Arc::new(TerminalPresenter::new());
    let ended = presenter.ended();
    let guard = build_guard(config, store, client, Arc::clone(&presenter))?;

    if !guard.start() {
        println!("{}", "No active session. Log in first.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "Watching session: expires after {}s idle, warning {}s before. \
             Type 'renew', 'status' or 'logout'; Ctrl-D leaves the session running.",
            config.guard.idle_timeout.as_secs(),
            config.guard.warning_threshold.as_secs()
        )
        .dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = ended.notified() => break,
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    guard.stop();
                    break;
                };
                guard.activity().record(ActivityKind::KeyDown);
                match line.trim() {
                    "renew" => {
                        if guard.renew_session().await == GuardState::Expired {
                            break;
                        }
                    }
                    "logout" => {
                        guard.logout();
                        break;
                    }
                    "status" => println!(
                        "{}",
                        format!("{} ({}s left)", guard.state(), guard.remaining_seconds()).dimmed()
                    ),
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

fn prompt_password() -> Result<String> {
    print!("Password: ");
    io::stdout().flush()?;
    let mut password = String::new();
    io::stdin()
        .read_line(&mut password)
        .context("Failed to read password")?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}

fn print_usage() {
    eprintln!("{}", "Usage: stockctl [OPTIONS] <COMMAND>".red());
    eprintln!("{}", "  login <username>   Log in and store the session tokens".dimmed());
    eprintln!("{}", "  logout             End the session".dimmed());
    eprintln!("{}", "  status             Show the stored session".dimmed());
    eprintln!("{}", "  renew              Renew the access token".dimmed());
    eprintln!("{}", "  watch              Keep the idle guard running interactively".dimmed());
    eprintln!("{}", "  can <capability>   Check a permission of the logged-in user".dimmed());
}
