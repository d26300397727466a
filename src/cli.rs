use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "stockctl")]
#[command(about = "Session client for the stock-control backend", long_about = None)]
pub struct Args {
    #[arg(
        long = "api-url",
        global = true,
        help = "Backend API base URL (e.g., http://localhost:8000/api/)"
    )]
    pub api_url: Option<String>,

    #[arg(long = "token-file", global = true, help = "Where tokens are persisted")]
    pub token_file: Option<PathBuf>,

    #[arg(
        long = "idle-timeout",
        global = true,
        help = "Seconds of inactivity before the session ends"
    )]
    pub idle_timeout: Option<u64>,

    #[arg(
        long = "warning-threshold",
        global = true,
        help = "Seconds before expiry at which the warning appears"
    )]
    pub warning_threshold: Option<u64>,

    #[arg(short = 'v', long = "verbose", global = true, help = "Log debug output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in and store the session tokens
    Login {
        username: String,
        #[arg(long, env = "STOCKCTL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// End the session and wipe stored tokens
    Logout,
    /// Show the stored session and profile
    Status,
    /// Exchange the refresh token for a new access token
    Renew,
    /// Keep the session alive while you work; each line typed counts as activity
    Watch,
    /// Check whether the logged-in user has a capability
    Can {
        #[arg(
            help = "view-inventory, manage-equipment, delete-equipment, manage-users, manage-stocks or access-stock:<id>"
        )]
        capability: String,
    },
}
