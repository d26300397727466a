use crate::guard::{GuardState, LoginBoundary, WarningPresenter};
use crate::models::UserProfile;
use colored::*;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Warning prompt and login boundary for an interactive terminal.
///
/// The countdown is redrawn in place on every check. When the session ends
/// the `ended` notifier fires so the caller can leave its input loop.
#[derive(Default)]
pub struct TerminalPresenter {
    visible: AtomicBool,
    ended: Arc<Notify>,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ended(&self) -> Arc<Notify> {
        Arc::clone(&self.ended)
    }

    pub fn is_warning_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}

impl WarningPresenter for TerminalPresenter {
    fn show_warning(&self, remaining_seconds: u64) {
        if !self.visible.swap(true, Ordering::SeqCst) {
            println!();
            println!("{}", "Session about to expire".yellow().bold());
            println!(
                "{}",
                "Type 'renew' to renew your session or 'logout' to leave.".dimmed()
            );
        }
        print!(
            "\r{}",
            format!("Your session expires in {:>3} seconds.", remaining_seconds).yellow()
        );
        let _ = io::stdout().flush();
    }

    fn hide_warning(&self) {
        if self.visible.swap(false, Ordering::SeqCst) {
            println!();
            println!("{}", "Session kept alive.".green());
        }
    }
}

impl LoginBoundary for TerminalPresenter {
    fn redirect_to_login(&self) {
        println!();
        println!(
            "{}",
            "Session ended. Run `stockctl login <username>` to start a new one.".red()
        );
        self.ended.notify_one();
    }
}

/// Display the stored session
pub fn display_status(has_session: bool, profile: Option<&UserProfile>) {
    if !has_session {
        println!("{}", "No active session.".yellow());
        return;
    }

    println!("{}", "Session active.".green());
    let Some(profile) = profile else {
        println!("{}", "No cached profile.".dimmed());
        return;
    };

    println!("  {} {}", "User:".bold(), profile.display_name());
    if !profile.role.is_empty() {
        println!("  {} {}", "Role:".bold(), profile.role);
    }
    if profile.is_superuser {
        println!("  {} {}", "Superuser:".bold(), "yes");
    }
    if !profile.groups.is_empty() {
        let groups: Vec<&str> = profile.groups.iter().map(|g| g.name.as_str()).collect();
        println!("  {} {}", "Groups:".bold(), groups.join(", "));
    }
    if !profile.estoques.is_empty() {
        let stocks: Vec<String> = profile.estoques.iter().map(|id| id.to_string()).collect();
        println!("  {} {}", "Stocks:".bold(), stocks.join(", "));
    }
}

/// Display the outcome of a renewal
pub fn display_renewal(state: GuardState) {
    match state {
        GuardState::Expired => println!("{}", "Could not renew the session.".red()),
        _ => println!("{}", "Session renewed.".green()),
    }
}
