#![allow(dead_code)]

mod application;
mod message;

use tokio::sync::mpsc;

use mortar::config::MortarConfig;
use mortar::import;
use mortar::services::{assistant, auth, keyring};

use application::{LaunchMode, Mortar, RequestState};
use message::{Command, Message};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = MortarConfig::load();

    // Set up logging to the systemd user journal (`journalctl --user -t mortar -f`).
    // Wrapper filters: mortar crate at info/debug (per config), everything else at warn.
    {
        struct FilteredJournal {
            inner: systemd_journal_logger::JournalLog,
        }

        impl log::Log for FilteredJournal {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                let target = metadata.target();
                if target.starts_with("mortar") || target.starts_with("application") || target.starts_with("message") {
                    let max = if mortar::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
                    metadata.level() <= max
                } else {
                    metadata.level() <= log::LevelFilter::Warn
                }
            }
            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    self.inner.log(record);
                }
            }
            fn flush(&self) {
                self.inner.flush();
            }
        }

        let journal = systemd_journal_logger::JournalLog::new()
            .unwrap()
            .with_syslog_identifier("mortar".to_string());

        mortar::set_debug_logging(config.debug_logging);

        log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).unwrap();
        // Global max must be Debug so mortar debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }

    if let Err(e) = config.ensure_files() {
        log::error!("Failed to create data directory: {}", e);
    }

    // Parse CLI flags
    let launch_mode = {
        let args: Vec<String> = std::env::args().collect();
        if args.iter().any(|a| a == "--briefing") {
            LaunchMode::Briefing
        } else {
            LaunchMode::Normal
        }
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config, launch_mode))
}

async fn run(config: MortarConfig, launch_mode: LaunchMode) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = Mortar::new(config.clone(), launch_mode, tx.clone());
    let mut shell = Shell::new(launch_mode);

    // Resume the previous session from the keyring, or prompt for credentials.
    match keyring::load_session().await {
        Ok(Some(session)) => {
            log::info!("Resuming session for {}", session.user_id);
            let _ = tx.send(Message::SignedIn(Ok(session)));
        }
        other => {
            if let Err(e) = other {
                log::warn!("Keyring unavailable: {}", e);
            }
            let (email, password) = prompt_credentials()?;
            let _ = tx.send(Message::SignIn { email, password });
        }
    }

    while let Some(incoming) = rx.recv().await {
        for command in app.update(incoming) {
            let tx = tx.clone();
            let config = config.clone();
            tokio::spawn(async move {
                let reply = execute(command, &config).await;
                let _ = tx.send(reply);
            });
        }
        shell.after_update(&app, &tx);
        if app.should_exit() {
            break;
        }
    }

    Ok(())
}

/// Run one async effect to completion and hand the outcome back as a
/// message. Effects cannot be cancelled once issued.
async fn execute(command: Command, config: &MortarConfig) -> Message {
    match command {
        Command::SignIn { email, password } => {
            let result = auth::sign_in(&config.auth_url, &email, &password).await;
            if let Ok(ref session) = result {
                if let Err(e) = keyring::store_session(session).await {
                    log::warn!("Could not persist session: {}", e);
                }
            }
            Message::SignedIn(result)
        }
        Command::SignOut { token } => {
            if let Err(e) = keyring::clear_session().await {
                log::warn!("Could not clear persisted session: {}", e);
            }
            Message::SignedOut(auth::sign_out(&config.auth_url, &token).await)
        }
        Command::ChangePassword { token, current, new } => Message::PasswordChanged(
            auth::change_password(&config.auth_url, &token, &current, &new).await,
        ),
        Command::ResetPassword { email } => {
            Message::PasswordResetRequested(auth::reset_password(&config.auth_url, &email).await)
        }
        Command::GenerateBriefing { tasks, users } => Message::BriefingReady(
            assistant::generate_daily_briefing(&config.assistant_url, &tasks, &users).await,
        ),
        Command::AskKnowledgeBase { question, context } => Message::AnswerReady(
            assistant::ask_knowledge_base(&config.assistant_url, &question, &context).await,
        ),
        Command::ImportFile(path) => {
            Message::FileImported(import::import_file(&path).map_err(|e| e.to_string()))
        }
    }
}

/// Headless session driver: prints the dashboard once the roster arrives,
/// then waits for the briefing or winds the session down.
struct Shell {
    mode: LaunchMode,
    summary_printed: bool,
    finished: bool,
}

impl Shell {
    fn new(mode: LaunchMode) -> Self {
        Self {
            mode,
            summary_printed: false,
            finished: false,
        }
    }

    fn after_update(&mut self, app: &Mortar, tx: &mpsc::UnboundedSender<Message>) {
        if self.finished {
            return;
        }

        if let Some(e) = app.sign_in_error() {
            eprintln!("Sign-in failed: {}", e);
            self.finished = true;
            let _ = tx.send(Message::Quit);
            return;
        }

        if app.current_user().is_some() && !self.summary_printed {
            self.summary_printed = true;
            print_summary(app);
            if self.mode == LaunchMode::Normal {
                self.finished = true;
                let _ = tx.send(Message::Quit);
                return;
            }
        }

        if self.mode == LaunchMode::Briefing {
            match app.briefing() {
                RequestState::Ready(report) => {
                    println!("\n=== Daily Briefing ===\n\n{}", report);
                    self.finished = true;
                    let _ = tx.send(Message::Quit);
                }
                RequestState::Failed(e) => {
                    eprintln!("Briefing failed: {}", e);
                    self.finished = true;
                    let _ = tx.send(Message::Quit);
                }
                _ => {}
            }
        }
    }
}

fn print_summary(app: &Mortar) {
    let Some(user) = app.current_user() else {
        return;
    };
    println!("Signed in: {} <{}>", user.name, user.email);
    if user.force_password_change {
        println!("A password change is required before anything else.");
    }
    if user.email.is_empty() {
        println!("No email on file; add one under My Account.");
    }

    let progress = app.daily_progress();
    println!(
        "Today: urgent {}/{}, important {}/{}, general {}/{}",
        progress.urgent.completed,
        progress.urgent.total,
        progress.important.completed,
        progress.important.total,
        progress.general.completed,
        progress.general.total,
    );

    let streak = app.streak();
    println!("Streak: {} day(s)", streak.count);
    println!("Unread messages: {}", app.unread_messages());

    let report = app.report();
    if !report.overdue.is_empty() {
        println!("Overdue tasks: {}", report.overdue.len());
    }
    let pending = app.pending_tasks();
    if !pending.is_empty() {
        println!("Tasks awaiting approval: {}", pending.len());
    }
}

fn prompt_credentials() -> std::io::Result<(String, String)> {
    use std::io::{BufRead, Write};

    let stdin = std::io::stdin();
    let mut line = String::new();

    print!("Email: ");
    std::io::stdout().flush()?;
    stdin.lock().read_line(&mut line)?;
    let email = line.trim().to_string();

    line.clear();
    print!("Password: ");
    std::io::stdout().flush()?;
    stdin.lock().read_line(&mut line)?;
    let password = line.trim().to_string();

    Ok((email, password))
}
