mod display;
mod session;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use fineforce_ai::image::mime_for_path;
use fineforce_ai::prompt::SUGGESTED_PROMPTS;
use fineforce_ai::{AiError, ChatSession, GeminiClient, Persona, ProcessedImage};
use fineforce_core::analytics::ForecastWindow;
use fineforce_core::{
    PageWindow, User, ViolationFilter, ViolationStatus, ViolationType, type_distribution,
    validate_password,
};
use fineforce_notify::{DEFAULT_PAYMENT_BASE, HttpNotifier, LogNotifier, Notifier};
use fineforce_store::{AuthProvider, SignUp, SupabaseClient, SupabaseConfig};
use fineforce_workflow::{Evidence, UploadWorkflow, ViolationBoard, redeem_payment_code};
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "fineforce", version)]
#[command(about = "FineForce traffic violation console", long_about = None)]
struct Cli {
    /// Backend project URL
    #[arg(long, env = "SUPABASE_URL", global = true)]
    supabase_url: Option<String>,

    /// Backend anonymous (public) API key
    #[arg(long, env = "SUPABASE_ANON_KEY", global = true, hide_env_values = true)]
    supabase_anon_key: Option<String>,

    /// Gemini API key; AI commands fail without it
    #[arg(long, env = "GEMINI_API_KEY", global = true, hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Endpoint that delivers violation notices; notices are only logged when unset
    #[arg(long, env = "FINEFORCE_NOTIFY_URL", global = true)]
    notify_url: Option<String>,

    /// Base of the payment link encoded in each notice's QR code
    #[arg(long, env = "FINEFORCE_PAYMENT_URL", global = true, default_value = DEFAULT_PAYMENT_BASE)]
    payment_url: String,

    /// Where the signed-in session is kept (default: ~/.fineforce/session.json)
    #[arg(long, env = "FINEFORCE_SESSION", global = true)]
    session_file: Option<PathBuf>,

    /// Log requests and state changes to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an officer account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        officer_id: String,
        #[arg(long, env = "FINEFORCE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "FINEFORCE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in officer
    Whoami,
    /// List, inspect and update violation records
    Violations {
        #[command(subcommand)]
        command: ViolationCommands,
    },
    /// Analyze an evidence image, save the violation and notify the owner
    Issue {
        /// Evidence image file
        image: PathBuf,
        /// Violator's email address for the notice
        #[arg(long)]
        email: String,
        /// Override the detected violation type (resets the fine)
        #[arg(long = "type")]
        violation_type: Option<ViolationType>,
        /// Override the fine in INR
        #[arg(long)]
        fine: Option<u32>,
        #[arg(long)]
        vehicle: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Mark a violation paid from a scanned payment-code payload
    Redeem {
        /// Decoded QR payload, e.g. https://fineforce.demo/pay?id=...
        payload: String,
    },
    /// Chat with the AI assistant
    Chat {
        /// dashboard | command-center
        #[arg(long, default_value = "dashboard")]
        persona: Persona,
    },
    /// Dashboard metrics for today
    Stats,
    /// Known and predicted violation hotspots
    Hotspots {
        /// next-4-hours | tomorrow-am | this-weekend
        #[arg(long)]
        window: Option<ForecastWindow>,
    },
    /// Officers and their patrol status
    Officers,
    /// Officer safety alerts, active first
    Alerts,
}

#[derive(Subcommand)]
enum ViolationCommands {
    /// List violations, newest first
    List {
        /// Match vehicle number, id or location
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<ViolationStatus>,
        #[arg(long = "type")]
        violation_type: Option<ViolationType>,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one violation in full
    Show { id: String },
    /// Change a violation's status
    SetStatus { id: String, status: ViolationStatus },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
    tracing::debug!("fineforce v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Signup {
            name,
            email,
            officer_id,
            password,
        } => {
            validate_password(password)?;
            let signup = SignUp {
                name: name.clone(),
                email: email.clone(),
                officer_id: officer_id.clone(),
                password: password.clone(),
            };
            cmd_signup(&cli, &signup).await
        }
        Commands::Login { email, password } => cmd_login(&cli, email, password).await,
        Commands::Logout => cmd_logout(&cli).await,
        Commands::Whoami => {
            let (_, user) = signed_in(&cli).await?;
            print_user(&user);
            Ok(())
        }
        Commands::Violations { command } => cmd_violations(&cli, command).await,
        Commands::Issue {
            image,
            email,
            violation_type,
            fine,
            vehicle,
            location,
            description,
        } => {
            let overrides = Overrides {
                violation_type: *violation_type,
                fine: *fine,
                vehicle: vehicle.clone(),
                location: location.clone(),
                description: description.clone(),
            };
            cmd_issue(&cli, image, email, overrides).await
        }
        Commands::Redeem { payload } => cmd_redeem(&cli, payload).await,
        Commands::Chat { persona } => cmd_chat(&cli, *persona).await,
        Commands::Stats => cmd_stats(&cli).await,
        Commands::Hotspots { window } => {
            display::print_hotspots(*window);
            Ok(())
        }
        Commands::Officers => {
            display::print_officers();
            Ok(())
        }
        Commands::Alerts => {
            display::print_alerts();
            Ok(())
        }
    }
}

// ── Backend & session ──

fn session_path(cli: &Cli) -> PathBuf {
    cli.session_file.clone().unwrap_or_else(session::default_path)
}

/// Client with any saved session restored.
fn backend(cli: &Cli) -> anyhow::Result<Arc<SupabaseClient>> {
    let url = cli
        .supabase_url
        .clone()
        .context("SUPABASE_URL is not set")?;
    let key = cli
        .supabase_anon_key
        .clone()
        .context("SUPABASE_ANON_KEY is not set")?;
    let client = SupabaseClient::new(SupabaseConfig::new(url, key));
    client.restore_session(session::load(&session_path(cli))?);
    Ok(Arc::new(client))
}

fn remember(cli: &Cli, client: &SupabaseClient) -> anyhow::Result<()> {
    let path = session_path(cli);
    match client.session() {
        Some(s) => session::save(&path, &s),
        None => session::clear(&path),
    }
}

async fn signed_in(cli: &Cli) -> anyhow::Result<(Arc<SupabaseClient>, User)> {
    let client = backend(cli)?;
    let user = client
        .current_user()
        .await
        .context("checking the saved session")?;
    // Keeps a refreshed token, or drops one the server no longer accepts.
    remember(cli, &client)?;
    let Some(user) = user else {
        bail!("not signed in; run `fineforce login` first");
    };
    Ok((client, user))
}

async fn loaded_board(cli: &Cli) -> anyhow::Result<(Arc<SupabaseClient>, ViolationBoard)> {
    let (client, user) = signed_in(cli).await?;
    let mut board = ViolationBoard::new(user, client.clone());
    board.refresh().await.context(
        "Failed to connect to the database. Please check the Supabase configuration and network connection.",
    )?;
    Ok((client, board))
}

fn print_user(user: &User) {
    println!("{} ({})", user.name, user.email);
    println!("  {:<12} {}", "Officer ID", user.officer_id);
    println!("  {:<12} {}", "User ID", user.id);
}

// ── Auth ──

async fn cmd_signup(cli: &Cli, signup: &SignUp) -> anyhow::Result<()> {
    let client = backend(cli)?;
    let user = client.sign_up(signup).await.context(
        "Could not create account. The email or officer ID might already be in use.",
    )?;
    remember(cli, &client)?;
    if client.session().is_some() {
        println!("Account created; signed in as {}.", user.name);
    } else {
        println!(
            "Account created for {}. Confirm the email, then run `fineforce login`.",
            user.email
        );
    }
    Ok(())
}

async fn cmd_login(cli: &Cli, email: &str, password: &str) -> anyhow::Result<()> {
    let client = backend(cli)?;
    let user = client.sign_in(email, password).await?;
    remember(cli, &client)?;
    println!("Signed in.");
    print_user(&user);
    Ok(())
}

async fn cmd_logout(cli: &Cli) -> anyhow::Result<()> {
    let client = backend(cli)?;
    let result = client.sign_out().await;
    session::clear(&session_path(cli))?;
    result?;
    println!("Signed out.");
    Ok(())
}

// ── Violations ──

async fn cmd_violations(cli: &Cli, command: &ViolationCommands) -> anyhow::Result<()> {
    let (_, mut board) = loaded_board(cli).await?;
    match command {
        ViolationCommands::List {
            search,
            status,
            violation_type,
            page,
        } => {
            let filter = ViolationFilter {
                search: search.clone(),
                status: *status,
                violation_type: *violation_type,
            };
            let filtered = board.filtered(&filter);
            let window = PageWindow::new(&filtered, page.saturating_sub(1));
            display::print_violation_table(&window);
        }
        ViolationCommands::Show { id } => match board.get(id) {
            Some(v) => display::print_violation_card(v),
            None => bail!("violation {id} not found"),
        },
        ViolationCommands::SetStatus { id, status } => {
            let updated = board.update_status(id, *status).await.context(
                "Failed to update violation. Please check the Supabase configuration and network connection.",
            )?;
            println!("Violation {} is now {}.", updated.id, updated.status);
        }
    }
    Ok(())
}

struct Overrides {
    violation_type: Option<ViolationType>,
    fine: Option<u32>,
    vehicle: Option<String>,
    location: Option<String>,
    description: Option<String>,
}

async fn cmd_issue(
    cli: &Cli,
    image: &Path,
    email: &str,
    overrides: Overrides,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(image).with_context(|| format!("reading {}", image.display()))?;
    let content_type = mime_for_path(image);
    let processed = ProcessedImage::from_bytes(&bytes, content_type);
    let evidence = Evidence {
        file_name: image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "evidence.jpg".to_string()),
        content_type: content_type.to_string(),
        bytes,
    };

    let (client, mut board) = loaded_board(cli).await?;
    let analyzer = Arc::new(GeminiClient::new(cli.gemini_api_key.clone()));
    let notifier: Arc<dyn Notifier> = match &cli.notify_url {
        Some(url) => Arc::new(HttpNotifier::new(url.clone())),
        None => Arc::new(LogNotifier),
    };
    let mut workflow =
        UploadWorkflow::new(client, analyzer, notifier).with_payment_base(cli.payment_url.clone());

    workflow.select_evidence(evidence, processed)?;
    eprintln!("Analyzing evidence...");
    workflow.analyze().await?;

    if let Some(t) = overrides.violation_type {
        workflow.set_violation_type(t)?;
    }
    {
        let review = workflow.review_mut()?;
        if let Some(fine) = overrides.fine {
            review.fine = fine;
        }
        if let Some(vehicle) = overrides.vehicle {
            review.vehicle_number = vehicle;
        }
        if let Some(location) = overrides.location {
            review.location = location;
        }
        if let Some(description) = overrides.description {
            review.description = description;
        }
    }
    workflow.set_email(email);

    if let Some(analysis) = workflow.analysis() {
        let advisory = workflow.low_confidence_advisory();
        display::print_review(analysis, workflow.email(), advisory.as_deref());
    }
    if !workflow.can_save() && workflow.analysis().is_some_and(|a| a.violation_type.is_unclear()) {
        bail!("Cannot save, violation type is not specified. Pass --type to choose one.");
    }

    eprintln!("Saving violation record...");
    let saved = workflow.confirm_save(&mut board).await?;
    if let Some(toast) = workflow.toast_at(chrono::Utc::now()) {
        println!("{}", toast.message);
    }
    display::print_violation_card(&saved);
    Ok(())
}

async fn cmd_redeem(cli: &Cli, payload: &str) -> anyhow::Result<()> {
    let (_, mut board) = loaded_board(cli).await?;
    let id = redeem_payment_code(&mut board, payload).await?;
    println!("Success! Violation {id} has been marked as paid.");
    Ok(())
}

async fn cmd_stats(cli: &Cli) -> anyhow::Result<()> {
    let (_, board) = loaded_board(cli).await?;
    let today = chrono::Local::now().date_naive();
    let distribution = type_distribution(board.violations());
    display::print_metrics(&board.metrics(today), &distribution);
    Ok(())
}

// ── Chat ──

async fn cmd_chat(cli: &Cli, persona: Persona) -> anyhow::Result<()> {
    let client = GeminiClient::new(cli.gemini_api_key.clone());
    let mut session = ChatSession::new(client, persona);

    println!("{} (type `exit` to leave)", persona.title());
    if let Some(greeting) = persona.greeting() {
        println!("{greeting}");
    }
    if persona == Persona::CommandCenter {
        println!();
        println!("Try asking:");
        for prompt in SUGGESTED_PROMPTS {
            println!("  - {prompt}");
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if matches!(line, "exit" | "quit") {
            break;
        }

        let stream = match session.send_stream(line).await {
            Ok(stream) => stream,
            Err(AiError::EmptyMessage) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                println!("{}", e.chat_reply());
                continue;
            }
        };
        let mut stream = std::pin::pin!(stream);
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(text) => {
                    print!("{text}");
                    std::io::stdout().flush()?;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "chat stream failed");
                    println!();
                    println!("{}", e.chat_reply());
                    break;
                }
            }
        }
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_issue_overrides() {
        let cli = Cli::try_parse_from([
            "fineforce",
            "issue",
            "cam/shot 1.jpg",
            "--email",
            "owner@example.in",
            "--type",
            "no-helmet-driver",
            "--fine",
            "900",
        ])
        .unwrap();
        let Commands::Issue {
            violation_type,
            fine,
            ..
        } = cli.command
        else {
            panic!("expected issue");
        };
        assert_eq!(violation_type, Some(ViolationType::NoHelmetDriver));
        assert_eq!(fine, Some(900));
    }

    #[test]
    fn cli_parses_list_filters() {
        let cli = Cli::try_parse_from([
            "fineforce",
            "violations",
            "list",
            "--status",
            "paid",
            "--page",
            "2",
        ])
        .unwrap();
        let Commands::Violations {
            command: ViolationCommands::List { status, page, .. },
        } = cli.command
        else {
            panic!("expected violations list");
        };
        assert_eq!(status, Some(ViolationStatus::Paid));
        assert_eq!(page, 2);
    }

    #[test]
    fn cli_parses_chat_persona_and_window() {
        let cli =
            Cli::try_parse_from(["fineforce", "chat", "--persona", "command-center"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Chat {
                persona: Persona::CommandCenter
            }
        ));
        let cli = Cli::try_parse_from(["fineforce", "hotspots", "--window", "weekend"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Hotspots {
                window: Some(ForecastWindow::ThisWeekend)
            }
        ));
    }
}
