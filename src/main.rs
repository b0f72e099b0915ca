//! Essay Grader CLI - serve the grading API or preview rubric prompts.

use clap::{Parser, Subcommand};
use essay_grader::api::{create_router, AppState};
use essay_grader::config::{Config, LogVerbosity};
use essay_grader::prompt::{route, Assessment};
use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "essay-grader")]
#[command(about = "Grade IB essays against subject rubrics using a hosted language model")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Log verbosity level
        #[arg(short, long, value_enum)]
        log_level: Option<LogLevel>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show current configuration (secrets masked)
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Print the prompt that would be sent for a submission
    Prompt {
        /// Subject, e.g. "History"
        #[arg(short, long)]
        subject: String,

        /// Paper, e.g. "Paper 2"
        #[arg(short, long)]
        paper: String,

        /// Essay file (reads stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum LogLevel {
    Minimal,
    Compact,
    Verbose,
}

impl From<LogLevel> for LogVerbosity {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Minimal => LogVerbosity::Minimal,
            LogLevel::Compact => LogVerbosity::Compact,
            LogLevel::Verbose => LogVerbosity::Verbose,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve {
            port,
            log_level,
            config,
        }) => {
            run_server(port, log_level, config).await?;
        }
        Some(Commands::Config { path }) => {
            show_config(path)?;
        }
        Some(Commands::Prompt {
            subject,
            paper,
            file,
        }) => {
            print_prompt(&subject, &paper, file)?;
        }
        None => {
            // Default: run server
            run_server(None, None, None).await?;
        }
    }

    Ok(())
}

async fn run_server(
    port_override: Option<u16>,
    log_level: Option<LogLevel>,
    config_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    // Load config
    let config = match config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let mut config = config.with_env_overrides();
    if let Some(port) = port_override {
        config.server.port = port;
    }
    if let Some(level) = log_level {
        config.app.log_verbosity = level.into();
    }
    config.validate()?;

    if config.price_id().is_none() {
        tracing::warn!("STRIPE_PRICE_ID not set; checkout is disabled");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let verbosity = config.app.log_verbosity;
    let model = config.grading.model.clone();

    // Build router
    let state = AppState::from_config(config)?;
    let app = create_router(state);

    // Print startup message
    match verbosity {
        LogVerbosity::Minimal => {
            println!("essay-grader:{}", addr.port());
        }
        LogVerbosity::Compact => {
            println!("→ Essay Grader starting on http://{}", addr);
            println!("→ Grading model: {}", model);
        }
        LogVerbosity::Verbose => {
            println!("────────────────────────────────────────");
            println!("Essay Grader v{}", env!("CARGO_PKG_VERSION"));
            println!("────────────────────────────────────────");
            println!("Form:       http://{}/", addr);
            println!("Grade:      http://{}/grade", addr);
            println!("Checkout:   http://{}/create-checkout-session", addr);
            println!("Health:     http://{}/health", addr);
            println!("────────────────────────────────────────");
            println!("Model:      {}", model);
            println!("Rubrics:    {}", rubric_list());
            println!("Log Level:  {:?}", verbosity);
            println!("────────────────────────────────────────");
        }
    }

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    println!("\nServer stopped.");
    Ok(())
}

fn rubric_list() -> String {
    Assessment::ALL
        .iter()
        .map(Assessment::label)
        .collect::<Vec<_>>()
        .join(", ")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

fn show_config(show_path: bool) -> anyhow::Result<()> {
    if show_path {
        println!("{}", Config::default_path().display());
        return Ok(());
    }

    let config = Config::load()?.with_env_overrides();
    println!("{}", toml::to_string_pretty(&config.redacted())?);
    Ok(())
}

fn print_prompt(subject: &str, paper: &str, file: Option<PathBuf>) -> anyhow::Result<()> {
    let essay = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut essay = String::new();
            std::io::stdin().read_to_string(&mut essay)?;
            essay
        }
    };

    eprintln!("Rubric: {}", Assessment::classify(subject, paper));
    print!("{}", route(subject, paper, &essay));
    Ok(())
}
