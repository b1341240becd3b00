//! # dbchat: Ask a database in natural language
//!
//! This is the main entry point for the `dbchat` command-line interface.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dbchat::{
    auto_execute_adapter, providers::factory::create_provider, ChatDbExecutor, Locale,
    SqlAction,
};
use dbchat_cli::{commands, config::get_config};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(long, global = true, env = "DBCHAT_CONFIG")]
    config: Option<String>,
    /// Overrides the configured prompt language ("en" or "zh")
    #[arg(long, global = true)]
    locale: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the messages that would be sent to the model
    Compose(QuestionArgs),
    /// Parse a raw model reply from a file or stdin
    Parse(ParseArgs),
    /// Compose, call the configured model, and parse its reply
    Ask(QuestionArgs),
}

#[derive(Parser, Debug)]
struct QuestionArgs {
    /// The natural-language question
    #[arg(long, short)]
    question: String,
    /// A file holding the schema / DDL text for the prompt
    #[arg(long)]
    schema_file: Option<PathBuf>,
    /// A JSON file with prior turns: [{"speaker": "human", "text": "..."}]
    #[arg(long)]
    history_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ParseArgs {
    /// The reply file; reads stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = get_config(cli.config.as_deref())?;
    if let Some(locale) = cli.locale {
        locale
            .parse::<Locale>()
            .with_context(|| format!("Invalid --locale '{locale}'"))?;
        config.language = locale;
    }
    let settings = config.scene_settings()?;
    info!("Using locale '{}'.", settings.locale);
    let adapter = auto_execute_adapter(&settings)?;

    match cli.command {
        Commands::Compose(args) => {
            let request = load_request(&config, &args)?;
            println!("{}", commands::compose(&adapter, &request)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Parse(args) => {
            let raw_reply = match &args.input {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read reply file '{}'", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            match commands::parse(&adapter, &raw_reply) {
                Ok(action) => print_action(&action),
                Err(failure) => {
                    eprintln!("Parse failed: {failure}");
                    Ok(ExitCode::from(2))
                }
            }
        }
        Commands::Ask(args) => {
            let request = load_request(&config, &args)?;
            let provider = create_provider(&config.ai)?;
            let executor = ChatDbExecutor::new(Arc::new(adapter), Arc::from(provider));
            let action = commands::ask(&executor, &request).await?;
            print_action(&action)
        }
    }
}

fn load_request(
    config: &dbchat_cli::config::AppConfig,
    args: &QuestionArgs,
) -> Result<dbchat::ComposeRequest> {
    let schema_context = match &args.schema_file {
        Some(path) => commands::load_schema(path)?,
        None => String::new(),
    };
    let history = match &args.history_file {
        Some(path) => commands::load_history(path)?,
        None => Vec::new(),
    };
    Ok(commands::build_request(
        config,
        &args.question,
        schema_context,
        history,
    ))
}

fn print_action(action: &SqlAction) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(action)?);
    Ok(ExitCode::SUCCESS)
}
