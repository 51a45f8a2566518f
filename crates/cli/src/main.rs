use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lumen_core::logging::{LoggingConfig, init_logging};
use lumen_core::Config;
use lumen_core::config::DEFAULT_CONFIG_FILE;
use lumen_providers::{Provider, ProviderFactory};
use lumen_session::{ChatSessionManager, SessionSettings};
use lumen_ui::{App, AppSettings, ERROR_TEXT};
use lumen_voice::{VoiceInput, WhisperEngine, check_availability};
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lumen - a conversational terminal assistant
#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(about = "Streaming Gemini chat in the terminal, with optional voice dictation", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to lumen.toml (default: ./lumen.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the interactive chat (default)
    Chat,
    /// Send one prompt and stream the reply to stdout
    Ask {
        #[arg(required = true, value_name = "PROMPT")]
        prompt: Vec<String>,
    },
    /// Write an example lumen.toml
    Init,
    /// Show provider, credential and voice status
    Status,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Init => cmd_init(&config_path),
        Commands::Status => cmd_status(&load_config(&config_path)?, &config_path, cli.verbose),
        Commands::Ask { prompt } => {
            let config = load_config(&config_path)?;
            let _guard = init_logging(Some(logging_config(&config, cli.verbose, true)))?;
            runtime()?.block_on(cmd_ask(&config, &prompt.join(" ")))
        }
        Commands::Chat => {
            let config = load_config(&config_path)?;
            let _guard = init_logging(Some(logging_config(&config, cli.verbose, false)))?;
            runtime()?.block_on(cmd_chat(&config))
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")
}

/// Load the config file, or defaults when it does not exist
fn load_config(path: &Path) -> Result<Config> {
    Config::load_or_default(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Logging for a command. The TUI owns the terminal, so chat logs to file only.
fn logging_config(config: &Config, verbose: bool, stderr: bool) -> LoggingConfig {
    let mut logging = LoggingConfig::from(config.logging.clone());
    if verbose {
        logging = logging.with_level("debug");
    }
    if !stderr {
        logging = logging.without_stderr();
    }
    logging
}

/// Build the provider, or the diagnostic shown when login is unavailable
fn connect(config: &Config) -> std::result::Result<Arc<dyn Provider>, String> {
    if config.provider.requires_api_key()
        && let Err(e) = config.api_key()
    {
        return Err(e.to_string());
    }
    ProviderFactory::create_from_config(config).map_err(|e| e.to_string())
}

fn voice_input(config: &Config) -> VoiceInput {
    if !config.voice.enabled {
        return VoiceInput::disabled();
    }

    let engine = WhisperEngine::from_config(&config.voice);
    if !engine.availability().available {
        tracing::info!(detail = %engine.availability().detail, "Voice input unavailable");
    }
    VoiceInput::new(Box::new(engine))
}

/// Run the interactive chat
async fn cmd_chat(config: &Config) -> Result<()> {
    let mut app = App::new(AppSettings::from_config(config), connect(config), voice_input(config));
    lumen_ui::run(&mut app).await.context("Terminal error")
}

/// Stream one reply to stdout
async fn cmd_ask(config: &Config, prompt: &str) -> Result<()> {
    let provider = connect(config).map_err(anyhow::Error::msg)?;
    let mut manager = ChatSessionManager::new(provider, SessionSettings::from_config(config));
    let mut reply = manager.send_and_stream(prompt)?;

    let mut stdout = std::io::stdout();
    while let Some(fragment) = reply.next().await {
        match fragment {
            Ok(text) => {
                stdout.write_all(text.as_bytes())?;
                stdout.flush()?;
            }
            Err(e) => {
                tracing::error!(error = %e, "Reply failed");
                writeln!(stdout)?;
                anyhow::bail!(ERROR_TEXT);
            }
        }
    }
    writeln!(stdout)?;
    Ok(())
}

/// Write the example config unless one already exists
fn cmd_init(path: &Path) -> Result<()> {
    if path.exists() {
        println!("{} Config already exists at {}", "Info:".yellow().bold(), path.display());
        return Ok(());
    }

    std::fs::write(path, Config::example()).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} Created config at {}", "Success:".green().bold(), path.display());
    Ok(())
}

/// Show current status
fn cmd_status(config: &Config, config_path: &Path, verbose: bool) -> Result<()> {
    println!("{}", "Lumen Status".green().bold().underline());
    println!();

    let source = if config_path.exists() { config_path.display().to_string() } else { "defaults".to_string() };
    println!("{} Configuration", "Info:".blue().bold());
    println!("  Source: {}", source.cyan());
    println!("  Provider: {}", config.provider.name().cyan());
    println!("  Model: {}", config.provider.model().cyan());

    let credential = if !config.provider.requires_api_key() {
        "not required".green().to_string()
    } else if config.has_credential() {
        "present".green().to_string()
    } else {
        "missing".red().to_string()
    };
    println!("  Credential: {}", credential);

    println!();
    println!("{} Voice input", "Info:".blue().bold());
    if config.voice.enabled {
        let model_path = config.voice.resolved_model_path();
        let availability = check_availability(&model_path);
        let state = if availability.available { "available".green().to_string() } else { "unavailable".red().to_string() };
        println!("  Status: {} ({})", state, availability.detail);
        if verbose {
            println!("  Model: {}", model_path.display());
            println!("  Language: {}", config.voice.language);
        }
    } else {
        println!("  Status: {}", "disabled".yellow());
    }

    if verbose {
        println!();
        println!("{} Logging", "Info:".blue().bold());
        println!("  Level: {}", config.logging.level);
        println!("  Directory: {}", LoggingConfig::log_dir().display());
    }

    Ok(())
}
