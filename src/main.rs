use std::io::Read;
use std::sync::Arc;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use corpspeak_core::ai::reply_or_fallback;
use corpspeak_core::config::API_KEY_ENV;
use corpspeak_core::{
    format_message, ChatMessage, CompletionSettings, Config, ContentBlock, OpenAIClient, ThemeMode,
};

mod app;
mod handler;
mod theme;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "corpspeak")]
#[command(about = "Translate layman speak into corporate speak with an LLM")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Model to use (defaults to the config file, then gpt-4o-mini)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Color theme for the chat screen
    #[arg(long, value_enum, global = true)]
    theme: Option<ThemeArg>,

    /// OpenAI API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Send a single message and print the formatted reply
    Ask {
        /// What you want to say
        text: Vec<String>,
    },
    /// Format text from stdin the way replies are displayed
    Format {
        /// Print the blocks as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// List known models
    Models,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for ThemeMode {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => ThemeMode::Light,
            ThemeArg::Dark => ThemeMode::Dark,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();
    let command = cli.command.take().unwrap_or(Commands::Chat);

    let interactive = matches!(command, Commands::Chat);
    init_logging(cli.debug, interactive)?;

    let config = Config::load().unwrap_or_else(|e| {
        warn!("ignoring unreadable config: {:#}", e);
        Config::new()
    });

    let mut settings = config.completion_settings();
    if let Some(model) = &cli.model {
        settings.model = model.clone();
    }

    // CLI flag and env var first, then the config file
    let api_key = cli
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| config.resolve_api_key());
    let base_url = config
        .base_url
        .as_deref()
        .unwrap_or(corpspeak_core::ai::openai::DEFAULT_BASE_URL);
    let client = api_key.map(|key| OpenAIClient::with_base_url(&key, base_url));

    match command {
        Commands::Chat => {
            let theme = cli.theme.map(ThemeMode::from).unwrap_or_else(|| config.theme());
            run_tui(client, settings, theme).await?
        }
        Commands::Ask { text } => ask_once(client, &settings, &text.join(" ")).await?,
        Commands::Format { json } => format_stdin(json)?,
        Commands::Models => list_models(&settings),
    }

    Ok(())
}

/// The TUI owns the terminal, so it logs to a file; other commands use stderr.
fn init_logging(debug: bool, interactive: bool) -> Result<()> {
    let default_filter = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if interactive {
        let log_dir = Config::config_dir()?;
        std::fs::create_dir_all(&log_dir)?;
        let log_path = log_dir.join("corpspeak.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("opening log file {}", log_path.display()))?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
            .init();
    } else {
        // Quiet by default outside the TUI
        let filter = if debug || std::env::var("RUST_LOG").is_ok() {
            filter
        } else {
            EnvFilter::new("warn")
        };
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}

async fn run_tui(
    client: Option<OpenAIClient>,
    settings: CompletionSettings,
    theme: ThemeMode,
) -> Result<()> {
    info!(model = %settings.model, has_key = client.is_some(), "starting chat");

    let mut app = App::new(client, settings, theme);
    app.persist_theme = true;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new(tui::TICK_RATE);

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event),
                None => break,
            }

            app.poll_query_task().await;
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    info!(messages = app.conversation.len(), "chat closed");
    result
}

fn require_client(client: Option<OpenAIClient>) -> Result<OpenAIClient> {
    client.ok_or_else(|| {
        anyhow!(
            "OpenAI API key not configured. Set {} or pass --api-key",
            API_KEY_ENV
        )
    })
}

async fn ask_once(client: Option<OpenAIClient>, settings: &CompletionSettings, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        println!("{}", "Nothing to translate.".yellow());
        return Ok(());
    }

    let client = require_client(client)?;

    println!("🤖 Asking {}...\n", settings.model.bold().magenta());
    let history = [ChatMessage::user(text)];
    let reply = reply_or_fallback(client.chat(settings, &history).await);
    print_blocks(&format_message(&reply));

    Ok(())
}

fn format_stdin(json: bool) -> Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("reading stdin")?;

    let blocks = format_message(&input);
    if json {
        println!("{}", serde_json::to_string_pretty(&blocks)?);
    } else {
        print_blocks(&blocks);
    }
    Ok(())
}

fn print_blocks(blocks: &[ContentBlock]) {
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            println!();
        }
        match block {
            ContentBlock::Paragraph(text) => println!("{}", text),
            ContentBlock::UnorderedList(items) => {
                for item in items {
                    println!("  {} {}", "•".blue(), item);
                }
            }
            ContentBlock::OrderedList(items) => {
                for (n, item) in items.iter().enumerate() {
                    println!("  {} {}", format!("{}.", n + 1).blue(), item);
                }
            }
        }
    }
}

fn list_models(settings: &CompletionSettings) {
    println!("\n{}", "🤖 Available OpenAI Models".bold().blue());
    println!("{}", "=".repeat(30).dimmed());

    for model in OpenAIClient::list_models() {
        if model == settings.model {
            println!("  • {} {}", model.green(), "(selected)".dimmed());
        } else {
            println!("  • {}", model);
        }
    }
}
