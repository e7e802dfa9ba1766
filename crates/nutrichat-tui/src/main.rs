use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;

use nutrichat_core::config::BACKEND_URL_ENV;
use nutrichat_core::{ChatController, Config, HttpTransport, MenuItem};

mod app;
mod bubble;
mod handler;
mod input;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "nutrichat", version)]
#[command(about = "Ask a fast-food nutrition assistant about calories, sugar, salt and fat")]
struct Cli {
    /// Backend base URL (overrides NUTRICHAT_BACKEND_URL and the config file)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat (default)
    Chat,
    /// Ask a single question and print the answer
    Ask {
        /// Your question
        question: String,
    },
    /// Show whether the backend is up and which models it runs
    Status,
    /// List menu items with their nutrition facts
    Menu {
        /// Only items in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show or change the saved configuration
    Config {
        /// Save this backend URL as the default
        #[arg(long)]
        set_backend_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Chat);

    if matches!(command, Commands::Chat) {
        let log_path = logging::init_file()?;
        tracing::info!(log = %log_path.display(), "logging to file");
    } else {
        logging::init_stderr();
    }

    let flag = cli.backend_url.as_deref();
    match command {
        Commands::Chat => run_chat(&backend_url(flag)).await?,
        Commands::Ask { question } => ask(&backend_url(flag), &question).await?,
        Commands::Status => show_status(&backend_url(flag)).await?,
        Commands::Menu { category } => list_menu(&backend_url(flag), category.as_deref()).await?,
        Commands::Config { set_backend_url } => configure(set_backend_url)?,
    }

    Ok(())
}

/// Resolve the backend URL from the flag, environment and config file.
fn backend_url(flag: Option<&str>) -> String {
    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "could not load config, using defaults");
        Config::new()
    });
    let env_url = std::env::var(BACKEND_URL_ENV).ok();
    config.resolve_backend_url(flag, env_url.as_deref())
}

async fn run_chat(backend_url: &str) -> Result<()> {
    tracing::info!(url = %backend_url, "starting chat");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let mut app = App::new(backend_url, events.sender());
    app.check_backend();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    tracing::info!("chat closed");
    Ok(())
}

async fn ask(backend_url: &str, question: &str) -> Result<()> {
    let mut chat = ChatController::new(HttpTransport::new(backend_url));

    if !chat.send_message(question).await {
        bail!("Question is empty");
    }

    if let Some(answer) = chat.messages().last() {
        println!("{}", "🤖 Asisten".bold().yellow());
        println!("{}", answer.content);
    }

    if !chat.menu_items().is_empty() {
        println!("\n{}", "Menu terkait:".bold().blue());
        print_menu_items(chat.menu_items());
    }

    Ok(())
}

async fn show_status(backend_url: &str) -> Result<()> {
    let transport = HttpTransport::new(backend_url);

    println!("\n{}", "🍔 Nutrition backend".bold().blue());
    println!("{}", "=".repeat(40).dimmed());
    println!("URL:        {}", backend_url.cyan());

    match transport.status().await {
        Ok(status) => {
            let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
            println!("Status:     {}", field(&status.status).green());
            println!("Service:    {}", field(&status.message));
            println!("Model:      {}", field(&status.model));
            println!("Embedding:  {}", field(&status.embedding));
            println!("Token:      {}", field(&status.token_status));
        }
        Err(e) => {
            println!("{}: {}", "Error connecting to backend".red(), e);
            println!("Make sure the backend is running at {}", backend_url.bold());
        }
    }

    Ok(())
}

async fn list_menu(backend_url: &str, category: Option<&str>) -> Result<()> {
    let transport = HttpTransport::new(backend_url);

    let items = match transport.menu(category).await {
        Ok(items) => items,
        Err(e) => {
            println!("{}: {}", "Error fetching menu".red(), e);
            println!("Make sure the backend is running at {}", backend_url.bold());
            return Ok(());
        }
    };

    let heading = match category {
        Some(category) => format!("📋 Menu: {}", category),
        None => "📋 Menu".to_string(),
    };
    println!("\n{}", heading.bold().blue());
    println!("{}", "=".repeat(40).dimmed());

    if items.is_empty() {
        println!("{}", "No menu items found".yellow());
        return Ok(());
    }

    print_menu_items(&items);
    println!("\n{} items", items.len().to_string().bold());

    Ok(())
}

fn print_menu_items(items: &[MenuItem]) {
    for item in items {
        println!(
            "  • {} {}",
            item.name.bold().yellow(),
            format!("({})", item.category).dimmed()
        );
        println!("    {}", item.nutrition_summary());
    }
}

fn configure(set_backend_url: Option<String>) -> Result<()> {
    let path = Config::config_path()?;
    let mut config = Config::load_from(&path)?;

    if let Some(url) = set_backend_url {
        config.backend_url = Some(url.trim().to_string());
        config.save_to(&path)?;
        println!("{} {}", "Saved".green(), path.display());
    }

    let env_url = std::env::var(BACKEND_URL_ENV).ok();
    println!("Config file:  {}", path.display().to_string().dimmed());
    println!(
        "Backend URL:  {}",
        config.resolve_backend_url(None, env_url.as_deref()).cyan()
    );
    if env_url.is_some() {
        println!("              (from {})", BACKEND_URL_ENV);
    }

    Ok(())
}
