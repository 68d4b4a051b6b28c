use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use chatrelay::domain::DEFAULT_MODEL;
use chatrelay::{Commands, Container, ContainerConfig, Router};

#[derive(Parser)]
#[command(name = "chatrelay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        env = "CHATRELAY_DATA_DIR",
        default_value = "~/.chatrelay"
    )]
    data_dir: String,

    #[arg(short, long, global = true, env = "CHAT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Instructions prepended to every prompt
    #[arg(long, global = true, env = "CHAT_SYSTEM_PROMPT")]
    system_prompt: Option<String>,

    /// Relay proxy base URL; switches the client to proxied mode
    #[arg(long, global = true, env = "CHAT_API_URL")]
    proxy_url: Option<String>,

    /// Ollama base URL for direct mode
    #[arg(long, global = true, env = "OLLAMA_API_URL")]
    ollama_url: Option<String>,

    /// Answer with canned replies instead of calling a model
    #[arg(long, global = true)]
    mock_inference: bool,

    #[arg(long, global = true)]
    memory_storage: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = expand_tilde(&cli.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    init_logging(&cli, &data_dir)?;

    let container = Container::new(ContainerConfig {
        data_dir,
        model: cli.model,
        system_prompt: cli.system_prompt,
        proxy_url: cli.proxy_url,
        ollama_url: cli.ollama_url,
        mock_inference: cli.mock_inference,
        memory_storage: cli.memory_storage,
    });

    let router = Router::new(&container);
    let output = router.route(cli.command).await?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}

fn init_logging(cli: &Cli, data_dir: &str) -> Result<()> {
    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match cli.command {
        // The TUI owns the terminal; logs go to a file instead.
        Commands::Chat => {
            let path = PathBuf::from(data_dir).join("chatrelay.log");
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        _ => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
    }

    Ok(())
}

fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            if path == "~" {
                return home.to_string_lossy().to_string();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
