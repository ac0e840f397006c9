//! One-shot command-line client.
//!
//! Runs a single chat, summarize, or translate flow in-process against the configured Ollama
//! backend and prints the reply. Shares all runtime configuration with the HTTP binary.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use lawease::{
    assistant::{AssistantApi, AssistantService},
    config, logging,
    memory::DEFAULT_SESSION,
};

#[derive(Parser)]
#[command(name = "lawease-ask", about = "Ask the LawEase assistant from the terminal")]
struct Cli {
    /// Print the backend attempt record after the reply.
    #[arg(long, global = true)]
    show_attempts: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask a legal question.
    Chat {
        prompt: String,
        /// Document whose text is used as context.
        #[arg(long)]
        document: Option<PathBuf>,
    },
    /// Summarize a PDF or DOCX file.
    Summarize {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "short")]
        style: String,
    },
    /// Translate a piece of text.
    Translate {
        text: String,
        #[arg(long, default_value = "")]
        from: String,
        #[arg(long, default_value = "")]
        to: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    config::init_config();
    logging::init_tracing();
    let cli = Cli::parse();
    let service = AssistantService::from_config(config::get_config());

    let reply = match cli.command {
        Command::Chat { prompt, document } => {
            if let Some(path) = document {
                load_document(&service, &path).await?;
            }
            service.chat(DEFAULT_SESSION, &prompt).await
        }
        Command::Summarize { file, style } => {
            load_document(&service, &file).await?;
            service.summarize(DEFAULT_SESSION, Some(&style)).await
        }
        Command::Translate { text, from, to } => service.translate(&text, &from, &to).await,
    };

    println!("{}", reply.text);
    if cli.show_attempts {
        if let Some(invocation) = &reply.invocation {
            let record = serde_json::to_string_pretty(&invocation.attempts)
                .context("failed to serialize attempt record")?;
            eprintln!("{record}");
        }
    }
    Ok(())
}

async fn load_document(service: &AssistantService, path: &Path) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    match service.upload(DEFAULT_SESSION, filename, &bytes).await {
        Ok(outcome) => {
            tracing::info!(characters = outcome.characters, "Loaded {}", outcome.filename);
            Ok(())
        }
        Err(error) => bail!("{}: {error}", path.display()),
    }
}
