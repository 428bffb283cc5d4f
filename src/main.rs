//! Booksum CLI - structured summaries of books and long-form text
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use anyhow::Context;
use booksum::{prompt, ui, Config, DownloadArtifact, SessionState, SummaryAgent};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "booksum")]
#[command(author, version, about = "Structured summaries of books and long-form text", long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive summarisation session
    Session,
    /// Summarise a file, or stdin when no file is given
    Summarise {
        /// Text file to summarise
        file: Option<PathBuf>,
        /// Print the validated summary as JSON
        #[arg(long)]
        json: bool,
        /// Save the title and summary as a JSON report
        #[arg(long)]
        save: bool,
    },
    /// Print the system prompt with the embedded response schema
    Schema,
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Summarise { file, json, save }) => {
            let text = read_input(file)?;
            let config = Config::load()?;
            let agent = SummaryAgent::from_config(&config)?;
            let mut session = SessionState::new();

            let Some(summary) = agent.submit(&mut session, &text).await? else {
                anyhow::bail!("no text to summarise");
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", ui::render_summary(&summary));
            }

            if save {
                let artifact = DownloadArtifact::from_summary(&summary)?;
                let path = artifact.write_to(&config.export.dir)?;
                eprintln!("📥 Saved {}", path.display());
            }
        }
        Some(Commands::Schema) => {
            let config = Config::load()?;
            println!("{}", prompt::system_prompt(&config.agent.persona));
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "booksum", &mut std::io::stdout());
        }
        Some(Commands::Session) | None => {
            let config = Config::load()?;
            let agent = SummaryAgent::from_config(&config)?;
            ui::run(&agent, &config).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr so `--json` output stays clean
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("booksum=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Read the text to summarise from a file or piped stdin
fn read_input(file: Option<PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display())),
        None if atty::is(atty::Stream::Stdin) => {
            anyhow::bail!("no input: pass a file or pipe text on stdin")
        }
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
