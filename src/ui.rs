//! Terminal presentation: result card, history view and the interactive session.

use crate::agent::SummaryAgent;
use crate::config::Config;
use crate::export::{DownloadArtifact, ExportError};
use crate::session::{ConversationTurn, Role, SessionState};
use crate::summary::BookSummary;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Select};
use std::path::{Path, PathBuf};

const SOURCE_PREVIEW: usize = 80;
const SUMMARY_PREVIEW: usize = 100;

/// Render a summary as a result card
pub fn render_summary(summary: &BookSummary) -> String {
    let mut out = format!("{}\n\n", format!("📖 {}", summary.title).bold().cyan());
    out.push_str(&format!("{}\n\n", summary.summary));

    if !summary.key_points.is_empty() {
        out.push_str(&format!("{}\n", "📌 Key Points:".bold()));
        for point in &summary.key_points {
            out.push_str(&format!("  • {}\n", point));
        }
        out.push('\n');
    }

    if !summary.themes.is_empty() {
        out.push_str(&format!("{}\n", "🎭 Themes:".bold()));
        out.push_str(&format!("  {}\n\n", summary.themes.join(", ")));
    }

    let details: Vec<String> = [
        summary.author.as_ref().map(|a| format!("Author: {}", a)),
        summary.genre.as_ref().map(|g| format!("Genre: {}", g)),
        summary.word_count.map(|n| format!("Words: {}", n)),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !details.is_empty() {
        out.push_str(&format!("{}\n", details.join("  |  ").dimmed()));
    }

    out
}

/// Render the transcript as short previews
pub fn render_history(transcript: &[ConversationTurn]) -> String {
    transcript
        .iter()
        .map(|turn| {
            let time = turn.created_at.format("%H:%M");
            match turn.role {
                Role::Human => format!(
                    "[{}] {} {}\n",
                    time,
                    "Source:".bold(),
                    turn.preview(SOURCE_PREVIEW).italic()
                ),
                Role::Assistant => format!(
                    "[{}] {} {}\n",
                    time,
                    "Summary:".bold().green(),
                    turn.preview(SUMMARY_PREVIEW)
                ),
            }
        })
        .collect()
}

/// Save the session's last summary as a JSON report in `dir`.
///
/// Returns `Ok(None)` when there is nothing to save yet.
pub fn save_last_summary(
    session: &SessionState,
    dir: &Path,
) -> Result<Option<PathBuf>, ExportError> {
    let Some(summary) = session.last_summary() else {
        return Ok(None);
    };

    let artifact = DownloadArtifact::from_summary(summary)?;
    artifact.write_to(dir).map(Some)
}

fn print_error(error: impl std::fmt::Display) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}

/// Interactive session: paste text, read the card, repeat
pub async fn run(agent: &SummaryAgent, config: &Config) -> anyhow::Result<()> {
    let mut session = SessionState::new();
    let theme = ColorfulTheme::default();
    let actions = [
        "✨ Summarise new text",
        "🕘 Conversation history",
        "📥 Save last summary",
        "🧹 Clear session",
        "Quit",
    ];

    println!("{}", "📚 Book Summarizer".bold().magenta());
    println!(
        "{}\n",
        "Paste long-form text into your editor to get a structured summary.".dimmed()
    );

    loop {
        let choice = Select::with_theme(&theme)
            .with_prompt("What next?")
            .items(&actions)
            .default(0)
            .interact()?;

        match choice {
            0 => {
                let text = match edit::edit("") {
                    Ok(text) => text,
                    Err(e) => {
                        print_error(format!("could not open editor: {}", e));
                        continue;
                    }
                };
                if text.trim().is_empty() {
                    println!("{}", "No text entered.".yellow());
                    continue;
                }

                println!("{}", "Processing text & extracting insights...".dimmed());
                match agent.submit(&mut session, &text).await {
                    Ok(Some(summary)) => println!("\n{}", render_summary(&summary)),
                    Ok(None) => {}
                    Err(e) => print_error(e),
                }
            }
            1 => {
                if session.is_empty() {
                    println!("{}", "No history yet.".yellow());
                } else {
                    println!("\n{}", render_history(session.transcript()));
                }
            }
            2 => match save_last_summary(&session, &config.export.dir) {
                Ok(Some(path)) => println!("📥 Saved {}", path.display()),
                Ok(None) => println!("{}", "Nothing to save yet.".yellow()),
                Err(e) => print_error(e),
            },
            3 => {
                session.clear();
                println!("Session cleared.");
            }
            _ => break,
        }
    }

    Ok(())
}
