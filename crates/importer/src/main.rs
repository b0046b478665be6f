use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use database::{question, Database};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "importer")]
#[command(about = "Load a JSON question file into the quiz database")]
struct Args {
    /// Question file path (JSON array of questions)
    #[arg(long)]
    file: PathBuf,

    /// SQLite database URL. Falls back to SQLITE_PATH env.
    #[arg(long)]
    database_url: Option<String>,

    /// Parse and report without writing anything
    #[arg(long)]
    dry_run: bool,
}

/// One question as it appears in the import file.
#[derive(Debug, Deserialize)]
struct QuestionEntry {
    language: String,
    prompt: String,
    answer: String,
    #[serde(default)]
    hint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let text = fs::read_to_string(&args.file)?;
    let entries: Vec<QuestionEntry> = serde_json::from_str(&text)?;
    info!(
        file = %args.file.display(),
        count = entries.len(),
        "loaded question file"
    );

    let (good, skipped): (Vec<QuestionEntry>, Vec<QuestionEntry>) =
        entries.into_iter().partition(usable);
    for entry in &skipped {
        warn!(
            language = %entry.language,
            prompt = %entry.prompt,
            "skipping entry with a blank field"
        );
    }

    if args.dry_run {
        for (language, count) in count_by_language(&good) {
            info!(language = %language, count, "would import");
        }
        info!(
            count = good.len(),
            skipped = skipped.len(),
            "dry run, nothing written"
        );
        return Ok(());
    }

    let database_url = args.database_url.unwrap_or_else(|| {
        env::var("SQLITE_PATH").unwrap_or_else(|_| "sqlite:quiz.db?mode=rwc".to_string())
    });

    let db = Database::connect(&database_url).await?;
    db.migrate().await?;

    for entry in &good {
        let hint = entry.hint.as_deref().map(str::trim).filter(|h| !h.is_empty());
        question::add_question(
            db.pool(),
            &entry.language.trim().to_lowercase(),
            entry.prompt.trim(),
            entry.answer.trim(),
            hint,
        )
        .await?;
    }

    let total = question::count_questions(db.pool()).await?;
    for (language, count) in question::count_by_language(db.pool()).await? {
        info!(language = %language, count, "questions on hand");
    }
    info!(added = good.len(), skipped = skipped.len(), total, "import complete");

    db.close().await;
    Ok(())
}

/// An entry is importable when none of its required fields is blank.
fn usable(entry: &QuestionEntry) -> bool {
    !entry.language.trim().is_empty()
        && !entry.prompt.trim().is_empty()
        && !entry.answer.trim().is_empty()
}

fn count_by_language(entries: &[QuestionEntry]) -> BTreeMap<String, usize> {
    let mut by_language = BTreeMap::new();
    for entry in entries {
        *by_language
            .entry(entry.language.trim().to_lowercase())
            .or_insert(0) += 1;
    }
    by_language
}
