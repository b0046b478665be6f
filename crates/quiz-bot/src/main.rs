//! Console quiz bot.
//!
//! Runs the quiz engine over stdin/stdout, with the database acting as
//! both the question corpus and the score ledger.

mod config;
mod console;

use database::Database;
use quiz_core::UserRef;
use quiz_engine::QuizEngine;
use tracing::info;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;
    info!(url = %config.database_url, "database ready");

    let engine = QuizEngine::new(db.clone(), db);

    let user = UserRef::new(&config.user_id, &config.display_name);
    info!(user = %user.user_id, "console session starting");

    console::run(engine, user).await?;

    Ok(())
}
