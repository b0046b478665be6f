//! The conversation controller.

use chrono::{NaiveDate, Utc};
use database::{score, user, Database};
use quiz_core::{
    Choice, ChoiceAction, EventKind, InboundEvent, Question, QuestionSource, Reply, SessionState,
};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::sessions::SessionMap;

/// Points credited for a correct answer.
const POINTS_PER_CORRECT_ANSWER: i64 = 1;

/// Reply when a question is requested before any language is chosen.
const PICK_LANGUAGE_FIRST: &str = "Pick a language first and I'll find you a question.";

/// Reply when an answer arrives with no question outstanding.
const NO_PENDING_QUESTION: &str =
    "There's no question waiting for an answer. Ask for one first!";

/// Reply when a hint is requested with no question outstanding.
const NO_PENDING_HINT: &str = "Nothing to hint at. Ask for a question first!";

/// Reply when the pending question has vanished from the corpus.
const STALE_QUESTION: &str = "That question is no longer available. Let's get you a fresh one.";

/// Reply when a correct answer could not be credited.
const SCORING_WARNING: &str =
    "Your answer was received, but it may not have been scored. Sorry about that!";

/// The conversation controller.
///
/// Maps each inbound event to session transitions, corpus draws, and
/// ledger writes, and returns the replies the transport should deliver.
/// Generic over the corpus so tests and demos can swap the database for
/// an in-memory question set.
pub struct QuizEngine<Q: QuestionSource> {
    /// Score ledger and user records.
    db: Database,
    /// Question corpus.
    corpus: Q,
    /// Per-user conversation state.
    sessions: SessionMap,
}

impl<Q: QuestionSource> QuizEngine<Q> {
    /// Create an engine over a ledger database and a question corpus.
    pub fn new(db: Database, corpus: Q) -> Self {
        Self {
            db,
            corpus,
            sessions: SessionMap::default(),
        }
    }

    /// Create an engine with a custom session cap.
    pub fn with_session_cap(db: Database, corpus: Q, max_users: usize) -> Self {
        Self {
            db,
            corpus,
            sessions: SessionMap::new(max_users),
        }
    }

    /// Handle one inbound event, returning the replies to deliver.
    ///
    /// Events for the same user are handled strictly one at a time;
    /// events for different users proceed concurrently. An `Err` means
    /// a store could not be consulted and no reply could be produced;
    /// every user-recoverable condition comes back as a reply.
    pub async fn handle(&self, event: InboundEvent) -> Result<Vec<Reply>, EngineError> {
        let mut session = self.sessions.checkout(&event.user.user_id).await;

        debug!(
            "handling {} from {} (state: {})",
            event.kind.label(),
            event.user.user_id,
            session.name()
        );

        match &event.kind {
            EventKind::Start => self.handle_start(&event).await,
            EventKind::SelectLanguage { language } => {
                self.handle_select_language(&event, language, &mut session)
            }
            EventKind::RequestQuestion => {
                self.handle_request_question(&event, &mut session).await
            }
            EventKind::RequestHint => self.handle_request_hint(&event, &mut session).await,
            EventKind::SubmitAnswer { text } => {
                self.handle_submit_answer(&event, text, &mut session).await
            }
            EventKind::ScoreQuery => self.handle_score_query(&event, &mut session).await,
            EventKind::ChangeLanguage => self.handle_change_language(&event, &mut session).await,
        }
    }

    /// Greet the user and report where they stand. Session untouched.
    async fn handle_start(&self, event: &InboundEvent) -> Result<Vec<Reply>, EngineError> {
        user::upsert_user(
            self.db.pool(),
            &event.user.user_id,
            &event.user.display_name,
        )
        .await?;

        let today = Utc::now().date_naive();
        let daily = self.daily_total(&event.user.user_id, today).await?;
        let lifetime = self.lifetime_total(&event.user.user_id).await?;

        let greeting = format!(
            "Hi {}! Pick a language, answer questions, collect points.\n{}",
            event.user.display_name,
            score_summary(daily, lifetime)
        );

        Ok(vec![self.language_menu_reply(greeting).await?])
    }

    /// Switch to a language, abandoning any pending question unscored.
    fn handle_select_language(
        &self,
        event: &InboundEvent,
        language: &str,
        session: &mut SessionState,
    ) -> Result<Vec<Reply>, EngineError> {
        if let Some(abandoned) = session.select_language(language) {
            info!(
                "user {} switched language, abandoning question {}",
                event.user.user_id, abandoned
            );
        }

        Ok(vec![Reply::with_choices(
            format!("{} it is! What next?", capitalize(language)),
            action_menu(),
        )])
    }

    /// Serve a random question in the user's language.
    async fn handle_request_question(
        &self,
        event: &InboundEvent,
        session: &mut SessionState,
    ) -> Result<Vec<Reply>, EngineError> {
        let Some(language) = session.language().map(str::to_string) else {
            return Ok(vec![
                self.language_menu_reply(PICK_LANGUAGE_FIRST.to_string())
                    .await?,
            ]);
        };

        let Some(question) = self.random_question(&language).await? else {
            // Stay where we are; the user can pick another language.
            return Ok(vec![Reply::with_choices(
                format!("I don't have any {} questions yet.", capitalize(&language)),
                vec![Choice::new("Change language", ChoiceAction::ChangeLanguage)],
            )]);
        };

        let abandoned = match session.begin_question(question.question_id) {
            Ok(abandoned) => abandoned,
            Err(refused) => {
                debug!("refusing question for {}: {}", event.user.user_id, refused);
                return Ok(vec![
                    self.language_menu_reply(PICK_LANGUAGE_FIRST.to_string())
                        .await?,
                ]);
            }
        };
        if let Some(abandoned) = abandoned {
            info!(
                "user {} asked for a fresh question, abandoning {}",
                event.user.user_id, abandoned
            );
        }

        debug!(
            "serving question {} to {}",
            question.question_id, event.user.user_id
        );

        Ok(vec![Reply::with_choices(
            question.prompt,
            vec![
                Choice::new("Hint", ChoiceAction::RequestHint),
                Choice::new("Answer", ChoiceAction::ComposeAnswer),
            ],
        )])
    }

    /// Show the hint for the pending question, if it has one.
    async fn handle_request_hint(
        &self,
        event: &InboundEvent,
        session: &mut SessionState,
    ) -> Result<Vec<Reply>, EngineError> {
        let question_id = match session.hint_target() {
            Ok(id) => id,
            Err(refused) => {
                debug!("refusing hint for {}: {}", event.user.user_id, refused);
                return Ok(vec![Reply::text(NO_PENDING_HINT)]);
            }
        };

        match self.lookup(question_id).await? {
            Some(question) => {
                let text = match question.hint {
                    Some(hint) => format!("Hint: {hint}"),
                    None => "No hint for this one. You've got this!".to_string(),
                };
                Ok(vec![Reply::text(text)])
            }
            None => {
                warn!(
                    "question {} pending for {} is gone from the corpus",
                    question_id, event.user.user_id
                );
                session.clear_pending();
                Ok(vec![Reply::with_choices(
                    STALE_QUESTION.to_string(),
                    action_menu(),
                )])
            }
        }
    }

    /// Verify an answer attempt and credit the ledger when it's right.
    async fn handle_submit_answer(
        &self,
        event: &InboundEvent,
        text: &str,
        session: &mut SessionState,
    ) -> Result<Vec<Reply>, EngineError> {
        let question_id = match session.submission_target() {
            Ok(id) => id,
            Err(refused) => {
                debug!("refusing answer from {}: {}", event.user.user_id, refused);
                return Ok(vec![Reply::with_choices(
                    NO_PENDING_QUESTION.to_string(),
                    action_menu(),
                )]);
            }
        };

        // The question stays pending while the corpus is consulted, so
        // a transient outage lets the user simply resubmit.
        let question = match self.lookup(question_id).await {
            Ok(Some(question)) => question,
            Ok(None) => {
                warn!(
                    "question {} pending for {} is gone from the corpus",
                    question_id, event.user.user_id
                );
                session.clear_pending();
                return Ok(vec![Reply::with_choices(
                    STALE_QUESTION.to_string(),
                    action_menu(),
                )]);
            }
            Err(unavailable) => {
                warn!(
                    "could not verify answer from {}: {}",
                    event.user.user_id, unavailable
                );
                return Ok(vec![Reply::text(
                    "I couldn't check that answer just now. Give it another try in a moment.",
                )]);
            }
        };

        // Verification resolves the question either way.
        session.clear_pending();

        if !question.accepts(text) {
            info!("user {} answered question {} incorrectly", event.user.user_id, question_id);
            return Ok(vec![Reply::with_choices(
                "Not quite! Want another one?".to_string(),
                action_menu(),
            )]);
        }

        let today = Utc::now().date_naive();
        let daily = match self.credit_correct_answer(event, today).await {
            Ok(daily) => daily,
            Err(failed) => {
                // Never retried: a credit whose acknowledgement was
                // lost must not be replayed.
                warn!(
                    "credit failed for {} after a correct answer: {}",
                    event.user.user_id, failed
                );
                return Ok(vec![Reply::with_choices(
                    SCORING_WARNING.to_string(),
                    action_menu(),
                )]);
            }
        };

        info!(
            "user {} answered question {} correctly ({} today)",
            event.user.user_id, question_id, daily
        );

        Ok(vec![Reply::with_choices(
            format!("Correct! That's {} today. Keep going?", points(daily)),
            action_menu(),
        )])
    }

    /// Report today's and lifetime totals, dropping any pending question.
    async fn handle_score_query(
        &self,
        event: &InboundEvent,
        session: &mut SessionState,
    ) -> Result<Vec<Reply>, EngineError> {
        if let Some(abandoned) = session.clear_pending() {
            info!(
                "user {} checked their score, abandoning question {}",
                event.user.user_id, abandoned
            );
        }

        let today = Utc::now().date_naive();
        let daily = self.daily_total(&event.user.user_id, today).await?;
        let lifetime = self.lifetime_total(&event.user.user_id).await?;

        let message = score_summary(daily, lifetime);

        Ok(vec![if session.language().is_some() {
            Reply::with_choices(message, action_menu())
        } else {
            Reply::text(message)
        }])
    }

    /// Forget the whole session and offer the language menu.
    async fn handle_change_language(
        &self,
        event: &InboundEvent,
        session: &mut SessionState,
    ) -> Result<Vec<Reply>, EngineError> {
        if let Some(abandoned) = session.pending_question() {
            info!(
                "user {} changed language, abandoning question {}",
                event.user.user_id, abandoned
            );
        }
        session.reset();

        Ok(vec![
            self.language_menu_reply("What would you like to practice?".to_string())
                .await?,
        ])
    }

    /// Upsert the user, then credit one point for today.
    async fn credit_correct_answer(
        &self,
        event: &InboundEvent,
        today: NaiveDate,
    ) -> database::Result<i64> {
        user::upsert_user(
            self.db.pool(),
            &event.user.user_id,
            &event.user.display_name,
        )
        .await?;

        score::credit(
            self.db.pool(),
            &event.user.user_id,
            today,
            POINTS_PER_CORRECT_ANSWER,
        )
        .await
    }

    /// A reply offering the language menu, or an apology when the
    /// corpus has nothing to offer yet.
    async fn language_menu_reply(&self, message: String) -> Result<Reply, EngineError> {
        let languages = self.languages().await?;
        if languages.is_empty() {
            return Ok(Reply::text(format!(
                "{message}\nNo questions are loaded yet. Check back soon!"
            )));
        }

        let menu = languages
            .into_iter()
            .map(|language| {
                Choice::new(
                    capitalize(&language),
                    ChoiceAction::SelectLanguage { language },
                )
            })
            .collect();

        Ok(Reply::with_choices(message, menu))
    }

    // Store reads get one immediate retry; writes never do.

    async fn random_question(&self, language: &str) -> Result<Option<Question>, EngineError> {
        match self.corpus.random_question(language).await {
            Ok(question) => Ok(question),
            Err(unavailable) => {
                debug!("retrying question draw after: {}", unavailable);
                Ok(self.corpus.random_question(language).await?)
            }
        }
    }

    async fn lookup(&self, question_id: i64) -> Result<Option<Question>, EngineError> {
        match self.corpus.lookup(question_id).await {
            Ok(question) => Ok(question),
            Err(unavailable) => {
                debug!("retrying question lookup after: {}", unavailable);
                Ok(self.corpus.lookup(question_id).await?)
            }
        }
    }

    async fn languages(&self) -> Result<Vec<String>, EngineError> {
        match self.corpus.languages().await {
            Ok(languages) => Ok(languages),
            Err(unavailable) => {
                debug!("retrying language listing after: {}", unavailable);
                Ok(self.corpus.languages().await?)
            }
        }
    }

    async fn daily_total(&self, user_id: &str, date: NaiveDate) -> Result<i64, EngineError> {
        match score::daily_total(self.db.pool(), user_id, date).await {
            Ok(total) => Ok(total),
            Err(unavailable) => {
                debug!("retrying daily total read after: {}", unavailable);
                Ok(score::daily_total(self.db.pool(), user_id, date).await?)
            }
        }
    }

    async fn lifetime_total(&self, user_id: &str) -> Result<i64, EngineError> {
        match score::lifetime_total(self.db.pool(), user_id).await {
            Ok(total) => Ok(total),
            Err(unavailable) => {
                debug!("retrying lifetime total read after: {}", unavailable);
                Ok(score::lifetime_total(self.db.pool(), user_id).await?)
            }
        }
    }

    /// Get the ledger database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Get the question corpus.
    pub fn corpus(&self) -> &Q {
        &self.corpus
    }

    /// Get the session map.
    pub fn sessions(&self) -> &SessionMap {
        &self.sessions
    }
}

/// The standing menu of things to do once a language is chosen.
fn action_menu() -> Vec<Choice> {
    vec![
        Choice::new("Get a question", ChoiceAction::RequestQuestion),
        Choice::new("My score", ChoiceAction::ScoreQuery),
        Choice::new("Change language", ChoiceAction::ChangeLanguage),
    ]
}

/// One line summarizing today's and all-time points.
fn score_summary(daily: i64, lifetime: i64) -> String {
    format!("Today: {}. All time: {}.", points(daily), points(lifetime))
}

/// "1 point" / "3 points".
fn points(n: i64) -> String {
    if n == 1 {
        "1 point".to_string()
    } else {
        format!("{n} points")
    }
}

/// Capitalize the first character for display ("python" -> "Python").
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
