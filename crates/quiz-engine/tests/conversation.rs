//! End-to-end conversation flows over a real ledger and an in-memory
//! corpus.

use chrono::Utc;
use database::{score, Database};
use quiz_core::{
    ChoiceAction, EventKind, InboundEvent, Question, Reply, SessionState, StaticCorpus, UserRef,
};
use quiz_engine::QuizEngine;

async fn test_engine_with(
    questions: Vec<Question>,
) -> (tempfile::TempDir, QuizEngine<StaticCorpus>) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("quiz.db").display());
    let db = Database::connect(&url).await.unwrap();
    db.migrate().await.unwrap();

    (dir, QuizEngine::new(db, StaticCorpus::new(questions)))
}

/// One python question and one javascript question, so a selected
/// language always draws the same, predictable question.
async fn test_engine() -> (tempfile::TempDir, QuizEngine<StaticCorpus>) {
    test_engine_with(vec![
        Question {
            question_id: 1,
            language: "python".to_string(),
            prompt: "What does 2 + 2 evaluate to?".to_string(),
            answer: "4".to_string(),
            hint: Some("Count on your fingers.".to_string()),
        },
        Question {
            question_id: 2,
            language: "javascript".to_string(),
            prompt: "Which keyword declares a block-scoped variable?".to_string(),
            answer: "let".to_string(),
            hint: None,
        },
    ])
    .await
}

fn event(user_id: &str, kind: EventKind) -> InboundEvent {
    InboundEvent::new(UserRef::new(user_id, "Tester"), kind)
}

fn select(language: &str) -> EventKind {
    EventKind::SelectLanguage {
        language: language.to_string(),
    }
}

fn submit(text: &str) -> EventKind {
    EventKind::SubmitAnswer {
        text: text.to_string(),
    }
}

fn first_message(replies: &[Reply]) -> &str {
    replies.first().expect("expected at least one reply").message()
}

async fn daily(engine: &QuizEngine<StaticCorpus>, user_id: &str) -> i64 {
    score::daily_total(
        engine.database().pool(),
        user_id,
        Utc::now().date_naive(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_full_round_scores_once() {
    let (_dir, engine) = test_engine().await;

    let replies = engine.handle(event("u1", EventKind::Start)).await.unwrap();
    assert!(first_message(&replies).contains("Today: 0 points"));

    let replies = engine.handle(event("u1", select("python"))).await.unwrap();
    assert!(first_message(&replies).contains("Python it is"));

    let replies = engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();
    assert!(first_message(&replies).contains("2 + 2"));

    let replies = engine.handle(event("u1", submit(" 4 "))).await.unwrap();
    assert!(first_message(&replies).contains("Correct"));
    assert!(first_message(&replies).contains("1 point"));
    assert_eq!(daily(&engine, "u1").await, 1);

    // The question is resolved; answering again must not score.
    let replies = engine.handle(event("u1", submit("4"))).await.unwrap();
    assert!(first_message(&replies).contains("no question waiting"));
    assert_eq!(daily(&engine, "u1").await, 1);
}

#[tokio::test]
async fn test_answers_ignore_case_and_whitespace() {
    let (_dir, engine) = test_engine().await;

    engine
        .handle(event("u1", select("javascript")))
        .await
        .unwrap();
    engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();

    let replies = engine.handle(event("u1", submit("  LeT "))).await.unwrap();
    assert!(first_message(&replies).contains("Correct"));
    assert_eq!(daily(&engine, "u1").await, 1);
}

#[tokio::test]
async fn test_submit_without_question_is_refused() {
    let (_dir, engine) = test_engine().await;

    engine.handle(event("u1", select("python"))).await.unwrap();

    let replies = engine.handle(event("u1", submit("4"))).await.unwrap();
    assert!(first_message(&replies).contains("no question waiting"));
    assert_eq!(daily(&engine, "u1").await, 0);
}

#[tokio::test]
async fn test_question_before_language_prompts_menu() {
    let (_dir, engine) = test_engine().await;

    let replies = engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();

    assert!(first_message(&replies).contains("Pick a language first"));
    let labels: Vec<_> = replies[0].choices().iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Javascript", "Python"]);

    // No transition happened.
    let session = engine.sessions().checkout("u1").await;
    assert_eq!(*session, SessionState::Idle);
}

#[tokio::test]
async fn test_wrong_answer_resolves_without_credit() {
    let (_dir, engine) = test_engine().await;

    engine.handle(event("u1", select("python"))).await.unwrap();
    engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();

    let replies = engine.handle(event("u1", submit("5"))).await.unwrap();
    assert!(first_message(&replies).contains("Not quite"));
    assert_eq!(daily(&engine, "u1").await, 0);

    // The language survives, so the next question is one event away.
    let replies = engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();
    assert!(first_message(&replies).contains("2 + 2"));
}

#[tokio::test]
async fn test_hint_flow() {
    let (_dir, engine) = test_engine().await;

    engine.handle(event("u1", select("python"))).await.unwrap();
    engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();

    let replies = engine
        .handle(event("u1", EventKind::RequestHint))
        .await
        .unwrap();
    assert!(first_message(&replies).contains("Count on your fingers"));

    // Hints don't resolve the question.
    let replies = engine.handle(event("u1", submit("4"))).await.unwrap();
    assert!(first_message(&replies).contains("Correct"));
}

#[tokio::test]
async fn test_hint_without_hint_text() {
    let (_dir, engine) = test_engine().await;

    engine
        .handle(event("u1", select("javascript")))
        .await
        .unwrap();
    engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();

    let replies = engine
        .handle(event("u1", EventKind::RequestHint))
        .await
        .unwrap();
    assert!(first_message(&replies).contains("No hint for this one"));
}

#[tokio::test]
async fn test_hint_without_question_changes_nothing() {
    let (_dir, engine) = test_engine().await;

    engine.handle(event("u1", select("python"))).await.unwrap();
    let replies = engine
        .handle(event("u1", EventKind::RequestHint))
        .await
        .unwrap();
    assert!(first_message(&replies).contains("Ask for a question first"));

    let session = engine.sessions().checkout("u1").await;
    assert_eq!(session.language(), Some("python"));
    assert_eq!(session.pending_question(), None);
}

#[tokio::test]
async fn test_score_query_abandons_without_scoring() {
    let (_dir, engine) = test_engine().await;

    engine.handle(event("u1", select("python"))).await.unwrap();
    engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();

    let replies = engine
        .handle(event("u1", EventKind::ScoreQuery))
        .await
        .unwrap();
    assert!(first_message(&replies).contains("Today: 0 points"));

    // The abandoned question can't be answered for points anymore.
    let replies = engine.handle(event("u1", submit("4"))).await.unwrap();
    assert!(first_message(&replies).contains("no question waiting"));
    assert_eq!(daily(&engine, "u1").await, 0);

    // But the language selection survived the interrupt.
    let session = engine.sessions().checkout("u1").await;
    assert_eq!(session.language(), Some("python"));
}

#[tokio::test]
async fn test_change_language_resets_everything() {
    let (_dir, engine) = test_engine().await;

    engine.handle(event("u1", select("python"))).await.unwrap();
    engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();

    let replies = engine
        .handle(event("u1", EventKind::ChangeLanguage))
        .await
        .unwrap();
    assert!(first_message(&replies).contains("What would you like to practice"));
    assert!(replies[0]
        .choices()
        .iter()
        .any(|c| matches!(&c.action, ChoiceAction::SelectLanguage { language } if language == "python")));

    let session = engine.sessions().checkout("u1").await;
    assert_eq!(*session, SessionState::Idle);
    assert_eq!(daily(&engine, "u1").await, 0);
}

#[tokio::test]
async fn test_switching_language_abandons_question() {
    let (_dir, engine) = test_engine().await;

    engine.handle(event("u1", select("python"))).await.unwrap();
    engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();

    engine
        .handle(event("u1", select("javascript")))
        .await
        .unwrap();

    // The python answer no longer counts.
    let replies = engine.handle(event("u1", submit("4"))).await.unwrap();
    assert!(first_message(&replies).contains("no question waiting"));
    assert_eq!(daily(&engine, "u1").await, 0);
}

#[tokio::test]
async fn test_fresh_question_replaces_pending_one() {
    let (_dir, engine) = test_engine().await;

    engine.handle(event("u1", select("python"))).await.unwrap();
    engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();
    engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();

    {
        let session = engine.sessions().checkout("u1").await;
        assert_eq!(session.pending_question(), Some(1));
    }

    // Only one credit, no matter how many times the question was dealt.
    engine.handle(event("u1", submit("4"))).await.unwrap();
    assert_eq!(daily(&engine, "u1").await, 1);
}

#[tokio::test]
async fn test_users_do_not_share_sessions_or_scores() {
    let (_dir, engine) = test_engine().await;

    engine.handle(event("alice", select("python"))).await.unwrap();
    engine
        .handle(event("alice", EventKind::RequestQuestion))
        .await
        .unwrap();

    engine.handle(event("bob", select("javascript"))).await.unwrap();
    engine
        .handle(event("bob", EventKind::RequestQuestion))
        .await
        .unwrap();

    engine.handle(event("alice", submit("4"))).await.unwrap();
    engine.handle(event("bob", submit("wrong"))).await.unwrap();

    assert_eq!(daily(&engine, "alice").await, 1);
    assert_eq!(daily(&engine, "bob").await, 0);
}

#[tokio::test]
async fn test_duplicate_submits_credit_once() {
    let (_dir, engine) = test_engine().await;

    engine.handle(event("u1", select("python"))).await.unwrap();
    engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();

    // A duplicated delivery of the same correct answer. Per-user
    // serialization means exactly one submission sees the pending
    // question; the other is refused.
    let (a, b) = futures::join!(
        engine.handle(event("u1", submit("4"))),
        engine.handle(event("u1", submit("4")))
    );
    let a = a.unwrap();
    let b = b.unwrap();

    let corrects = [&a, &b]
        .iter()
        .filter(|replies| first_message(replies).contains("Correct"))
        .count();
    assert_eq!(corrects, 1);
    assert_eq!(daily(&engine, "u1").await, 1);
}

#[tokio::test]
async fn test_stale_question_clears_gracefully() {
    let (_dir, engine) = test_engine().await;

    engine.handle(event("u1", select("python"))).await.unwrap();
    {
        // A pending question that no longer exists in the corpus.
        let mut session = engine.sessions().checkout("u1").await;
        *session = SessionState::AwaitingAnswer {
            language: "python".to_string(),
            question_id: 999,
        };
    }

    let replies = engine.handle(event("u1", submit("4"))).await.unwrap();
    assert!(first_message(&replies).contains("no longer available"));
    assert_eq!(daily(&engine, "u1").await, 0);

    let session = engine.sessions().checkout("u1").await;
    assert_eq!(
        *session,
        SessionState::LanguageSelected {
            language: "python".to_string(),
        }
    );
}

#[tokio::test]
async fn test_empty_corpus_is_reported_not_fatal() {
    let (_dir, engine) = test_engine_with(vec![]).await;

    let replies = engine.handle(event("u1", EventKind::Start)).await.unwrap();
    assert!(first_message(&replies).contains("No questions are loaded yet"));

    engine.handle(event("u1", select("python"))).await.unwrap();
    let replies = engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();
    assert!(first_message(&replies).contains("don't have any Python questions"));

    // Still standing in the selected language, not wedged.
    let session = engine.sessions().checkout("u1").await;
    assert_eq!(session.language(), Some("python"));
}

#[tokio::test]
async fn test_unscored_answer_warns_user() {
    let (_dir, engine) = test_engine().await;

    engine.handle(event("u1", select("python"))).await.unwrap();
    engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();

    // Take the ledger away mid-conversation. The corpus is in memory,
    // so verification still works; only the credit can fail.
    engine.database().close().await;

    let replies = engine.handle(event("u1", submit("4"))).await.unwrap();
    assert!(first_message(&replies).contains("may not have been scored"));

    // The question is resolved either way, so a resubmit can't be
    // credited twice once the ledger comes back.
    let session = engine.sessions().checkout("u1").await;
    assert_eq!(session.pending_question(), None);
    assert_eq!(session.language(), Some("python"));
}

#[tokio::test]
async fn test_score_reply_counts_both_totals() {
    let (_dir, engine) = test_engine().await;

    engine.handle(event("u1", select("python"))).await.unwrap();
    engine
        .handle(event("u1", EventKind::RequestQuestion))
        .await
        .unwrap();
    engine.handle(event("u1", submit("4"))).await.unwrap();

    let replies = engine
        .handle(event("u1", EventKind::ScoreQuery))
        .await
        .unwrap();
    assert!(first_message(&replies).contains("Today: 1 point."));
    assert!(first_message(&replies).contains("All time: 1 point."));
}
