//! Interactive console loop.
//!
//! Turns typed lines into quiz events and prints the replies. Menus
//! come back numbered; typing the number picks that option.

use std::io::{self, Write};

use database::Database;
use quiz_core::{Choice, ChoiceAction, EventKind, InboundEvent, Reply, UserRef};
use quiz_engine::QuizEngine;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

/// Help text shown for /help or an unrecognized command.
const HELP_TEXT: &str = r#"Commands:
  /start            Say hello and see where you stand
  /language <name>  Pick a language to practice (also /lang)
  /question         Deal a question (also /q)
  /hint             Get a hint for the current question
  /score            Show today's and all-time points
  /change           Pick a different language
  /help             Show this message
  /quit             Leave

Anything else is sent as an answer to the current question.
A number picks that option from the last menu, so if your answer
is itself a small number, choose Answer first and then type it."#;

/// What a typed line asks the loop to do.
#[derive(Debug, Clone, PartialEq)]
enum Input {
    /// Hand an event to the engine.
    Event(EventKind),
    /// Print the help text.
    Help,
    /// Print a note without consulting the engine.
    Note(&'static str),
    /// Leave the loop.
    Quit,
    /// Nothing typed.
    Empty,
}

/// Run the console loop until /quit or end of input.
pub async fn run(engine: QuizEngine<Database>, user: UserRef) -> io::Result<()> {
    println!("Type /help for commands, /quit to leave.");

    let mut last_choices: Vec<Choice> = Vec::new();
    deliver(
        &engine,
        InboundEvent::new(user.clone(), EventKind::Start),
        &mut last_choices,
    )
    .await;
    prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line, &last_choices) {
            Input::Empty => {}
            Input::Quit => {
                println!("See you next time!");
                return Ok(());
            }
            Input::Help => println!("{HELP_TEXT}"),
            Input::Note(note) => {
                println!("{note}");
                last_choices.clear();
            }
            Input::Event(kind) => {
                deliver(&engine, InboundEvent::new(user.clone(), kind), &mut last_choices).await;
            }
        }
        prompt();
    }

    // End of input (Ctrl-D or a drained pipe).
    println!();
    Ok(())
}

/// Hand one event to the engine and print whatever comes back.
async fn deliver(
    engine: &QuizEngine<Database>,
    event: InboundEvent,
    last_choices: &mut Vec<Choice>,
) {
    match engine.handle(event).await {
        Ok(replies) => {
            last_choices.clear();
            for reply in &replies {
                print_reply(reply);
                last_choices.extend_from_slice(reply.choices());
            }
        }
        Err(e) => {
            error!("failed to handle event: {e}");
            println!("Something went wrong on my end. Please try again in a moment.");
        }
    }
}

/// Classify one typed line against the most recent menu.
fn parse_input(line: &str, choices: &[Choice]) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }

    if let Some(rest) = trimmed.strip_prefix('/') {
        let mut parts = rest.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or_default();
        let argument = parts.next().map(str::trim).unwrap_or_default();

        return match command {
            "start" => Input::Event(EventKind::Start),
            "lang" | "language" if !argument.is_empty() => Input::Event(EventKind::SelectLanguage {
                language: argument.to_lowercase(),
            }),
            "lang" | "language" | "change" | "languages" => {
                Input::Event(EventKind::ChangeLanguage)
            }
            "q" | "question" => Input::Event(EventKind::RequestQuestion),
            "hint" => Input::Event(EventKind::RequestHint),
            "score" => Input::Event(EventKind::ScoreQuery),
            "help" => Input::Help,
            "quit" | "exit" => Input::Quit,
            _ => Input::Help,
        };
    }

    // A number in range picks from the last menu. Out of range (or no
    // menu standing) it falls through as an answer, so "4" still
    // answers an arithmetic question.
    if let Ok(n) = trimmed.parse::<usize>() {
        if (1..=choices.len()).contains(&n) {
            return match event_for(&choices[n - 1].action) {
                Some(kind) => Input::Event(kind),
                None => Input::Note("Type your answer and press enter."),
            };
        }
    }

    Input::Event(EventKind::SubmitAnswer {
        text: trimmed.to_string(),
    })
}

/// The event a menu choice stands for. `None` means the choice only
/// asks the user to type (there is nothing to send yet).
fn event_for(action: &ChoiceAction) -> Option<EventKind> {
    match action {
        ChoiceAction::SelectLanguage { language } => Some(EventKind::SelectLanguage {
            language: language.clone(),
        }),
        ChoiceAction::RequestQuestion => Some(EventKind::RequestQuestion),
        ChoiceAction::RequestHint => Some(EventKind::RequestHint),
        ChoiceAction::ComposeAnswer => None,
        ChoiceAction::ScoreQuery => Some(EventKind::ScoreQuery),
        ChoiceAction::ChangeLanguage => Some(EventKind::ChangeLanguage),
    }
}

fn print_reply(reply: &Reply) {
    println!("{}", reply.message());
    for (i, choice) in reply.choices().iter().enumerate() {
        println!("  {}. {}", i + 1, choice.label);
    }
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}
