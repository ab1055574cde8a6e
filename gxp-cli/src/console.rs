//! Interactive chat console.

use anyhow::{Result, bail};
use gxp_rag::{ChatSession, GenerationEngine, RagConfig, RagResponse};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;

/// Questions offered by `/examples`.
pub const EXAMPLE_QUESTIONS: [&str; 5] = [
    "What are the key requirements of GAMP 5?",
    "Explain FDA 21 CFR Part 11 compliance",
    "What is the difference between IQ, OQ, and PQ?",
    "How to validate a computerized system?",
    "What are the requirements for electronic signatures?",
];

/// Printed when the console starts.
pub const DISCLAIMER: &str = "Disclaimer: This assistant provides guidance based on GxP validation documents. Always consult with qualified professionals and refer to official regulatory guidelines for compliance decisions.";

const HELP: &str = "\
Type a question to search the GxP knowledge base.

Commands:
  /examples     list example questions
  /example N    ask example question N
  /history      show this session's questions and answers
  /clear        clear the conversation history
  /info         show index and model information
  /help         show this help
  /quit         exit";

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Blank line.
    Empty,
    /// A question for the assistant.
    Ask(String),
    /// `/example N`, 1-based.
    Example(usize),
    /// List example questions.
    Examples,
    /// Show session history.
    History,
    /// Clear session history.
    Clear,
    /// Show system information.
    Info,
    /// Show help.
    Help,
    /// Leave the console.
    Quit,
    /// An unrecognized `/command`.
    Unknown(String),
}

/// Classify a line typed at the prompt.
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Ask(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    match (name.as_str(), parts.next()) {
        ("example", Some(n)) => match n.parse() {
            Ok(n) => Input::Example(n),
            Err(_) => Input::Unknown(line.to_string()),
        },
        ("examples" | "example", None) => Input::Examples,
        ("history", None) => Input::History,
        ("clear", None) => Input::Clear,
        ("info", None) => Input::Info,
        ("help" | "?", None) => Input::Help,
        ("quit" | "exit" | "q", None) => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

/// Render an answer with its cited sources.
pub fn format_response(response: &RagResponse) -> String {
    let mut out = response.answer.trim().to_string();
    if !response.sources.is_empty() {
        out.push_str("\n\nSources:");
        for source in &response.sources {
            out.push_str("\n  - ");
            out.push_str(source);
        }
    }
    out
}

/// System information shown by `/info`.
pub fn format_info(config: &RagConfig, indexed: usize, backend: &str) -> String {
    format!(
        "Documents indexed: {indexed}\nModel: {}\nEmbeddings: {}\nRetrieval: RAG with {backend}\nTemperature: {}",
        config.generation_model, config.embedding_model, config.temperature
    )
}

fn format_examples() -> String {
    EXAMPLE_QUESTIONS
        .iter()
        .enumerate()
        .map(|(i, q)| format!("  {}. {q}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_history(session: &ChatSession) -> String {
    if session.is_empty() {
        return "No questions asked yet.".to_string();
    }
    session
        .turns()
        .iter()
        .map(|turn| {
            format!(
                "[{}] You: {}\nAssistant: {}",
                turn.asked_at.format("%H:%M:%S"),
                turn.query,
                turn.answer.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Run the console until the user quits.
///
/// # Errors
///
/// Fails before prompting if the index is empty, or if the terminal cannot
/// be read.
pub async fn run(config: &RagConfig, engine: &GenerationEngine) -> Result<()> {
    let indexed = engine.store().count().await;
    if indexed == 0 {
        bail!("vector database is empty; run `gxp init` first");
    }

    println!("{}", config.app_title);
    println!("Your AI-powered guide to GxP validation, compliance, and regulatory guidelines");
    println!("{indexed} passages indexed. Type /help for commands.\n");
    println!("{DISCLAIMER}\n");

    let mut editor = DefaultEditor::new()?;
    let mut session = ChatSession::new();

    loop {
        let line = match editor.readline("gxp> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let input = parse_input(&line);
        if !matches!(input, Input::Empty) {
            let _ = editor.add_history_entry(line.trim());
        }

        let query = match input {
            Input::Empty => continue,
            Input::Ask(query) => query,
            Input::Example(n) => match n.checked_sub(1).and_then(|i| EXAMPLE_QUESTIONS.get(i)) {
                Some(question) => {
                    println!("You: {question}");
                    question.to_string()
                }
                None => {
                    println!("No example {n}; choose 1-{}.", EXAMPLE_QUESTIONS.len());
                    continue;
                }
            },
            Input::Examples => {
                println!("{}\n", format_examples());
                continue;
            }
            Input::History => {
                println!("{}\n", format_history(&session));
                continue;
            }
            Input::Clear => {
                session.clear();
                println!("Chat history cleared.\n");
                continue;
            }
            Input::Info => {
                let count = engine.store().count().await;
                println!("{}\n", format_info(config, count, engine.store().backend()));
                continue;
            }
            Input::Help => {
                println!("{HELP}\n");
                continue;
            }
            Input::Quit => break,
            Input::Unknown(command) => {
                println!("Unknown command {command}. Type /help for commands.\n");
                continue;
            }
        };

        println!("Searching knowledge base and generating response...");
        let response = session.ask(engine, &query).await;
        println!("\n{}\n", format_response(&response));
    }

    info!(turns = session.turns().len(), "console session ended");
    Ok(())
}
