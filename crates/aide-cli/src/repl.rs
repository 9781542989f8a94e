//! Interactive chat loop.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use std::path::{Path, PathBuf};

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::{debug, error, warn};

use aide_core::transcript::{normalize_answer, normalize_query, TranscriptMessage, TranscriptStore};
use aide_providers::{ProviderError, QueryDispatcher, NOT_IMPLEMENTED};

use crate::helpers;

const PROMPT: &str = "Enter your query: ";

const HISTORY_SIZE: usize = 1000;

/// Matched case-insensitively against the whole trimmed line.
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

#[derive(Clone, Copy, Debug)]
pub struct ReplOptions {
    pub render_markdown: bool,
    /// Append each answered turn to the chat log.
    pub record: bool,
}

/// Run the interactive REPL loop until Ctrl-C, Ctrl-D or an exit command.
pub async fn run(dispatcher: &QueryDispatcher, options: ReplOptions) -> Result<()> {
    helpers::print_banner(&dispatcher.session().provider);

    let history = history_path();
    let mut editor = create_editor(&history)?;
    let store = options.record.then(TranscriptStore::default);

    loop {
        let input = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                warn!(error = %e, "readline failed");
                break;
            }
        };

        let query = input.trim();
        if query.is_empty() {
            continue;
        }
        if is_exit_command(query) {
            println!("\nGoodbye!");
            break;
        }
        let _ = editor.add_history_entry(query);

        debug!(query_len = query.len(), "query read");
        helpers::print_thinking();
        let result = dispatcher.dispatch(query).await;
        helpers::clear_thinking();
        let reply = Reply::from_dispatch(result, &dispatcher.session().provider);
        helpers::print_response(reply.text(), options.render_markdown);

        match (&store, &reply) {
            (Some(store), Reply::Answer(answer)) => record_turn(store, query, answer),
            (Some(_), _) => debug!("failed turn not recorded"),
            (None, _) => {}
        }
    }

    save_history(&mut editor, &history);

    Ok(())
}

/// What the user sees for one query.
#[derive(Debug, PartialEq)]
enum Reply {
    /// Text produced by the model.
    Answer(String),
    /// Error or "not implemented" message; never recorded.
    Failure(String),
}

impl Reply {
    fn from_dispatch(result: Result<String, ProviderError>, provider: &str) -> Self {
        match result {
            Ok(text) if text == NOT_IMPLEMENTED => Reply::Failure(text),
            Ok(text) => Reply::Answer(text),
            Err(e) => {
                error!(provider, error = %e, "query failed");
                Reply::Failure(format!("Error: {e}"))
            }
        }
    }

    fn text(&self) -> &str {
        match self {
            Reply::Answer(text) | Reply::Failure(text) => text,
        }
    }
}

/// Append the normalized query and answer to the chat log.
fn record_turn(store: &TranscriptStore, query: &str, reply: &str) {
    let turns = [
        TranscriptMessage::user(normalize_query(query)),
        TranscriptMessage::assistant(normalize_answer(reply)),
    ];
    for message in turns {
        if let Err(e) = store.append(message) {
            warn!(path = %store.path().display(), error = %e, "failed to record turn");
            return;
        }
    }
}

/// Editor preloaded with the history file, when one exists.
fn create_editor(history: &Path) -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(HISTORY_SIZE)?;

    match editor.load_history(history) {
        Ok(()) => debug!(path = %history.display(), "history loaded"),
        Err(e) => debug!(path = %history.display(), error = %e, "no history loaded"),
    }
    Ok(editor)
}

fn save_history(editor: &mut Editor<(), DefaultHistory>, history: &Path) {
    let saved = history
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .map_err(rustyline::error::ReadlineError::from)
        .and_then(|()| editor.save_history(history));
    if let Err(e) = saved {
        debug!(path = %history.display(), error = %e, "history not saved");
    }
}

/// `~/.aide/history/cli_history`
fn history_path() -> PathBuf {
    aide_core::utils::get_data_path()
        .join("history")
        .join("cli_history")
}

fn is_exit_command(input: &str) -> bool {
    EXIT_COMMANDS
        .iter()
        .any(|command| command.eq_ignore_ascii_case(input))
}
