//! Transcript text helpers — query/answer normalization and GUI markup.
//!
//! The rendered markup is consumed by a GUI that styles the `Assistant` and
//! `User` span classes and splits assistant turns on [`END_OF_TURN`].

use super::{Role, TranscriptMessage};

/// Marker emitted after every assistant line.
pub const END_OF_TURN: &str = "[*end*]";

/// Words that make a query read as a question when followed by a space.
const QUESTION_WORDS: &[&str] = &[
    "how", "what", "who", "where", "when", "why", "which", "whose", "whom", "can you",
    "what's", "where's", "how's",
];

const TERMINAL_MARKS: &[char] = &['.', '?', '!'];

/// Normalize a user query for the transcript.
///
/// Lower-cases and trims, ends the text with `?` when a question word is
/// present and `.` otherwise (replacing any trailing `.`/`?`/`!`), then
/// upper-cases the first character.
pub fn normalize_query(query: &str) -> String {
    let lowered = query.trim().to_lowercase();
    let body = lowered.trim_end_matches(TERMINAL_MARKS).trim_end();
    if body.is_empty() {
        return String::new();
    }

    let mark = if is_question(&lowered) { '?' } else { '.' };
    capitalize_first(&format!("{body}{mark}"))
}

/// Remove whitespace-only lines from a model answer.
pub fn normalize_answer(answer: &str) -> String {
    answer
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether `text` contains a question word at a word start, followed by a space.
fn is_question(text: &str) -> bool {
    QUESTION_WORDS.iter().any(|word| {
        let needle = format!("{word} ");
        text.match_indices(&needle).any(|(idx, _)| {
            text[..idx]
                .chars()
                .next_back()
                .map_or(true, char::is_whitespace)
        })
    })
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ─────────────────────────────────────────────
// GUI rendering
// ─────────────────────────────────────────────

/// Renders transcript messages as GUI markup lines.
///
/// Display names are fixed at construction.
#[derive(Clone, Debug)]
pub struct TranscriptFormatter {
    assistant_name: String,
    user_name: String,
}

impl TranscriptFormatter {
    pub fn new(assistant_name: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            user_name: user_name.into(),
        }
    }

    pub fn assistant_name(&self) -> &str {
        &self.assistant_name
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// One markup line per message; assistant lines are followed by [`END_OF_TURN`].
    ///
    /// Roles other than `assistant` and `user` are labelled with the user name,
    /// matching how existing GUI transcripts were produced.
    pub fn render_for_display(&self, messages: &[TranscriptMessage]) -> Vec<String> {
        let mut lines = Vec::with_capacity(messages.len() * 2);
        for message in messages {
            match &message.role {
                Role::Assistant => {
                    lines.push(format!(
                        r#"<span class = "Assistant">{}</span> : {}"#,
                        self.assistant_name, message.content
                    ));
                    lines.push(END_OF_TURN.to_string());
                }
                Role::User | Role::Other(_) => {
                    lines.push(format!(
                        r#"<span class = "User">{}</span> : {}"#,
                        self.user_name, message.content
                    ));
                }
            }
        }
        lines
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
