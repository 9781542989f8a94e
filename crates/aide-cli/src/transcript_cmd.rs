//! `aide transcript` — print the chat log as GUI markup lines.

use anyhow::Result;

use aide_core::config::{load_config, DisplayConfig};
use aide_core::transcript::{TranscriptFormatter, TranscriptStore};
use aide_core::utils::expand_home;

const DEFAULT_ASSISTANT_NAME: &str = "Assistant";
const DEFAULT_USER_NAME: &str = "User";

/// Environment variables consulted for display names.
const ASSISTANT_NAME_ENV: &str = "AssistantName";
const USER_NAME_ENV: &str = "NickName";

pub fn run(
    path: Option<String>,
    assistant_name: Option<String>,
    user_name: Option<String>,
) -> Result<()> {
    let config = load_config(None);
    let formatter = resolve_formatter(
        assistant_name,
        user_name,
        std::env::var(ASSISTANT_NAME_ENV).ok(),
        std::env::var(USER_NAME_ENV).ok(),
        &config.display,
    );

    let store = path
        .map(|p| TranscriptStore::new(expand_home(&p)))
        .unwrap_or_default();
    for line in formatter.render_for_display(&store.load()) {
        println!("{line}");
    }
    Ok(())
}

/// Pick display names: flag, then environment, then `[DISPLAY]`, then defaults.
fn resolve_formatter(
    assistant_flag: Option<String>,
    user_flag: Option<String>,
    assistant_env: Option<String>,
    user_env: Option<String>,
    display: &DisplayConfig,
) -> TranscriptFormatter {
    let pick = |flag: Option<String>, env: Option<String>, table: &Option<String>, default: &str| {
        [flag, env, table.clone()]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    TranscriptFormatter::new(
        pick(assistant_flag, assistant_env, &display.assistant_name, DEFAULT_ASSISTANT_NAME),
        pick(user_flag, user_env, &display.user_name, DEFAULT_USER_NAME),
    )
}
