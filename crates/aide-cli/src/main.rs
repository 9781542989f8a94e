//! Aide CLI — entry point.
//!
//! # Commands
//!
//! - `aide [chat] [--provider P] [--model M] [--record]` — interactive chat REPL
//! - `aide transcript [--path FILE]` — print the chat log as GUI markup
//! - `aide vision [--device N]` — describe one webcam frame
//! - `aide status` — show configuration and provider status

mod capture;
mod helpers;
mod repl;
mod status;
mod transcript_cmd;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use aide_core::config::{load_config, Config};
use aide_core::session::SessionConfig;
use aide_providers::{ProviderRegistry, QueryDispatcher};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Aide — a small assistant that talks to hosted language models
#[derive(Parser)]
#[command(name = "aide", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the selected provider (default)
    Chat(ChatArgs),

    /// Print the chat log rendered as GUI markup
    Transcript {
        /// Chat log file (defaults to ~/.aide/ChatLog.json)
        #[arg(long)]
        path: Option<String>,

        /// Label used for assistant turns
        #[arg(long)]
        assistant_name: Option<String>,

        /// Label used for user turns
        #[arg(long)]
        user_name: Option<String>,
    },

    /// Capture one webcam frame and ask a vision model to describe it
    Vision(capture::VisionArgs),

    /// Show configuration and provider status
    Status,
}

#[derive(Args, Default)]
struct ChatArgs {
    /// Provider to use (openai, groq, gemini)
    #[arg(short, long)]
    provider: Option<String>,

    /// Model identifier (defaults to the provider's default model)
    #[arg(short, long)]
    model: Option<String>,

    /// Disable Markdown rendering in output
    #[arg(long, default_value_t = false)]
    no_markdown: bool,

    /// Append each answered turn to the chat log (errors are not recorded)
    #[arg(long, default_value_t = false)]
    record: bool,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    logs: bool,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or_else(|| Commands::Chat(ChatArgs::default())) {
        Commands::Chat(args) => {
            init_logging(args.logs);
            run_chat(args).await
        }
        Commands::Transcript {
            path,
            assistant_name,
            user_name,
        } => {
            init_logging(false);
            transcript_cmd::run(path, assistant_name, user_name)
        }
        Commands::Vision(args) => {
            init_logging(args.logs);
            capture::run(args).await
        }
        Commands::Status => {
            init_logging(false);
            status::run()
        }
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(args: ChatArgs) -> Result<()> {
    let config = load_config(None);
    let session = build_session(&config, args.provider, args.model);
    let registry = ProviderRegistry::from_config(&config);

    if !config.has_any_key() {
        helpers::print_warning("No API keys configured; every query will fail until one is added.");
    }

    info!(
        provider = %session.provider,
        available = registry.len(),
        record = args.record,
        "starting chat"
    );

    let dispatcher = QueryDispatcher::new(registry, session);
    let options = repl::ReplOptions {
        render_markdown: !args.no_markdown,
        record: args.record,
    };
    repl::run(&dispatcher, options).await
}

/// Session from the `[CHAT]` table with CLI flags layered on top.
fn build_session(config: &Config, provider: Option<String>, model: Option<String>) -> SessionConfig {
    let mut session = SessionConfig::from_chat_config(&config.chat);
    if let Some(provider) = provider {
        session = session.with_provider(provider);
    }
    if let Some(model) = model {
        session = session.with_model(model);
    }
    session
}

/// Initialize tracing/logging. `RUST_LOG` overrides the default filter.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "aide=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_chat() {
        let cli = Cli::try_parse_from(["aide"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn chat_flags_parse() {
        let cli = Cli::try_parse_from(["aide", "chat", "-p", "groq", "--record", "--no-markdown"]).unwrap();
        match cli.command {
            Some(Commands::Chat(args)) => {
                assert_eq!(args.provider.as_deref(), Some("groq"));
                assert!(args.record);
                assert!(args.no_markdown);
                assert!(!args.logs);
            }
            _ => panic!("expected chat"),
        }
    }

    #[test]
    fn flags_override_chat_table() {
        let mut config = Config::default();
        config.chat.provider = Some("gemini".into());
        config.chat.model = Some("gemini-pro".into());

        let session = build_session(&config, None, None);
        assert_eq!(session.provider, "gemini");
        assert_eq!(session.model.as_deref(), Some("gemini-pro"));

        let session = build_session(&config, Some("groq".into()), Some("llama3-70b-8192".into()));
        assert_eq!(session.provider, "groq");
        assert_eq!(session.model.as_deref(), Some("llama3-70b-8192"));
    }

    #[test]
    fn env_sits_between_flags_and_chat_table() {
        use std::ffi::OsString;
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[CHAT]\nprovider = \"gemini\"\nmodel = \"gemini-pro\"\nmax_tokens = 300\n")
            .unwrap();
        file.flush().unwrap();

        let table = load_config(Some(file.path()));
        let config = aide_core::config::apply_overrides_from(
            table,
            [
                (OsString::from("AIDE_CHAT__PROVIDER"), OsString::from("groq")),
                (OsString::from("AIDE_CHAT__MAX_TOKENS"), OsString::from("many")),
            ],
        );

        let session = build_session(&config, None, None);
        assert_eq!(session.provider, "groq");
        assert_eq!(session.model.as_deref(), Some("gemini-pro"));
        assert_eq!(session.params.max_tokens, 300);

        let session = build_session(&config, Some("openai".into()), None);
        assert_eq!(session.provider, "openai");
        assert_eq!(session.model.as_deref(), Some("gemini-pro"));
    }

    #[test]
    fn vision_flags_parse() {
        let cli = Cli::try_parse_from(["aide", "vision", "--device", "2", "--retries", "5"]).unwrap();
        match cli.command {
            Some(Commands::Vision(args)) => {
                assert_eq!(args.device, 2);
                assert_eq!(args.alt_device, 1);
                assert_eq!(args.retries, 5);
            }
            _ => panic!("expected vision"),
        }
    }
}
