//! `aide status` — show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use aide_core::config::{get_config_path, load_config};
use aide_core::session::SessionConfig;
use aide_core::utils::get_chat_log_path;
use aide_providers::registry::{find_by_name, PROVIDERS};

pub fn run() -> Result<()> {
    let config_path = get_config_path();
    let config = load_config(Some(config_path.as_path()));
    let session = SessionConfig::from_chat_config(&config.chat);

    println!();
    println!("{}", "Aide Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        found_marker(config_path.exists())
    );
    let log_path = get_chat_log_path();
    println!(
        "  {:<18} {} {}",
        "Chat log:".bold(),
        log_path.display(),
        found_marker(log_path.exists())
    );

    // Session defaults
    let model = session
        .model
        .clone()
        .or_else(|| find_by_name(&session.provider).map(|spec| spec.default_model.to_string()))
        .unwrap_or_else(|| "-".to_string());
    println!("  {:<18} {}", "Provider:".bold(), session.provider);
    println!("  {:<18} {}", "Model:".bold(), model);
    println!(
        "  {:<18} {}",
        "Parameters:".bold(),
        format!(
            "max_tokens: {} | temp: {} | top_p: {} | timeout: {}s",
            session.params.max_tokens,
            session.params.temperature,
            session.params.top_p,
            session.params.timeout_secs
        )
        .dimmed()
    );

    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let status = if config.api_key(spec.config_key).is_some() {
            format!("{} (key set)", "✓".green())
        } else {
            format!("{}", "· not configured".dimmed())
        };
        println!("    {:<20} {}", spec.display_name, status);
    }
    println!();

    Ok(())
}

fn found_marker(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}
