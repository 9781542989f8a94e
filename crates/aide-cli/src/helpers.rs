//! Shared CLI helpers — response printing, Markdown rendering, banner.

use colored::{ColoredString, Colorize};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// Print a provider reply under a bold `LLM:` label.
pub fn print_response(response: &str, render_markdown: bool) {
    println!();
    println!("{}", "LLM:".bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else if render_markdown {
        println!("{}", render_markdown_text(response));
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(provider: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Aide".cyan().bold(), version.dimmed());
    println!("{}", format!("Provider: {provider}").dimmed());
    println!("{}", "Type a query, or \"exit\" to quit.".dimmed());
    println!();
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

/// Print a "thinking" placeholder while a request is in flight.
pub fn print_thinking() {
    eprint!("{}", "thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Markdown
// ─────────────────────────────────────────────

/// Active inline styles while walking the event stream.
#[derive(Default)]
struct InlineStyle {
    heading: bool,
    strong: usize,
    emphasis: usize,
    strikethrough: usize,
}

impl InlineStyle {
    fn apply(&self, text: &str) -> ColoredString {
        let mut styled = text.normal();
        if self.heading {
            styled = styled.cyan().bold();
        }
        if self.strong > 0 {
            styled = styled.bold();
        }
        if self.emphasis > 0 {
            styled = styled.italic();
        }
        if self.strikethrough > 0 {
            styled = styled.strikethrough();
        }
        styled
    }
}

/// Render Markdown for the terminal.
///
/// Covers headings, emphasis, inline code, fenced/indented code blocks,
/// ordered and unordered lists and rules. Everything else passes through as
/// plain text.
pub fn render_markdown_text(input: &str) -> String {
    let mut out = String::new();
    let mut style = InlineStyle::default();
    // One entry per open list: next number for ordered lists, None for bullets.
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut in_code_block = false;

    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    for event in Parser::new_ext(input, options) {
        match event {
            Event::Start(Tag::Heading { .. }) => style.heading = true,
            Event::End(TagEnd::Heading(_)) => {
                style.heading = false;
                out.push_str("\n\n");
            }
            Event::End(TagEnd::Paragraph) => {
                out.push_str(if lists.is_empty() { "\n\n" } else { "\n" });
            }
            Event::Start(Tag::Strong) => style.strong += 1,
            Event::End(TagEnd::Strong) => style.strong = style.strong.saturating_sub(1),
            Event::Start(Tag::Emphasis) => style.emphasis += 1,
            Event::End(TagEnd::Emphasis) => style.emphasis = style.emphasis.saturating_sub(1),
            Event::Start(Tag::Strikethrough) => style.strikethrough += 1,
            Event::End(TagEnd::Strikethrough) => {
                style.strikethrough = style.strikethrough.saturating_sub(1)
            }
            Event::Start(Tag::List(start)) => {
                if !lists.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                lists.pop();
                if lists.is_empty() {
                    out.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                let indent = "  ".repeat(lists.len().saturating_sub(1));
                let marker = match lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}.");
                        *n += 1;
                        marker
                    }
                    _ => "•".to_string(),
                };
                out.push_str(&format!("{indent}{marker} "));
            }
            Event::End(TagEnd::Item) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                out.push('\n');
            }
            Event::Text(text) if in_code_block => {
                for line in text.lines() {
                    out.push_str(&format!("    {}\n", line.yellow()));
                }
            }
            Event::Text(text) => out.push_str(&style.apply(&text).to_string()),
            Event::Code(code) => out.push_str(&code.yellow().to_string()),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => out.push_str(&format!("{}\n\n", "─".repeat(40).dimmed())),
            _ => {}
        }
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_markers_are_consumed() {
        let rendered = render_markdown_text("**Rust** is *fast* and `safe`.");
        assert!(rendered.contains("Rust"));
        assert!(rendered.contains("fast"));
        assert!(rendered.contains("safe"));
        assert!(!rendered.contains("**"));
        assert!(!rendered.contains('`'));
    }

    #[test]
    fn heading_text_kept_without_hashes() {
        let rendered = render_markdown_text("# Title\n\nBody text.");
        assert!(rendered.contains("Title"));
        assert!(rendered.contains("Body text."));
        assert!(!rendered.contains('#'));
    }

    #[test]
    fn bullet_and_numbered_lists() {
        let rendered = render_markdown_text("- one\n- two\n\n1. first\n2. second\n");
        assert!(rendered.contains("• one"));
        assert!(rendered.contains("• two"));
        assert!(rendered.contains("1. first"));
        assert!(rendered.contains("2. second"));
    }

    #[test]
    fn nested_list_is_indented() {
        let rendered = render_markdown_text("- outer\n  - inner\n");
        assert!(rendered.contains("• outer\n"));
        assert!(rendered.contains("  • inner"));
    }

    #[test]
    fn code_block_lines_indented() {
        let rendered = render_markdown_text("```rust\nfn main() {}\n```\n");
        assert!(rendered.contains("fn main() {}"));
        assert!(!rendered.contains("```"));
        assert!(rendered.starts_with("    "));
    }

    #[test]
    fn plain_text_round_trips() {
        assert_eq!(render_markdown_text("just words"), "just words".normal().to_string());
    }
}
