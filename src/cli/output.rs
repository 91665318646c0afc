//! CLI output formatting utilities.

use crate::knowledge::KnowledgeItem;
use crate::orchestrator::QueryResult;
use crate::web::truncate_chars;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print an answer with its provenance.
    pub fn query_result(result: &QueryResult) {
        println!("\n{}\n", result.summary);
        Output::kv("Source", &format!("{} ({})", result.title, result.source));
        Output::kv(
            "Found in",
            &format!(
                "{} (confidence {:.2})",
                result.source_type, result.confidence
            ),
        );
        Output::kv("Took", &format_elapsed(result.elapsed_time));

        if let Some(video) = &result.video_suggestion {
            println!();
            println!(
                "  {} {} {}",
                style("Watch:").green().bold(),
                style(&video.title).bold(),
                style(&video.url).dim()
            );
        }
    }

    /// Print a stored knowledge item.
    pub fn knowledge_item(item: &KnowledgeItem) {
        let title = if item.metadata.title.is_empty() {
            "(untitled)"
        } else {
            item.metadata.title.as_str()
        };
        println!(
            "  {} {} ({})",
            style("*").cyan(),
            style(title).bold(),
            style(item.learned_at.format("%Y-%m-%d %H:%M")).dim()
        );
        if !item.metadata.source.is_empty() {
            println!("    {}", style(&item.metadata.source).dim());
        }
        println!("    {}", content_preview(&item.text, 120));
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Format elapsed seconds for display.
fn format_elapsed(seconds: f64) -> String {
    if seconds >= 60.0 {
        let total = seconds as u64;
        format!("{}m {}s", total / 60, total % 60)
    } else {
        format!("{:.2}s", seconds)
    }
}

/// Single-line preview, cut at `max_chars` with an ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        format!("{}...", truncate_chars(&content, max_chars))
    }
}
