//! Terminal rendering of model answers
//!
//! Answers come back as light markdown. Headings and `**bold**` spans are
//! styled with `colored`; everything else is printed as-is.

use colored::Colorize;
use regex::Regex;
use std::sync::OnceLock;

fn bold_pattern() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold pattern"))
}

/// Style one line of markdown for the terminal
pub fn render_line(line: &str) -> String {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        let heading = trimmed.trim_start_matches('#').trim();
        return heading.bold().cyan().to_string();
    }

    bold_pattern()
        .replace_all(line, |caps: &regex::Captures| caps[1].bold().to_string())
        .into_owned()
}

/// Style a full markdown answer
pub fn render_markdown(text: &str) -> String {
    text.lines().map(render_line).collect::<Vec<_>>().join("\n")
}

/// Print a titled answer block
pub fn print_answer(title: &str, text: &str) {
    println!();
    println!("{}", title.bold().green());
    println!("{}", "─".repeat(title.chars().count().max(20)).dimmed());
    println!("{}", render_markdown(text));
    println!();
}
