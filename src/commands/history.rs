use crate::cli::HistoryCommand;
use crate::error::{HealthaiError, Result};
use crate::render::render_markdown;
use crate::storage::{AnalysisRecord, HistoryStore};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub fn handle_history(store: &HistoryStore, command: HistoryCommand) -> Result<()> {
    match command {
        HistoryCommand::List => {
            let records = store.list()?;

            if records.is_empty() {
                println!("{}", "No saved analyses found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

            table.add_row(prettytable::row![
                "ID".bold(),
                "Symptoms".bold(),
                "Severity".bold(),
                "Duration".bold(),
                "Saved".bold()
            ]);

            for record in records {
                let id_short = record.short_id();
                let symptoms = truncate(&record.symptoms, 40);
                let duration = record.duration.clone().unwrap_or_else(|| "-".to_string());
                let saved = record
                    .timestamp
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string();

                table.add_row(prettytable::row![
                    id_short.cyan(),
                    symptoms,
                    severity_label(&record),
                    duration,
                    saved
                ]);
            }

            println!("\nSaved Analyses (last {}):", store.cap());
            table.printstd();
            println!();
            println!("Use {} to read one in full.", "healthai history show <ID>".cyan());
            println!();
        }
        HistoryCommand::Show { id } => {
            let record = store
                .get(&id)?
                .ok_or_else(|| HealthaiError::Storage(format!("No analysis with id {}", id)))?;

            println!();
            println!("{} {}", "Symptoms:".bold(), record.symptoms);
            println!("{} {}", "Severity:".bold(), severity_label(&record));
            if let Some(duration) = &record.duration {
                println!("{} {}", "Duration:".bold(), duration);
            }
            println!(
                "{} {}",
                "Saved:".bold(),
                record.timestamp.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
            );
            println!();
            println!("{}", render_markdown(&record.analysis));
            println!();
        }
        HistoryCommand::Delete { id } => {
            if store.delete(&id)? == 0 {
                println!("{}", format!("No analysis with id {}", id).yellow());
            } else {
                println!("{}", format!("Deleted analysis {}", id).green());
            }
        }
        HistoryCommand::Clear => {
            let removed = store.clear()?;
            println!("{}", format!("Cleared {} saved analyses", removed).green());
        }
    }

    Ok(())
}

fn severity_label(record: &AnalysisRecord) -> colored::ColoredString {
    use crate::storage::Severity;
    match record.severity {
        Severity::Mild => "mild".green(),
        Severity::Moderate => "moderate".yellow(),
        Severity::Severe => "severe".red(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
