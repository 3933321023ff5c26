//! Interactive chat handler
//!
//! Runs a readline loop over a [`ChatSession`], printing each answer as it
//! streams in. Ctrl-C while an answer is streaming stops that answer; at
//! the prompt it ends the session.

use crate::chat::ChatSession;
use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::{HealthaiError, Result};
use crate::providers::{create_provider, Provider};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;

/// Start interactive chat
pub async fn run_chat(config: Config) -> Result<()> {
    tracing::info!("Starting interactive chat");

    let provider = create_provider(&config.provider)?;
    let mut session = ChatSession::new(config.chat.context_turns);
    let mut rl = DefaultEditor::new()?;

    print_welcome_banner(&provider.model());

    loop {
        match rl.readline(&format!("{} ", "you>".green().bold())) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match parse_special_command(trimmed) {
                    Ok(SpecialCommand::NewSession) => {
                        session.new_session();
                        println!("{}\n", "Started a new conversation.".cyan());
                        continue;
                    }
                    Ok(SpecialCommand::ShowHistory) => {
                        print_history_summary(&session);
                        continue;
                    }
                    Ok(SpecialCommand::Help) => {
                        print_help();
                        continue;
                    }
                    Ok(SpecialCommand::Exit) => break,
                    Ok(SpecialCommand::None) => {}
                    Err(e) => {
                        eprintln!("{}\n", e.to_string().yellow());
                        continue;
                    }
                }

                ask(&mut session, provider.as_ref(), trimmed).await;
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Send one question, streaming the answer to stdout
async fn ask(session: &mut ChatSession, provider: &dyn Provider, question: &str) {
    let cancel = session.cancel_handle();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    println!();
    let mut stdout = std::io::stdout();
    let result = session
        .send(provider, question, |chunk, _| {
            print!("{}", chunk);
            let _ = stdout.flush();
        })
        .await;
    watcher.abort();

    match result {
        Ok(_) => println!("\n"),
        Err(e) => match e.downcast_ref::<HealthaiError>() {
            Some(HealthaiError::Cancelled) => println!("\n{}\n", "[answer stopped]".yellow()),
            _ => println!("\n{}\n", e.to_string().red()),
        },
    }
}

fn print_welcome_banner(model: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║               HealthAI Chat - How can I help?                ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Model: {}", model.cyan());
    println!(
        "{}\n",
        "Answers are general information, not a substitute for professional medical advice."
            .dimmed()
    );
    println!("Type '/help' for available commands, 'exit' to quit\n");
}

fn print_history_summary(session: &ChatSession) {
    let total = session.messages().len();
    println!(
        "\nConversation: {} messages; the last {} are sent as context.\n",
        total,
        total.min(session.context_turns())
    );
}
