use chrono::Local;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::app::Action;
use crate::model::{BusinessProfile, ConversationTurn, GenerationResult, OutputKind, ProfileField, Role};

/// Busy indicator shown while a request is in flight.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.magenta} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn banner() {
    println!("{}", "MobiusPrime".magenta().bold());
    println!("{}\n", "Your AI Powered Marketing TeamMate".dimmed());
}

pub fn show_output(content: &str) {
    println!("\n{}", "=== Strategic Output ===".cyan().bold());
    println!("{}\n", content);
}

pub fn show_history(items: &[GenerationResult]) {
    println!("\n{}", "=== Strategy History ===".bold());
    if items.is_empty() {
        println!("No history yet.");
        return;
    }
    for item in items {
        println!(
            "{}  {}  {}",
            item.form_data.title().magenta().bold(),
            item.timestamp.with_timezone(&Local).format("%Y-%m-%d").to_string().dimmed(),
            item.id.dimmed(),
        );
        println!("    {}", item.form_data.selected_output);
        println!("    {}", format!("Model: {}", item.model).cyan());
    }
    println!();
}

pub fn show_turn(turn: &ConversationTurn) {
    let time = turn.timestamp.with_timezone(&Local).format("%H:%M").to_string();
    match turn.role {
        Role::User => println!("{} {}\n{}\n", "you".magenta().bold(), time.dimmed(), turn.text),
        Role::Model => println!("{} {}\n{}\n", "mobius".cyan().bold(), time.dimmed(), turn.text),
    }
}

pub fn show_error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

pub fn show_notice(msg: &str) {
    println!("{}", msg.green());
}

/// Read one line; `None` on EOF.
pub fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut s = String::new();
    match io::stdin().lock().read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(s.trim_end_matches(['\r', '\n']).to_string()),
    }
}

pub fn confirm(prompt: &str) -> bool {
    match read_line(&format!("{} [y/N]: ", prompt)) {
        Some(ans) => {
            let ans = ans.trim().to_lowercase();
            ans == "y" || ans == "yes"
        }
        None => false,
    }
}

/// Map a questionnaire answer to an action. Empty keeps the current value,
/// `?` asks the model to infer the field.
pub fn field_answer(field: ProfileField, answer: &str) -> Option<Action> {
    match answer.trim() {
        "" => None,
        "?" => Some(Action::UseAiToAnswer(field)),
        v => Some(Action::SetField(field, v.to_string())),
    }
}

/// 1-based pick from [`OutputKind::ALL`].
pub fn output_answer(answer: &str) -> Option<OutputKind> {
    let n: usize = answer.trim().parse().ok()?;
    OutputKind::ALL.get(n.checked_sub(1)?).copied()
}

/// Walk the business profile form on stdin.
pub fn questionnaire(current: &BusinessProfile) -> Vec<Action> {
    println!("{}", "Business Profile".bold());
    println!("{}\n", "(enter keeps the current value, '?' lets the AI answer)".dimmed());

    let mut actions = Vec::new();
    for (i, field) in ProfileField::ALL.iter().enumerate() {
        let cur = current.get(*field);
        let hint = if cur.is_empty() { field.placeholder().to_string() } else { cur.to_string() };
        let prompt = format!("{}. {} {}: ", i + 1, field.form_label().bold(), format!("[{hint}]").dimmed());
        let Some(answer) = read_line(&prompt) else { return actions };
        actions.extend(field_answer(*field, &answer));
    }

    println!("\n{}", "What do you need?".bold());
    for (i, kind) in OutputKind::ALL.iter().enumerate() {
        let mark = if *kind == current.selected_output { "*" } else { " " };
        println!(" {mark}{}. {}", i + 1, kind);
    }
    if let Some(answer) = read_line("> ") {
        actions.extend(output_answer(&answer).map(Action::SelectOutput));
    }
    actions
}
