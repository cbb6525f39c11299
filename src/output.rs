use colored::{ColoredString, Colorize};

use crate::host::Severity;
use crate::remover::CleanupOutcome;
use crate::targets::CleanupTarget;
use crate::utils;

pub fn print_banner() {
    println!(
        "{}",
        concat!("cleancache - project cache cleaner v", env!("CARGO_PKG_VERSION"))
            .bold()
            .cyan()
    );
    println!();
}

pub fn print_title(title: &str) {
    println!("{}", format!("=== {title} ===").bold().white());
}

pub fn print_target(target: &CleanupTarget, size: Option<u64>) {
    let path = utils::display_path(&target.path);
    match size {
        Some(bytes) => println!(
            "  {:<14} {}  {}",
            target.name.bold(),
            path.dimmed(),
            utils::format_size(bytes).yellow()
        ),
        None => println!(
            "  {:<14} {}  {}",
            target.name,
            path.dimmed(),
            "[not present]".dimmed()
        ),
    }
}

pub fn print_message(message: &str) {
    for line in message.lines() {
        println!("  {line}");
    }
}

pub fn print_prompt(question: &str) {
    print!("{} {} ", question.bold(), "[y/N]:".dimmed());
}

pub fn print_notice(message: &str, severity: Severity) {
    let tag = match severity {
        Severity::Pending => "Working:".cyan().bold(),
        Severity::Success => "Done:".green().bold(),
        Severity::Info => "Info:".cyan().bold(),
        Severity::Failure => "Error:".red().bold(),
    };
    let mut lines = message.lines();
    if let Some(first) = lines.next() {
        println!("{tag} {first}");
    }
    for line in lines {
        println!("  {}", continuation_line(line, severity));
    }
}

/// Detail lines of a notice; only failures are highlighted.
fn continuation_line(line: &str, severity: Severity) -> ColoredString {
    match severity {
        Severity::Failure => line.red(),
        _ => line.normal(),
    }
}

pub fn print_summary(outcome: &CleanupOutcome) {
    print_title("Summary");
    for path in &outcome.deleted {
        println!("  {} {}", "Deleted".red(), utils::display_path(path).dimmed());
    }
    for path in &outcome.skipped {
        println!("  {} {}", "Skipped".dimmed(), utils::display_path(path).dimmed());
    }
    for failure in &outcome.failures {
        println!(
            "  {} {}: {}",
            "Failed".red().bold(),
            utils::display_path(&failure.path).dimmed(),
            failure.reason.to_string().red()
        );
    }
    println!(
        "  {} deleted, {} skipped, {} failed",
        outcome.deleted.len().to_string().green(),
        outcome.skipped.len(),
        outcome.failures.len()
    );
    println!();
}
