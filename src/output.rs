//! Output formatting and styling module.
//!
//! Provides a centralized interface for terminal output: colored status
//! lines, a percentage progress bar that doubles as the pass logger, and
//! summary tables for organize and duplicate passes.

use crate::duplicates::DuplicateReport;
use crate::file_organizer::OrganizeSummary;
use crate::reporting::{Logger, ProgressReporter};
use crate::undo::ActionRecord;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints the per-category table and failure list of an organize pass.
    pub fn organize_summary(summary: &OrganizeSummary) {
        Self::header(if summary.dry_run {
            "DRY RUN SUMMARY"
        } else {
            "SUMMARY"
        });

        let max_category_len = summary
            .by_category
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in &summary.by_category {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(*count),
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Changed".bold(),
            summary.changed.to_string().green().bold(),
            plural(summary.changed),
            width = max_category_len
        );
        println!(
            "{:<width$} | {} {}",
            "Skipped".bold(),
            summary.skipped,
            plural(summary.skipped),
            width = max_category_len
        );

        if !summary.failed.is_empty() {
            Self::warning(&format!(
                "{} {} could not be organized:",
                summary.failed.len(),
                plural(summary.failed.len())
            ));
            for (path, reason) in &summary.failed {
                eprintln!("    - {}: {}", path.display(), reason);
            }
        }
    }

    /// Prints every duplicate pair, or a note that there were none.
    pub fn duplicate_report(report: &DuplicateReport) {
        Self::header("DUPLICATES");

        if report.is_empty() {
            Self::success(&format!(
                "No duplicates among {} {}",
                report.files_hashed,
                plural(report.files_hashed)
            ));
        } else {
            for pair in &report.pairs {
                println!(
                    " - {}\n   {} {}",
                    pair.duplicate.display(),
                    "same content as".dimmed(),
                    pair.canonical.display()
                );
            }
            Self::warning(&format!(
                "{} duplicate {} found (nothing was deleted)",
                report.len(),
                plural(report.len())
            ));
        }

        for (path, reason) in &report.unreadable {
            Self::error(&format!("Unreadable: {}: {}", path.display(), reason));
        }
    }

    /// Prints pending undo records, newest first.
    pub fn history(records: &[ActionRecord]) {
        if records.is_empty() {
            Self::info("Nothing to undo.");
            return;
        }

        Self::header("UNDO HISTORY (newest first)");
        for (i, record) in records.iter().rev().enumerate() {
            println!("{:>3}. {}", i + 1, record);
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// A 0-100 progress bar that also prints pass log lines above itself.
pub struct PercentBar {
    bar: ProgressBar,
}

impl PercentBar {
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new(100);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
        {
            bar.set_style(style.progress_chars("█▓░"));
        }
        bar.set_message(message.to_string());
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for PercentBar {
    fn report(&self, percent: f64) {
        self.bar.set_position(percent.clamp(0.0, 100.0).round() as u64);
    }
}

// When stderr is not a terminal the bar draws nothing, so lines go to stdout.
impl Logger for PercentBar {
    fn log(&self, message: &str) {
        if self.bar.is_hidden() {
            println!("{}", message);
        } else {
            self.bar.println(message);
        }
    }
}
