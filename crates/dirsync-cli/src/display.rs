//! Console display utilities for the dirsync CLI

use console::style;
use dirsync_sync::SyncOptions;
use dirsync_types::{ActionKind, SyncReport, SyncStats};
use std::path::Path;
use std::time::Duration;

/// Announce the run before it starts
pub fn display_header(source: &Path, destination: &Path, options: SyncOptions) {
    println!(
        "{} Mirroring {} to {}",
        style("⟲").blue().bold(),
        style(source.display()).cyan(),
        style(destination.display()).cyan()
    );
    if options.dry_run {
        display_info("Dry run mode - no changes will be made");
    }
    if options.delete_missing {
        display_warning("Entries missing from the source will be deleted");
    }
}

/// Print the summary of a finished run
pub fn display_report(report: &SyncReport) {
    display_stats(&report.stats, report.dry_run);

    if !report.failures.is_empty() {
        println!();
        println!("{}", style("Failures:").bold().underlined());
        for failure in &report.failures {
            println!(
                "  {} {}: {}",
                style("✗").red(),
                style(&failure.path).cyan(),
                style(&failure.message).red()
            );
        }
    }

    println!();
    if report.is_clean() {
        display_success(&completion_message(report));
    } else {
        display_warning(&completion_message(report));
    }
}

fn display_stats(stats: &SyncStats, dry_run: bool) {
    println!();
    let title = if dry_run {
        "Planned Changes:"
    } else {
        "Sync Statistics:"
    };
    println!("{}", style(title).bold().underlined());
    println!("  Files copied: {}", style(stats.files_copied).green());
    println!(
        "  Directories created: {}",
        style(stats.directories_created).green()
    );
    println!(
        "  Entries overwritten: {}",
        style(stats.entries_overwritten).green()
    );
    println!("  Entries deleted: {}", style(stats.entries_deleted).green());
    println!(
        "  Bytes copied: {}",
        style(format_bytes(stats.bytes_copied)).green()
    );
    println!("  Already in sync: {}", style(stats.entries_in_sync).dim());
    if stats.entries_left > 0 {
        println!(
            "  Left in destination: {}",
            style(stats.entries_left).yellow()
        );
    }
    println!(
        "  Errors: {}",
        if stats.errors > 0 {
            style(stats.errors).red()
        } else {
            style(stats.errors).green()
        }
    );
    println!(
        "  Duration: {}",
        style(format_duration(stats.duration)).blue()
    );
}

fn completion_message(report: &SyncReport) -> String {
    let deleted = report.actions_of(ActionKind::Delete).count();
    match (report.is_clean(), report.dry_run) {
        (true, true) => format!(
            "Dry run completed: {} changes planned ({} deletions)",
            report.stats.changes(),
            deleted
        ),
        (true, false) => format!("Sync completed: {} changes", report.stats.changes()),
        (false, _) => format!("Sync completed with {} errors", report.stats.errors),
    }
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Format duration in human-readable format
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// Display a warning message with proper formatting
pub fn display_warning(message: &str) {
    println!("{} {}", style("⚠").yellow().bold(), style(message).yellow());
}

/// Display an error message on stderr
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

/// Display a success message with proper formatting
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), style(message).green());
}

/// Display an info message with proper formatting
pub fn display_info(message: &str) {
    println!("{} {}", style("ℹ").blue().bold(), style(message).blue());
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirsync_types::{RunId, SyncAction};
    use std::path::PathBuf;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(24), "24.00 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }

    #[test]
    fn test_completion_message() {
        let mut report = SyncReport::new(
            RunId::nil(),
            PathBuf::from("/src"),
            PathBuf::from("/dst"),
            true,
        );
        report.record(SyncAction::new(ActionKind::Copy, "file1.txt", false), 0);
        report.record(SyncAction::new(ActionKind::Delete, "target_only.txt", false), 0);
        assert_eq!(
            completion_message(&report),
            "Dry run completed: 2 changes planned (1 deletions)"
        );

        let error = dirsync_types::Error::config("boom");
        report.record_failure("file2.txt", &error);
        assert_eq!(completion_message(&report), "Sync completed with 1 errors");
    }
}
