//! Console output shared by the DEEPN binaries. Everything goes to stderr so
//! that stdout stays free for data.

use std::time::Instant;

use colored::Colorize;

use crate::perf;

pub fn banner(subtitle: &str) {
    eprintln!();
    eprintln!("{} {}", "DEEPN".bold().cyan(), subtitle.dimmed());
    eprintln!("{}", format!("version {}", env!("CARGO_PKG_VERSION")).dimmed());
    eprintln!();
}

pub fn section(title: &str) {
    let bar = "─".repeat(50);
    eprintln!("{} {}", title.bold().blue(), bar.dimmed());
}

pub fn kv(key: &str, value: &str) {
    eprintln!("  {:<20} {}", key.dimmed(), value);
}

pub fn success(msg: &str) {
    eprintln!("  {} {}", "✓".green().bold(), msg);
}

pub fn warning(msg: &str) {
    eprintln!("  {} {}", "⚠".yellow(), msg.yellow());
}

pub fn failure(msg: &str) {
    eprintln!("  {} {}", "✗".red().bold(), msg.red());
}

/// Final timing and memory footer.
pub fn print_summary(start: Instant) {
    let elapsed = start.elapsed();
    eprintln!();
    eprintln!(
        "{}  {}\n{}  {}",
        "Time".dimmed(),
        perf::format_elapsed(elapsed).bold(),
        "Peak memory".dimmed(),
        perf::peak_memory_bytes()
            .map(perf::format_bytes)
            .unwrap_or_else(|| "N/A".to_string())
            .bold(),
    );
    eprintln!();
}
