// src/utils/log.rs

//! Console output for human-facing command results.
//!
//! Diagnostic logging goes through the `log` facade; these helpers only
//! render summaries with the same timestamped layout.

use chrono::Local;

/// Format a console line with timestamp and level.
fn format_line(level: &str, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, level, message)
}

/// Print a success line.
pub fn success(message: &str) {
    println!("{}", format_line("INFO", &format!("✓ {}", message)));
}

/// Print a failure line.
pub fn failure(message: &str) {
    eprintln!("{}", format_line("ERROR", &format!("✗ {}", message)));
}

/// Print a header.
pub fn header(title: &str) {
    let border = "═".repeat(60);
    println!("{}", format_line("INFO", &border));
    println!("{}", format_line("INFO", &format!("  {}", title)));
    println!("{}", format_line("INFO", &border));
}

/// Print an indented sub-item.
pub fn sub_item(message: &str) {
    println!("{}", format_line("INFO", &format!("    {}", message)));
}

/// Print a titled block of key/value pairs.
pub fn summary(title: &str, items: &[(&str, String)]) {
    println!("{}", format_line("INFO", &format!("[SUMMARY] {}", title)));
    for (key, value) in items {
        println!("{}", format_line("INFO", &format!("    {}: {}", key, value)));
    }
}
