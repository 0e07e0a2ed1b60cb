//! Console output utilities.

use console::style;

use crate::ledger::Ledger;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     Reddit Forwarder                                  ║
║     Upvoted media -> Telegram, exactly once           ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print the current ledger counts.
pub fn print_ledger_summary(ledger: &Ledger) {
    println!();
    println!("{}", style("Ledger:").bold());
    println!("  Forwarded: {}", ledger.downloaded_count());
    println!("  Excluded:  {}", ledger.excluded_count());
    println!();
}
