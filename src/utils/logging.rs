// file: src/utils/logging.rs
// description: tracing subscriber initialization and colored terminal messages

use colored::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logs go to stderr so command output on stdout stays machine readable.
/// `RUST_LOG` overrides the level chosen by `verbose`.
pub fn init_logger(colored_output: bool, verbose: bool) {
    colored::control::set_override(colored_output);

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact()
        .with_ansi(colored_output);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

pub fn format_error(msg: &str) -> String {
    format!("{} {}", "✗".red().bold(), msg.red())
}

pub fn format_warning(msg: &str) -> String {
    format!("{} {}", "⚠".yellow().bold(), msg.yellow())
}

pub fn format_info(msg: &str) -> String {
    format!("{} {}", "ℹ".blue().bold(), msg)
}

pub fn format_score(score: f64) -> String {
    let text = format!("{:.2}", score);
    if score >= 0.6 {
        text.green().to_string()
    } else if score >= 0.3 {
        text.yellow().to_string()
    } else {
        text.dimmed().to_string()
    }
}
