//! Shared logging utilities for consistent tracing across the campaign

use crate::types::RunId;
use chrono::{DateTime, Local};
use tracing::{error, info};

/// Crates whose events pass the filter at the requested level
const WORKSPACE_TARGETS: &[&str] = &["outreach", "shared"];

/// Build the `EnvFilter` directive string for a base level
pub fn filter_directives(log_level: Option<&str>) -> String {
    let base_level = log_level.unwrap_or("info");
    let mut directives: Vec<String> = WORKSPACE_TARGETS
        .iter()
        .map(|target| format!("{target}={base_level}"))
        .collect();
    directives.push("lettre=warn".to_string());
    directives.push("calamine=warn".to_string());
    directives.join(",")
}

/// Initialize the stdout tracing subscriber at the given level
pub fn init_tracing_with_level(log_level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt};

    let directives = filter_directives(log_level);

    fmt()
        .with_env_filter(EnvFilter::new(&directives))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Local> = Local::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for run-aware info logging
#[macro_export]
macro_rules! run_info {
    ($($arg:tt)*) => {
        tracing::info!(
            run = %$crate::RunId::current(),
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for run-aware warning logging
#[macro_export]
macro_rules! run_warn {
    ($($arg:tt)*) => {
        tracing::warn!(
            run = %$crate::RunId::current(),
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for run-aware error logging
#[macro_export]
macro_rules! run_error {
    ($($arg:tt)*) => {
        tracing::error!(
            run = %$crate::RunId::current(),
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for run-aware debug logging
#[macro_export]
macro_rules! run_debug {
    ($($arg:tt)*) => {
        tracing::debug!(
            run = %$crate::RunId::current(),
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(details: &str) {
    info!(
        run = %RunId::current(),
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(reason: &str) {
    info!(
        run = %RunId::current(),
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(context: &str, error: &dyn std::fmt::Display) {
    error!(
        run = %RunId::current(),
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(message: &str) {
    info!(
        run = %RunId::current(),
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}

/// Contextual logging helper for progress updates
pub fn log_progress(action: &str, details: &str) {
    info!(
        run = %RunId::current(),
        timestamp = format_timestamp(),
        "📋 {}: {}",
        action,
        details
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives_cover_workspace() {
        let directives = filter_directives(Some("debug"));
        assert!(directives.contains("outreach=debug"));
        assert!(directives.contains("shared=debug"));
        assert!(directives.contains("lettre=warn"));
    }

    #[test]
    fn test_filter_defaults_to_info() {
        assert!(filter_directives(None).starts_with("outreach=info"));
    }

    #[test]
    fn test_timestamp_format() {
        let ts = format_timestamp();
        // HH:MM:SS.mmm
        assert_eq!(ts.len(), 12);
        assert_eq!(&ts[2..3], ":");
    }
}
