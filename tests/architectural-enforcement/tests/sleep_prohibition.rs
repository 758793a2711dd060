//! Integration Test: Sleep Prohibition
//!
//! **Policy**: production code never blocks a thread with `std::thread::sleep`
//! and only uses `tokio::time::sleep` for reconnect backoff. Everything else
//! waits on I/O, a channel, or `tokio::time::interval`.

use std::path::Path;

use architectural_enforcement::{scan_production, SourceLine};

#[test]
fn test_no_sleep_in_production_code() {
    let violations = scan_production(is_sleep_violation);

    if !violations.is_empty() {
        eprintln!("\nSleep calls found in production code:\n");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        eprintln!("\nAcceptable:");
        eprintln!("  - tokio::time::sleep while waiting out a reconnect backoff");
        eprintln!("  - tokio::time::interval for periodic work");
        eprintln!("  - anything inside #[cfg(test)]");

        panic!(
            "\nFound {} sleep violation(s) in production code.",
            violations.len()
        );
    }
}

fn is_sleep_violation(_path: &Path, lines: &[SourceLine], idx: usize) -> bool {
    let code = &lines[idx].code;

    if code.contains("thread::sleep") {
        return true;
    }
    if code.contains("::sleep(") || code.contains(".sleep(") {
        return !is_backoff_context(lines, idx);
    }
    false
}

/// Sleep is waiting out a reconnect delay
fn is_backoff_context(lines: &[SourceLine], idx: usize) -> bool {
    let start = idx.saturating_sub(15);
    let end = (idx + 5).min(lines.len());

    let nearby = || lines[start..end].iter().map(|l| l.code.to_lowercase());
    let mentions_backoff = nearby().any(|l| l.contains("backoff") || l.contains("delay"));
    let mentions_retry = nearby().any(|l| l.contains("reconnect") || l.contains("retry"));

    mentions_backoff && mentions_retry
}

#[cfg(test)]
mod tests {
    use super::*;
    use architectural_enforcement::production_lines;

    #[test]
    fn test_thread_sleep_is_always_flagged() {
        let lines = production_lines(
            "fn reconnect() {\n    let delay = backoff.next_delay();\n    std::thread::sleep(delay);\n}\n",
        );
        assert!(is_sleep_violation(Path::new("x.rs"), &lines, 2));
    }

    #[test]
    fn test_backoff_sleep_is_allowed() {
        let lines = production_lines(
            "let delay = self.backoff.next_delay();\ndebug!(\"Waiting before reconnect\");\ntokio::time::sleep(delay).await;\n",
        );
        assert!(!is_sleep_violation(Path::new("x.rs"), &lines, 2));
    }

    #[test]
    fn test_polling_sleep_is_flagged() {
        let lines = production_lines(
            "loop {\n    if ready() { break; }\n    tokio::time::sleep(Duration::from_millis(10)).await;\n}\n",
        );
        assert!(is_sleep_violation(Path::new("x.rs"), &lines, 2));
    }
}
