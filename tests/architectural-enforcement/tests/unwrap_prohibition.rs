//! Integration Test: Unwrap Prohibition
//!
//! **Policy**: production code propagates errors or logs them. `unwrap()`
//! and `expect()` belong in tests only.

use std::path::Path;

use architectural_enforcement::{scan_production, SourceLine};

#[test]
fn test_no_unwrap_in_production_code() {
    let violations = scan_production(is_unwrap_violation);

    if !violations.is_empty() {
        eprintln!("\nunwrap()/expect() found in production code:\n");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        panic!(
            "\nFound {} unwrap/expect call(s) in production code.",
            violations.len()
        );
    }
}

fn is_unwrap_violation(_path: &Path, lines: &[SourceLine], idx: usize) -> bool {
    let code = &lines[idx].code;
    code.contains(".unwrap()") || code.contains(".expect(")
}

#[cfg(test)]
mod tests {
    use super::*;
    use architectural_enforcement::production_lines;

    #[test]
    fn test_unwrap_or_is_fine() {
        let lines = production_lines("let x = maybe.unwrap_or(0);\nlet y = maybe.unwrap_or_else(f);\n");
        assert!(!is_unwrap_violation(Path::new("x.rs"), &lines, 0));
        assert!(!is_unwrap_violation(Path::new("x.rs"), &lines, 1));
    }

    #[test]
    fn test_unwrap_and_expect_are_flagged() {
        let lines = production_lines("let x = maybe.unwrap();\nlet y = res.expect(\"boom\");\n");
        assert!(is_unwrap_violation(Path::new("x.rs"), &lines, 0));
        assert!(is_unwrap_violation(Path::new("x.rs"), &lines, 1));
    }
}
