//! Architectural Enforcement Integration Tests
//!
//! Source scans that keep production code honest:
//! - No blocking sleeps; waiting happens on I/O, timers, or channels
//! - No `unwrap()` / `expect()` outside tests
//!
//! Helpers here are shared by the tests under `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source trees, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["beeper/core/src", "tui/src"];

/// Workspace root (two levels above this package)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Every `.rs` file under `dir`
pub fn rust_sources(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// One line of production code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based
    pub number: usize,
    /// Code with any trailing `//` comment removed
    pub code: String,
}

/// Code lines of `content` that ship in the binary.
///
/// Stops at the first `#[cfg(test)]`: test modules sit at the bottom of
/// each file. Doc and line comments are dropped.
pub fn production_lines(content: &str) -> Vec<SourceLine> {
    let mut lines = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("#[cfg(test)]") {
            break;
        }
        if trimmed.starts_with("//") {
            continue;
        }
        let code = line.split("//").next().unwrap_or(line);
        lines.push(SourceLine {
            number: idx + 1,
            code: code.to_string(),
        });
    }
    lines
}

/// Run `check` over every production line; collect `path:line - code`
pub fn scan_production<F>(check: F) -> Vec<String>
where
    F: Fn(&Path, &[SourceLine], usize) -> bool,
{
    let root = workspace_root();
    let mut violations = Vec::new();

    for dir in PRODUCTION_DIRS {
        let dir = root.join(dir);
        assert!(dir.exists(), "production directory missing: {}", dir.display());

        for path in rust_sources(&dir) {
            let content = match fs::read_to_string(&path) {
                Ok(c) => c,
                Err(_) => continue,
            };
            let lines = production_lines(&content);
            for (idx, line) in lines.iter().enumerate() {
                if check(&path, &lines, idx) {
                    violations.push(format!(
                        "{}:{} - {}",
                        path.display(),
                        line.number,
                        line.code.trim()
                    ));
                }
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let content = "fn a() {}\n// note\nfn b() {} // trailing\n#[cfg(test)]\nmod tests {}\n";
        let lines = production_lines(content);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[1].number, 3);
        assert_eq!(lines[1].code.trim(), "fn b() {}");
    }

    #[test]
    fn test_workspace_root_has_members() {
        assert!(workspace_root().join("beeper/core/Cargo.toml").exists());
        assert!(workspace_root().join("tui/Cargo.toml").exists());
    }
}
