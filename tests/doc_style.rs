//! Doc comment conventions across the crate sources

use std::fs;
use std::path::{Path, PathBuf};

fn rust_sources(dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            rust_sources(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

fn doc_text(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    trimmed
        .strip_prefix("///")
        .or_else(|| trimmed.strip_prefix("//!"))
        .map(str::trim)
}

/// One-line doc summaries and list items end without a period
#[test]
fn one_line_doc_summaries_have_no_trailing_period() {
    let mut files = Vec::new();
    rust_sources(&Path::new(env!("CARGO_MANIFEST_DIR")).join("src"), &mut files);
    assert!(!files.is_empty());

    let mut offenders = Vec::new();
    for file in files {
        let source = fs::read_to_string(&file).unwrap();
        let lines: Vec<&str> = source.lines().collect();
        for (i, line) in lines.iter().enumerate() {
            let Some(text) = doc_text(line) else { continue };
            if !text.ends_with('.') || text.ends_with("..") {
                continue;
            }
            let starts_block = i == 0 || doc_text(lines[i - 1]).is_none();
            let next_is_doc = lines
                .get(i + 1)
                .and_then(|l| doc_text(l))
                .is_some_and(|t| !t.is_empty());
            let is_item = text.starts_with("- ") || text.starts_with("* ");
            if is_item || (starts_block && !next_is_doc) {
                offenders.push(format!("{}:{}: {}", file.display(), i + 1, text));
            }
        }
    }

    assert!(offenders.is_empty(), "doc lines ending with a period:\n{}", offenders.join("\n"));
}
