//! Properties-file reading
//!
//! `key=value` / `key: value` / `key value` lines, `#` and `!` comments,
//! trailing-backslash continuations and the common escapes.

use std::collections::HashMap;
use std::path::Path;

use crate::error::FilesystemError;
use crate::infra::filesystem;

/// Read a properties file into a map
pub fn load(path: &Path) -> Result<HashMap<String, String>, FilesystemError> {
    let content = filesystem::read_file(path)?;
    Ok(parse(&content).into_iter().collect())
}

/// Parse properties text, keeping file order
pub fn parse(content: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    let mut logical = String::new();

    for raw in content.lines() {
        let line = raw.trim_start();
        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }

        if ends_with_continuation(line) {
            logical.push_str(&line[..line.len() - 1]);
            continue;
        }
        logical.push_str(line);
        entries.push(split_entry(&logical));
        logical.clear();
    }
    if !logical.is_empty() {
        entries.push(split_entry(&logical));
    }
    entries
}

fn ends_with_continuation(line: &str) -> bool {
    let slashes = line.chars().rev().take_while(|c| *c == '\\').count();
    slashes % 2 == 1
}

fn split_entry(line: &str) -> (String, String) {
    let mut key = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    key.push(unescape(next));
                }
            }
            '=' | ':' => break,
            c if c.is_whitespace() => {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
                if chars.peek().is_some_and(|c| *c == '=' || *c == ':') {
                    chars.next();
                }
                break;
            }
            c => key.push(c),
        }
    }

    let rest: String = chars.collect();
    let mut value = String::new();
    let mut rest = rest.trim_start().chars();
    while let Some(c) = rest.next() {
        if c == '\\' {
            if let Some(next) = rest.next() {
                value.push(unescape(next));
            }
        } else {
            value.push(c);
        }
    }
    (key, value)
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators() {
        let entries = parse("a=1\nb: 2\nc 3\nd = 4\n");
        assert_eq!(
            entries,
            vec![
                ("a".into(), "1".into()),
                ("b".into(), "2".into()),
                ("c".into(), "3".into()),
                ("d".into(), "4".into()),
            ]
        );
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let entries = parse("# comment\n! also\n\n   \nkey=value\n");
        assert_eq!(entries, vec![("key".into(), "value".into())]);
    }

    #[test]
    fn test_continuation_lines() {
        let entries = parse("list=a,\\\n    b,\\\n    c\n");
        assert_eq!(entries, vec![("list".into(), "a,b,c".into())]);
    }

    #[test]
    fn test_escapes() {
        let entries = parse("path\\=x=C\\:\\\\dir\nmsg=line\\nbreak\n");
        assert_eq!(entries[0], ("path=x".into(), "C:\\dir".into()));
        assert_eq!(entries[1], ("msg".into(), "line\nbreak".into()));
    }

    #[test]
    fn test_key_without_value() {
        assert_eq!(parse("flag\n"), vec![("flag".into(), String::new())]);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(load(&dir.path().join("nope.properties")).is_err());
    }
}
