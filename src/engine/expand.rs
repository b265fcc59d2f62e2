//! `${name}` property references
//!
//! Unknown references are left untouched.

use regex::{Captures, Regex};

/// Replace every known `${name}` in `text` using `lookup`
pub fn expand<'a, F>(text: &str, lookup: F) -> Result<String, String>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| format!("Invalid regex: {e}"))?;

    let expanded = re.replace_all(text, |caps: &Captures<'_>| match lookup(&caps[1]) {
        Some(value) => value.to_string(),
        None => caps[0].to_string(),
    });
    Ok(expanded.into_owned())
}
