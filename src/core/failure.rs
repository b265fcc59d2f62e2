//! Failure-chain rendering
//!
//! A failure is rendered by walking its cause chain. Build failures whose
//! message merely repeats their cause's message as a suffix are collapsed
//! so the underlying message is printed once.

use std::backtrace::BacktraceStatus;
use std::error::Error as StdError;
use std::fmt::Write as _;

use crate::error::{BuildFailure, ConfigError};

/// One link of a failure chain, derived for printing only
#[derive(Debug)]
pub struct ChainNode<'a> {
    /// Short type tag shown in full traces
    pub tag: &'static str,
    /// Display text, including the source location when known
    pub text: String,
    build: Option<&'a BuildFailure>,
}

impl ChainNode<'_> {
    pub fn is_build_failure(&self) -> bool {
        self.build.is_some()
    }
}

/// Derive the chain of `error`, outermost first
pub fn chain(error: &anyhow::Error) -> Vec<ChainNode<'_>> {
    error.chain().map(node).collect()
}

fn node<'a>(error: &'a (dyn StdError + 'static)) -> ChainNode<'a> {
    let build = error.downcast_ref::<BuildFailure>();
    let tag = if build.is_some() {
        "BuildFailure"
    } else if error.is::<ConfigError>() {
        "ConfigError"
    } else if error.is::<std::io::Error>() {
        "IoError"
    } else {
        "Error"
    };
    ChainNode {
        tag,
        text: error.to_string(),
        build,
    }
}

/// Render `error` for the failure banner
///
/// Non-verbose output is the collapsed message of the innermost build
/// failure reached; anything else gets a tagged trace of the remaining
/// chain.
pub fn render(error: &anyhow::Error, verbose: bool) -> String {
    let nodes = chain(error);
    let mut out = String::new();

    let mut current = 0;
    while nodes[current].is_build_failure() && current + 1 < nodes.len() {
        let outer = &nodes[current].text;
        let inner = &nodes[current + 1].text;
        match outer.strip_suffix(inner.as_str()) {
            Some(prefix) => {
                out.push_str(prefix);
                current += 1;
            }
            None => break,
        }
    }

    if verbose || !nodes[current].is_build_failure() {
        write_trace(&mut out, &nodes[current..]);
    } else {
        out.push_str(&nodes[current].text);
        out.push('\n');
    }
    out
}

fn write_trace(out: &mut String, nodes: &[ChainNode<'_>]) {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            out.push_str("Caused by: ");
        }
        let _ = writeln!(out, "[{}] {}", node.tag, node.text);
        if let Some(failure) = node.build {
            if failure.backtrace().status() == BacktraceStatus::Captured {
                let _ = writeln!(out, "{}", failure.backtrace());
            }
        }
    }
}
