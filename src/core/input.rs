//! Input handlers
//!
//! Tasks that need an answer from the user go through the run's single
//! [`InputHandler`].

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::BuildFailure;
use crate::infra::properties;
use crate::infra::streams::OutputStream;

/// A question asked by a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRequest {
    pub prompt: String,
    /// Accepted answers; empty accepts anything
    pub valid_args: Vec<String>,
    /// Answer used when the user just presses enter
    pub default: Option<String>,
}

impl InputRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            valid_args: Vec::new(),
            default: None,
        }
    }

    #[must_use]
    pub fn with_valid_args(mut self, valid_args: Vec<String>) -> Self {
        self.valid_args = valid_args;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: Option<String>) -> Self {
        self.default = default;
        self
    }

    pub fn is_valid(&self, answer: &str) -> bool {
        self.valid_args.is_empty() || self.valid_args.iter().any(|v| v == answer)
    }

    /// Prompt text including choices and default
    pub fn display_prompt(&self) -> String {
        let mut text = self.prompt.clone();
        if !self.valid_args.is_empty() {
            text.push_str(&format!(" ({})", self.valid_args.join(", ")));
        }
        if let Some(default) = &self.default {
            text.push_str(&format!(" [{default}]"));
        }
        text
    }
}

/// Answers input requests
pub trait InputHandler {
    fn handle_input(&mut self, request: &InputRequest) -> Result<String, BuildFailure>;
}

/// Prompts on a stream and reads answers line by line, re-asking until
/// the answer is valid
pub struct DefaultInputHandler {
    input: Box<dyn BufRead>,
    prompt_to: OutputStream,
}

impl DefaultInputHandler {
    pub fn new(input: impl BufRead + 'static, prompt_to: OutputStream) -> Self {
        Self {
            input: Box::new(input),
            prompt_to,
        }
    }

    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()), OutputStream::stdout())
    }
}

impl std::fmt::Debug for DefaultInputHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultInputHandler").finish_non_exhaustive()
    }
}

impl InputHandler for DefaultInputHandler {
    fn handle_input(&mut self, request: &InputRequest) -> Result<String, BuildFailure> {
        loop {
            self.prompt_to
                .line(&request.display_prompt())
                .map_err(|e| BuildFailure::new("Failed to write input prompt").caused_by(e))?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|e| BuildFailure::new("Failed to read input from console").caused_by(e))?;
            if read == 0 {
                return Err(BuildFailure::new("Failed to read input from console: end of input"));
            }

            let answer = line.trim();
            if answer.is_empty() {
                if let Some(default) = &request.default {
                    return Ok(default.clone());
                }
            }
            if request.is_valid(answer) {
                return Ok(answer.to_string());
            }
        }
    }
}

/// Looks answers up by prompt text in a properties file
#[derive(Debug)]
pub struct PropertyFileInputHandler {
    path: PathBuf,
    answers: Option<HashMap<String, String>>,
}

impl PropertyFileInputHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            answers: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn answers(&mut self) -> Result<&HashMap<String, String>, BuildFailure> {
        if self.answers.is_none() {
            let loaded = properties::load(&self.path).map_err(|e| {
                BuildFailure::new(format!("Couldn't load {}", self.path.display())).caused_by(e)
            })?;
            self.answers = Some(loaded);
        }
        Ok(self.answers.get_or_insert_with(HashMap::new))
    }
}

impl InputHandler for PropertyFileInputHandler {
    fn handle_input(&mut self, request: &InputRequest) -> Result<String, BuildFailure> {
        let answer = self.answers()?.get(&request.prompt).cloned();
        match answer {
            Some(answer) if request.is_valid(&answer) => Ok(answer),
            Some(answer) => Err(BuildFailure::new(format!(
                "Found invalid input {answer} for '{}'",
                request.prompt
            ))),
            None => request.default.clone().ok_or_else(|| {
                BuildFailure::new(format!(
                    "Unable to find input for '{}'",
                    request.prompt
                ))
            }),
        }
    }
}

/// Refuses every request
#[derive(Debug, Default)]
pub struct NonInteractiveInputHandler;

impl InputHandler for NonInteractiveInputHandler {
    fn handle_input(&mut self, request: &InputRequest) -> Result<String, BuildFailure> {
        match &request.default {
            Some(default) => Ok(default.clone()),
            None => Err(BuildFailure::new(format!(
                "Input requested in non-interactive mode: {}",
                request.prompt
            ))),
        }
    }
}
