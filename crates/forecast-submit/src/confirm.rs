//! Confirmation prompt before an upload.

use std::io::{BufRead, Write};

pub const CONFIRM_PROMPT: &str = "Forecast file is valid, ready to submit? (yes/no): ";

/// Asks whether to go ahead with an upload.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> std::io::Result<bool>;
}

/// Only an exact (case-insensitive) "yes" proceeds.
pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

/// Prompts on a writer and reads one line of answer.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompt<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Prompt on stderr, answer on stdin.
    pub fn terminal() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<R, W> {
    fn confirm(&mut self, prompt: &str) -> std::io::Result<bool> {
        self.output.write_all(prompt.as_bytes())?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(is_yes(&answer))
    }
}

/// Fixed answer, for non-interactive runs.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> std::io::Result<bool> {
        Ok(self.0)
    }
}
