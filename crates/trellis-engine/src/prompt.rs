//! The interactive prompt seam.
//!
//! The engine never talks to a terminal directly: it asks a
//! [`PromptSource`] for one line at a time, passing the rendered prompt
//! text along. Sentinel inputs (help, cancel, skip) are classified by the
//! source so the engine only deals in [`PromptLine`] values.

use std::collections::VecDeque;
use std::io;

#[cfg(test)]
use mockall::automock;

/// One classified line from the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptLine {
    /// Ordinary input; may be empty.
    Text(String),
    /// Request for full help on the current node.
    HelpFull,
    /// Request for brief help on the current node.
    HelpBrief,
    /// Abort the whole top-level operation.
    Cancel,
    /// Omit the current optional node.
    Skip,
}

impl PromptLine {
    /// Convenience constructor for text input.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// Supplier of interactive input lines.
///
/// Reading blocks the engine thread; there is never more than one read
/// in flight. Implementations classify the raw line into sentinels before
/// returning.
#[cfg_attr(test, automock)]
pub trait PromptSource {
    /// Reads one line, displaying `prompt` to the operator first.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] when the underlying input stream fails or
    /// closes.
    fn read_line(&mut self, prompt: &str) -> io::Result<PromptLine>;
}

/// A scripted prompt source for tests and non-interactive replay.
///
/// Lines are served in order; reading past the script's end is reported
/// as an unexpected end-of-input error so a test that under-provisions
/// its script fails loudly instead of hanging.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    lines: VecDeque<PromptLine>,
    prompts_seen: Vec<String>,
}

impl ScriptedPrompt {
    /// Creates a script from a sequence of lines.
    #[must_use]
    pub fn new(lines: impl IntoIterator<Item = PromptLine>) -> Self {
        Self {
            lines: lines.into_iter().collect(),
            prompts_seen: Vec::new(),
        }
    }

    /// Creates a script of plain text lines.
    #[must_use]
    pub fn of_text<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self::new(lines.into_iter().map(|line| PromptLine::Text(line.into())))
    }

    /// The prompts rendered so far, for asserting interaction order.
    #[must_use]
    pub fn prompts_seen(&self) -> &[String] {
        &self.prompts_seen
    }

    /// How many scripted lines were consumed.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.prompts_seen.len()
    }

    /// Whether the script still holds unread lines.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.lines.is_empty()
    }
}

impl PromptSource for ScriptedPrompt {
    fn read_line(&mut self, prompt: &str) -> io::Result<PromptLine> {
        self.prompts_seen.push(prompt.to_owned());
        self.lines.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("prompt script exhausted at: {prompt}"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_lines_in_order_and_records_prompts() {
        let mut prompt = ScriptedPrompt::of_text(["42", "hello"]);
        assert_eq!(
            prompt.read_line("first?").expect("line"),
            PromptLine::text("42")
        );
        assert_eq!(
            prompt.read_line("second?").expect("line"),
            PromptLine::text("hello")
        );
        assert_eq!(prompt.prompts_seen(), &["first?", "second?"]);
        assert!(prompt.is_exhausted());
    }

    #[test]
    fn exhaustion_is_an_error_not_a_hang() {
        let mut prompt = ScriptedPrompt::default();
        let error = prompt.read_line("anything?").expect_err("script is empty");
        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
    }
}
