//! Yes/no consent for trusting a repository config
//!
//! The trust gate never touches process stdin directly; it asks through a
//! [`ConsentPrompt`]. [`TerminalConsent`] is the production implementation,
//! [`StreamConsent`] drives it from any reader/writer pair.

use std::io::{self, BufRead, IsTerminal, Write};

/// Capability to ask the operator a yes/no question
pub trait ConsentPrompt {
    /// Whether a human can answer. When false the gate rejects without asking.
    fn is_interactive(&self) -> bool;

    /// Show `message` and read one answer.
    fn ask(&mut self, message: &str) -> io::Result<bool>;
}

/// True for `y` or `yes`, ignoring case and surrounding whitespace.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Consent read line-by-line from a stream
#[derive(Debug)]
pub struct StreamConsent<R, W> {
    input: R,
    output: W,
    interactive: bool,
}

impl<R: BufRead, W: Write> StreamConsent<R, W> {
    pub fn new(input: R, output: W, interactive: bool) -> Self {
        Self {
            input,
            output,
            interactive,
        }
    }

    /// Consume the prompt and return the output stream
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> ConsentPrompt for StreamConsent<R, W> {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn ask(&mut self, message: &str) -> io::Result<bool> {
        self.output.write_all(message.as_bytes())?;
        self.output.flush()?;

        let mut line = String::new();
        // EOF reads as an empty answer, i.e. "no"
        self.input.read_line(&mut line)?;
        Ok(is_affirmative(&line))
    }
}

/// Consent on the controlling terminal: prompt on stderr, answer on stdin
pub type TerminalConsent = StreamConsent<io::StdinLock<'static>, io::Stderr>;

impl TerminalConsent {
    /// Attach to stdin/stderr; interactive only when stdin is a terminal.
    pub fn from_terminal() -> Self {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        StreamConsent::new(stdin.lock(), io::stderr(), interactive)
    }
}
