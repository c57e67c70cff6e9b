//! Presentation layer
//!
//! The game only talks to a [`Frontend`]; the console implementation reads
//! either free-text answers or numbered menu choices and re-prompts on
//! anything it cannot understand.

use crate::config::InputMode;
use crate::types::{AnswerValue, Question};
use anyhow::Result;
use std::fmt;
use std::io::{BufRead, Write};

/// The player closed the input stream
///
/// Returned wrapped in `anyhow::Error`; callers can `downcast_ref` it to
/// tell a quit apart from a real I/O failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputClosed;

impl fmt::Display for InputClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("input closed")
    }
}

impl std::error::Error for InputClosed {}

/// What the game needs from whoever is presenting it
pub trait Frontend {
    /// Present one question and return one of the four answers
    fn ask_question(&mut self, question: &Question) -> Result<AnswerValue>;

    /// Present a yes/no confirmation
    fn ask_confirmation(&mut self, prompt: &str) -> Result<bool>;

    /// Collect a free-text name (returned untrimmed)
    fn ask_name(&mut self, prompt: &str) -> Result<String>;

    fn show_message(&mut self, text: &str) -> Result<()>;
}

/// Line-oriented terminal front end
pub struct ConsoleFrontend<R, W> {
    input: R,
    output: W,
    mode: InputMode,
}

impl<R: BufRead, W: Write> ConsoleFrontend<R, W> {
    pub fn new(input: R, output: W, mode: InputMode) -> Self {
        Self {
            input,
            output,
            mode,
        }
    }

    /// Print a prompt and read one line; end of input is an error
    fn prompt(&mut self, text: &str) -> Result<String> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InputClosed.into());
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn parse_answer(&self, line: &str) -> Option<AnswerValue> {
        match self.mode {
            InputMode::Text => AnswerValue::parse_token(line),
            InputMode::Menu => line
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| AnswerValue::ALL.get(i).copied()),
        }
    }

    fn parse_confirmation(&self, line: &str) -> Option<bool> {
        match self.mode {
            InputMode::Text => match AnswerValue::parse_token(line) {
                Some(AnswerValue::Yes) => Some(true),
                Some(AnswerValue::No) => Some(false),
                _ => None,
            },
            InputMode::Menu => match line.trim() {
                "1" => Some(true),
                "2" => Some(false),
                _ => None,
            },
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: BufRead, W: Write> Frontend for ConsoleFrontend<R, W> {
    fn ask_question(&mut self, question: &Question) -> Result<AnswerValue> {
        let prompt = match self.mode {
            InputMode::Text => format!("{} ", question.text),
            InputMode::Menu => {
                let menu: Vec<String> = AnswerValue::ALL
                    .iter()
                    .enumerate()
                    .map(|(i, a)| format!("  {}. {}", i + 1, a.label()))
                    .collect();
                format!("\n{}\n{}\n> ", question.text, menu.join("\n"))
            }
        };

        loop {
            let line = self.prompt(&prompt)?;
            if let Some(answer) = self.parse_answer(&line) {
                return Ok(answer);
            }
            match self.mode {
                InputMode::Text => writeln!(
                    self.output,
                    "⚠️ Respuesta no válida. Usa: Si, No, No lo se o Probablemente."
                )?,
                InputMode::Menu => writeln!(self.output, "⚠️ Elige una opción del 1 al 4.")?,
            }
        }
    }

    fn ask_confirmation(&mut self, prompt: &str) -> Result<bool> {
        let prompt = match self.mode {
            InputMode::Text => format!("{} (Si/No) ", prompt),
            InputMode::Menu => format!("\n{}\n  1. Si\n  2. No\n> ", prompt),
        };

        loop {
            let line = self.prompt(&prompt)?;
            if let Some(yes) = self.parse_confirmation(&line) {
                return Ok(yes);
            }
            match self.mode {
                InputMode::Text => writeln!(self.output, "⚠️ Responde Si o No.")?,
                InputMode::Menu => writeln!(self.output, "⚠️ Elige 1 o 2.")?,
            }
        }
    }

    fn ask_name(&mut self, prompt: &str) -> Result<String> {
        self.prompt(&format!("{} ", prompt))
    }

    fn show_message(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }
}
