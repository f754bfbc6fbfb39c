//! Interactive questions
//!
//! A [Prompter] asks one typed question at a time and only returns once the operator gave an
//! acceptable answer: free text is checked by the question validator, choices and yes/no
//! answers are parsed, and anything invalid is asked again.

use std::io::{self, BufRead, IsTerminal, StdinLock, Stdout, Write};

use tracing::{debug, trace};

/// Validates a free text answer, the error message is shown before asking again
pub type Validator = fn(&str) -> Result<(), String>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The prompts need a terminal on both stdin and stdout
    #[error("Prompt could not be rendered in the current environment")]
    NonInteractive,

    /// The input ended while a question was pending
    #[error("Input closed before the question was answered")]
    Closed,

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct TextQuestion {
    pub message: String,
    pub default: Option<String>,
    pub validate: Option<Validator>,
}

impl TextQuestion {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            default: None,
            validate: None,
        }
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validate = Some(validator);
        self
    }
}

/// Pick one of a list of labels, answered with the index of the choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuestion {
    pub message: String,
    pub choices: Vec<String>,
    pub default: usize,
}

impl SelectQuestion {
    pub fn new<I, S>(message: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            message: message.into(),
            choices: choices.into_iter().map(Into::into).collect(),
            default: 0,
        }
    }

    pub fn default(mut self, index: usize) -> Self {
        self.default = index;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmQuestion {
    pub message: String,
    pub default: bool,
}

impl ConfirmQuestion {
    pub fn new(message: impl Into<String>, default: bool) -> Self {
        Self {
            message: message.into(),
            default,
        }
    }
}

/// A blocking source of answers
pub trait Prompter {
    fn text(&mut self, question: &TextQuestion) -> Result<String, Error>;

    fn select(&mut self, question: &SelectQuestion) -> Result<usize, Error>;

    fn confirm(&mut self, question: &ConfirmQuestion) -> Result<bool, Error>;

    /// Show an informational line to the operator
    fn say(&mut self, message: &str) -> Result<(), Error>;

    /// Ask `question` until `parse` accepts the answer
    fn parse<T>(
        &mut self,
        question: &TextQuestion,
        parse: fn(&str) -> Result<T, String>,
    ) -> Result<T, Error>
    where
        Self: Sized,
    {
        loop {
            let answer = self.text(question)?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(message) => self.say(&format!(">> {message}"))?,
            }
        }
    }
}

/// A line oriented [Prompter] reading answers from `R` and writing questions to `W`
#[derive(Debug)]
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<StdinLock<'static>, Stdout> {
    /// Prompt on the process terminal
    ///
    /// Fails with [Error::NonInteractive] when stdin or stdout is not a terminal.
    pub fn stdio() -> Result<Self, Error> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        if !(stdin.is_terminal() && stdout.is_terminal()) {
            return Err(Error::NonInteractive);
        }

        Ok(Self::new(stdin.lock(), stdout))
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_answer(&mut self) -> Result<String, Error> {
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::Closed);
        }
        let answer = line.trim_end_matches(['\r', '\n']).to_owned();
        trace!(%answer, "read answer");
        Ok(answer)
    }

    fn complain(&mut self, message: &str) -> Result<(), Error> {
        writeln!(self.output, ">> {message}")?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn text(&mut self, question: &TextQuestion) -> Result<String, Error> {
        debug!(message = %question.message, "asking text question");
        loop {
            match &question.default {
                Some(default) => write!(self.output, "? {} ({default}) ", question.message)?,
                None => write!(self.output, "? {} ", question.message)?,
            }

            let answer = match (self.read_answer()?, &question.default) {
                (answer, Some(default)) if answer.is_empty() => default.clone(),
                (answer, _) => answer,
            };

            match question.validate.map_or(Ok(()), |validate| validate(&answer)) {
                Ok(()) => return Ok(answer),
                Err(message) => self.complain(&message)?,
            }
        }
    }

    fn select(&mut self, question: &SelectQuestion) -> Result<usize, Error> {
        debug!(message = %question.message, "asking select question");
        let count = question.choices.len();
        loop {
            writeln!(self.output, "? {}", question.message)?;
            for (index, choice) in question.choices.iter().enumerate() {
                let marker = if index == question.default { '>' } else { ' ' };
                writeln!(self.output, " {marker} {}) {choice}", index + 1)?;
            }
            write!(
                self.output,
                "  Answer [1-{count}] (default {}): ",
                question.default + 1
            )?;

            let answer = self.read_answer()?;
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(question.default);
            }

            let picked = answer
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .filter(|&index| index < count)
                .or_else(|| {
                    question
                        .choices
                        .iter()
                        .position(|choice| choice.eq_ignore_ascii_case(answer))
                });

            match picked {
                Some(index) => return Ok(index),
                None => self.complain(&format!("Please enter a number between 1 and {count}"))?,
            }
        }
    }

    fn confirm(&mut self, question: &ConfirmQuestion) -> Result<bool, Error> {
        debug!(message = %question.message, "asking confirm question");
        let hint = if question.default { "Y/n" } else { "y/N" };
        loop {
            write!(self.output, "? {} ({hint}) ", question.message)?;

            let answer = self.read_answer()?.trim().to_lowercase();
            match answer.as_str() {
                "" => return Ok(question.default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.complain("Please answer yes or no")?,
            }
        }
    }

    fn say(&mut self, message: &str) -> Result<(), Error> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }
}

/// Rejects blank answers with `message`
pub fn required(answer: &str, message: &str) -> Result<(), String> {
    if answer.trim().is_empty() {
        Err(message.to_owned())
    } else {
        Ok(())
    }
}
