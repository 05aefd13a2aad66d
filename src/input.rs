//! Line input for the interactive session
//!
//! A terminal session reads through a rustyline editor, which gives line
//! editing and in-session history. Piped input and test scripts read plain
//! lines from any `BufRead`.

use std::io::{self, BufRead, Write};

use log::debug;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// A source of answers to prompts
pub trait LineSource {
    /// Show `prompt` and read one trimmed line
    ///
    /// Returns `None` once input is closed or interrupted. Text the session
    /// has written to `output` is flushed before the prompt is shown.
    fn read_line(&mut self, prompt: &str, output: &mut dyn Write) -> io::Result<Option<String>>;
}

/// Lines read from a buffered reader, with prompts echoed to the output
pub struct Scripted<R> {
    reader: R,
}

impl<R: BufRead> Scripted<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for Scripted<R> {
    fn read_line(&mut self, prompt: &str, output: &mut dyn Write) -> io::Result<Option<String>> {
        write!(output, "{}", prompt)?;
        output.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Interactive terminal input through rustyline
pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for Terminal {
    fn read_line(&mut self, prompt: &str, output: &mut dyn Write) -> io::Result<Option<String>> {
        output.flush()?;

        match self.editor.readline(prompt) {
            Ok(line) => {
                let line = line.trim().to_string();
                if !line.is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                debug!("Terminal input closed at prompt {:?}", prompt);
                Ok(None)
            }
            Err(ReadlineError::Io(err)) => Err(err),
            Err(err) => Err(io::Error::new(io::ErrorKind::Other, err.to_string())),
        }
    }
}
