//! Session: drives a machine over a stream of settings and message lines.
//!
//! The first non-empty line must be a settings line. Later settings lines
//! reconfigure the same machine; every other line is a message whose
//! whitespace is dropped before conversion. Converted messages are written
//! in groups of five symbols.

use std::io::{BufRead, Write};

use crate::config::Settings;
use crate::error::{EnigmaError, SessionError};
use crate::machine::Machine;

/// Symbols per output group.
pub const GROUP_WIDTH: usize = 5;

/// Splits `msg` into blocks of `width` symbols separated by single spaces.
/// Whitespace in `msg` is ignored and the last block may be shorter.
///
/// # Examples
///
/// ```
/// use enigma::session::format_groups;
///
/// assert_eq!(format_groups("QVPQSOKOILPUBKJZPISFXDW", 5), "QVPQS OKOIL PUBKJ ZPISF XDW");
/// assert_eq!(format_groups("", 5), "");
/// ```
pub fn format_groups(msg: &str, width: usize) -> String {
    let symbols: Vec<char> = msg.chars().filter(|c| !c.is_whitespace()).collect();
    symbols
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Line-oriented driver around a [`Machine`].
#[derive(Debug)]
pub struct Session {
    machine: Machine,
}

impl Session {
    /// Wraps `machine`; its rotors are inserted by the first settings line.
    pub fn new(machine: Machine) -> Self {
        Session { machine }
    }

    /// Returns the driven machine.
    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Consumes the session and returns its machine.
    pub fn into_machine(self) -> Machine {
        self.machine
    }

    /// Processes every line of `input`, writing converted messages to
    /// `output`. When `trace` is given, one line per converted symbol is
    /// written to it (see [`SignalTrace`](crate::SignalTrace)).
    ///
    /// # Errors
    /// Returns [`SessionError::Enigma`] if the input does not start with a
    /// settings line, a settings line is invalid, or a message contains a
    /// symbol outside the alphabet; [`SessionError::Io`] if reading or
    /// writing fails.
    pub fn run<R, W>(
        &mut self,
        input: R,
        output: &mut W,
        mut trace: Option<&mut (dyn Write + '_)>,
    ) -> Result<(), SessionError>
    where
        R: BufRead,
        W: Write + ?Sized,
    {
        let mut configured = false;
        for (lineno, line) in input.lines().enumerate() {
            let line = line?;
            if Settings::is_settings_line(&line) {
                let settings = Settings::parse(&line, self.machine.num_rotors())?;
                settings.apply(&mut self.machine)?;
                tracing::debug!(line = lineno + 1, window = %self.machine.window(), "configured machine");
                configured = true;
                continue;
            }
            if !configured {
                if line.trim().is_empty() {
                    continue;
                }
                return Err(EnigmaError::config(format!(
                    "input must start with a settings line, found \"{}\"",
                    line.trim()
                ))
                .into());
            }
            let converted = self.convert_line(&line, trace.as_deref_mut())?;
            writeln!(output, "{}", format_groups(&converted, GROUP_WIDTH))?;
        }
        output.flush()?;
        Ok(())
    }

    /// Converts one message line, ignoring its whitespace.
    fn convert_line<'t>(
        &mut self,
        line: &str,
        trace: Option<&mut (dyn Write + 't)>,
    ) -> Result<String, SessionError> {
        let message: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        match trace {
            None => Ok(self.machine.convert_message(&message)?),
            Some(sink) => {
                let alphabet = self.machine.alphabet().clone();
                let mut result = String::with_capacity(message.len());
                for ch in message.chars() {
                    let (out, signal) = self.machine.convert_traced(alphabet.to_int(ch)?)?;
                    writeln!(sink, "{}", signal)?;
                    result.push(alphabet.to_char(out));
                }
                Ok(result)
            }
        }
    }
}
