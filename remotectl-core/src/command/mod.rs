//! Remote command lines and their results
//!
//! A [`CommandLine`] is a template plus arguments. Every argument is
//! shell-quoted before it is substituted, so callers never build command
//! strings by hand:
//!
//! ```
//! use remotectl_core::command::CommandLine;
//!
//! let line = CommandLine::new("echo {}").arg("hello  world");
//! assert_eq!(line.render().unwrap(), "echo 'hello  world'");
//! ```

mod runner;

use std::borrow::Cow;
use std::fmt;

use crate::error::{RemoteError, RemoteResult};
use crate::transport::ExecOutput;

pub use runner::CommandRunner;

/// Quotes one value for a POSIX shell.
///
/// Values made only of safe characters are returned unchanged.
#[must_use]
pub fn quote(value: &str) -> Cow<'_, str> {
    shell_escape::unix::escape(Cow::Borrowed(value))
}

/// A command template with positional and named arguments
///
/// Placeholders: `{}` takes the next positional argument, `{N}` positional
/// argument `N`, `{name}` a named argument. `{{` and `}}` are literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    template: String,
    positional: Vec<String>,
    named: Vec<(String, String)>,
}

impl CommandLine {
    /// Creates a command line without arguments
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            positional: Vec::new(),
            named: Vec::new(),
        }
    }

    /// Appends a positional argument
    #[must_use]
    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.positional.push(value.to_string());
        self
    }

    /// Sets a named argument, replacing an earlier value of the same name
    #[must_use]
    pub fn named(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        let name = name.into();
        let value = value.to_string();
        match self.named.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.named.push((name, value)),
        }
        self
    }

    /// The unformatted template
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitutes the quoted arguments into the template
    pub fn render(&self) -> RemoteResult<String> {
        let mut out = String::with_capacity(self.template.len());
        let mut next_positional = 0;
        let mut chars = self.template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let mut key = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(k) => key.push(k),
                            None => return Err(self.bad_template()),
                        }
                    }
                    let value = self.lookup(&key, &mut next_positional)?;
                    out.push_str(&quote(value));
                }
                '}' => return Err(self.bad_template()),
                other => out.push(other),
            }
        }
        Ok(out)
    }

    fn lookup(&self, key: &str, next_positional: &mut usize) -> RemoteResult<&str> {
        let found = if key.is_empty() {
            let index = *next_positional;
            *next_positional += 1;
            self.positional.get(index)
        } else if let Ok(index) = key.parse::<usize>() {
            self.positional.get(index)
        } else {
            self.named.iter().find(|(n, _)| n == key).map(|(_, v)| v)
        };
        found.map(String::as_str).ok_or_else(|| self.bad_template())
    }

    fn bad_template(&self) -> RemoteError {
        RemoteError::format("command", self.template.clone())
    }
}

impl From<&str> for CommandLine {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

impl From<String> for CommandLine {
    fn from(template: String) -> Self {
        Self::new(template)
    }
}

/// Completed remote command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Rendered command line
    pub command: String,
    /// Standard output, trailing newlines removed
    pub stdout: String,
    /// Standard error, trailing newlines removed
    pub stderr: String,
    /// Exit status reported by the remote host
    pub exit_code: i32,
}

impl CommandResult {
    /// Builds a result from raw transport output and a known exit code
    #[must_use]
    pub fn new(command: impl Into<String>, output: &ExecOutput, exit_code: i32) -> Self {
        Self {
            command: command.into(),
            stdout: decode(&output.stdout),
            stderr: decode(&output.stderr),
            exit_code,
        }
    }

    /// Returns the result if its exit code is one of `expected`
    pub fn check(self, expected: &[i32]) -> RemoteResult<Self> {
        if expected.contains(&self.exit_code) {
            Ok(self)
        } else {
            Err(RemoteError::ExitCode(self.exit_code))
        }
    }

    /// True when the command exited with 0
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\n')
        .to_string()
}
