//! External code formatter invocation.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{GenerateError, Result};

/// A formatter command line; the file to format is appended as the last
/// argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    program: String,
    args: Vec<String>,
}

impl Formatter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `rustfmt --edition 2024`.
    pub fn rustfmt() -> Self {
        Self::new("rustfmt", vec!["--edition".into(), "2024".into()])
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Formats `path` in place, blocking until the formatter exits.
    ///
    /// # Errors
    ///
    /// Returns [`FormatterSpawn`](GenerateError::FormatterSpawn) if the
    /// program cannot be started and
    /// [`FormatterFailed`](GenerateError::FormatterFailed) if it exits
    /// unsuccessfully.
    pub fn format_file(&self, path: &Path) -> Result<()> {
        debug!(program = %self.program, path = %path.display(), "Running formatter");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| GenerateError::FormatterSpawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GenerateError::FormatterFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::rustfmt()
    }
}
