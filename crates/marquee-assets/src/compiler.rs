//! External compiler invocation.
//!
//! Compilers are plain executables: source text goes in on stdin (or is
//! named on the command line) and compiled text comes back on stdout.
//! Calls block the current thread until the process exits; there is no
//! timeout.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Error returned when a compiler cannot be run or exits unsuccessfully.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The process could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The process ran but exited with a non-zero status.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        /// Exit status as reported by the OS (`exit status: 1`, `signal: 9`, ...).
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}

/// A compiler executable plus its fixed arguments.
#[derive(Debug, Clone)]
pub struct ExternalCompiler {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalCompiler {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// LESS compiler reading its source from stdin (`lessc -`).
    #[must_use]
    pub fn lessc(program: impl Into<PathBuf>) -> Self {
        Self::new(program).arg("-")
    }

    /// JST packager compiling every template in `jst_dir` with underscore syntax.
    #[must_use]
    pub fn jst(program: impl Into<PathBuf>, jst_dir: &Path) -> Self {
        Self::new(program)
            .arg("--template")
            .arg("underscore")
            .arg(jst_dir.to_string_lossy())
    }

    /// Display name used in logs and errors.
    #[must_use]
    pub fn program(&self) -> String {
        self.program.display().to_string()
    }

    /// Run the compiler and return its stdout.
    ///
    /// `input`, when given, is written to the child's stdin; otherwise stdin
    /// is closed immediately.
    pub fn run(&self, input: Option<&[u8]>) -> Result<String, CompileError> {
        let program = self.program();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CompileError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        // Feed stdin from a second thread so a chatty compiler cannot
        // deadlock on a full stdout pipe.
        let output = std::thread::scope(|scope| {
            if let (Some(mut stdin), Some(input)) = (stdin, input) {
                scope.spawn(move || {
                    if let Err(e) = stdin.write_all(input) {
                        tracing::debug!(error = %e, "Compiler closed stdin early");
                    }
                });
            }
            child.wait_with_output()
        })
        .map_err(|source| CompileError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();

        if !output.status.success() {
            return Err(CompileError::Failed {
                program,
                status: output.status.to_string(),
                stderr,
            });
        }

        if !stderr.is_empty() {
            tracing::warn!(program = %program, stderr = %stderr, "Compiler wrote to stderr");
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
