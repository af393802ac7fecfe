//! @ai:module:intent Locate and execute external programs
//! @ai:module:layer infrastructure
//! @ai:module:public_api Shell, ShellOutput, SystemShell, MockShell
//! @ai:module:stateless true

use crate::error::Result;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

/// @ai:intent Captured result of one finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    /// Exit code, None when the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ShellOutput {
    /// @ai:intent Successful output carrying only stdout text
    /// @ai:effects pure
    pub fn stdout(text: &str) -> Self {
        Self {
            code: Some(0),
            stdout: text.as_bytes().to_vec(),
            stderr: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

/// @ai:intent Trait for finding and running executables
pub trait Shell: Send + Sync {
    /// @ai:intent Find an executable on the search path
    fn which(&self, program: &str) -> Option<PathBuf>;

    /// @ai:intent Run a program to completion and capture its output
    /// @ai:edge_cases arguments are passed through unchanged, including non-UTF-8 paths
    fn exec(&self, program: &Path, args: &[OsString]) -> Result<ShellOutput>;
}

/// @ai:intent Shell backed by PATH lookup and std::process
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemShell;

impl Shell for SystemShell {
    /// @ai:effects env, fs:read
    fn which(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    /// @ai:effects io
    /// @ai:edge_cases no timeout, a hung process blocks the caller
    fn exec(&self, program: &Path, args: &[OsString]) -> Result<ShellOutput> {
        let rendered: Vec<_> = args.iter().map(|arg| arg.to_string_lossy()).collect();
        tracing::debug!("Executing {} {}", program.display(), rendered.join(" "));
        let output = Command::new(program).args(args).output()?;

        Ok(ShellOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

type Handler = Box<dyn Fn(&[OsString]) -> ShellOutput + Send + Sync>;

/// @ai:intent Mock shell for testing: fixed executables, scripted responses, recorded calls
pub struct MockShell {
    executables: BTreeSet<String>,
    handler: Handler,
    calls: Mutex<Vec<Vec<OsString>>>,
}

impl MockShell {
    /// @ai:intent Create a mock where `executables` are installed and `handler` answers every exec
    /// @ai:effects pure
    pub fn new<F>(executables: &[&str], handler: F) -> Self
    where
        F: Fn(&[OsString]) -> ShellOutput + Send + Sync + 'static,
    {
        Self {
            executables: executables.iter().map(|name| name.to_string()).collect(),
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// @ai:intent Arguments of every exec call so far, in order
    pub fn calls(&self) -> Vec<Vec<OsString>> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl Shell for MockShell {
    fn which(&self, program: &str) -> Option<PathBuf> {
        self.executables
            .contains(program)
            .then(|| PathBuf::from("/usr/bin").join(program))
    }

    fn exec(&self, _program: &Path, args: &[OsString]) -> Result<ShellOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(args.to_vec());
        }
        Ok((self.handler)(args))
    }
}
