//! System clipboard transfer for exported documents.
//!
//! Shells out to the platform clipboard tools, trying each candidate in order:
//! - macOS: `pbcopy` / `pbpaste`
//! - Linux: `xclip`, then `xsel`
//! - Windows: `clip` / PowerShell `Get-Clipboard`

use crate::error::{FilterzError, Result};
use std::io::Write;
use std::process::{Command, Stdio};

type Candidate = (&'static str, &'static [&'static str]);

#[cfg(target_os = "macos")]
const COPY_COMMANDS: &[Candidate] = &[("pbcopy", &[])];
#[cfg(target_os = "macos")]
const PASTE_COMMANDS: &[Candidate] = &[("pbpaste", &[])];

#[cfg(target_os = "linux")]
const COPY_COMMANDS: &[Candidate] = &[
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];
#[cfg(target_os = "linux")]
const PASTE_COMMANDS: &[Candidate] = &[
    ("xclip", &["-selection", "clipboard", "-o"]),
    ("xsel", &["--clipboard", "--output"]),
];

#[cfg(target_os = "windows")]
const COPY_COMMANDS: &[Candidate] = &[("clip", &[])];
#[cfg(target_os = "windows")]
const PASTE_COMMANDS: &[Candidate] = &[("powershell", &["-NoProfile", "-Command", "Get-Clipboard"])];

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
const COPY_COMMANDS: &[Candidate] = &[];
#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
const PASTE_COMMANDS: &[Candidate] = &[];

/// Copies text to the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut last_error = unsupported();
    for (program, args) in COPY_COMMANDS {
        match pipe_into(program, args, text) {
            Ok(()) => return Ok(()),
            Err(e) => last_error = e,
        }
    }
    Err(last_error)
}

/// Reads the current clipboard contents as text.
pub fn get_from_clipboard() -> Result<String> {
    let mut last_error = unsupported();
    for (program, args) in PASTE_COMMANDS {
        match read_from(program, args) {
            Ok(text) => return Ok(text),
            Err(e) => last_error = e,
        }
    }
    Err(last_error)
}

fn unsupported() -> FilterzError {
    FilterzError::Clipboard("Clipboard not supported on this platform".to_string())
}

fn pipe_into(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| FilterzError::Clipboard(format!("Failed to spawn {}: {}", program, e)))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).map_err(|e| {
            FilterzError::Clipboard(format!("Failed to write to {}: {}", program, e))
        })?;
    }

    let status = child
        .wait()
        .map_err(|e| FilterzError::Clipboard(format!("Failed to wait for {}: {}", program, e)))?;

    if status.success() {
        Ok(())
    } else {
        Err(FilterzError::Clipboard(format!("{} exited with error", program)))
    }
}

fn read_from(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| FilterzError::Clipboard(format!("Failed to execute {}: {}", program, e)))?;

    if !output.status.success() {
        return Err(FilterzError::Clipboard(format!(
            "{} exited with error",
            program
        )));
    }
    String::from_utf8(output.stdout)
        .map_err(|e| FilterzError::Clipboard(format!("Invalid UTF-8 in clipboard: {}", e)))
}
