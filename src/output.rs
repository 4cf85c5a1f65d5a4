use std::fmt::Write as _;
use std::io::Write;

use custody::Notification;
use serde::Serialize;

use crate::error::CliError;

/// Renders command results as JSON lines or as plain text.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Write `value` as one JSON line, or whatever `human` renders.
    pub fn emit<W, T, F>(&self, writer: &mut W, value: &T, human: F) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + ?Sized,
        F: FnOnce(&mut String),
    {
        let mut buf = String::new();
        if self.json {
            buf.push_str(&serde_json::to_string(value)?);
        } else {
            human(&mut buf);
        }
        if !buf.ends_with('\n') {
            buf.push('\n');
        }
        writer.write_all(buf.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Convenience for `emit` on stdout.
    pub fn print<T, F>(&self, value: &T, human: F) -> Result<(), CliError>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&mut String),
    {
        self.emit(&mut std::io::stdout().lock(), value, human)
    }
}

/// One `[kind] message` line per notification.
pub fn write_notifications<W: Write>(
    writer: &mut W,
    notifications: &[Notification],
) -> std::io::Result<()> {
    let mut buf = String::new();
    for n in notifications {
        let _ = writeln!(buf, "[{}] {}", n.kind, n.message);
    }
    writer.write_all(buf.as_bytes())?;
    writer.flush()
}

/// Append `key: value` padded to a fixed column.
pub fn field(buf: &mut String, key: &str, value: impl std::fmt::Display) {
    let _ = writeln!(buf, "{:<18}{}", format!("{key}:"), value);
}
