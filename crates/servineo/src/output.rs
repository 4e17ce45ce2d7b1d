// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal output mode shared by every subcommand.

use std::io::IsTerminal;

use colored::Colorize;
use serde::Serialize;
use servineo_core::ServineoError;

/// How command results are printed.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
    color: bool,
}

impl Output {
    /// Colors are used only when `--plain` is absent and stdout is a TTY.
    pub fn new(json: bool, plain: bool) -> Self {
        Self {
            json,
            color: !plain && std::io::stdout().is_terminal(),
        }
    }

    /// Prints `value` as pretty JSON.
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), ServineoError> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| ServineoError::Internal(format!("failed to serialize output: {e}")))?;
        println!("{text}");
        Ok(())
    }

    pub fn heading(&self, title: &str) {
        println!();
        println!("  {title}");
        println!("  {}", "-".repeat(35));
    }

    /// A success marker followed by `text`.
    pub fn ok(&self, text: &str) -> String {
        if self.color {
            format!("{} {}", "✓".green(), text.green())
        } else {
            format!("[OK] {text}")
        }
    }

    /// A failure marker followed by `text`.
    pub fn fail(&self, text: &str) -> String {
        if self.color {
            format!("{} {}", "✗".red(), text.red())
        } else {
            format!("[FAIL] {text}")
        }
    }

    pub fn warn(&self, text: &str) -> String {
        if self.color {
            format!("{} {}", "!".yellow(), text.yellow())
        } else {
            format!("[WARN] {text}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_markers_have_no_escape_codes() {
        let out = Output::new(false, true);
        assert_eq!(out.ok("enviada"), "[OK] enviada");
        assert_eq!(out.fail("fallida"), "[FAIL] fallida");
        assert_eq!(out.warn("duplicada"), "[WARN] duplicada");
    }
}
