//! Interactive console for a design session.
//!
//! The session talks to the user through the [`Console`] trait: one line
//! in, lines out. The helpers below format agent output the same way
//! everywhere (`[Role] text`, status lines with a leading emoji).

use std::io::Write as _;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

/// Terminal width used when wrapping agent prose.
const WRAP_WIDTH: usize = 100;

#[async_trait]
pub trait Console: Send {
    /// Show `prompt` and read one line. `None` at end of input.
    async fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>>;

    /// Print one line.
    fn print(&mut self, line: &str);
}

/// stdin/stdout console.
pub struct Terminal {
    stdin: BufReader<Stdin>,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            stdin: BufReader::new(tokio::io::stdin()),
        }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for Terminal {
    async fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        println!("{prompt}");
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        let n = self.stdin.read_line(&mut line).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn print(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Post agent prose with a role prefix, wrapped for the terminal.
pub fn say(console: &mut dyn Console, role: &str, text: &str) {
    for line in wrap_lines(text, WRAP_WIDTH) {
        console.print(&format!("[{role}] {line}"));
    }
}

/// Post a brief one-line status update.
pub fn status(console: &mut dyn Console, role: &str, emoji: &str, text: &str) {
    console.print(&format!("[{role}] {emoji} {text}"));
}

pub fn warn(console: &mut dyn Console, role: &str, text: &str) {
    status(console, role, "⚠️", text);
}

pub fn error(console: &mut dyn Console, role: &str, text: &str) {
    status(console, role, "❌", text);
}

pub fn section(console: &mut dyn Console, title: &str) {
    console.print("");
    console.print(&format!("=== {title} ==="));
    console.print("");
}

pub fn best_practices(console: &mut dyn Console, practices: &[&str]) {
    if practices.is_empty() {
        return;
    }
    console.print("Best Practices:");
    for p in practices {
        console.print(&format!("  • {p}"));
    }
    console.print("");
}

/// Announce that control passes from one agent to another.
pub fn handoff(console: &mut dyn Console, from: &str, to: &str, blurb: &str) {
    console.print(&format!("🔄 Agent Handoff: {from} → {to}"));
    console.print(&format!("   {blurb}"));
}

/// Wrap text into lines of at most `max_len` characters, breaking on word
/// boundaries. Blank lines and short lines pass through unchanged.
fn wrap_lines(text: &str, max_len: usize) -> Vec<String> {
    let mut result = Vec::new();
    for line in text.lines() {
        if line.chars().count() <= max_len {
            result.push(line.to_string());
            continue;
        }
        let mut current = String::new();
        for word in line.split_whitespace() {
            if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_len {
                result.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            result.push(current);
        }
    }
    result
}
