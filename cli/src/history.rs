//! Command history persistence
//!
//! Entries live one per line in ~/.querypilot/history. Multi-line statements
//! are stored with `\n` escapes and restored on load, so recalling a query
//! brings back its original layout.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{CLIError, Result};

/// History file name under the QueryPilot home directory
const HISTORY_FILE: &str = "history";

/// Persistent REPL history
pub struct CommandHistory {
    path: PathBuf,

    /// Entries kept after compaction
    max_size: usize,
}

impl CommandHistory {
    /// History at the default location
    pub fn new(max_size: usize) -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_path(home.join(".querypilot").join(HISTORY_FILE), max_size)
    }

    pub fn with_path<P: AsRef<Path>>(path: P, max_size: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_size: max_size.max(1),
        }
    }

    /// The newest `max_size` entries, oldest first
    pub fn load(&self) -> Result<Vec<String>> {
        let lines = self.read_lines()?;
        let skip = lines.len().saturating_sub(self.max_size);
        Ok(lines[skip..].iter().map(|line| decode_entry(line)).collect())
    }

    /// Append one entry. Blank input and an exact repeat of the newest entry
    /// are ignored.
    pub fn append(&self, command: &str) -> Result<()> {
        let command = command.trim();
        if command.is_empty() {
            return Ok(());
        }

        let lines = self.read_lines()?;
        let encoded = encode_entry(command);
        if lines.last() == Some(&encoded) {
            return Ok(());
        }

        if lines.len() >= self.max_size * 2 {
            let mut kept = lines;
            kept.push(encoded);
            return self.rewrite(&kept);
        }

        self.ensure_parent()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| write_error(&e))?;
        writeln!(file, "{}", encoded).map_err(|e| write_error(&e))
    }

    /// Remove the history file
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_lines(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| CLIError::HistoryError(format!("Failed to read history file: {}", e)))?;
        Ok(contents
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Keep the newest `max_size` encoded lines
    fn rewrite(&self, lines: &[String]) -> Result<()> {
        self.ensure_parent()?;
        let skip = lines.len().saturating_sub(self.max_size);
        let mut contents = lines[skip..].join("\n");
        contents.push('\n');
        std::fs::write(&self.path, contents).map_err(|e| write_error(&e))
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

fn write_error(e: &std::io::Error) -> CLIError {
    CLIError::HistoryError(format!("Failed to write history file: {}", e))
}

fn encode_entry(entry: &str) -> String {
    let mut out = String::with_capacity(entry.len());
    for c in entry.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

fn decode_entry(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    fn history_in(dir: &tempfile::TempDir, max_size: usize) -> CommandHistory {
        CommandHistory::with_path(dir.path().join("nested").join("history"), max_size)
    }

    #[test]
    fn test_multi_line_statement_is_restored() {
        let dir = tempdir().unwrap();
        let history = history_in(&dir, 50);

        history.append("SELECT route,\n       COUNT(*)\nFROM rides").unwrap();
        history.append("\\ask rides per route").unwrap();

        let raw = std::fs::read_to_string(history.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert_eq!(
            history.load().unwrap(),
            vec![
                "SELECT route,\n       COUNT(*)\nFROM rides".to_string(),
                "\\ask rides per route".to_string(),
            ]
        );
    }

    #[test]
    fn test_blank_and_repeated_entries_are_skipped() {
        let dir = tempdir().unwrap();
        let history = history_in(&dir, 50);

        history.append("\\metric rides").unwrap();
        history.append("  \\metric rides  ").unwrap();
        history.append("\n\t").unwrap();
        history.append("\\metrics").unwrap();
        history.append("\\metric rides").unwrap();

        assert_eq!(
            history.load().unwrap(),
            vec!["\\metric rides", "\\metrics", "\\metric rides"]
        );
    }

    #[test]
    fn test_load_returns_newest_entries_and_file_is_compacted() {
        let dir = tempdir().unwrap();
        let history = history_in(&dir, 3);

        for i in 1..=7 {
            history.append(&format!("SELECT {}", i)).unwrap();
        }

        assert_eq!(
            history.load().unwrap(),
            vec!["SELECT 5", "SELECT 6", "SELECT 7"]
        );
        let raw = std::fs::read_to_string(history.path()).unwrap();
        assert!(raw.lines().count() <= 6);
    }

    #[test]
    fn test_missing_file_and_clear() {
        let dir = tempdir().unwrap();
        let history = history_in(&dir, 10);
        assert!(history.load().unwrap().is_empty());
        history.clear().unwrap();

        history.append("SELECT 1").unwrap();
        assert!(history.path().exists());
        history.clear().unwrap();
        assert!(!history.path().exists());
    }

    #[test]
    fn test_backslashes_survive_encoding() {
        let entry = "SELECT 'a\\nb' AS literal\nFROM t";
        assert_eq!(decode_entry(&encode_entry(entry)), entry);
    }
}
