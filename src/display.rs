use std::fs;
use std::path::Path;
use chrono::Local;
use crate::error::SinkError;
use crate::rebalance::{Allocation, MoveRecord, Outcome};

/// Field delimiter of the serialized move line format
pub const DEFAULT_DELIMITER: &str = ",";

/// Serialized move list, or the signal that there was nothing to serialize
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formatted {
    Empty,
    Lines(String),
}

impl Formatted {
    pub fn is_empty(&self) -> bool {
        matches!(self, Formatted::Empty)
    }

    /// The serialized text; empty string when there were no moves
    pub fn text(&self) -> &str {
        match self {
            Formatted::Empty => "",
            Formatted::Lines(text) => text,
        }
    }
}

/// Formats moves as `sku,source,dest,amount` lines, newline-joined, no trailing newline
pub fn format_moves(moves: &[MoveRecord]) -> Formatted {
    format_moves_with(moves, DEFAULT_DELIMITER)
}

pub fn format_moves_with(moves: &[MoveRecord], delimiter: &str) -> Formatted {
    if moves.is_empty() {
        return Formatted::Empty;
    }
    let lines: Vec<String> = moves.iter().map(|m| m.to_line(delimiter)).collect();
    Formatted::Lines(lines.join("\n"))
}

/// Writes the serialized move list to a file, exactly as it would go to the clipboard
pub fn write_moves_to_file(moves: &[MoveRecord], delimiter: &str, path: &Path) -> Result<(), SinkError> {
    let formatted = format_moves_with(moves, delimiter);
    fs::write(path, formatted.text()).map_err(|source| SinkError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// Prints an allocation in a readable format
pub fn print_plan(sku: &str, allocation: &Allocation, delimiter: &str) {
    let outcome = allocation.outcome();
    println!("\n=== Rebalance plan for SKU {} ({}) ===", sku, Local::now().format("%Y-%m-%d %H:%M"));
    println!("Shortfalls: {}", allocation.deficits.len());

    for status in &allocation.deficits {
        let marker = if status.resolved { "ok" } else { "SHORT" };
        println!(
            "  [{}] {} needs {} (still short {})",
            marker, status.slot_name, status.requested, status.remaining
        );
    }

    match format_moves_with(&allocation.moves, delimiter) {
        Formatted::Empty => println!("\nNo moves."),
        Formatted::Lines(text) => {
            println!("\nMoves ({} units total):", allocation.total_moved());
            for line in text.lines() {
                println!("  {}", line);
            }
        }
    }

    let icon = match outcome {
        Outcome::Resolved => "✅",
        Outcome::NoMoves => "ℹ️ ",
        Outcome::Partial => "⚠️ ",
        Outcome::Unresolved => "❌",
    };
    println!("\n{} {}", icon, outcome.notification());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_moves_lines() {
        let moves = vec![
            MoveRecord::new("123", "X", "A", 3),
            MoveRecord::new("123", "Y", "A", 2),
        ];
        let formatted = format_moves(&moves);
        assert_eq!(formatted, Formatted::Lines("123,X,A,3\n123,Y,A,2".to_string()));
        assert!(!formatted.text().ends_with('\n'));
    }

    #[test]
    fn test_format_moves_empty() {
        let formatted = format_moves(&[]);
        assert!(formatted.is_empty());
        assert_eq!(formatted.text(), "");
    }

    #[test]
    fn test_format_with_custom_delimiter() {
        let moves = vec![MoveRecord::new("9", "S", "D", 1)];
        assert_eq!(format_moves_with(&moves, ";").text(), "9;S;D;1");
    }

    #[test]
    fn test_write_moves_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moves.txt");
        let moves = vec![
            MoveRecord::new("7", "CAMP0000", "P1", 7),
            MoveRecord::new("7", "FISH0000", "P1", 2),
        ];
        write_moves_to_file(&moves, DEFAULT_DELIMITER, &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "7,CAMP0000,P1,7\n7,FISH0000,P1,2");
    }
}
