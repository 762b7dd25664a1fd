#![allow(dead_code)]

use colored::Colorize;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Colorize a stack or resource status string for display
pub fn colored_status(status: &str) -> String {
    if status.ends_with("_FAILED") || status.starts_with("ROLLBACK") {
        status.red().bold().to_string()
    } else if status.ends_with("_IN_PROGRESS") {
        status.yellow().to_string()
    } else if status.ends_with("_COMPLETE") {
        status.green().to_string()
    } else {
        status.to_string()
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Print titles and rows as aligned columns
pub fn print_table(titles: &[String], rows: &[Vec<String>]) {
    let widths = column_widths(titles, rows);
    println!("{}", format_row(titles, &widths).bold());
    for row in rows {
        println!("{}", format_row(row, &widths));
    }
}

/// Print one row without alignment (used while streaming poll output)
pub fn print_row(cells: &[String]) {
    println!("{}", cells.join("  "));
}

fn column_widths(titles: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = titles.iter().map(String::len).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() && cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }
    widths
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let width = widths.get(i).copied().unwrap_or(cell.len());
            format!("{cell:<width$}")
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Vec<String>> {
        vec![
            vec!["web".to_string(), "CREATE_COMPLETE".to_string()],
            vec!["database-prod".to_string(), "UPDATE_IN_PROGRESS".to_string()],
        ]
    }

    #[test]
    fn test_column_widths_cover_titles_and_cells() {
        let titles = vec!["Stack Name".to_string(), "Status".to_string()];
        let widths = column_widths(&titles, &rows());
        assert_eq!(
            widths,
            vec!["database-prod".len(), "UPDATE_IN_PROGRESS".len()]
        );
    }

    #[test]
    fn test_format_row_pads_columns() {
        let titles = vec!["Stack Name".to_string(), "Status".to_string()];
        let widths = column_widths(&titles, &rows());
        let line = format_row(&rows()[0], &widths);
        assert!(line.starts_with("web "));
        assert!(line.contains("  CREATE_COMPLETE"));
    }

    #[test]
    fn test_format_row_trims_trailing_padding() {
        let widths = vec![10, 10];
        let line = format_row(&["a".to_string(), "b".to_string()], &widths);
        assert_eq!(line, "a           b");
    }
}
