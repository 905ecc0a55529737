//! Terminal rendering of a parsed manifest

use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table as Grid};
use framesync_core::Table;

/// Header summary: column count followed by the column names
pub fn header_summary(table: &Table) -> String {
    format!(
        "{} column(s): {}",
        table.num_cols(),
        table.headers().join(", ")
    )
}

/// Table of all parsed rows under the manifest header
pub fn grid(table: &Table) -> Grid {
    let mut grid = Grid::new();
    grid.load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(table.headers());

    for row in table.rows() {
        grid.add_row(row);
    }
    grid
}

/// Print the header summary and the row table to stdout
pub fn print_table(table: &Table) {
    println!("{} {}", "Header:".bold(), header_summary(table));
    if table.num_rows() == 0 {
        println!("{}", "No data rows".yellow());
        return;
    }
    println!("{grid}", grid = grid(table));
    println!("{} row(s) parsed", table.num_rows());
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use framesync_core::TableReader;
    use std::io::Cursor;

    fn table(text: &str) -> Table {
        TableReader::new().read(Cursor::new(text)).unwrap()
    }

    #[test]
    fn test_header_summary() {
        let t = table("FRAMEID,MJD,TINT\nA001,59000.5,1.2\n");
        assert_eq!(header_summary(&t), "3 column(s): FRAMEID, MJD, TINT");
    }

    #[test]
    fn test_grid_contains_cells() {
        let t = table("FRAMEID,MJD\nA001,59000.5\nA002\n");
        let rendered = grid(&t).to_string();
        assert!(rendered.contains("FRAMEID"));
        assert!(rendered.contains("59000.5"));
        assert!(rendered.contains("A002"));
    }
}
