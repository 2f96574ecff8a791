use crate::models::MonthTable;
use chrono::NaiveDate;

pub type Grid = Vec<Vec<String>>;

/// Spreadsheet layout of a month: header of day numbers, one row per
/// category, and an "Overall %" footer.
pub fn month_grid(table: &MonthTable) -> Grid {
    let mut grid = Vec::with_capacity(table.rows.len() + 2);

    let mut header = vec!["Category".to_string()];
    header.extend(
        table
            .dates
            .iter()
            .map(|date| date.get(8..).unwrap_or(date).to_string()),
    );
    grid.push(header);

    for row in &table.rows {
        let mut cells = vec![format!("{} ({} {})", row.category, row.required, row.unit)];
        cells.extend(row.values.iter().map(|value| match value {
            Some(amount) => amount.to_string(),
            None => "-".to_string(),
        }));
        grid.push(cells);
    }

    let mut footer = vec!["Overall %".to_string()];
    footer.extend(table.overall.iter().map(|percent| format!("{percent}%")));
    grid.push(footer);

    grid
}

fn csv_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

pub fn to_csv(grid: &Grid) -> String {
    let mut out = String::new();
    for row in grid {
        let line: Vec<String> = row.iter().map(|cell| csv_cell(cell)).collect();
        out.push_str(&line.join(","));
        out.push_str("\r\n");
    }
    out
}

pub fn export_file_name(year: i32, month: u32) -> String {
    let month_name = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|date| date.format("%B").to_string())
        .unwrap_or_else(|| month.to_string());
    format!("Diet_History_{month_name}_{year}.csv")
}
