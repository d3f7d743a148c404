use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use colmerge_cli::pipeline::{RunResult, TableSummary};

pub fn print_summary(result: &RunResult) {
    if result.written {
        println!("Output: {}", result.output_path.display());
    } else {
        println!("Output: {} (dry run, not written)", result.output_path.display());
    }
    println!("Identifier: {}", result.merged.id_column);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Path"),
        header_cell("Raw rows"),
        header_cell("Deleted"),
        header_cell("Rows"),
        header_cell("Columns"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);

    for summary in &result.tables {
        table.add_row(vec![
            file_cell(summary),
            Cell::new(summary.path.display()),
            Cell::new(summary.raw_rows),
            count_cell(summary.deleted_rows, Color::Yellow),
            Cell::new(summary.rows),
            columns_cell(summary.columns.as_deref()),
        ]);
    }
    table.add_row(vec![
        Cell::new("MERGED")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(result.merged.height()).add_attribute(Attribute::Bold),
        Cell::new(format!("{} columns", result.merged.width())).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn file_cell(summary: &TableSummary) -> Cell {
    if summary.columns.is_some() {
        Cell::new(&summary.file)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new(&summary.file).fg(Color::DarkGrey)
    }
}

fn columns_cell(columns: Option<&[String]>) -> Cell {
    match columns {
        Some([]) => dim_cell("(identifier only)"),
        Some(columns) => Cell::new(columns.join(", ")),
        None => dim_cell("not merged"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
