//! Text rendering of command results.

use comfy_table::{Cell, ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use crate::{
    catalog::TableListing,
    db::{
        database::{DeleteOutcome, DropOutcome, InsertOutcome, TableInfo, UpdateOutcome},
        table::{column_def::ColumnDef, document::TableDocument, schema::Schema},
    },
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS);
    table
}

/// Renders rows as a grid with one header cell per column.
pub fn rows(document: &TableDocument) -> String {
    let mut table = new_table();
    table.set_header(document.column_names().map(Cell::new));

    for row in document.rows() {
        table.add_row(row.values().map(|v| Cell::new(v.to_string())));
    }

    let count = document.row_count();
    let noun = if count == 1 { "row" } else { "rows" };
    format!("{table}\n({count} {noun})")
}

pub fn created(table: &str, schema: &Schema) -> String {
    format!("Created table `{table}` ({})", column_list(&schema.columns))
}

pub fn dropped(outcome: &DropOutcome) -> String {
    format!("Dropped table `{}`", outcome.table)
}

pub fn inserted(outcome: &InsertOutcome) -> String {
    format!("Inserted row {} into `{}`", outcome.id, outcome.table)
}

pub fn updated(outcome: &UpdateOutcome) -> String {
    match outcome.updated_id {
        Some(id) => format!("Updated row {id} in `{}`", outcome.table),
        None => format!("No rows updated in `{}`", outcome.table),
    }
}

pub fn deleted(outcome: &DeleteOutcome) -> String {
    if outcome.deleted_ids.is_empty() {
        return format!("No rows deleted from `{}`", outcome.table);
    }

    let ids = outcome
        .deleted_ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let noun = if outcome.deleted_ids.len() == 1 { "row" } else { "rows" };
    format!("Deleted {noun} {ids} from `{}`", outcome.table)
}

pub fn listing(listing: &TableListing) -> String {
    match listing {
        TableListing::Empty => "Database is empty".to_string(),
        TableListing::Tables(names) => {
            let mut table = new_table();
            table.set_header(["table"]);
            for name in names {
                table.add_row([name]);
            }
            table.to_string()
        }
    }
}

pub fn info(info: &TableInfo) -> String {
    let mut table = new_table();
    table.set_header(["column", "type"]);
    for column in &info.columns {
        table.add_row([column.name.clone(), column.data_type.to_string()]);
    }

    format!("Table `{}`\n{table}\nRows: {}", info.table, info.row_count)
}

fn column_list(columns: &[ColumnDef]) -> String {
    columns
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
