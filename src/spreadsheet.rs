// Standard Library Imports
use std::{ffi::OsStr, io::Cursor, path::Path};

// External Crate Imports
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use color_eyre::{
    Result,
    eyre::{WrapErr, eyre},
};
use csv::ReaderBuilder;
use tracing::debug;

// Public API ==========================================================================================================

/// One row of a tagging spreadsheet: the device `id` to tag with `tag_name`. `row` is the 1-based row number in the
/// sheet, kept for error messages
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TagRow {
    pub row: usize,
    pub id: String,
    pub tag_name: String,
}

/// Reads the `id` / `tagName` rows out of an uploaded file. Returns `None` when the file isn't a spreadsheet at all,
/// or is one that doesn't have both of those columns in its header row
pub fn read_tag_rows(file_name: &str, bytes: &[u8]) -> Result<Option<Vec<TagRow>>> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);

    let table = match extension.as_deref() {
        Some("csv") => read_csv(bytes)?,
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => read_workbook(bytes)?,
        _ => return Ok(None),
    };

    let rows = tag_rows(&table);
    if let Some(rows) = &rows {
        debug!(file_name, rows = rows.len(), "read tagging spreadsheet");
    }

    Ok(rows)
}

impl TagRow {
    pub const ID_HEADER: &str = "id";
    pub const TAG_NAME_HEADER: &str = "tagName";

    /// A name for this row in notifications: the device id, or the row number when that's missing
    #[must_use]
    pub fn label(&self) -> String {
        if self.id.is_empty() {
            format!("Row {}", self.row)
        } else {
            self.id.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        match (self.id.is_empty(), self.tag_name.is_empty()) {
            (false, false) => Ok(()),
            (true, _) => Err(eyre!("missing `{}` value", Self::ID_HEADER)),
            (false, true) => Err(eyre!("missing `{}` value", Self::TAG_NAME_HEADER)),
        }
    }
}

// Private Helper Code =================================================================================================

type Table = Vec<Vec<String>>;

fn read_csv(bytes: &[u8]) -> Result<Table> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes)
        .records()
        .map(|record| Ok(record?.iter().map(|cell| cell.trim().to_owned()).collect()))
        .collect::<Result<_>>()
        .wrap_err("failed to read CSV")
}

fn read_workbook(bytes: &[u8]) -> Result<Table> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).wrap_err("failed to open spreadsheet")?;

    let Some(sheet) = workbook.worksheet_range_at(0) else {
        return Ok(Vec::new());
    };
    let sheet = sheet.wrap_err("failed to read the first sheet of the spreadsheet")?;

    let table = sheet
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(table)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        cell => cell.to_string().trim().to_owned(),
    }
}

fn tag_rows(table: &Table) -> Option<Vec<TagRow>> {
    let (header, body) = table.split_first()?;
    let column = |name: &str| header.iter().position(|cell| cell == name);
    let id_column = column(TagRow::ID_HEADER)?;
    let tag_column = column(TagRow::TAG_NAME_HEADER)?;

    let cell = |row: &[String], column: usize| row.get(column).cloned().unwrap_or_default();

    let rows = body
        .iter()
        .enumerate()
        .filter(|(_, row)| row.iter().any(|cell| !cell.is_empty()))
        .map(|(index, row)| TagRow {
            // NOTE: The header is row 1, so the first body row is row 2
            row: index + 2,
            id: cell(row, id_column),
            tag_name: cell(row, tag_column),
        })
        .collect();

    Some(rows)
}

// Unit Tests ==========================================================================================================
