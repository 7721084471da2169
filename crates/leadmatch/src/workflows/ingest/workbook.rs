use super::table::Table;
use calamine::{Data, Reader, Xlsx};
use std::io::{Read, Seek};

#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    #[error("unreadable workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),
    #[error("workbook has no sheet named '{sheet}' (available: {})", available.join(", "))]
    UnknownSheet {
        sheet: String,
        available: Vec<String>,
    },
    #[error("workbook contains no sheets")]
    NoSheets,
}

pub fn sheet_names<RS: Read + Seek>(reader: RS) -> Result<Vec<String>, WorkbookError> {
    let workbook: Xlsx<RS> = Xlsx::new(reader)?;
    Ok(workbook.sheet_names())
}

/// Reads one sheet (the first when `sheet` is `None`); the first row is the
/// header row.
pub fn read_xlsx<RS: Read + Seek>(reader: RS, sheet: Option<&str>) -> Result<Table, WorkbookError> {
    let mut workbook: Xlsx<RS> = Xlsx::new(reader)?;
    let available = workbook.sheet_names();

    let name = match sheet {
        Some(requested) => available
            .iter()
            .find(|name| name.as_str() == requested)
            .cloned()
            .ok_or_else(|| WorkbookError::UnknownSheet {
                sheet: requested.to_string(),
                available: available.clone(),
            })?,
        None => available.first().cloned().ok_or(WorkbookError::NoSheets)?,
    };

    let range = workbook.worksheet_range(&name)?;
    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(row) => row.iter().map(render_cell).collect(),
        None => return Ok(Table::default()),
    };

    let mut table = Table::new(headers);
    for row in rows {
        table.push_row(row.iter().map(render_cell).collect());
    }

    Ok(table)
}

fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(value) => value.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        other => other.to_string(),
    }
}
