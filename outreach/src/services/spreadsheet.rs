//! Spreadsheet baseline import
//!
//! Reads the legacy contact sheet with calamine. The first column holds the
//! company name; each slot uses `HR{i}_Name`, `Email ID_HR{i}` and the
//! optional `HR{i}_iterated` column whose `True`/`False`/`NA` spellings are
//! mapped onto slot statuses here and nowhere else. A slot without an email
//! column is imported blank.

use calamine::{open_workbook_auto, Data, Reader};
use shared::{run_info, run_warn, ContactRow, HrSlot, SharedResult, SlotId, SlotStatus, SLOTS_PER_ROW};
use std::path::Path;

use crate::error::{OutreachError, OutreachResult};

/// Column positions of one slot
#[derive(Debug, Clone, Copy)]
struct SlotColumns {
    name: Option<usize>,
    email: Option<usize>,
    status: Option<usize>,
}

/// Read contact rows from `sheet`, or the first sheet when none is named
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> OutreachResult<Vec<ContactRow>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| OutreachError::SpreadsheetError {
        message: format!("cannot open {}: {e}", path.display()),
    })?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| OutreachError::SpreadsheetError {
                message: format!("{} has no sheets", path.display()),
            })?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| OutreachError::SpreadsheetError {
            message: format!("cannot read sheet '{sheet_name}': {e}"),
        })?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .map(|cells| cells.iter().map(cell_to_string).collect())
        .ok_or_else(|| OutreachError::SpreadsheetError {
            message: format!("sheet '{sheet_name}' is empty"),
        })?;
    let body: Vec<Vec<String>> = rows
        .map(|cells| cells.iter().map(cell_to_string).collect())
        .collect();

    let contacts = rows_from_table(&header, &body)?;
    run_info!(
        "📊 Read {} company rows from sheet '{}' of {}",
        contacts.len(),
        sheet_name,
        path.display()
    );
    Ok(contacts)
}

/// Map a header row and data rows onto contact rows
///
/// Rows whose cells are all blank are skipped. An unknown status spelling
/// fails the whole import.
pub fn rows_from_table(header: &[String], rows: &[Vec<String>]) -> OutreachResult<Vec<ContactRow>> {
    if header.is_empty() {
        return Err(OutreachError::SpreadsheetError {
            message: "header row has no columns".to_string(),
        });
    }

    let columns = slot_columns(header);

    let mut contacts = Vec::new();
    for cells in rows.iter().filter(|cells| cells.iter().any(|cell| !cell.trim().is_empty())) {
        let cell = |index: usize| cells.get(index).map(String::as_str).unwrap_or("");
        let mut slots: [HrSlot; SLOTS_PER_ROW] = Default::default();
        for (slot, columns) in slots.iter_mut().zip(columns.iter()) {
            let status = match columns.status {
                Some(i) => legacy_status(cell(i))?,
                None => SlotStatus::Unset,
            };
            *slot = HrSlot::new(
                columns.name.map(|i| cell(i).to_string()),
                columns.email.map(|i| cell(i).to_string()),
                status,
            );
        }
        contacts.push(ContactRow::new(cell(0), slots));
    }
    Ok(contacts)
}

fn slot_columns(header: &[String]) -> [SlotColumns; SLOTS_PER_ROW] {
    let find = |name: &str| header.iter().position(|h| h.trim() == name);

    SlotId::ALL.map(|id| {
        let n = id.number();
        let email_header = format!("Email ID_HR{n}");
        let email = find(&email_header);
        if email.is_none() {
            run_warn!("⚠️ No '{}' column, {} slots import blank", email_header, id);
        }
        SlotColumns {
            name: find(&format!("HR{n}_Name")),
            email,
            status: find(&format!("HR{n}_iterated")),
        }
    })
}

/// Status for a legacy `HR{i}_iterated` cell
///
/// Blank cells are `Unset`; the canonical status names are accepted too.
pub fn legacy_status(raw: &str) -> SharedResult<SlotStatus> {
    match raw.trim().to_lowercase().as_str() {
        "true" => Ok(SlotStatus::Sent),
        "false" => Ok(SlotStatus::Failed),
        "na" => Ok(SlotStatus::NotApplicable),
        other => other.parse(),
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) => format!("{}", f),
        Data::Bool(b) => b.to_string(),
        Data::Error(_) => String::new(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}
