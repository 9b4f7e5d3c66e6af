//! Loads the labeled message table from a SQLite database.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::{info, warn};

use super::{Dataset, Message};
use crate::error::{Result, TriageError};

/// Table written by the ETL step.
pub const DEFAULT_TABLE: &str = "FigureEight";
/// Leading columns that are metadata (id, message, original, genre), not categories.
pub const METADATA_COLUMNS: usize = 4;
/// Column holding the text used as the feature input.
pub const MESSAGE_COLUMN: &str = "message";

/// Read `table` in full and split it into messages, targets and category names.
///
/// Every column after the first [`METADATA_COLUMNS`] is a category; its values must be
/// numeric and non-negative. Values above 1 are clamped to 1.
pub fn load_dataset(db_path: &Path, table: &str) -> Result<Dataset> {
    if !db_path.is_file() {
        return Err(TriageError::DataAccess(format!(
            "database not found: {}",
            db_path.display()
        )));
    }
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    ensure_table_exists(&conn, table, db_path)?;

    let mut stmt = conn.prepare(&format!("SELECT * FROM {}", quote_identifier(table)))?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    if columns.len() <= METADATA_COLUMNS {
        return Err(TriageError::validation(format!(
            "table `{table}` has {} columns; expected {METADATA_COLUMNS} metadata columns followed by categories",
            columns.len()
        )));
    }
    let message_idx = columns
        .iter()
        .position(|name| name == MESSAGE_COLUMN)
        .ok_or_else(|| {
            TriageError::validation(format!("table `{table}` has no `{MESSAGE_COLUMN}` column"))
        })?;
    let category_names = columns[METADATA_COLUMNS..].to_vec();

    let mut messages = Vec::new();
    let mut clamped = 0usize;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let row_idx = messages.len();
        let text = message_text(row.get_ref(message_idx)?, row_idx)?;
        let mut labels = Vec::with_capacity(category_names.len());
        for (offset, name) in category_names.iter().enumerate() {
            let raw = row.get_ref(METADATA_COLUMNS + offset)?;
            let value = label_value(raw).ok_or_else(|| {
                TriageError::validation(format!(
                    "row {row_idx} column `{name}` is not a non-negative integer label"
                ))
            })?;
            if value > 1 {
                clamped += 1;
            }
            labels.push(value.min(1) as u8);
        }
        messages.push(Message { text, labels });
    }

    if messages.is_empty() {
        return Err(TriageError::validation(format!("table `{table}` has no rows")));
    }
    if clamped > 0 {
        warn!("Clamped {clamped} label values above 1 to 1");
    }
    info!(
        "Loaded {} messages with {} categories from `{table}`",
        messages.len(),
        category_names.len()
    );
    Dataset::from_messages(messages, category_names)
}

fn ensure_table_exists(conn: &Connection, table: &str, db_path: &Path) -> Result<()> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
            params![table],
            |row| row.get(0),
        )
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(TriageError::DataAccess(format!(
            "table `{table}` not found in {}",
            db_path.display()
        ))),
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn message_text(value: ValueRef<'_>, row_idx: usize) -> Result<String> {
    match value {
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
        ValueRef::Integer(v) => Ok(v.to_string()),
        ValueRef::Real(v) => Ok(v.to_string()),
        ValueRef::Null => Err(TriageError::validation(format!(
            "row {row_idx} has a NULL `{MESSAGE_COLUMN}`"
        ))),
    }
}

/// Interpret a label cell; `None` for anything that is not a non-negative whole number.
fn label_value(value: ValueRef<'_>) -> Option<i64> {
    let number = match value {
        ValueRef::Integer(v) => v,
        ValueRef::Real(v) if v.is_finite() && v.fract() == 0.0 => v as i64,
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok()?.trim().parse().ok()?,
        _ => return None,
    };
    (number >= 0).then_some(number)
}
