use std::path::Path;

use benchwright_core::format_f64;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use crate::errors::QueryError;

/// Open a database read-only.
///
/// Query templates are trusted test-authoring input; their SQL runs
/// verbatim, and the read-only open flags are what enforce the engine's
/// no-mutation invariant, not sanitization.
fn open(path: &Path) -> Result<Connection, QueryError> {
    if !path.exists() {
        return Err(QueryError::NotFound(format!(
            "sqlite database not found: {}",
            path.display()
        )));
    }
    let connection = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    Ok(connection)
}

/// `sqlite_query:SQL:path` — first column of the first row of a verbatim
/// query.
pub fn query_scalar(path: &Path, sql: &str) -> Result<String, QueryError> {
    let connection = open(path)?;
    let mut statement = connection.prepare(sql)?;
    let mut rows = statement.query([])?;
    match rows.next()? {
        Some(row) => Ok(render(row.get_ref(0)?)),
        None => Err(QueryError::NotFound(format!(
            "query returned no rows: {sql}"
        ))),
    }
}

/// `sqlite_value:row:column:[table:]path` — cell access by row index and
/// column name or ordinal; the table defaults to the first one in the
/// catalog.
pub fn table_value(
    path: &Path,
    row_index: usize,
    column: &str,
    table: Option<&str>,
) -> Result<String, QueryError> {
    let connection = open(path)?;
    let table = match table {
        Some(table) => table.to_string(),
        None => first_table(&connection, path)?,
    };

    let mut statement = connection.prepare(&format!("SELECT * FROM \"{table}\""))?;
    let columns: Vec<String> = statement
        .column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let column_index = resolve_column(&columns, column, &table)?;

    let mut rows = statement.query([])?;
    let mut seen = 0_usize;
    while let Some(row) = rows.next()? {
        if seen == row_index {
            return Ok(render(row.get_ref(column_index)?));
        }
        seen += 1;
    }
    Err(QueryError::NotFound(format!(
        "row {row_index} out of range ({seen} row(s) in table '{table}')"
    )))
}

fn first_table(connection: &Connection, path: &Path) -> Result<String, QueryError> {
    let mut statement = connection
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY rowid LIMIT 1")?;
    let mut rows = statement.query([])?;
    match rows.next()? {
        Some(row) => Ok(row.get(0)?),
        None => Err(QueryError::NotFound(format!(
            "database {} has no tables",
            path.display()
        ))),
    }
}

fn resolve_column(columns: &[String], column: &str, table: &str) -> Result<usize, QueryError> {
    if let Ok(ordinal) = column.parse::<usize>() {
        if ordinal < columns.len() {
            return Ok(ordinal);
        }
        return Err(QueryError::NotFound(format!(
            "column {ordinal} out of range ({} column(s) in table '{table}')",
            columns.len()
        )));
    }
    columns
        .iter()
        .position(|name| name == column)
        .ok_or_else(|| {
            QueryError::NotFound(format!(
                "column '{column}' not found in table '{table}' (available columns: {})",
                columns.join(", ")
            ))
        })
}

fn render(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(value) => value.to_string(),
        ValueRef::Real(value) => format_f64(value),
        ValueRef::Text(value) => String::from_utf8_lossy(value).into_owned(),
        ValueRef::Blob(value) => String::from_utf8_lossy(value).into_owned(),
    }
}
