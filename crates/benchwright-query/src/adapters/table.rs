use std::path::Path;

use csv::StringRecord;

use crate::errors::QueryError;
use crate::filter::FilterPredicate;

/// Load every row of a CSV file, header included as row 0.
///
/// `csv_cell`/`csv_row` address raw rows, so the reader never swallows the
/// header; `flexible` tolerates ragged rows in generated data.
fn read_records(path: &Path) -> Result<Vec<StringRecord>, QueryError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|err| {
            if err.is_io_error() {
                QueryError::NotFound(format!(
                    "csv file not found or unreadable: {}",
                    path.display()
                ))
            } else {
                QueryError::Csv(err)
            }
        })?;
    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?);
    }
    Ok(records)
}

fn column_index(records: &[StringRecord], header: &str, path: &Path) -> Result<usize, QueryError> {
    let header_row = records.first().ok_or_else(|| {
        QueryError::NotFound(format!("csv file {} is empty", path.display()))
    })?;
    header_row
        .iter()
        .position(|cell| cell.trim() == header)
        .ok_or_else(|| {
            let available: Vec<&str> = header_row.iter().collect();
            QueryError::NotFound(format!(
                "column '{header}' not found in {} (available headers: {})",
                path.display(),
                available.join(", ")
            ))
        })
}

/// `csv_cell:row:col:path` — 0-indexed, header row included.
pub fn cell(path: &Path, row: usize, col: usize) -> Result<String, QueryError> {
    let records = read_records(path)?;
    let record = records.get(row).ok_or_else(|| {
        QueryError::NotFound(format!(
            "row {row} out of range ({} row(s) in {})",
            records.len(),
            path.display()
        ))
    })?;
    record
        .get(col)
        .map(|cell| cell.to_string())
        .ok_or_else(|| {
            QueryError::NotFound(format!(
                "column {col} out of range ({} column(s) in row {row} of {})",
                record.len(),
                path.display()
            ))
        })
}

/// `csv_row:row:path` — the whole row, comma-joined.
pub fn row(path: &Path, row: usize) -> Result<String, QueryError> {
    let records = read_records(path)?;
    let record = records.get(row).ok_or_else(|| {
        QueryError::NotFound(format!(
            "row {row} out of range ({} row(s) in {})",
            records.len(),
            path.display()
        ))
    })?;
    let cells: Vec<&str> = record.iter().collect();
    Ok(cells.join(","))
}

/// `csv_column:header:path` — every data cell of the column, comma-joined.
pub fn column(path: &Path, header: &str) -> Result<String, QueryError> {
    let records = read_records(path)?;
    let index = column_index(&records, header, path)?;
    let cells: Vec<&str> = records[1..]
        .iter()
        .map(|record| record.get(index).unwrap_or(""))
        .collect();
    Ok(cells.join(","))
}

/// `csv_value:dataRow:header:path` — data rows exclude the header, so the
/// raw row index is `dataRow + 1`.
pub fn value(path: &Path, data_row: usize, header: &str) -> Result<String, QueryError> {
    let records = read_records(path)?;
    let index = column_index(&records, header, path)?;
    let record = records.get(data_row + 1).ok_or_else(|| {
        QueryError::NotFound(format!(
            "data row {data_row} out of range ({} data row(s) in {})",
            records.len().saturating_sub(1),
            path.display()
        ))
    })?;
    Ok(record.get(index).unwrap_or("").to_string())
}

/// Which cells of a column participate in an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Avg,
    Count,
}

/// `csv_sum|csv_avg|csv_count:column:path`.
///
/// Sum/avg skip non-numeric cells; count counts non-empty cells. An empty
/// candidate set yields 0 so aggregation over randomly-sized data never
/// fails scoring.
pub fn aggregate(path: &Path, header: &str, op: Aggregate) -> Result<f64, QueryError> {
    aggregate_filtered(path, header, op, None)
}

/// `csv_sum_where|csv_avg_where|csv_count_where:column:filterColumn:op:value:path`.
pub fn aggregate_where(
    path: &Path,
    header: &str,
    predicate: &FilterPredicate,
    op: Aggregate,
) -> Result<f64, QueryError> {
    aggregate_filtered(path, header, op, Some(predicate))
}

fn aggregate_filtered(
    path: &Path,
    header: &str,
    op: Aggregate,
    predicate: Option<&FilterPredicate>,
) -> Result<f64, QueryError> {
    let records = read_records(path)?;
    let index = column_index(&records, header, path)?;
    let filter_index = match predicate {
        Some(predicate) => Some(column_index(&records, &predicate.field, path)?),
        None => None,
    };

    let cells = records[1..].iter().filter_map(|record| {
        if let (Some(predicate), Some(filter_index)) = (predicate, filter_index) {
            let filter_cell = record.get(filter_index).unwrap_or("");
            if !predicate.compare_text(filter_cell) {
                return None;
            }
        }
        record.get(index)
    });

    Ok(match op {
        Aggregate::Count => cells.filter(|cell| !cell.trim().is_empty()).count() as f64,
        Aggregate::Sum => cells
            .filter_map(|cell| cell.trim().parse::<f64>().ok())
            .sum(),
        Aggregate::Avg => {
            let values: Vec<f64> = cells
                .filter_map(|cell| cell.trim().parse::<f64>().ok())
                .collect();
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const FIXTURE: &str = "name,amount,region\n\
        Alice,100,east\n\
        Bob,abc,west\n\
        Cara,250.5,east\n\
        Dan,,west\n";

    fn write_fixture(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("bw_csv_{}_{name}", std::process::id()));
        std::fs::write(&path, FIXTURE).expect("write fixture");
        path
    }

    #[test]
    fn cell_is_zero_indexed_including_header() {
        let path = write_fixture("cell.csv");
        assert_eq!(cell(&path, 0, 1).expect("cell"), "amount");
        assert_eq!(cell(&path, 1, 0).expect("cell"), "Alice");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn out_of_range_cell_names_row_and_count() {
        let path = write_fixture("range.csv");
        let err = cell(&path, 99, 0).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("99"));
        assert!(message.contains("5 row"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn value_offsets_past_the_header() {
        let path = write_fixture("value.csv");
        assert_eq!(value(&path, 0, "name").expect("value"), "Alice");
        assert_eq!(value(&path, 2, "amount").expect("value"), "250.5");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unknown_header_lists_available_headers() {
        let path = write_fixture("header.csv");
        let err = column(&path, "price").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("price"));
        assert!(message.contains("amount"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn sum_skips_non_numeric_and_count_skips_empty() {
        let path = write_fixture("agg.csv");
        assert_eq!(aggregate(&path, "amount", Aggregate::Sum).expect("sum"), 350.5);
        assert_eq!(aggregate(&path, "amount", Aggregate::Count).expect("count"), 3.0);
        let avg = aggregate(&path, "amount", Aggregate::Avg).expect("avg");
        assert!((avg - 175.25).abs() < 1e-9);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn filtered_aggregates_apply_the_predicate() {
        let path = write_fixture("where.csv");
        let predicate = FilterPredicate::from_parts("region", "==", "east").expect("predicate");
        assert_eq!(
            aggregate_where(&path, "amount", &predicate, Aggregate::Sum).expect("sum"),
            350.5
        );
        let predicate = FilterPredicate::from_parts("amount", ">", "150").expect("predicate");
        assert_eq!(
            aggregate_where(&path, "name", &predicate, Aggregate::Count).expect("count"),
            1.0
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn empty_match_set_aggregates_to_zero() {
        let path = write_fixture("empty.csv");
        let predicate = FilterPredicate::from_parts("region", "==", "north").expect("predicate");
        assert_eq!(
            aggregate_where(&path, "amount", &predicate, Aggregate::Sum).expect("sum"),
            0.0
        );
        assert_eq!(
            aggregate_where(&path, "amount", &predicate, Aggregate::Avg).expect("avg"),
            0.0
        );
        let _ = std::fs::remove_file(&path);
    }
}
