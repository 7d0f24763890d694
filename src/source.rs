//! Raw table I/O: the only layer that touches the filesystem.
//!
//! Workbooks go through calamine (the dataset lives on one worksheet of a
//! multi-sheet file), CSV through the polars reader. Both hand back the
//! table as read; dtype normalization happens in the loader.
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};
use polars::prelude::*;

use crate::config::DashboardConfig;
use crate::error::DashboardError;

static EMPTY_CELL: Data = Data::Empty;

/// Something that can produce the raw dataset table.
pub trait TableSource {
    /// Human-readable origin used in logs and load errors.
    fn origin(&self) -> String;

    fn read_table(&self) -> Result<DataFrame, DashboardError>;
}

impl TableSource for DataFrame {
    fn origin(&self) -> String {
        "in-memory table".to_string()
    }

    fn read_table(&self) -> Result<DataFrame, DashboardError> {
        Ok(self.clone())
    }
}

// ── Workbook ────────────────────────────────────────────────────────────────

/// One worksheet of an xlsx/xls/ods workbook.
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    path: PathBuf,
    sheet_index: usize,
    header_row: usize,
}

impl WorkbookSource {
    pub fn new(path: impl AsRef<Path>, sheet_index: usize, header_row: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheet_index,
            header_row,
        }
    }
}

impl TableSource for WorkbookSource {
    fn origin(&self) -> String {
        format!("{} [sheet {}]", self.path.display(), self.sheet_index)
    }

    fn read_table(&self) -> Result<DataFrame, DashboardError> {
        let origin = self.origin();
        let mut workbook =
            open_workbook_auto(&self.path).map_err(|e| DashboardError::data_load(&origin, e))?;

        let sheet_count = workbook.sheet_names().len();
        let range = workbook
            .worksheet_range_at(self.sheet_index)
            .ok_or_else(|| {
                DashboardError::data_load(
                    &origin,
                    format!("workbook has {sheet_count} sheets, no index {}", self.sheet_index),
                )
            })?
            .map_err(|e| DashboardError::data_load(&origin, e))?;

        range_to_frame(&range, self.header_row).map_err(|e| e.at_load(&origin))
    }
}

/// Build a frame from a worksheet range: the `header_row`-th row names the
/// columns, every later row is a record.
fn range_to_frame(range: &Range<Data>, header_row: usize) -> Result<DataFrame, DashboardError> {
    let mut rows = range.rows().skip(header_row);
    let header = rows
        .next()
        .ok_or_else(|| DashboardError::InvalidData(format!("no header at row {header_row}")))?;
    let body: Vec<&[Data]> = rows.collect();

    let columns = unique_headers(header)
        .into_iter()
        .enumerate()
        .map(|(j, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(j).unwrap_or(&EMPTY_CELL))
                .collect();
            column_from_cells(&name, &cells)
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Trimmed header names; repeats get `.1`, `.2`, … suffixes and blank
/// headers become `column_<j>`.
fn unique_headers(header: &[Data]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for (j, cell) in header.iter().enumerate() {
        let base = match cell {
            Data::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Data::String(_) | Data::Empty => format!("column_{j}"),
            other => other.to_string(),
        };
        let mut name = base.clone();
        let mut n = 1;
        while names.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        names.push(name);
    }
    names
}

/// All-numeric columns become Float64, anything else String. Empty and
/// error cells are null.
fn column_from_cells(name: &str, cells: &[&Data]) -> Column {
    let numeric = cells
        .iter()
        .all(|c| matches!(c, Data::Int(_) | Data::Float(_) | Data::Empty));

    if numeric {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                Data::Int(i) => Some(*i as f64),
                Data::Float(f) => Some(*f),
                _ => None,
            })
            .collect();
        Column::new(name.into(), values)
    } else {
        let values: Vec<Option<String>> = cells
            .iter()
            .map(|c| match c {
                Data::Empty | Data::Error(_) => None,
                Data::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .collect();
        Column::new(name.into(), values)
    }
}

// ── CSV ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TableSource for CsvSource {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    fn read_table(&self) -> Result<DataFrame, DashboardError> {
        let origin = self.origin();
        if !self.path.is_file() {
            return Err(DashboardError::data_load(origin, "file not found"));
        }

        let read = || -> Result<DataFrame, DashboardError> {
            let mut df = CsvReadOptions::default()
                .with_has_header(true)
                .try_into_reader_with_file_path(Some(self.path.clone()))?
                .finish()?;

            // Trim whitespace from column names
            let trimmed: Vec<String> = df
                .get_column_names_str()
                .iter()
                .map(|c| c.trim().to_string())
                .collect();
            df.set_column_names(trimmed.as_slice())?;
            Ok(df)
        };

        read().map_err(|e| e.at_load(&origin))
    }
}

// ── Dispatch ────────────────────────────────────────────────────────────────

/// File-backed source picked from the configured path's extension.
#[derive(Debug, Clone)]
pub enum FileSource {
    Workbook(WorkbookSource),
    Csv(CsvSource),
}

impl FileSource {
    pub fn from_config(config: &DashboardConfig) -> Self {
        let is_csv = config
            .source
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            Self::Csv(CsvSource::new(&config.source))
        } else {
            Self::Workbook(WorkbookSource::new(
                &config.source,
                config.sheet_index,
                config.header_row,
            ))
        }
    }
}

impl TableSource for FileSource {
    fn origin(&self) -> String {
        match self {
            Self::Workbook(src) => src.origin(),
            Self::Csv(src) => src.origin(),
        }
    }

    fn read_table(&self) -> Result<DataFrame, DashboardError> {
        match self {
            Self::Workbook(src) => src.read_table(),
            Self::Csv(src) => src.read_table(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn headers_are_trimmed_and_disambiguated() {
        let header = vec![
            text(" Economy "),
            text("Q"),
            text("Q"),
            Data::Empty,
            text("Q"),
            Data::Float(2023.0),
        ];
        assert_eq!(
            unique_headers(&header),
            vec!["Economy", "Q", "Q.1", "column_3", "Q.2", "2023"]
        );
    }

    #[test]
    fn numeric_cells_become_float_and_mixed_become_string() {
        let a = Data::Float(60.5);
        let b = Data::Int(80);
        let yes = text("Yes");

        let numeric = column_from_cells("score", &[&a, &EMPTY_CELL, &b]);
        assert_eq!(numeric.dtype(), &DataType::Float64);
        assert_eq!(
            numeric.f64().unwrap().into_iter().collect::<Vec<_>>(),
            vec![Some(60.5), None, Some(80.0)]
        );

        let mixed = column_from_cells("answer", &[&yes, &EMPTY_CELL, &b]);
        assert_eq!(mixed.dtype(), &DataType::String);
        assert_eq!(
            mixed.str().unwrap().into_iter().collect::<Vec<_>>(),
            vec![Some("Yes"), None, Some("80")]
        );
    }

    #[test]
    fn range_uses_header_row_and_blank_cells_are_null() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 1));
        range.set_value((0, 0), text("title row"));
        range.set_value((1, 0), text("Economy"));
        range.set_value((1, 1), text("Report Year"));
        range.set_value((2, 0), text("Chile"));
        range.set_value((2, 1), Data::Float(1990.0));
        range.set_value((3, 0), text("Peru"));

        let df = range_to_frame(&range, 1).unwrap();
        assert_eq!(df.get_column_names_str(), vec!["Economy", "Report Year"]);
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("Report Year").unwrap().null_count(), 1);
    }

    #[test]
    fn missing_header_row_is_invalid() {
        let range: Range<Data> = Range::new((0, 0), (0, 0));
        assert!(matches!(
            range_to_frame(&range, 5).unwrap_err(),
            DashboardError::InvalidData(_)
        ));
    }

    #[test]
    fn missing_files_are_data_load_errors() {
        let csv = CsvSource::new("does/not/exist.csv");
        assert!(matches!(csv.read_table().unwrap_err(), DashboardError::DataLoad { .. }));

        let xlsx = WorkbookSource::new("does/not/exist.xlsx", 1, 0);
        assert!(matches!(xlsx.read_table().unwrap_err(), DashboardError::DataLoad { .. }));
    }

    #[test]
    fn extension_picks_the_reader() {
        let csv = FileSource::from_config(&DashboardConfig::new("data/wbl.CSV"));
        assert!(matches!(csv, FileSource::Csv(_)));

        let xlsx = FileSource::from_config(&DashboardConfig::new("data/wbl.xlsx"));
        assert!(matches!(xlsx, FileSource::Workbook(_)));
        assert_eq!(xlsx.origin(), "data/wbl.xlsx [sheet 1]");
    }
}
