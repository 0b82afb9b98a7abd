use std::convert::Infallible;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use engine_logging::{engine_info, engine_warn};
use linkcheck_engine::{CellValue, ResultSink, RowId, ValidationRequest, Verdict};
use tempfile::NamedTempFile;

/// Spreadsheet column letters (`A`, `Z`, `AA`) to a 0-based index.
pub fn column_index(letters: &str) -> anyhow::Result<usize> {
    let letters = letters.trim();
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        bail!("column must be letters only (A, B, ..., AA), got {letters:?}");
    }
    let index = letters.chars().try_fold(0usize, |acc, c| {
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        acc.checked_mul(26)?.checked_add(digit)
    });
    match index {
        Some(index) => Ok(index - 1),
        None => bail!("column {letters:?} is out of range"),
    }
}

/// A CSV sheet held in memory, one `Vec<String>` per row, no header row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sheet {
    rows: Vec<Vec<String>>,
    /// Blank lines the CSV reader skipped; they are not rows and are not saved.
    blank_lines: usize,
}

impl Sheet {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("opening {}", path.display()))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let mut rows = Vec::new();
        let mut record_lines = 0;
        for record in reader.records() {
            let record = record.with_context(|| format!("reading {}", path.display()))?;
            record_lines += 1 + record
                .iter()
                .map(|field| field.matches('\n').count())
                .sum::<usize>();
            rows.push(record.iter().map(str::to_string).collect());
        }

        let sheet = Self {
            rows,
            blank_lines: line_count(&bytes).saturating_sub(record_lines),
        };
        engine_info!(
            "Loaded {:?}: {} rows x {} columns",
            path,
            sheet.row_count(),
            sheet.column_count()
        );
        if sheet.blank_lines > 0 {
            engine_warn!(
                "{:?} has {} blank lines; they are not counted as rows and will be dropped when results are saved",
                path,
                sheet.blank_lines
            );
        }
        Ok(sheet)
    }

    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows,
            blank_lines: 0,
        }
    }

    pub fn blank_lines(&self) -> usize {
        self.blank_lines
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row_id: RowId, column: usize) -> Option<&str> {
        let index = usize::try_from(row_id).ok()?.checked_sub(1)?;
        self.rows.get(index)?.get(column).map(String::as_str)
    }

    /// Requests for rows `start_row..=end_row` (1-based, clipped to the sheet).
    /// Rows too short to have the column are skipped with a warning.
    pub fn requests(&self, column: usize, start_row: u32, end_row: u32) -> Vec<ValidationRequest> {
        let mut requests = Vec::new();
        for row_id in start_row.max(1)..=end_row {
            let Some(row) = usize::try_from(row_id - 1)
                .ok()
                .and_then(|index| self.rows.get(index))
            else {
                break;
            };
            match row.get(column) {
                Some(value) => requests.push(ValidationRequest::new(
                    row_id,
                    CellValue::from(value.as_str()),
                )),
                None => engine_warn!(
                    "Row {} has {} columns; URL column index {} is out of range, row skipped",
                    row_id,
                    row.len(),
                    column
                ),
            }
        }
        requests
    }

    /// Set one cell, widening the row when needed. Rows past the end are ignored.
    pub fn set(&mut self, row_id: RowId, column: usize, value: &str) -> bool {
        let Some(row) = usize::try_from(row_id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|index| self.rows.get_mut(index))
        else {
            return false;
        };
        if row.len() <= column {
            row.resize(column + 1, String::new());
        }
        row[column] = value.to_string();
        true
    }

    /// Write to a temp file next to `path`, then rename over it.
    pub fn save_atomic(&self, path: &Path) -> anyhow::Result<()> {
        if self.blank_lines > 0 {
            engine_warn!(
                "Saving {:?} without the {} blank lines of the input",
                path,
                self.blank_lines
            );
        }
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temp file in {}", dir.display()))?;
        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(tmp.as_file_mut());
            for row in &self.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        tmp.persist(path)
            .with_context(|| format!("saving {}", path.display()))?;
        engine_info!("Saved {:?}", path);
        Ok(())
    }

    pub fn writer(&mut self, column: usize) -> SheetWriter<'_> {
        SheetWriter {
            sheet: self,
            column,
        }
    }
}

/// Physical lines, counting a final line that lacks a terminator.
fn line_count(bytes: &[u8]) -> usize {
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
    match bytes.last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}

/// Writes result tokens into one column of a [`Sheet`].
pub struct SheetWriter<'a> {
    sheet: &'a mut Sheet,
    column: usize,
}

impl ResultSink for SheetWriter<'_> {
    type Error = Infallible;

    fn write(&mut self, row_id: RowId, verdict: &Verdict) -> Result<(), Self::Error> {
        if let Some(token) = verdict.sheet_token() {
            if !self.sheet.set(row_id, self.column, token) {
                engine_warn!("Row {} is outside the sheet; result not written", row_id);
            }
        }
        Ok(())
    }
}
