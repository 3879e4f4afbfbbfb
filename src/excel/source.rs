//! Source workbook access - FDM upload (.xlsx/.xlsm) → in-memory sheets
//!
//! Sheets are decoded once per file. Lookups never fail the whole file: an
//! unknown sheet, an empty cell or a keyword outside the scan window all come
//! back as `None` and are turned into field-level sentinels by the extractor.

use crate::error::{FdmError, FdmResult};
use crate::excel::address::parse_address;
use calamine::{Data, Range, Reader, Xlsx};
use std::io::Cursor;
use tracing::{debug, warn};

/// Name fragments that identify the standard FDM sheets even when the
/// uploaded file adds prefixes, suffixes or different casing
const SHEET_FRAGMENTS: [&str; 4] = ["c.1", "c.2", "home", "fdm"];

/// Decoded FDM workbook, sheets in workbook order
#[derive(Debug, Clone)]
pub struct SourceWorkbook {
    sheets: Vec<Sheet>,
}

/// A single worksheet's cached cell values
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    range: Range<Data>,
}

impl SourceWorkbook {
    /// Decode an uploaded workbook from its raw bytes
    pub fn from_bytes(file_name: &str, bytes: Vec<u8>) -> FdmResult<Self> {
        let mut workbook: Xlsx<_> =
            Xlsx::new(Cursor::new(bytes)).map_err(|e| FdmError::Decode {
                file: file_name.to_string(),
                details: e.to_string(),
            })?;

        let sheet_names = workbook.sheet_names().to_vec();
        let mut sheets = Vec::with_capacity(sheet_names.len());

        for sheet_name in sheet_names {
            match workbook.worksheet_range(&sheet_name) {
                Ok(range) => sheets.push(Sheet::new(sheet_name, range)),
                Err(e) => {
                    warn!(file = file_name, sheet = %sheet_name, error = %e, "skipping unreadable sheet");
                }
            }
        }

        debug!(file = file_name, sheets = sheets.len(), "decoded workbook");
        Ok(Self { sheets })
    }

    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Map a sheet-name hint to a sheet of this workbook
    ///
    /// Tried in order: exact name, case-insensitive name, then the known
    /// fragments (`C.1`, `C.2`, `Home`, `FDM`, and `D` / `Sheet D`). The
    /// first matching sheet in workbook order wins.
    pub fn resolve(&self, hint: &str) -> Option<&Sheet> {
        if let Some(sheet) = self.sheets.iter().find(|s| s.name == hint) {
            return Some(sheet);
        }

        let hint_lower = hint.trim().to_lowercase();
        if let Some(sheet) = self
            .sheets
            .iter()
            .find(|s| s.name.trim().to_lowercase() == hint_lower)
        {
            return Some(sheet);
        }

        for fragment in SHEET_FRAGMENTS {
            if hint_lower.contains(fragment) {
                if let Some(sheet) = self
                    .sheets
                    .iter()
                    .find(|s| s.name.to_lowercase().contains(fragment))
                {
                    return Some(sheet);
                }
            }
        }

        if hint_lower == "d" || hint_lower == "sheet d" {
            return self.sheets.iter().find(|s| is_sheet_d(&s.name));
        }

        None
    }
}

/// `D`, `Sheet D`, or a titled variant such as `D. Penetapan`
fn is_sheet_d(name: &str) -> bool {
    let name = name.trim().to_lowercase();
    let rest = name.strip_prefix("sheet ").unwrap_or(&name);
    rest == "d" || rest.starts_with("d.") || rest.starts_with("d ")
}

impl Sheet {
    pub fn new(name: impl Into<String>, range: Range<Data>) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }

    /// Build a sheet from zero-based `(row, col, value)` triples
    pub fn from_cells(name: impl Into<String>, cells: Vec<(u32, u32, Data)>) -> Self {
        let max_row = cells.iter().map(|(r, _, _)| *r).max();
        let max_col = cells.iter().map(|(_, c, _)| *c).max();

        let range = match (max_row, max_col) {
            (Some(max_row), Some(max_col)) => {
                let mut range = Range::new((0, 0), (max_row, max_col));
                for (row, col, value) in cells {
                    range.set_value((row, col), value);
                }
                range
            }
            _ => Range::empty(),
        };

        Self::new(name, range)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last used (row, col), zero-based and inclusive
    pub fn used_bounds(&self) -> Option<(u32, u32)> {
        self.range.end()
    }

    /// Non-empty cell at a zero-based position
    pub fn cell(&self, row: u32, col: u32) -> Option<&Data> {
        match self.range.get_value((row, col)) {
            None | Some(Data::Empty) => None,
            Some(data) => Some(data),
        }
    }

    /// Non-empty cell at an A1 address
    pub fn cell_at(&self, address: &str) -> FdmResult<Option<&Data>> {
        let (row, col) = parse_address(address)?;
        Ok(self.cell(row, col))
    }

    pub fn text(&self, row: u32, col: u32) -> Option<String> {
        self.cell(row, col).and_then(cell_text)
    }

    /// Numeric value; anything absent or non-numeric reads as 0
    pub fn number(&self, row: u32, col: u32) -> f64 {
        cell_number(self.cell(row, col))
    }

    /// Positions visited by a bounded scan, row by row
    ///
    /// The window is clipped to the used range, so a scan of a small sheet
    /// stays small and a scan of a huge one stops at the window edge.
    pub fn scan_positions(&self, max_rows: u32, max_cols: u32) -> impl Iterator<Item = (u32, u32)> {
        let (rows, cols) = match self.used_bounds() {
            Some((last_row, last_col)) => (
                max_rows.min(last_row.saturating_add(1)),
                max_cols.min(last_col.saturating_add(1)),
            ),
            None => (0, 0),
        };

        (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }

    /// First cell in the window whose text contains `needle`, ignoring case
    pub fn find_text(&self, needle: &str, max_rows: u32, max_cols: u32) -> Option<(u32, u32)> {
        let needle = needle.to_lowercase();
        self.scan_positions(max_rows, max_cols).find(|&(row, col)| {
            self.text(row, col)
                .map(|text| text.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
    }
}

/// Display text of a cell value
pub fn cell_text(data: &Data) -> Option<String> {
    let text = match data {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Numeric coercion: numbers pass through, numeric text is parsed, the rest is 0
pub fn cell_number(data: Option<&Data>) -> f64 {
    match data {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        Some(Data::DateTime(dt)) => dt.as_f64(),
        Some(Data::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Whole numbers without a trailing `.0`
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}
