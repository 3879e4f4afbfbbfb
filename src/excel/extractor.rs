//! Per-file extraction - one FDM workbook → one [`ExtractedRecord`]

use crate::catalog::{ExtractionMode, FieldDefinition, ANCHOR, FIELD_CATALOG, SUFFIX_STRIPPED};
use crate::config::{Config, ScanConfig};
use crate::error::{FdmError, FdmResult};
use crate::excel::source::{cell_number, cell_text, Sheet, SourceWorkbook};
use crate::types::{ExtractedRecord, FieldValue, Missing, ValueKind};
use calamine::Data;
use regex::Regex;
use tracing::{debug, warn};

/// Runs the field catalog against uploaded workbooks
pub struct FileExtractor {
    scan: ScanConfig,
    /// Trailing `# 123 ...` registry suffix on area names
    suffix_pattern: Regex,
}

impl FileExtractor {
    pub fn new(config: &Config) -> FdmResult<Self> {
        let suffix_pattern = Regex::new(r"\s*#\s*\d+.*$")
            .map_err(|e| FdmError::Config(format!("Regex error: {}", e)))?;

        Ok(Self {
            scan: config.scan,
            suffix_pattern,
        })
    }

    /// Decode a file and extract it. Only decoding can fail.
    pub fn extract_bytes(&self, file_name: &str, bytes: Vec<u8>) -> FdmResult<ExtractedRecord> {
        let workbook = SourceWorkbook::from_bytes(file_name, bytes)?;
        Ok(self.extract(file_name, &workbook))
    }

    /// Extract every catalog field from a decoded workbook
    pub fn extract(&self, source: &str, workbook: &SourceWorkbook) -> ExtractedRecord {
        let anchor = self.locate_anchor(workbook);
        if anchor.is_none() {
            debug!(file = source, marker = ANCHOR.marker, "anchor row not found");
        }

        let mut record = ExtractedRecord::new(source);
        for field in FIELD_CATALOG.iter() {
            let value = self.extract_field(workbook, field, anchor);
            if let FieldValue::Missing(reason) = &value {
                debug!(file = source, field = field.label(), %reason, "field not extracted");
            }
            record.push(field.column, value);
        }

        record
    }

    /// Row of the anchor marker on the FDM sheet, scanned once per workbook
    pub fn locate_anchor(&self, workbook: &SourceWorkbook) -> Option<u32> {
        let sheet = workbook.resolve(ANCHOR.sheet)?;
        sheet
            .find_text(ANCHOR.marker, self.scan.anchor_rows, self.scan.anchor_cols)
            .map(|(row, _)| row)
    }

    fn extract_field(
        &self,
        workbook: &SourceWorkbook,
        field: &FieldDefinition,
        anchor: Option<u32>,
    ) -> FieldValue {
        let hint = match (field.mode, field.sheet) {
            (ExtractionMode::Formula, _) | (_, None) => return FieldValue::Pending,
            (_, Some(hint)) => hint,
        };

        if let ExtractionMode::AnchorRelative { .. } = field.mode {
            if anchor.is_none() {
                return FieldValue::Missing(Missing::AnchorNotFound);
            }
        }

        let Some(sheet) = workbook.resolve(hint) else {
            return FieldValue::Missing(Missing::SheetNotFound);
        };

        match field.mode {
            ExtractionMode::Static { address } => match sheet.cell_at(address) {
                Ok(data) => self.value_of(field, data),
                Err(e) => {
                    warn!(field = field.label(), error = %e, "bad catalog address");
                    self.value_of(field, None)
                }
            },
            ExtractionMode::KeywordScan {
                keyword,
                value_offset,
            } => self.keyword_value(sheet, field, keyword, value_offset),
            ExtractionMode::AnchorRelative { row_offset, col } => match anchor {
                Some(anchor_row) => {
                    self.value_of(field, sheet.cell(anchor_row.saturating_add(row_offset), col))
                }
                None => FieldValue::Missing(Missing::AnchorNotFound),
            },
            ExtractionMode::Formula => FieldValue::Pending,
        }
    }

    fn keyword_value(
        &self,
        sheet: &Sheet,
        field: &FieldDefinition,
        keyword: &str,
        value_offset: u32,
    ) -> FieldValue {
        match sheet.find_text(keyword, self.scan.keyword_rows, self.scan.keyword_cols) {
            Some((row, col)) => self.value_of(field, sheet.cell(row, col.saturating_add(value_offset))),
            None => FieldValue::Missing(Missing::KeywordNotFound),
        }
    }

    fn value_of(&self, field: &FieldDefinition, data: Option<&Data>) -> FieldValue {
        match field.kind {
            ValueKind::Number => FieldValue::Number(cell_number(data)),
            ValueKind::Text => {
                let text = data.and_then(cell_text).unwrap_or_default();
                if field.column == SUFFIX_STRIPPED {
                    FieldValue::Text(self.strip_suffix(&text))
                } else {
                    FieldValue::Text(text)
                }
            }
        }
    }

    /// `SEI MANGKEI # 0123 BLOK A` → `SEI MANGKEI`
    pub fn strip_suffix(&self, text: &str) -> String {
        self.suffix_pattern.replace(text, "").trim().to_string()
    }
}
