//! Output workbook composer
//!
//! Writes the consolidated "Results" and "Summary" sheets. Extracted values
//! are written as literals; every derived figure is written as formula text
//! so the workbook recomputes when the Summary parameters are edited.

use super::address::to_address;
use super::formula_check::FormulaChecker;
use super::formulas::{
    column_total, object_count, sector_total, summary_ref, FormulaBuilder, COLLECTION_RATE_CELL,
    PROJECTION_CELL, RESULTS_SHEET, SUMMARY_SHEET, UPLIFT_CELL,
};
use crate::catalog::{self, Column};
use crate::config::{Config, ScenarioConfig};
use crate::error::{FdmError, FdmResult};
use crate::types::{ExtractedRecord, FieldValue, Missing, ValueKind};
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, Formula, Note, Workbook, Worksheet, XlsxError,
};
use tracing::debug;

/// Sector label and SUMIF criteria for the Summary breakdown
const SECTORS: [(&str, &str); 4] = [
    ("Perkebunan", "*Perkebunan*"),
    ("Minerba", "*Minerba*"),
    ("Perhutanan (HTI)", "*HTI*"),
    ("Perhutanan (Hutan Alam)", "*Hutan Alam*"),
];

const NUMERIC_WIDTH: f64 = 18.0;
const TEXT_WIDTH: f64 = 24.0;
const HEADER_HEIGHT: f64 = 60.0;
const MISSING_FILL: u32 = 0xFFC7CE;
const NOTE_AUTHOR: &str = "fdm-extractor";

/// Summary block: BIT only (rows 1-11) or BIT + NDT (rows 13-23)
struct SummaryBlock {
    /// 1-based row of the block header
    header_row: u32,
    /// Results column that is aggregated
    value: Column,
    title: String,
    parameter_label: &'static str,
    parameter_value: f64,
    parameter_format: &'static str,
    /// The collection-rate input lives in this block; the other links to it
    holds_collection_rate: bool,
}

/// A composed workbook ready for delivery
pub struct OutputWorkbook {
    workbook: Workbook,
    row_count: usize,
}

impl OutputWorkbook {
    /// Number of data rows on the Results sheet
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Serialize the workbook to xlsx bytes
    pub fn into_bytes(mut self) -> FdmResult<Vec<u8>> {
        self.workbook
            .save_to_buffer()
            .map_err(|e| FdmError::Export(format!("Failed to serialize workbook: {}", e)))
    }
}

struct Formats {
    header: Format,
    text: Format,
    number: Format,
    percent: Format,
    missing_text: Format,
    missing_number: Format,
}

impl Formats {
    fn new() -> Self {
        let missing = Format::new().set_background_color(Color::RGB(MISSING_FILL));
        Self {
            header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap()
                .set_border_bottom(FormatBorder::Thin),
            text: Format::new(),
            number: Format::new().set_num_format("#,##0"),
            percent: Format::new().set_num_format("0.00%"),
            missing_text: missing.clone(),
            missing_number: missing.set_num_format("#,##0"),
        }
    }

    fn for_column(&self, column: Column) -> &Format {
        if column == Column::TaxDeltaPercent {
            &self.percent
        } else if is_numeric_column(column) {
            &self.number
        } else {
            &self.text
        }
    }
}

/// Columns J..BC hold figures
fn is_numeric_column(column: Column) -> bool {
    column.index() >= Column::LandArea.index()
}

fn export_error(context: &'static str) -> impl Fn(XlsxError) -> FdmError {
    move |e| FdmError::Export(format!("Failed to {}: {}", context, e))
}

/// Builds the output workbook from extracted records
pub struct OutputComposer {
    formulas: FormulaBuilder,
    checker: FormulaChecker,
    scenario: ScenarioConfig,
    formats: Formats,
}

impl OutputComposer {
    pub fn new(config: &Config) -> FdmResult<Self> {
        Ok(Self {
            formulas: FormulaBuilder::new(config),
            checker: FormulaChecker::new()?,
            scenario: config.scenario.clone(),
            formats: Formats::new(),
        })
    }

    /// Compose the Results and Summary sheets, one data row per record in
    /// the given order
    pub fn compose(&self, records: &[ExtractedRecord]) -> FdmResult<OutputWorkbook> {
        let mut workbook = Workbook::new();

        let results = self.results_sheet(records)?;
        workbook.push_worksheet(results);

        let summary = self.summary_sheet()?;
        workbook.push_worksheet(summary);

        debug!(rows = records.len(), "composed output workbook");

        Ok(OutputWorkbook {
            workbook,
            row_count: records.len(),
        })
    }

    // ───────────────────────────────────────────────────────────────────────
    // Results
    // ───────────────────────────────────────────────────────────────────────

    fn results_sheet(&self, records: &[ExtractedRecord]) -> FdmResult<Worksheet> {
        let mut sheet = Worksheet::new();
        sheet
            .set_name(RESULTS_SHEET)
            .map_err(export_error("set worksheet name"))?;

        self.write_results_header(&mut sheet)?;

        for (idx, record) in records.iter().enumerate() {
            let row = idx as u32 + 1;
            self.write_results_row(&mut sheet, row, idx + 1, record)?;
        }

        Ok(sheet)
    }

    fn write_results_header(&self, sheet: &mut Worksheet) -> FdmResult<()> {
        let header = &self.formats.header;

        for column in Column::ALL {
            let col = column.index() as u16;
            match self.formulas.header_formula(column) {
                Some(formula) => self.write_formula(sheet, RESULTS_SHEET, 0, col, &formula, header)?,
                None => {
                    sheet
                        .write_string_with_format(0, col, column.label(), header)
                        .map_err(export_error("write header"))?;
                }
            }

            let width = if is_numeric_column(column) {
                NUMERIC_WIDTH
            } else if column == Column::No {
                6.0
            } else {
                TEXT_WIDTH
            };
            sheet
                .set_column_width(col, width)
                .map_err(export_error("set column width"))?;
        }

        sheet
            .set_row_height(0, HEADER_HEIGHT)
            .map_err(export_error("set row height"))?;
        sheet
            .set_freeze_panes(1, 0)
            .map_err(export_error("freeze header row"))?;

        Ok(())
    }

    /// `row` is the zero-based worksheet row, `sequence` the value of NO
    fn write_results_row(
        &self,
        sheet: &mut Worksheet,
        row: u32,
        sequence: usize,
        record: &ExtractedRecord,
    ) -> FdmResult<()> {
        sheet
            .write_number_with_format(row, 0, sequence as f64, &self.formats.text)
            .map_err(export_error("write sequence number"))?;

        let excel_row = row + 1;
        for column in Column::ALL.into_iter().skip(1) {
            let col = column.index() as u16;
            let format = self.formats.for_column(column);

            if let Some(formula) = self.formulas.row_formula(column, excel_row) {
                self.write_formula(sheet, RESULTS_SHEET, row, col, &formula, format)?;
                continue;
            }

            match record.get(column) {
                Some(FieldValue::Text(text)) => {
                    sheet
                        .write_string_with_format(row, col, text, format)
                        .map_err(export_error("write value"))?;
                }
                Some(FieldValue::Number(n)) => {
                    sheet
                        .write_number_with_format(row, col, *n, format)
                        .map_err(export_error("write value"))?;
                }
                Some(FieldValue::Missing(reason)) => {
                    self.write_missing(sheet, row, column, *reason, &record.source)?;
                }
                Some(FieldValue::Pending) | None => {}
            }
        }

        Ok(())
    }

    /// Numeric fields get 0 and a note so formulas stay numeric; text
    /// fields get the display text
    fn write_missing(
        &self,
        sheet: &mut Worksheet,
        row: u32,
        column: Column,
        reason: Missing,
        source: &str,
    ) -> FdmResult<()> {
        let col = column.index() as u16;
        let kind = catalog::field(column)
            .map(|f| f.kind)
            .unwrap_or(ValueKind::Text);

        match kind {
            ValueKind::Number => {
                sheet
                    .write_number_with_format(row, col, 0.0, &self.formats.missing_number)
                    .map_err(export_error("write value"))?;
                let note = Note::new(format!("{} ({})", reason.display_text(), source))
                    .set_author(NOTE_AUTHOR);
                sheet
                    .insert_note(row, col, &note)
                    .map_err(export_error("add note"))?;
            }
            ValueKind::Text => {
                sheet
                    .write_string_with_format(
                        row,
                        col,
                        reason.display_text(),
                        &self.formats.missing_text,
                    )
                    .map_err(export_error("write value"))?;
            }
        }

        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────
    // Summary
    // ───────────────────────────────────────────────────────────────────────

    fn summary_sheet(&self) -> FdmResult<Worksheet> {
        let mut sheet = Worksheet::new();
        sheet
            .set_name(SUMMARY_SHEET)
            .map_err(export_error("set worksheet name"))?;

        let uplift = summary_ref(UPLIFT_CELL);
        let projection = summary_ref(PROJECTION_CELL);
        let blocks = [
            SummaryBlock {
                header_row: 1,
                value: Column::SimulatedTaxUpliftOnly,
                title: format!(
                    "=\"Keterangan (BIT + \"&{}*100&\"% dan NDT Tetap)\"",
                    uplift
                ),
                parameter_label: "Kenaikan BIT",
                parameter_value: self.scenario.uplift,
                parameter_format: "0.00%",
                holds_collection_rate: true,
            },
            SummaryBlock {
                header_row: 13,
                value: Column::SimulatedTaxCombined,
                title: format!(
                    "=\"Keterangan (BIT + \"&{}*100&\"% dan NDT + \"&{}*100&\"%)\"",
                    uplift, projection
                ),
                parameter_label: "Kenaikan NDT",
                parameter_value: self.scenario.projection,
                parameter_format: "0%",
                holds_collection_rate: false,
            },
        ];

        for block in &blocks {
            self.write_summary_block(&mut sheet, block)?;
        }

        for (col, width) in [(0u16, 48.0), (1, 40.0), (2, 22.0), (3, 12.0), (4, 15.0)] {
            sheet
                .set_column_width(col, width)
                .map_err(export_error("set column width"))?;
        }

        Ok(sheet)
    }

    fn write_summary_block(&self, sheet: &mut Worksheet, block: &SummaryBlock) -> FdmResult<()> {
        let formats = &self.formats;
        // zero-based worksheet rows
        let header = block.header_row - 1;
        let parameter = header + 1;
        let first_sector = header + 2;
        let others = first_sector + SECTORS.len() as u32;
        let total = others + 1;
        let target = total + 1;
        let difference = target + 1;
        let collection = difference + 1;

        // 1-based C-column addresses used in formulas
        let c = |row: u32| format!("C{}", row + 1);

        let write_str = |sheet: &mut Worksheet, row: u32, col: u16, text: &str, format: &Format| {
            sheet
                .write_string_with_format(row, col, text, format)
                .map(|_| ())
                .map_err(export_error("write summary"))
        };

        write_str(sheet, header, 0, "Poin", &formats.header)?;
        self.write_formula(sheet, SUMMARY_SHEET, header, 1, &block.title, &formats.header)?;
        write_str(sheet, header, 2, "Nilai (Rp)", &formats.header)?;
        write_str(sheet, header, 4, block.parameter_label, &formats.header)?;

        sheet
            .write_number_with_format(
                parameter,
                4,
                block.parameter_value,
                &Format::new().set_num_format(block.parameter_format),
            )
            .map_err(export_error("write summary"))?;

        for (offset, (label, criteria)) in SECTORS.iter().enumerate() {
            let row = first_sector + offset as u32;
            sheet
                .write_number(row, 0, offset as f64 + 1.0)
                .map_err(export_error("write summary"))?;
            write_str(sheet, row, 1, label, &formats.text)?;
            let formula = sector_total(criteria, block.value);
            self.write_formula(sheet, SUMMARY_SHEET, row, 2, &formula, &formats.number)?;
        }

        sheet
            .write_number(others, 0, SECTORS.len() as f64 + 1.0)
            .map_err(export_error("write summary"))?;
        write_str(sheet, others, 1, "Sektor Lainnya", &formats.text)?;
        let remainder = format!("={}-SUM({}:{})", c(total), c(first_sector), c(others - 1));
        self.write_formula(sheet, SUMMARY_SHEET, others, 2, &remainder, &formats.number)?;

        write_str(
            sheet,
            total,
            0,
            "Simulasi Penerimaan PBB 2026 (Collection Rate 100%)",
            &formats.text,
        )?;
        self.write_formula(sheet, SUMMARY_SHEET, total, 1, &object_count(), &formats.text)?;
        let sum = column_total(block.value);
        self.write_formula(sheet, SUMMARY_SHEET, total, 2, &sum, &formats.number)?;

        write_str(sheet, target, 0, "Target Penerimaan PBB 2026", &formats.text)?;
        sheet
            .write_number_with_format(target, 2, self.scenario.revenue_target, &formats.number)
            .map_err(export_error("write summary"))?;

        write_str(sheet, difference, 0, "Selisih Simulasi dengan Target", &formats.text)?;
        let delta = format!("={}-{}", c(total), c(target));
        self.write_formula(sheet, SUMMARY_SHEET, difference, 2, &delta, &formats.number)?;

        let rate_label = format!(
            "=\"Simulasi Penerimaan PBB 2026 (Collection Rate \"&{}*100&\"%)\"",
            COLLECTION_RATE_CELL
        );
        self.write_formula(sheet, SUMMARY_SHEET, collection, 0, &rate_label, &formats.text)?;
        let rate_format = Format::new().set_num_format("0%");
        if block.holds_collection_rate {
            sheet
                .write_number_with_format(collection, 1, self.scenario.collection_rate, &rate_format)
                .map_err(export_error("write summary"))?;
        } else {
            let linked = format!("={}", COLLECTION_RATE_CELL);
            self.write_formula(sheet, SUMMARY_SHEET, collection, 1, &linked, &rate_format)?;
        }
        let collected = format!("={}*B{}", c(total), collection + 1);
        self.write_formula(sheet, SUMMARY_SHEET, collection, 2, &collected, &formats.number)?;

        Ok(())
    }

    /// Check formula text, then write it
    fn write_formula(
        &self,
        sheet: &mut Worksheet,
        sheet_name: &str,
        row: u32,
        col: u16,
        formula: &str,
        format: &Format,
    ) -> FdmResult<()> {
        self.checker
            .check(formula)
            .map_err(|reason| FdmError::Formula {
                cell: format!("{}!{}", sheet_name, to_address(row, col as u32)),
                formula: formula.to_string(),
                reason,
            })?;

        sheet
            .write_formula_with_format(row, col, Formula::new(formula), format)
            .map_err(export_error("write formula"))?;

        Ok(())
    }
}
