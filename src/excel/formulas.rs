//! Formula text for the output workbook
//!
//! Nothing here is evaluated. Every string is written into a cell and
//! recomputed by the spreadsheet application after download, so the only
//! obligation is that references point at the right row, column and sheet.
//! Cross-sheet references to the scenario inputs are absolute, which keeps
//! the Results sheet valid when the user edits the Summary parameters.

use crate::catalog::Column;
use crate::config::{Config, TaxConfig};

pub const RESULTS_SHEET: &str = "Results";
pub const SUMMARY_SHEET: &str = "Summary";

/// BIT uplift input on the Summary sheet
pub const UPLIFT_CELL: &str = "$E$2";
/// NDT projection input on the Summary sheet
pub const PROJECTION_CELL: &str = "$E$14";
/// Collection-rate input on the Summary sheet
pub const COLLECTION_RATE_CELL: &str = "$B$11";

/// Unit value of non-productive land relative to unproductive land
const NON_PRODUCTIVE_FACTOR: f64 = 0.5;

/// `'Summary'!$E$2`
pub fn summary_ref(cell: &str) -> String {
    format!("'{}'!{}", SUMMARY_SHEET, cell)
}

/// Full-column range on the Results sheet: `'Results'!$AY:$AY`
pub fn results_column(column: Column) -> String {
    let letter = column.letter();
    format!("'{}'!${}:${}", RESULTS_SHEET, letter, letter)
}

/// Builds the per-row and header formulas of the Results sheet
pub struct FormulaBuilder {
    tax: TaxConfig,
}

impl FormulaBuilder {
    pub fn new(config: &Config) -> Self {
        Self {
            tax: config.tax.clone(),
        }
    }

    /// `(base - deduction) * [ratio *] rate`
    pub fn tax_formula(&self, base_cell: &str) -> String {
        match self.tax.assessment_ratio {
            Some(ratio) => format!(
                "=({}-{})*{}*{}",
                base_cell, self.tax.deduction, ratio, self.tax.rate
            ),
            None => format!("=({}-{})*{}", base_cell, self.tax.deduction, self.tax.rate),
        }
    }

    /// Formula for a Results cell on a 1-based sheet row, `None` for
    /// columns that hold extracted values
    pub fn row_formula(&self, column: Column, row: u32) -> Option<String> {
        use Column::*;

        let c = |col: Column| format!("{}{}", col.letter(), row);
        let sum = |cols: &[Column]| cols.iter().map(|col| c(*col)).collect::<Vec<_>>().join("+");
        let uplift = summary_ref(UPLIFT_CELL);
        let projected = |col: Column| format!("={}*(1+{})", c(col), summary_ref(PROJECTION_CELL));
        let ratio = |num: Column, den: Column| format!("=IF({}=0,0,{}/{})", c(den), c(num), c(den));

        let formula = match column {
            ProductiveAreaCopy => format!("={}", c(ProductiveArea)),
            DevelopmentValueUplifted => format!("={}*(1+{})", c(DevelopmentValue), uplift),
            ProductiveUnitValue => ratio(ProductiveLandValue, ProductiveLandArea),
            ProductiveValue => format!("={}*{}", c(ProductiveLandArea), c(ProductiveUnitValue)),
            ProductiveValueProjected => projected(ProductiveValue),
            UnproductiveValue => format!(
                "=({})*{}",
                sum(&[UncultivatedArea, UnplantedArea, NurseryArea]),
                c(UnproductiveUnitValue)
            ),
            UnproductiveValueProjected => projected(UnproductiveValue),
            NonProductiveAreaCopy => format!("={}", c(NonProductiveArea)),
            NonProductiveUnitValue => {
                format!("={}*{}", c(UnproductiveUnitValue), NON_PRODUCTIVE_FACTOR)
            }
            NonProductiveValue => format!("={}*{}", c(NonProductiveAreaCopy), c(NonProductiveUnitValue)),
            NonProductiveValueProjected => projected(NonProductiveValue),
            BufferAreaCopy => format!("={}", c(BufferArea)),
            BufferUnitValue => format!("={}", c(UnproductiveUnitValue)),
            BufferValue => format!("={}*{}", c(BufferAreaCopy), c(BufferUnitValue)),
            BufferValueProjected => projected(BufferValue),
            EmplacementAreaCopy => format!("={}", c(EmplacementArea)),
            EmplacementValue => format!("={}*{}", c(EmplacementAreaCopy), c(EmplacementUnitValue)),
            EmplacementValueProjected => projected(EmplacementValue),
            TotalLandArea => format!(
                "={}",
                sum(&[
                    ProductiveAreaCopy,
                    UncultivatedArea,
                    UnplantedArea,
                    NurseryArea,
                    NonProductiveAreaCopy,
                    BufferAreaCopy,
                    EmplacementAreaCopy,
                ])
            ),
            TotalLandValue => format!(
                "={}",
                sum(&[
                    ProductiveValue,
                    UnproductiveValue,
                    NonProductiveValue,
                    BufferValue,
                    EmplacementValue,
                ])
            ),
            AverageLandUnitValue => ratio(TotalLandValue, TotalLandArea),
            BuildingUnitValue => ratio(BuildingValue, BuildingArea),
            SimulatedValueUpliftOnly => format!(
                "={}",
                sum(&[LandValue, DevelopmentValueUplifted, TotalLandValue, BuildingValue])
            ),
            SimulatedTaxUpliftOnly => self.tax_formula(&c(SimulatedValueUpliftOnly)),
            TaxDelta => format!("={}-{}", c(SimulatedTaxUpliftOnly), c(Tax2025)),
            TaxDeltaPercent => ratio(TaxDelta, Tax2025),
            SimulatedValueCombined => format!(
                "={}",
                sum(&[
                    LandValue,
                    DevelopmentValueUplifted,
                    ProductiveValueProjected,
                    UnproductiveValueProjected,
                    NonProductiveValueProjected,
                    BufferValueProjected,
                    EmplacementValueProjected,
                    BuildingValue,
                ])
            ),
            SimulatedTaxCombined => self.tax_formula(&c(SimulatedValueCombined)),
            _ => return None,
        };

        Some(formula)
    }

    /// Header formula for scenario columns; the header text carries the
    /// current parameter percentages
    pub fn header_formula(&self, column: Column) -> Option<String> {
        use Column::*;

        let uplift = format!("\"&{}*100&\"%", summary_ref(UPLIFT_CELL));
        let projection = format!("\"&{}*100&\"%", summary_ref(PROJECTION_CELL));

        let text = match column {
            DevelopmentValueUplifted => {
                format!("{} (Kenaikan BIT {})", DevelopmentValue.label(), uplift)
            }
            ProductiveValueProjected => projected_label(ProductiveValue, &projection),
            UnproductiveValueProjected => projected_label(UnproductiveValue, &projection),
            NonProductiveValueProjected => projected_label(NonProductiveValue, &projection),
            BufferValueProjected => projected_label(BufferValue, &projection),
            EmplacementValueProjected => projected_label(EmplacementValue, &projection),
            SimulatedValueUpliftOnly => format!(
                "SIMULASI TOTAL NJOP (TANAH + BANGUNAN) 2026 (Hanya Kenaikan BIT {} dan NDT Tetap)",
                uplift
            ),
            SimulatedTaxUpliftOnly => {
                format!("SIMULASI SPPT 2026 (Hanya Kenaikan BIT {} dan NDT Tetap)", uplift)
            }
            SimulatedValueCombined => format!(
                "SIMULASI TOTAL NJOP (TANAH + BANGUNAN) 2026 (Kenaikan BIT {} + NDT {})",
                uplift, projection
            ),
            SimulatedTaxCombined => format!(
                "SIMULASI SPPT 2026 (Kenaikan BIT {} + NDT {})",
                uplift, projection
            ),
            _ => return None,
        };

        Some(format!("=\"{}\"", text))
    }
}

fn projected_label(base: Column, projection: &str) -> String {
    format!("{} (Proyeksi NDT Naik {})", base.label(), projection)
}

/// `SUMIF` of a Results column over rows whose sector matches `criteria`
pub fn sector_total(criteria: &str, value: Column) -> String {
    format!(
        "=SUMIF({},\"{}\",{})",
        results_column(Column::Sector),
        criteria,
        results_column(value)
    )
}

pub fn column_total(value: Column) -> String {
    format!("=SUM({})", results_column(value))
}

/// Number of data rows, shown as `"<n> NOP"`
pub fn object_count() -> String {
    format!("=COUNT({})&\" NOP\"", results_column(Column::No))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FIELD_CATALOG;
    use crate::excel::formula_check::check_formula;

    fn builder() -> FormulaBuilder {
        FormulaBuilder::new(&Config::default())
    }

    #[test]
    fn test_row_formulas_reference_same_row() {
        let b = builder();
        assert_eq!(b.row_formula(Column::ProductiveAreaCopy, 2).unwrap(), "=K2");
        assert_eq!(
            b.row_formula(Column::DevelopmentValueUplifted, 2).unwrap(),
            "=U2*(1+'Summary'!$E$2)"
        );
        assert_eq!(b.row_formula(Column::ProductiveUnitValue, 3).unwrap(), "=IF(X3=0,0,W3/X3)");
        assert_eq!(b.row_formula(Column::ProductiveValue, 3).unwrap(), "=X3*Y3");
        assert_eq!(
            b.row_formula(Column::ProductiveValueProjected, 3).unwrap(),
            "=Z3*(1+'Summary'!$E$14)"
        );
        assert_eq!(b.row_formula(Column::UnproductiveValue, 7).unwrap(), "=(L7+M7+N7)*S7");
        assert_eq!(b.row_formula(Column::NonProductiveUnitValue, 2).unwrap(), "=S2*0.5");
        assert_eq!(
            b.row_formula(Column::TotalLandArea, 2).unwrap(),
            "=R2+L2+M2+N2+AD2+AH2+AL2"
        );
        assert_eq!(b.row_formula(Column::TotalLandValue, 2).unwrap(), "=Z2+AB2+AF2+AJ2+AN2");
        assert_eq!(b.row_formula(Column::AverageLandUnitValue, 2).unwrap(), "=IF(AP2=0,0,AQ2/AP2)");
        assert_eq!(b.row_formula(Column::SimulatedValueUpliftOnly, 2).unwrap(), "=T2+V2+AQ2+AT2");
        assert_eq!(b.row_formula(Column::TaxDelta, 2).unwrap(), "=AY2-AW2");
        assert_eq!(b.row_formula(Column::TaxDeltaPercent, 2).unwrap(), "=IF(AW2=0,0,AZ2/AW2)");
        assert_eq!(
            b.row_formula(Column::SimulatedValueCombined, 2).unwrap(),
            "=T2+V2+AA2+AC2+AG2+AK2+AO2+AT2"
        );
    }

    #[test]
    fn test_tax_formula() {
        let b = builder();
        assert_eq!(
            b.row_formula(Column::SimulatedTaxUpliftOnly, 2).unwrap(),
            "=(AX2-12000000)*0.005"
        );
        assert_eq!(
            b.row_formula(Column::SimulatedTaxCombined, 9).unwrap(),
            "=(BB9-12000000)*0.005"
        );
    }

    #[test]
    fn test_tax_formula_with_assessment_ratio() {
        let mut config = Config::default();
        config.tax.assessment_ratio = Some(0.4);
        let b = FormulaBuilder::new(&config);
        assert_eq!(b.tax_formula("AX2"), "=(AX2-12000000)*0.4*0.005");
    }

    #[test]
    fn test_extracted_columns_have_no_formula() {
        let b = builder();
        assert!(b.row_formula(Column::No, 2).is_none());
        for field in FIELD_CATALOG.iter() {
            assert_eq!(
                b.row_formula(field.column, 2).is_some(),
                field.is_formula(),
                "{:?}",
                field.column
            );
        }
    }

    #[test]
    fn test_header_formulas() {
        let b = builder();
        assert_eq!(
            b.header_formula(Column::DevelopmentValueUplifted).unwrap(),
            "=\"NJOP Bumi Berupa Pengembangan Tanah (Rp) (Kenaikan BIT \"&'Summary'!$E$2*100&\"%)\""
        );
        assert_eq!(
            b.header_formula(Column::SimulatedTaxCombined).unwrap(),
            "=\"SIMULASI SPPT 2026 (Kenaikan BIT \"&'Summary'!$E$2*100&\"% + NDT \"&'Summary'!$E$14*100&\"%)\""
        );
        assert!(b.header_formula(Column::Kpp).is_none());

        let dynamic = Column::ALL
            .iter()
            .filter(|c| b.header_formula(**c).is_some())
            .count();
        assert_eq!(dynamic, 10);
    }

    #[test]
    fn test_generated_formulas_are_well_formed() {
        let b = builder();
        for column in Column::ALL {
            if let Some(f) = b.row_formula(column, 42) {
                assert!(check_formula(&f).is_ok(), "{:?}: {}", column, f);
            }
            if let Some(f) = b.header_formula(column) {
                assert!(check_formula(&f).is_ok(), "{:?}: {}", column, f);
            }
        }
        for f in [
            sector_total("*Perkebunan*", Column::SimulatedTaxUpliftOnly),
            column_total(Column::SimulatedTaxCombined),
            object_count(),
        ] {
            assert!(check_formula(&f).is_ok(), "{}", f);
        }
    }

    #[test]
    fn test_parameter_references_are_absolute() {
        let b = builder();
        for column in Column::ALL {
            if let Some(f) = b.row_formula(column, 5) {
                if f.contains(SUMMARY_SHEET) {
                    assert!(
                        f.contains("'Summary'!$E$2") || f.contains("'Summary'!$E$14"),
                        "{}",
                        f
                    );
                }
            }
        }
    }

    #[test]
    fn test_summary_helpers() {
        assert_eq!(
            sector_total("*HTI*", Column::SimulatedTaxUpliftOnly),
            "=SUMIF('Results'!$C:$C,\"*HTI*\",'Results'!$AY:$AY)"
        );
        assert_eq!(column_total(Column::SimulatedTaxCombined), "=SUM('Results'!$BC:$BC)");
        assert_eq!(object_count(), "=COUNT('Results'!$A:$A)&\" NOP\"");
    }
}
