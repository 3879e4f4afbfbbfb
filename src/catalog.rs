//! Field catalog for the FDM source form
//!
//! The Results sheet schema is the [`Column`] enum: one variant per output
//! column, in output order. [`FIELD_CATALOG`] says where each column's value
//! comes from in an uploaded FDM workbook, or marks it as a formula column
//! that the composer fills in.
//!
//! Any layout change in the source form is a change to this file.

use crate::excel::address::column_index_to_letter;
use crate::types::ValueKind;
use serde::Serialize;

/// Columns of the Results sheet, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Column {
    No,
    Kpp,
    Sector,
    TaxpayerName,
    ObjectNumber,
    Kelurahan,
    Kecamatan,
    Regency,
    Province,
    LandArea,
    ProductiveArea,
    UncultivatedArea,
    UnplantedArea,
    NurseryArea,
    NonProductiveArea,
    BufferArea,
    EmplacementArea,
    ProductiveAreaCopy,
    UnproductiveUnitValue,
    LandValue,
    DevelopmentValue,
    DevelopmentValueUplifted,
    ProductiveLandValue,
    ProductiveLandArea,
    ProductiveUnitValue,
    ProductiveValue,
    ProductiveValueProjected,
    UnproductiveValue,
    UnproductiveValueProjected,
    NonProductiveAreaCopy,
    NonProductiveUnitValue,
    NonProductiveValue,
    NonProductiveValueProjected,
    BufferAreaCopy,
    BufferUnitValue,
    BufferValue,
    BufferValueProjected,
    EmplacementAreaCopy,
    EmplacementUnitValue,
    EmplacementValue,
    EmplacementValueProjected,
    TotalLandArea,
    TotalLandValue,
    AverageLandUnitValue,
    BuildingArea,
    BuildingValue,
    BuildingUnitValue,
    TotalAssessedValue2025,
    Tax2025,
    SimulatedValueUpliftOnly,
    SimulatedTaxUpliftOnly,
    TaxDelta,
    TaxDeltaPercent,
    SimulatedValueCombined,
    SimulatedTaxCombined,
}

impl Column {
    pub const ALL: [Column; 55] = [
        Column::No,
        Column::Kpp,
        Column::Sector,
        Column::TaxpayerName,
        Column::ObjectNumber,
        Column::Kelurahan,
        Column::Kecamatan,
        Column::Regency,
        Column::Province,
        Column::LandArea,
        Column::ProductiveArea,
        Column::UncultivatedArea,
        Column::UnplantedArea,
        Column::NurseryArea,
        Column::NonProductiveArea,
        Column::BufferArea,
        Column::EmplacementArea,
        Column::ProductiveAreaCopy,
        Column::UnproductiveUnitValue,
        Column::LandValue,
        Column::DevelopmentValue,
        Column::DevelopmentValueUplifted,
        Column::ProductiveLandValue,
        Column::ProductiveLandArea,
        Column::ProductiveUnitValue,
        Column::ProductiveValue,
        Column::ProductiveValueProjected,
        Column::UnproductiveValue,
        Column::UnproductiveValueProjected,
        Column::NonProductiveAreaCopy,
        Column::NonProductiveUnitValue,
        Column::NonProductiveValue,
        Column::NonProductiveValueProjected,
        Column::BufferAreaCopy,
        Column::BufferUnitValue,
        Column::BufferValue,
        Column::BufferValueProjected,
        Column::EmplacementAreaCopy,
        Column::EmplacementUnitValue,
        Column::EmplacementValue,
        Column::EmplacementValueProjected,
        Column::TotalLandArea,
        Column::TotalLandValue,
        Column::AverageLandUnitValue,
        Column::BuildingArea,
        Column::BuildingValue,
        Column::BuildingUnitValue,
        Column::TotalAssessedValue2025,
        Column::Tax2025,
        Column::SimulatedValueUpliftOnly,
        Column::SimulatedTaxUpliftOnly,
        Column::TaxDelta,
        Column::TaxDeltaPercent,
        Column::SimulatedValueCombined,
        Column::SimulatedTaxCombined,
    ];

    /// Zero-based position in the Results sheet
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column letter in the Results sheet (`Column::LandArea` → `J`)
    pub fn letter(self) -> String {
        column_index_to_letter(self.index())
    }

    /// Unique column label. Scenario columns are shown under a formula
    /// header that spells out the live parameter values instead.
    pub fn label(self) -> &'static str {
        match self {
            Column::No => "NO",
            Column::Kpp => "KPP",
            Column::Sector => "Sektor",
            Column::TaxpayerName => "NAMA WAJIB PAJAK",
            Column::ObjectNumber => "NOMOR OBJEK PAJAK",
            Column::Kelurahan => "KELURAHAN",
            Column::Kecamatan => "KECAMATAN",
            Column::Regency => "KABUPATEN/KOTA",
            Column::Province => "PROVINSI",
            Column::LandArea => "LUAS BUMI",
            Column::ProductiveArea => "Areal Produktif",
            Column::UncultivatedArea => "Areal Belum Diolah",
            Column::UnplantedArea => "Areal Sudah Diolah Belum Ditanami",
            Column::NurseryArea => "Areal Pembibitan",
            Column::NonProductiveArea => "Areal Tidak Produktif",
            Column::BufferArea => "Areal Pengaman",
            Column::EmplacementArea => "Areal Emplasemen",
            Column::ProductiveAreaCopy => "Areal Produktif (Copy)",
            Column::UnproductiveUnitValue => "NJOP/M Areal Belum Produktif",
            Column::LandValue => "NJOP Bumi Berupa Tanah (Rp)",
            Column::DevelopmentValue => "NJOP Bumi Berupa Pengembangan Tanah (Rp)",
            Column::DevelopmentValueUplifted => {
                "NJOP Bumi Berupa Pengembangan Tanah (Rp) (Kenaikan BIT)"
            }
            Column::ProductiveLandValue => "NJOP Bumi Areal Produktif (Rp)",
            Column::ProductiveLandArea => "Luas Bumi Areal Produktif (m²)",
            Column::ProductiveUnitValue => "NJOP Bumi Per M2 Areal Produktif (Rp/m2)",
            Column::ProductiveValue => "NJOP BUMI (Rp) AREA PRODUKTIF pada A. DATA BUMI",
            Column::ProductiveValueProjected => {
                "NJOP BUMI (Rp) AREA PRODUKTIF pada A. DATA BUMI (Proyeksi NDT)"
            }
            Column::UnproductiveValue => "NJOP BUMI (Rp) AREAL BELUM PRODUKTIF pada A. DATA BUMI",
            Column::UnproductiveValueProjected => {
                "NJOP BUMI (Rp) AREAL BELUM PRODUKTIF pada A. DATA BUMI (Proyeksi NDT)"
            }
            Column::NonProductiveAreaCopy => "Areal Tidak Produktif (Copy)",
            Column::NonProductiveUnitValue => "NJOP/M Areal Tidak Produktif",
            Column::NonProductiveValue => "NJOP BUMI (Rp) AREAL TIDAK PRODUKTIF pada A. DATA BUMI",
            Column::NonProductiveValueProjected => {
                "NJOP BUMI (Rp) AREAL TIDAK PRODUKTIF pada A. DATA BUMI (Proyeksi NDT)"
            }
            Column::BufferAreaCopy => "Areal Pengaman (Copy)",
            Column::BufferUnitValue => "NJOP/M Areal Pengaman",
            Column::BufferValue => "NJOP BUMI (Rp) AREAL PENGAMAN pada A. DATA BUMI",
            Column::BufferValueProjected => {
                "NJOP BUMI (Rp) AREAL PENGAMAN pada A. DATA BUMI (Proyeksi NDT)"
            }
            Column::EmplacementAreaCopy => "Areal Emplasemen (Copy)",
            Column::EmplacementUnitValue => "NJOP/M Areal Emplasemen",
            Column::EmplacementValue => "NJOP BUMI (Rp) AREAL EMPLASEMEN pada A. DATA BUMI",
            Column::EmplacementValueProjected => {
                "NJOP BUMI (Rp) AREAL EMPLASEMEN pada A. DATA BUMI (Proyeksi NDT)"
            }
            Column::TotalLandArea => "JUMLAH Luas (m2) pada A. DATA BUMI",
            Column::TotalLandValue => "JUMLAH NJOP BUMI (Rp) pada A. DATA BUMI",
            Column::AverageLandUnitValue => {
                "NJOP BUMI (Rp) NJOP Bumi Per Meter Persegi pada A. DATA BUMI"
            }
            Column::BuildingArea => "Jumlah LUAS pada B. DATA BANGUNAN",
            Column::BuildingValue => "Jumlah NJOP BANGUNAN pada B. DATA BANGUNAN",
            Column::BuildingUnitValue => "NJOP BANGUNAN PER METER PERSEGI*) pada B. DATA BANGUNAN",
            Column::TotalAssessedValue2025 => "TOTAL NJOP (TANAH + BANGUNAN) 2025",
            Column::Tax2025 => "SPPT 2025",
            Column::SimulatedValueUpliftOnly => {
                "SIMULASI TOTAL NJOP (TANAH + BANGUNAN) 2026 (Hanya Kenaikan BIT)"
            }
            Column::SimulatedTaxUpliftOnly => "SIMULASI SPPT 2026 (Hanya Kenaikan BIT)",
            Column::TaxDelta => "Selisih Ketetapan (Rp)",
            Column::TaxDeltaPercent => "Selisih Ketetapan (%)",
            Column::SimulatedValueCombined => {
                "SIMULASI TOTAL NJOP (TANAH + BANGUNAN) 2026 (Kenaikan BIT + NDT)"
            }
            Column::SimulatedTaxCombined => "SIMULASI SPPT 2026 (Kenaikan BIT + NDT)",
        }
    }
}

/// How a field obtains its value from a source workbook
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtractionMode {
    /// Fixed A1 address
    Static { address: &'static str },
    /// First cell in the scan window whose text contains `keyword`
    /// (case-insensitive); the value sits `value_offset` columns to its right
    KeywordScan {
        keyword: &'static str,
        value_offset: u32,
    },
    /// Offset from the workbook's anchor row; `col` is zero-based
    AnchorRelative { row_offset: u32, col: u32 },
    /// Not read from the source; the composer writes a formula
    Formula,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDefinition {
    pub column: Column,
    /// Sheet-name hint; `None` for formula columns
    pub sheet: Option<&'static str>,
    pub kind: ValueKind,
    pub mode: ExtractionMode,
}

impl FieldDefinition {
    pub fn label(&self) -> &'static str {
        self.column.label()
    }

    pub fn is_formula(&self) -> bool {
        matches!(self.mode, ExtractionMode::Formula)
    }
}

/// Locates the anchor row that anchor-relative fields are measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorRule {
    pub sheet: &'static str,
    pub marker: &'static str,
}

pub const HOME_SHEET: &str = "Sheet Home";
pub const LAND_SHEET: &str = "C.1";
pub const BUILDING_SHEET: &str = "C.2";
pub const ASSESSMENT_SHEET: &str = "D";
pub const FDM_SHEET: &str = "FDM";

pub const ANCHOR: AnchorRule = AnchorRule {
    sheet: FDM_SHEET,
    marker: "DATA BUMI",
};

/// Text field whose trailing `# <digits> ...` suffix is dropped
pub const SUFFIX_STRIPPED: Column = Column::Kelurahan;

const fn home_text(column: Column, address: &'static str) -> FieldDefinition {
    FieldDefinition {
        column,
        sheet: Some(HOME_SHEET),
        kind: ValueKind::Text,
        mode: ExtractionMode::Static { address },
    }
}

const fn home_number(column: Column, address: &'static str) -> FieldDefinition {
    FieldDefinition {
        column,
        sheet: Some(HOME_SHEET),
        kind: ValueKind::Number,
        mode: ExtractionMode::Static { address },
    }
}

const fn scanned(
    column: Column,
    sheet: &'static str,
    keyword: &'static str,
    value_offset: u32,
) -> FieldDefinition {
    FieldDefinition {
        column,
        sheet: Some(sheet),
        kind: ValueKind::Number,
        mode: ExtractionMode::KeywordScan {
            keyword,
            value_offset,
        },
    }
}

const fn anchored(column: Column, row_offset: u32, col: u32) -> FieldDefinition {
    FieldDefinition {
        column,
        sheet: Some(FDM_SHEET),
        kind: ValueKind::Number,
        mode: ExtractionMode::AnchorRelative { row_offset, col },
    }
}

const fn formula(column: Column) -> FieldDefinition {
    FieldDefinition {
        column,
        sheet: None,
        kind: ValueKind::Number,
        mode: ExtractionMode::Formula,
    }
}

/// Every Results column after `NO`, in output order
pub const FIELD_CATALOG: [FieldDefinition; 54] = [
    home_text(Column::Kpp, "H5"),
    home_text(Column::Sector, "D8"),
    home_text(Column::TaxpayerName, "H15"),
    home_text(Column::ObjectNumber, "H21"),
    home_text(Column::Kelurahan, "H27"),
    home_text(Column::Kecamatan, "H29"),
    home_text(Column::Regency, "H31"),
    home_text(Column::Province, "H33"),
    home_number(Column::LandArea, "H37"),
    home_number(Column::ProductiveArea, "H39"),
    home_number(Column::UncultivatedArea, "H41"),
    home_number(Column::UnplantedArea, "H43"),
    home_number(Column::NurseryArea, "H45"),
    home_number(Column::NonProductiveArea, "H47"),
    home_number(Column::BufferArea, "H49"),
    home_number(Column::EmplacementArea, "H51"),
    formula(Column::ProductiveAreaCopy),
    home_number(Column::UnproductiveUnitValue, "H69"),
    home_number(Column::LandValue, "H71"),
    home_number(Column::DevelopmentValue, "H73"),
    formula(Column::DevelopmentValueUplifted),
    anchored(Column::ProductiveLandValue, 4, 7),
    anchored(Column::ProductiveLandArea, 4, 3),
    formula(Column::ProductiveUnitValue),
    formula(Column::ProductiveValue),
    formula(Column::ProductiveValueProjected),
    formula(Column::UnproductiveValue),
    formula(Column::UnproductiveValueProjected),
    formula(Column::NonProductiveAreaCopy),
    formula(Column::NonProductiveUnitValue),
    formula(Column::NonProductiveValue),
    formula(Column::NonProductiveValueProjected),
    formula(Column::BufferAreaCopy),
    formula(Column::BufferUnitValue),
    formula(Column::BufferValue),
    formula(Column::BufferValueProjected),
    formula(Column::EmplacementAreaCopy),
    scanned(Column::EmplacementUnitValue, LAND_SHEET, "emplasemen", 4),
    formula(Column::EmplacementValue),
    formula(Column::EmplacementValueProjected),
    formula(Column::TotalLandArea),
    formula(Column::TotalLandValue),
    formula(Column::AverageLandUnitValue),
    scanned(Column::BuildingArea, BUILDING_SHEET, "jumlah luas", 3),
    scanned(Column::BuildingValue, BUILDING_SHEET, "jumlah njop", 3),
    formula(Column::BuildingUnitValue),
    home_number(Column::TotalAssessedValue2025, "H131"),
    scanned(Column::Tax2025, ASSESSMENT_SHEET, "pbb yang harus dibayar", 4),
    formula(Column::SimulatedValueUpliftOnly),
    formula(Column::SimulatedTaxUpliftOnly),
    formula(Column::TaxDelta),
    formula(Column::TaxDeltaPercent),
    formula(Column::SimulatedValueCombined),
    formula(Column::SimulatedTaxCombined),
];

/// Catalog entry for a column (`None` for `NO`)
pub fn field(column: Column) -> Option<&'static FieldDefinition> {
    FIELD_CATALOG.iter().find(|f| f.column == column)
}
