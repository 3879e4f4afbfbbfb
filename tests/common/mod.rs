//! Fixture FDM workbooks generated with rust_xlsxwriter

#![allow(dead_code)]

use rust_xlsxwriter::{Workbook, Worksheet};
use std::fs;
use std::path::{Path, PathBuf};

pub const TAXPAYER: &str = "PT Sawit Makmur";
pub const OBJECT_NUMBER: &str = "12.71.000.000.000-0001.0";

/// Builder for a source form with the standard sheet layout
pub struct FdmFixture {
    pub taxpayer: String,
    pub sector: String,
    pub kelurahan: String,
    pub productive_area: f64,
    pub productive_value: f64,
    pub tax_2025: f64,
    pub with_fdm_sheet: bool,
    pub with_building_sheet: bool,
}

impl Default for FdmFixture {
    fn default() -> Self {
        Self {
            taxpayer: TAXPAYER.to_string(),
            sector: "Perkebunan".to_string(),
            kelurahan: "Sei Mangkei # 0123 Blok A".to_string(),
            productive_area: 4_000_000.0,
            productive_value: 8_000_000_000.0,
            tax_2025: 55_000_000.0,
            with_fdm_sheet: true,
            with_building_sheet: true,
        }
    }
}

fn text(sheet: &mut Worksheet, row: u32, col: u16, value: &str) {
    sheet.write_string(row, col, value).unwrap();
}

fn number(sheet: &mut Worksheet, row: u32, col: u16, value: f64) {
    sheet.write_number(row, col, value).unwrap();
}

impl FdmFixture {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut workbook = Workbook::new();

        let home = workbook.add_worksheet();
        home.set_name("Sheet Home").unwrap();
        text(home, 4, 7, "KPP Madya Medan");
        text(home, 7, 3, &self.sector);
        text(home, 14, 7, &self.taxpayer);
        text(home, 20, 7, OBJECT_NUMBER);
        text(home, 26, 7, &self.kelurahan);
        text(home, 28, 7, "Bosar Maligas");
        text(home, 30, 7, "Simalungun");
        text(home, 32, 7, "Sumatera Utara");
        let areas = [
            5_000_000.0, // H37 land area
            self.productive_area,
            200_000.0,
            100_000.0,
            50_000.0,
            300_000.0,
            150_000.0,
            200_000.0, // H51 emplacement
        ];
        for (i, area) in areas.iter().enumerate() {
            number(home, 36 + 2 * i as u32, 7, *area);
        }
        number(home, 68, 7, 1_500.0);
        number(home, 70, 7, 9_000_000_000.0);
        number(home, 72, 7, 1_000_000_000.0);
        number(home, 130, 7, 12_500_000_000.0);

        let land = workbook.add_worksheet();
        land.set_name("C.1 Data Bumi").unwrap();
        text(land, 2, 0, "C.1 LAMPIRAN DATA BUMI");
        text(land, 40, 1, "Areal Emplasemen");
        number(land, 40, 5, 750.0);

        if self.with_building_sheet {
            let building = workbook.add_worksheet();
            building.set_name("C.2 Data Bangunan").unwrap();
            text(building, 60, 0, "JUMLAH LUAS");
            number(building, 60, 3, 1_200.0);
            text(building, 61, 0, "Jumlah NJOP");
            number(building, 61, 3, 3_600_000_000.0);
        }

        let assessment = workbook.add_worksheet();
        assessment.set_name("D").unwrap();
        text(assessment, 30, 0, "PBB yang harus dibayar");
        number(assessment, 30, 4, self.tax_2025);

        if self.with_fdm_sheet {
            let fdm = workbook.add_worksheet();
            fdm.set_name("FDM 2025").unwrap();
            text(fdm, 20, 1, "A. DATA BUMI");
            number(fdm, 24, 3, self.productive_area);
            number(fdm, 24, 7, self.productive_value);
        }

        workbook.save_to_buffer().unwrap()
    }

    pub fn write(&self, path: &Path) -> PathBuf {
        fs::write(path, self.to_bytes()).unwrap();
        path.to_path_buf()
    }
}

/// Bytes that are not a zip container
pub fn write_corrupt(path: &Path) -> PathBuf {
    fs::write(path, b"this is not a workbook").unwrap();
    path.to_path_buf()
}
