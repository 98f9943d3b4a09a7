//! File writers for a built workbook

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use super::workbook::{Sheet, Workbook};
use crate::error::Result;

/// Write one CSV file per sheet into `dir`, named `{stem}_{sheet}.csv`
pub fn write_csv<P: AsRef<Path>>(workbook: &Workbook, dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(workbook.sheets.len());
    for sheet in &workbook.sheets {
        let path = dir.join(format!("{}_{}.csv", workbook.file_stem, sheet.name));
        write_sheet(sheet, File::create(&path)?)?;
        log::debug!("Wrote sheet '{}' to {}", sheet.name, path.display());
        written.push(path);
    }
    Ok(written)
}

/// Write a sheet as CSV; rows keep their own width
pub fn write_sheet<W: Write>(sheet: &Sheet, out: W) -> Result<()> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(out);

    for row in &sheet.rows {
        if row.is_blank() {
            writer.write_record([""])?;
        } else {
            writer.write_record(row.cells.iter().map(|cell| cell.render()))?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write the whole workbook as pretty JSON to `{dir}/{stem}.json`
pub fn write_json<P: AsRef<Path>>(workbook: &Workbook, dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let path = dir.join(format!("{}.json", workbook.file_stem));
    let file = File::create(&path)?;
    serde_json::to_writer_pretty(file, workbook)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{Cell, Row, RowStyle};

    fn sheet() -> Sheet {
        let mut sheet = Sheet::new("Resumen", Vec::new());
        sheet.add_row(Row::new(RowStyle::Title, vec![Cell::text("RESUMEN")]));
        sheet.add_blank();
        sheet.add_row(Row::new(
            RowStyle::Data,
            vec![Cell::text("Cuota Mensual"), Cell::text("S/ 8,856.21")],
        ));
        sheet.add_row(Row::new(RowStyle::Data, vec![Cell::Integer(3), Cell::Number(12.5)]));
        sheet
    }

    #[test]
    fn test_write_sheet() {
        let mut buffer = Vec::new();
        write_sheet(&sheet(), &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "RESUMEN\n\"\"\nCuota Mensual,\"S/ 8,856.21\"\n3,12.50\n");
    }

    #[test]
    fn test_write_files() {
        let dir = std::env::temp_dir().join(format!("mortgage_export_{}", std::process::id()));
        let workbook = Workbook {
            creator: "test".to_string(),
            file_stem: "Simulacion_test_2025-01-01".to_string(),
            sheets: vec![sheet()],
        };

        let csv_paths = write_csv(&workbook, &dir).unwrap();
        assert_eq!(csv_paths.len(), 1);
        assert!(csv_paths[0].ends_with("Simulacion_test_2025-01-01_Resumen.csv"));

        let json_path = write_json(&workbook, &dir).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["sheets"][0]["rows"][2]["cells"][1], "S/ 8,856.21");
        assert_eq!(json["sheets"][0]["rows"][3]["cells"][0], 3);

        fs::remove_dir_all(&dir).unwrap();
    }
}
