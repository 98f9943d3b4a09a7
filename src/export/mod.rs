//! Spreadsheet export of a simulation: a summary sheet and the schedule sheet

mod format;
mod report;
mod workbook;
mod writer;

pub use format::{
    file_stem, format_currency, format_date, format_percent, group_thousands, round2,
    sanitize_file_component, MISSING,
};
pub use report::{build_workbook, ExportContext, SCHEDULE_SHEET, SUMMARY_SHEET, WORKBOOK_CREATOR};
pub use workbook::{Cell, Column, Row, RowStyle, Sheet, Workbook};
pub use writer::{write_csv, write_json, write_sheet};
