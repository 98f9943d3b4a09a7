//! In-memory workbook handed to the writers

use serde::Serialize;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Integer(i64),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Value as it appears in a CSV export
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format!("{:.2}", n),
            Cell::Integer(i) => i.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

/// Visual role of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStyle {
    Title,
    SectionHeader,
    Header,
    Data,
    Totals,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub style: RowStyle,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(style: RowStyle, cells: Vec<Cell>) -> Self {
        Self { style, cells }
    }

    pub fn blank() -> Self {
        Self::new(RowStyle::Blank, Vec::new())
    }

    pub fn is_blank(&self) -> bool {
        self.style == RowStyle::Blank
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub header: Option<String>,
    pub key: &'static str,
    pub width: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn add_blank(&mut self) {
        self.rows.push(Row::blank());
    }

    /// Rows with the given style
    pub fn rows_styled(&self, style: RowStyle) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(move |row| row.style == style)
    }

    /// Value next to a label in a two-column sheet
    pub fn lookup(&self, label: &str) -> Option<&Cell> {
        self.rows_styled(RowStyle::Data)
            .find(|row| matches!(row.cells.first(), Some(Cell::Text(l)) if l == label))
            .and_then(|row| row.cells.get(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workbook {
    pub creator: String,
    pub file_stem: String,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}
