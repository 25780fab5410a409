use crate::config::Variant;
use crate::html::HtmlTableFormatter;
use crate::reference::column_letter;
use crate::styles::StyleRegistry;
use crate::types::{Cell, ColumnWidth, WriteError};
use crate::xml::StructuredXmlFormatter;

/// Where a cell lands: zero-based column, one-based row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    pub column: u32,
    pub row: u32,
}

impl CellPosition {
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    pub fn column_letter(&self) -> Result<char, WriteError> {
        column_letter(self.column).ok_or_else(|| {
            WriteError::Malformed(format!(
                "column {} of row {} is beyond Z",
                self.column + 1,
                self.row
            ))
        })
    }
}

/// Fragment vocabulary of one output format. Each method appends exactly
/// one structural unit to `out`.
pub trait Formatter {
    fn variant(&self) -> Variant;

    /// Whether more than one sheet may be opened per document.
    fn supports_multiple_sheets(&self) -> bool;

    /// Whether the sheet name ends up in the output.
    fn uses_sheet_names(&self) -> bool;

    fn root_open(&self, out: &mut Vec<u8>);
    fn root_close(&self, out: &mut Vec<u8>);
    fn style_block(&self, styles: &StyleRegistry, out: &mut Vec<u8>);
    fn sheet_open(&self, name: &str, out: &mut Vec<u8>);
    fn sheet_close(&self, out: &mut Vec<u8>);
    fn columns(&self, widths: &[ColumnWidth], out: &mut Vec<u8>);
    fn row_open(&self, height: Option<f64>, out: &mut Vec<u8>);
    fn row_close(&self, out: &mut Vec<u8>);

    fn cell(
        &self,
        cell: &Cell,
        at: CellPosition,
        styles: &StyleRegistry,
        out: &mut Vec<u8>,
    ) -> Result<(), WriteError>;
}

pub fn formatter_for(variant: Variant) -> Box<dyn Formatter> {
    match variant {
        Variant::StructuredXml => Box::new(StructuredXmlFormatter),
        Variant::HtmlTable => Box::new(HtmlTableFormatter),
    }
}
