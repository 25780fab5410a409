//! Streaming writer for spreadsheet documents Excel opens natively: the
//! 2003 XML Spreadsheet format and an HTML table carrying Excel metadata.
//!
//! Rows are turned into markup and pushed to a [`Sink`] as they arrive, so
//! memory stays flat regardless of document size.
//!
//! ```no_run
//! use streamxl::{Cell, DocumentWriter, FileSink, Row, WriterConfig};
//!
//! # fn main() -> Result<(), streamxl::WriteError> {
//! let sink = FileSink::create("scores.xml")?;
//! let mut writer = DocumentWriter::new(sink, WriterConfig::xml())?;
//! writer.open_sheet("Scores")?;
//! writer.append_row(&Row::new(vec!["Name", "Math", "Art", "Total"]))?;
//! writer.append_row(&Row::new(vec![
//!     Cell::from("Ann"),
//!     Cell::new(90i64).number(),
//!     Cell::new(85i64).number(),
//!     Cell::empty().formula("=RC[-2]+RC[-1]"),
//! ]))?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod format;
mod html;
pub mod reference;
mod sink;
pub mod styles;
mod types;
mod validation;
mod writer;
mod xml;

pub use config::{FontConfig, Variant, WriterConfig};
pub use format::{formatter_for, CellPosition, Formatter};
pub use html::HtmlTableFormatter;
pub use reference::{canonicalize, column_index, column_letter, to_absolute, to_relative, ReferenceError};
pub use sink::{FileSink, Sink};
pub use styles::StyleRegistry;
pub use types::{Cell, CellType, CellValue, ColumnWidth, Row, WriteError};
pub use writer::{DocumentWriter, BATCH_FLUSH_ROWS};
pub use xml::{xml_escape_simd, StructuredXmlFormatter};
