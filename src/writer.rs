use crate::config::{Variant, WriterConfig};
use crate::format::{formatter_for, CellPosition, Formatter};
use crate::reference::column_letter;
use crate::sink::Sink;
use crate::styles::StyleRegistry;
use crate::types::{ColumnWidth, Row, WriteError};
use crate::validation::{
    validate_cell, validate_column_widths, validate_font, validate_row, validate_sheet_name,
};
use std::borrow::Borrow;

/// Rows buffered by `append_batch` between two sink writes
pub const BATCH_FLUSH_ROWS: usize = 500;

/// Sheet name that is replaced by `Sheet<n>`, same as an empty name
const PLACEHOLDER_SHEET_NAME: &str = "Sheet";

#[derive(Debug, Clone, Copy)]
struct WriterState {
    sheet_count: u32,
    /// zero-based column of the last cell written
    column: u32,
    /// one-based row the next `append_row` writes
    row: u32,
    started: bool,
    sheet_open: bool,
}

impl Default for WriterState {
    fn default() -> Self {
        Self {
            sheet_count: 0,
            column: 0,
            row: 1,
            started: false,
            sheet_open: false,
        }
    }
}

/// Streams a spreadsheet document into a [`Sink`] one fragment at a time.
///
/// Nothing is kept in memory beyond the row being assembled (or, inside
/// [`append_batch`](Self::append_batch), up to [`BATCH_FLUSH_ROWS`] rows).
/// Once any call fails with [`WriteError::Io`] the document should be
/// considered corrupt.
pub struct DocumentWriter<S: Sink> {
    sink: S,
    formatter: Box<dyn Formatter>,
    styles: StyleRegistry,
    state: WriterState,
}

impl<S: Sink> DocumentWriter<S> {
    /// Bind `sink` and build the style table. With `auto_start` set the root
    /// and style fragments are written immediately.
    pub fn new(sink: S, config: WriterConfig) -> Result<Self, WriteError> {
        validate_font(&config.font).map_err(WriteError::Config)?;
        let mut writer = Self {
            sink,
            formatter: formatter_for(config.variant),
            styles: StyleRegistry::new(config.font, config.extra_styles),
            state: WriterState::default(),
        };
        if config.auto_start {
            writer.start()?;
        }
        Ok(writer)
    }

    /// Write the root-open and style fragments. A second call writes them
    /// again.
    pub fn start(&mut self) -> Result<(), WriteError> {
        if self.state.started {
            log::warn!("document already started, root and style fragments will repeat");
        }
        let mut buf = Vec::with_capacity(4096);
        self.formatter.root_open(&mut buf);
        self.formatter.style_block(&self.styles, &mut buf);
        self.sink.write_all(&buf)?;
        self.state.started = true;
        log::debug!("started {} document", self.variant());
        Ok(())
    }

    pub fn open_sheet(&mut self, name: &str) -> Result<(), WriteError> {
        self.open_sheet_with_columns(name, &[])
    }

    /// Open a sheet, closing the current one first. HTML documents hold a
    /// single table, so a second call fails there.
    pub fn open_sheet_with_columns(
        &mut self,
        name: &str,
        widths: &[ColumnWidth],
    ) -> Result<(), WriteError> {
        if !self.formatter.supports_multiple_sheets() && self.state.sheet_count > 0 {
            return Err(WriteError::Unsupported(format!(
                "{} documents hold a single sheet",
                self.variant()
            )));
        }

        let number = self.state.sheet_count + 1;
        let name = if name.is_empty() || name == PLACEHOLDER_SHEET_NAME {
            format!("{}{}", PLACEHOLDER_SHEET_NAME, number)
        } else {
            name.to_string()
        };
        if self.formatter.uses_sheet_names() {
            validate_sheet_name(&name).map_err(WriteError::Malformed)?;
        }
        validate_column_widths(widths).map_err(WriteError::Malformed)?;

        if self.state.sheet_open {
            self.close_sheet()?;
        }

        let mut buf = Vec::with_capacity(256 + widths.len() * 80);
        self.formatter.sheet_open(&name, &mut buf);
        self.formatter.columns(widths, &mut buf);
        self.sink.write_all(&buf)?;

        self.state.sheet_count = number;
        self.state.sheet_open = true;
        self.state.row = 1;
        self.state.column = 0;
        log::debug!("opened sheet {} '{}'", number, name);
        Ok(())
    }

    /// Emit the sheet-close fragment. Without an open sheet the fragment is
    /// still written.
    pub fn close_sheet(&mut self) -> Result<(), WriteError> {
        if !self.state.sheet_open {
            log::warn!("closing a sheet while none is open");
        }
        let mut buf = Vec::with_capacity(32);
        self.formatter.sheet_close(&mut buf);
        self.sink.write_all(&buf)?;
        self.state.sheet_open = false;
        log::debug!("closed sheet {}", self.state.sheet_count);
        Ok(())
    }

    /// Write one row. On error nothing reaches the sink and the row counter
    /// does not move.
    pub fn append_row(&mut self, row: &Row) -> Result<(), WriteError> {
        let mut buf = Vec::with_capacity(64 + row.len() * 64);
        self.render_row(row, &mut buf)?;
        self.sink.write_all(&buf)?;
        Ok(())
    }

    /// Same output as `append_row` per row, written in chunks of
    /// [`BATCH_FLUSH_ROWS`]. Rows before a failing one are still written.
    pub fn append_batch<I, R>(&mut self, rows: I) -> Result<(), WriteError>
    where
        I: IntoIterator<Item = R>,
        R: Borrow<Row>,
    {
        let mut buf = Vec::new();
        let mut pending = 0usize;

        for row in rows {
            if let Err(e) = self.render_row(row.borrow(), &mut buf) {
                self.sink.write_all(&buf)?;
                return Err(e);
            }
            pending += 1;
            if pending == BATCH_FLUSH_ROWS {
                self.sink.write_all(&buf)?;
                self.sink.flush()?;
                log::trace!("flushed {} rows ({} bytes)", pending, buf.len());
                buf.clear();
                pending = 0;
            }
        }

        if !buf.is_empty() {
            self.sink.write_all(&buf)?;
            log::trace!("flushed {} rows ({} bytes)", pending, buf.len());
        }
        Ok(())
    }

    /// Close the open sheet, if any, and the root element.
    pub fn finish(&mut self) -> Result<(), WriteError> {
        if self.state.sheet_open {
            self.close_sheet()?;
        }
        let mut buf = Vec::with_capacity(16);
        self.formatter.root_close(&mut buf);
        self.sink.write_all(&buf)?;
        self.sink.flush()?;
        log::debug!("finished {} document with {} sheet(s)", self.variant(), self.state.sheet_count);
        Ok(())
    }

    /// Bytes written so far; later writes continue where they left off.
    pub fn read_raw(&mut self) -> Result<Vec<u8>, WriteError> {
        Ok(self.sink.read_contents()?)
    }

    /// Splice a finished fragment, typically another writer's `read_raw`,
    /// into this document verbatim.
    pub fn append_raw(&mut self, fragment: &[u8]) -> Result<(), WriteError> {
        if self.state.sheet_open {
            log::warn!("raw fragment appended inside open sheet {}", self.state.sheet_count);
        }
        self.sink.write_all(fragment)?;
        log::debug!("appended raw fragment of {} bytes", fragment.len());
        Ok(())
    }

    /// Throw away the writer and everything its sink holds.
    pub fn discard(self) -> Result<(), WriteError> {
        self.sink.discard()?;
        Ok(())
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    pub fn variant(&self) -> Variant {
        self.formatter.variant()
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    pub fn sheet_count(&self) -> u32 {
        self.state.sheet_count
    }

    pub fn current_row(&self) -> u32 {
        self.state.row
    }

    pub fn current_column(&self) -> char {
        column_letter(self.state.column).unwrap_or('A')
    }

    pub fn is_sheet_open(&self) -> bool {
        self.state.sheet_open
    }

    fn render_row(&mut self, row: &Row, out: &mut Vec<u8>) -> Result<(), WriteError> {
        if !self.state.sheet_open {
            return Err(WriteError::Unsupported(
                "no sheet is open, call open_sheet before appending rows".to_string(),
            ));
        }
        validate_row(row).map_err(WriteError::Malformed)?;

        let mark = out.len();
        match self.render_cells(row, out) {
            Ok(column) => {
                self.state.column = column;
                self.state.row += 1;
                log::trace!("row {} written with {} cells", self.state.row - 1, row.len());
                Ok(())
            }
            Err(e) => {
                out.truncate(mark);
                Err(e)
            }
        }
    }

    /// Returns the column of the last cell.
    fn render_cells(&self, row: &Row, out: &mut Vec<u8>) -> Result<u32, WriteError> {
        let row_num = self.state.row;
        let mut column = 0u32;

        self.formatter.row_open(row.height, out);
        for (i, cell) in row.cells.iter().enumerate() {
            if i > 0 {
                // a merged predecessor covers its extra columns too
                column = column
                    .saturating_add(row.cells[i - 1].merge_across)
                    .saturating_add(1);
            }
            validate_cell(cell, column, row_num).map_err(WriteError::Malformed)?;

            if let Some(style) = cell.style_id() {
                if !self.styles.is_declared(style) {
                    log::warn!("style '{}' at row {} is not declared", style, row_num);
                }
            }

            self.formatter
                .cell(cell, CellPosition::new(column, row_num), &self.styles, out)?;
        }
        self.formatter.row_close(out);
        Ok(column)
    }
}
