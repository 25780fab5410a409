use crate::config::Variant;
use crate::format::{CellPosition, Formatter};
use crate::reference::to_absolute;
use crate::styles::{write_styles_css, StyleRegistry, DEFAULT_STYLE};
use crate::types::{write_number, Cell, CellType, ColumnWidth, WriteError};
use crate::xml::{write_attr, write_count_attr};

const HTML_OPEN: &[u8] = b"<html xmlns:o=\"urn:schemas-microsoft-com:office:office\"\n \
xmlns:x=\"urn:schemas-microsoft-com:office:excel\"\n \
xmlns=\"http://www.w3.org/TR/REC-html40\">\n\
<head>\n\
<meta http-equiv=\"Content-type\" content=\"text/html;charset=UTF-8\" />\n\
<!--[if gte mso 9]><xml><x:ExcelWorkbook><x:ExcelWorksheets><x:ExcelWorksheet><x:Name>Sheet1</x:Name>\
<x:WorksheetOptions><x:DisplayGridlines/></x:WorksheetOptions></x:ExcelWorksheet></x:ExcelWorksheets>\
</x:ExcelWorkbook></xml><![endif]-->\n";

const TABLE_OPEN: &[u8] = b"<table width=\"420.55\" border=\"0\" cellpadding=\"0\" cellspacing=\"0\" \
style=\"width:420.55pt;border-collapse:collapse;table-layout:fixed;\">\n";

/// Width given to columns left out of an explicit width list
const DEFAULT_COL_WIDTH: f64 = 47.8;

/// HTML table that Excel opens as a single worksheet. Cell values are
/// written as markup; formulas go into `x:fmla` in absolute notation.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTableFormatter;

impl Formatter for HtmlTableFormatter {
    fn variant(&self) -> Variant {
        Variant::HtmlTable
    }

    fn supports_multiple_sheets(&self) -> bool {
        false
    }

    fn uses_sheet_names(&self) -> bool {
        false
    }

    fn root_open(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(HTML_OPEN);
    }

    fn root_close(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"</html>\n");
    }

    fn style_block(&self, styles: &StyleRegistry, out: &mut Vec<u8>) {
        write_styles_css(styles, out);
    }

    fn sheet_open(&self, _name: &str, out: &mut Vec<u8>) {
        out.extend_from_slice(b"<body link=\"blue\" vlink=\"purple\" class=\"");
        out.extend_from_slice(DEFAULT_STYLE.as_bytes());
        out.extend_from_slice(b"\">\n");
        out.extend_from_slice(TABLE_OPEN);
    }

    fn sheet_close(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"</table>\n</body>\n");
    }

    /// Every column up to the widest index gets a `<col>`, since HTML
    /// columns are positional.
    fn columns(&self, widths: &[ColumnWidth], out: &mut Vec<u8>) {
        let max = widths.iter().map(|w| w.index).max().unwrap_or(0);
        for index in 1..=max {
            // later entries win, like a map keyed by index
            let width = widths
                .iter()
                .rev()
                .find(|w| w.index == index)
                .map_or(DEFAULT_COL_WIDTH, |w| w.width);
            out.extend_from_slice(b"<col width=\"");
            write_number(width, out);
            out.extend_from_slice(b"\" class=\"");
            out.extend_from_slice(DEFAULT_STYLE.as_bytes());
            out.extend_from_slice(b"\"/>\n");
        }
    }

    fn row_open(&self, height: Option<f64>, out: &mut Vec<u8>) {
        match height {
            Some(h) => {
                out.extend_from_slice(b"<tr height=\"");
                write_number(h, out);
                out.extend_from_slice(b"\" style=\"height:");
                write_number(h, out);
                out.extend_from_slice(b"pt\">");
            }
            None => out.extend_from_slice(b"<tr>"),
        }
    }

    fn row_close(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"</tr>\n");
    }

    fn cell(
        &self,
        cell: &Cell,
        at: CellPosition,
        styles: &StyleRegistry,
        out: &mut Vec<u8>,
    ) -> Result<(), WriteError> {
        let style = cell.style_id().unwrap_or(DEFAULT_STYLE);

        out.extend_from_slice(b"<td");
        write_attr(out, b"class", style.as_bytes());
        if cell.merge_down > 0 {
            write_count_attr(out, b"rowspan", cell.merge_down + 1);
        }
        if cell.merge_across > 0 {
            write_count_attr(out, b"colspan", cell.merge_across + 1);
        }
        if let Some(formula) = cell.formula.as_deref().filter(|f| !f.is_empty()) {
            let absolute = to_absolute(formula, at.column_letter()?, at.row)?;
            // nothing to rewrite: the formula has no cell references
            let formula = if absolute.is_empty() { formula } else { absolute.as_str() };
            write_attr(out, b"x:fmla", formula.as_bytes());
        }
        out.extend_from_slice(match cell.resolved_type() {
            CellType::String => b" x:str>",
            CellType::Number => b" x:num>",
        });

        // a link wins over any style-implied tag
        if let Some(href) = cell.href_target() {
            out.extend_from_slice(b"<a");
            write_attr(out, b"href", href.as_bytes());
            out.extend_from_slice(b" target=\"_parent\">");
            cell.value.write_raw(out);
            out.extend_from_slice(b"</a>");
        } else if let Some(tag) = styles.html_tag(style) {
            out.push(b'<');
            out.extend_from_slice(tag.as_bytes());
            out.push(b'>');
            cell.value.write_raw(out);
            out.extend_from_slice(b"</");
            out.extend_from_slice(tag.as_bytes());
            out.push(b'>');
        } else {
            cell.value.write_raw(out);
        }

        out.extend_from_slice(b"</td>");
        Ok(())
    }
}
