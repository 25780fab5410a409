use crate::config::Variant;
use crate::format::{CellPosition, Formatter};
use crate::styles::{write_styles_xml, StyleRegistry, DEFAULT_STYLE};
use crate::types::{write_number, Cell, CellType, ColumnWidth, WriteError};

const WORKBOOK_OPEN: &[u8] = b"<?xml version=\"1.0\"?>\n\
<?mso-application progid=\"Excel.Sheet\"?>\n\
<Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\"\n \
xmlns:o=\"urn:schemas-microsoft-com:office:office\"\n \
xmlns:x=\"urn:schemas-microsoft-com:office:excel\"\n \
xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\"\n \
xmlns:html=\"http://www.w3.org/TR/REC-html40\">\n";

/// SIMD-accelerated XML escaping
#[inline(always)]
pub fn xml_escape_simd(input: &[u8], output: &mut Vec<u8>) {
    let needs_escape = memchr::memchr3(b'&', b'<', b'>', input).is_some()
        || memchr::memchr2(b'"', b'\'', input).is_some();

    if !needs_escape {
        output.extend_from_slice(input);
        return;
    }

    let mut last = 0;
    let mut pos = 0;

    while pos < input.len() {
        let byte = input[pos];
        let escape: &[u8] = match byte {
            b'&' => b"&amp;",
            b'<' => b"&lt;",
            b'>' => b"&gt;",
            b'"' => b"&quot;",
            b'\'' => b"&apos;",
            _ => {
                pos += 1;
                continue;
            }
        };

        output.extend_from_slice(&input[last..pos]);
        output.extend_from_slice(escape);
        pos += 1;
        last = pos;
    }

    if last < input.len() {
        output.extend_from_slice(&input[last..]);
    }
}

/// ` name="value"` with the value escaped
#[inline]
pub(crate) fn write_attr(out: &mut Vec<u8>, name: &[u8], value: &[u8]) {
    out.push(b' ');
    out.extend_from_slice(name);
    out.extend_from_slice(b"=\"");
    xml_escape_simd(value, out);
    out.push(b'"');
}

#[inline]
pub(crate) fn write_count_attr(out: &mut Vec<u8>, name: &[u8], value: u32) {
    out.push(b' ');
    out.extend_from_slice(name);
    out.extend_from_slice(b"=\"");
    out.extend_from_slice(itoa::Buffer::new().format(value).as_bytes());
    out.push(b'"');
}

/// Excel 2003 XML Spreadsheet fragments. Formulas stay in relative
/// notation, which is what `ss:Formula` expects.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredXmlFormatter;

impl Formatter for StructuredXmlFormatter {
    fn variant(&self) -> Variant {
        Variant::StructuredXml
    }

    fn supports_multiple_sheets(&self) -> bool {
        true
    }

    fn uses_sheet_names(&self) -> bool {
        true
    }

    fn root_open(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(WORKBOOK_OPEN);
    }

    fn root_close(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"</Workbook>\n");
    }

    fn style_block(&self, styles: &StyleRegistry, out: &mut Vec<u8>) {
        write_styles_xml(styles, out);
    }

    fn sheet_open(&self, name: &str, out: &mut Vec<u8>) {
        out.extend_from_slice(b"<Worksheet");
        write_attr(out, b"ss:Name", name.as_bytes());
        out.extend_from_slice(
            b">\n<Table x:FullColumns=\"1\" x:FullRows=\"1\" ss:DefaultColumnWidth=\"53\" ss:DefaultRowHeight=\"15\" ss:StyleID=\"",
        );
        out.extend_from_slice(DEFAULT_STYLE.as_bytes());
        out.extend_from_slice(b"\">\n");
    }

    fn sheet_close(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"</Table>\n</Worksheet>\n");
    }

    fn columns(&self, widths: &[ColumnWidth], out: &mut Vec<u8>) {
        for col in widths {
            out.extend_from_slice(b"<Column");
            write_count_attr(out, b"ss:Index", col.index);
            out.extend_from_slice(b" ss:StyleID=\"");
            out.extend_from_slice(DEFAULT_STYLE.as_bytes());
            out.extend_from_slice(b"\" ss:AutoFitWidth=\"0\" ss:Width=\"");
            write_number(col.width, out);
            out.extend_from_slice(b"\"/>\n");
        }
    }

    fn row_open(&self, height: Option<f64>, out: &mut Vec<u8>) {
        match height {
            Some(h) => {
                out.extend_from_slice(b"<Row ss:Height=\"");
                write_number(h, out);
                out.extend_from_slice(b"\">");
            }
            None => out.extend_from_slice(b"<Row>"),
        }
    }

    fn row_close(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"</Row>\n");
    }

    fn cell(
        &self,
        cell: &Cell,
        _at: CellPosition,
        _styles: &StyleRegistry,
        out: &mut Vec<u8>,
    ) -> Result<(), WriteError> {
        out.extend_from_slice(b"<Cell");
        if let Some(style) = cell.style_id() {
            write_attr(out, b"ss:StyleID", style.as_bytes());
        }
        if cell.merge_down > 0 {
            write_count_attr(out, b"ss:MergeDown", cell.merge_down);
        }
        if cell.merge_across > 0 {
            write_count_attr(out, b"ss:MergeAcross", cell.merge_across);
        }
        if let Some(href) = cell.href_target() {
            write_attr(out, b"ss:HRef", href.as_bytes());
        }
        if let Some(formula) = cell.formula.as_deref().filter(|f| !f.is_empty()) {
            write_attr(out, b"ss:Formula", formula.as_bytes());
        }
        out.push(b'>');

        // formula cells without a cached value let Excel compute it
        if !cell.value.is_empty() {
            out.extend_from_slice(match cell.resolved_type() {
                CellType::String => b"<Data ss:Type=\"String\">",
                CellType::Number => b"<Data ss:Type=\"Number\">",
            });
            let mut raw = Vec::new();
            cell.value.write_raw(&mut raw);
            xml_escape_simd(&raw, out);
            out.extend_from_slice(b"</Data>");
        }

        out.extend_from_slice(b"</Cell>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FontConfig;
    use crate::styles::{BOLD, HYPERLINK};
    use pretty_assertions::assert_eq;

    fn render(cell: &Cell) -> String {
        let styles = StyleRegistry::new(FontConfig::default(), "");
        let mut out = Vec::new();
        StructuredXmlFormatter
            .cell(cell, CellPosition::new(0, 1), &styles, &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_xml_escape() {
        let mut out = Vec::new();
        xml_escape_simd(b"a < b & \"c\"", &mut out);
        assert_eq!(out, b"a &lt; b &amp; &quot;c&quot;");

        let mut plain = Vec::new();
        xml_escape_simd("成绩".as_bytes(), &mut plain);
        assert_eq!(plain, "成绩".as_bytes());
    }

    #[test]
    fn test_bare_cell() {
        assert_eq!(render(&Cell::from("name")), "<Cell><Data ss:Type=\"String\">name</Data></Cell>");
        assert_eq!(render(&Cell::from("R&D")), "<Cell><Data ss:Type=\"String\">R&amp;D</Data></Cell>");
    }

    #[test]
    fn test_structured_cell() {
        let cell = Cell::new("Scores").style(BOLD).merge_across(2).merge_down(1);
        assert_eq!(
            render(&cell),
            "<Cell ss:StyleID=\"s54\" ss:MergeDown=\"1\" ss:MergeAcross=\"2\"><Data ss:Type=\"String\">Scores</Data></Cell>"
        );
    }

    #[test]
    fn test_hyperlink_cell() {
        let cell = Cell::new("link").style(HYPERLINK).href("http://example.com/?a=1&b=2");
        assert_eq!(
            render(&cell),
            "<Cell ss:StyleID=\"s41\" ss:HRef=\"http://example.com/?a=1&amp;b=2\"><Data ss:Type=\"String\">link</Data></Cell>"
        );
    }

    #[test]
    fn test_formula_kept_relative() {
        let cell = Cell::new(0i64).formula("=RC[-3]+RC[-2]+RC[-1]");
        assert_eq!(
            render(&cell),
            "<Cell ss:Formula=\"=RC[-3]+RC[-2]+RC[-1]\"><Data ss:Type=\"Number\">0</Data></Cell>"
        );
        let uncached = Cell::empty().formula("=SUM(R[-2]C:R[-1]C)");
        assert_eq!(render(&uncached), "<Cell ss:Formula=\"=SUM(R[-2]C:R[-1]C)\"></Cell>");
    }

    #[test]
    fn test_number_cell() {
        assert_eq!(
            render(&Cell::new(78.5).number()),
            "<Cell><Data ss:Type=\"Number\">78.5</Data></Cell>"
        );
    }

    #[test]
    fn test_structure_fragments() {
        let f = StructuredXmlFormatter;
        let mut out = Vec::new();
        f.sheet_open("Q1 \"draft\"", &mut out);
        f.columns(&[ColumnWidth::new(1, 101.65)], &mut out);
        f.row_open(Some(35.0), &mut out);
        f.row_close(&mut out);
        f.row_open(None, &mut out);
        f.row_close(&mut out);
        f.sheet_close(&mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<Worksheet ss:Name=\"Q1 &quot;draft&quot;\">\n\
<Table x:FullColumns=\"1\" x:FullRows=\"1\" ss:DefaultColumnWidth=\"53\" ss:DefaultRowHeight=\"15\" ss:StyleID=\"s40\">\n\
<Column ss:Index=\"1\" ss:StyleID=\"s40\" ss:AutoFitWidth=\"0\" ss:Width=\"101.65\"/>\n\
<Row ss:Height=\"35\"></Row>\n\
<Row></Row>\n\
</Table>\n</Worksheet>\n"
        );
    }

    #[test]
    fn test_root_declares_namespaces() {
        let mut out = Vec::new();
        StructuredXmlFormatter.root_open(&mut out);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("xmlns").count(), 5);
        assert!(text.contains("progid=\"Excel.Sheet\""));
    }
}
