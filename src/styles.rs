use crate::config::FontConfig;
use crate::types::write_number;
use crate::xml::xml_escape_simd;

pub const DEFAULT_STYLE: &str = "s40";
pub const HYPERLINK: &str = "s41";
pub const RED_FONT: &str = "s51";
pub const YELLOW_FILL: &str = "s52";
pub const ITALIC: &str = "s53";
pub const BOLD: &str = "s54";
pub const CENTER: &str = "s55";
pub const STRIKETHROUGH: &str = "s56";
pub const UNDERLINE: &str = "s57";
pub const SUPERSCRIPT: &str = "s58";
pub const SUBSCRIPT: &str = "s59";

/// One entry of the fixed style table. `xml` holds the children of the
/// `<Style>` element, `css` the declarations following `mso-style-parent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuiltinStyle {
    pub id: &'static str,
    pub name: &'static str,
    pub xml: &'static str,
    pub css: &'static str,
    /// Inline HTML tag the value is wrapped in; CSS alone can't express it.
    pub html_tag: Option<&'static str>,
}

const BUILTIN_STYLES: &[BuiltinStyle] = &[
    BuiltinStyle {
        id: DEFAULT_STYLE,
        name: "Plain",
        xml: "",
        css: "",
        html_tag: None,
    },
    BuiltinStyle {
        id: HYPERLINK,
        name: "Hyperlink",
        xml: "<Font x:CharSet=\"0\" ss:Size=\"11\" ss:Color=\"#0000FF\" ss:Underline=\"Single\"/>",
        css: "color:#0000FF;font-size:11.0pt;text-decoration:underline;text-underline-style:single;mso-font-charset:0;",
        html_tag: None,
    },
    BuiltinStyle {
        id: RED_FONT,
        name: "Red font",
        xml: "<Font ss:Color=\"#FF0000\"/>",
        css: "color:#FF0000;",
        html_tag: None,
    },
    BuiltinStyle {
        id: YELLOW_FILL,
        name: "Yellow background",
        xml: "<Interior ss:Color=\"#FFFF00\" ss:Pattern=\"Solid\"/>",
        css: "background:#FFFF00;mso-pattern:auto none;",
        html_tag: None,
    },
    BuiltinStyle {
        id: ITALIC,
        name: "Italic",
        xml: "<Font ss:Italic=\"1\"/>",
        css: "font-style:italic;",
        html_tag: None,
    },
    BuiltinStyle {
        id: BOLD,
        name: "Bold",
        xml: "<Font ss:Bold=\"1\"/>",
        css: "font-weight:700;",
        html_tag: None,
    },
    BuiltinStyle {
        id: CENTER,
        name: "Centered",
        xml: "<Alignment ss:Horizontal=\"Center\"/>",
        css: "text-align:center;",
        html_tag: None,
    },
    BuiltinStyle {
        id: STRIKETHROUGH,
        name: "Strikethrough",
        xml: "<Font ss:StrikeThrough=\"1\"/>",
        css: "",
        html_tag: Some("del"),
    },
    BuiltinStyle {
        id: UNDERLINE,
        name: "Underline",
        xml: "<Font ss:Underline=\"Single\"/>",
        css: "text-decoration:underline;text-underline-style:single;",
        html_tag: None,
    },
    BuiltinStyle {
        id: SUPERSCRIPT,
        name: "Superscript",
        xml: "<Font ss:VerticalAlign=\"Superscript\"/>",
        css: "",
        html_tag: Some("sup"),
    },
    BuiltinStyle {
        id: SUBSCRIPT,
        name: "Subscript",
        xml: "<Font ss:VerticalAlign=\"Subscript\"/>",
        css: "",
        html_tag: Some("sub"),
    },
];

/// Style table for one document: the built-in set plus caller text layered
/// on top. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    font: FontConfig,
    extra: String,
}

impl StyleRegistry {
    pub fn new(font: FontConfig, extra: impl Into<String>) -> Self {
        Self {
            font,
            extra: extra.into(),
        }
    }

    pub fn builtin() -> &'static [BuiltinStyle] {
        BUILTIN_STYLES
    }

    pub fn get(&self, id: &str) -> Option<&'static BuiltinStyle> {
        BUILTIN_STYLES.iter().find(|s| s.id == id)
    }

    /// Human-readable name of a built-in style.
    pub fn name_of(&self, id: &str) -> Option<&'static str> {
        self.get(id).map(|s| s.name)
    }

    pub fn html_tag(&self, id: &str) -> Option<&'static str> {
        self.get(id).and_then(|s| s.html_tag)
    }

    pub fn font(&self) -> &FontConfig {
        &self.font
    }

    pub fn extra(&self) -> &str {
        &self.extra
    }

    /// Built-in, or declared in the extra style text either as
    /// `ss:ID="<id>"` or as a `.<id>` CSS selector.
    pub fn is_declared(&self, id: &str) -> bool {
        if self.get(id).is_some() {
            return true;
        }
        let extra = self.extra.as_bytes();
        let xml_decl = format!("ss:ID=\"{}\"", id);
        if memchr::memmem::find(extra, xml_decl.as_bytes()).is_some() {
            return true;
        }
        let selector = format!(".{}", id);
        memchr::memmem::find_iter(extra, selector.as_bytes()).any(|at| {
            extra
                .get(at + selector.len())
                .map_or(true, |&b| !(b.is_ascii_alphanumeric() || b == b'_' || b == b'-'))
        })
    }
}

/// `<Styles>` block for the XML Spreadsheet format
pub fn write_styles_xml(registry: &StyleRegistry, out: &mut Vec<u8>) {
    let font = registry.font();

    out.extend_from_slice(b"<Styles>\n<Style ss:ID=\"Default\" ss:Name=\"Normal\"><Alignment/><Borders/><Font ss:FontName=\"");
    xml_escape_simd(font.name.as_bytes(), out);
    out.extend_from_slice(b"\" x:CharSet=\"134\" ss:Size=\"");
    write_number(font.size, out);
    out.extend_from_slice(b"\" ss:Color=\"");
    xml_escape_simd(font.color.as_bytes(), out);
    out.extend_from_slice(b"\"/><Interior/><NumberFormat/><Protection/></Style>\n");

    for style in BUILTIN_STYLES {
        out.extend_from_slice(b"<Style ss:ID=\"");
        out.extend_from_slice(style.id.as_bytes());
        out.extend_from_slice(b"\" ss:Name=\"");
        out.extend_from_slice(style.name.as_bytes());
        out.extend_from_slice(b"\" ss:Parent=\"Default\">");
        out.extend_from_slice(style.xml.as_bytes());
        out.extend_from_slice(b"</Style>\n");
    }

    if !registry.extra().is_empty() {
        out.extend_from_slice(registry.extra().as_bytes());
        out.push(b'\n');
    }
    out.extend_from_slice(b"</Styles>\n");
}

/// `<style>` block for the HTML format; also closes `<head>`
pub fn write_styles_css(registry: &StyleRegistry, out: &mut Vec<u8>) {
    let font = registry.font();

    out.extend_from_slice(
        b"<style>\n<!--\n\
tr {mso-height-source:auto;mso-ruby-visibility:none;}\n\
col {mso-width-source:auto;mso-ruby-visibility:none;}\n\
br {mso-data-placement:same-cell;}\n\
.Default {mso-number-format:\"General\";text-align:general;vertical-align:middle;white-space:nowrap;mso-rotate:0;color:",
    );
    out.extend_from_slice(font.color.as_bytes());
    out.extend_from_slice(b";font-size:");
    write_number(font.size, out);
    out.extend_from_slice(b"pt;font-weight:400;font-style:normal;text-decoration:none;font-family:");
    out.extend_from_slice(font.name.as_bytes());
    out.extend_from_slice(
        b";mso-font-charset:134;border:none;mso-protection:locked visible;mso-style-name:\"Normal\";mso-style-id:0;}\n\
td {mso-style-parent:Default;padding-top:1px;padding-right:1px;padding-left:1px;mso-ignore:padding;\
mso-number-format:\"General\";text-align:general;vertical-align:middle;white-space:nowrap;mso-rotate:0;\
font-weight:400;font-style:normal;text-decoration:none;border:none;mso-protection:locked visible;}\n",
    );

    for style in BUILTIN_STYLES {
        out.push(b'.');
        out.extend_from_slice(style.id.as_bytes());
        out.extend_from_slice(b" /*");
        out.extend_from_slice(style.name.as_bytes());
        out.extend_from_slice(b"*/ {mso-style-parent:Default;");
        out.extend_from_slice(style.css.as_bytes());
        out.extend_from_slice(b"}\n");
    }

    if !registry.extra().is_empty() {
        out.extend_from_slice(registry.extra().as_bytes());
        out.push(b'\n');
    }
    out.extend_from_slice(b"-->\n</style>\n</head>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(extra: &str) -> StyleRegistry {
        StyleRegistry::new(FontConfig::default(), extra)
    }

    #[test]
    fn test_builtin_names() {
        let reg = registry("");
        assert_eq!(reg.name_of(HYPERLINK), Some("Hyperlink"));
        assert_eq!(reg.name_of(SUBSCRIPT), Some("Subscript"));
        assert_eq!(reg.name_of("s500"), None);
        assert_eq!(StyleRegistry::builtin().len(), 11);
    }

    #[test]
    fn test_html_tags() {
        let reg = registry("");
        assert_eq!(reg.html_tag(STRIKETHROUGH), Some("del"));
        assert_eq!(reg.html_tag(SUPERSCRIPT), Some("sup"));
        assert_eq!(reg.html_tag(SUBSCRIPT), Some("sub"));
        assert_eq!(reg.html_tag(BOLD), None);
    }

    #[test]
    fn test_declared_in_extra_text() {
        let xml = registry("<Style ss:ID=\"s500\" ss:Name=\"Red\"><Font ss:Color=\"#FF0000\"/></Style>");
        assert!(xml.is_declared("s500"));
        assert!(xml.is_declared(BOLD));
        assert!(!xml.is_declared("s50"));

        let css = registry(".s500 {color:#FF0000; text-align:center;}");
        assert!(css.is_declared("s500"));
        assert!(!css.is_declared("s50"));
    }

    #[test]
    fn test_xml_block_carries_font_and_extra() {
        let font = FontConfig {
            name: "Yuanti SC".to_string(),
            size: 10.5,
            color: "#333333".to_string(),
        };
        let reg = StyleRegistry::new(font, "<Style ss:ID=\"s500\"/>");
        let mut out = Vec::new();
        write_styles_xml(&reg, &mut out);
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("<Styles>"));
        assert!(text.contains("ss:FontName=\"Yuanti SC\" x:CharSet=\"134\" ss:Size=\"10.5\" ss:Color=\"#333333\""));
        assert!(text.contains("<Style ss:ID=\"s54\" ss:Name=\"Bold\" ss:Parent=\"Default\"><Font ss:Bold=\"1\"/></Style>"));
        let extra_at = text.find("ss:ID=\"s500\"").unwrap();
        let last_builtin = text.find("ss:ID=\"s59\"").unwrap();
        assert!(extra_at > last_builtin);
        assert!(text.trim_end().ends_with("</Styles>"));
    }

    #[test]
    fn test_css_block() {
        let reg = registry(".s500 {color:red;}");
        let mut out = Vec::new();
        write_styles_css(&reg, &mut out);
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("<style>\n<!--"));
        assert!(text.contains("font-size:12pt;"));
        assert!(text.contains("font-family:SimSun;"));
        assert!(text.contains(".s54 /*Bold*/ {mso-style-parent:Default;font-weight:700;}"));
        assert!(text.contains(".s500 {color:red;}"));
        assert!(text.ends_with("</style>\n</head>\n"));
    }
}
