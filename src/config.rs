use crate::types::WriteError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Output document format, fixed for the lifetime of a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Variant {
    /// Excel 2003 XML Spreadsheet; multiple sheets, plain text cells.
    #[default]
    StructuredXml,
    /// HTML table with Excel metadata; one sheet, inline markup allowed.
    HtmlTable,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::StructuredXml => "XML",
            Variant::HtmlTable => "HTML",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = WriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "XML" => Ok(Variant::StructuredXml),
            "HTML" => Ok(Variant::HtmlTable),
            other => Err(WriteError::Config(format!(
                "unknown document variant '{}', expected XML or HTML",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Variant {
    type Error = WriteError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Font applied to the `Default` style.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub name: String,
    pub size: f64,
    pub color: String,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            name: "SimSun".to_string(),
            size: 12.0,
            color: "#000000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub variant: Variant,
    pub font: FontConfig,
    /// Raw `<Style>` elements (XML) or CSS rules (HTML), appended verbatim
    /// after the built-in styles.
    pub extra_styles: String,
    /// Emit the root and style fragments on construction.
    pub auto_start: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            font: FontConfig::default(),
            extra_styles: String::new(),
            auto_start: true,
        }
    }
}

impl WriterConfig {
    pub fn xml() -> Self {
        Self::default()
    }

    pub fn html() -> Self {
        Self {
            variant: Variant::HtmlTable,
            ..Self::default()
        }
    }

    pub fn with_font(mut self, font: FontConfig) -> Self {
        self.font = font;
        self
    }

    pub fn with_extra_styles(mut self, styles: impl Into<String>) -> Self {
        self.extra_styles = styles.into();
        self
    }

    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }
}
