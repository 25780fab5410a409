use crate::reference::ReferenceError;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Integer(i64),
    Number(f64),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Append the textual payload, unescaped
    pub fn write_raw(&self, out: &mut Vec<u8>) {
        match self {
            CellValue::Empty => {}
            CellValue::Text(s) => out.extend_from_slice(s.as_bytes()),
            CellValue::Integer(i) => out.extend_from_slice(itoa::Buffer::new().format(*i).as_bytes()),
            CellValue::Number(n) => write_number(*n, out),
        }
    }
}

/// Integral floats are written without a trailing ".0"
pub(crate) fn write_number(n: f64, out: &mut Vec<u8>) {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        out.extend_from_slice(itoa::Buffer::new().format(n as i64).as_bytes());
    } else {
        out.extend_from_slice(ryu::Buffer::new().format(n).as_bytes());
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Integer(i as i64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellType {
    #[default]
    String,
    Number,
}

/// A single cell as supplied by the caller.
///
/// Bare values convert through `From` and carry no styling; everything else
/// is set with the builder methods.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub cell_type: CellType,
    pub style_id: Option<String>,
    pub merge_down: u32,
    pub merge_across: u32,
    pub href: Option<String>,
    pub formula: Option<String>,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn number(mut self) -> Self {
        self.cell_type = CellType::Number;
        self
    }

    pub fn style(mut self, id: impl Into<String>) -> Self {
        self.style_id = Some(id.into());
        self
    }

    pub fn merge_down(mut self, rows: u32) -> Self {
        self.merge_down = rows;
        self
    }

    pub fn merge_across(mut self, cols: u32) -> Self {
        self.merge_across = cols;
        self
    }

    pub fn href(mut self, target: impl Into<String>) -> Self {
        self.href = Some(target.into());
        self
    }

    /// Attach a formula in relative `R[dr]C[dc]` notation.
    pub fn formula(mut self, expr: impl Into<String>) -> Self {
        self.formula = Some(expr.into());
        self
    }

    /// A formula forces the numeric type regardless of `cell_type`.
    pub fn resolved_type(&self) -> CellType {
        if self.has_formula() {
            CellType::Number
        } else {
            self.cell_type
        }
    }

    pub fn has_formula(&self) -> bool {
        self.formula.as_deref().is_some_and(|f| !f.is_empty())
    }

    pub(crate) fn style_id(&self) -> Option<&str> {
        self.style_id.as_deref().filter(|s| !s.is_empty())
    }

    pub(crate) fn href_target(&self) -> Option<&str> {
        self.href.as_deref().filter(|s| !s.is_empty())
    }
}

macro_rules! cell_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Cell {
                fn from(value: $ty) -> Self {
                    Cell::new(value)
                }
            }
        )*
    };
}

cell_from!(&str, String, i64, i32, f64, CellValue);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub height: Option<f64>,
}

impl Row {
    pub fn new<I, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
            height: None,
        }
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Row { cells, height: None }
    }
}

/// Width of one column; `index` is 1-based like Excel's `ss:Index`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnWidth {
    pub index: u32,
    pub width: f64,
}

impl ColumnWidth {
    pub fn new(index: u32, width: f64) -> Self {
        Self { index, width }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    #[error("Malformed input: {0}")]
    Malformed(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<ReferenceError> for WriteError {
    fn from(e: ReferenceError) -> Self {
        WriteError::Malformed(e.to_string())
    }
}
