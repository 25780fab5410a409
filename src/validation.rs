//! Input checks applied before any fragment reaches the sink
use crate::config::FontConfig;
use crate::reference::COLUMN_COUNT;
use crate::types::{Cell, CellValue, ColumnWidth, Row};

const MAX_SHEET_NAME_LEN: usize = 31;
const MAX_ROW_HEIGHT: f64 = 409.5;
const MAX_COL_WIDTH: f64 = 1000.0;
const INVALID_SHEET_CHARS: &str = "[]:*?/\\";

/// Validate sheet name meets Excel requirements
pub fn validate_sheet_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Sheet name cannot be empty".to_string());
    }

    let len = name.chars().count();
    if len > MAX_SHEET_NAME_LEN {
        return Err(format!(
            "Sheet name '{}' exceeds {} characters (has {})",
            name, MAX_SHEET_NAME_LEN, len
        ));
    }

    for c in INVALID_SHEET_CHARS.chars() {
        if name.contains(c) {
            return Err(format!(
                "Sheet name '{}' contains invalid character '{}'",
                name, c
            ));
        }
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(format!("Sheet name '{}' contains control characters", name));
    }

    Ok(())
}

/// Zero-based column must fit in the single-letter range
pub fn validate_column(col: u32, row: u32) -> Result<(), String> {
    if col >= COLUMN_COUNT {
        return Err(format!(
            "Row {} reaches column {} which is beyond Z (only {} columns are addressable)",
            row,
            col + 1,
            COLUMN_COUNT
        ));
    }
    Ok(())
}

pub fn validate_row_height(height: f64) -> Result<(), String> {
    if !height.is_finite() || height <= 0.0 || height > MAX_ROW_HEIGHT {
        return Err(format!(
            "Row height {} must be between 0 and {} points",
            height, MAX_ROW_HEIGHT
        ));
    }
    Ok(())
}

pub fn validate_column_widths(widths: &[ColumnWidth]) -> Result<(), String> {
    for w in widths {
        if w.index == 0 || w.index > COLUMN_COUNT {
            return Err(format!(
                "Column index {} must be between 1 and {}",
                w.index, COLUMN_COUNT
            ));
        }
        if !w.width.is_finite() || w.width < 0.0 || w.width > MAX_COL_WIDTH {
            return Err(format!(
                "Column {} width {} must be between 0 and {}",
                w.index, w.width, MAX_COL_WIDTH
            ));
        }
    }
    Ok(())
}

/// Merges may not run past the last addressable column, and numbers must
/// be finite since Excel has no NaN or infinity.
pub fn validate_cell(cell: &Cell, col: u32, row: u32) -> Result<(), String> {
    validate_column(col, row)?;
    if let CellValue::Number(n) = cell.value {
        if !n.is_finite() {
            return Err(format!("Cell at row {} column {} holds non-finite number {}", row, col + 1, n));
        }
    }
    let last = col.saturating_add(cell.merge_across);
    if last >= COLUMN_COUNT {
        return Err(format!(
            "Cell at row {} merges across {} columns past Z",
            row, cell.merge_across
        ));
    }
    Ok(())
}

pub fn validate_font(font: &FontConfig) -> Result<(), String> {
    if !font.size.is_finite() || font.size <= 0.0 {
        return Err(format!("Font size {} must be a positive number", font.size));
    }
    Ok(())
}

pub fn validate_row(row: &Row) -> Result<(), String> {
    match row.height {
        Some(h) => validate_row_height(h),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sheet_name() {
        assert!(validate_sheet_name("Sheet1").is_ok());
        assert!(validate_sheet_name("成绩表").is_ok());
        assert!(validate_sheet_name("").is_err());
        assert!(validate_sheet_name(&"A".repeat(32)).is_err());
        assert!(validate_sheet_name("Invalid:Name").is_err());
        assert!(validate_sheet_name("tab\there").is_err());
    }

    #[test]
    fn test_column_limit() {
        assert!(validate_column(0, 1).is_ok());
        assert!(validate_column(25, 1).is_ok());
        assert!(validate_column(26, 1).is_err());
    }

    #[test]
    fn test_merge_past_z() {
        let cell = Cell::new("x").merge_across(2);
        assert!(validate_cell(&cell, 23, 1).is_ok());
        assert!(validate_cell(&cell, 24, 1).is_err());
    }

    #[test]
    fn test_non_finite_numbers() {
        assert!(validate_cell(&Cell::new(78.5).number(), 0, 1).is_ok());
        assert!(validate_cell(&Cell::new(f64::NAN).number(), 0, 1).is_err());
        assert!(validate_cell(&Cell::new(f64::INFINITY), 1, 1).is_err());
        assert!(validate_cell(&Cell::new(f64::NEG_INFINITY).number(), 2, 1).is_err());
    }

    #[test]
    fn test_font_size() {
        assert!(validate_font(&FontConfig::default()).is_ok());
        let mut font = FontConfig::default();
        font.size = f64::NAN;
        assert!(validate_font(&font).is_err());
        font.size = f64::INFINITY;
        assert!(validate_font(&font).is_err());
        font.size = 0.0;
        assert!(validate_font(&font).is_err());
    }

    #[test]
    fn test_row_heights() {
        assert!(validate_row_height(15.0).is_ok());
        assert!(validate_row_height(0.0).is_err());
        assert!(validate_row_height(f64::NAN).is_err());
        assert!(validate_row_height(500.0).is_err());
    }

    #[test]
    fn test_column_widths() {
        assert!(validate_column_widths(&[ColumnWidth::new(1, 101.65), ColumnWidth::new(5, 144.1)]).is_ok());
        assert!(validate_column_widths(&[ColumnWidth::new(0, 10.0)]).is_err());
        assert!(validate_column_widths(&[ColumnWidth::new(27, 10.0)]).is_err());
        assert!(validate_column_widths(&[ColumnWidth::new(2, -1.0)]).is_err());
    }
}
