//! Conversion between relative (`R[dr]C[dc]`) and absolute (`A1`) cell
//! references inside formula text.
//!
//! Both directions are a single left-to-right scan over the formula bytes.
//! Anything that is not a coordinate token is copied through untouched, so
//! function names, operators, string literals and parentheses survive as-is.
//! Columns are limited to the single letters `A`..=`Z`.

pub const COLUMN_COUNT: u32 = 26;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("origin column '{0}' is not a letter between A and Z")]
    InvalidOrigin(char),
    #[error("origin row must be at least 1")]
    InvalidOriginRow,
    #[error("invalid row in reference '{0}'")]
    InvalidOffset(String),
    #[error("column {origin} shifted by {offset} falls outside A..Z")]
    ColumnOutOfRange { origin: char, offset: i64 },
    #[error("row {origin} shifted by {offset} falls outside the sheet")]
    RowOutOfRange { origin: u32, offset: i64 },
    #[error("reference '{0}' uses a multi-letter column")]
    MultiLetterColumn(String),
}

/// Zero-based column index to its letter, `None` past `Z`.
pub fn column_letter(index: u32) -> Option<char> {
    (index < COLUMN_COUNT).then(|| (b'A' + index as u8) as char)
}

/// Letter to zero-based column index.
pub fn column_index(letter: char) -> Option<u32> {
    letter
        .is_ascii_uppercase()
        .then(|| letter as u32 - 'A' as u32)
}

/// A parsed `R[dr]C[dc]` token spanning `start..end` of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RelativeRef {
    row: i64,
    col: i64,
    end: usize,
}

/// A parsed `<letter><digits>` token spanning `start..end` of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AbsoluteRef {
    col: u32,
    row: u32,
    end: usize,
}

#[inline]
fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// `[n]` at `*pos`, or an implicit zero when no bracket follows.
/// `None` means the bracket never closes or holds no integer, which makes
/// the whole candidate literal text.
fn parse_offset(src: &[u8], pos: &mut usize) -> Option<i64> {
    if src.get(*pos) != Some(&b'[') {
        return Some(0);
    }
    let open = *pos + 1;
    let len = memchr::memchr(b']', &src[open..])?;
    let offset = std::str::from_utf8(&src[open..open + len])
        .ok()?
        .trim()
        .parse::<i64>()
        .ok()?;
    *pos = open + len + 1;
    Some(offset)
}

fn parse_relative(src: &[u8], start: usize) -> Option<RelativeRef> {
    if src[start] != b'R' || (start > 0 && is_ident(src[start - 1])) {
        return None;
    }
    let mut pos = start + 1;
    let row = parse_offset(src, &mut pos)?;
    if src.get(pos) != Some(&b'C') {
        return None;
    }
    pos += 1;
    let col = parse_offset(src, &mut pos)?;
    if src.get(pos).is_some_and(|&b| is_ident(b)) {
        return None;
    }
    Some(RelativeRef { row, col, end: pos })
}

fn parse_absolute(src: &[u8], start: usize) -> Result<Option<AbsoluteRef>, ReferenceError> {
    if !src[start].is_ascii_uppercase() || (start > 0 && is_ident(src[start - 1])) {
        return Ok(None);
    }
    let letters_end = start
        + src[start..]
            .iter()
            .take_while(|b| b.is_ascii_uppercase())
            .count();
    let digits_end = letters_end
        + src[letters_end..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
    if digits_end == letters_end {
        return Ok(None);
    }
    // LOG10( and friends are function calls, not cells
    if src
        .get(digits_end)
        .is_some_and(|&b| is_ident(b) || b == b'(')
    {
        return Ok(None);
    }
    if letters_end - start > 1 {
        return Err(ReferenceError::MultiLetterColumn(
            String::from_utf8_lossy(&src[start..digits_end]).into_owned(),
        ));
    }
    let row = std::str::from_utf8(&src[letters_end..digits_end])
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&r| r >= 1)
        .ok_or_else(|| {
            ReferenceError::InvalidOffset(String::from_utf8_lossy(&src[start..digits_end]).into_owned())
        })?;
    Ok(Some(AbsoluteRef {
        col: (src[start] - b'A') as u32,
        row,
        end: digits_end,
    }))
}

/// Walk `expr`, handing every relative token to `emit` and copying
/// everything else. Returns the rewritten text and the token count.
fn rewrite_relative<F>(expr: &str, mut emit: F) -> Result<(String, usize), ReferenceError>
where
    F: FnMut(RelativeRef, &mut Vec<u8>) -> Result<(), ReferenceError>,
{
    let src = expr.as_bytes();
    let mut out = Vec::with_capacity(src.len() + 8);
    let mut found = 0;
    let mut last = 0;
    let mut pos = 0;

    while pos < src.len() {
        match parse_relative(src, pos) {
            Some(token) => {
                out.extend_from_slice(&src[last..pos]);
                emit(token, &mut out)?;
                found += 1;
                pos = token.end;
                last = pos;
            }
            None => pos += 1,
        }
    }
    out.extend_from_slice(&src[last..]);

    // only ASCII was spliced in between untouched UTF-8 runs
    Ok((String::from_utf8_lossy(&out).into_owned(), found))
}

fn origin_index(column: char, row: u32) -> Result<i64, ReferenceError> {
    if row == 0 {
        return Err(ReferenceError::InvalidOriginRow);
    }
    column_index(column)
        .map(i64::from)
        .ok_or(ReferenceError::InvalidOrigin(column))
}

/// Rewrite bare `R`/`C` parts of every relative token to the explicit
/// `R[0]`/`C[0]` form.
pub fn canonicalize(expr: &str) -> Result<String, ReferenceError> {
    let (out, _) = rewrite_relative(expr, |token, out| {
        write_offset(out, b'R', token.row, true);
        write_offset(out, b'C', token.col, true);
        Ok(())
    })?;
    Ok(out)
}

fn write_offset(out: &mut Vec<u8>, axis: u8, offset: i64, explicit_zero: bool) {
    out.push(axis);
    if offset != 0 || explicit_zero {
        out.push(b'[');
        out.extend_from_slice(itoa::Buffer::new().format(offset).as_bytes());
        out.push(b']');
    }
}

/// Convert relative references to absolute ones, anchored at the cell
/// `column` and `row` (e.g. `'F'`, `4`).
///
/// `=(R[2]C[-2]+RC[-2])/R[-1]C[2]` at F4 becomes `=(D6+D4)/H3`.
/// Returns an empty string when `expr` holds no relative reference.
pub fn to_absolute(expr: &str, column: char, row: u32) -> Result<String, ReferenceError> {
    let origin_col = origin_index(column, row)?;
    let origin_row = i64::from(row);

    let (out, found) = rewrite_relative(expr, |token, out| {
        let letter = origin_col
            .checked_add(token.col)
            .and_then(|c| u32::try_from(c).ok())
            .and_then(column_letter)
            .ok_or(ReferenceError::ColumnOutOfRange {
                origin: column,
                offset: token.col,
            })?;
        let target_row = origin_row
            .checked_add(token.row)
            .filter(|&r| r >= 1)
            .ok_or(ReferenceError::RowOutOfRange {
                origin: row,
                offset: token.row,
            })?;
        out.push(letter as u8);
        out.extend_from_slice(itoa::Buffer::new().format(target_row).as_bytes());
        Ok(())
    })?;

    if found == 0 {
        return Ok(String::new());
    }
    Ok(out)
}

/// Convert absolute references to relative ones, anchored at the cell
/// `column` and `row`. Zero offsets are left implicit, so the origin cell itself
/// becomes the bare `RC`.
///
/// `=(D6+D4)/H3` at F4 becomes `=(R[2]C[-2]+RC[-2])/R[-1]C[2]`.
/// Returns an empty string when `expr` holds no absolute reference.
pub fn to_relative(expr: &str, column: char, row: u32) -> Result<String, ReferenceError> {
    let origin_col = origin_index(column, row)?;
    let origin_row = i64::from(row);

    let src = expr.as_bytes();
    let mut out = Vec::with_capacity(src.len() * 2);
    let mut found = 0;
    let mut last = 0;
    let mut pos = 0;

    while pos < src.len() {
        match parse_absolute(src, pos)? {
            Some(token) => {
                out.extend_from_slice(&src[last..pos]);
                write_offset(&mut out, b'R', i64::from(token.row) - origin_row, false);
                write_offset(&mut out, b'C', i64::from(token.col) - origin_col, false);
                found += 1;
                pos = token.end;
                last = pos;
            }
            None => pos += 1,
        }
    }

    if found == 0 {
        return Ok(String::new());
    }
    out.extend_from_slice(&src[last..]);
    Ok(String::from_utf8_lossy(&out).into_owned())
}
