//! Integer helpers shared by layout computation and annotation parsing.

/// Rounds `offset` up to the next multiple of `align`, or `None` when the
/// result does not fit in `usize`.
///
/// An `align` of zero is treated as one.
///
/// # Examples
///
/// ```
/// use ctype_utils::num::align_up;
///
/// assert_eq!(align_up(5, 4), Some(8));
/// assert_eq!(align_up(8, 4), Some(8));
/// assert_eq!(align_up(3, 0), Some(3));
/// assert_eq!(align_up(usize::MAX, 8), None);
/// ```
#[inline]
pub const fn align_up(offset: usize, align: usize) -> Option<usize> {
    if align <= 1 {
        return Some(offset);
    }
    offset.checked_next_multiple_of(align)
}

/// Parses an integer literal using C base detection.
///
/// Accepts an optional sign followed by `0x`/`0X` (hexadecimal), a leading
/// `0` (octal) or plain decimal digits. Surrounding whitespace is ignored.
/// The whole text must be a literal; trailing characters yield `None`.
///
/// # Examples
///
/// ```
/// use ctype_utils::num::parse_c_integer;
///
/// assert_eq!(parse_c_integer("42"), Some(42));
/// assert_eq!(parse_c_integer("0x1F"), Some(31));
/// assert_eq!(parse_c_integer("010"), Some(8));
/// assert_eq!(parse_c_integer("-3"), Some(-3));
/// assert_eq!(parse_c_integer("4x"), None);
/// ```
pub fn parse_c_integer(text: &str) -> Option<i128> {
    let text = text.trim();
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
