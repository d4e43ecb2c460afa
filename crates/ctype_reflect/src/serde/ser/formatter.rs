use std::io;

use serde_json::ser::Formatter;

/// A single-line JSON layout with a space after every `,` and `:`.
///
/// Produces `{"x": 42, "ok": true}` and `[1, 2, 3]`, the layout
/// [`value_to_json`](super::value_to_json) writes. Besides the control
/// characters every JSON writer escapes, DEL and the C1 controls
/// (U+007F to U+009F) are written as `\u00XX`. Usable with any
/// `serde_json::Serializer`:
///
/// ```
/// use ctype_reflect::serde::InlineFormatter;
/// use serde_core::Serialize;
///
/// let mut out = Vec::new();
/// let mut serializer = serde_json::Serializer::with_formatter(&mut out, InlineFormatter);
/// [1, 2].serialize(&mut serializer).unwrap();
/// assert_eq!(out, b"[1, 2]");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineFormatter;

impl Formatter for InlineFormatter {
    #[inline]
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if !first {
            writer.write_all(b", ")?;
        }
        Ok(())
    }

    #[inline]
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if !first {
            writer.write_all(b", ")?;
        }
        Ok(())
    }

    #[inline]
    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, c) in fragment.char_indices() {
            if ('\u{7f}'..='\u{9f}').contains(&c) {
                writer.write_all(&fragment.as_bytes()[start..index])?;
                write!(writer, "\\u{:04x}", u32::from(c))?;
                start = index + c.len_utf8();
            }
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

#[cfg(test)]
mod tests {
    use serde_core::Serialize;

    use super::*;

    fn inline(value: &impl Serialize) -> String {
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, InlineFormatter);
        value.serialize(&mut serializer).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn layout() {
        assert_eq!(inline(&[1, 2]), "[1, 2]");
        assert_eq!(inline(&("a", 1.5)), r#"["a", 1.5]"#);
    }

    #[test]
    fn control_characters_are_escaped() {
        assert_eq!(inline(&"tab\there"), r#""tab\there""#);
        assert_eq!(inline(&"\u{1}\u{7f}\u{85}x"), r#""\u0001\u007f\u0085x""#);
        assert_eq!(inline(&"caf\u{e9} \u{ff}"), "\"caf\u{e9} \u{ff}\"");
    }
}
