use serde_json::ser::{CharEscape, CompactFormatter, Formatter};
use std::io;

/// Compact JSON formatter whose output can be embedded verbatim in HTML or
/// XML: `&`, `'`, `"`, `<` and `>` are written as `\uXXXX` escapes. Non-ASCII
/// text and `/` are written as-is. Floats in exponent form keep a decimal
/// point (`1.0e16`, never `1e16`).
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct HtmlSafeFormatter;

impl Formatter for HtmlSafeFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, byte) in fragment.bytes().enumerate() {
            let escape: &[u8] = match byte {
                b'&' => b"\\u0026",
                b'\'' => b"\\u0027",
                b'<' => b"\\u003C",
                b'>' => b"\\u003E",
                _ => continue,
            };
            writer.write_all(&fragment.as_bytes()[start..index])?;
            writer.write_all(escape)?;
            start = index + 1;
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }

    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut buffer = Vec::new();
        CompactFormatter.write_f32(&mut buffer, value)?;
        write_number_literal(writer, &buffer)
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut buffer = Vec::new();
        CompactFormatter.write_f64(&mut buffer, value)?;
        write_number_literal(writer, &buffer)
    }

    fn write_number_str<W>(&mut self, writer: &mut W, value: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        write_number_literal(writer, value.as_bytes())
    }

    fn write_char_escape<W>(&mut self, writer: &mut W, char_escape: CharEscape) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        match char_escape {
            CharEscape::Quote => writer.write_all(b"\\u0022"),
            other => CompactFormatter.write_char_escape(writer, other),
        }
    }
}

/// Writes a number literal, inserting `.0` before the exponent of a literal
/// that has no fractional part.
fn write_number_literal<W>(writer: &mut W, literal: &[u8]) -> io::Result<()>
where
    W: ?Sized + io::Write,
{
    match literal.iter().position(|b| matches!(b, b'e' | b'E')) {
        Some(exponent) if !literal[..exponent].contains(&b'.') => {
            writer.write_all(&literal[..exponent])?;
            writer.write_all(b".0")?;
            writer.write_all(&literal[exponent..])
        }
        _ => writer.write_all(literal),
    }
}
