use itoa::Buffer as ItoaBuffer;
use ryu::Buffer as RyuBuffer;

use crate::utils::TextSink;
use crate::value::Number;

pub(crate) fn write_number_into<B: TextSink>(n: &Number, out: &mut B) {
    match n {
        Number::PosInt(u) => write_u64(out, *u),
        Number::NegInt(i) => write_i64(out, *i),
        Number::Float(f) => write_f64_into(*f, out),
    }
}

pub(crate) fn format_number(n: &Number) -> String {
    let mut out = String::new();
    write_number_into(n, &mut out);
    out
}

fn write_u64<B: TextSink>(out: &mut B, value: u64) {
    let mut buf = ItoaBuffer::new();
    out.put_str(buf.format(value));
}

fn write_i64<B: TextSink>(out: &mut B, value: i64) {
    let mut buf = ItoaBuffer::new();
    out.put_str(buf.format(value));
}

/// Minimal decimal rendering. Integer-valued floats collapse to integers,
/// trailing fraction zeros are trimmed, and an exponent survives only for
/// sub-unit magnitudes where dropping it would lose precision. Non-finite
/// input never reaches this point (the normalizer rejects it).
fn write_f64_into<B: TextSink>(f: f64, out: &mut B) {
    if !f.is_finite() {
        out.put_char('0');
        return;
    }

    if f.fract() == 0.0 && f.abs() <= i64::MAX as f64 {
        write_i64(out, f as i64);
        return;
    }

    let mut buf = RyuBuffer::new();
    let formatted = buf.format(f);

    if formatted.contains('e') || formatted.contains('E') {
        if f.abs() >= 1.0 {
            // Every float at this magnitude is integral, so the expansion
            // is exact.
            out.put_str(&format!("{f:.0}"));
        } else {
            out.put_str(formatted);
        }
    } else {
        push_trimmed_decimal(formatted, out);
    }
}

fn push_trimmed_decimal<B: TextSink>(s: &str, out: &mut B) {
    if let Some((int_part, frac_part)) = s.split_once('.') {
        let trimmed = frac_part.trim_end_matches('0');
        if trimmed.is_empty() {
            out.put_str(int_part);
        } else {
            out.put_str(int_part);
            out.put_char('.');
            out.put_str(trimmed);
        }
    } else {
        out.put_str(s);
    }
}
