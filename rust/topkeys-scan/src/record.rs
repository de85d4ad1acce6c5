//! Parsing of `<key> <count>\n` records.
//!
//! The parser never fails. Every non-empty record yields exactly one
//! `(key, count)` pair:
//! - The key is everything before the last space of the record.
//! - The count is parsed from the bytes after that space (see [`parse_count`]).
//! - A record without a space is a key with count 0.
//! - `\n` and `\0` both terminate a record; empty records are skipped.
//! - Trailing bytes without a terminator form a final record.

use memchr::memchr3;

/// Parses the leading unsigned decimal number of `field`.
///
/// Leading ASCII whitespace and a single `+` are skipped, digits are consumed
/// up to the first non-digit, and the value saturates at `u64::MAX`. Text
/// without leading digits (empty, `NaN`, negative numbers) yields 0.
pub fn parse_count(field: &[u8]) -> u64 {
    let start = field
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(field.len());
    let mut digits = &field[start..];
    if let [b'+', rest @ ..] = digits {
        digits = rest;
    }

    let mut count = 0u64;
    for &b in digits {
        if !b.is_ascii_digit() {
            break;
        }
        count = count.saturating_mul(10).saturating_add(u64::from(b - b'0'));
    }
    count
}

/// Splits `bytes` into records and calls `f(key, count)` for each of them.
///
/// Returns the number of records passed to `f`. `key` borrows from `bytes`.
pub fn for_each_record<F>(bytes: &[u8], mut f: F) -> u64
where
    F: FnMut(&[u8], u64),
{
    let mut records = 0u64;
    let mut record_start = 0usize;
    let mut count_start: Option<usize> = None;
    let mut pos = 0usize;

    while let Some(offset) = memchr3(b' ', b'\n', 0, &bytes[pos..]) {
        let i = pos + offset;
        if bytes[i] == b' ' {
            count_start = Some(i + 1);
        } else {
            if emit(bytes, record_start, count_start, i, &mut f) {
                records += 1;
            }
            record_start = i + 1;
            count_start = None;
        }
        pos = i + 1;
    }

    if emit(bytes, record_start, count_start, bytes.len(), &mut f) {
        records += 1;
    }
    records
}

#[inline]
fn emit<F>(bytes: &[u8], start: usize, count_start: Option<usize>, end: usize, f: &mut F) -> bool
where
    F: FnMut(&[u8], u64),
{
    if start >= end {
        return false;
    }
    match count_start {
        Some(count_start) => f(
            &bytes[start..count_start - 1],
            parse_count(&bytes[count_start..end]),
        ),
        None => f(&bytes[start..end], 0),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(bytes: &[u8]) -> Vec<(String, u64)> {
        let mut out = Vec::new();
        let n = for_each_record(bytes, |key, count| {
            out.push((String::from_utf8_lossy(key).into_owned(), count))
        });
        assert_eq!(n as usize, out.len());
        out
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(b"20"), 20);
        assert_eq!(parse_count(b"  42"), 42);
        assert_eq!(parse_count(b"+7"), 7);
        assert_eq!(parse_count(b"12abc"), 12);
        assert_eq!(parse_count(b"20\r"), 20);
        assert_eq!(parse_count(b""), 0);
        assert_eq!(parse_count(b"NaN"), 0);
        assert_eq!(parse_count(b"-5"), 0);
        assert_eq!(parse_count(b"18446744073709551615"), u64::MAX);
        assert_eq!(parse_count(b"99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn test_records() {
        let records = collect(b"apple 5\nbanana 20\ncherry 1\ndate 20\n");
        assert_eq!(
            records,
            vec![
                ("apple".to_string(), 5),
                ("banana".to_string(), 20),
                ("cherry".to_string(), 1),
                ("date".to_string(), 20),
            ]
        );
    }

    #[test]
    fn test_non_numeric_count() {
        assert_eq!(collect(b"bad NaN\n"), vec![("bad".to_string(), 0)]);
    }

    #[test]
    fn test_key_spans_to_last_space() {
        assert_eq!(collect(b"a b 5\n"), vec![("a b".to_string(), 5)]);
        assert_eq!(collect(b"trailing \n"), vec![("trailing".to_string(), 0)]);
    }

    #[test]
    fn test_record_without_space() {
        assert_eq!(
            collect(b"lonely\nk 3\n"),
            vec![("lonely".to_string(), 0), ("k".to_string(), 3)]
        );
    }

    #[test]
    fn test_terminators() {
        assert_eq!(
            collect(b"a 1\0b 2\n\n\0c 3"),
            vec![
                ("a".to_string(), 1),
                ("b".to_string(), 2),
                ("c".to_string(), 3),
            ]
        );
        assert!(collect(b"").is_empty());
        assert!(collect(b"\n\n\0").is_empty());
    }

    #[test]
    fn test_count_state_resets_per_record() {
        // The second record has no space; its count must not leak from the first.
        assert_eq!(
            collect(b"x 9\ny\n"),
            vec![("x".to_string(), 9), ("y".to_string(), 0)]
        );
    }
}
