// SPDX-License-Identifier: GPL-3.0-only

//! Size codec for human-entered quantities and quota-tool output
//!
//! Quota tools on this platform speak in kilobytes, so the canonical unit
//! everywhere in the engine is the kilobyte. Two deliberately asymmetric
//! conversions live here:
//!
//! - [`to_kilobytes`] is for sorting and comparison: anything unparseable
//!   maps to [`SORT_LAST`] so garbage never floats to the top of a column.
//! - [`from_kilobytes`] is for display: non-numeric input passes through
//!   unchanged so a raw diagnostic string from a usage probe is never
//!   hidden from the operator.
//!
//! Do not collapse these into a single parse-or-error function.

use std::cmp::Ordering;

/// Sentinel for "unknown, sort last".
pub const SORT_LAST: u64 = u64::MAX;

const UNITS: [&str; 8] = ["KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Parse a size string ("10GB", "500M", "2048") into kilobytes.
///
/// The grammar is a decimal number (fractions allowed) followed by an
/// optional K/M/G/T/P unit and an optional trailing "B", case-insensitive,
/// with surrounding whitespace ignored. A bare number is taken as
/// kilobytes. Empty input, "NONE", "N/A", and anything unparseable map to
/// [`SORT_LAST`]; any literal zero maps to 0.
pub fn to_kilobytes(size: &str) -> u64 {
    let s = size.trim().to_ascii_uppercase();

    if s.is_empty() || s == "NONE" || s == "N/A" {
        return SORT_LAST;
    }

    let (value, rest) = match take_number(&s) {
        Some(parsed) => parsed,
        None => return SORT_LAST,
    };

    let multiplier = match parse_unit(rest.trim_start()) {
        Some(multiplier) => multiplier,
        None => return SORT_LAST,
    };

    if value == 0.0 {
        return 0;
    }

    (value * multiplier as f64) as u64
}

/// Consume a leading `\d+(\.\d+)?` and return (value, remainder).
fn take_number(input: &str) -> Option<(f64, &str)> {
    let integer_len = input.bytes().take_while(u8::is_ascii_digit).count();
    if integer_len == 0 {
        return None;
    }

    let mut end = integer_len;
    let rest = &input[integer_len..];
    if let Some(fraction) = rest.strip_prefix('.') {
        let fraction_len = fraction.bytes().take_while(u8::is_ascii_digit).count();
        if fraction_len == 0 {
            return None;
        }
        end = integer_len + 1 + fraction_len;
    }

    let value = input[..end].parse().ok()?;
    Some((value, &input[end..]))
}

/// Kilobyte multiplier for an optional `(K|M|G|T|P)?B?` suffix.
fn parse_unit(suffix: &str) -> Option<u64> {
    let multiplier = match suffix {
        "" | "B" | "K" | "KB" => 1,
        "M" | "MB" => 1024,
        "G" | "GB" => 1024 * 1024,
        "T" | "TB" => 1024 * 1024 * 1024,
        "P" | "PB" => 1024_u64.pow(4),
        _ => return None,
    };
    Some(multiplier)
}

/// Render a kilobyte count (serialized as text) as a human-readable size.
///
/// The unit tier is `floor(log1024(kb))` over KB..YB; the KB tier prints
/// as a plain integer, every higher tier with one fractional digit.
/// Negative counts render as "N/A"; input that is not a number at all is
/// returned unchanged.
pub fn from_kilobytes(kb_text: &str) -> String {
    let kb: i64 = match kb_text.trim().parse() {
        Ok(kb) => kb,
        Err(_) => return kb_text.to_string(),
    };

    if kb < 0 {
        return "N/A".to_string();
    }
    if kb == 0 {
        return "0 KB".to_string();
    }

    // floor(log1024(kb)) without going through floats
    let tier = ((63 - (kb as u64).leading_zeros()) / 10) as usize;
    let tier = tier.min(UNITS.len() - 1);

    if tier == 0 {
        format!("{} {}", kb, UNITS[0])
    } else {
        let value = kb as f64 / 1024_f64.powi(tier as i32);
        format!("{:.1} {}", value, UNITS[tier])
    }
}

/// Ordering for quota/used columns. Unknown values sort last.
pub fn compare_sizes(a: &str, b: &str) -> Ordering {
    to_kilobytes(a).cmp(&to_kilobytes(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_numbers_are_kilobytes() {
        assert_eq!(to_kilobytes("2048"), 2048);
        assert_eq!(to_kilobytes("  2048  "), 2048);
    }

    #[test]
    fn unit_multipliers_are_base_1024() {
        assert_eq!(to_kilobytes("1K"), 1);
        assert_eq!(to_kilobytes("1M"), 1024);
        assert_eq!(to_kilobytes("1G"), 1024 * 1024);
        assert_eq!(to_kilobytes("1T"), 1024 * 1024 * 1024);
        assert_eq!(to_kilobytes("1P"), 1024_u64.pow(4));
        // 1M is 1024K, not 1000K
        assert!(to_kilobytes("1M") > to_kilobytes("1000K"));
        assert!(to_kilobytes("1M") < to_kilobytes("1025K"));
    }

    #[test]
    fn unit_spellings_and_case() {
        assert_eq!(to_kilobytes("10GB"), to_kilobytes("10G"));
        assert_eq!(to_kilobytes("10gb"), to_kilobytes("10GB"));
        assert_eq!(to_kilobytes("500 M"), 500 * 1024);
        assert_eq!(to_kilobytes("500MB"), 500 * 1024);
    }

    #[test]
    fn fractional_values_parse() {
        assert_eq!(to_kilobytes("1.5M"), 1536);
        assert_eq!(to_kilobytes("0.5K"), 0);
    }

    #[test]
    fn monotonic_within_a_unit() {
        let mut last = 0;
        for n in [1_u64, 2, 10, 100, 999, 1000, 4096] {
            let kb = to_kilobytes(&format!("{n}G"));
            assert!(kb > last, "{n}G should exceed the previous value");
            last = kb;
        }
    }

    #[test]
    fn unknown_values_sort_last() {
        assert_eq!(to_kilobytes(""), SORT_LAST);
        assert_eq!(to_kilobytes("none"), SORT_LAST);
        assert_eq!(to_kilobytes("N/A"), SORT_LAST);
        assert_eq!(to_kilobytes("garbage"), SORT_LAST);
        assert_eq!(to_kilobytes("5X"), SORT_LAST);
        assert_eq!(to_kilobytes("5."), SORT_LAST);
        assert_eq!(to_kilobytes("-5GB"), SORT_LAST);
    }

    #[test]
    fn zero_sorts_first() {
        assert_eq!(to_kilobytes("0"), 0);
        assert_eq!(to_kilobytes("0K"), 0);
        assert_eq!(to_kilobytes("0MB"), 0);
    }

    #[test]
    fn display_tier_boundaries() {
        assert_eq!(from_kilobytes("1023"), "1023 KB");
        assert_eq!(from_kilobytes("1024"), "1.0 MB");
        assert_eq!(from_kilobytes("1048576"), "1.0 GB");
        assert_eq!(from_kilobytes("1536"), "1.5 MB");
    }

    #[test]
    fn display_edge_cases() {
        assert_eq!(from_kilobytes("0"), "0 KB");
        assert_eq!(from_kilobytes("-1"), "N/A");
        // raw diagnostics pass through untouched
        assert_eq!(from_kilobytes("df: not found"), "df: not found");
    }

    #[test]
    fn size_ordering_for_columns() {
        assert_eq!(compare_sizes("1G", "500M"), Ordering::Greater);
        assert_eq!(compare_sizes("", "1K"), Ordering::Greater);
        assert_eq!(compare_sizes("0", "1K"), Ordering::Less);
    }
}
