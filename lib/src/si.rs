//! Numbers with SI prefixes, e.g. `10k` or `1.5M`.

use ordered_float::OrderedFloat;

use crate::error::ParseError;

/// Known prefixes, largest to smallest. Case sensitive.
pub const PREFIXES: [(&str, f64); 20] = [
    ("Y", 1e24),
    ("Z", 1e21),
    ("E", 1e18),
    ("P", 1e15),
    ("T", 1e12),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("da", 1e1),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
    ("a", 1e-18),
    ("z", 1e-21),
    ("y", 1e-24),
];

/// Parse a number with an optional SI prefix suffix. The longest matching
/// suffix wins, so `5da` is fifty and `5d` is a half.
pub fn parse(s: &str) -> Result<f64, ParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ParseError::Empty);
    }
    let (number, multiplier) = PREFIXES
        .iter()
        .filter(|(suffix, _)| s.ends_with(suffix))
        .max_by_key(|(suffix, _)| suffix.len())
        .map_or((s, 1.0), |(suffix, value)| {
            (&s[..s.len() - suffix.len()], *value)
        });
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidNumber(s.to_owned()))?;
    Ok(value * multiplier)
}

/// Render `value` with the prefix whose power of ten is nearest its
/// magnitude, using at most two decimals.
pub fn format(value: f64) -> String {
    let log = value.abs().log10();
    let (large, small) = PREFIXES.split_at(10);
    let (suffix, scale) = large
        .iter()
        .copied()
        .chain(std::iter::once(("", 1.0)))
        .chain(small.iter().copied())
        .filter(|(_, scale)| (log - scale.log10()).abs().is_finite())
        .min_by_key(|(_, scale)| OrderedFloat((log - scale.log10()).abs()))
        .unwrap_or(("", 1.0));
    let digits = format!("{:.2}", value / scale);
    let digits = if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        &digits
    };
    let digits = if digits == "-0" { "0" } else { digits };
    format!("{digits}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixes() {
        assert_eq!(parse("10k").unwrap(), 10_000.0);
        assert_eq!(parse("1.5M").unwrap(), 1_500_000.0);
        assert_eq!(parse(" 42 ").unwrap(), 42.0);
        assert_eq!(parse("-3G").unwrap(), -3e9);
        assert_eq!(parse("2 k").unwrap(), 2000.0);
        assert!((parse("5m").unwrap() - 0.005).abs() < 1e-15);
    }

    #[test]
    fn deca_and_deci_are_distinct() {
        assert_eq!(parse("5da").unwrap(), 50.0);
        assert!((parse("5d").unwrap() - 0.5).abs() < 1e-15);
    }

    #[test]
    fn parse_failures() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert!(matches!(parse("k"), Err(ParseError::InvalidNumber(_))));
        assert!(matches!(parse("12x"), Err(ParseError::InvalidNumber(_))));
        assert!(matches!(parse("1.2.3k"), Err(ParseError::InvalidNumber(_))));
    }

    #[test]
    fn formats_with_nearest_prefix() {
        assert_eq!(format(0.001), "1m");
        assert_eq!(format(1e9), "1G");
        assert_eq!(format(1500.0), "1.5k");
        assert_eq!(format(12.0), "1.2da");
        assert_eq!(format(1.0), "1");
        assert_eq!(format(0.0), "0");
        assert_eq!(format(-2_500_000.0), "-2.5M");
    }

    #[test]
    fn format_then_parse_recovers_value() {
        for x in [
            3.2e-23, 7.0e-19, 4.5e-13, 2.0e-7, 0.042, 0.9, 7.0, 88.0, 640.0, 600_000.0,
            13_599_840_256.0, 3.5316e12, 1.1723328e18, 5.0e22,
        ] {
            let text = format(x);
            let suffix = text.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == '-');
            let scale = parse(&format!("1{suffix}")).unwrap();
            let back = parse(&text).unwrap();
            // Two decimals in the chosen unit.
            assert!(
                (back - x).abs() <= 0.005 * scale * 1.0001,
                "{x} -> {text} -> {back}"
            );
        }
    }
}
